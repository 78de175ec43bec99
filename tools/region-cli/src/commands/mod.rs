//! CLI command implementations.

pub mod regions;
pub mod render;

use anyhow::{bail, Result};
use clap::Args;
use serde_json::Value;

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Region path, e.g. `catalog/detail`.
    pub region: String,

    /// JSON file with the items to serve (array of items).
    #[arg(short, long)]
    pub fixture: Option<String>,

    /// Directory with templates overriding the built-in ones.
    #[arg(short, long)]
    pub templates: Option<String>,

    /// Request parameter as `name=value` (repeatable).
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// View variable as `name=<json>` (repeatable).
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, Value)>,

    /// Region instance ID.
    #[arg(long, default_value = "")]
    pub uid: String,

    /// Locale discriminator.
    #[arg(long)]
    pub locale: Option<String>,

    /// Currency discriminator.
    #[arg(long)]
    pub currency: Option<String>,

    /// Number of render passes sharing one cache.
    #[arg(short, long, default_value_t = 1)]
    pub repeat: usize,

    /// Tag to invalidate after the first pass (repeatable).
    #[arg(long)]
    pub invalidate: Vec<String>,

    /// Print only the body.
    #[arg(long)]
    pub body_only: bool,
}

/// Arguments for the regions command.
#[derive(Args)]
pub struct RegionsArgs {
    /// Only list regions below this path.
    #[arg(short, long)]
    pub prefix: Option<String>,
}

/// Parse `name=value`.
fn parse_param(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => bail!("Expected name=value, got '{}'", s),
    }
}

/// Parse `name=<json>`; values that are not JSON are taken as strings.
fn parse_var(s: &str) -> Result<(String, Value)> {
    let (name, raw) = parse_param(s)?;
    let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("d_prodid=42").unwrap(),
            ("d_prodid".to_string(), "42".to_string())
        );
        assert_eq!(
            parse_param("d_name=a=b").unwrap(),
            ("d_name".to_string(), "a=b".to_string())
        );
        assert!(parse_param("d_prodid").is_err());
        assert!(parse_param("=42").is_err());
    }

    #[test]
    fn test_parse_var() {
        let (name, value) = parse_var(r#"stageParams={"f_catid": 7}"#).unwrap();
        assert_eq!(name, "stageParams");
        assert_eq!(value, json!({"f_catid": 7}));

        let (_, value) = parse_var("site=main").unwrap();
        assert_eq!(value, json!("main"));
    }
}
