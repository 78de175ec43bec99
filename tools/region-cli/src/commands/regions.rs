//! Regions command.

use anyhow::Result;
use region_client::DEFAULT_IMPL;
use serde::Serialize;

use super::RegionsArgs;
use crate::context::Context;

#[derive(Serialize)]
struct RegionInfo {
    path: String,
    implementations: Vec<String>,
    subparts: Vec<String>,
}

/// Run the regions command.
pub async fn run(args: RegionsArgs, ctx: &Context) -> Result<()> {
    let registry = storefront_regions::registry();

    let regions: Vec<RegionInfo> = registry
        .entries()
        .into_iter()
        .filter(|(path, _)| {
            args.prefix
                .as_deref()
                .map_or(true, |prefix| path.starts_with(prefix))
        })
        .map(|(path, implementations)| {
            let defaults = registry
                .create(&path, DEFAULT_IMPL)
                .map(|region| region.default_subparts())
                .unwrap_or_default();
            let subparts = ctx
                .config
                .get(&format!("client/html/{}/default/subparts", path), defaults);
            RegionInfo {
                path,
                implementations,
                subparts,
            }
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&regions);
        return Ok(());
    }

    ctx.output.header("Registered regions");
    if regions.is_empty() {
        ctx.output.info("No regions match.");
        return Ok(());
    }

    for region in &regions {
        ctx.output.list_item(&format!(
            "{} [{}]",
            region.path,
            region.implementations.join(", ")
        ));
        if !region.subparts.is_empty() {
            ctx.output.kv("subparts", &region.subparts.join(", "));
        }
    }

    Ok(())
}
