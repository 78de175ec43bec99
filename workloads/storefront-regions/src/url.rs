//! Storefront link building.

use region_client::Services;

/// Percent-encode everything except unreserved characters.
pub fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Link to a product detail page.
///
/// Target, controller and action come from `client/html/catalog/detail/url/*`.
pub fn detail_url(services: &Services, params: &[(&str, String)]) -> String {
    let target: String = services.region_config("catalog/detail", "url/target", String::new());
    let controller: String =
        services.region_config("catalog/detail", "url/controller", "catalog".to_string());
    let action: String =
        services.region_config("catalog/detail", "url/action", "detail".to_string());

    let mut url = String::new();
    for segment in [target.as_str(), controller.as_str(), action.as_str()] {
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment.trim_matches('/'));
        }
    }

    let query: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{}={}", name, url_encode(value)))
        .collect();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use region_client::TeraEngine;
    use region_core::Config;
    use region_data::MemoryProvider;

    fn services(config: Config) -> Services {
        Services::new(config, Arc::new(MemoryProvider::new()), Arc::new(TeraEngine::new()))
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("Blue shirt"), "Blue%20shirt");
        assert_eq!(url_encode("a&b=c/d"), "a%26b%3Dc%2Fd");
        assert_eq!(url_encode("Grün"), "Gr%C3%BCn");
        assert_eq!(url_encode("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn test_detail_url_defaults() {
        let url = detail_url(
            &services(Config::new()),
            &[("d_prodid", "2".to_string()), ("d_name", "Red socks".to_string())],
        );
        assert_eq!(url, "/catalog/detail?d_prodid=2&d_name=Red%20socks");
    }

    #[test]
    fn test_detail_url_configured() {
        let config = Config::new()
            .with("client/html/catalog/detail/url/target", "shop")
            .with("client/html/catalog/detail/url/action", "view");
        let url = detail_url(&services(config), &[("l_pos", "3".to_string())]);
        assert_eq!(url, "/shop/catalog/view?l_pos=3");
    }
}
