//! Storefront HTML regions.
//!
//! Provides the built-in regions rendered by the generic region node:
//! - `catalog/detail` - Product detail with image, basic and attribute parts (cached)
//! - `catalog/stage/navigator` - Previous/next links, patched into cached pages
//! - `basket/related/bought` - Products bought together with the basket content
//! - `email/watch/html/detail` - Watched product list of the watch e-mail
//!
//! Default templates for all of them are embedded; [`engine`] returns a
//! template engine preloaded with them.

mod data;
mod regions;
mod url;

use std::sync::Arc;

use region_client::{Region, Registry, TemplateRegion, TeraEngine};

pub use data::*;
pub use regions::*;
pub use url::*;

/// Parts of the detail page, rendered from templates only.
pub const DETAIL_PARTS: [&str; 3] = ["image", "basic", "attribute"];

/// Path of the navigator as a detail child named `navigator`.
///
/// Not a default child; add it to `client/html/catalog/detail/default/subparts`.
pub const DETAIL_NAVIGATOR: &str = "catalog/detail/navigator";

/// Embedded default templates as (path, content) pairs.
pub fn default_templates() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "catalog/detail/body-default.html",
            include_str!("../templates/catalog/detail/body-default.html"),
        ),
        (
            "catalog/detail/header-default.html",
            include_str!("../templates/catalog/detail/header-default.html"),
        ),
        (
            "catalog/detail/image/body-default.html",
            include_str!("../templates/catalog/detail/image/body-default.html"),
        ),
        (
            "catalog/detail/basic/body-default.html",
            include_str!("../templates/catalog/detail/basic/body-default.html"),
        ),
        (
            "catalog/detail/attribute/body-default.html",
            include_str!("../templates/catalog/detail/attribute/body-default.html"),
        ),
        (
            "catalog/stage/navigator/body-default.html",
            include_str!("../templates/catalog/stage/navigator/body-default.html"),
        ),
        (
            "catalog/stage/navigator/header-default.html",
            include_str!("../templates/catalog/stage/navigator/header-default.html"),
        ),
        (
            "basket/related/bought/body-default.html",
            include_str!("../templates/basket/related/bought/body-default.html"),
        ),
        (
            "email/watch/html/detail/body-default.html",
            include_str!("../templates/email/watch/html/detail/body-default.html"),
        ),
        (
            "email/watch/html/detail/header-default.html",
            include_str!("../templates/email/watch/html/detail/header-default.html"),
        ),
    ]
}

/// Template engine holding the default templates.
pub fn engine() -> anyhow::Result<TeraEngine> {
    TeraEngine::new().with_templates(default_templates())
}

/// Register the default implementation of every storefront region.
pub fn register(registry: &Registry) {
    registry.register_default(CATALOG_DETAIL, || Arc::new(CatalogDetail) as Arc<dyn Region>);

    for part in DETAIL_PARTS {
        let path = format!("{}/{}", CATALOG_DETAIL, part);
        let region_path = path.clone();
        registry.register_default(&path, move || {
            Arc::new(TemplateRegion::new(region_path.clone())) as Arc<dyn Region>
        });
    }

    registry.register_default(DETAIL_NAVIGATOR, || {
        Arc::new(StageNavigator::new(DETAIL_NAVIGATOR)) as Arc<dyn Region>
    });
    registry.register_default(STAGE_NAVIGATOR, || {
        Arc::new(StageNavigator::default()) as Arc<dyn Region>
    });
    registry.register_default(BASKET_RELATED_BOUGHT, || {
        Arc::new(BasketRelatedBought) as Arc<dyn Region>
    });
    registry.register_default(EMAIL_WATCH_DETAIL, || {
        Arc::new(EmailWatchDetail) as Arc<dyn Region>
    });
}

/// Registry with all storefront regions.
pub fn registry() -> Registry {
    let registry = Registry::new();
    register(&registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use region_client::DEFAULT_IMPL;

    #[test]
    fn test_registry_has_all_regions() {
        let registry = registry();
        for path in [
            CATALOG_DETAIL,
            "catalog/detail/image",
            "catalog/detail/basic",
            "catalog/detail/attribute",
            DETAIL_NAVIGATOR,
            STAGE_NAVIGATOR,
            BASKET_RELATED_BOUGHT,
            EMAIL_WATCH_DETAIL,
        ] {
            assert!(registry.contains(path, DEFAULT_IMPL), "missing {}", path);
        }
    }

    #[test]
    fn test_detail_parts_keep_their_path() {
        let region = registry().create("catalog/detail/basic", DEFAULT_IMPL).unwrap();
        assert_eq!(region.path(), "catalog/detail/basic");
        assert_eq!(region.body_template(), "catalog/detail/basic/body-default.html");
    }

    #[test]
    fn test_engine_loads_default_templates() {
        let engine = engine().unwrap();
        let names = engine.template_names();
        assert_eq!(names.len(), default_templates().len());
        assert!(names.contains(&"catalog/detail/body-default.html".to_string()));
    }
}
