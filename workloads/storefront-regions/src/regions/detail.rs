//! Product detail page region.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use region_cache::{FragmentPolicy, VaryRule};
use region_client::{Region, Services, ViewContext, ViewVars};
use region_core::{RenderError, RenderResult, TagCollector};
use region_data::{add_meta_item, add_meta_items, Criteria, Item};

use crate::data::{item_view, items_view, order_by_ids};

/// Region path of the product detail page.
pub const CATALOG_DETAIL: &str = "catalog/detail";

/// Session key holding the detail parameters of the last visited product.
pub const LAST_DETAIL_PARAMS: &str = "catalog/detail/params/last";

const DEFAULT_DOMAINS: [&str; 5] = ["media", "price", "text", "attribute", "product"];

/// Product detail: fetches the product with its attributes and media.
///
/// Output varies on the `d_*` parameters and is cached until one of the
/// shown items changes.
#[derive(Debug, Clone, Default)]
pub struct CatalogDetail;

impl CatalogDetail {
    /// Referenced domains to fetch with the product.
    ///
    /// `client/html/catalog/domains` applies to all catalog regions and is
    /// overridden by `client/html/catalog/detail/domains`.
    pub fn domains(services: &Services) -> Vec<String> {
        let defaults: Vec<String> = DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect();
        let domains: Vec<String> = services.config.get("client/html/catalog/domains", defaults);
        services.region_config(CATALOG_DETAIL, "domains", domains)
    }

    async fn referenced(
        services: &Services,
        product: &Item,
        domain: &str,
    ) -> RenderResult<Vec<Item>> {
        let ids = product.ref_ids(domain);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let criteria = Criteria::new(domain)
            .compare_in("id", ids.clone())
            .slice(0, ids.len());
        let items = services.provider.find(&criteria).await?;
        Ok(order_by_ids(items, &ids))
    }
}

#[async_trait]
impl Region for CatalogDetail {
    fn path(&self) -> &str {
        CATALOG_DETAIL
    }

    fn default_subparts(&self) -> Vec<String> {
        vec!["image".to_string(), "basic".to_string(), "attribute".to_string()]
    }

    fn cache_policy(&self) -> FragmentPolicy {
        FragmentPolicy::new()
            .vary_on(VaryRule::param_prefix("d"))
            .with_tag("catalog-detail")
    }

    async fn process(&self, view: &mut ViewContext, _services: &Services) -> RenderResult<()> {
        let params = view.params_with_prefixes(&["d"]);
        if !params.is_empty() {
            view.session_set(LAST_DETAIL_PARAMS, json!(params));
        }
        Ok(())
    }

    async fn prepare(
        &self,
        view: &ViewContext,
        services: &Services,
        tags: &mut TagCollector,
    ) -> RenderResult<ViewVars> {
        let id = view
            .param("d_prodid")
            .ok_or_else(|| RenderError::client("No product ID given"))?;

        let domains = Self::domains(services);
        let product = services
            .provider
            .get_by_id("product", id, &domains)
            .await?;
        if !product.is_active() {
            return Err(RenderError::client(format!(
                "Product with ID \"{}\" is not available",
                id
            )));
        }

        let attributes = if domains.iter().any(|d| d == "attribute") {
            Self::referenced(services, &product, "attribute").await?
        } else {
            Vec::new()
        };
        let media = if domains.iter().any(|d| d == "media") {
            Self::referenced(services, &product, "media").await?
        } else {
            Vec::new()
        };

        add_meta_item(tags, &product);
        add_meta_items(tags, attributes.iter().chain(media.iter()));
        debug!(
            product = id,
            attributes = attributes.len(),
            media = media.len(),
            "Detail data loaded"
        );

        let mut vars = ViewVars::new();
        vars.insert("detailProductItem".to_string(), item_view(&product)?);
        vars.insert("detailProductAttributeItems".to_string(), items_view(&attributes)?);
        vars.insert("detailProductMediaItems".to_string(), items_view(&media)?);
        vars.insert(
            "detailParams".to_string(),
            json!(view.params_with_prefixes(&["d"])),
        );
        Ok(vars)
    }
}

