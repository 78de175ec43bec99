//! Products often bought together with the basket content.

use async_trait::async_trait;
use tracing::debug;

use region_client::{Region, Services, ViewContext, ViewVars};
use region_core::{RenderResult, TagCollector};
use region_data::{add_meta_items, Criteria};

use crate::data::{items_view, order_by_ids, Basket};

/// Region path of the basket cross-selling list.
pub const BASKET_RELATED_BOUGHT: &str = "basket/related/bought";

/// List type linking products bought together.
pub const BOUGHT_TOGETHER: &str = "bought-together";

const DEFAULT_LIMIT: usize = 6;
const DEFAULT_DOMAINS: [&str; 3] = ["text", "price", "media"];

/// Suggests products bought together with the ones in `relatedBasket`.
///
/// Products already in the basket are never suggested. The list follows
/// the relation positions and is cut at
/// `client/html/basket/related/bought/default/limit`.
#[derive(Debug, Clone, Default)]
pub struct BasketRelatedBought;

#[async_trait]
impl Region for BasketRelatedBought {
    fn path(&self) -> &str {
        BASKET_RELATED_BOUGHT
    }

    async fn prepare(
        &self,
        view: &ViewContext,
        services: &Services,
        tags: &mut TagCollector,
    ) -> RenderResult<ViewVars> {
        let mut vars = ViewVars::new();
        let Some(basket) = view.var("relatedBasket") else {
            return Ok(vars);
        };

        let basket_ids = Basket::from_value(basket)?.product_ids();
        if basket_ids.is_empty() {
            return Ok(vars);
        }

        let criteria = Criteria::new("product/list")
            .compare_in("parentid", basket_ids.clone())
            .compare_eq("type", BOUGHT_TOGETHER)
            .compare_eq("domain", "product")
            .sort_asc("position");
        let relations = services.provider.find(&criteria).await?;
        add_meta_items(tags, &relations);

        let mut ref_ids: Vec<String> = Vec::new();
        for relation in &relations {
            let Some(ref_id) = relation.field("refid") else {
                continue;
            };
            let ref_id = match ref_id {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            if !basket_ids.contains(&ref_id) && !ref_ids.contains(&ref_id) {
                ref_ids.push(ref_id);
            }
        }

        let limit: usize = services.region_config(BASKET_RELATED_BOUGHT, "default/limit", DEFAULT_LIMIT);
        let items = if ref_ids.is_empty() || limit == 0 {
            Vec::new()
        } else {
            let defaults: Vec<String> = DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect();
            let domains: Vec<String> =
                services.region_config(BASKET_RELATED_BOUGHT, "default/domains", defaults);

            let criteria = Criteria::new("product")
                .compare_in("id", ref_ids.clone())
                .slice(0, ref_ids.len())
                .with_ref_domains(domains);
            let found = services.provider.find(&criteria).await?;

            let mut items = order_by_ids(found, &ref_ids);
            items.truncate(limit);
            items
        };
        add_meta_items(tags, &items);

        debug!(
            basket = basket_ids.len(),
            suggested = items.len(),
            "Bought-together products loaded"
        );
        vars.insert("boughtItems".to_string(), items_view(&items)?);
        Ok(vars)
    }
}
