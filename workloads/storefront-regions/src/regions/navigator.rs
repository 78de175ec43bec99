//! Previous/next navigation between products of the current listing.

use async_trait::async_trait;
use serde_json::Value;

use region_client::{Region, Services, ViewContext, ViewVars};
use region_core::{RenderResult, TagCollector};
use region_data::{add_meta_item, add_meta_items, Criteria, Item};

use crate::data::order_by_ids;
use crate::url::detail_url;

/// Region path of the stage navigator.
pub const STAGE_NAVIGATOR: &str = "catalog/stage/navigator";

/// Live section name the navigator output is wrapped in.
pub const NAVIGATOR_MARKER: &str = "catalog.stage.navigator";

/// Links to the previous and next product of the listing the visitor came
/// from, identified by `l_pos` and the `stageParams` filter.
///
/// Never cached itself; inside cached output it is re-rendered on every
/// request through its marker.
#[derive(Debug, Clone)]
pub struct StageNavigator {
    path: String,
}

impl StageNavigator {
    /// Navigator registered at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Products `start..start + size` of the listing.
    ///
    /// With an `f_catid` filter the category's product list is used,
    /// otherwise all products ordered by label.
    async fn listing(
        view: &ViewContext,
        services: &Services,
        tags: &mut TagCollector,
        start: usize,
        size: usize,
    ) -> RenderResult<Vec<Item>> {
        let category = view
            .var("stageParams")
            .and_then(|params| params.get("f_catid"))
            .and_then(|id| match id {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        match category {
            Some(catid) => {
                let catalog = services
                    .provider
                    .get_by_id("catalog", &catid, &["product".to_string()])
                    .await?;
                add_meta_item(tags, &catalog);

                // Inactive products drop out before the window is taken.
                let ids = catalog.ref_ids("product");
                let criteria = Criteria::new("product").compare_in("id", ids.clone());
                let items = services.provider.find(&criteria).await?;

                Ok(order_by_ids(items, &ids)
                    .into_iter()
                    .skip(start)
                    .take(size)
                    .collect())
            }
            None => {
                let criteria = Criteria::new("product")
                    .sort_asc("label")
                    .slice(start, size);
                Ok(services.provider.find(&criteria).await?)
            }
        }
    }

    fn link(services: &Services, product: &Item, pos: i64) -> String {
        detail_url(
            services,
            &[
                ("d_prodid", product.id.clone()),
                ("d_name", product.name().to_string()),
                ("l_pos", pos.to_string()),
            ],
        )
    }
}

#[async_trait]
impl Region for StageNavigator {
    fn path(&self) -> &str {
        &self.path
    }

    fn body_template(&self) -> String {
        format!("{}/body-default.html", STAGE_NAVIGATOR)
    }

    fn header_template(&self) -> String {
        format!("{}/header-default.html", STAGE_NAVIGATOR)
    }

    fn marker(&self) -> Option<&str> {
        Some(NAVIGATOR_MARKER)
    }

    async fn prepare(
        &self,
        view: &ViewContext,
        services: &Services,
        tags: &mut TagCollector,
    ) -> RenderResult<ViewVars> {
        let mut vars = ViewVars::new();

        let (Some(pos), Some(pid)) = (view.param("l_pos"), view.param("d_prodid")) else {
            return Ok(vars);
        };
        // Unparsable positions count as the start of the listing.
        let pos = pos.trim().parse::<i64>().unwrap_or(0);

        let (start, size) = if pos < 1 {
            (0, 2)
        } else {
            ((pos - 1) as usize, 3)
        };

        let products = Self::listing(view, services, tags, start, size).await?;
        if products.len() < 2 {
            return Ok(vars);
        }
        add_meta_items(tags, &products);

        let list_pos = products.iter().position(|p| p.id == pid).unwrap_or(0);

        if list_pos > 0 {
            if let Some(prev) = products.first() {
                vars.insert(
                    "navigationPrev".to_string(),
                    Value::String(Self::link(services, prev, pos - 1)),
                );
            }
        }
        if list_pos + 1 < products.len() {
            if let Some(next) = products.last() {
                vars.insert(
                    "navigationNext".to_string(),
                    Value::String(Self::link(services, next, pos + 1)),
                );
            }
        }
        Ok(vars)
    }
}

impl Default for StageNavigator {
    fn default() -> Self {
        Self::new(STAGE_NAVIGATOR)
    }
}
