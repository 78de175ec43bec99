//! Item conversion for templates.

use serde_json::{json, Value};

use region_core::{RenderError, RenderResult};
use region_data::Item;

/// Template representation of an item, with its display name as `name`.
pub fn item_view(item: &Item) -> RenderResult<Value> {
    let mut value = serde_json::to_value(item).map_err(anyhow::Error::from)?;
    if let Value::Object(map) = &mut value {
        map.insert("name".to_string(), json!(item.name()));
    }
    Ok(value)
}

/// [`item_view`] for each item, keeping their order.
pub fn items_view<'a, I>(items: I) -> RenderResult<Value>
where
    I: IntoIterator<Item = &'a Item>,
{
    items
        .into_iter()
        .map(item_view)
        .collect::<Result<Vec<_>, RenderError>>()
        .map(Value::Array)
}

/// Reorder `items` to follow `ids`, dropping items not listed.
pub fn order_by_ids(items: Vec<Item>, ids: &[String]) -> Vec<Item> {
    let mut items = items;
    let mut ordered = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(pos) = items.iter().position(|i| &i.id == id) {
            ordered.push(items.swap_remove(pos));
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_view_has_name() {
        let item = Item::new("product", "1")
            .with_label("shirt-blue")
            .with_field("name", "Blue shirt");
        let view = item_view(&item).unwrap();

        assert_eq!(view["name"], "Blue shirt");
        assert_eq!(view["id"], "1");
        assert_eq!(view["fields"]["name"], "Blue shirt");
    }

    #[test]
    fn test_order_by_ids() {
        let items = vec![
            Item::new("product", "1"),
            Item::new("product", "2"),
            Item::new("product", "3"),
        ];
        let ordered = order_by_ids(items, &["3".to_string(), "9".to_string(), "1".to_string()]);
        let ids: Vec<&str> = ordered.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, vec!["3", "1"]);
    }
}
