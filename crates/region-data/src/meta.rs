//! Record item dependencies on a tag collector.

use region_core::TagCollector;

use crate::item::Item;

/// Add the item's tag and the earliest end date of the item and its references.
pub fn add_meta_item(collector: &mut TagCollector, item: &Item) {
    collector.add_tag(item.tag());
    collector.expire_at(item.date_end);

    for list_ref in &item.refs {
        collector.expire_at(list_ref.date_end);
    }
}

/// [`add_meta_item`] for each item.
pub fn add_meta_items<'a, I>(collector: &mut TagCollector, items: I)
where
    I: IntoIterator<Item = &'a Item>,
{
    for item in items {
        add_meta_item(collector, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use region_core::Tag;

    #[test]
    fn test_meta_uses_reference_end_dates() {
        let soon = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();

        let mut product = Item::new("product", "1")
            .with_ref("media", "4", "default", 0)
            .with_date_end(later);
        product.refs[0].date_end = Some(soon);

        let mut collector = TagCollector::new();
        add_meta_items(&mut collector, [&product, &Item::new("media", "4")]);

        assert!(collector.tags().contains(&Tag::new("product-1")));
        assert!(collector.tags().contains(&Tag::new("media-4")));
        assert_eq!(collector.expiry(), Some(soon));
    }
}
