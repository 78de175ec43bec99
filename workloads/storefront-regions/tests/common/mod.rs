//! Shared storefront fixture for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use region_client::{HtmlClient, Services};
use region_core::{Catalog, Config};
use region_data::{Item, MemoryProvider};

/// End date of the front image reference of product 1.
pub fn media_ref_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2040, 1, 1, 0, 0, 0).unwrap()
}

/// End date of attribute 10.
pub fn attribute_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2045, 6, 1, 0, 0, 0).unwrap()
}

fn product(id: &str, name: &str) -> Item {
    Item::new("product", id)
        .with_label(name)
        .with_field("name", name)
}

fn bought_together(id: &str, parent: &str, refid: &str, position: i64) -> Item {
    Item::new("product/list", id)
        .with_field("parentid", parent)
        .with_field("refid", refid)
        .with_field("type", "bought-together")
        .with_field("domain", "product")
        .with_field("position", position)
}

/// Products sorted by label: 1 Blue shirt, 3 Green hat, 2 Red socks, 4 Yellow scarf.
pub fn items() -> Vec<Item> {
    let mut shirt = product("1", "Blue shirt")
        .with_field("code", "S-1")
        .with_ref("attribute", "10", "default", 1)
        .with_ref("attribute", "11", "default", 0)
        .with_ref("media", "20", "default", 0)
        .with_ref("price", "30", "default", 0);
    shirt.refs[2].date_end = Some(media_ref_end());

    vec![
        shirt,
        product("2", "Red socks"),
        product("3", "Green hat"),
        product("4", "Yellow scarf"),
        product("5", "Grey gloves"),
        product("6", "Inactive belt").with_status(0),
        Item::new("attribute", "10")
            .with_label("Blue")
            .with_date_end(attribute_end()),
        Item::new("attribute", "11").with_label("XL"),
        Item::new("media", "20")
            .with_label("Front")
            .with_field("url", "/img/1.jpg"),
        Item::new("catalog", "7")
            .with_label("Summer")
            .with_ref("product", "3", "default", 0)
            .with_ref("product", "1", "default", 1)
            .with_ref("product", "2", "default", 2),
        Item::new("catalog", "8")
            .with_label("Winter")
            .with_ref("product", "1", "default", 0)
            .with_ref("product", "6", "default", 1)
            .with_ref("product", "3", "default", 2)
            .with_ref("product", "4", "default", 3),
        bought_together("100", "1", "2", 0),
        bought_together("101", "1", "4", 1),
        bought_together("102", "1", "3", 2),
        bought_together("103", "2", "5", 3),
        bought_together("104", "2", "6", 4),
        bought_together("105", "1", "4", 5),
    ]
}

pub fn provider() -> Arc<MemoryProvider> {
    Arc::new(MemoryProvider::with_items(items()))
}

pub fn translations() -> Catalog {
    Catalog::new().with("storage", "Item not found: product 99", "Artikel nicht gefunden")
}

/// Client with the storefront registry and default templates.
pub fn client(config: Config, provider: Arc<MemoryProvider>) -> HtmlClient {
    let registry = storefront_regions::registry();
    let engine = storefront_regions::engine().unwrap();

    let services = Services::new(config, provider, Arc::new(engine))
        .with_translator(Arc::new(translations()))
        .with_registry(Arc::new(registry));
    HtmlClient::new(Arc::new(services))
}
