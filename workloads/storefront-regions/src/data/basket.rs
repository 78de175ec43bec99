//! Basket view data passed in by the caller.

use serde::Deserialize;
use serde_json::Value;

use region_core::{RenderError, RenderResult};

/// Ordered product of a basket, possibly a bundle with sub-products.
#[derive(Debug, Clone, Deserialize)]
pub struct BasketProduct {
    #[serde(rename = "productid")]
    pub product_id: String,
    #[serde(default)]
    pub products: Vec<BasketProduct>,
}

/// Basket as exposed to regions through the `relatedBasket` view variable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Basket {
    #[serde(default)]
    pub products: Vec<BasketProduct>,
}

impl Basket {
    /// Parse the basket view variable.
    pub fn from_value(value: &Value) -> RenderResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| RenderError::client(format!("Invalid basket: {}", e)))
    }

    /// IDs of all products and sub-products, first occurrence wins.
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for product in &self.products {
            push_unique(&mut ids, &product.product_id);
            for sub in &product.products {
                push_unique(&mut ids, &sub.product_id);
            }
        }
        ids
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|i| i == id) {
        ids.push(id.to_string());
    }
}
