//! Generic domain items.

use chrono::{DateTime, Utc};
use region_core::Tag;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_status() -> i32 {
    1
}

fn default_list_type() -> String {
    "default".to_string()
}

/// Reference from an item to an item of another domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRef {
    /// Domain of the referenced item (e.g. "attribute").
    pub domain: String,
    /// ID of the referenced item.
    pub ref_id: String,
    /// List type (e.g. "default", "bought-together").
    #[serde(rename = "type", default = "default_list_type")]
    pub list_type: String,
    /// Sort position within the list.
    #[serde(default)]
    pub position: i64,
    /// End of validity of the reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<DateTime<Utc>>,
}

/// An item of any domain (product, attribute, media, product/list, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique ID within the domain.
    pub id: String,
    /// Domain name.
    pub domain: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Status; values above zero are active.
    #[serde(default = "default_status")]
    pub status: i32,
    /// Domain-specific fields.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// References to items of other domains.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<ListRef>,
    /// End of validity of the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<DateTime<Utc>>,
}

impl Item {
    /// Create an active item.
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: domain.into(),
            label: String::new(),
            status: 1,
            fields: Map::new(),
            refs: Vec::new(),
            date_end: None,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a reference to another item.
    pub fn with_ref(
        mut self,
        domain: impl Into<String>,
        ref_id: impl Into<String>,
        list_type: impl Into<String>,
        position: i64,
    ) -> Self {
        self.refs.push(ListRef {
            domain: domain.into(),
            ref_id: ref_id.into(),
            list_type: list_type.into(),
            position,
            date_end: None,
        });
        self
    }

    /// Set the end of validity.
    pub fn with_date_end(mut self, date_end: DateTime<Utc>) -> Self {
        self.date_end = Some(date_end);
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    /// Check if the item is active.
    pub fn is_active(&self) -> bool {
        self.status > 0
    }

    /// Cache tag of this item.
    pub fn tag(&self) -> Tag {
        Tag::item(&self.domain, &self.id)
    }

    /// Field value used by criteria; domain fields win over built-in ones.
    pub fn field(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.fields.get(name) {
            return Some(value.clone());
        }
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "label" => Some(Value::String(self.label.clone())),
            "status" => Some(Value::from(self.status)),
            _ => None,
        }
    }

    /// Display name: the `name` field, falling back to the label.
    pub fn name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&self.label)
    }

    /// IDs referenced in `domain`, ordered by position.
    pub fn ref_ids(&self, domain: &str) -> Vec<String> {
        let mut refs: Vec<&ListRef> = self.refs.iter().filter(|r| r.domain == domain).collect();
        refs.sort_by_key(|r| r.position);

        let mut ids: Vec<String> = Vec::with_capacity(refs.len());
        for r in refs {
            if !ids.contains(&r.ref_id) {
                ids.push(r.ref_id.clone());
            }
        }
        ids
    }

    /// Copy of the item keeping only references into `domains`.
    pub fn restricted_to(&self, domains: &[String]) -> Self {
        let mut item = self.clone();
        item.refs.retain(|r| domains.iter().any(|d| d == &r.domain));
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Item {
        Item::new("product", "1")
            .with_label("Shirt")
            .with_field("name", "Blue shirt")
            .with_ref("attribute", "20", "default", 2)
            .with_ref("attribute", "10", "default", 1)
            .with_ref("media", "5", "default", 0)
            .with_ref("attribute", "10", "variant", 3)
    }

    #[test]
    fn test_ref_ids_ordered_and_unique() {
        assert_eq!(product().ref_ids("attribute"), vec!["10", "20"]);
        assert_eq!(product().ref_ids("media"), vec!["5"]);
        assert!(product().ref_ids("price").is_empty());
    }

    #[test]
    fn test_field_lookup() {
        let item = product();
        assert_eq!(item.field("id"), Some(Value::from("1")));
        assert_eq!(item.field("status"), Some(Value::from(1)));
        assert_eq!(item.field("missing"), None);
        assert_eq!(item.name(), "Blue shirt");
    }

    #[test]
    fn test_restricted_to_domains() {
        let item = product().restricted_to(&["media".to_string()]);
        assert_eq!(item.refs.len(), 1);
        assert_eq!(item.refs[0].domain, "media");
    }

    #[test]
    fn test_deserialize_fixture_defaults() {
        let item: Item = serde_json::from_str(
            r#"{"id": "7", "domain": "attribute", "refs": [{"domain": "media", "ref_id": "1"}]}"#,
        )
        .unwrap();

        assert!(item.is_active());
        assert_eq!(item.refs[0].list_type, "default");
        assert_eq!(item.tag().as_str(), "attribute-7");
    }
}
