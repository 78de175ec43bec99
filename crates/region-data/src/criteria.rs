//! Query criteria: predicates combined with AND, sorting and slicing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::Item;

/// Default number of items returned by a query.
pub const DEFAULT_LIMIT: usize = 100;

/// A single condition on an item field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Field equals the value.
    Eq { field: String, value: Value },
    /// Field equals one of the values. An empty list matches nothing.
    In { field: String, values: Vec<Value> },
}

impl Predicate {
    /// Check if the item satisfies the predicate.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Predicate::Eq { field, value } => item
                .field(field)
                .map_or(false, |actual| loose_eq(&actual, value)),
            Predicate::In { field, values } => item
                .field(field)
                .map_or(false, |actual| values.iter().any(|v| loose_eq(&actual, v))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: Direction,
}

/// Query against one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    /// Domain to search (e.g. "product", "product/list").
    pub domain: String,
    /// Conditions, all of which must hold.
    pub conditions: Vec<Predicate>,
    /// Sort keys, applied in order.
    pub sort: Vec<SortSpec>,
    /// Number of matching items to skip.
    pub offset: usize,
    /// Maximum number of items to return.
    pub limit: usize,
    /// Only return active items.
    pub active_only: bool,
    /// Referenced domains to include on the returned items (`None` = all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_domains: Option<Vec<String>>,
}

impl Criteria {
    /// Create criteria for active items of a domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            conditions: Vec::new(),
            sort: Vec::new(),
            offset: 0,
            limit: DEFAULT_LIMIT,
            active_only: true,
            ref_domains: None,
        }
    }

    /// Require `field == value`.
    pub fn compare_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Require `field` to be one of `values`.
    pub fn compare_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.push(Predicate::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sort ascending by `field`.
    pub fn sort_asc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortSpec {
            field: field.into(),
            direction: Direction::Asc,
        });
        self
    }

    /// Sort descending by `field`.
    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortSpec {
            field: field.into(),
            direction: Direction::Desc,
        });
        self
    }

    /// Set offset and limit.
    pub fn slice(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Include inactive items.
    pub fn include_inactive(mut self) -> Self {
        self.active_only = false;
        self
    }

    /// Restrict references on returned items to `domains`.
    pub fn with_ref_domains(mut self, domains: Vec<String>) -> Self {
        self.ref_domains = Some(domains);
        self
    }

    /// Check if an item matches the domain, status and all conditions.
    pub fn matches(&self, item: &Item) -> bool {
        item.domain == self.domain
            && (!self.active_only || item.is_active())
            && self.conditions.iter().all(|c| c.matches(item))
    }

    /// Order two items by the sort keys.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        for spec in &self.sort {
            let ord = compare_values(a.field(&spec.field).as_ref(), b.field(&spec.field).as_ref());
            let ord = match spec.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Filter, sort and slice `items`.
    pub fn apply<'a, I>(&self, items: I) -> Vec<Item>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut matched: Vec<&Item> = items.into_iter().filter(|i| self.matches(i)).collect();
        // Stable sort keeps insertion order for equal keys.
        matched.sort_by(|a, b| self.compare(a, b));

        matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .map(|item| match &self.ref_domains {
                Some(domains) => item.restricted_to(domains),
                None => item.clone(),
            })
            .collect()
    }
}

/// Compare ids and codes without caring whether they are strings or numbers.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::String(s), other) | (other, Value::String(s)) => match other {
            Value::Number(n) => s == &n.to_string(),
            Value::Bool(v) => s == &v.to_string(),
            _ => false,
        },
        (a, b) => a == b,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => as_text(a).cmp(&as_text(b)),
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
