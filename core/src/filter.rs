//! Filter engine: free-text search and structured dropdown selection.
//!
//! Every function here starts from the slice it is given and returns a
//! fresh subset in input order. Source records are never touched.

use crate::{
    error::HubResult,
    record::{AgeBucket, ClientRecord},
    types::ANY_LABEL,
};
use serde::{Deserialize, Serialize};

/// How a new search or dropdown change combines with the previous filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Whichever filter was triggered last replaces the other.
    #[default]
    Exclusive,
    /// Query and dropdowns are kept together and ANDed.
    Composed,
}

/// Dropdown selections. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFilter {
    pub age_bucket: Option<AgeBucket>,
    pub region: Option<String>,
    pub product: Option<String>,
}

impl StructuredFilter {
    /// Build from raw dropdown labels, where the "any" label (or a missing
    /// value) clears the constraint.
    pub fn from_labels(
        age: Option<&str>,
        region: Option<&str>,
        product: Option<&str>,
    ) -> HubResult<Self> {
        let age_bucket = match age {
            Some(label) => AgeBucket::parse_selection(label)?,
            None => None,
        };
        Ok(Self {
            age_bucket,
            region: selection(region),
            product: selection(product),
        })
    }

    pub fn is_active(&self) -> bool {
        self.age_bucket.is_some() || self.region.is_some() || self.product.is_some()
    }

    pub fn matches(&self, record: &ClientRecord) -> bool {
        self.age_bucket.map_or(true, |b| b.admits(record.age))
            && self.region.as_ref().map_or(true, |r| &record.region == r)
            && self.product.as_ref().map_or(true, |p| &record.product == p)
    }
}

fn selection(label: Option<&str>) -> Option<String> {
    label.filter(|l| *l != ANY_LABEL).map(str::to_string)
}

/// The single filter object. In exclusive mode at most one half is ever
/// active; in composed mode both are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub query: String,
    pub structured: StructuredFilter,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && !self.structured.is_active()
    }

    pub fn matches(&self, record: &ClientRecord) -> bool {
        matches_query(record, &self.query.to_lowercase()) && self.structured.matches(record)
    }

    pub fn apply(&self, records: &[ClientRecord]) -> Vec<ClientRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// `query` must already be lower-cased. Empty matches everything.
fn matches_query(record: &ClientRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    [
        record.name.as_str(),
        record.region.as_str(),
        record.product.as_str(),
        record.risk_level.label(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(query))
}

/// Case-insensitive substring search over name, region, product and risk
/// level. An empty query returns the full set.
pub fn apply_text_query(records: &[ClientRecord], query: &str) -> Vec<ClientRecord> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches_query(r, &query))
        .cloned()
        .collect()
}

/// AND of every active dropdown constraint over the full set.
pub fn apply_structured_filters(
    records: &[ClientRecord],
    filter: &StructuredFilter,
) -> Vec<ClientRecord> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

pub fn reset(records: &[ClientRecord]) -> Vec<ClientRecord> {
    records.to_vec()
}

/// Dropdown options: the "any" label followed by the distinct values of
/// `field` in first-seen order.
pub fn selection_options<'a, F>(records: &'a [ClientRecord], field: F) -> Vec<String>
where
    F: Fn(&'a ClientRecord) -> &'a str,
{
    let mut options = vec![ANY_LABEL.to_string()];
    for record in records {
        let value = field(record);
        if !options[1..].iter().any(|o| o == value) {
            options.push(value.to_string());
        }
    }
    options
}

pub fn region_options(records: &[ClientRecord]) -> Vec<String> {
    selection_options(records, |r| r.region.as_str())
}

pub fn product_options(records: &[ClientRecord]) -> Vec<String> {
    selection_options(records, |r| r.product.as_str())
}
