//! Snapshot serialization: what the presentation layer renders.
//!
//! A snapshot is taken after every event. It carries the derived view
//! without the subset rows themselves, plus the dropdown options, so a
//! UI can redraw every panel from one JSON object. The rows are sent
//! separately, on request, as a SubsetTable.

use crate::{
    engine::{Analysis, ApplicationState},
    error::HubResult,
    filter::{self, FilterCriteria, FilterMode},
    metrics::ensure_non_empty,
    record::{ClientRecord, RECORD_COLUMNS},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub status: String,
    pub mode: FilterMode,
    pub criteria: FilterCriteria,
    pub total_clients: usize,
    pub filtered_clients: usize,
    pub analysis: Option<Analysis>,
    pub region_options: Vec<String>,
    pub product_options: Vec<String>,
}

impl DashboardSnapshot {
    pub fn capture(state: &ApplicationState) -> Self {
        Self {
            status: state.view.status.clone(),
            mode: state.mode,
            criteria: state.criteria.clone(),
            total_clients: state.full_set().len(),
            filtered_clients: state.subset().len(),
            analysis: state.view.analysis.clone(),
            region_options: filter::region_options(state.full_set()),
            product_options: filter::product_options(state.full_set()),
        }
    }
}

/// The filtered rows for the data table window, in subset order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsetTable {
    pub columns: Vec<String>,
    pub rows: Vec<ClientRecord>,
}

impl SubsetTable {
    /// Fails with EmptySubset when there is nothing to show.
    pub fn capture(state: &ApplicationState) -> HubResult<Self> {
        ensure_non_empty(state.subset(), "data table")?;
        Ok(Self {
            columns: RECORD_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: state.subset().to_vec(),
        })
    }
}
