//! The dashboard pipeline: Filter → Aggregate → Insight.
//!
//! RULES:
//!   - ApplicationState is never mutated. apply() returns the next state.
//!   - The full record set is shared, never copied or edited.
//!   - Every event recomputes the whole derived view; nothing is patched.
//!   - An empty subset yields a view with no analysis, never an error.

use crate::{
    command::HubEvent,
    error::{HubError, HubResult},
    filter::{self, FilterCriteria, FilterMode, StructuredFilter},
    insight::{insights, recommendations},
    metrics::{aggregate, Metrics},
    record::ClientRecord,
    store::RecordStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const STATUS_READY: &str = "Готово";
pub const STATUS_RESET: &str = "Фильтры сброшены";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub metrics: Metrics,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Analysis {
    pub fn compute(subset: &[ClientRecord]) -> HubResult<Self> {
        Ok(Self {
            metrics: aggregate(subset)?,
            insights: insights(subset)?.iter().map(ToString::to_string).collect(),
            recommendations: recommendations(subset)?
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView {
    pub subset: Vec<ClientRecord>,
    /// None when the subset is empty.
    pub analysis: Option<Analysis>,
    pub status: String,
}

impl DerivedView {
    pub fn build(subset: Vec<ClientRecord>, status: String) -> HubResult<Self> {
        let analysis = match Analysis::compute(&subset) {
            Ok(analysis) => Some(analysis),
            Err(HubError::EmptySubset { .. }) => None,
            Err(e) => return Err(e),
        };
        Ok(Self {
            subset,
            analysis,
            status,
        })
    }

    pub fn has_data(&self) -> bool {
        self.analysis.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationState {
    full_set: Arc<[ClientRecord]>,
    pub mode: FilterMode,
    pub criteria: FilterCriteria,
    pub view: DerivedView,
}

impl ApplicationState {
    /// Initial state: no filter, the view covers the full set.
    pub fn new(store: &RecordStore, mode: FilterMode) -> HubResult<Self> {
        let full_set = store.shared();
        let view = DerivedView::build(filter::reset(&full_set), STATUS_READY.to_string())?;
        Ok(Self {
            full_set,
            mode,
            criteria: FilterCriteria::default(),
            view,
        })
    }

    pub fn full_set(&self) -> &[ClientRecord] {
        &self.full_set
    }

    pub fn subset(&self) -> &[ClientRecord] {
        &self.view.subset
    }

    /// Run the pipeline for one event and return the resulting state.
    pub fn apply(&self, event: &HubEvent) -> HubResult<Self> {
        let (criteria, subset, status) = match event {
            HubEvent::Search { query } => {
                let criteria = FilterCriteria {
                    query: query.clone(),
                    structured: self.kept_structured(),
                };
                let subset = match self.mode {
                    FilterMode::Exclusive => filter::apply_text_query(&self.full_set, query),
                    FilterMode::Composed => criteria.apply(&self.full_set),
                };
                let status = format!("Найдено клиентов: {}", subset.len());
                (criteria, subset, status)
            }
            HubEvent::ApplyFilters {
                age,
                region,
                product,
            } => {
                let structured = StructuredFilter::from_labels(
                    age.as_deref(),
                    region.as_deref(),
                    product.as_deref(),
                )?;
                let criteria = FilterCriteria {
                    query: self.kept_query(),
                    structured,
                };
                let subset = match self.mode {
                    FilterMode::Exclusive => {
                        filter::apply_structured_filters(&self.full_set, &criteria.structured)
                    }
                    FilterMode::Composed => criteria.apply(&self.full_set),
                };
                let status = format!("Отфильтровано клиентов: {}", subset.len());
                (criteria, subset, status)
            }
            HubEvent::Reset => (
                FilterCriteria::default(),
                filter::reset(&self.full_set),
                STATUS_RESET.to_string(),
            ),
        };

        log::debug!(
            "{}: {} of {} clients ({:?} mode)",
            event.name(),
            subset.len(),
            self.full_set.len(),
            self.mode
        );

        Ok(Self {
            full_set: Arc::clone(&self.full_set),
            mode: self.mode,
            criteria,
            view: DerivedView::build(subset, status)?,
        })
    }

    fn kept_structured(&self) -> StructuredFilter {
        match self.mode {
            FilterMode::Exclusive => StructuredFilter::default(),
            FilterMode::Composed => self.criteria.structured.clone(),
        }
    }

    fn kept_query(&self) -> String {
        match self.mode {
            FilterMode::Exclusive => String::new(),
            FilterMode::Composed => self.criteria.query.clone(),
        }
    }
}
