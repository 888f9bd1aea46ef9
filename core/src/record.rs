//! The client record and its categorical attributes.

use crate::{
    error::{HubError, HubResult},
    types::{ClientId, ANY_LABEL},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Column order of the persisted record file. Must match the field order
/// of ClientRecord, since the CSV writer derives its header from it.
pub const RECORD_COLUMNS: [&str; 12] = [
    "id",
    "name",
    "age",
    "region",
    "income",
    "balance",
    "assets",
    "transactions",
    "product",
    "loyalty_years",
    "risk_level",
    "last_activity",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub name: String,
    pub age: u32,
    pub region: String,
    pub income: u64,
    pub balance: u64,
    pub assets: f64,
    pub transactions: u64,
    pub product: String,
    pub loyalty_years: u32,
    pub risk_level: RiskLevel,
    pub last_activity: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Низкий")]
    Low,
    #[serde(rename = "Средний")]
    Medium,
    #[serde(rename = "Высокий")]
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::Low, Self::Medium, Self::High];

    /// Relative sampling frequencies at generation time, aligned with ALL.
    pub const GENERATION_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Низкий",
            Self::Medium => "Средний",
            Self::High => "Высокий",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named age ranges shared by the structured filter and the demographic
/// binning. The two uses disagree at the edges:
///
/// | bucket | filter (inclusive) | binning (left-open) |
/// |--------|--------------------|---------------------|
/// | 18-30  | 18..=30            | (18, 30]            |
/// | 31-45  | 31..=45            | (30, 45]            |
/// | 46-60  | 46..=60            | (45, 60]            |
/// | 60+    | 60..=75            | (60, 75]            |
///
/// Age 60 therefore passes both the "46-60" and "60+" filters, and age 18
/// falls outside every bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    #[serde(rename = "18-30")]
    Young,
    #[serde(rename = "31-45")]
    Adult,
    #[serde(rename = "46-60")]
    Mature,
    #[serde(rename = "60+")]
    Senior,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [Self::Young, Self::Adult, Self::Mature, Self::Senior];

    /// Bin edges for the demographic breakdown.
    pub const BIN_EDGES: [u32; 5] = [18, 30, 45, 60, 75];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Young => "18-30",
            Self::Adult => "31-45",
            Self::Mature => "46-60",
            Self::Senior => "60+",
        }
    }

    /// Inclusive age range used by the structured filter.
    pub fn filter_range(&self) -> (u32, u32) {
        match self {
            Self::Young => (18, 30),
            Self::Adult => (31, 45),
            Self::Mature => (46, 60),
            Self::Senior => (60, 75),
        }
    }

    pub fn admits(&self, age: u32) -> bool {
        let (low, high) = self.filter_range();
        (low..=high).contains(&age)
    }

    /// Left-open, right-closed binning over BIN_EDGES.
    pub fn bin(age: u32) -> Option<AgeBucket> {
        Self::BIN_EDGES
            .windows(2)
            .position(|edge| age > edge[0] && age <= edge[1])
            .map(|i| Self::ALL[i])
    }

    /// Parse a dropdown label. The "any" sentinel yields None.
    pub fn parse_selection(label: &str) -> HubResult<Option<AgeBucket>> {
        if label == ANY_LABEL {
            return Ok(None);
        }
        label.parse().map(Some)
    }
}

impl FromStr for AgeBucket {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.label() == s)
            .ok_or_else(|| HubError::UnknownAgeBucket { label: s.to_string() })
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
