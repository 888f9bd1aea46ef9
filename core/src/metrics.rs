//! Aggregation engine: the fixed metrics table over a subset.
//!
//! Groups:
//!   1. Financial    (balances, income, assets, transaction volume)
//!   2. Demographic  (age statistics, age bins, top regions)
//!   3. Portfolio    (product and risk mix, loyalty)
//!
//! Every function refuses an empty subset with EmptySubset rather than
//! producing NaN means or an empty mode.

use crate::{
    error::{HubError, HubResult},
    record::{AgeBucket, ClientRecord},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, hash::Hash};

/// Balance above which a client counts as premium.
pub const PREMIUM_BALANCE_THRESHOLD: u64 = 1_000_000;
pub const TOP_REGION_COUNT: usize = 3;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub financial: FinancialMetrics,
    pub demographic: DemographicMetrics,
    pub portfolio: PortfolioMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub total_balance: u64,
    pub mean_income: f64,
    pub mean_balance: f64,
    pub premium_clients: usize,
    pub total_assets: f64,
    pub total_transactions: u64,
    pub client_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicMetrics {
    pub mean_age: f64,
    pub median_age: f64,
    pub min_age: u32,
    pub max_age: u32,
    /// All four bins in bin order, including empty ones.
    pub age_distribution: Vec<BucketCount>,
    pub top_regions: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub products: Vec<CategoryCount>,
    pub risk_levels: Vec<CategoryCount>,
    pub mean_loyalty_years: f64,
    pub max_loyalty_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: AgeBucket,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    /// Percentage of the subset, 0 to 100.
    pub share_pct: f64,
}

// ── Counting helpers ─────────────────────────────────────────────────────────

/// Occurrence counts ordered by descending count. Ties keep the order in
/// which values were first seen.
pub fn value_counts<K, I>(values: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut counts: Vec<(K, usize)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    // sort_by is stable, which is what gives first-seen tie order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Most frequent value, ties broken by first occurrence.
pub fn mode<K, I>(values: I) -> Option<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    value_counts(values).into_iter().next().map(|(k, _)| k)
}

pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn median(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    })
}

/// Count per bin for all four bins. Ages outside every bin are skipped.
pub fn age_distribution(subset: &[ClientRecord]) -> Vec<BucketCount> {
    AgeBucket::ALL
        .iter()
        .map(|&bucket| BucketCount {
            bucket,
            count: subset
                .iter()
                .filter(|r| AgeBucket::bin(r.age) == Some(bucket))
                .count(),
        })
        .collect()
}

fn category_counts<'a, I>(values: I, total: usize) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a str>,
{
    value_counts(values)
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
            share_pct: count as f64 / total as f64 * 100.0,
        })
        .collect()
}

pub(crate) fn ensure_non_empty(subset: &[ClientRecord], operation: &'static str) -> HubResult<()> {
    if subset.is_empty() {
        return Err(HubError::EmptySubset { operation });
    }
    Ok(())
}

// ── Aggregation ──────────────────────────────────────────────────────────────

pub fn aggregate(subset: &[ClientRecord]) -> HubResult<Metrics> {
    ensure_non_empty(subset, "aggregate")?;
    Ok(Metrics {
        financial: financial(subset)?,
        demographic: demographic(subset)?,
        portfolio: portfolio(subset)?,
    })
}

pub fn financial(subset: &[ClientRecord]) -> HubResult<FinancialMetrics> {
    ensure_non_empty(subset, "financial metrics")?;
    let n = subset.len() as f64;
    let total_balance: u64 = subset.iter().map(|r| r.balance).sum();
    let total_income: u64 = subset.iter().map(|r| r.income).sum();

    Ok(FinancialMetrics {
        total_balance,
        mean_income: total_income as f64 / n,
        mean_balance: total_balance as f64 / n,
        premium_clients: count_premium(subset),
        total_assets: subset.iter().map(|r| r.assets).sum(),
        total_transactions: subset.iter().map(|r| r.transactions).sum(),
        client_count: subset.len(),
    })
}

pub fn demographic(subset: &[ClientRecord]) -> HubResult<DemographicMetrics> {
    ensure_non_empty(subset, "demographic metrics")?;
    let ages: Vec<u32> = subset.iter().map(|r| r.age).collect();
    let empty = || HubError::EmptySubset {
        operation: "demographic metrics",
    };

    Ok(DemographicMetrics {
        mean_age: mean(ages.iter().map(|&a| a as f64)).ok_or_else(empty)?,
        median_age: median(&ages).ok_or_else(empty)?,
        min_age: ages.iter().copied().min().ok_or_else(empty)?,
        max_age: ages.iter().copied().max().ok_or_else(empty)?,
        age_distribution: age_distribution(subset),
        top_regions: category_counts(subset.iter().map(|r| r.region.as_str()), subset.len())
            .into_iter()
            .take(TOP_REGION_COUNT)
            .collect(),
    })
}

pub fn portfolio(subset: &[ClientRecord]) -> HubResult<PortfolioMetrics> {
    ensure_non_empty(subset, "portfolio metrics")?;
    let n = subset.len();

    Ok(PortfolioMetrics {
        products: category_counts(subset.iter().map(|r| r.product.as_str()), n),
        risk_levels: category_counts(subset.iter().map(|r| r.risk_level.label()), n),
        mean_loyalty_years: subset.iter().map(|r| r.loyalty_years as f64).sum::<f64>() / n as f64,
        max_loyalty_years: subset.iter().map(|r| r.loyalty_years).max().unwrap_or_default(),
    })
}

pub fn count_premium(subset: &[ClientRecord]) -> usize {
    subset
        .iter()
        .filter(|r| r.balance > PREMIUM_BALANCE_THRESHOLD)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_counts_breaks_ties_by_first_seen() {
        let counts = value_counts(["b", "a", "a", "b", "c"]);
        assert_eq!(counts, vec![("b", 2), ("a", 2), ("c", 1)]);
        assert_eq!(mode(["x", "y", "y", "x"]), Some("x"));
        assert_eq!(mode(Vec::<&str>::new()), None);
    }

    #[test]
    fn median_handles_even_and_odd() {
        assert_eq!(median(&[3, 1, 2]), Some(2.0));
        assert_eq!(median(&[4, 1, 3, 2]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([1.0, 2.0, 6.0]), Some(3.0));
    }
}
