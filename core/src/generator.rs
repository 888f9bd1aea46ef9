//! Synthetic client population.
//!
//! Numeric attributes and categorical attributes are drawn from two
//! separate streams, so changing how one is sampled leaves the other
//! untouched. Draw order within each stream is fixed per record:
//!
//!   numeric:     age, income, balance factor, assets factor,
//!                transactions, loyalty
//!   categorical: region, product, risk level, month, day

use crate::{
    config::HubConfig,
    error::{HubError, HubResult},
    record::{ClientRecord, RiskLevel},
    rng::{RngBank, StreamRng, StreamSlot},
};
use chrono::NaiveDate;

pub const AGE_MEAN: f64 = 45.0;
pub const AGE_STD: f64 = 15.0;
pub const AGE_MIN: u32 = 18;
pub const AGE_MAX: u32 = 75;

pub const INCOME_LOG_MEAN: f64 = 11.0;
pub const INCOME_LOG_STD: f64 = 0.5;
pub const INCOME_MIN: f64 = 20_000.0;
pub const INCOME_MAX: f64 = 500_000.0;

pub const BALANCE_FLOOR: u64 = 5_000;
pub const TRANSACTIONS_MEAN: f64 = 15.0;
/// Exclusive upper bound.
pub const LOYALTY_YEARS_MAX: i64 = 25;
pub const ACTIVITY_YEAR: i32 = 2024;

pub struct ClientGenerator<'a> {
    config: &'a HubConfig,
    numeric: StreamRng,
    categorical: StreamRng,
}

impl<'a> ClientGenerator<'a> {
    pub fn new(config: &'a HubConfig) -> Self {
        let bank = RngBank::new(config.seed);
        Self {
            config,
            numeric: bank.for_stream(StreamSlot::Numeric),
            categorical: bank.for_stream(StreamSlot::Categorical),
        }
    }

    /// Generate `config.record_count` clients with ids 1..=n.
    pub fn generate(mut self) -> HubResult<Vec<ClientRecord>> {
        let n = self.config.record_count;
        if n == 0 {
            return Err(HubError::DataUnavailable {
                reason: "record_count is 0".into(),
            });
        }
        if self.config.regions.is_empty() || self.config.products.is_empty() {
            return Err(HubError::DataUnavailable {
                reason: "region or product catalog is empty".into(),
            });
        }

        let mut clients = Vec::with_capacity(n);
        for i in 0..n {
            clients.push(self.next_client(i as u64 + 1)?);
        }
        log::info!(
            "generated {n} clients (seed={}, streams={}/{})",
            self.config.seed,
            self.numeric.name,
            self.categorical.name
        );
        Ok(clients)
    }

    fn next_client(&mut self, id: u64) -> HubResult<ClientRecord> {
        let rng = &mut self.numeric;
        let age = rng
            .normal(AGE_MEAN, AGE_STD)
            .clamp(AGE_MIN as f64, AGE_MAX as f64) as u32;
        let income = rng
            .log_normal(INCOME_LOG_MEAN, INCOME_LOG_STD)
            .clamp(INCOME_MIN, INCOME_MAX) as u64;
        let balance = BALANCE_FLOOR.max((income as f64 * rng.uniform(0.5, 12.0)) as u64);
        let assets = balance as f64 * rng.uniform(0.5, 3.0);
        let transactions = rng.poisson(TRANSACTIONS_MEAN);
        let loyalty_years = rng.int_inclusive(0, LOYALTY_YEARS_MAX - 1) as u32;

        let rng = &mut self.categorical;
        let region = pick(rng, &self.config.regions)?;
        let product = pick(rng, &self.config.products)?;
        let risk_level = rng
            .weighted_index(&RiskLevel::GENERATION_WEIGHTS)
            .map(|i| RiskLevel::ALL[i])
            .unwrap_or(RiskLevel::Low);
        let month = rng.int_inclusive(1, 12) as u32;
        let day = rng.int_inclusive(1, 28) as u32;
        let last_activity = NaiveDate::from_ymd_opt(ACTIVITY_YEAR, month, day).ok_or_else(|| {
            HubError::DataUnavailable {
                reason: format!("invalid activity date {ACTIVITY_YEAR}-{month}-{day}"),
            }
        })?;

        Ok(ClientRecord {
            id,
            name: format!("Клиент_{id}"),
            age,
            region,
            income,
            balance,
            assets,
            transactions,
            product,
            loyalty_years,
            risk_level,
            last_activity,
        })
    }
}

fn pick(rng: &mut StreamRng, catalog: &[String]) -> HubResult<String> {
    rng.choose(catalog)
        .cloned()
        .ok_or_else(|| HubError::DataUnavailable {
            reason: "empty catalog".into(),
        })
}
