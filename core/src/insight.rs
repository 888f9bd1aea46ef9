//! Rule-based insights, recommendations and balance forecasts.
//!
//! Nothing here is a learned model. Each rule is a fixed threshold or a
//! mode over the subset, evaluated in a fixed order.

use crate::{
    error::HubResult,
    metrics::{count_premium, ensure_non_empty, mean, mode},
    record::{AgeBucket, ClientRecord, RiskLevel},
    rng::{RngBank, StreamSlot},
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const HIGH_INCOME_THRESHOLD: u64 = 150_000;
/// Clients with fewer transactions than this are considered inactive.
pub const LOW_ACTIVITY_TRANSACTIONS: u64 = 5;
pub const FORECAST_GROWTH_MIN: f64 = 1.02;
pub const FORECAST_GROWTH_MAX: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    DominantAgeGroup { bucket: AgeBucket },
    HighIncomeClients { count: usize },
    PopularProduct { product: String },
    TopRegion { region: String },
    AverageLoyalty { years: f64 },
    PrevailingRisk { risk_level: RiskLevel },
    AverageTransactions { count: f64 },
    TotalBalance { amount: u64 },
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DominantAgeGroup { bucket } => {
                write!(f, "👥 Преобладающая возрастная группа: {bucket}")
            }
            Self::HighIncomeClients { count } => {
                write!(f, "💎 Клиентов с доходом >150k ₽: {count}")
            }
            Self::PopularProduct { product } => write!(f, "🏆 Самый популярный продукт: {product}"),
            Self::TopRegion { region } => write!(f, "🌍 Наиболее активный регион: {region}"),
            Self::AverageLoyalty { years } => write!(f, "⭐ Средняя лояльность: {years:.1} лет"),
            Self::PrevailingRisk { risk_level } => {
                write!(f, "⚖️ Преобладающий уровень риска: {risk_level}")
            }
            Self::AverageTransactions { count } => {
                write!(f, "💳 Среднее количество транзакций: {count:.1}")
            }
            Self::TotalBalance { amount } => {
                write!(f, "💰 Общий баланс клиентов: {} ₽", group_thousands(*amount))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    PremiumOffer { count: usize },
    ReengagementCampaign { count: usize },
    PromoteProduct { product: String },
    RiskMonitoring { count: usize },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PremiumOffer { count } => write!(
                f,
                "💼 Рассмотреть персонализированные предложения для {count} премиум клиентов"
            ),
            Self::ReengagementCampaign { count } => write!(
                f,
                "📉 Активировать маркетинговую кампанию для {count} малоактивных клиентов"
            ),
            Self::PromoteProduct { product } => write!(
                f,
                "🏆 Продвигать продукт '{product}' в регионах с высокой концентрацией клиентов"
            ),
            Self::RiskMonitoring { count } => {
                write!(f, "⚖️ Мониторинг рисков для {count} клиентов с высоким риском")
            }
        }
    }
}

/// Observations in fixed order. The age-group line is left out when no
/// client falls inside an age bin (every age is exactly 18).
pub fn insights(subset: &[ClientRecord]) -> HubResult<Vec<Insight>> {
    ensure_non_empty(subset, "insights")?;
    let mut out = Vec::with_capacity(8);

    if let Some(bucket) = mode(subset.iter().filter_map(|r| AgeBucket::bin(r.age))) {
        out.push(Insight::DominantAgeGroup { bucket });
    }

    let high_income = subset
        .iter()
        .filter(|r| r.income > HIGH_INCOME_THRESHOLD)
        .count();
    if high_income > 0 {
        out.push(Insight::HighIncomeClients { count: high_income });
    }

    if let Some(product) = mode(subset.iter().map(|r| r.product.as_str())) {
        out.push(Insight::PopularProduct {
            product: product.to_string(),
        });
    }
    if let Some(region) = mode(subset.iter().map(|r| r.region.as_str())) {
        out.push(Insight::TopRegion {
            region: region.to_string(),
        });
    }
    if let Some(years) = mean(subset.iter().map(|r| r.loyalty_years as f64)) {
        out.push(Insight::AverageLoyalty { years });
    }
    if let Some(risk_level) = mode(subset.iter().map(|r| r.risk_level)) {
        out.push(Insight::PrevailingRisk { risk_level });
    }
    if let Some(count) = mean(subset.iter().map(|r| r.transactions as f64)) {
        out.push(Insight::AverageTransactions { count });
    }
    out.push(Insight::TotalBalance {
        amount: subset.iter().map(|r| r.balance).sum(),
    });

    Ok(out)
}

/// Suggested actions in fixed order. Product promotion is always present.
pub fn recommendations(subset: &[ClientRecord]) -> HubResult<Vec<Recommendation>> {
    ensure_non_empty(subset, "recommendations")?;
    let mut out = Vec::with_capacity(4);

    let premium = count_premium(subset);
    if premium > 0 {
        out.push(Recommendation::PremiumOffer { count: premium });
    }

    let inactive = subset
        .iter()
        .filter(|r| r.transactions < LOW_ACTIVITY_TRANSACTIONS)
        .count();
    if inactive > 0 {
        out.push(Recommendation::ReengagementCampaign { count: inactive });
    }

    if let Some(product) = mode(subset.iter().map(|r| r.product.as_str())) {
        out.push(Recommendation::PromoteProduct {
            product: product.to_string(),
        });
    }

    let high_risk = subset
        .iter()
        .filter(|r| r.risk_level == RiskLevel::High)
        .count();
    if high_risk > 0 {
        out.push(Recommendation::RiskMonitoring { count: high_risk });
    }

    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceForecast {
    pub name: String,
    pub region: String,
    pub current_balance: u64,
    pub predicted_balance: f64,
}

impl fmt::Display for BalanceForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - прогноз баланса: {} ₽",
            self.name,
            self.region,
            group_thousands(self.predicted_balance.round() as u64)
        )
    }
}

/// Growth-factor forecast for the first `limit` clients of the subset.
/// The factor stream is reseeded per call, so the same subset always
/// gets the same forecast.
pub fn forecasts(subset: &[ClientRecord], seed: u64, limit: usize) -> HubResult<Vec<BalanceForecast>> {
    ensure_non_empty(subset, "forecasts")?;
    let mut rng = RngBank::new(seed).for_stream(StreamSlot::Forecast);

    Ok(subset
        .iter()
        .take(limit)
        .map(|r| BalanceForecast {
            name: r.name.clone(),
            region: r.region.clone(),
            current_balance: r.balance,
            predicted_balance: r.balance as f64
                * rng.uniform(FORECAST_GROWTH_MIN, FORECAST_GROWTH_MAX),
        })
        .collect())
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
