//! Shared primitive types and fixed catalogs used across the hub.

/// Stable client identifier. Positive and unique within a record set.
pub type ClientId = u64;

/// Label the UI uses for "no constraint" in every dropdown.
pub const ANY_LABEL: &str = "Все";

pub const DEFAULT_REGIONS: [&str; 6] = [
    "Москва",
    "Санкт-Петербург",
    "Новосибирск",
    "Екатеринбург",
    "Казань",
    "Нижний Новгород",
];

pub const DEFAULT_PRODUCTS: [&str; 6] = [
    "Кредит",
    "Вклад",
    "Инвестиции",
    "Ипотека",
    "Страхование",
    "Дебетовая карта",
];
