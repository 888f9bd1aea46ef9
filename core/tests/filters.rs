use chrono::NaiveDate;
use clienthub_core::{
    config::HubConfig,
    filter::{
        apply_structured_filters, apply_text_query, region_options, reset, FilterCriteria,
        StructuredFilter,
    },
    record::{AgeBucket, ClientRecord, RiskLevel},
    store::RecordStore,
};
use std::collections::HashSet;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn default_clients() -> Vec<ClientRecord> {
    let dir = tempfile::tempdir().unwrap();
    let config = HubConfig::default_test(dir.path());
    RecordStore::load(&config).unwrap().records().to_vec()
}

fn client(id: u64, age: u32, region: &str, product: &str, risk_level: RiskLevel) -> ClientRecord {
    ClientRecord {
        id,
        name: format!("Клиент_{id}"),
        age,
        region: region.into(),
        income: 50_000,
        balance: 100_000,
        assets: 150_000.0,
        transactions: 10,
        product: product.into(),
        loyalty_years: 3,
        risk_level,
        last_activity: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    }
}

fn ids(records: &[ClientRecord]) -> Vec<u64> {
    records.iter().map(|r| r.id).collect()
}

fn is_subset_of(subset: &[ClientRecord], full: &[ClientRecord]) -> bool {
    let full_ids: HashSet<u64> = full.iter().map(|r| r.id).collect();
    subset.iter().all(|r| full_ids.contains(&r.id))
}

// ── Text query ───────────────────────────────────────────────────────────────

#[test]
fn high_risk_query_matches_only_high_risk_clients() {
    let clients = default_clients();
    let found = apply_text_query(&clients, "высокий");

    assert!(!found.is_empty(), "expected some high-risk clients in 100");
    for r in &found {
        let hit = [r.name.as_str(), r.region.as_str(), r.product.as_str(), r.risk_level.label()]
            .iter()
            .any(|f| f.to_lowercase().contains("высокий"));
        assert!(hit, "client {} does not contain the query", r.id);
    }
    let expected = clients
        .iter()
        .filter(|r| r.risk_level == RiskLevel::High)
        .count();
    assert_eq!(found.len(), expected);
}

#[test]
fn query_is_case_insensitive() {
    let clients = default_clients();
    assert_eq!(
        ids(&apply_text_query(&clients, "ВЫСОКИЙ")),
        ids(&apply_text_query(&clients, "высокий"))
    );
    assert_eq!(
        ids(&apply_text_query(&clients, "мОсКвА")),
        ids(&apply_text_query(&clients, "москва"))
    );
}

#[test]
fn empty_query_returns_full_set() {
    let clients = default_clients();
    assert_eq!(apply_text_query(&clients, ""), clients);
}

#[test]
fn query_matches_any_field() {
    let clients = vec![
        client(1, 30, "Москва", "Вклад", RiskLevel::Low),
        client(2, 40, "Казань", "Кредит", RiskLevel::Medium),
        client(3, 50, "Казань", "Вклад", RiskLevel::Low),
    ];
    assert_eq!(ids(&apply_text_query(&clients, "клиент_2")), vec![2]);
    assert_eq!(ids(&apply_text_query(&clients, "казань")), vec![2, 3]);
    assert_eq!(ids(&apply_text_query(&clients, "вклад")), vec![1, 3]);
    assert_eq!(ids(&apply_text_query(&clients, "средн")), vec![2]);
    assert!(apply_text_query(&clients, "новосибирск").is_empty());
}

// ── Structured filters ───────────────────────────────────────────────────────

#[test]
fn youngest_bucket_keeps_ages_18_to_30() {
    let clients = default_clients();
    let filter = StructuredFilter::from_labels(Some("18-30"), None, None).unwrap();
    let found = apply_structured_filters(&clients, &filter);

    assert!(!found.is_empty());
    assert!(found.iter().all(|r| (18..=30).contains(&r.age)));
    let expected = clients.iter().filter(|r| (18..=30).contains(&r.age)).count();
    assert_eq!(found.len(), expected);
}

#[test]
fn senior_bucket_keeps_ages_60_to_75() {
    let clients = default_clients();
    let filter = StructuredFilter::from_labels(Some("60+"), None, None).unwrap();
    let found = apply_structured_filters(&clients, &filter);

    assert!(!found.is_empty());
    assert!(found.iter().all(|r| (60..=75).contains(&r.age)));
}

#[test]
fn age_sixty_matches_both_neighbouring_buckets() {
    let clients = vec![
        client(1, 59, "Москва", "Вклад", RiskLevel::Low),
        client(2, 60, "Москва", "Вклад", RiskLevel::Low),
        client(3, 61, "Москва", "Вклад", RiskLevel::Low),
    ];
    let mature = StructuredFilter {
        age_bucket: Some(AgeBucket::Mature),
        ..Default::default()
    };
    let senior = StructuredFilter {
        age_bucket: Some(AgeBucket::Senior),
        ..Default::default()
    };
    assert_eq!(ids(&apply_structured_filters(&clients, &mature)), vec![1, 2]);
    assert_eq!(ids(&apply_structured_filters(&clients, &senior)), vec![2, 3]);
}

#[test]
fn active_constraints_are_anded() {
    let clients = vec![
        client(1, 25, "Москва", "Вклад", RiskLevel::Low),
        client(2, 25, "Москва", "Кредит", RiskLevel::Low),
        client(3, 25, "Казань", "Вклад", RiskLevel::Low),
        client(4, 50, "Москва", "Вклад", RiskLevel::Low),
    ];
    let filter = StructuredFilter::from_labels(Some("18-30"), Some("Москва"), Some("Вклад")).unwrap();
    assert_eq!(ids(&apply_structured_filters(&clients, &filter)), vec![1]);

    let region_only = StructuredFilter::from_labels(Some("Все"), Some("Москва"), Some("Все")).unwrap();
    assert_eq!(ids(&apply_structured_filters(&clients, &region_only)), vec![1, 2, 4]);
}

#[test]
fn any_sentinel_selects_everything() {
    let clients = default_clients();
    let filter = StructuredFilter::from_labels(Some("Все"), Some("Все"), Some("Все")).unwrap();
    assert!(!filter.is_active());
    assert_eq!(apply_structured_filters(&clients, &filter), clients);
}

#[test]
fn region_match_is_exact() {
    let clients = vec![
        client(1, 25, "Нижний Новгород", "Вклад", RiskLevel::Low),
        client(2, 25, "Новгород", "Вклад", RiskLevel::Low),
    ];
    let filter = StructuredFilter::from_labels(None, Some("Новгород"), None).unwrap();
    assert_eq!(ids(&apply_structured_filters(&clients, &filter)), vec![2]);
}

// ── Set properties ───────────────────────────────────────────────────────────

#[test]
fn filters_yield_subsets_and_are_idempotent() {
    let clients = default_clients();
    let filters = [
        StructuredFilter::from_labels(Some("31-45"), None, None).unwrap(),
        StructuredFilter::from_labels(None, Some("Казань"), None).unwrap(),
        StructuredFilter::from_labels(Some("46-60"), None, Some("Ипотека")).unwrap(),
    ];
    for filter in &filters {
        let once = apply_structured_filters(&clients, filter);
        assert!(is_subset_of(&once, &clients));
        assert_eq!(apply_structured_filters(&once, filter), once);
    }
    for query in ["москва", "клиент_1", "вклад", "низкий"] {
        let once = apply_text_query(&clients, query);
        assert!(is_subset_of(&once, &clients));
        assert_eq!(apply_text_query(&once, query), once);
    }
}

#[test]
fn reset_restores_full_set() {
    let clients = default_clients();
    let narrowed = apply_text_query(&clients, "высокий");
    assert!(narrowed.len() < clients.len());
    let restored = reset(&clients);
    assert_eq!(restored.len(), clients.len());
    assert_eq!(ids(&restored), ids(&clients));
}

#[test]
fn region_options_list_any_then_first_seen_order() {
    let clients = vec![
        client(1, 25, "Казань", "Вклад", RiskLevel::Low),
        client(2, 25, "Москва", "Вклад", RiskLevel::Low),
        client(3, 25, "Казань", "Вклад", RiskLevel::Low),
    ];
    assert_eq!(region_options(&clients), vec!["Все", "Казань", "Москва"]);
}

#[test]
fn criteria_match_query_and_selection_together() {
    let clients = vec![
        client(1, 25, "Москва", "Вклад", RiskLevel::High),
        client(2, 25, "Казань", "Вклад", RiskLevel::High),
        client(3, 25, "Москва", "Вклад", RiskLevel::Low),
    ];
    let criteria = FilterCriteria {
        query: "ВЫСОКИЙ".into(),
        structured: StructuredFilter {
            region: Some("Москва".into()),
            ..StructuredFilter::default()
        },
    };

    assert!(criteria.matches(&clients[0]));
    assert!(!criteria.matches(&clients[1]));
    assert!(!criteria.matches(&clients[2]));
    assert_eq!(ids(&criteria.apply(&clients)), vec![1]);
    assert_eq!(FilterCriteria::default().apply(&clients).len(), 3);
}
