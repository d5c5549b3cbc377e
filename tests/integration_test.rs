//! Integration tests for oaistat

mod common;

use common::*;
use oaistat::filters::UsageFilter;
use oaistat_core::aggregation_types::SortKey;
use oaistat_core::error::OaistatError;
use oaistat_core::provider::UsageSource;
use oaistat_core::timezone::TimezoneConfig;
use oaistat_core::types::PricingStatus;
use oaistat_pricing::PricingSnapshot;
use oaistat_terminal::output::{JsonFormatter, OutputFormatter, TableFormatter};
use std::io::Write;

#[test]
fn test_normalization_follows_rule_order() {
    let normalizer = SNAPSHOT.normalizer();
    let expected = [
        ("gpt-4o-2024-08-06", "gpt-4o-08-06"),
        ("gpt-4o-2024-05-13", "gpt-4o-05-13"),
        ("gpt-4o", "gpt-4o-05-13"),
        ("gpt-4o-mini-2024-07-18", "gpt-4o-mini"),
        ("gpt-4-turbo-2024-04-09", "gpt-4-turbo"),
        ("gpt-4-0613", "gpt-4"),
        ("gpt-3.5-turbo-0125", "gpt-3.5"),
        ("text-embedding-3-small", "text-embedding-3-small"),
        ("text-embedding-3-large", "text-embedding-3-large"),
        ("dall-e-3", "dall-e-3"),
        ("dall-e-3-hd", "dall-e-3-hd"),
        ("whisper-1", "whisper"),
        ("tts-1", "tts"),
        ("tts-1-hd", "tts-hd"),
        ("babbage-002", "other"),
        ("", "other"),
    ];

    for (raw, model) in expected {
        assert_eq!(normalizer.normalize(raw).as_str(), model, "raw id {raw:?}");
    }
}

#[test]
fn test_gpt4o_token_cost() {
    let record = UsageRecordBuilder::new()
        .with_model("gpt-4o-2024-08-06")
        .with_tokens(1000, 500)
        .build();

    let report = aggregator().report(vec![record]).unwrap();
    let row = &report.models[0];
    assert_eq!(row.model.as_str(), "gpt-4o-08-06");
    assert_eq!(row.pricing_status, PricingStatus::Priced);
    assert_close(row.total_cost, 0.0075);
}

#[test]
fn test_dalle_hd_per_request_cost() {
    let record = UsageRecordBuilder::new()
        .with_model("dall-e-3-hd")
        .with_requests(3)
        .build();

    let report = aggregator().report(vec![record]).unwrap();
    assert_close(report.models[0].total_cost, 0.24);
    assert_close(report.summary.total_cost, 0.24);
}

#[test]
fn test_whisper_span_and_daily_average() {
    let records = vec![
        UsageRecordBuilder::new()
            .with_model("whisper-1")
            .with_seconds(30.0)
            .with_timestamp(october(1))
            .build(),
        UsageRecordBuilder::new()
            .with_model("whisper-1")
            .with_seconds(90.0)
            .with_timestamp(october(3))
            .build(),
    ];

    let report = aggregator().report(records).unwrap();
    let row = &report.models[0];
    assert_eq!(row.model.as_str(), "whisper");
    assert_eq!(row.counters.seconds, 120.0);
    assert_eq!(row.active_days, 3);
    assert_close(row.total_cost, 0.012);
    assert_close(row.daily_average_cost, 0.004);
    assert_eq!(report.summary.active_days, 3);
}

#[test]
fn test_unmatched_model_is_other_at_zero_cost() {
    let record = UsageRecordBuilder::new()
        .with_model("davinci-002")
        .with_tokens(50_000, 50_000)
        .build();

    let report = aggregator().report(vec![record]).unwrap();
    let row = &report.models[0];
    assert!(row.model.is_other());
    assert_eq!(row.total_cost, 0.0);
    assert_eq!(row.pricing_status, PricingStatus::Unrecognized);
    assert_eq!(report.unpriced_models().count(), 1);
}

#[test]
fn test_single_day_averages_equal_totals() {
    let record = UsageRecordBuilder::new()
        .with_model("gpt-4-0613")
        .with_requests(4)
        .with_tokens(2000, 1000)
        .build();

    let report = aggregator().report(vec![record]).unwrap();
    let summary = &report.summary;
    assert_eq!(summary.active_days, 1);
    assert_eq!(summary.daily_average_calls, summary.total_calls as f64);
    assert_close(summary.daily_average_cost, summary.total_cost);
    assert_close(summary.total_cost, 2.0 * 0.030 + 1.0 * 0.060);
}

#[test]
fn test_request_conservation_across_models() {
    let records: Vec<_> = TEST_MODELS
        .iter()
        .enumerate()
        .map(|(i, model)| {
            UsageRecordBuilder::new()
                .with_model(model)
                .with_requests(i as u64 + 1)
                .with_timestamp(october(1 + (i as u32 % 5)))
                .build()
        })
        .collect();
    let expected: u64 = records.iter().map(|r| r.counters.requests).sum();

    let report = aggregator().report(records).unwrap();
    let per_model: u64 = report.models.iter().map(|m| m.counters.requests).sum();
    assert_eq!(per_model, expected);
    assert_eq!(report.summary.total_calls, expected);
    assert_eq!(report.summary.active_days, 5);
}

#[test]
fn test_filter_to_nothing_is_empty_input() {
    let records = vec![UsageRecordBuilder::new().with_timestamp(october(1)).build()];
    let filtered = UsageFilter::new().with_since(date(2)).apply(records);

    let result = aggregator().report(filtered);
    assert!(matches!(result, Err(OaistatError::EmptyInput)));
}

#[test]
fn test_sort_by_cost() {
    let records = vec![
        UsageRecordBuilder::new()
            .with_model("gpt-3.5-turbo")
            .with_tokens(1000, 0)
            .build(),
        UsageRecordBuilder::new()
            .with_model("gpt-4-0613")
            .with_tokens(1000, 0)
            .build(),
        UsageRecordBuilder::new().with_model("babbage-002").build(),
    ];

    let mut report = aggregator().report(records).unwrap();
    report.sort_models(SortKey::Cost);
    let order: Vec<_> = report.models.iter().map(|m| m.model.as_str()).collect();
    assert_eq!(order, ["gpt-4", "gpt-3.5", "other"]);
}

#[test]
fn test_local_timezone_span() {
    // 23:00 UTC on Oct 1 and 01:00 UTC on Oct 2 are both Oct 2 in Tokyo
    let records = vec![
        UsageRecordBuilder::new()
            .with_timestamp(october(1) + chrono::Duration::hours(23))
            .build(),
        UsageRecordBuilder::new()
            .with_timestamp(october(2) + chrono::Duration::hours(1))
            .build(),
    ];

    let utc = aggregator().report(records.clone()).unwrap();
    assert_eq!(utc.summary.active_days, 2);

    let tokyo = TimezoneConfig::from_cli(Some("Asia/Tokyo")).unwrap();
    let report = aggregator_with_tz(tokyo).report(records).unwrap();
    assert_eq!(report.summary.active_days, 1);
    assert_eq!(report.summary.span.start.inner(), &date(2));
}

#[tokio::test]
async fn test_csv_file_end_to_end() {
    let file = csv_file(&[
        "gpt-4o-2024-08-06,1000,500,1,0,0,1727740800",
        "tts-1-hd,0,0,2,1000,0,1727827200",
        "whisper-1,0,0,1,0,60,1727913600",
        "ada-legacy,10,10,1,0,0,1727913600",
    ]);

    let records = oaistat_provider_csv::DataLoader::new(file.path())
        .load_all()
        .await
        .unwrap();
    assert_eq!(records.len(), 4);

    let report = aggregator().report(records).unwrap();
    assert_eq!(report.summary.total_calls, 5);
    assert_eq!(report.summary.active_days, 3);

    let tts_hd = report
        .models
        .iter()
        .find(|m| m.model.as_str() == "tts-hd")
        .unwrap();
    assert_close(tts_hd.total_cost, 0.03);

    // 0.0075 + 0.03 + 0.006
    assert_close(report.summary.total_cost, 0.0435);

    let table = TableFormatter::new(false).format_report(&report);
    assert!(table.contains("Total calls: 5"));
    assert!(table.contains("Total cost: $0.04"));
    assert!(table.contains("unrecognized"));

    let json: serde_json::Value =
        serde_json::from_str(&JsonFormatter.format_report(&report)).unwrap();
    assert_eq!(json["summary"]["total_calls"], 5);
    assert_eq!(json["models"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_custom_snapshot_changes_prices() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "version": "2025-01-01",
            "rules": [{{ "all_of": ["GPT-4O"], "model": "gpt-4o", "case_insensitive": true }}],
            "models": {{ "gpt-4o": {{ "scheme": "token_based", "input": 0.001, "output": 0.002 }} }}
        }}"#
    )
    .unwrap();

    let snapshot = PricingSnapshot::load(Some(file.path())).await.unwrap();
    let (normalizer, table) = snapshot.into_parts();
    let aggregator = oaistat::aggregation::Aggregator::new(
        normalizer,
        std::sync::Arc::new(oaistat_pricing::CostCalculator::new(std::sync::Arc::new(table))),
        TimezoneConfig::default(),
    );

    let records = vec![
        UsageRecordBuilder::new()
            .with_model("gpt-4o-2024-08-06")
            .with_tokens(1000, 1000)
            .build(),
        UsageRecordBuilder::new().with_model("tts-1").build(),
    ];
    let report = aggregator.report(records).unwrap();

    assert_eq!(report.pricing_version, "2025-01-01");
    assert_close(report.models[0].total_cost, 0.003);
    // tts is not in this snapshot's ruleset
    assert!(report.models[1].model.is_other());
}

#[test]
fn test_row_counters_are_field_sums() {
    let a = UsageRecordBuilder::new()
        .with_model("tts-1-hd")
        .with_requests(2)
        .with_tokens(10, 20)
        .with_characters(1_500)
        .with_seconds(12.5)
        .with_timestamp(october(1))
        .build();
    let b = UsageRecordBuilder::new()
        .with_model("tts-1-hd")
        .with_requests(3)
        .with_tokens(5, 7)
        .with_characters(500)
        .with_seconds(7.5)
        .with_timestamp(october(2))
        .build();
    let expected = a.counters + b.counters;

    let report = aggregator().report(vec![a, b]).unwrap();
    assert_eq!(report.models.len(), 1);
    let row = &report.models[0];
    assert_eq!(row.model.as_str(), "tts-hd");
    assert_eq!(row.counters, expected);
    assert_eq!(row.counters.characters, 2_000);
    assert_eq!(row.counters.seconds, 20.0);
    assert_close(row.total_cost, 2_000.0 * 0.00003);
}

#[tokio::test]
async fn test_csv_counts_at_u64_limit_saturate() {
    let file = csv_file(&[
        "text-embedding-3-small,18446744073709551615,0,1,0,0,1727740800",
        "text-embedding-3-small,5,0,1,0,0,1727827200",
    ]);

    let records = oaistat_provider_csv::DataLoader::new(file.path())
        .load_all()
        .await
        .unwrap();
    assert_eq!(records[0].counters.context_tokens, u64::MAX);

    let report = aggregator().report(records).unwrap();
    let row = &report.models[0];
    assert_eq!(row.counters.context_tokens, u64::MAX);
    assert_eq!(row.counters.requests, 2);
    assert!(row.total_cost.is_finite());
    assert!(row.total_cost >= 0.0);
    assert!(report.summary.total_cost.is_finite());
}
