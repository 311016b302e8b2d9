use polars::prelude::*;

use provstat_core::aggregate::{aggregate, Reducer};
use provstat_core::filters::{filter_by_year, filter_province_level, parse_year};
use provstat_core::join::join;
use provstat_core::ranking::{rank_all, top_n};
use provstat_core::series::{national_comparison, pair_series, time_series, SeriesPoint};
use provstat_core::{BoundaryTable, MetricTable, PipelineError};

fn square(x: f64, y: f64) -> String {
    format!(
        r#"{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y1}],[{x},{y}]]]}}"#,
        x1 = x + 2.0,
        y1 = y + 2.0,
    )
}

fn boundaries(codes: &[&str]) -> BoundaryTable {
    let names: Vec<String> = codes.iter().map(|code| format!("Provinsi {code}")).collect();
    let geometry: Vec<String> = (0..codes.len()).map(|idx| square(idx as f64 * 3.0, 0.0)).collect();
    let raw = df![
        "region_code" => codes,
        "region_name" => names,
        "geometry" => geometry,
    ]
    .expect("boundary df");
    BoundaryTable::from_frame(&raw).expect("boundary table")
}

fn metrics(rows: &[(&str, &str, i64, Option<f64>)]) -> MetricTable {
    let raw = df![
        "region_code" => rows.iter().map(|row| row.0).collect::<Vec<_>>(),
        "region_name" => rows.iter().map(|row| row.1).collect::<Vec<_>>(),
        "year" => rows.iter().map(|row| row.2).collect::<Vec<_>>(),
        "value" => rows.iter().map(|row| row.3).collect::<Vec<_>>(),
    ]
    .expect("metric df");
    MetricTable::from_frame(&raw).expect("metric table")
}

fn province_fixture() -> MetricTable {
    metrics(&[
        ("1100", "Aceh", 2022, Some(72.0)),
        ("1200", "Sumatera Utara", 2022, Some(72.7)),
        ("1100", "Aceh", 2023, Some(72.8)),
        ("1200", "Sumatera Utara", 2023, Some(73.1)),
        ("1300", "Sumatera Barat", 2023, Some(73.3)),
        ("1400", "Riau", 2023, Some(74.0)),
        ("1500", "Jambi", 2023, Some(72.1)),
        ("1600", "Sumatera Selatan", 2023, Some(71.9)),
        ("1700", "Bengkulu", 2023, Some(72.2)),
        ("1101", "Simeulue", 2023, Some(80.0)),
    ])
}

#[test]
fn filter_by_year_keeps_only_matching_rows() {
    let table = province_fixture();

    let filtered = filter_by_year(&table, 2023).expect("filter");
    assert_eq!(filtered.height(), 8);
    assert!(filtered
        .records()
        .expect("records")
        .iter()
        .all(|record| record.year == 2023));

    let absent = filter_by_year(&table, 1999).expect("filter");
    assert!(absent.is_empty());
}

#[test]
fn filter_province_level_drops_sub_regions() {
    let provinces = filter_province_level(&province_fixture()).expect("filter");
    assert!(provinces
        .records()
        .expect("records")
        .iter()
        .all(|record| record.region_code.ends_with("00")));
    assert_eq!(provinces.height(), 9);
}

#[test]
fn parse_year_rejects_non_numeric_input() {
    assert_eq!(parse_year(" 2023 ").expect("year"), 2023);
    assert!(matches!(
        parse_year("tahun"),
        Err(PipelineError::Validation(_))
    ));
}

#[test]
fn join_is_left_biased_on_boundaries() {
    let table = metrics(&[
        ("11", "Aceh", 2023, Some(72.8)),
        ("12", "Sumut", 2023, Some(73.1)),
        ("99", "Nowhere", 2023, Some(10.0)),
    ]);
    let bounds = boundaries(&["11", "12", "13"]);

    let joined = join(&bounds, &table, 2023).expect("join");
    assert_eq!(joined.height(), 3);
    assert_eq!(joined.matched_count().expect("matched"), 2);

    let values: Vec<(String, Option<f64>)> = joined
        .choropleth_values()
        .expect("values")
        .into_iter()
        .map(|value| (value.region_code, value.value))
        .collect();
    assert_eq!(
        values,
        vec![
            ("11".to_string(), Some(72.8)),
            ("12".to_string(), Some(73.1)),
            ("13".to_string(), None),
        ]
    );

    let top = top_n(&joined, 1).expect("top");
    assert_eq!(top.labels(), vec![("Sumut", 73.1)]);
}

#[test]
fn join_matches_numeric_codes_against_string_boundaries() {
    let raw = df![
        "region_code" => [1100i64, 1200],
        "region_name" => ["Aceh", "Sumatera Utara"],
        "year" => [2023i64, 2023],
        "value" => [72.8, 73.1],
    ]
    .expect("df");
    let table = MetricTable::from_frame(&raw).expect("table");
    let bounds = boundaries(&["1100", "1200"]);

    let joined = join(&bounds, &table, 2023).expect("join");
    assert_eq!(joined.matched_count().expect("matched"), 2);
}

#[test]
fn join_keeps_one_row_per_boundary_when_metrics_repeat() {
    let table = metrics(&[
        ("1100", "Aceh", 2023, Some(72.8)),
        ("1100", "Aceh", 2023, Some(50.0)),
        ("1200", "Sumatera Utara", 2023, Some(73.1)),
    ]);
    let bounds = boundaries(&["1100", "1200"]);

    let joined = join(&bounds, &table, 2023).expect("join");
    assert_eq!(joined.height(), bounds.height());

    let values = joined.choropleth_values().expect("values");
    assert_eq!(values[0].value, Some(72.8));
}

#[test]
fn join_is_repeatable_and_leaves_inputs_untouched() {
    let table = province_fixture();
    let bounds = boundaries(&["1100", "1200", "1300"]);
    let metric_before = table.frame().clone();
    let boundary_before = bounds.frame().clone();

    let first = join(&bounds, &table, 2023).expect("first join");
    let second = join(&bounds, &table, 2023).expect("second join");

    assert!(first.frame().equals_missing(second.frame()));
    assert_eq!(
        first.choropleth_values().expect("first"),
        second.choropleth_values().expect("second")
    );
    assert!(table.frame().equals_missing(&metric_before));
    assert!(bounds.frame().equals_missing(&boundary_before));
}

#[test]
fn top_n_is_a_prefix_of_rank_all() {
    let table = province_fixture();
    let bounds = boundaries(&["1100", "1200", "1300", "1400", "1500", "1600", "1700"]);

    let joined = join(&bounds, &table, 2023).expect("join");
    let top = top_n(&joined, 5).expect("top");
    let all = rank_all(&table, 2023).expect("rank all");

    assert_eq!(top.len(), 5);
    assert_eq!(all.len(), 7);
    assert!(top
        .entries
        .windows(2)
        .all(|pair| pair[0].value >= pair[1].value));

    let top_keys: Vec<(&str, f64)> = top
        .iter()
        .map(|entry| (entry.region_code.as_str(), entry.value))
        .collect();
    let all_keys: Vec<(&str, f64)> = all
        .iter()
        .take(5)
        .map(|entry| (entry.region_code.as_str(), entry.value))
        .collect();
    assert_eq!(top_keys, all_keys);

    assert_eq!(top.entries[0].region_name, "Riau");
    assert_eq!(top.entries[0].rank, 1);
    assert!(top.iter().all(|entry| entry.centroid.is_some()));
    assert!(all.iter().all(|entry| entry.centroid.is_none()));
}

#[test]
fn top_n_larger_than_rows_returns_everything_valued() {
    let table = metrics(&[
        ("1100", "Aceh", 2023, Some(72.8)),
        ("1200", "Sumatera Utara", 2023, None),
    ]);
    let bounds = boundaries(&["1100", "1200", "1300"]);

    let joined = join(&bounds, &table, 2023).expect("join");
    let top = top_n(&joined, 9).expect("top");
    assert_eq!(top.labels(), vec![("Aceh", 72.8)]);

    assert!(top_n(&joined, 0).expect("top zero").is_empty());
}

#[test]
fn ranking_keeps_input_order_for_ties() {
    let table = metrics(&[
        ("1300", "Sumatera Barat", 2023, Some(70.0)),
        ("1100", "Aceh", 2023, Some(75.0)),
        ("1200", "Sumatera Utara", 2023, Some(70.0)),
        ("1400", "Riau", 2023, Some(70.0)),
    ]);

    let ranked = rank_all(&table, 2023).expect("rank");
    let codes: Vec<&str> = ranked.iter().map(|entry| entry.region_code.as_str()).collect();
    assert_eq!(codes, vec!["1100", "1300", "1200", "1400"]);
    let ranks: Vec<usize> = ranked.iter().map(|entry| entry.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[test]
fn markers_break_ties_like_the_ranking_when_boundaries_are_reordered() {
    let table = metrics(&[
        ("1100", "Aceh", 2023, Some(70.0)),
        ("1200", "Sumatera Utara", 2023, Some(70.0)),
        ("1300", "Sumatera Barat", 2023, Some(60.0)),
    ]);
    let bounds = boundaries(&["1200", "1100", "1300"]);

    let joined = join(&bounds, &table, 2023).expect("join");
    let boundary_order: Vec<Option<&str>> = joined
        .frame()
        .column("region_code")
        .expect("codes")
        .str()
        .expect("str")
        .into_iter()
        .collect();
    assert_eq!(boundary_order, vec![Some("1200"), Some("1100"), Some("1300")]);

    let all = rank_all(&table, 2023).expect("rank all");
    let ranked: Vec<&str> = all.iter().map(|entry| entry.region_code.as_str()).collect();
    assert_eq!(ranked, vec!["1100", "1200", "1300"]);

    for n in 1..=3 {
        let top = top_n(&joined, n).expect("top");
        let markers: Vec<&str> = top.iter().map(|entry| entry.region_code.as_str()).collect();
        assert_eq!(markers, ranked[..n].to_vec());
    }
}

#[test]
fn non_finite_values_are_never_ranked() {
    let table = metrics(&[
        ("1100", "Aceh", 2023, Some(f64::NAN)),
        ("1200", "Sumatera Utara", 2023, Some(72.0)),
        ("1300", "Sumatera Barat", 2023, Some(f64::INFINITY)),
    ]);

    let records = table.records().expect("records");
    assert_eq!(records[0].value, None);
    assert_eq!(records[2].value, None);

    let all = rank_all(&table, 2023).expect("rank all");
    assert_eq!(all.labels(), vec![("Sumatera Utara", 72.0)]);

    let joined = join(&boundaries(&["1100", "1200", "1300"]), &table, 2023).expect("join");
    let top = top_n(&joined, 5).expect("top");
    assert_eq!(top.labels(), vec![("Sumatera Utara", 72.0)]);
}

#[test]
fn marker_centroid_sits_in_the_middle_of_its_boundary() {
    let table = metrics(&[("1100", "Aceh", 2023, Some(72.8))]);
    let bounds = boundaries(&["1100"]);

    let joined = join(&bounds, &table, 2023).expect("join");
    let top = top_n(&joined, 1).expect("top");
    let centroid = top.entries[0].centroid.expect("centroid");
    assert!((centroid.lon - 1.0).abs() < 1e-9);
    assert!((centroid.lat - 1.0).abs() < 1e-9);
}

#[test]
fn time_series_orders_years_ascending() {
    let table = metrics(&[
        ("1100", "Aceh", 2023, Some(72.8)),
        ("1100", "Aceh", 2021, Some(71.2)),
        ("1100", "Aceh", 2022, Some(72.0)),
        ("1100", "Aceh", 2022, Some(10.0)),
        ("1100", "Aceh", 2020, None),
        ("1200", "Sumatera Utara", 2022, Some(72.7)),
    ]);

    let series = time_series(&table, "Aceh").expect("series");
    assert_eq!(
        series,
        vec![
            SeriesPoint { year: 2021, value: 71.2 },
            SeriesPoint { year: 2022, value: 72.0 },
            SeriesPoint { year: 2023, value: 72.8 },
        ]
    );

    assert!(time_series(&table, "").expect("empty").is_empty());
    assert!(time_series(&table, "Atlantis").expect("unknown").is_empty());
}

#[test]
fn pair_series_keeps_shared_years_only() {
    let a = [
        SeriesPoint { year: 2020, value: 70.0 },
        SeriesPoint { year: 2021, value: 71.0 },
    ];
    let b = [
        SeriesPoint { year: 2021, value: 5.0 },
        SeriesPoint { year: 2022, value: 6.0 },
    ];

    let paired = pair_series(&a, &b);
    assert_eq!(paired.len(), 1);
    assert_eq!((paired[0].year, paired[0].a, paired[0].b), (2021, 71.0, 5.0));
}

#[test]
fn national_comparison_pairs_region_with_aggregate_code() {
    let table = metrics(&[
        ("1100", "Aceh", 2022, Some(72.0)),
        ("1100", "Aceh", 2023, Some(72.8)),
        ("9999", "Indonesia", 2022, Some(72.9)),
        ("9999", "Indonesia", 2023, Some(73.5)),
    ]);

    let paired = national_comparison(&table, "Aceh", "9999").expect("comparison");
    let years: Vec<i32> = paired.iter().map(|point| point.year).collect();
    assert_eq!(years, vec![2022, 2023]);
    assert_eq!(paired[1].b, 73.5);

    let ranked = rank_all(&table, 2023).expect("rank");
    assert!(ranked.iter().all(|entry| entry.region_code != "9999"));
}

#[test]
fn aggregate_sums_and_averages_deduplicated_rows() {
    let table = metrics(&[
        ("1100", "Aceh", 2023, Some(10.0)),
        ("1100", "Aceh", 2023, Some(10.0)),
        ("1200", "Sumatera Utara", 2023, Some(20.0)),
        ("1300", "Sumatera Barat", 2023, Some(30.0)),
        ("1100", "Aceh", 2022, Some(99.0)),
    ]);

    assert_eq!(aggregate(&table, 2023, None, Reducer::Sum).expect("sum"), 60.0);
    assert_eq!(aggregate(&table, 2023, None, Reducer::Mean).expect("mean"), 20.0);
    assert_eq!(
        aggregate(&table, 2023, Some("Aceh"), Reducer::Sum).expect("region sum"),
        10.0
    );
    assert_eq!(
        aggregate(&table, 2023, Some(""), Reducer::Sum).expect("blank region"),
        60.0
    );
}

#[test]
fn aggregate_mean_of_nothing_is_zero() {
    let table = province_fixture();
    assert_eq!(aggregate(&table, 1999, None, Reducer::Mean).expect("mean"), 0.0);
    assert_eq!(
        aggregate(&table, 2023, Some("Atlantis"), Reducer::Mean).expect("mean"),
        0.0
    );
}

#[test]
fn aggregate_mean_counts_rows_without_a_value() {
    let table = metrics(&[
        ("1100", "Aceh", 2023, Some(10.0)),
        ("1200", "Sumatera Utara", 2023, None),
        ("1300", "Sumatera Barat", 2023, Some(20.0)),
        ("1300", "Sumatera Barat", 2023, Some(20.0)),
    ]);

    assert_eq!(aggregate(&table, 2023, None, Reducer::Sum).expect("sum"), 30.0);
    assert_eq!(aggregate(&table, 2023, None, Reducer::Mean).expect("mean"), 10.0);
    assert_eq!(
        aggregate(&table, 2023, Some("Sumatera Utara"), Reducer::Mean).expect("region mean"),
        0.0
    );
}
