// crates/provstat/src/output.rs

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use provstat_core::dashboard::{DashboardView, Notice};
use provstat_core::ranking::RankedView;

pub fn print_json(view: &DashboardView) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

pub fn print_view(view: &DashboardView) {
    let metric = view.selection.metric;
    match view.year {
        Some(year) => println!("{} ({}) tahun {year}", metric.label(), metric),
        None => println!("{} ({})", metric.label(), metric),
    }

    for notice in &view.notices {
        println!("! {}", describe_notice(notice));
    }

    if !view.facts.is_empty() {
        let mut table = new_table(&["Ringkasan", "Nilai"]);
        for fact in &view.facts {
            table.add_row(vec![Cell::new(&fact.title), Cell::new(&fact.display)]);
        }
        println!("{table}");
    }

    if !view.markers.is_empty() {
        println!("Peringkat teratas");
        println!("{}", ranking_table(&view.markers, true));
    }

    if !view.ranking.is_empty() {
        println!("Peringkat provinsi");
        println!("{}", ranking_table(&view.ranking, false));
    }

    if !view.map.is_empty() {
        let mut table = new_table(&["Kode", "Wilayah", "Nilai"]);
        for entry in &view.map {
            table.add_row(vec![
                Cell::new(&entry.region_code),
                Cell::new(&entry.region_name),
                Cell::new(optional(entry.value)),
            ]);
        }
        println!("Peta");
        println!("{table}");
    }

    if !view.trend.is_empty() {
        let mut table = new_table(&["Tahun", "Nilai"]);
        for point in &view.trend {
            table.add_row(vec![Cell::new(point.year), Cell::new(point.value)]);
        }
        println!("Tren");
        println!("{table}");
    }

    if !view.national_trend.is_empty() {
        let mut table = new_table(&["Tahun", "Wilayah", "Indonesia"]);
        for point in &view.national_trend {
            table.add_row(vec![
                Cell::new(point.year),
                Cell::new(point.a),
                Cell::new(point.b),
            ]);
        }
        println!("Perbandingan nasional");
        println!("{table}");
    }

    if !view.scatter.is_empty() {
        let axis_y = view
            .selection
            .axis_y
            .map(|metric| metric.to_string())
            .unwrap_or_default();
        let mut table = new_table(&["Tahun", metric.as_str(), axis_y.as_str()]);
        for point in &view.scatter {
            table.add_row(vec![
                Cell::new(point.year),
                Cell::new(point.a),
                Cell::new(point.b),
            ]);
        }
        println!("Sebaran");
        println!("{table}");
    }
}

pub fn print_list<T: ToString>(header: &str, items: &[T]) {
    let mut table = new_table(&[header]);
    for item in items {
        table.add_row(vec![Cell::new(item.to_string())]);
    }
    println!("{table}");
}

fn ranking_table(view: &RankedView, with_centroid: bool) -> Table {
    let mut header = vec!["#", "Kode", "Wilayah", "Nilai"];
    if with_centroid {
        header.extend(["Lon", "Lat"]);
    }
    let mut table = new_table(&header);
    for entry in view.iter() {
        let mut row = vec![
            Cell::new(entry.rank),
            Cell::new(&entry.region_code),
            Cell::new(&entry.region_name),
            Cell::new(entry.value),
        ];
        if with_centroid {
            let (lon, lat) = entry
                .centroid
                .map(|point| (format!("{:.4}", point.lon), format!("{:.4}", point.lat)))
                .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
            row.push(Cell::new(lon));
            row.push(Cell::new(lat));
        }
        table.add_row(row);
    }
    table
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn describe_notice(notice: &Notice) -> String {
    match notice {
        Notice::UnknownMetric { metric } => format!("metric {metric} is not loaded"),
        Notice::InvalidSelection { message } => message.clone(),
        Notice::EmptyJoin { year } => format!("no boundary matched any {year} record"),
        Notice::NoRegionSelected => "select a region to see its trend".to_string(),
        Notice::RequestFailed { message } => format!("request failed: {message}"),
    }
}
