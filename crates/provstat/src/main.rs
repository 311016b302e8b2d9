mod config;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use provstat_core::{Dashboard, FilterSelection, Metric};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{config_path, DashboardConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Provincial statistics dashboard pipeline", long_about = None)]
struct Cli {
    /// Dashboard config (falls back to PROVSTAT_CONFIG, then ./provstat.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every configured table and report what was found
    Check,
    /// List the years available for a metric
    Years(MetricArgs),
    /// List the province names available for a metric
    Provinces(MetricArgs),
    /// Render the dashboard for one filter selection
    View(ViewArgs),
}

#[derive(Args, Debug)]
struct MetricArgs {
    #[arg(long, default_value = "IPM")]
    metric: Metric,
}

#[derive(Args, Debug)]
struct ViewArgs {
    #[arg(long, default_value = "IPM")]
    metric: Metric,
    /// Year to show; defaults to the latest year in the table
    #[arg(long)]
    year: Option<String>,
    /// Province name for the trend and scatter views
    #[arg(long)]
    region: Option<String>,
    /// Number of map markers
    #[arg(long)]
    top: Option<usize>,
    /// Second metric for the scatter view
    #[arg(long)]
    axis_y: Option<Metric>,
    /// Print the view as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let path = config_path(cli.config);
    let config = DashboardConfig::load(&path)?;
    let dashboard = config
        .build_dashboard()
        .context("failed to load dashboard data")?;
    info!(config = %path.display(), "dashboard ready");

    match cli.command {
        Command::Check => {
            let rows = dashboard
                .metrics()
                .map(|metric| -> Result<(String, usize, String)> {
                    let table = loaded(&dashboard, metric)?;
                    let years = table.years()?;
                    let span = match (years.first(), years.last()) {
                        (Some(first), Some(last)) => format!("{first}-{last}"),
                        _ => "-".to_string(),
                    };
                    Ok((metric.to_string(), table.height(), span))
                })
                .collect::<Result<Vec<_>>>()?;
            println!("boundaries: {} features", dashboard.boundaries().height());
            for (metric, height, span) in rows {
                println!("{metric}: {height} rows, years {span}");
            }
            Ok(())
        }
        Command::Years(args) => {
            let years = loaded(&dashboard, args.metric)?.years()?;
            output::print_list("Tahun", &years);
            Ok(())
        }
        Command::Provinces(args) => {
            let names = loaded(&dashboard, args.metric)?.province_names()?;
            output::print_list("Provinsi", &names);
            Ok(())
        }
        Command::View(args) => {
            let mut selection = FilterSelection::new(args.metric)
                .with_top_n(args.top.unwrap_or(config.default_top_n));
            if let Some(year) = args.year {
                selection = selection.with_year(year);
            }
            if let Some(region) = args.region {
                selection = selection.with_region(region);
            }
            if let Some(axis_y) = args.axis_y {
                selection = selection.with_axis_y(axis_y);
            }

            let view = dashboard.render(&selection);
            if args.json {
                output::print_json(&view)?;
            } else {
                output::print_view(&view);
            }
            Ok(())
        }
    }
}

fn loaded(dashboard: &Dashboard, metric: Metric) -> Result<&provstat_core::MetricTable> {
    dashboard
        .metric(metric)
        .with_context(|| format!("metric {metric} is not configured"))
}
