use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sellcast_core::{RawTransaction, parse_month_of_year};
use sellcast_forecast::{
    BestSellerReport, RevenueReport, default_candidates, run_best_seller, run_revenue,
};
use sellcast_ingest::parse_sales_csv;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod report;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "sellcast", version, about = "Best-seller and revenue forecasts from sales CSVs")]
struct Cli {
    /// Config file (default: ./sellcast.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct DataArgs {
    /// Sales CSV (Date,Category,Quantity,UnitPrice,TotalRevenue)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the held-out pool here and re-read it before forecasting
    #[arg(long)]
    holdout: Option<PathBuf>,

    /// Seed for the train/held-out split
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run both forecasts and print the full report
    Forecast {
        #[command(flatten)]
        data: DataArgs,

        /// Month of year for the revenue forecast ("05" or "5")
        #[arg(long)]
        month: Option<String>,
    },

    /// Select a classifier and forecast next month's best-selling category
    BestSeller {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Forecast per-category revenue for a month of year
    Revenue {
        /// Sales CSV (Date,Category,Quantity,UnitPrice,TotalRevenue)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Month of year ("05" or "5")
        #[arg(long)]
        month: Option<String>,
    },

    /// Write a default sellcast.toml
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::InitConfig { force } => {
            config::init_config(cli.config.as_deref(), force)?;
        }

        Command::Forecast { data, month } => {
            let mut cfg = config::load_config(cli.config.as_deref())?;
            apply_overrides(&mut cfg, &data, month.as_deref())?;
            let txns = load_transactions(&cfg.data.train_csv)?;
            let best = best_seller(&cfg, &txns)?;
            let revenue = revenue(&cfg, &txns)?;
            if cli.json {
                report::print_json(&report::FullReport {
                    best_seller: &best,
                    revenue: &revenue,
                })?;
            } else {
                report::print_best_seller(&best);
                report::print_revenue(&revenue);
            }
        }

        Command::BestSeller { data } => {
            let mut cfg = config::load_config(cli.config.as_deref())?;
            apply_overrides(&mut cfg, &data, None)?;
            let txns = load_transactions(&cfg.data.train_csv)?;
            let best = best_seller(&cfg, &txns)?;
            if cli.json {
                report::print_json(&best)?;
            } else {
                report::print_best_seller(&best);
            }
        }

        Command::Revenue { csv, month } => {
            let data = DataArgs {
                csv,
                ..Default::default()
            };
            let mut cfg = config::load_config(cli.config.as_deref())?;
            apply_overrides(&mut cfg, &data, month.as_deref())?;
            let txns = load_transactions(&cfg.data.train_csv)?;
            let revenue = revenue(&cfg, &txns)?;
            if cli.json {
                report::print_json(&revenue)?;
            } else {
                report::print_revenue(&revenue);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(cfg: &mut Config, data: &DataArgs, month: Option<&str>) -> Result<()> {
    if let Some(csv) = &data.csv {
        cfg.data.train_csv = csv.clone();
    }
    if let Some(holdout) = &data.holdout {
        cfg.data.holdout_csv = Some(holdout.clone());
    }
    if let Some(seed) = data.seed {
        cfg.forecast.seed = Some(seed);
    }
    if let Some(m) = month {
        cfg.forecast.target_month = match parse_month_of_year(m) {
            Some(m) => m,
            None => bail!("invalid --month `{m}` (expected 01-12)"),
        };
    }
    Ok(())
}

fn load_transactions(path: &Path) -> Result<Vec<RawTransaction>> {
    if !path.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", path.display());
    }
    parse_sales_csv(path).with_context(|| format!("parsing {}", path.display()))
}

fn best_seller(cfg: &Config, txns: &[RawTransaction]) -> Result<BestSellerReport> {
    let mut rng = match cfg.forecast.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let candidates = default_candidates(&cfg.trainers);
    info!(candidates = candidates.len(), "running best-seller forecast");

    let holdout = cfg.data.holdout_csv.as_deref();
    run_best_seller(txns, &candidates, holdout, &mut rng).with_context(|| match holdout {
        Some(p) => format!("best-seller forecast (held-out file {})", p.display()),
        None => "best-seller forecast".to_string(),
    })
}

fn revenue(cfg: &Config, txns: &[RawTransaction]) -> Result<RevenueReport> {
    run_revenue(txns, &cfg.trainers.regressor(), cfg.forecast.target_month)
        .context("revenue forecast")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "sellcast", "forecast", "--csv", "data/sales_sample.csv", "--seed", "7", "--month",
            "05", "--holdout", "out/holdout.csv",
        ])
        .unwrap();
        let Command::Forecast { data, month } = cli.command else {
            panic!("expected forecast");
        };

        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &data, month.as_deref()).unwrap();
        assert_eq!(cfg.data.train_csv, PathBuf::from("data/sales_sample.csv"));
        assert_eq!(cfg.data.holdout_csv, Some(PathBuf::from("out/holdout.csv")));
        assert_eq!(cfg.forecast.seed, Some(7));
        assert_eq!(cfg.forecast.target_month, 5);
    }

    #[test]
    fn test_invalid_month_rejected() {
        let mut cfg = Config::default();
        assert!(apply_overrides(&mut cfg, &DataArgs::default(), Some("13")).is_err());
        assert!(apply_overrides(&mut cfg, &DataArgs::default(), Some("may")).is_err());
        assert_eq!(cfg.forecast.target_month, 1);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sellcast", "revenue", "--json", "-v", "--month", "12"])
            .unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Revenue { month: Some(ref m), .. } if m == "12"));
    }

    #[test]
    fn test_init_config_parses_with_global_config() {
        let cli =
            Cli::try_parse_from(["sellcast", "init-config", "--force", "--config", "x.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
    }

    #[test]
    fn test_missing_csv_is_reported() {
        let err = load_transactions(Path::new("/no/such/sales.csv")).unwrap_err();
        assert!(err.to_string().contains("CSV not found"));
    }
}
