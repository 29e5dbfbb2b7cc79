use anyhow::{Context, Result, bail};
use sellcast_forecast::TrainerParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "sellcast.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSection,
    pub forecast: ForecastSection,
    pub trainers: TrainerParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Source sales dataset
    pub train_csv: PathBuf,
    /// Where the held-out pool is written and re-read; kept in memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdout_csv: Option<PathBuf>,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            train_csv: PathBuf::from("sales.csv"),
            holdout_csv: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSection {
    /// Month of year (1-12) for the revenue forecast
    pub target_month: u32,
    /// Seed for the train/held-out split; fresh entropy when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ForecastSection {
    fn default() -> Self {
        Self {
            target_month: 1,
            seed: None,
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the config file. A missing default file yields defaults; a missing
/// explicitly requested file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = config_path(explicit);
    if !p.exists() {
        if explicit.is_some() {
            bail!("config not found: {}", p.display());
        }
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    if !(1..=12).contains(&cfg.forecast.target_month) {
        bail!(
            "{}: [forecast] target_month = {} (expected 1-12)",
            p.display(),
            cfg.forecast.target_month
        );
    }
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let p = config_path(explicit);
    if p.exists() && !force {
        println!("Config already exists: {} (pass --force to overwrite)", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
