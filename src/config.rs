use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DATA_DIR_VAR: &str = "SUBTRACK_DATA_DIR";
const HORIZON_VAR: &str = "SUBTRACK_HORIZON_YEARS";
const DEFAULT_HORIZON_YEARS: u32 = 1;

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    /// How far ahead of today the calendar expands billing periods.
    pub(crate) horizon_years: u32,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let horizon_years = parse_horizon(std::env::var(HORIZON_VAR).ok().as_deref())?;
        Self::in_dir(&data_dir, horizon_years)
    }

    pub(crate) fn in_dir(data_dir: &Path, horizon_years: u32) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            db_path: data_dir.join("subtrack.db"),
            log_path: data_dir.join("subtrack.log"),
            horizon_years,
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "subtrack", "SubTrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn parse_horizon(raw: Option<&str>) -> Result<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_HORIZON_YEARS),
        Some(s) => match s.parse::<u32>() {
            Ok(years) if years > 0 => Ok(years),
            _ => anyhow::bail!("{HORIZON_VAR} must be a positive number of years, got '{s}'"),
        },
    }
}
