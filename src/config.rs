use std::env;
use std::path::PathBuf;

pub const DATABASE_ENV: &str = "KNOCKMAP_DATABASE";
pub const FOLD_CASE_ENV: &str = "KNOCKMAP_FOLD_CASE";

/// Settings picked up from the environment. Command-line flags take precedence.
#[derive(Debug, Default, Clone)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub fold_case: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = lookup(DATABASE_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let fold_case = match lookup(FOLD_CASE_ENV) {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| anyhow::anyhow!("{} must be a boolean, got '{}'", FOLD_CASE_ENV, value))?,
            None => false,
        };

        Ok(Self {
            database,
            fold_case,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
