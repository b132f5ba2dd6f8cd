use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result as SqliteResult, Row};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::{Builder, TempPath};
use tracing::{info, warn};

use crate::contact::{ContactRecord, Coordinate, Customer, Prospect};

pub const SCHEMA: &str = "
CREATE TABLE prospects (
    id INTEGER PRIMARY KEY,
    full_name TEXT NOT NULL,
    address TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    knock_count INTEGER NOT NULL DEFAULT 0,
    is_unqualified INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE customers (
    id INTEGER PRIMARY KEY,
    full_name TEXT NOT NULL,
    address TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    knock_count INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE knocks (
    id INTEGER PRIMARY KEY,
    address TEXT NOT NULL,
    knocked_at INTEGER NOT NULL
);
";

pub fn default_database_path() -> Result<PathBuf> {
    let system = env::consts::OS;

    let path = match system {
        "windows" => {
            let local_app_data = env::var("LOCALAPPDATA")?;
            PathBuf::from(local_app_data).join("knockmap/territory.db")
        }
        "macos" => {
            let home = env::var("HOME")?;
            PathBuf::from(home).join("Library/Application Support/knockmap/territory.db")
        }
        _ => match env::var("XDG_DATA_HOME") {
            Ok(data_home) if !data_home.is_empty() => {
                PathBuf::from(data_home).join("knockmap/territory.db")
            }
            _ => {
                let home = env::var("HOME")
                    .with_context(|| format!("Cannot locate a data directory on '{}'", system))?;
                PathBuf::from(home).join(".local/share/knockmap/territory.db")
            }
        },
    };

    Ok(path)
}

/// `--database` wins over the environment, which wins over the platform default.
pub fn resolve_database_path(cli: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    let path = match cli.or(configured) {
        Some(path) => path.to_path_buf(),
        None => default_database_path()?,
    };

    info!(action = "resolve", component = "database_path", path = ?path, "Contact store path resolved");
    Ok(path)
}

/// A private copy of the contact store. An anonymous snapshot lives in a
/// uniquely named temp file and is unique per run; an explicit `--temp-path` is removed on `remove`.
#[derive(Debug)]
pub struct Snapshot {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl Snapshot {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(self) -> Result<()> {
        match self.temp {
            Some(temp) => temp.close()?,
            None => fs::remove_file(&self.path)?,
        }
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    if !a.exists() || !b.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

/// Copies the store aside so one analysis pass reads a consistent snapshot
/// and never holds a lock on the live file.
pub fn copy_database(database_path: &Path, temp_path: Option<&Path>) -> Result<Snapshot> {
    let start_time = Instant::now();
    info!(action = "start", component = "database_copy", "Copying contact store");

    if !database_path.exists() {
        anyhow::bail!("Contact store not found at {:?}", database_path);
    }

    let snapshot = match temp_path {
        Some(path) => {
            if same_file(database_path, path)? {
                anyhow::bail!(
                    "Temporary path {:?} is the contact store itself; choose a different --temp-path",
                    path
                );
            }
            Snapshot {
                path: path.to_path_buf(),
                temp: None,
            }
        }
        None => {
            let temp = Builder::new()
                .prefix("knockmap_snapshot")
                .suffix(".db")
                .tempfile()
                .context("Failed to create temporary snapshot file")?
                .into_temp_path();
            Snapshot {
                path: temp.to_path_buf(),
                temp: Some(temp),
            }
        }
    };

    info!(action = "copy", component = "database_copy", source = ?database_path, destination = ?snapshot.path, "Database copy paths");

    if let Err(e) = fs::copy(database_path, &snapshot.path) {
        let destination = snapshot.path.clone();
        if let Err(cleanup) = snapshot.remove() {
            warn!(action = "cleanup", component = "database_copy", error = %cleanup, "Failed to remove partial snapshot");
        }
        return Err(e).with_context(|| {
            format!("Failed to copy {:?} to {:?}", database_path, destination)
        });
    }

    let copy_time = start_time.elapsed();
    info!(action = "complete", component = "database_copy", duration_ms = copy_time.as_millis(), "Database copy completed");
    Ok(snapshot)
}

pub fn init_database(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{:?} already exists. Remove it first if you want to reinitialize.",
            path
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
    }

    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)
        .context("Failed to create contact store schema")?;

    info!(action = "init", component = "database", path = ?path, "Created empty contact store");
    Ok(())
}

fn knock_count(row: &Row<'_>, idx: usize) -> SqliteResult<u32> {
    let raw: i64 = row.get(idx)?;
    Ok(raw.clamp(0, u32::MAX as i64) as u32)
}

fn coordinate(row: &Row<'_>, lat_idx: usize, lon_idx: usize) -> SqliteResult<Option<Coordinate>> {
    Ok(Coordinate::from_parts(row.get(lat_idx)?, row.get(lon_idx)?))
}

/// Reads every prospect followed by every customer.
pub fn load_contacts(conn: &Connection) -> Result<Vec<ContactRecord>> {
    let start_time = Instant::now();
    info!(action = "start", component = "contact_load", "Loading contacts");

    let prospects: Vec<ContactRecord> = conn
        .prepare(
            "SELECT id, full_name, address, latitude, longitude, knock_count, is_unqualified
             FROM prospects ORDER BY id",
        )?
        .query_map([], |row| {
            Ok(ContactRecord::Prospect(Prospect {
                id: row.get(0)?,
                full_name: row.get(1)?,
                address: row.get(2)?,
                coordinate: coordinate(row, 3, 4)?,
                knock_count: knock_count(row, 5)?,
                is_unqualified: row.get(6)?,
            }))
        })?
        .collect::<SqliteResult<Vec<_>>>()
        .context("Failed to read prospects")?;

    let customers: Vec<ContactRecord> = conn
        .prepare(
            "SELECT id, full_name, address, latitude, longitude, knock_count
             FROM customers ORDER BY id",
        )?
        .query_map([], |row| {
            Ok(ContactRecord::Customer(Customer {
                id: row.get(0)?,
                full_name: row.get(1)?,
                address: row.get(2)?,
                coordinate: coordinate(row, 3, 4)?,
                knock_count: knock_count(row, 5)?,
            }))
        })?
        .collect::<SqliteResult<Vec<_>>>()
        .context("Failed to read customers")?;

    info!(
        action = "complete",
        component = "contact_load",
        prospect_count = prospects.len(),
        customer_count = customers.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Contacts loaded"
    );

    let mut contacts = prospects;
    contacts.extend(customers);
    Ok(contacts)
}

pub fn get_knock_date_range(conn: &Connection) -> Result<(String, String, i64)> {
    let start_time = Instant::now();
    info!(action = "start", component = "date_range_query", "Querying knock date range");

    let (earliest_timestamp, latest_timestamp): (Option<i64>, Option<i64>) = conn
        .query_row(
            "SELECT MIN(knocked_at), MAX(knocked_at) FROM knocks",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .context("Failed to query knock dates")?;

    let earliest_date = earliest_timestamp.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    let latest_date = latest_timestamp.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    if let (Some(earliest_date), Some(latest_date)) = (earliest_date, latest_date) {
        let days_between = (latest_date - earliest_date).num_days();
        let query_time = start_time.elapsed();

        info!(
            action = "complete",
            component = "date_range_query",
            earliest_date = earliest_date.format("%B %-d, %Y").to_string(),
            latest_date = latest_date.format("%B %-d, %Y").to_string(),
            days_between,
            duration_ms = query_time.as_millis(),
            "Date range query completed"
        );

        Ok((
            earliest_date.format("%B %-d, %Y").to_string(),
            latest_date.format("%B %-d, %Y").to_string(),
            days_between,
        ))
    } else {
        let query_time = start_time.elapsed();
        warn!(
            action = "complete",
            component = "date_range_query",
            duration_ms = query_time.as_millis(),
            "No knock data found"
        );
        Ok((
            "No data available".to_string(),
            "No data available".to_string(),
            0,
        ))
    }
}
