//! Runtime configuration.
//!
//! Settings are read from environment variables:
//!
//! * `ATTENDANCE_BIND_ADDR` – address the HTTP server binds to
//!   (default `127.0.0.1:3000`).
//! * `ATTENDANCE_HOLIDAY_FILE` – optional JSON holiday table replacing
//!   the built-in one.
//! * `ATTENDANCE_DEFAULT_YEAR` – year assumed for imported files, which
//!   carry only a month (default: the current year).

use crate::calendar::HolidayTable;
use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// JSON holiday table to use instead of the built-in one.
    pub holiday_file: Option<PathBuf>,
    /// Year assigned to imported rows.
    pub default_year: i32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("ATTENDANCE_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("invalid ATTENDANCE_BIND_ADDR: {bind_addr}"))?;

        let holiday_file = lookup("ATTENDANCE_HOLIDAY_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let default_year = match lookup("ATTENDANCE_DEFAULT_YEAR") {
            Some(year) => year
                .trim()
                .parse::<i32>()
                .with_context(|| format!("invalid ATTENDANCE_DEFAULT_YEAR: {year}"))?,
            None => Local::now().year(),
        };

        Ok(Self {
            bind_addr,
            holiday_file,
            default_year,
        })
    }

    /// The configured holiday table, or the built-in one.
    pub fn holiday_table(&self) -> Result<HolidayTable> {
        match &self.holiday_file {
            Some(path) => HolidayTable::load_from_file(path)
                .with_context(|| format!("loading holiday table from {}", path.display())),
            None => Ok(HolidayTable::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            holiday_file: None,
            default_year: Local::now().year(),
        }
    }
}
