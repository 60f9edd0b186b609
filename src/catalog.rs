//! Static reference data: the known docks and bus stops offered as
//! selection choices.
//!
//! Loaded once from CSV and read-only afterwards; never consulted during a
//! refresh.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// A dock the user can pick, with its map position.
#[derive(Debug, Clone, Deserialize)]
pub struct DockEntry {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// A bus stop the user can pick.
#[derive(Debug, Clone, Deserialize)]
pub struct StopEntry {
    pub id: String,
    pub name: String,
}

/// The two lookup tables behind the selection dropdowns.
#[derive(Debug, Default)]
pub struct Catalog {
    docks: Vec<DockEntry>,
    stops: Vec<StopEntry>,
}

impl Catalog {
    /// Loads both tables, sorting each by display name.
    pub fn load(docks_csv: &Path, stops_csv: &Path) -> Result<Self> {
        let mut docks: Vec<DockEntry> = read_csv(docks_csv)?;
        docks.sort_by(|a, b| a.name.cmp(&b.name));

        let mut stops: Vec<StopEntry> = read_csv(stops_csv)?;
        stops.sort_by(|a, b| a.name.cmp(&b.name));

        info!(docks = docks.len(), stops = stops.len(), "reference catalog loaded");
        Ok(Self { docks, stops })
    }

    pub fn docks(&self) -> &[DockEntry] {
        &self.docks
    }

    pub fn stops(&self) -> &[StopEntry] {
        &self.stops
    }

    pub fn dock(&self, id: &str) -> Option<&DockEntry> {
        self.docks.iter().find(|d| d.id == id)
    }

    pub fn stop(&self, id: &str) -> Option<&StopEntry> {
        self.stops.iter().find(|s| s.id == id)
    }
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result.with_context(|| format!("reading {}", path.display()))?);
    }
    Ok(rows)
}
