//! Bike-share dock status from the BikePoint feed.

use chrono::DateTime;
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::config::Endpoints;
use crate::error::FetchError;
use crate::fetch::{self, HttpClient};

/// An e-bike counter at or above this value means "unknown / out of service"
/// upstream; such docks are excluded from fleet-wide sums.
pub const E_BIKE_SENTINEL: u32 = 99;

const NB_BIKES: &str = "NbBikes";
const NB_EMPTY_DOCKS: &str = "NbEmptyDocks";
const NB_E_BIKES: &str = "NbEBikes";

/// Live inventory of one dock.
///
/// The three counters are independently sourced upstream and do not have to
/// sum to the dock's capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct DockRecord {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bikes_available: u32,
    pub e_bikes_available: u32,
    pub empty_spaces: u32,
    pub observed_at: DateTime<Tz>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BikePointPayload {
    common_name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    additional_properties: Vec<BikePointProperty>,
}

#[derive(Debug, Deserialize)]
struct BikePointProperty {
    key: String,
    value: String,
    modified: Option<String>,
}

impl BikePointPayload {
    fn property(&self, key: &str) -> Result<&BikePointProperty, FetchError> {
        self.additional_properties
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| FetchError::SchemaMismatch(format!("BikePoint property {key} is missing")))
    }

    fn counter(&self, key: &str) -> Result<u32, FetchError> {
        let property = self.property(key)?;
        property.value.trim().parse().map_err(|_| {
            FetchError::SchemaMismatch(format!(
                "BikePoint property {key} is not a count: {:?}",
                property.value
            ))
        })
    }
}

/// Accepts either the full `BikePoints_<n>` id or the bare number.
pub fn normalize_dock_id(id: &str) -> String {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        format!("BikePoints_{id}")
    } else {
        id.to_string()
    }
}

/// Parses one dock's BikePoint payload into a [`DockRecord`].
///
/// The counters are looked up by their declared keys rather than by position
/// in `additionalProperties`, so an upstream reordering cannot silently
/// corrupt them; an absent key is `SchemaMismatch`. The observation
/// timestamp rides on the empty-spaces entry and is converted to
/// Europe/London.
pub fn parse_dock(id: &str, body: &str) -> Result<DockRecord, FetchError> {
    let payload: BikePointPayload = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("BikePoint JSON: {e}")))?;

    let bikes_available = payload.counter(NB_BIKES)?;
    let e_bikes_available = payload.counter(NB_E_BIKES)?;
    let empty_spaces = payload.counter(NB_EMPTY_DOCKS)?;

    let modified = payload
        .property(NB_EMPTY_DOCKS)?
        .modified
        .as_deref()
        .ok_or_else(|| {
            FetchError::SchemaMismatch(format!("BikePoint property {NB_EMPTY_DOCKS} has no modified timestamp"))
        })?;
    let observed_at = DateTime::parse_from_rfc3339(modified)
        .map_err(|_| {
            FetchError::SchemaMismatch(format!("BikePoint modified is not a timestamp: {modified:?}"))
        })?
        .with_timezone(&London);

    Ok(DockRecord {
        id: id.to_string(),
        name: payload.common_name,
        latitude: payload.lat,
        longitude: payload.lon,
        bikes_available,
        e_bikes_available,
        empty_spaces,
        observed_at,
    })
}

/// Sums e-bike availability across a full-fleet dump, skipping docks whose
/// counter carries the sentinel value.
pub fn parse_fleet_e_bike_total(body: &str) -> Result<u64, FetchError> {
    let fleet: Vec<BikePointPayload> = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("BikePoint fleet JSON: {e}")))?;

    let mut total = 0u64;
    let mut skipped = 0usize;
    for dock in &fleet {
        let count = dock.counter(NB_E_BIKES)?;
        if count >= E_BIKE_SENTINEL {
            skipped += 1;
            continue;
        }
        total += u64::from(count);
    }

    debug!(docks = fleet.len(), skipped, total, "fleet e-bike total computed");
    Ok(total)
}

/// Fetches the live record for one dock.
#[tracing::instrument(skip(client, endpoints))]
pub async fn fetch_dock<C: HttpClient>(
    client: &C,
    endpoints: &Endpoints,
    id: &str,
) -> Result<DockRecord, FetchError> {
    let id = normalize_dock_id(id);
    let body = fetch::fetch_text(client, &endpoints.bike_point_url(&id)).await?;
    parse_dock(&id, &body)
}

/// Fetches several docks, one request per id, preserving input order.
///
/// The batch is all-or-nothing: the first failing id aborts the refresh, so
/// a partial row set is never returned.
pub async fn fetch_docks<C: HttpClient>(
    client: &C,
    endpoints: &Endpoints,
    ids: &[String],
) -> Result<Vec<DockRecord>, FetchError> {
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        records.push(fetch_dock(client, endpoints, id).await?);
    }
    Ok(records)
}

/// Fetches the full-fleet dump and computes the e-bike total.
#[tracing::instrument(skip(client, endpoints))]
pub async fn fetch_fleet_e_bike_total<C: HttpClient>(
    client: &C,
    endpoints: &Endpoints,
) -> Result<u64, FetchError> {
    let body = fetch::fetch_text(client, &endpoints.bike_point).await?;
    parse_fleet_e_bike_total(&body)
}
