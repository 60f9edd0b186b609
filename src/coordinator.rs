//! Session state and refresh semantics for the three selectable widgets.

use std::collections::HashSet;

use tracing::{error, info};

use crate::buses::{self, BusArrival};
use crate::config::Endpoints;
use crate::docks::{self, DockRecord};
use crate::error::FetchError;
use crate::fetch::HttpClient;
use crate::lines::{self, LineStatus};

/// What the user currently has picked in one widget.
///
/// Lines and docks are multi-select; the bus stop is single-select. An
/// absent selection produces an empty result set without touching the
/// upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    One(String),
    Many(Vec<String>),
}

/// One widget's data between refreshes.
///
/// Rows start empty and are fully replaced by every committed refresh. A
/// failed refresh leaves them empty with the error recorded, so "refresh
/// failed" stays distinguishable from "no data". Last-known-good rows are
/// never retained across a failure.
#[derive(Debug)]
pub struct Widget<T> {
    rows: Vec<T>,
    last_error: Option<FetchError>,
    issued: u64,
}

impl<T> Default for Widget<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            last_error: None,
            issued: 0,
        }
    }
}

impl<T> Widget<T> {
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Starts a refresh and returns its generation ticket.
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Applies a finished refresh, unless a newer one was issued since the
    /// ticket was taken; a stale outcome is dropped so the latest trigger
    /// always wins. Returns whether the outcome was applied.
    pub fn commit(&mut self, ticket: u64, outcome: Result<Vec<T>, FetchError>) -> bool {
        if ticket != self.issued {
            info!(ticket, issued = self.issued, "stale refresh discarded");
            return false;
        }

        match outcome {
            Ok(rows) => {
                self.rows = rows;
                self.last_error = None;
            }
            Err(e) => {
                self.rows = Vec::new();
                self.last_error = Some(e);
            }
        }
        true
    }
}

/// Drives the per-widget fetches in response to UI triggers.
///
/// A refresh signal and a selection change are the same trigger, and each
/// widget is independent of the others: no cross-widget coordination, no
/// shared cache.
pub struct Coordinator<C> {
    client: C,
    endpoints: Endpoints,
    pub lines: Widget<LineStatus>,
    pub docks: Widget<DockRecord>,
    pub buses: Widget<BusArrival>,
    fleet_e_bikes: Option<u64>,
}

impl<C: HttpClient> Coordinator<C> {
    pub fn new(client: C, endpoints: Endpoints) -> Self {
        Self {
            client,
            endpoints,
            lines: Widget::default(),
            docks: Widget::default(),
            buses: Widget::default(),
            fleet_e_bikes: None,
        }
    }

    /// Computes the fleet-wide e-bike total, once.
    ///
    /// The number is a startup snapshot: subsequent calls return it without
    /// refetching, and the per-dock refresh trigger never touches it. A
    /// failure is logged and leaves the total absent rather than aborting
    /// the session.
    pub async fn init_fleet_total(&mut self) -> Option<u64> {
        if self.fleet_e_bikes.is_some() {
            return self.fleet_e_bikes;
        }

        match docks::fetch_fleet_e_bike_total(&self.client, &self.endpoints).await {
            Ok(total) => {
                info!(total, "fleet e-bike total computed");
                self.fleet_e_bikes = Some(total);
            }
            Err(e) => error!(error = %e, "fleet e-bike total unavailable"),
        }
        self.fleet_e_bikes
    }

    pub fn fleet_e_bikes(&self) -> Option<u64> {
        self.fleet_e_bikes
    }

    /// Refreshes the line-status widget for the given selection.
    ///
    /// Any selected shape fetches the whole feed and filters it down; the
    /// upstream has no per-line endpoint.
    pub async fn refresh_lines(&mut self, selection: &Selection) -> &Widget<LineStatus> {
        let ticket = self.lines.begin();

        let outcome = match selection {
            Selection::None => Ok(Vec::new()),
            Selection::One(name) => {
                self.fetch_filtered_lines(HashSet::from([name.clone()])).await
            }
            Selection::Many(names) => {
                self.fetch_filtered_lines(names.iter().cloned().collect()).await
            }
        };

        self.lines.commit(ticket, outcome);
        &self.lines
    }

    async fn fetch_filtered_lines(
        &self,
        selected: HashSet<String>,
    ) -> Result<Vec<LineStatus>, FetchError> {
        let all = lines::fetch_line_statuses(&self.client, &self.endpoints).await?;
        Ok(lines::filter_lines(&all, &selected))
    }

    /// Refreshes the dock widget for the given selection, one fetch per id.
    pub async fn refresh_docks(&mut self, selection: &Selection) -> &Widget<DockRecord> {
        let ticket = self.docks.begin();

        let outcome = match selection {
            Selection::None => Ok(Vec::new()),
            Selection::One(id) => docks::fetch_dock(&self.client, &self.endpoints, id)
                .await
                .map(|record| vec![record]),
            Selection::Many(ids) => docks::fetch_docks(&self.client, &self.endpoints, ids).await,
        };

        self.docks.commit(ticket, outcome);
        &self.docks
    }

    /// Refreshes the bus widget. The stop is single-select; any other
    /// selection shape clears the widget without a fetch.
    pub async fn refresh_buses(&mut self, selection: &Selection) -> &Widget<BusArrival> {
        let ticket = self.buses.begin();

        let outcome = match selection {
            Selection::One(stop_id) => {
                buses::fetch_arrivals(&self.client, &self.endpoints, stop_id).await
            }
            Selection::None | Selection::Many(_) => Ok(Vec::new()),
        };

        self.buses.commit(ticket, outcome);
        &self.buses
    }
}
