//! Bus arrival predictions for a single stop.

use chrono::{DateTime, Timelike};
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::config::Endpoints;
use crate::error::FetchError;
use crate::fetch::{self, HttpClient};

/// One predicted arrival at the requested stop.
#[derive(Debug, Clone, PartialEq)]
pub struct BusArrival {
    pub stop_id: String,
    pub route: String,
    pub destination: String,
    pub eta: DateTime<Tz>,
    pub vehicle_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalPrediction {
    naptan_id: String,
    line_id: String,
    destination_name: Option<String>,
    towards: Option<String>,
    expected_arrival: String,
    vehicle_id: String,
}

/// Parses a StopPoint arrivals payload into predictions ordered by ascending
/// ETA. The sort is stable: equal ETAs keep the upstream order.
///
/// ETAs are converted to Europe/London and truncated to whole seconds. An
/// empty upstream array is an empty result, not an error.
pub fn parse_arrivals(body: &str) -> Result<Vec<BusArrival>, FetchError> {
    let predictions: Vec<ArrivalPrediction> = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("arrivals JSON: {e}")))?;

    let mut arrivals = Vec::with_capacity(predictions.len());
    for prediction in predictions {
        let eta = DateTime::parse_from_rfc3339(&prediction.expected_arrival)
            .map_err(|_| {
                FetchError::SchemaMismatch(format!(
                    "expectedArrival is not a timestamp: {:?}",
                    prediction.expected_arrival
                ))
            })?
            .with_timezone(&London)
            .with_nanosecond(0)
            .ok_or_else(|| FetchError::SchemaMismatch("invalid arrival time".to_string()))?;

        arrivals.push(BusArrival {
            stop_id: prediction.naptan_id,
            route: prediction.line_id,
            destination: prediction
                .destination_name
                .or(prediction.towards)
                .unwrap_or_default(),
            eta,
            vehicle_id: prediction.vehicle_id,
        });
    }

    arrivals.sort_by_key(|a| a.eta);
    Ok(arrivals)
}

/// Fetches the arrival predictions for one stop.
///
/// # Errors
///
/// `UpstreamUnavailable` on network failure or a non-success status,
/// `MalformedResponse`/`SchemaMismatch` if the payload cannot be mapped.
#[tracing::instrument(skip(client, endpoints))]
pub async fn fetch_arrivals<C: HttpClient>(
    client: &C,
    endpoints: &Endpoints,
    stop_id: &str,
) -> Result<Vec<BusArrival>, FetchError> {
    let body = fetch::fetch_text(client, &endpoints.arrivals_url(stop_id)).await?;
    let arrivals = parse_arrivals(&body)?;
    debug!(count = arrivals.len(), "arrival predictions parsed");
    Ok(arrivals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(line: &str, destination: &str, eta: &str, vehicle: &str) -> String {
        format!(
            r#"{{
                "naptanId": "490001180E",
                "lineId": "{line}",
                "destinationName": "{destination}",
                "towards": "Central London",
                "expectedArrival": "{eta}",
                "vehicleId": "{vehicle}",
                "timeToStation": 120
            }}"#
        )
    }

    #[test]
    fn test_arrivals_are_sorted_ascending_by_eta() {
        let body = format!(
            "[{},{},{}]",
            prediction("188", "North Greenwich", "2023-05-10T09:05:00Z", "LX11AZB"),
            prediction("381", "Peckham", "2023-05-10T09:01:00Z", "LX59CNV"),
            prediction("C10", "Canada Water", "2023-05-10T09:03:00Z", "LJ62BNL"),
        );

        let arrivals = parse_arrivals(&body).unwrap();

        let routes: Vec<_> = arrivals.iter().map(|a| a.route.as_str()).collect();
        assert_eq!(routes, ["381", "C10", "188"]);
        assert!(arrivals.windows(2).all(|w| w[0].eta <= w[1].eta));
    }

    #[test]
    fn test_equal_etas_keep_upstream_order() {
        let body = format!(
            "[{},{}]",
            prediction("188", "North Greenwich", "2023-05-10T09:01:00Z", "FIRST"),
            prediction("381", "Peckham", "2023-05-10T09:01:00Z", "SECOND"),
        );

        let arrivals = parse_arrivals(&body).unwrap();

        assert_eq!(arrivals[0].vehicle_id, "FIRST");
        assert_eq!(arrivals[1].vehicle_id, "SECOND");
    }

    #[test]
    fn test_eta_is_london_time_truncated_to_seconds() {
        let body = format!(
            "[{}]",
            prediction("188", "North Greenwich", "2023-06-10T09:01:30.500Z", "LX11AZB")
        );

        let arrivals = parse_arrivals(&body).unwrap();

        // June: London is on BST, one hour ahead of UTC.
        assert_eq!(arrivals[0].eta.to_rfc3339(), "2023-06-10T10:01:30+01:00");
    }

    #[test]
    fn test_destination_falls_back_to_towards() {
        let body = r#"[{
            "naptanId": "490001180E",
            "lineId": "188",
            "towards": "Central London",
            "expectedArrival": "2023-05-10T09:01:00Z",
            "vehicleId": "LX11AZB"
        }]"#;

        let arrivals = parse_arrivals(body).unwrap();
        assert_eq!(arrivals[0].destination, "Central London");
    }

    #[test]
    fn test_empty_upstream_list_is_empty_not_error() {
        assert!(parse_arrivals("[]").unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_eta_is_schema_mismatch() {
        let body = format!(
            "[{}]",
            prediction("188", "North Greenwich", "soon", "LX11AZB")
        );

        let err = parse_arrivals(&body).unwrap_err();
        assert!(matches!(err, FetchError::SchemaMismatch(_)));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = parse_arrivals("<html>offline</html>").unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }
}
