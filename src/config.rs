//! Upstream endpoint configuration.

use std::env;

const LINE_STATUS_URL: &str = "http://cloud.tfl.gov.uk/TrackerNet/LineStatus";
const BIKE_POINT_URL: &str = "https://api.tfl.gov.uk/BikePoint";
const STOP_POINT_URL: &str = "https://api.tfl.gov.uk/StopPoint";

/// Base URLs of the three upstream feeds.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub line_status: String,
    pub bike_point: String,
    pub stop_point: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            line_status: LINE_STATUS_URL.to_string(),
            bike_point: BIKE_POINT_URL.to_string(),
            stop_point: STOP_POINT_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Reads overrides from the environment, falling back to the TfL
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            line_status: env::var("COMMUTE_LINE_STATUS_URL").unwrap_or(defaults.line_status),
            bike_point: env::var("COMMUTE_BIKE_POINT_URL").unwrap_or(defaults.bike_point),
            stop_point: env::var("COMMUTE_STOP_POINT_URL").unwrap_or(defaults.stop_point),
        }
    }

    /// URL of a single dock's status record.
    pub fn bike_point_url(&self, dock_id: &str) -> String {
        format!("{}/{}", self.bike_point.trim_end_matches('/'), dock_id)
    }

    /// URL of the arrival predictions for one stop.
    pub fn arrivals_url(&self, stop_id: &str) -> String {
        format!("{}/{}/Arrivals", self.stop_point.trim_end_matches('/'), stop_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterized_urls() {
        let endpoints = Endpoints {
            line_status: "http://upstream.test/LineStatus".to_string(),
            bike_point: "http://upstream.test/BikePoint/".to_string(),
            stop_point: "http://upstream.test/StopPoint".to_string(),
        };

        assert_eq!(
            endpoints.bike_point_url("BikePoints_109"),
            "http://upstream.test/BikePoint/BikePoints_109"
        );
        assert_eq!(
            endpoints.arrivals_url("490001180E"),
            "http://upstream.test/StopPoint/490001180E/Arrivals"
        );
    }
}
