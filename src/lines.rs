//! Live status of the rail network: Tube, DLR, Elizabeth line and Tram.

use std::collections::HashSet;

use tracing::debug;

use crate::config::Endpoints;
use crate::error::FetchError;
use crate::fetch::{self, HttpClient};

/// One line's operational status, as reported by TrackerNet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStatus {
    pub line: String,
    pub status: String,
}

/// Fetches the current status of every line on the network.
///
/// # Errors
///
/// `UpstreamUnavailable` on network failure or a non-success status,
/// `MalformedResponse` if the body cannot be parsed.
#[tracing::instrument(skip(client, endpoints))]
pub async fn fetch_line_statuses<C: HttpClient>(
    client: &C,
    endpoints: &Endpoints,
) -> Result<Vec<LineStatus>, FetchError> {
    let body = fetch::fetch_text(client, &endpoints.line_status).await?;
    let statuses = parse_line_statuses(&body)?;
    debug!(count = statuses.len(), "line statuses parsed");
    Ok(statuses)
}

/// Parses a TrackerNet LineStatus document.
///
/// The feed prepends a UTF-8 byte order mark to the body, which is not valid
/// at the start of an XML document and is stripped before parsing. Each
/// top-level element describes one line: the name comes from the `Name`
/// attribute of its `Line` child and the status from the `Description`
/// attribute of its `Status` child.
pub fn parse_line_statuses(body: &str) -> Result<Vec<LineStatus>, FetchError> {
    let body = body.trim_start_matches('\u{feff}');

    let doc = roxmltree::Document::parse(body)
        .map_err(|e| FetchError::MalformedResponse(format!("line status XML: {e}")))?;

    let mut result = Vec::new();

    for entry in doc.root_element().children().filter(|n| n.is_element()) {
        let line = entry
            .children()
            .find(|c| c.tag_name().name() == "Line")
            .and_then(|c| c.attribute("Name"))
            .ok_or_else(|| {
                FetchError::MalformedResponse("line entry without a Line Name".to_string())
            })?;

        let status = entry
            .children()
            .find(|c| c.tag_name().name() == "Status")
            .and_then(|c| c.attribute("Description"))
            .ok_or_else(|| {
                FetchError::MalformedResponse(
                    "line entry without a Status Description".to_string(),
                )
            })?;

        result.push(LineStatus {
            line: line.to_string(),
            status: status.to_string(),
        });
    }

    Ok(result)
}

/// Restricts `all` to the lines named in `selected`.
///
/// An empty selection yields an empty result, never the full set.
pub fn filter_lines(all: &[LineStatus], selected: &HashSet<String>) -> Vec<LineStatus> {
    all.iter()
        .filter(|s| selected.contains(&s.line))
        .cloned()
        .collect()
}
