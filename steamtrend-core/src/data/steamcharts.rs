//! Player-count history from the chart-data endpoint.
//!
//! `GET {steamcharts}/app/{id}/chart-data.json` answers with
//! `{"data": [[timestamp_ms, players], ...]}`.

use reqwest::header::{HeaderMap, HeaderValue, TE};
use serde::Deserialize;

use super::client::{browser_headers, SteamClient, ACCEPT_JSON};
use super::provider::DataError;
use crate::series::{AppId, TimeSeriesPoint};

#[derive(Debug, Deserialize)]
struct ChartDataResponse {
    data: Vec<(i64, Option<f64>)>,
}

impl SteamClient {
    /// Fetch a game's player history. Empty on any non-200 response.
    pub fn player_history(&self, app_id: AppId) -> Result<Vec<TimeSeriesPoint>, DataError> {
        let id = app_id.to_string();
        let base = &self.endpoints().steamcharts;
        let url = self.endpoint(base, &["app", id.as_str(), "chart-data.json"])?;
        let referer = self.endpoint(base, &["app", id.as_str()])?;

        match self.get_text(&url, Some(chart_data_headers(referer.as_str()))) {
            Some(body) => parse_chart_data(&body),
            None => Ok(Vec::new()),
        }
    }
}

/// Browser header set plus `TE: trailers`, as the chart page's own XHR sends.
fn chart_data_headers(referer: &str) -> HeaderMap {
    let mut headers = browser_headers(ACCEPT_JSON, referer);
    headers.insert(TE, HeaderValue::from_static("trailers"));
    headers
}

/// Parse a chart-data body. Rows with a `null` player count are skipped.
pub fn parse_chart_data(body: &str) -> Result<Vec<TimeSeriesPoint>, DataError> {
    let response: ChartDataResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse chart data: {e}"))
    })?;

    Ok(response
        .data
        .into_iter()
        .filter_map(|(timestamp, players)| players.map(|v| TimeSeriesPoint::new(timestamp, v)))
        .collect())
}
