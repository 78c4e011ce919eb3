//! Blocking HTTP client shared by every Steam endpoint.
//!
//! One synchronous GET per call, default client timeouts, no retries. A
//! non-200 status or a transport failure is logged and surfaces as `None`;
//! callers turn that into an empty result.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{info, warn};
use url::Url;

use super::catalog::Catalog;
use super::provider::{DataError, MarketItem, SteamSource};
use crate::config::{Endpoints, MarketConfig, TrackerConfig};
use crate::series::{AppId, TimeSeriesPoint};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/112.0";

const CONSENT_COOKIE: &str = "dnsDisplayed=undefined; ccpaApplies=false; signedLspa=undefined; \
     _sp_su=false; consentUUID=a3cebe9b-a750-4c4b-954f-6d8b70486a82_18; \
     ccpaUUID=28a04786-458e-444d-bd1b-ad50e8352e05";

pub(crate) const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
pub(crate) const ACCEPT_ANY: &str = "*/*";

/// Header set that makes requests look like the site's own XHR calls.
pub(crate) fn browser_headers(accept: &'static str, referer: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static(accept));
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("it-IT,it;q=0.8,en-US;q=0.5,en;q=0.3"),
    );
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(reqwest::header::COOKIE, HeaderValue::from_static(CONSENT_COOKIE));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    match HeaderValue::from_str(referer) {
        Ok(value) => {
            headers.insert(reqwest::header::REFERER, value);
        }
        Err(e) => warn!(referer, error = %e, "dropping unencodable referer header"),
    }
    headers
}

/// Steam data source backed by live HTTP requests.
pub struct SteamClient {
    client: reqwest::blocking::Client,
    endpoints: Endpoints,
    page_size: u32,
}

impl SteamClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoints,
            page_size: MarketConfig::default().page_size,
        })
    }

    /// Build a client from a full tracker configuration.
    pub fn from_config(config: &TrackerConfig) -> Result<Self, DataError> {
        Ok(Self::new(config.endpoints.clone())?.with_page_size(config.market.page_size))
    }

    /// Results requested per market search page.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Append percent-encoded path segments to a configured base URL.
    ///
    /// An empty final segment produces a trailing slash.
    pub(crate) fn endpoint(&self, base: &str, segments: &[&str]) -> Result<Url, DataError> {
        let mut url = Url::parse(base).map_err(|e| DataError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DataError::InvalidUrl(format!("{base}: cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and return the body of a 200 response.
    pub(crate) fn get_text(&self, url: &Url, headers: Option<HeaderMap>) -> Option<String> {
        info!(%url, "GET");
        let mut request = self.client.get(url.clone());
        if let Some(headers) = headers {
            request = request.headers(headers);
        }

        let response = match request.send() {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "request failed");
                return None;
            }
        };

        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, %status, error = %e, "failed to read response body");
                return None;
            }
        };

        if status != reqwest::StatusCode::OK {
            warn!(%url, %status, body = %body, "non-200 response");
            return None;
        }
        Some(body)
    }
}

impl SteamSource for SteamClient {
    fn name(&self) -> &str {
        "steam"
    }

    fn fetch_player_history(&self, app_id: AppId) -> Result<Vec<TimeSeriesPoint>, DataError> {
        self.player_history(app_id)
    }

    fn fetch_item_price_history(
        &self,
        item_name: &str,
        app_id: AppId,
    ) -> Result<Option<String>, DataError> {
        self.item_price_history_raw(item_name, app_id)
    }

    fn fetch_catalog(&self) -> Result<Catalog, DataError> {
        self.app_catalog()
    }

    fn fetch_all_items_for_game(
        &self,
        app_id: AppId,
    ) -> Result<BTreeMap<String, MarketItem>, DataError> {
        self.market_items(app_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_headers_carry_referer_and_cookie() {
        let headers = browser_headers(ACCEPT_JSON, "https://steamcharts.com/app/570");
        assert_eq!(
            headers.get(reqwest::header::REFERER).unwrap(),
            "https://steamcharts.com/app/570"
        );
        assert!(headers
            .get(reqwest::header::COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("consentUUID="));
        assert_eq!(headers.get("x-requested-with").unwrap(), "XMLHttpRequest");
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let client = SteamClient::new(Endpoints::default()).unwrap();
        let url = client
            .endpoint("https://steamcommunity.com", &["market", "listings", "730", "Chroma 2 Case"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://steamcommunity.com/market/listings/730/Chroma%202%20Case"
        );

        let url = client
            .endpoint("http://localhost:8080/mirror/", &["app", "570", "chart-data.json"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/mirror/app/570/chart-data.json");
    }

    #[test]
    fn trailing_empty_segment_keeps_slash() {
        let client = SteamClient::new(Endpoints::default()).unwrap();
        let url = client
            .endpoint("http://api.steampowered.com", &["ISteamApps", "GetAppList", "v0002", ""])
            .unwrap();
        assert_eq!(url.as_str(), "http://api.steampowered.com/ISteamApps/GetAppList/v0002/");
    }

    #[test]
    fn bad_base_url_is_reported() {
        let client = SteamClient::new(Endpoints::default()).unwrap();
        assert!(matches!(
            client.endpoint("not a url", &["x"]),
            Err(DataError::InvalidUrl(_))
        ));
    }
}
