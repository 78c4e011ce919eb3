//! Community market: listing-page price history and paged item search.
//!
//! The listing page embeds its price history as a script literal,
//! `var line1=[["Jul 02 2014 01: +0",0.13,"1"], ...];`. The search endpoint
//! (`/market/search/render/?norender=1`) returns JSON pages of at most
//! `count` results.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::warn;

use super::client::{browser_headers, SteamClient, ACCEPT_ANY, ACCEPT_JSON};
use super::provider::{DataError, MarketItem};
use crate::series::{AppId, PricePoint};

const PRICE_MARKER: &str = "var line1=";

#[derive(Debug, Deserialize)]
pub struct SearchPage {
    pub total_count: u64,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub hash_name: String,
    pub name: String,
    /// Cents.
    pub sell_price: u64,
    pub sell_listings: u64,
}

impl From<SearchResult> for MarketItem {
    fn from(result: SearchResult) -> Self {
        Self {
            name: result.name,
            price: result.sell_price as f64 / 100.0,
            listing_count: result.sell_listings,
        }
    }
}

impl SteamClient {
    /// Fetch an item's listing page and cut out the embedded price literal.
    ///
    /// `Ok(None)` on a non-200 response. A page without the marker is a
    /// format error.
    pub fn item_price_history_raw(
        &self,
        item_name: &str,
        app_id: AppId,
    ) -> Result<Option<String>, DataError> {
        let id = app_id.to_string();
        let url = self.endpoint(
            &self.endpoints().community,
            &["market", "listings", id.as_str(), item_name],
        )?;

        let Some(html) = self.get_text(&url, Some(browser_headers(ACCEPT_ANY, url.as_str()))) else {
            return Ok(None);
        };

        extract_embedded_series(&html)
            .map(|raw| Some(raw.to_string()))
            .ok_or_else(|| {
                DataError::ResponseFormatChanged(format!(
                    "no '{PRICE_MARKER}' literal on listing page for '{item_name}'"
                ))
            })
    }

    /// Page through the search endpoint and collect every item for a game.
    ///
    /// A single failed page discards everything gathered so far and yields an
    /// empty map.
    pub fn market_items(&self, app_id: AppId) -> Result<BTreeMap<String, MarketItem>, DataError> {
        let community = &self.endpoints().community;
        let mut referer = self.endpoint(community, &["market", "search"])?;
        referer.query_pairs_mut().append_pair("appid", &app_id.to_string());
        let page_size = self.page_size();

        paginate(page_size, |start| {
            let mut url = self.endpoint(community, &["market", "search", "render", ""])?;
            url.query_pairs_mut()
                .append_pair("query", "")
                .append_pair("start", &start.to_string())
                .append_pair("count", &page_size.to_string())
                .append_pair("search_descriptions", "0")
                .append_pair("sort_column", "price")
                .append_pair("sort_dir", "desc")
                .append_pair("appid", &app_id.to_string())
                .append_pair("norender", "1");

            match self.get_text(&url, Some(browser_headers(ACCEPT_JSON, referer.as_str()))) {
                Some(body) => parse_search_page(&body).map(Some),
                None => Ok(None),
            }
        })
    }
}

/// Drive a paged search. `fetch_page(start)` returns `None` for a failed page.
///
/// Stops after a page shorter than `page_size` or once `start` reaches the
/// reported total. Later pages overwrite earlier entries with the same key.
pub fn paginate<F>(
    page_size: u32,
    mut fetch_page: F,
) -> Result<BTreeMap<String, MarketItem>, DataError>
where
    F: FnMut(u64) -> Result<Option<SearchPage>, DataError>,
{
    let page_size = u64::from(page_size.max(1));
    let mut items = BTreeMap::new();
    let mut start = 0u64;

    loop {
        let Some(page) = fetch_page(start)? else {
            if !items.is_empty() {
                warn!(
                    discarded = items.len(),
                    start, "search page failed; discarding all gathered items"
                );
            }
            return Ok(BTreeMap::new());
        };

        let returned = page.results.len() as u64;
        for result in page.results {
            items.insert(result.hash_name.clone(), MarketItem::from(result));
        }

        start += page_size;
        if returned < page_size || start >= page.total_count {
            return Ok(items);
        }
    }
}

pub fn parse_search_page(body: &str) -> Result<SearchPage, DataError> {
    serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("failed to parse search page: {e}")))
}

/// Text between `var line1=` and the next `;`, if the marker is present.
pub fn extract_embedded_series(html: &str) -> Option<&str> {
    let start = html.find(PRICE_MARKER)? + PRICE_MARKER.len();
    let rest = &html[start..];
    let end = rest.find(';')?;
    Some(&rest[..end])
}

/// Decode the embedded price literal into `PricePoint`s.
///
/// Rows look like `["Jul 02 2014 01: +0", 0.13, "1"]`: an hourly UTC stamp,
/// the median price and the volume (sometimes a string).
pub fn parse_price_history(raw: &str) -> Result<Vec<PricePoint>, DataError> {
    let rows: Vec<(String, f64, serde_json::Value)> = serde_json::from_str(raw).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse price history: {e}"))
    })?;

    rows.into_iter()
        .map(|(stamp, price, volume)| {
            Ok(PricePoint {
                timestamp: parse_market_stamp(&stamp)?,
                price,
                volume: parse_volume(&volume)?,
            })
        })
        .collect()
}

/// `"Jul 02 2014 01: +0"` → milliseconds since epoch.
fn parse_market_stamp(stamp: &str) -> Result<i64, DataError> {
    let bad = || {
        DataError::ResponseFormatChanged(format!("unrecognised market timestamp '{stamp}'"))
    };

    let head = stamp.split(':').next().ok_or_else(bad)?.trim();
    let (day, hour) = head.rsplit_once(' ').ok_or_else(bad)?;
    let date = NaiveDate::parse_from_str(day.trim(), "%b %d %Y").map_err(|_| bad())?;
    let hour: u32 = hour.parse().map_err(|_| bad())?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(bad)?;

    Ok(date.and_time(time).and_utc().timestamp_millis())
}

fn parse_volume(volume: &serde_json::Value) -> Result<u64, DataError> {
    let parsed = match volume {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| DataError::ResponseFormatChanged(format!("unrecognised volume {volume}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(hash: &str, cents: u64) -> SearchResult {
        SearchResult {
            hash_name: hash.into(),
            name: hash.to_uppercase(),
            sell_price: cents,
            sell_listings: 3,
        }
    }

    fn page(total: u64, results: Vec<SearchResult>) -> SearchPage {
        SearchPage {
            total_count: total,
            results,
        }
    }

    #[test]
    fn extracts_literal_between_marker_and_semicolon() {
        let html = r#"<script>var g_x = 1; var line1=[["Jul 02 2014 01: +0",0.13,"1"]]; var line2=[];</script>"#;
        assert_eq!(
            extract_embedded_series(html),
            Some(r#"[["Jul 02 2014 01: +0",0.13,"1"]]"#)
        );
    }

    #[test]
    fn missing_marker_extracts_nothing() {
        assert_eq!(extract_embedded_series("<html>no prices</html>"), None);
    }

    #[test]
    fn parses_price_rows() {
        let raw = r#"[["Jul 02 2014 01: +0",0.13,"1"],["Jul 03 2014 17: +0",0.25,"1,204"],["Jul 04 2014 00: +0",0.3,7]]"#;
        let points = parse_price_history(raw).unwrap();
        assert_eq!(points.len(), 3);
        // 2014-07-02T01:00:00Z
        assert_eq!(points[0].timestamp, 1_404_262_800_000);
        assert_eq!(points[0].price, 0.13);
        assert_eq!(points[0].volume, 1);
        assert_eq!(points[1].volume, 1204);
        assert_eq!(points[2].volume, 7);
    }

    #[test]
    fn bad_stamp_is_a_format_error() {
        let err = parse_price_history(r#"[["yesterday",0.13,"1"]]"#).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn search_page_parses_and_converts_cents() {
        let body = r#"{"success":true,"start":0,"pagesize":100,"total_count":1,
            "results":[{"name":"Chroma 2 Case","hash_name":"Chroma 2 Case","sell_listings":52113,"sell_price":57,"sell_price_text":"$0.57"}]}"#;
        let page = parse_search_page(body).unwrap();
        assert_eq!(page.total_count, 1);
        let item = MarketItem::from(page.results.into_iter().next().unwrap());
        assert_eq!(item.name, "Chroma 2 Case");
        assert!((item.price - 0.57).abs() < 1e-12);
        assert_eq!(item.listing_count, 52113);
    }

    #[test]
    fn paginate_stops_on_short_page() {
        let mut starts = Vec::new();
        let items = paginate(2, |start| {
            starts.push(start);
            Ok(Some(match start {
                0 => page(10, vec![result("a", 100), result("b", 200)]),
                2 => page(10, vec![result("c", 300)]),
                _ => unreachable!("requested page past a short page"),
            }))
        })
        .unwrap();
        assert_eq!(starts, vec![0, 2]);
        assert_eq!(items.len(), 3);
        assert_eq!(items["b"].price, 2.0);
    }

    #[test]
    fn paginate_stops_at_total_count() {
        let mut calls = 0;
        let items = paginate(2, |_| {
            calls += 1;
            Ok(Some(page(2, vec![result("a", 1), result("b", 2)])))
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn later_pages_overwrite_duplicates() {
        let items = paginate(1, |start| {
            Ok(Some(match start {
                0 => page(2, vec![result("a", 100)]),
                _ => page(2, vec![result("a", 900)]),
            }))
        })
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items["a"].price, 9.0);
    }

    #[test]
    fn failed_page_discards_everything() {
        let items = paginate(1, |start| {
            Ok(match start {
                0 => Some(page(5, vec![result("a", 100)])),
                _ => None,
            })
        })
        .unwrap();
        assert!(items.is_empty());
    }
}
