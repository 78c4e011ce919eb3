//! Application catalog: app id → display name.
//!
//! Fetched once per run by the caller and passed around by reference.

use std::collections::HashMap;

use serde::Deserialize;

use super::client::SteamClient;
use super::provider::DataError;
use crate::series::AppId;

#[derive(Debug, Deserialize)]
struct AppListResponse {
    applist: AppList,
}

#[derive(Debug, Deserialize)]
struct AppList {
    apps: Vec<AppEntry>,
}

#[derive(Debug, Deserialize)]
struct AppEntry {
    appid: AppId,
    name: String,
}

/// In-memory lookup from app id to name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    names: HashMap<AppId, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, app_id: AppId, name: impl Into<String>) {
        self.names.insert(app_id, name.into());
    }

    pub fn name(&self, app_id: AppId) -> Option<&str> {
        self.names.get(&app_id).map(|s| s.as_str())
    }

    /// Display label for a game: its catalog name, or the id itself.
    pub fn label(&self, app_id: AppId) -> String {
        self.name(app_id)
            .map(str::to_string)
            .unwrap_or_else(|| app_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(AppId, String)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (AppId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Parse a `GetAppList` body. Later duplicates of an id win.
pub fn parse_app_list(body: &str) -> Result<Catalog, DataError> {
    let response: AppListResponse = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("failed to parse app list: {e}")))?;
    Ok(response
        .applist
        .apps
        .into_iter()
        .map(|app| (app.appid, app.name))
        .collect())
}

impl SteamClient {
    /// Fetch the full catalog in one request. Empty on any non-200 response.
    pub fn app_catalog(&self) -> Result<Catalog, DataError> {
        let url = self.endpoint(
            &self.endpoints().web_api,
            &["ISteamApps", "GetAppList", "v0002", ""],
        )?;
        match self.get_text(&url, None) {
            Some(body) => parse_app_list(&body),
            None => Ok(Catalog::new()),
        }
    }
}
