use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::text::{form_value, to_valid_text};

/// A stored short key and the URL it points at
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedirectEntry {
    pub key: String,
    pub target: String,
}

// Form body of `POST /add`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddRedirectForm {
    pub key: String,
    pub to: String,
}

impl AddRedirectForm {
    /// Reads the fields from a raw urlencoded body. Missing fields are empty
    /// and bytes that are not valid UTF-8 are dropped.
    pub fn from_body(body: &[u8]) -> Self {
        Self {
            key: to_valid_text(&form_value(body, "key")),
            to: to_valid_text(&form_value(body, "to")),
        }
    }
}

// Form body of `POST /checkRedirect`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckRedirectForm {
    pub url: String,
}

impl CheckRedirectForm {
    pub fn from_body(body: &[u8]) -> Self {
        Self {
            url: to_valid_text(&form_value(body, "url")),
        }
    }
}

// Query string of `GET /stats`
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub key: String,
}

/// Event counts inside the analytics window
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub creations_last_24h: usize,
    pub redirects_last_24h: usize,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Creations today: {}\nRedirects today: {}\n",
            self.creations_last_24h, self.redirects_last_24h
        )
    }
}

// Data handed to the landing page
#[derive(Debug, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub header: String,
    pub base_url: String,
}
