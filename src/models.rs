// src/models.rs
// =============================================================================
// The data that flows through a crawl.
//
//   Credentials --login--> Session
//   ListingQuery --listing page--> BasicRecord --detail page--> DetailedRecord
//
// Records are plain structs with Option fields: a value we could not find
// on the page is None rather than a made-up placeholder.
// =============================================================================

use crate::catalog;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use url::Url;

/// Username and password for the site login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Never print the password, even in debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cookies captured from a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<(String, String)>,
}

impl Session {
    pub fn new(cookies: Vec<(String, String)>) -> Self {
        Self { cookies }
    }

    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    // Value for a `Cookie:` request header, None when there are no cookies
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let header = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }
}

/// The scope of one crawl: which listing pages to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub level: String,
    pub county_id: String,
    pub district_id: String,
    pub vacancy_type: String,
    pub max_pages: Option<i32>,
}

impl ListingQuery {
    // Builds a query, dropping the district unless it makes sense
    //
    // Districts only exist for Dublin, and only the ids in the catalog are
    // understood by the site.
    pub fn new(
        level: impl Into<String>,
        county_id: impl Into<String>,
        district_id: impl Into<String>,
        vacancy_type: impl Into<String>,
        max_pages: Option<i32>,
    ) -> Self {
        let county_id = county_id.into();
        let requested_district = district_id.into();

        let district_id = if requested_district.is_empty() {
            String::new()
        } else if county_id != catalog::DUBLIN_COUNTY_ID {
            warn!(
                district = %requested_district,
                "District filter ignored: only Dublin has districts"
            );
            String::new()
        } else if !catalog::is_known_district(&requested_district) {
            warn!(district = %requested_district, "Unknown Dublin district id, ignoring it");
            String::new()
        } else {
            info!(
                "Filtering by district: {}",
                catalog::DUBLIN_DISTRICTS[requested_district.as_str()]
            );
            requested_district
        };

        Self {
            level: level.into(),
            county_id,
            district_id,
            vacancy_type: vacancy_type.into(),
            max_pages,
        }
    }

    // Absolute URL of one listing page
    pub fn page_url(&self, base: &Url, page: u32) -> Result<Url, url::ParseError> {
        let mut url = base.join(&format!("/posts/{}", catalog::level_segment(&self.level)))?;
        url.query_pairs_mut()
            .append_pair("sb", "application_closing_date")
            .append_pair("sd", "0")
            .append_pair("p", &page.to_string())
            .append_pair("cy", &self.county_id)
            .append_pair("pd", &self.district_id)
            .append_pair("vc", &self.vacancy_type)
            .append_pair("ptl", "")
            .append_pair("ga", "0");
        Ok(url)
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self::new("primary", "", "", "", None)
    }
}

/// A vacancy as summarised on a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicRecord {
    pub url: String,
    pub id: Option<String>,
    pub school: Option<String>,
    pub vacancy: Option<String>,
    pub status: Option<String>,
    pub county: Option<String>,
    pub deadline: Option<String>,
}

impl BasicRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Salary and schedule phrases found on a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
}

impl PositionInfo {
    pub fn is_empty(&self) -> bool {
        self.salary.is_none() && self.schedule.is_none()
    }
}

/// A vacancy enriched with everything we could read from its detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedRecord {
    #[serde(flatten)]
    pub basic: BasicRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_info: Option<PositionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
}

impl DetailedRecord {
    pub fn from_basic(basic: BasicRecord) -> Self {
        Self {
            basic,
            ..Default::default()
        }
    }

    // Everything the vacancy re-check looks at, as one string
    pub fn vacancy_text(&self) -> String {
        [
            self.basic.vacancy.as_deref(),
            self.description.as_deref(),
            self.requirements.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}
