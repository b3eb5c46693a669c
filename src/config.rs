// src/config.rs
// =============================================================================
// Everything that shapes one crawl, in one struct.
//
// Values come from three places, later ones winning:
// 1. Defaults (primary level, 3 workers, 30 s timeout, no filters)
// 2. The environment, optionally loaded from a .env file:
//      EDUCATIONPOSTS_USERNAME / EDUCATIONPOSTS_PASSWORD   login
//      EDUCATIONPOSTS_BASE_URL                             site root
//      EDUCATIONPOSTS_LOG                                  default log filter
// 3. The with_* builder methods (the CLI uses these for its flags)
//
// Rust concepts:
// - Builder methods taking `mut self` and returning Self, so calls chain
// - A closure parameter (`var`) so the env parsing can be tested without
//   touching the real process environment
// =============================================================================

use crate::models::{Credentials, ListingQuery};
use crate::net::{DelayPolicy, Throttle, DEFAULT_USER_AGENT};
use crate::rules::DEFAULT_EXCLUDED_SCHOOLS;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.educationposts.ie";
pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USERNAME_VAR: &str = "EDUCATIONPOSTS_USERNAME";
const PASSWORD_VAR: &str = "EDUCATIONPOSTS_PASSWORD";
const BASE_URL_VAR: &str = "EDUCATIONPOSTS_BASE_URL";
const LOG_VAR: &str = "EDUCATIONPOSTS_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is set but {missing} is not")]
    IncompleteCredentials {
        var: &'static str,
        missing: &'static str,
    },

    #[error("invalid base URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
}

/// What to do when login is attempted and fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginFailurePolicy {
    /// Stop the crawl with CrawlError::Auth
    #[default]
    Abort,
    /// Log the failure and crawl the public pages
    ContinueUnauthenticated,
}

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Education level: primary, second_level, pre_school, ...
    pub level: String,
    /// County id, "" for all counties
    pub county_id: String,
    /// Dublin district id, "" for all
    pub district_id: String,
    /// Vacancy type code, "" for all
    pub vacancy_type: String,
    /// Size of the shared permit pool
    pub max_concurrent_workers: usize,
    /// Listing pages to read; None means all of them
    pub max_pages: Option<i32>,
    pub credentials: Option<Credentials>,
    /// Longer, less regular pauses and a single permit
    pub safe_mode: bool,
    pub base_url: Url,
    pub request_timeout: Duration,
    /// Schools whose name contains one of these (any case) are skipped
    pub excluded_school_markers: Vec<String>,
    pub login_failure: LoginFailurePolicy,
    /// Stop once this many records have been collected
    pub max_offers: Option<usize>,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            level: "primary".to_string(),
            county_id: String::new(),
            district_id: String::new(),
            vacancy_type: String::new(),
            max_concurrent_workers: DEFAULT_WORKERS,
            max_pages: None,
            credentials: None,
            safe_mode: false,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: DEFAULT_TIMEOUT,
            excluded_school_markers: DEFAULT_EXCLUDED_SCHOOLS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            login_failure: LoginFailurePolicy::Abort,
            max_offers: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlerConfig {
    // Defaults plus whatever the environment (and .env) provides
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        let credentials = match (present(USERNAME_VAR), present(PASSWORD_VAR)) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteCredentials {
                    var: USERNAME_VAR,
                    missing: PASSWORD_VAR,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteCredentials {
                    var: PASSWORD_VAR,
                    missing: USERNAME_VAR,
                })
            }
        };

        let mut config = Self {
            credentials,
            ..Self::default()
        };

        if let Some(value) = present(BASE_URL_VAR) {
            config.base_url = Url::parse(value.trim())
                .map_err(|source| ConfigError::InvalidBaseUrl { value, source })?;
        }

        Ok(config)
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_county(mut self, county_id: impl Into<String>) -> Self {
        self.county_id = county_id.into();
        self
    }

    pub fn with_district(mut self, district_id: impl Into<String>) -> Self {
        self.district_id = district_id.into();
        self
    }

    pub fn with_vacancy_type(mut self, vacancy_type: impl Into<String>) -> Self {
        self.vacancy_type = vacancy_type.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.max_concurrent_workers = workers;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<i32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_safe_mode(mut self, safe_mode: bool) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_excluded_schools(mut self, markers: Vec<String>) -> Self {
        self.excluded_school_markers = markers;
        self
    }

    pub fn with_login_failure(mut self, policy: LoginFailurePolicy) -> Self {
        self.login_failure = policy;
        self
    }

    pub fn with_max_offers(mut self, max_offers: Option<usize>) -> Self {
        self.max_offers = max_offers;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn query(&self) -> ListingQuery {
        ListingQuery::new(
            self.level.as_str(),
            self.county_id.as_str(),
            self.district_id.as_str(),
            self.vacancy_type.as_str(),
            self.max_pages,
        )
    }

    // Safe mode trades speed for a single permit and slower pauses
    pub fn throttle(&self) -> Throttle {
        if self.safe_mode {
            Throttle::new(1, DelayPolicy::safe())
        } else {
            Throttle::new(self.max_concurrent_workers, DelayPolicy::standard())
        }
    }
}

/// Logging settings, read before anything else runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Filter used when RUST_LOG is not set
    pub log_level: String,
}

impl TelemetryConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self {
            log_level: env::var(LOG_VAR).unwrap_or_else(|_| "info".to_string()),
        }
    }
}
