// src/rules/mod.rs
// =============================================================================
// This module holds the inclusion/exclusion rules of the crawler.
//
// Submodules:
// - vacancy: Which vacancy labels and schools we keep
// - email: Which contact emails we accept
//
// Nothing in here touches the network; every function is a pure check on a
// string, which keeps them easy to test.
// =============================================================================

mod email;
mod vacancy;

pub use email::{first_valid_email, is_blocklisted, BLOCKLIST};
pub use vacancy::{is_excluded_school, is_valid_vacancy, DEFAULT_EXCLUDED_SCHOOLS};
