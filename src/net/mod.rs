// src/net/mod.rs
// =============================================================================
// This module contains everything that touches the network.
//
// Submodules:
// - transport: The Transport trait and its reqwest implementation
// - throttle: Permit pool and randomized delays shared by all fetches
// - session: Login and session cookie capture
// =============================================================================

mod session;
mod throttle;
mod transport;

pub use session::{login, LOGIN_PATH};
pub use throttle::{DelayPolicy, Jitter, Throttle};
pub use transport::{fetch_html, HttpResponse, ReqwestTransport, Transport, DEFAULT_USER_AGENT};
