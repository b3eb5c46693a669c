// src/net/throttle.rs
// =============================================================================
// This module limits how hard we hit the site.
//
// Two tools work together:
// - A permit pool (tokio Semaphore): at most N fetches are in flight at once
// - A random pause after each fetch, so requests don't arrive on a fixed beat
//
// Every fetch in the crawl (listing pages, detail pages, contact pages) goes
// through the same Throttle, so N is a global budget.
//
// Every wait here (for a permit, for the fetch, for a pause) also watches a
// CancellationToken, so a stop request takes effect right away.
//
// Rust concepts:
// - Arc<Semaphore>: A shared counter of permits, cloned cheaply between users
// - RAII permits: The permit is released when it is dropped
// - tokio::select!: Whichever future finishes first wins, the other is dropped
// =============================================================================

use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A random duration between `min` and `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    pub min: Duration,
    pub max: Duration,
}

impl Jitter {
    pub const ZERO: Jitter = Jitter {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn secs(min: f64, max: f64) -> Self {
        Self {
            min: Duration::from_secs_f64(min),
            max: Duration::from_secs_f64(max),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rng.random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// How long to pause after fetches and between listing pages.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayPolicy {
    /// Pause after every fetch, once its permit is released
    pub after_fetch: Jitter,
    /// Occasional extra pause: (probability, length)
    pub long_pause: Option<(f64, Jitter)>,
    /// Pause between two listing pages
    pub between_pages: Jitter,
}

impl DelayPolicy {
    pub fn standard() -> Self {
        Self {
            after_fetch: Jitter::secs(0.5, 1.5),
            long_pause: None,
            between_pages: Jitter::secs(2.0, 4.0),
        }
    }

    // Slower and less regular: higher floor, wider spread, and one fetch in
    // twenty is followed by an extra 2-5 seconds
    pub fn safe() -> Self {
        Self {
            after_fetch: Jitter::secs(1.5, 3.0),
            long_pause: Some((0.05, Jitter::secs(2.0, 5.0))),
            between_pages: Jitter::secs(2.0, 4.0),
        }
    }

    // No pauses at all (tests)
    pub fn none() -> Self {
        Self {
            after_fetch: Jitter::ZERO,
            long_pause: None,
            between_pages: Jitter::ZERO,
        }
    }

    fn after_fetch_delay(&self) -> Duration {
        let mut rng = rand::rng();
        let mut delay = self.after_fetch.sample(&mut rng);
        if let Some((chance, extra)) = self.long_pause {
            if rng.random_bool(chance.clamp(0.0, 1.0)) {
                delay += extra.sample(&mut rng);
            }
        }
        delay
    }

    fn between_pages_delay(&self) -> Duration {
        self.between_pages.sample(&mut rand::rng())
    }
}

/// Permit pool plus delay policy, shared by every fetch of a crawl.
#[derive(Debug, Clone)]
pub struct Throttle {
    permits: Arc<Semaphore>,
    size: usize,
    delays: DelayPolicy,
}

impl Throttle {
    // A pool of `size` permits (at least one)
    pub fn new(size: usize, delays: DelayPolicy) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            delays,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn delays(&self) -> &DelayPolicy {
        &self.delays
    }

    // Runs one fetch under a permit, then pauses before returning
    //
    // The permit is held only while `fetch` runs. The pause happens after
    // release, so other paths can use the permit while this one waits.
    // Returns None when `cancel` fires before the fetch completes.
    pub async fn run<F, Fut, T>(&self, cancel: &CancellationToken, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if cancel.is_cancelled() {
            return None;
        }

        let output = {
            // acquire() only fails on a closed semaphore, and we never close it
            let _permit = tokio::select! {
                permit = self.permits.acquire() => permit.ok(),
                _ = cancel.cancelled() => return None,
            };
            tokio::select! {
                output = fetch() => output,
                _ = cancel.cancelled() => {
                    debug!("Request dropped, crawl cancelled");
                    return None;
                }
            }
        };

        let delay = self.delays.after_fetch_delay();
        if !delay.is_zero() {
            debug!("Waiting {:.1}s before the next request", delay.as_secs_f64());
            pause(delay, cancel).await;
        }

        Some(output)
    }

    // Pause between two listing pages
    pub async fn page_pause(&self, cancel: &CancellationToken) {
        let delay = self.delays.between_pages_delay();
        if !delay.is_zero() {
            debug!("Waiting {:.1}s before the next listing page", delay.as_secs_f64());
            pause(delay, cancel).await;
        }
    }
}

// Sleeps for `delay`, or less if the crawl is cancelled meanwhile
async fn pause(delay: Duration, cancel: &CancellationToken) {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = cancel.cancelled() => {}
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Semaphore and not buffer_unordered alone?
//    - buffer_unordered(N) limits one stream of futures
//    - Our fetches come from several places (listing, detail, contact pages)
//    - A shared Semaphore limits all of them together
//
// 2. Why is the random number computed before sleeping?
//    - rand::rng() is not Send, so it must not live across an .await
//    - We compute the Duration first, drop the rng, then sleep
//
// 3. What does `let _permit = ...` do?
//    - The permit is returned to the pool when `_permit` is dropped
//    - Putting it in its own block { } controls exactly when that happens
//
// 4. What happens to a fetch that loses a select!?
//    - Its future is dropped, which aborts it (reqwest closes the request)
//    - The permit is dropped with it, so nothing leaks
// -----------------------------------------------------------------------------
