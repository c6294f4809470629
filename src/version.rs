//! Majority-vote cache of the Bakaláři version pair.
//!
//! Clients refuse to talk to a server whose advertised versions look too old
//! or too new, so the mock reports whatever most real deployments run. The
//! value is found by sampling random schools from the public directory and is
//! refreshed in the background at most once an hour.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::directory::{Directory, SchoolInfo};
use crate::error::Error;
use crate::types::Versions;

/// API version reported until the first refresh completes.
pub const SEED_API_VERSION: &str = "3.23.0";
/// Application version reported until the first refresh completes.
pub const SEED_APP_VERSION: &str = "1.52.1102.1";
/// Maximum age of the cached pair before a read schedules a refresh.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(60 * 60);
/// Successful school samples collected per refresh.
pub const SAMPLE_COUNT: usize = 10;
/// Upper bound on fetching rounds per refresh, successful or not.
pub const MAX_SAMPLE_ATTEMPTS: usize = 100;

/// Process-wide, lazily refreshed version pair.
///
/// Reads never wait for the network. A stale read spawns a single background
/// refresh onto the current tokio runtime; further reads keep returning the
/// previous pair until that refresh commits.
pub struct VersionCache<D> {
    inner: Arc<Inner<D>>,
}

// Manual Clone: avoid derive adding a `D: Clone` bound.
impl<D> Clone for VersionCache<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<D> {
    directory: D,
    state: Mutex<CacheState>,
}

struct CacheState {
    versions: Versions,
    refreshed_at: Option<Instant>,
    refreshing: bool,
}

impl CacheState {
    fn is_stale(&self, now: Instant) -> bool {
        self.refreshed_at
            .is_none_or(|at| now.saturating_duration_since(at) > FRESHNESS_WINDOW)
    }
}

impl<D: Directory> VersionCache<D> {
    /// Create an idle cache holding the seed versions.
    ///
    /// The cache starts out stale, so the first [`read`](Self::read) schedules a refresh.
    #[must_use]
    pub fn new(directory: D) -> Self {
        Self {
            inner: Arc::new(Inner {
                directory,
                state: Mutex::new(CacheState {
                    versions: Versions::new(SEED_API_VERSION, SEED_APP_VERSION),
                    refreshed_at: None,
                    refreshing: false,
                }),
            }),
        }
    }

    /// Create a cache and immediately start its first refresh.
    ///
    /// Must be called from within a tokio runtime for the refresh to run.
    #[must_use]
    pub fn start(directory: D) -> Self {
        let cache = Self::new(directory);
        cache.inner.state.lock().refreshing = true;
        if !cache.spawn_refresh() {
            cache.inner.state.lock().refreshing = false;
        }
        cache
    }

    /// Current best-known versions.
    ///
    /// Schedules a background refresh when the pair is older than
    /// [`FRESHNESS_WINDOW`] and no refresh is running.
    pub fn read(&self) -> Versions {
        let (versions, trigger) = {
            let mut state = self.inner.state.lock();
            let trigger = !state.refreshing && state.is_stale(Instant::now());
            if trigger {
                state.refreshing = true;
            }
            (state.versions.clone(), trigger)
        };

        if trigger && !self.spawn_refresh() {
            self.inner.state.lock().refreshing = false;
        }
        versions
    }

    fn spawn_refresh(&self) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime available, skipping version update");
            return false;
        };
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move { inner.refresh().await });
        true
    }
}

impl<D: Directory> Inner<D> {
    async fn refresh(&self) {
        let in_flight = InFlight(Some(&self.state));
        tracing::info!("Running Bakaláři version update");

        let mut rng = StdRng::from_rng(&mut rand::rng());
        let tally = match sample_versions(&self.directory, &mut rng).await {
            Ok(tally) => tally,
            Err(e) => {
                tracing::error!(error = %e, "Updating Bakaláři version failed");
                return;
            }
        };

        let samples = tally.samples;
        let Some(versions) = tally.into_versions() else {
            tracing::warn!("Bakaláři version update collected no samples, keeping previous versions");
            return;
        };

        tracing::info!(
            api = %versions.api,
            app = %versions.app,
            samples,
            "Finished Bakaláři version update"
        );
        // A partial tally is published but left stale, so the next read resamples.
        in_flight.commit(versions, samples >= SAMPLE_COUNT);
    }
}

/// Clears the in-flight flag when a refresh ends, whichever way it ends.
struct InFlight<'a>(Option<&'a Mutex<CacheState>>);

impl InFlight<'_> {
    /// Publish new versions and clear the flag in one critical section.
    ///
    /// The freshness timestamp only advances when `complete` is set.
    fn commit(mut self, versions: Versions, complete: bool) {
        if let Some(state) = self.0.take() {
            let mut state = state.lock();
            state.versions = versions;
            if complete {
                state.refreshed_at = Some(Instant::now());
            }
            state.refreshing = false;
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.0.take() {
            state.lock().refreshing = false;
        }
    }
}

/// Occurrence counts of each version string across the collected samples.
#[derive(Debug, Default)]
struct Tally {
    api: BTreeMap<String, usize>,
    app: BTreeMap<String, usize>,
    samples: usize,
}

impl Tally {
    fn record(&mut self, info: SchoolInfo) {
        *self.api.entry(info.api_version).or_default() += 1;
        *self.app.entry(info.application_version).or_default() += 1;
        self.samples += 1;
    }

    /// Most frequent api and app versions, chosen independently.
    fn into_versions(self) -> Option<Versions> {
        Some(Versions {
            api: plurality(self.api)?,
            app: plurality(self.app)?,
        })
    }
}

/// Ties go to the lexicographically smallest version.
fn plurality(counts: BTreeMap<String, usize>) -> Option<String> {
    counts
        .into_iter()
        .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)))
        .map(|(version, _)| version)
}

/// Collects up to [`SAMPLE_COUNT`] version reports from random schools.
///
/// Only a failed city listing aborts; any other failure just retries the
/// round. Rounds that hit the network count toward [`MAX_SAMPLE_ATTEMPTS`].
async fn sample_versions<D, R>(directory: &D, rng: &mut R) -> Result<Tally, Error>
where
    D: Directory,
    R: Rng + Send,
{
    let cities = directory.cities().await?;
    let mut tally = Tally::default();

    // Cities with an unknown count are still worth asking about.
    if cities.iter().all(|city| city.school_count == Some(0)) {
        return Ok(tally);
    }

    let mut attempts = 0;
    while tally.samples < SAMPLE_COUNT && attempts < MAX_SAMPLE_ATTEMPTS {
        let city = &cities[rng.random_range(0..cities.len())];
        if city.school_count == Some(0) {
            tokio::task::yield_now().await;
            continue;
        }
        attempts += 1;

        let details = match directory.city(&city.name).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(city = %city.name, error = %e, "Fetching city failed, retrying");
                continue;
            }
        };
        if details.schools.is_empty() {
            continue;
        }

        let school = &details.schools[rng.random_range(0..details.schools.len())];
        let school_url = school.school_url.trim_end_matches('/');
        match directory.school_info(school_url).await {
            Ok(info) => tally.record(info),
            Err(e) => {
                tracing::warn!(school_url, error = %e, "Failed to fetch API version, retrying");
            }
        }
    }

    if tally.samples < SAMPLE_COUNT {
        tracing::warn!(
            samples = tally.samples,
            attempts,
            "Sampling attempts exhausted before collecting every sample"
        );
    }
    Ok(tally)
}
