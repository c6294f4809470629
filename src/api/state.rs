use std::sync::Arc;

use crate::version::VersionCache;

/// Shared state for API route handlers.
pub struct AppState<D, S> {
    pub(super) versions: VersionCache<D>,
    pub(super) store: Arc<S>,
}

// Manual Clone: avoid derive adding `D: Clone, S: Clone` bounds.
impl<D, S> Clone for AppState<D, S> {
    fn clone(&self) -> Self {
        Self {
            versions: self.versions.clone(),
            store: Arc::clone(&self.store),
        }
    }
}
