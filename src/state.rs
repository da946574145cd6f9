use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::database::Collections;
use crate::error::ApiError;

/// Shared router state.
///
/// Starts uninitialized; `bind` moves it to ready exactly once. Until then
/// every handler that needs a collection answers 503.
#[derive(Clone, Default)]
pub struct AppState {
    collections: Arc<OnceCell<Collections>>,
}

impl AppState {
    /// State with no collections bound yet
    pub fn new() -> Self {
        Self::default()
    }

    /// State that is ready from the start
    pub fn with_collections(collections: Collections) -> Self {
        Self {
            collections: Arc::new(OnceCell::with_value(collections)),
        }
    }

    /// Bind the collections. Returns them back if the state was already bound.
    pub fn bind(&self, collections: Collections) -> Result<(), Collections> {
        self.collections.set(collections)
    }

    pub fn is_ready(&self) -> bool {
        self.collections.get().is_some()
    }

    pub fn collections(&self) -> Result<&Collections, ApiError> {
        self.collections
            .get()
            .ok_or_else(|| ApiError::service_unavailable("Database not initialized"))
    }
}
