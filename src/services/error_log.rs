use crate::db::{NewErrorLog, Store};
use tracing::error;

/// Persists unexpected request failures to `error_logs`.
pub struct ErrorLogService {
    store: Store,
}

impl ErrorLogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Writes the entry. A failed write is only logged.
    pub async fn record(&self, entry: NewErrorLog) {
        let source = entry.source.clone();
        if let Err(e) = self.store.add_error_log(entry).await {
            error!(error = %e, source = %source, "Failed to save error log");
        }
    }
}
