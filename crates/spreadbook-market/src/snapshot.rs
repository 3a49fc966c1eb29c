//! Snapshot catalog interface.

use spreadbook_core::Date;

/// Catalog of dated market/curve snapshots available for valuation.
///
/// The catalog is read-only from the core's point of view; loading,
/// caching, and refresh concurrency are the catalog implementation's
/// concern.
pub trait SnapshotCatalog: Send + Sync {
    /// All snapshot dates the provider can value against, ascending.
    fn available_dates(&self) -> Vec<Date>;

    /// Whether a snapshot exists for the given date.
    fn is_available(&self, date: Date) -> bool {
        self.available_dates().contains(&date)
    }
}
