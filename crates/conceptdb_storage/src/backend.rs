//! Contract for a larger-than-memory store backend.

use crate::error::StorageResult;
use conceptdb_core::ConceptWriter;

/// A store backend keeping concepts outside main memory, typically in an
/// embedded ordered key-value store.
///
/// A backend answers the same id-keyed read surface and single-writer
/// mutation contract as the in-memory stores; its cursor and transaction
/// mechanics stay behind this trait. Ids and attribute keys share the
/// in-memory id space, so a backend can be swapped in underneath existing
/// callers.
pub trait ConceptBackend: ConceptWriter {
    /// Flushes buffered writes to durable storage.
    fn sync(&mut self) -> StorageResult<()>;

    /// Releases the backend's resources. Further calls after a shutdown
    /// are implementation-defined.
    fn shutdown(&mut self) -> StorageResult<()>;
}
