// Storage backends for handover records

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileHandoverStore, StoredHandover, STORE_FORMAT_VERSION};
pub use memory::InMemoryHandoverStore;
pub use traits::{CommitOutcome, HandoverStore, StoreError};

#[cfg(any(test, feature = "testing"))]
pub use traits::MockHandoverStore;
