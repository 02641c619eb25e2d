//! Fragment fetching abstraction for Lucid.
//!
//! Every template, page fragment and content database the renderer needs is
//! fetched through the [`Storage`] trait, which keeps the engine free of I/O
//! details and lets tests run without a filesystem.
//!
//! - [`FsStorage`] reads from a site directory on disk
//! - [`MockStorage`] keeps fragments in memory (behind the `mock` feature)

mod fs;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockStorage;
pub use storage::{ReadFuture, Storage, StorageError, StorageErrorKind};
