//! Page-based durable storage: the on-disk page format, the page store, and
//! the write-ahead log that makes writes crash-safe.

pub mod page;
pub mod retry;
pub mod store;
pub mod wal;

pub use page::{MetaPage, Page, PageType};
pub use retry::with_io_retry;
pub use store::Store;
pub use wal::{Wal, WalEntry, WalTag};
