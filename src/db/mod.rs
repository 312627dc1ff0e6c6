//! Persistence module split across logical submodules.

mod connection;
mod error;
mod songs;

pub use connection::CatalogStore;
pub use error::{CatalogError, Result};
pub use songs::{page_count, page_offset, PAGE_SIZE};
