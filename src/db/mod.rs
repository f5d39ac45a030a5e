#[cfg(test)]
mod memory;
mod repository;
mod schema;
mod store;

#[cfg(test)]
pub use memory::MemoryStore;
pub use repository::Repository;
pub use store::{KeyValueStore, Storage};
#[cfg(test)]
pub use store::{BOOKMARKS_KEY, PROGRESS_KEY};
