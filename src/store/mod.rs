pub mod entry_store;
pub mod sqlite_store;

pub use entry_store::EntryStore;
pub use sqlite_store::SqliteEntryStore;

#[cfg(test)]
pub use entry_store::MockEntryStore;
