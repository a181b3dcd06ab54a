pub mod entry;

pub use entry::{Category, QueueEntry};
