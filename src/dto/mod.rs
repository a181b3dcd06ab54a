pub mod queue_dto;

pub use queue_dto::{
    EnqueueRequest,
    EntryResponse,
    MessageResponse,
};
