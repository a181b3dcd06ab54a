pub mod health_handler;
pub mod info_handler;
pub mod queue_handler;

pub use health_handler::health_check;
pub use info_handler::service_info;
pub use queue_handler::{call_next, enqueue, get_by_position, list_queue, remove_by_position};
