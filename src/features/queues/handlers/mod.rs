mod queue_set_handler;

pub use queue_set_handler::*;
