mod queue_set_dto;

pub use queue_set_dto::*;
