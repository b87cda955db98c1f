mod queue_set_service;

pub use queue_set_service::QueueSetService;
