mod priority;
mod queue;
mod queue_set;

pub use priority::Priority;
pub use queue::{AssignmentField, NewQueue, Queue};
pub use queue_set::{FilterSettings, NewQueueSet, QueueSet, QueueSetCategory};
