pub mod auth;
pub mod directory;
pub mod queues;
pub mod tickets;
