pub mod authorizer;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use authorizer::MembershipAuthorizer;
pub use services::QueueSetService;
pub use store::{PgQueueStore, QueueStore};
