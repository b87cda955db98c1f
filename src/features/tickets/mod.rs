pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod widgets;

pub use routes::TicketState;
pub use services::{HistoryService, TicketQueryService, TicketService};
pub use store::{PgTicketStore, TicketStore};
