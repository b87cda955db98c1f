mod history_service;
mod ticket_query_service;
mod ticket_service;

pub use history_service::HistoryService;
pub use ticket_query_service::TicketQueryService;
pub use ticket_service::TicketService;
