mod filter;
mod history;
mod queue_assignment;
mod ticket;
mod view;

pub use filter::{TicketFilter, TicketSearch};
pub use history::{validate_append, AssignmentHistory};
pub use queue_assignment::{NewQueueAssignment, QueueAssignment};
pub use ticket::{NewTicket, Ticket};
pub use view::{TicketSummary, TicketView, ViewLookups};
