//! Report template rendering.
//!
//! Queues may carry a `report_definition` written in Jinja2 syntax. When a
//! ticket enters such a queue the definition is rendered against the data
//! captured by the queue's assignment widgets and stored as the ticket report.

pub mod engine;

pub use engine::render_report;
