//! Read-only views onto the host clinical system.
//!
//! Patients, clinical events and firms are owned elsewhere; ticketing only
//! resolves them for display and for source links.

pub mod clients;
pub mod models;
pub mod traits;

pub use clients::PgDirectory;
pub use models::{ClinicalEvent, Firm};
pub use traits::Directories;
