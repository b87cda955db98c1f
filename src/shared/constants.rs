/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Super admin role - full access, including every queue set
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Ticketing admin role - can configure queue sets, queues and outcomes
pub const ROLE_TICKETING_ADMIN: &str = "ticketing_admin";

// =============================================================================
// SOURCE LABELS
// =============================================================================

/// Label used when a ticket was raised directly against a patient
pub const PATIENT_SOURCE_LABEL: &str = "Patient";

/// Subspecialty text for firms that have no subspecialty
pub const SUPPORT_SERVICES_SUBSPECIALTY: &str = "Support Services";
