//! Shared utilities: host validation, node state cleanup, log bucketing.

pub mod cleanup;
pub mod ip_utils;
pub mod log_organizer;

pub use cleanup::{clean_node_state, CleanupReport};
pub use ip_utils::is_valid_host;
pub use log_organizer::{organize_logs, OrganizeReport};
