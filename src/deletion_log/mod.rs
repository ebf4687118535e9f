//! The append-only audit log of deleted financial entries, and the admin
//! page that displays it.

mod core;
mod log_page;

pub use core::{
    DeletionLogEntry, RecordType, create_deletion_log_table, get_deletion_log, record_deletion,
};
pub use log_page::get_deletion_log_page;
