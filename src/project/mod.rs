//! Special projects: the ledger functions, the overview page, the financial
//! summary, and the create and document-download endpoints.

mod core;
mod create_endpoint;
mod document_endpoint;
mod projects_page;
mod summary;

pub use core::{
    NewSpecialProject, SpecialProject, create_special_project, create_special_project_table,
    get_all_special_projects, get_project_document,
};
pub use create_endpoint::create_project_endpoint;
pub use document_endpoint::get_project_document_endpoint;
pub use projects_page::get_projects_page;
pub use summary::{ProjectFinancialSummary, get_project_financial_summary};
