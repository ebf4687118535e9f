//! Contributions made towards a special project.

mod core;
mod create_endpoint;
mod delete_endpoint;

pub use core::{
    SpecialContribution, add_special_contribution, create_special_contribution_table,
    delete_special_contribution, get_special_contributions,
};
pub use create_endpoint::create_special_contribution_endpoint;
pub use delete_endpoint::delete_special_contribution_endpoint;
