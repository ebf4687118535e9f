//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a monthly contribution row.
pub type ContributionId = i64;
/// The ID of a special project row.
pub type ProjectId = i64;
/// The ID of a special project contribution row.
pub type SpecialContributionId = i64;
/// The ID of a project income row.
pub type IncomeId = i64;
