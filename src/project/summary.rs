//! The per-project financial summary.

use rusqlite::Connection;

use crate::{Error, database_id::ProjectId};

/// The financial position of a single special project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFinancialSummary {
    /// The sum of all contributions to the project.
    pub contributions_total: f64,
    /// The sum of all income entries for the project.
    pub income_total: f64,
    /// Contributions plus income.
    pub total: f64,
}

/// Sum the contributions and income for `project_id`.
///
/// A project with no entries yields all zeroes rather than an error, so the
/// summary can always be rendered.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_project_financial_summary(
    project_id: ProjectId,
    connection: &Connection,
) -> Result<ProjectFinancialSummary, Error> {
    let contributions_total: f64 = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM special_contributions WHERE project_id = :id",
        &[(":id", &project_id)],
        |row| row.get(0),
    )?;

    let income_total: f64 = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM project_income WHERE project_id = :id",
        &[(":id", &project_id)],
        |row| row.get(0),
    )?;

    Ok(ProjectFinancialSummary {
        contributions_total,
        income_total,
        total: contributions_total + income_total,
    })
}

#[cfg(test)]
mod summary_tests {
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        project::{NewSpecialProject, create_special_project},
        project_income::add_project_income,
        special_contribution::add_special_contribution,
    };

    use super::{ProjectFinancialSummary, get_project_financial_summary};

    fn get_connection_with_project() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let project_id = create_special_project(
            NewSpecialProject {
                name: "Roof".to_owned(),
                target_amount: 83.33,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        (conn, project_id)
    }

    #[test]
    fn empty_project_sums_to_zero() {
        let (conn, project_id) = get_connection_with_project();

        let summary = get_project_financial_summary(project_id, &conn).unwrap();

        assert_eq!(
            summary,
            ProjectFinancialSummary {
                contributions_total: 0.0,
                income_total: 0.0,
                total: 0.0,
            }
        );
    }

    #[test]
    fn sums_contributions_and_income_independently() {
        let (conn, project_id) = get_connection_with_project();
        add_special_contribution(project_id, "Alice", 4.0, "", &conn).unwrap();
        add_special_contribution(project_id, "Bob", 2.5, "", &conn).unwrap();
        add_project_income(project_id, "Bake sale", 1.25, "", &conn).unwrap();

        let summary = get_project_financial_summary(project_id, &conn).unwrap();

        assert_eq!(summary.contributions_total, 6.5);
        assert_eq!(summary.income_total, 1.25);
        assert_eq!(summary.total, 7.75);
    }

    #[test]
    fn unknown_project_sums_to_zero() {
        // COALESCE turns the empty sum into zero even when the project does
        // not exist, matching how the summary is used on the projects page.
        let (conn, _) = get_connection_with_project();

        let summary = get_project_financial_summary(999, &conn).unwrap();

        assert_eq!(summary.total, 0.0);
    }
}
