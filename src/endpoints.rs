//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/contributions/{contribution_id}/delete',
//! use [format_endpoint].

/// The root route which redirects to the contributions page.
pub const ROOT: &str = "/";
/// The landing page for logged in users, showing monthly contributions.
pub const CONTRIBUTIONS_VIEW: &str = "/contributions";
/// The page for displaying special projects and their finances.
pub const PROJECTS_VIEW: &str = "/projects";
/// The admin-only page listing the deletion audit log.
pub const DELETION_LOG_VIEW: &str = "/deletions";
/// The route for downloading a special project's attached document.
pub const PROJECT_DOCUMENT: &str = "/projects/{project_id}/document";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for the page to reset a forgotten password.
pub const RESET_PASSWORD_VIEW: &str = "/reset_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register a new user.
pub const USERS: &str = "/api/users";
/// The route to replace a forgotten password.
pub const RESET_PASSWORD_API: &str = "/api/reset_password";
/// The route to create a monthly contribution.
pub const CONTRIBUTIONS_API: &str = "/api/contributions";
/// The route to delete a monthly contribution with a logged reason.
pub const DELETE_CONTRIBUTION: &str = "/api/contributions/{contribution_id}/delete";
/// The route to create a special project.
pub const PROJECTS_API: &str = "/api/projects";
/// The route to add a contribution to a special project.
pub const SPECIAL_CONTRIBUTIONS_API: &str = "/api/special_contributions";
/// The route to delete a special project contribution with a logged reason.
pub const DELETE_SPECIAL_CONTRIBUTION: &str = "/api/special_contributions/{contribution_id}/delete";
/// The route to add an income entry to a special project.
pub const PROJECT_INCOME_API: &str = "/api/project_income";
/// The route to delete a project income entry with a logged reason.
pub const DELETE_PROJECT_INCOME: &str = "/api/project_income/{income_id}/delete";

/// Replace the brace-delimited parameter in `endpoint_path` with `id`, e.g.
/// '/projects/{project_id}/document' becomes '/projects/7/document'.
///
/// Endpoint paths are assumed to be ASCII and contain at most one parameter.
/// A path without a parameter is returned unchanged, and an unclosed brace
/// swallows the rest of the path.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::CONTRIBUTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PROJECTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::DELETION_LOG_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PROJECT_DOCUMENT);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::RESET_PASSWORD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::RESET_PASSWORD_API);
        assert_endpoint_is_valid_uri(endpoints::CONTRIBUTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::DELETE_CONTRIBUTION);
        assert_endpoint_is_valid_uri(endpoints::PROJECTS_API);
        assert_endpoint_is_valid_uri(endpoints::SPECIAL_CONTRIBUTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::DELETE_SPECIAL_CONTRIBUTION);
        assert_endpoint_is_valid_uri(endpoints::PROJECT_INCOME_API);
        assert_endpoint_is_valid_uri(endpoints::DELETE_PROJECT_INCOME);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
