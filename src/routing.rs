//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page,
        get_reset_password_page, post_log_in, register_user, reset_password,
    },
    contribution::{
        create_contribution_endpoint, delete_contribution_endpoint, get_contributions_page,
    },
    deletion_log::get_deletion_log_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    project::{create_project_endpoint, get_project_document_endpoint, get_projects_page},
    project_income::{create_project_income_endpoint, delete_project_income_endpoint},
    special_contribution::{
        create_special_contribution_endpoint, delete_special_contribution_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::RESET_PASSWORD_VIEW, get(get_reset_password_page))
        .route(endpoints::RESET_PASSWORD_API, post(reset_password))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CONTRIBUTIONS_VIEW, get(get_contributions_page))
        .route(endpoints::PROJECTS_VIEW, get(get_projects_page))
        .route(endpoints::DELETION_LOG_VIEW, get(get_deletion_log_page))
        .route(
            endpoints::PROJECT_DOCUMENT,
            get(get_project_document_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST routes need to use the HX-REDIRECT header for auth redirects
    // to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::CONTRIBUTIONS_API,
                post(create_contribution_endpoint),
            )
            .route(
                endpoints::DELETE_CONTRIBUTION,
                post(delete_contribution_endpoint),
            )
            .route(endpoints::PROJECTS_API, post(create_project_endpoint))
            .route(
                endpoints::SPECIAL_CONTRIBUTIONS_API,
                post(create_special_contribution_endpoint),
            )
            .route(
                endpoints::DELETE_SPECIAL_CONTRIBUTION,
                post(delete_special_contribution_endpoint),
            )
            .route(
                endpoints::PROJECT_INCOME_API,
                post(create_project_income_endpoint),
            )
            .route(
                endpoints::DELETE_PROJECT_INCOME,
                post(delete_project_income_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the contributions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CONTRIBUTIONS_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints};

    use super::{build_router, get_index_page};

    #[tokio::test]
    async fn root_redirects_to_contributions() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::CONTRIBUTIONS_VIEW);
    }

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "42").expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server")
    }

    #[tokio::test]
    async fn log_in_page_is_reachable_without_auth() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
        server.get(endpoints::REGISTER_VIEW).await.assert_status_ok();
        server
            .get(endpoints::RESET_PASSWORD_VIEW)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn protected_pages_redirect_without_auth() {
        let server = get_test_server();

        for route in [
            endpoints::ROOT,
            endpoints::CONTRIBUTIONS_VIEW,
            endpoints::PROJECTS_VIEW,
            endpoints::DELETION_LOG_VIEW,
        ] {
            let response = server.get(route).await;
            response.assert_status_see_other();
            assert_eq!(
                response.header("location").to_str().unwrap(),
                endpoints::LOG_IN_VIEW,
                "expected {route} to redirect to the log in page"
            );
        }
    }

    #[tokio::test]
    async fn unknown_route_renders_404() {
        let server = get_test_server();

        let response = server.get("/definitely/not/a/route").await;

        response.assert_status_not_found();
    }
}
