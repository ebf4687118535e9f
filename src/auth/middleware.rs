//! Authentication middleware that validates cookies, loads the user's role,
//! extends sessions, and handles redirects to the log in page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Role,
        cookie::{extend_auth_cookie_duration_if_needed, get_username_from_cookies},
        get_role,
    },
    endpoints,
};

/// The identity of the logged-in user, placed into the request extensions by
/// the auth middleware.
#[derive(Debug, Clone)]
pub struct Session {
    /// The username from the auth cookie.
    pub username: String,
    /// The role loaded from the credential store for this request.
    pub role: Role,
}

/// Return an error unless `session` belongs to the admin.
///
/// Mutating endpoints call this even though the UI hides their forms from
/// viewers, so a handcrafted request cannot bypass the role check.
pub fn require_admin(session: &Session) -> Result<(), Error> {
    match session.role {
        Role::Admin => Ok(()),
        Role::Viewer => Err(Error::AdminRequired),
    }
}

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection, used to look up the user's role.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid authorization cookie.
/// The session is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a redirect to the log-in page
/// is returned using `get_redirect`.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<Session>` to receive the session.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(endpoints::LOG_IN_VIEW);
        }
    };

    let username = match get_username_from_cookies(&jar) {
        Ok(username) => username,
        Err(_) => return get_redirect(endpoints::LOG_IN_VIEW),
    };

    // A username with no matching user row falls back to the viewer role.
    let role = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_role(&username, &connection) {
            Ok(role) => role.unwrap_or(Role::Viewer),
            Err(error) => {
                tracing::error!("could not look up role for {username}: {error}");
                return get_redirect(endpoints::LOG_IN_VIEW);
            }
        }
    };

    parts.extensions.insert(Session { username, role });
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid authorization cookie.
/// The session is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a redirect to the log-in page is returned.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks for a valid authorization cookie.
/// The session is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a HTMX redirect to the log-in page is returned.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[cfg(test)]
mod auth_guard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Router,
        extract::State,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use crate::{
        Error,
        auth::{
            DEFAULT_COOKIE_DURATION, NewUser, PasswordHash, Role, Session, auth_guard,
            auth_guard_hx, create_user, create_user_table, require_admin, set_auth_cookie,
        },
        endpoints,
    };

    use super::AuthState;

    async fn test_handler(Extension(session): Extension<Session>) -> Html<String> {
        Html(format!("<h1>Hello, {}!</h1>", session.username))
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, "sam", state.cookie_duration)
            .map_err(|error| Error::InvalidDateFormat(error.to_string(), String::new()))
    }

    const TEST_LOG_IN_ROUTE: &str = "/log_in_stub";
    const TEST_PROTECTED_ROUTE: &str = "/protected";
    const TEST_API_ROUTE: &str = "/api/protected";

    fn get_auth_state() -> AuthState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create users table");

        let hash = Sha512::digest(b"nafstenoas");

        AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: AuthState) -> TestServer {
        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .merge(
                Router::new()
                    .route(TEST_API_ROUTE, post(test_handler))
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        auth_guard_hx,
                    )),
            )
            .route(TEST_LOG_IN_ROUTE, get(stub_log_in_route))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server")
    }

    #[tokio::test]
    async fn request_without_cookie_redirects_to_log_in() {
        let server = get_test_server(get_auth_state());

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location").to_str().unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }

    #[tokio::test]
    async fn api_request_without_cookie_gets_hx_redirect() {
        let server = get_test_server(get_auth_state());

        let response = server.post(TEST_API_ROUTE).await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect").to_str().unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }

    #[tokio::test]
    async fn request_with_cookie_reaches_handler() {
        let state = get_auth_state();
        create_user(
            NewUser {
                username: "sam".to_owned(),
                name: "Sam".to_owned(),
                email: "sam@example.com".to_owned(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &mut state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let server = get_test_server(state);

        let log_in_response = server.get(TEST_LOG_IN_ROUTE).await;
        log_in_response.assert_status_ok();

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookies(log_in_response.cookies())
            .await;

        response.assert_status_ok();
        response.assert_text_contains("Hello, sam!");
    }

    #[tokio::test]
    async fn unregistered_username_is_treated_as_viewer() {
        // No user rows exist, so the role lookup returns None.
        let server = get_test_server(get_auth_state());

        let log_in_response = server.get(TEST_LOG_IN_ROUTE).await;
        log_in_response.assert_status_ok();

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookies(log_in_response.cookies())
            .await;

        response.assert_status_ok();
    }

    #[test]
    fn require_admin_rejects_viewers() {
        let viewer = Session {
            username: "kim".to_owned(),
            role: Role::Viewer,
        };
        let admin = Session {
            username: "sam".to_owned(),
            role: Role::Admin,
        };

        assert_eq!(require_admin(&viewer), Err(Error::AdminRequired));
        assert_eq!(require_admin(&admin), Ok(()));
    }
}
