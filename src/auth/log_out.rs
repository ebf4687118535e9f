//! The route handler for logging out the current user.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, auth::invalidate_auth_cookie, endpoints};

/// The state needed to log out.
#[derive(Debug, Clone)]
pub struct LogOutState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// Invalidate the auth cookies and redirect to the log in page.
pub async fn get_log_out(State(_state): State<LogOutState>, jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, routing::get};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};

    use crate::endpoints;

    use super::{LogOutState, get_log_out};

    #[tokio::test]
    async fn log_out_redirects_to_log_in_page() {
        let hash = Sha512::digest(b"42");
        let state = LogOutState {
            cookie_key: Key::from(&hash),
        };
        let app = Router::new()
            .route(endpoints::LOG_OUT, get(get_log_out))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server");

        let response = server.get(endpoints::LOG_OUT).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location").to_str().unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }
}
