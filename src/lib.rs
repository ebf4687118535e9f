//! Duesbook is a web app for tracking a club's finances: recurring monthly
//! member contributions, ad-hoc special projects with their own
//! contributions and income, and an append-only audit log of every deleted
//! financial entry.
//!
//! This library provides an HTTP server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod contribution;
mod database_id;
mod db;
mod deletion_log;
mod endpoints;
mod error;
mod html;
mod internal_server_error;
mod money;
mod navigation;
mod not_found;
mod project;
mod project_income;
mod routing;
mod special_contribution;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, Role, User, ValidatedPassword, get_user_by_username, update_password,
};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use money::{EXPECTED_PER_MEMBER, INPUT_SCALE_FACTOR, normalize_amount};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
