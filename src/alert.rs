//! Alert fragments for displaying success and error messages to users.
//!
//! Forms target these fragments at the shared `#alert-container` element via
//! the HTMX response-targets extension.

use axum::response::Html;
use maud::{Markup, html};

/// An alert message rendered as an HTML fragment.
#[derive(Debug, Clone)]
pub enum Alert {
    /// An action failed.
    Error {
        /// The headline of the alert.
        message: String,
        /// Extra information below the headline.
        details: String,
    },
    /// An action failed, with no details beyond the headline.
    ErrorSimple {
        /// The headline of the alert.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }

    fn into_markup(self) -> Markup {
        let (message, details, color_style) = match self {
            Alert::Error { message, details } => (
                message,
                details,
                "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400",
            ),
            Alert::ErrorSimple { message } => (
                message,
                String::new(),
                "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400",
            ),
        };

        html! {
            div
                class={"p-4 mb-4 text-sm rounded-lg shadow " (color_style)}
                role="alert"
            {
                span class="font-medium" { (message) }

                @if !details.is_empty() {
                    " " (details)
                }
            }
        }
    }
}
