//! Defines the route handler for the page that displays monthly contributions.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{Role, Session},
    contribution::{
        Contribution,
        chart::{PageChart, chart_script, chart_view, member_totals_chart},
        get_all_contributions,
        shortfall::{Shortfall, monthly_shortfall_report},
    },
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, format_timestamp,
    },
    money::EXPECTED_PER_MEMBER,
    navigation::NavBar,
};

/// The state needed for the contributions page.
#[derive(Debug, Clone)]
pub struct ContributionsViewState {
    /// The database connection for reading contributions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ContributionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the monthly contributions overview.
pub async fn get_contributions_page(
    State(state): State<ContributionsViewState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let contributions = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_contributions(&connection)?
    };

    let shortfalls = monthly_shortfall_report(&contributions, EXPECTED_PER_MEMBER);

    Ok(contributions_view(&session, &contributions, &shortfalls).into_response())
}

fn contributions_view(
    session: &Session,
    contributions: &[Contribution],
    shortfalls: &[Shortfall],
) -> Markup {
    let nav_bar = NavBar::new(
        endpoints::CONTRIBUTIONS_VIEW,
        &session.username,
        session.role,
    )
    .into_html();

    if contributions.is_empty() {
        let content = html! {
            (nav_bar)

            div class=(PAGE_CONTAINER_STYLE) {
                h2 class="text-2xl font-bold mb-4" { "Monthly Contributions" }
                p class="text-gray-600 dark:text-gray-400 mb-6" {
                    "No contributions recorded yet."
                }

                @if session.role == Role::Admin {
                    (add_contribution_form())
                }
            }
        };

        return base("Contributions", &[], &content);
    }

    let chart = PageChart {
        id: "member-totals-chart",
        options: member_totals_chart(contributions).to_string(),
    };
    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        chart_script(&chart),
    ];

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) {
            h2 class="text-2xl font-bold mb-4" { "Monthly Contributions" }

            (metrics_view(contributions))
            (shortfall_view(shortfalls))
            (contributions_table(contributions, session.role))

            @if session.role == Role::Admin {
                (add_contribution_form())
            }

            (chart_view(&chart))
        }
    };

    base("Contributions", &scripts, &content)
}

fn metrics_view(contributions: &[Contribution]) -> Markup {
    let total: f64 = contributions
        .iter()
        .map(|contribution| contribution.amount)
        .sum();
    let contributor_count = contributions
        .iter()
        .map(|contribution| contribution.member.as_str())
        .collect::<HashSet<_>>()
        .len();

    let metric_card = |label: &str, value: String| {
        html! {
            div class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
            {
                div class="text-sm text-gray-600 dark:text-gray-400" { (label) }
                div class="text-3xl font-bold" { (value) }
            }
        }
    };

    html! {
        section class="w-full grid grid-cols-1 sm:grid-cols-3 gap-4 mb-6" {
            (metric_card("Total Collected", format_currency(total)))
            (metric_card("Contributors", contributor_count.to_string()))
            (metric_card("Entries", contributions.len().to_string()))
        }
    }
}

fn shortfall_view(shortfalls: &[Shortfall]) -> Markup {
    html! {
        section class="w-full mb-6" {
            h3 class="text-xl font-semibold mb-2" { "Monthly Expected Contribution Check" }

            @if shortfalls.is_empty() {
                p class="text-green-600 dark:text-green-400" {
                    "All members met expected monthly contributions."
                }
            } @else {
                p class="text-amber-600 dark:text-amber-400 mb-2" {
                    "Members below expected monthly contribution:"
                }

                ul class="list-disc list-inside text-gray-700 dark:text-gray-300" {
                    @for shortfall in shortfalls {
                        li {
                            (shortfall.member)
                            " contributed "
                            (format_currency(shortfall.total))
                            " in "
                            (shortfall.month)
                            " (expected "
                            (format_currency(shortfall.expected))
                            ")"
                        }
                    }
                }
            }
        }
    }
}

fn contributions_table(contributions: &[Contribution], role: Role) -> Markup {
    html! {
        section class="w-full mb-6" {
            h3 class="text-xl font-semibold mb-2" { "Recent Contributions" }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Member" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Recorded" }
                            @if role == Role::Admin {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Delete" }
                            }
                        }
                    }
                    tbody {
                        @for contribution in contributions {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (contribution.member) }
                                td class=(TABLE_CELL_STYLE) { (contribution.month) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(contribution.amount)) }
                                td class=(TABLE_CELL_STYLE) { (format_timestamp(contribution.date)) }
                                @if role == Role::Admin {
                                    td class=(TABLE_CELL_STYLE) {
                                        (delete_contribution_form(contribution.id))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn delete_contribution_form(contribution_id: i64) -> Markup {
    let delete_endpoint =
        endpoints::format_endpoint(endpoints::DELETE_CONTRIBUTION, contribution_id);

    html! {
        form
            hx-post=(delete_endpoint)
            hx-target-error="#alert-container"
            class="flex gap-2 items-center"
        {
            input
                type="text"
                name="reason"
                placeholder="Reason (required)"
                required
                class=(FORM_TEXT_INPUT_STYLE);

            button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
        }
    }
}

fn add_contribution_form() -> Markup {
    html! {
        section class="w-full max-w-md mb-6" {
            h3 class="text-xl font-semibold mb-2" { "Add Contribution" }

            form
                hx-post=(endpoints::CONTRIBUTIONS_API)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div {
                    label for="member" class=(FORM_LABEL_STYLE) { "Member Name" }
                    input
                        id="member"
                        type="text"
                        name="member"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month (e.g., January 2025)" }
                    input
                        id="month"
                        type="text"
                        name="month"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
            }
        }
    }
}
