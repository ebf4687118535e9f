//! Defines the route handler for the page that displays special projects.

use std::sync::{Arc, Mutex};

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
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, format_timestamp,
    },
    navigation::NavBar,
    project::{
        ProjectFinancialSummary, SpecialProject, get_all_special_projects,
        get_project_financial_summary,
    },
    project_income::{ProjectIncome, get_project_income},
    special_contribution::{SpecialContribution, get_special_contributions},
};

/// The state needed for the projects page.
#[derive(Debug, Clone)]
pub struct ProjectsViewState {
    /// The database connection for reading projects and their entries.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProjectsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Everything needed to render one project section.
struct ProjectViewModel {
    project: SpecialProject,
    summary: ProjectFinancialSummary,
    contributions: Vec<SpecialContribution>,
    income: Vec<ProjectIncome>,
}

/// Display the special projects overview.
pub async fn get_projects_page(
    State(state): State<ProjectsViewState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let view_models = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let projects = get_all_special_projects(&connection)?;

        projects
            .into_iter()
            .map(|project| {
                Ok(ProjectViewModel {
                    summary: get_project_financial_summary(project.id, &connection)?,
                    contributions: get_special_contributions(project.id, &connection)?,
                    income: get_project_income(project.id, &connection)?,
                    project,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?
    };

    Ok(projects_view(&session, &view_models).into_response())
}

fn projects_view(session: &Session, view_models: &[ProjectViewModel]) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROJECTS_VIEW, &session.username, session.role).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) {
            h2 class="text-2xl font-bold mb-4" { "Special Projects" }

            @if session.role == Role::Admin {
                (create_project_form())
            }

            @if view_models.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "No special projects yet." }
            }

            @for view_model in view_models {
                (project_section(view_model, session.role))
            }
        }
    };

    base("Projects", &[], &content)
}

fn project_section(view_model: &ProjectViewModel, role: Role) -> Markup {
    let project = &view_model.project;

    html! {
        section class="w-full mb-8 bg-white dark:bg-gray-800 border border-gray-200
            dark:border-gray-700 rounded-lg p-6 shadow-md"
        {
            div class="flex flex-wrap justify-between items-baseline mb-2" {
                h3 class="text-xl font-semibold" { (project.name) }

                span class="text-sm text-gray-600 dark:text-gray-400" {
                    "Target: " (format_currency(project.target_amount))

                    @if let Some(deadline) = project.deadline {
                        " · Deadline: " (deadline)
                    }

                    " · " (project.status)
                }
            }

            @if !project.description.is_empty() {
                p class="text-gray-700 dark:text-gray-300 mb-4" { (project.description) }
            }

            @if project.has_document {
                p class="mb-4" {
                    a
                        href=(endpoints::format_endpoint(endpoints::PROJECT_DOCUMENT, project.id))
                        class=(LINK_STYLE)
                    {
                        "Attached document"
                    }
                }
            }

            (summary_view(&view_model.summary))

            (contributions_table(&view_model.contributions, role))

            @if role == Role::Admin {
                (add_contribution_form(project.id))
            }

            (income_table(&view_model.income, role))

            @if role == Role::Admin {
                (add_income_form(project.id))
            }
        }
    }
}

fn summary_view(summary: &ProjectFinancialSummary) -> Markup {
    let metric = |label: &str, value: f64| {
        html! {
            div {
                div class="text-sm text-gray-600 dark:text-gray-400" { (label) }
                div class="text-2xl font-bold" { (format_currency(value)) }
            }
        }
    };

    html! {
        div class="grid grid-cols-3 gap-4 mb-4" {
            (metric("Contributions", summary.contributions_total))
            (metric("Income", summary.income_total))
            (metric("Total", summary.total))
        }
    }
}

fn contributions_table(contributions: &[SpecialContribution], role: Role) -> Markup {
    html! {
        h4 class="text-lg font-semibold mb-2" { "Contributions" }

        @if contributions.is_empty() {
            p class="text-gray-600 dark:text-gray-400 mb-4" { "No contributions yet." }
        } @else {
            div class="overflow-x-auto rounded-lg shadow mb-4" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Notes" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Recorded" }
                            @if role == Role::Admin {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Delete" }
                            }
                        }
                    }
                    tbody {
                        @for contribution in contributions {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (contribution.name) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(contribution.amount)) }
                                td class=(TABLE_CELL_STYLE) { (contribution.notes) }
                                td class=(TABLE_CELL_STYLE) { (format_timestamp(contribution.created_at)) }
                                @if role == Role::Admin {
                                    td class=(TABLE_CELL_STYLE) {
                                        (delete_form(endpoints::format_endpoint(
                                            endpoints::DELETE_SPECIAL_CONTRIBUTION,
                                            contribution.id,
                                        )))
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

fn income_table(income: &[ProjectIncome], role: Role) -> Markup {
    html! {
        h4 class="text-lg font-semibold mb-2" { "Income" }

        @if income.is_empty() {
            p class="text-gray-600 dark:text-gray-400 mb-4" { "No income recorded yet." }
        } @else {
            div class="overflow-x-auto rounded-lg shadow mb-4" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Source" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Notes" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Recorded" }
                            @if role == Role::Admin {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Delete" }
                            }
                        }
                    }
                    tbody {
                        @for entry in income {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (entry.source) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(entry.amount)) }
                                td class=(TABLE_CELL_STYLE) { (entry.notes) }
                                td class=(TABLE_CELL_STYLE) { (format_timestamp(entry.created_at)) }
                                @if role == Role::Admin {
                                    td class=(TABLE_CELL_STYLE) {
                                        (delete_form(endpoints::format_endpoint(
                                            endpoints::DELETE_PROJECT_INCOME,
                                            entry.id,
                                        )))
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

fn delete_form(delete_endpoint: String) -> Markup {
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

fn create_project_form() -> Markup {
    html! {
        section class="w-full max-w-md mb-8" {
            h3 class="text-xl font-semibold mb-2" { "Create New Special Project" }

            form
                hx-post=(endpoints::PROJECTS_API)
                hx-target-error="#alert-container"
                hx-encoding="multipart/form-data"
                class="space-y-4"
            {
                div {
                    label for="name" class=(FORM_LABEL_STYLE) { "Project Name" }
                    input id="name" type="text" name="name" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                    textarea
                        id="description"
                        name="description"
                        rows="3"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {}
                }

                div {
                    label for="target_amount" class=(FORM_LABEL_STYLE) { "Target Amount" }
                    input
                        id="target_amount"
                        type="number"
                        name="target_amount"
                        step="0.01"
                        min="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for="deadline" class=(FORM_LABEL_STYLE) { "Deadline (optional)" }
                    input id="deadline" type="date" name="deadline" class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for="document" class=(FORM_LABEL_STYLE) { "Document (optional)" }
                    input id="document" type="file" name="document" class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Project" }
            }
        }
    }
}

fn add_contribution_form(project_id: i64) -> Markup {
    html! {
        details class="mb-4" {
            summary class="cursor-pointer text-blue-600 dark:text-blue-500" {
                "Add Special Contribution"
            }

            form
                hx-post=(endpoints::SPECIAL_CONTRIBUTIONS_API)
                hx-target-error="#alert-container"
                class="space-y-4 mt-2"
            {
                input type="hidden" name="project_id" value=(project_id);

                div {
                    label for=(format!("contrib-name-{project_id}")) class=(FORM_LABEL_STYLE) {
                        "Contributor Name"
                    }
                    input
                        id=(format!("contrib-name-{project_id}"))
                        type="text"
                        name="name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for=(format!("contrib-amount-{project_id}")) class=(FORM_LABEL_STYLE) {
                        "Amount"
                    }
                    input
                        id=(format!("contrib-amount-{project_id}"))
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for=(format!("contrib-notes-{project_id}")) class=(FORM_LABEL_STYLE) {
                        "Notes"
                    }
                    textarea
                        id=(format!("contrib-notes-{project_id}"))
                        name="notes"
                        rows="2"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {}
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
            }
        }
    }
}

fn add_income_form(project_id: i64) -> Markup {
    html! {
        details class="mb-4" {
            summary class="cursor-pointer text-blue-600 dark:text-blue-500" {
                "Add Project Income"
            }

            form
                hx-post=(endpoints::PROJECT_INCOME_API)
                hx-target-error="#alert-container"
                class="space-y-4 mt-2"
            {
                input type="hidden" name="project_id" value=(project_id);

                div {
                    label for=(format!("income-source-{project_id}")) class=(FORM_LABEL_STYLE) {
                        "Income Source"
                    }
                    input
                        id=(format!("income-source-{project_id}"))
                        type="text"
                        name="source"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for=(format!("income-amount-{project_id}")) class=(FORM_LABEL_STYLE) {
                        "Amount"
                    }
                    input
                        id=(format!("income-amount-{project_id}"))
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div {
                    label for=(format!("income-notes-{project_id}")) class=(FORM_LABEL_STYLE) {
                        "Notes"
                    }
                    textarea
                        id=(format!("income-notes-{project_id}"))
                        name="notes"
                        rows="2"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {}
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Income" }
            }
        }
    }
}
