//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::{auth::Role, endpoints};

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!( a href=(self.url) class=(style) { (self.title) } )
    }
}

/// The navigation bar shown at the top of every logged-in page.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    username: &'a str,
    role: Role,
}

impl NavBar<'_> {
    /// Get the navigation bar for the logged-in user.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    /// The deletion log link is only shown to the admin.
    pub fn new<'a>(active_endpoint: &str, username: &'a str, role: Role) -> NavBar<'a> {
        let mut links = vec![
            Link {
                url: endpoints::CONTRIBUTIONS_VIEW,
                title: "Contributions",
                is_current: active_endpoint == endpoints::CONTRIBUTIONS_VIEW,
            },
            Link {
                url: endpoints::PROJECTS_VIEW,
                title: "Projects",
                is_current: active_endpoint == endpoints::PROJECTS_VIEW,
            },
        ];

        if role == Role::Admin {
            links.push(Link {
                url: endpoints::DELETION_LOG_VIEW,
                title: "Deletion Log",
                is_current: active_endpoint == endpoints::DELETION_LOG_VIEW,
            });
        }

        links.push(Link {
            url: endpoints::LOG_OUT,
            title: "Log out",
            is_current: false,
        });

        NavBar {
            links,
            username,
            role,
        }
    }

    /// Render the navigation bar.
    pub fn into_html(self) -> Markup {
        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-900 mb-4" {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4" {
                    span class="self-center text-2xl font-semibold whitespace-nowrap text-gray-900 dark:text-white" {
                        "Duesbook"
                    }

                    div class="w-full lg:block lg:w-auto" {
                        ul class="font-medium flex flex-col p-4 lg:p-0 mt-4 border
                            border-gray-100 rounded-lg bg-gray-50 lg:flex-row
                            lg:space-x-8 rtl:space-x-reverse lg:mt-0 lg:border-0
                            lg:bg-white dark:bg-gray-800 lg:dark:bg-gray-900
                            dark:border-gray-700"
                        {
                            @for link in self.links {
                                li { (link.into_html()) }
                            }
                        }
                    }

                    span class="text-sm text-gray-600 dark:text-gray-400" {
                        (self.username) " (" (self.role) ")"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use crate::{auth::Role, endpoints};

    use super::NavBar;

    #[test]
    fn admin_sees_deletion_log_link() {
        let html = NavBar::new(endpoints::CONTRIBUTIONS_VIEW, "sam", Role::Admin)
            .into_html()
            .into_string();

        assert!(html.contains(endpoints::DELETION_LOG_VIEW));
        assert!(html.contains("sam"));
    }

    #[test]
    fn viewer_does_not_see_deletion_log_link() {
        let html = NavBar::new(endpoints::CONTRIBUTIONS_VIEW, "kim", Role::Viewer)
            .into_html()
            .into_string();

        assert!(!html.contains(endpoints::DELETION_LOG_VIEW));
    }
}
