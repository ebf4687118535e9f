//! Chart generation for the contributions page.
//!
//! The total-by-member bar chart is generated as JSON configuration for the
//! ECharts library and rendered with an HTML container and a JavaScript
//! initialization snippet.

use std::collections::BTreeMap;

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisType, JsFunction, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{contribution::Contribution, html::HeadElement};

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct PageChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML container for a chart.
pub(super) fn chart_view(chart: &PageChart) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div
                id=(chart.id)
                class="min-h-[380px] rounded dark:bg-gray-100"
            {}
        }
    )
}

/// Generates JavaScript initialization code for a chart.
///
/// Creates a script that initializes an ECharts instance with dark mode
/// support and responsive resizing.
pub(super) fn chart_script(chart: &PageChart) -> HeadElement {
    let script_content = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{}");
            const chart = echarts.init(chartDom);
            const option = {};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                const isDarkMode = darkModeMediaQuery.matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#,
        chart.id, chart.options
    );

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Sums contribution amounts per member, in member name order.
pub(super) fn total_by_member(contributions: &[Contribution]) -> (Vec<String>, Vec<f64>) {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for contribution in contributions {
        *totals.entry(contribution.member.as_str()).or_insert(0.0) += contribution.amount;
    }

    let labels = totals.keys().map(|member| member.to_string()).collect();
    let values = totals.values().copied().collect();

    (labels, values)
}

/// Builds the total-contributed-per-member bar chart.
pub(super) fn member_totals_chart(contributions: &[Contribution]) -> Chart {
    let (labels, values) = total_by_member(contributions);

    Chart::new()
        .title(Title::new().text("Total Contributed per Member"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter()),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Total Contributed").data(values))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
