//! The monthly expected-contribution check.
//!
//! A pure function over already-fetched contributions, so the report is easy
//! to test without a database.

use std::collections::BTreeMap;

use crate::contribution::Contribution;

/// A (member, month) group whose contributions fell short of the expected
/// monthly amount.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    /// The member who fell short.
    pub member: String,
    /// The month they fell short in.
    pub month: String,
    /// What they contributed in total that month.
    pub total: f64,
    /// What they were expected to contribute.
    pub expected: f64,
}

/// Group `contributions` by (month, member), sum each group, and report the
/// groups whose total is strictly less than `expected_per_member`.
///
/// The report is ordered by month and then member so the rendered warnings
/// are stable across requests.
pub fn monthly_shortfall_report(
    contributions: &[Contribution],
    expected_per_member: f64,
) -> Vec<Shortfall> {
    let mut totals: BTreeMap<(&str, &str), f64> = BTreeMap::new();

    for contribution in contributions {
        *totals
            .entry((contribution.month.as_str(), contribution.member.as_str()))
            .or_insert(0.0) += contribution.amount;
    }

    totals
        .into_iter()
        .filter(|(_, total)| *total < expected_per_member)
        .map(|((month, member), total)| Shortfall {
            member: member.to_owned(),
            month: month.to_owned(),
            total,
            expected: expected_per_member,
        })
        .collect()
}
