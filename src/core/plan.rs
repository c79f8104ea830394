//! Builds the daily investment plan from the calendar rule and thresholds.

use crate::core::calendar;
use chrono::NaiveDate;

/// The purchase plan for one evaluation date. A plain value, computed fresh
/// per evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentPlan {
    pub date: NaiveDate,
    pub current_rate: f64,
    pub is_regular_day: bool,
    pub regular_amount: u64,
    pub extra_amount: u64,
    pub matched_notes: Vec<String>,
    pub total_amount: u64,
    pub note: String,
}

/// Evaluates the purchase decision for `date`.
///
/// The regular contribution fires only on the third Thursday; the extra
/// purchase is evaluated every day, independent of the calendar check.
///
/// Tiers are cumulative by design, not graduated: every threshold at or
/// above the current rate adds one `extra_unit`, so a rate below all three
/// buys `3 * extra_unit`, not just the deepest tier's unit. Matching is
/// inclusive (`rate <= threshold` counts).
pub fn build_plan(
    date: NaiveDate,
    current_rate: f64,
    thresholds: &[f64],
    regular_amount: u64,
    extra_unit: u64,
) -> InvestmentPlan {
    let is_regular_day = calendar::is_trigger_day(date);
    let regular = if is_regular_day { regular_amount } else { 0 };

    let mut extra = 0u64;
    let mut matched_notes = Vec::new();
    for (i, threshold) in thresholds.iter().enumerate() {
        if current_rate <= *threshold {
            extra += extra_unit;
            matched_notes.push(format!(
                "Tier {} threshold met ({:.2} or below)",
                i + 1,
                threshold
            ));
        }
    }

    let note = if is_regular_day {
        "Regular contribution day".to_string()
    } else {
        "Not a regular contribution day".to_string()
    };

    InvestmentPlan {
        date,
        current_rate,
        is_regular_day,
        regular_amount: regular,
        extra_amount: extra,
        matched_notes,
        total_amount: regular + extra,
        note,
    }
}
