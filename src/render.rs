// Plain-text rendering of a plan for chat replies and logs.

use std::fmt::Write;
use crate::models::{Plan, UnscheduledReason};

fn units(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Multi-line summary: targets, span, per-term courses and advisories.
pub fn plan_summary(plan: &Plan) -> String {
    let mut out = String::new();

    if !plan.targets.is_empty() {
        let _ = writeln!(out, "Transfer plan for:");
        for t in &plan.targets {
            let _ = writeln!(out, "  - {} at {}", t.major_name, t.university_name);
        }
    }

    match (plan.start_term, plan.end_term) {
        (Some(start), Some(end)) => {
            let _ = writeln!(out, "From {} to {}: {} units", start, end, units(plan.total_units));
        }
        _ => {
            let _ = writeln!(out, "No courses scheduled.");
        }
    }

    for term in plan.terms.iter().filter(|t| !t.courses.is_empty()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({} units)", term.name, units(term.units));
        for c in &term.courses {
            let _ = write!(out, "  {} - {} ({} units)", c.code, c.name, units(c.units));
            if !c.prerequisites.is_empty() {
                let _ = write!(out, " [prereqs: {}]", c.prerequisites.join(", "));
            }
            if !c.alternatives.is_empty() {
                let _ = write!(out, " [or: {}]", c.alternatives.join(", "));
            }
            let _ = writeln!(out);
            if !c.additional_notes.is_empty() {
                let _ = writeln!(out, "      note: {}", c.additional_notes);
            }
        }
    }

    if !plan.no_equivalent_courses.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Courses to complete after transfer:");
        for c in &plan.no_equivalent_courses {
            let _ = writeln!(out, "  {} - {}: {}", c.code, c.name, c.message);
        }
    }

    if !plan.unscheduled.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Could not schedule:");
        for c in &plan.unscheduled {
            let why = match c.reason {
                UnscheduledReason::NoFeasibleTerm => "no term satisfies its prerequisites, offering and unit limit",
                UnscheduledReason::ExceedsUnitCap => "larger than the per-term unit limit",
            };
            let _ = writeln!(out, "  {} ({} units): {}", c.code, units(c.units), why);
        }
    }
    out
}
