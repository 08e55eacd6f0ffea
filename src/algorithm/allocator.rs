// Greedy term allocator.
//
// Every course moves through `Placement` states held in one `Allocation`
// value; slots and states are only changed through `place`/`relocate` so
// they never disagree.

use std::cmp::Ordering;
use std::collections::HashMap;
use crate::models::{
    generate_term_sequence, ChainForest, Constraints, CourseNode, NoEquivalentCourse, Plan, ScheduledCourse,
    TermSlot, UnscheduledCourse, UnscheduledReason,
};
use super::flatten::flatten_chains;
use super::priority::{alternative_score, processing_order};

/// Tolerance for unit sums (units may be fractional).
pub(crate) const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Unplaced,
    Placed(usize),
    /// Alternative not chosen, or avoided with a viable substitute.
    Excluded,
    /// No slot satisfied ordering, offering and load limits.
    Unplaceable,
}

pub(crate) struct Allocation<'c> {
    pub(super) constraints: &'c Constraints,
    pub(super) cap: f64,
    pub(super) courses: Vec<CourseNode>,
    pub(super) index: HashMap<String, usize>,
    pub(super) status: Vec<Placement>,
    pub(super) slots: Vec<TermSlot>,
}

impl<'c> Allocation<'c> {
    pub(crate) fn new(courses: Vec<CourseNode>, constraints: &'c Constraints) -> Self {
        let slots = generate_term_sequence(constraints.start_term, constraints.planned_terms())
            .into_iter()
            .map(|t| TermSlot::new(t, constraints.is_avoided_term(&t)))
            .collect();
        let index = courses.iter().enumerate().map(|(i, c)| (c.code.clone(), i)).collect();
        let status = vec![Placement::Unplaced; courses.len()];
        Allocation { constraints, cap: constraints.effective_max_units(), courses, index, status, slots }
    }

    pub(crate) fn node(&self, code: &str) -> Option<&CourseNode> {
        self.index.get(code).map(|&i| &self.courses[i])
    }

    pub(crate) fn status_of(&self, code: &str) -> Option<Placement> {
        self.index.get(code).map(|&i| self.status[i])
    }

    pub(crate) fn slot_of(&self, code: &str) -> Option<usize> {
        match self.status_of(code) {
            Some(Placement::Placed(s)) => Some(s),
            _ => None,
        }
    }

    pub(super) fn set_status(&mut self, code: &str, placement: Placement) {
        if let Some(&i) = self.index.get(code) {
            self.status[i] = placement;
        }
    }

    pub(super) fn alternative_placed(&self, node: &CourseNode) -> bool {
        node.alternatives.iter().any(|a| self.slot_of(a).is_some())
    }

    /// First slot allowed by the prerequisites already placed. Co-requisites
    /// may share the slot, every other prerequisite must come strictly before.
    pub(super) fn earliest_slot(&self, node: &CourseNode) -> usize {
        node.prerequisites
            .iter()
            .filter_map(|p| {
                let s = self.slot_of(p)?;
                Some(if node.is_co_requisite(p) { s } else { s + 1 })
            })
            .max()
            .unwrap_or(0)
    }

    /// Exclusive upper bound imposed by dependents already placed.
    pub(super) fn slot_limit(&self, node: &CourseNode) -> usize {
        node.dependents
            .iter()
            .filter_map(|d| {
                let s = self.slot_of(d)?;
                let dependent = self.node(d)?;
                Some(if dependent.is_co_requisite(&node.code) { s + 1 } else { s })
            })
            .min()
            .unwrap_or(usize::MAX)
    }

    pub(super) fn fits(&self, slot: usize, units: f64) -> bool {
        self.slots[slot].units + units <= self.cap + EPSILON
    }

    /// Whether `node` alone could go into `slot` as things stand.
    pub(super) fn accepts(&self, node: &CourseNode, slot: usize) -> bool {
        let term = &self.slots[slot];
        !term.is_avoid_term
            && node.is_offered_in(term.name.season)
            && slot >= self.earliest_slot(node)
            && slot < self.slot_limit(node)
            && self.fits(slot, node.units)
    }

    pub(super) fn place(&mut self, code: &str, slot: usize) {
        let Some(node) = self.node(code).cloned() else { return };
        self.slots[slot].push(ScheduledCourse::from(&node));
        self.set_status(code, Placement::Placed(slot));
        for alt in &node.alternatives {
            if matches!(self.status_of(alt), Some(Placement::Unplaced) | Some(Placement::Unplaceable)) {
                log::debug!("{} placed, excluding alternative {}", code, alt);
                self.set_status(alt, Placement::Excluded);
            }
        }
    }

    pub(super) fn relocate(&mut self, code: &str, to: usize) -> bool {
        let Some(from) = self.slot_of(code) else { return false };
        if from == to {
            return true;
        }
        let Some(course) = self.slots[from].take(code) else { return false };
        self.slots[to].push(course);
        self.set_status(code, Placement::Placed(to));
        log::debug!("moved {} from {} to {}", code, self.slots[from].name, self.slots[to].name);
        true
    }

    /// Append the next term in the rotation and return its index.
    pub(super) fn append_slot(&mut self) -> usize {
        let term = match self.slots.last() {
            Some(last) => last.name.next(),
            None => self.constraints.start_term,
        };
        log::debug!("appending term {}", term);
        self.slots.push(TermSlot::new(term, self.constraints.is_avoided_term(&term)));
        self.slots.len() - 1
    }

    /// Avoided course with an open, non-avoided alternative to take instead.
    fn avoided_with_substitute(&self, node: &CourseNode) -> bool {
        self.constraints.is_avoided_course(&node.code)
            && node.alternatives.iter().any(|a| {
                !self.constraints.is_avoided_course(a) && self.status_of(a) == Some(Placement::Unplaced)
            })
    }

    /// The better-scored open member of `node`'s alternative group, when it
    /// is not `node` itself.
    fn outranked_by(&self, node: &CourseNode) -> Option<String> {
        if node.alternatives.is_empty() {
            return None;
        }
        let best = self.best_of_group(node);
        if best.as_deref() == Some(node.code.as_str()) {
            None
        } else {
            Some(best.unwrap_or_default())
        }
    }

    /// Unplaced co-requisites that can share a slot with `node`.
    fn bundle_members(&self, node: &CourseNode) -> Vec<CourseNode> {
        node.co_requisites
            .iter()
            .filter(|m| *m != &node.code && self.status_of(m) == Some(Placement::Unplaced))
            .filter_map(|m| self.node(m))
            .filter(|m| !self.alternative_placed(m))
            .filter(|m| !self.avoided_with_substitute(m) && self.outranked_by(m).is_none())
            .filter(|m| {
                let strict_link = m.strict_prerequisites().any(|p| p == &node.code)
                    || node.strict_prerequisites().any(|p| p == &m.code);
                let blocked = m
                    .strict_prerequisites()
                    .any(|p| self.status_of(p) == Some(Placement::Unplaced));
                !strict_link && !blocked
            })
            .cloned()
            .collect()
    }

    /// First-fit placement of `code` together with its co-requisite bundle.
    pub(super) fn place_first_fit(&mut self, code: &str) -> bool {
        let Some(node) = self.node(code).cloned() else { return false };
        let mut members = vec![node.clone()];
        members.extend(self.bundle_members(&node));

        let units: f64 = members.iter().map(|m| m.units).sum();
        let start = members.iter().map(|m| self.earliest_slot(m)).max().unwrap_or(0);
        let limit = members
            .iter()
            .map(|m| self.slot_limit(m))
            .min()
            .unwrap_or(usize::MAX)
            .min(self.slots.len());

        for slot in start..limit {
            let term = &self.slots[slot];
            if term.is_avoid_term {
                continue;
            }
            if !members.iter().all(|m| m.is_offered_in(term.name.season)) {
                continue;
            }
            if !self.fits(slot, units) {
                continue;
            }
            for m in &members {
                self.place(&m.code, slot);
            }
            if members.len() > 1 {
                let codes: Vec<&str> = members.iter().map(|m| m.code.as_str()).collect();
                log::debug!("placed bundle [{}] in {}", codes.join(", "), self.slots[slot].name);
            } else {
                log::debug!("placed {} in {}", code, self.slots[slot].name);
            }
            return true;
        }
        false
    }

    fn allocate(&mut self, i: usize) {
        if self.status[i] != Placement::Unplaced {
            return;
        }
        let node = self.courses[i].clone();
        let code = node.code.as_str();

        if self.alternative_placed(&node) {
            log::debug!("skipping {}: an alternative is already placed", code);
            self.status[i] = Placement::Excluded;
            return;
        }

        if self.avoided_with_substitute(&node) {
            log::debug!("skipping {}: avoided and a substitute exists", code);
            self.status[i] = Placement::Excluded;
            return;
        }

        if let Some(best) = self.outranked_by(&node) {
            log::debug!("skipping {}: {} is the better alternative", code, best);
            self.status[i] = Placement::Excluded;
            return;
        }

        if !self.place_first_fit(code) {
            log::debug!("no feasible term for {}", code);
            self.status[i] = Placement::Unplaceable;
        }
    }

    /// Best-scored member of `node`'s group among those still open. Ties go
    /// to the lexicographically smallest code.
    pub(super) fn best_of_group(&self, node: &CourseNode) -> Option<String> {
        self.ranked_group(node, |p| p == Placement::Unplaced).into_iter().next()
    }

    /// `node` and its alternatives whose state passes `keep`, best first.
    pub(super) fn ranked_group(&self, node: &CourseNode, keep: impl Fn(Placement) -> bool) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = std::iter::once(&node.code)
            .chain(node.alternatives.iter())
            .filter_map(|c| {
                let member = self.node(c)?;
                let status = self.status_of(c)?;
                keep(status).then(|| (alternative_score(member, self.constraints), member.code.as_str()))
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal).then_with(|| a.1.cmp(b.1)));
        scored.into_iter().map(|(_, c)| c.to_string()).collect()
    }

    /// Give alternative groups left without a placed member another try,
    /// best-scored member first.
    fn recover_alternatives(&mut self) {
        for i in 0..self.courses.len() {
            let node = self.courses[i].clone();
            if node.alternatives.is_empty()
                || matches!(self.status[i], Placement::Placed(_))
                || self.alternative_placed(&node)
            {
                continue;
            }
            let candidates = self.ranked_group(&node, |p| !matches!(p, Placement::Placed(_)));
            for code in candidates {
                if self.place_first_fit(&code) {
                    log::info!("alternative group of {} recovered with {}", node.code, code);
                    break;
                }
                self.set_status(&code, Placement::Unplaceable);
            }
        }
    }

    fn into_plan(self, no_equivalent_courses: Vec<NoEquivalentCourse>) -> Plan {
        let unscheduled: Vec<UnscheduledCourse> = self
            .courses
            .iter()
            .zip(self.status.iter())
            .filter(|(_, s)| matches!(s, Placement::Unplaced | Placement::Unplaceable))
            .map(|(c, _)| UnscheduledCourse {
                code: c.code.clone(),
                name: c.name.clone(),
                units: c.units,
                reason: if c.units > self.cap + EPSILON {
                    UnscheduledReason::ExceedsUnitCap
                } else {
                    UnscheduledReason::NoFeasibleTerm
                },
            })
            .collect();
        for u in &unscheduled {
            log::warn!("could not schedule {} ({:?})", u.code, u.reason);
        }

        let mut plan = Plan {
            start_term: None,
            end_term: None,
            total_units: 0.0,
            terms: self.slots.into_iter().filter(|t| !t.courses.is_empty()).collect(),
            no_equivalent_courses,
            targets: Vec::new(),
            unscheduled,
        };
        plan.refresh_totals();
        plan
    }
}

/// Sequences kept in consecutive terms: the configured ones plus the
/// sequential linked groups of the forest.
fn continuous_sequences(forest: &ChainForest, constraints: &Constraints) -> Vec<Vec<String>> {
    let mut sequences = constraints.continuous_sequences.clone();
    for group in forest.groups.iter().filter(|g| g.sequential) {
        if !sequences.contains(&group.codes) {
            sequences.push(group.codes.clone());
        }
    }
    sequences
}

/// Allocate every course of the forest to a term.
///
/// Courses are processed by ascending level, by descending priority inside a
/// level, and placed in the first slot that respects ordering, offering,
/// avoided terms and the unit cap. Repair passes run afterwards in a fixed
/// order. Courses that could not be placed are listed in `Plan::unscheduled`.
pub fn generate_plan(forest: &ChainForest, constraints: &Constraints) -> Plan {
    let courses = flatten_chains(&forest.chains);
    let order = processing_order(&courses, constraints);
    log::info!(
        "allocating {} courses from {} over {} initial terms (cap {} units)",
        courses.len(),
        constraints.start_term,
        constraints.planned_terms(),
        constraints.effective_max_units()
    );

    let mut alloc = Allocation::new(courses, constraints);
    for i in order {
        alloc.allocate(i);
    }
    alloc.recover_alternatives();

    if constraints.finish_fastest {
        alloc.maximize_term_units();
    }
    alloc.enforce_min_units();
    alloc.purge_avoided_terms();
    alloc.repair_unit_cap();
    alloc.repair_continuous_sequences(&continuous_sequences(forest, constraints));

    let plan = alloc.into_plan(forest.no_equivalent_courses.clone());
    log::info!(
        "plan ready: {} terms, {} units, {} unscheduled",
        plan.terms.len(),
        plan.total_units,
        plan.unscheduled.len()
    );
    plan
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Chain, Season, Term};

    pub(crate) fn course(code: &str, units: f64, prereqs: &[&str]) -> CourseNode {
        CourseNode {
            code: code.to_string(),
            name: code.to_string(),
            units,
            prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
            dependents: vec![],
            alternatives: vec![],
            co_requisites: vec![],
            terms_offered: vec![],
            level: 0,
            additional_notes: String::new(),
        }
    }

    fn leaf(node: CourseNode) -> Chain {
        Chain { course: node, prerequisites: vec![], level: 0 }
    }

    fn constraints(max_terms: usize) -> Constraints {
        Constraints {
            start_term: "Fall 2024".parse().unwrap(),
            max_terms,
            min_units_per_term: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_bundle_shares_a_term() {
        let mut lecture = course("CHEM 1B", 5.0, &[]);
        lecture.co_requisites = vec!["CHEM 1BL".to_string()];
        let mut lab = course("CHEM 1BL", 2.0, &[]);
        lab.co_requisites = vec!["CHEM 1B".to_string()];
        let filler = course("EWRT 1A", 10.0, &[]);
        let forest = ChainForest { chains: vec![leaf(filler), leaf(lecture), leaf(lab)], ..Default::default() };

        let plan = generate_plan(&forest, &constraints(3));
        let t = plan.term_of("CHEM 1B").unwrap();
        assert_eq!(plan.term_of("CHEM 1BL"), Some(t));
        assert!(plan.terms.iter().all(|t| t.units <= 15.0));
    }

    #[test]
    fn test_oversized_course_reported() {
        let forest = ChainForest { chains: vec![leaf(course("LAB 99", 18.0, &[]))], ..Default::default() };
        let plan = generate_plan(&forest, &constraints(2));
        assert!(plan.terms.is_empty());
        assert_eq!(plan.unscheduled.len(), 1);
        assert_eq!(plan.unscheduled[0].reason, UnscheduledReason::ExceedsUnitCap);
        assert_eq!(plan.start_term, None);
    }

    #[test]
    fn test_avoided_course_replaced_by_alternative() {
        let mut a = course("MATH 10", 5.0, &[]);
        a.alternatives = vec!["MATH 10H".to_string()];
        let mut b = course("MATH 10H", 5.0, &[]);
        b.alternatives = vec!["MATH 10".to_string()];
        b.terms_offered = vec![Season::Spring];
        let forest = ChainForest { chains: vec![leaf(a), leaf(b)], ..Default::default() };

        let mut c = constraints(4);
        c.avoid_courses.insert("MATH 10".to_string());
        let plan = generate_plan(&forest, &c);
        assert_eq!(plan.scheduled_codes(), vec!["MATH 10H"]);
        assert_eq!(plan.terms[0].name, "Spring 2024".parse::<Term>().unwrap());
    }

    #[test]
    fn test_bundle_member_yields_to_preferred_alternative() {
        let mut chem = course("CHEM 1B", 5.0, &[]);
        chem.co_requisites = vec!["LAB A".to_string()];
        let mut lab_a = course("LAB A", 2.0, &[]);
        lab_a.alternatives = vec!["LAB B".to_string()];
        let mut lab_b = course("LAB B", 2.0, &[]);
        lab_b.alternatives = vec!["LAB A".to_string()];
        let forest = ChainForest { chains: vec![leaf(chem), leaf(lab_a), leaf(lab_b)], ..Default::default() };

        let mut c = constraints(2);
        c.avoid_courses.insert("LAB A".to_string());
        let plan = generate_plan(&forest, &c);
        let mut scheduled = plan.scheduled_codes();
        scheduled.sort();
        assert_eq!(scheduled, vec!["CHEM 1B", "LAB B"]);
        assert!(plan.unscheduled.is_empty());
    }

    #[test]
    fn test_huge_max_terms_is_clamped() {
        let forest = ChainForest { chains: vec![leaf(course("MATH 1A", 5.0, &[]))], ..Default::default() };
        let plan = generate_plan(&forest, &constraints(usize::MAX));
        assert_eq!(plan.scheduled_codes(), vec!["MATH 1A"]);
        assert_eq!(plan.start_term, Some("Fall 2024".parse().unwrap()));
    }

    #[test]
    fn test_group_recovered_when_best_member_cannot_be_placed() {
        // STAT 10H scores higher but is offered only in Summer, outside a two-term plan.
        let mut a = course("STAT 10", 6.0, &[]);
        a.alternatives = vec!["STAT 10H".to_string()];
        a.terms_offered = vec![Season::Fall];
        let mut b = course("STAT 10H", 5.0, &[]);
        b.alternatives = vec!["STAT 10".to_string()];
        b.terms_offered = vec![Season::Summer];
        let forest = ChainForest { chains: vec![leaf(a), leaf(b)], ..Default::default() };

        let plan = generate_plan(&forest, &constraints(2));
        assert_eq!(plan.scheduled_codes(), vec!["STAT 10"]);
        assert!(plan.unscheduled.is_empty());
    }
}
