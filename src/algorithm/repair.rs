// Post-passes run after the first-fit allocation, in this order:
// finish-fastest backfill, minimum-load backfill, avoided-term purge,
// unit-cap repair and continuous-sequence repair.

use std::cmp::Ordering;
use super::allocator::{Allocation, Placement, EPSILON};

/// Room (in units) under the cap that finish-fastest considers full.
const FINISH_FASTEST_SLACK: f64 = 2.0;
/// Smallest room worth backfilling.
const FINISH_FASTEST_MIN_ROOM: f64 = 3.0;

impl<'c> Allocation<'c> {
    /// Unplaced course `i` can be added to `slot`: every prerequisite placed
    /// in time, no alternative already placed, and the slot accepts it.
    fn backfill_candidate(&self, i: usize, slot: usize) -> bool {
        if !matches!(self.status[i], Placement::Unplaced | Placement::Unplaceable) {
            return false;
        }
        let node = &self.courses[i];
        if self.alternative_placed(node) {
            return false;
        }
        let prerequisites_met = node.prerequisites.iter().all(|p| match self.slot_of(p) {
            Some(s) if node.is_co_requisite(p) => s <= slot,
            Some(s) => s < slot,
            None => false,
        });
        prerequisites_met && self.accepts(node, slot)
    }

    fn candidates_by_units(&self, slot: usize, largest_first: bool) -> Vec<usize> {
        let mut candidates: Vec<usize> = (0..self.courses.len()).filter(|&i| self.backfill_candidate(i, slot)).collect();
        candidates.sort_by(|&a, &b| {
            let by_units = self.courses[a].units.partial_cmp(&self.courses[b].units).unwrap_or(Ordering::Equal);
            let by_units = if largest_first { by_units.reverse() } else { by_units };
            by_units.then_with(|| self.courses[a].code.cmp(&self.courses[b].code))
        });
        candidates
    }

    /// Fill each open term up to within two units of the cap, largest courses first.
    pub(super) fn maximize_term_units(&mut self) {
        for slot in 0..self.slots.len() {
            if self.slots[slot].is_avoid_term {
                continue;
            }
            let room = self.cap - self.slots[slot].units;
            if room <= FINISH_FASTEST_SLACK + EPSILON || room < FINISH_FASTEST_MIN_ROOM - EPSILON {
                continue;
            }
            for i in self.candidates_by_units(slot, true) {
                if self.cap - self.slots[slot].units <= FINISH_FASTEST_SLACK + EPSILON {
                    break;
                }
                if self.backfill_candidate(i, slot) {
                    let code = self.courses[i].code.clone();
                    log::info!("finish fastest: adding {} to {}", code, self.slots[slot].name);
                    self.place(&code, slot);
                }
            }
        }
    }

    /// Raise every non-final, non-avoided term to `minUnitsPerTerm`: first with
    /// the smallest unplaced courses, then by pulling movable courses forward.
    pub(super) fn enforce_min_units(&mut self) {
        let min = self.constraints.min_units_per_term;
        let Some(last) = self.slots.iter().rposition(|t| !t.courses.is_empty()) else { return };

        for slot in 0..last {
            if self.slots[slot].is_avoid_term || self.slots[slot].units + EPSILON >= min {
                continue;
            }

            for i in self.candidates_by_units(slot, false) {
                if self.slots[slot].units + EPSILON >= min {
                    break;
                }
                if self.backfill_candidate(i, slot) {
                    let code = self.courses[i].code.clone();
                    log::info!("minimum load: adding {} to {}", code, self.slots[slot].name);
                    self.place(&code, slot);
                }
            }

            for later in slot + 1..self.slots.len() {
                if self.slots[slot].units + EPSILON >= min {
                    break;
                }
                if self.slots[later].is_avoid_term {
                    continue;
                }
                let codes: Vec<String> = self.slots[later].courses.iter().map(|c| c.code.clone()).collect();
                for code in codes {
                    if self.slots[slot].units + EPSILON >= min {
                        break;
                    }
                    // A same-term prerequisite of a peer stays put.
                    if !self.slots[later].dependents_of(&code).is_empty() {
                        continue;
                    }
                    let Some(node) = self.node(&code) else { continue };
                    if self.accepts(node, slot) {
                        log::info!("minimum load: pulling {} forward to {}", code, self.slots[slot].name);
                        self.relocate(&code, slot);
                    }
                }
            }

            if self.slots[slot].units + EPSILON < min {
                log::warn!(
                    "{} has {} units, below the minimum of {}; no eligible course left",
                    self.slots[slot].name,
                    self.slots[slot].units,
                    min
                );
            }
        }
    }

    /// Move `code` to the first open slot at or after `from` and push its
    /// placed dependents behind it. New slots are appended as needed.
    fn push_later(&mut self, code: &str, from: usize) -> bool {
        let Some(node) = self.node(code).cloned() else { return false };
        if node.units > self.cap + EPSILON {
            return false;
        }
        let max_slots = self.slots.len() + 4 * (self.constraints.avoid_terms.len() + 2);

        let mut slot = from.max(self.earliest_slot(&node));
        loop {
            while slot >= self.slots.len() {
                if self.slots.len() >= max_slots {
                    log::warn!("no later term can take {}", code);
                    return false;
                }
                self.append_slot();
            }
            let term = &self.slots[slot];
            if !term.is_avoid_term && node.is_offered_in(term.name.season) && self.fits(slot, node.units) {
                break;
            }
            slot += 1;
        }
        self.relocate(code, slot);

        // The flattened prerequisite graph is acyclic, so the cascade ends.
        for dependent in &node.dependents {
            let Some(at) = self.slot_of(dependent) else { continue };
            let shares = self.node(dependent).is_some_and(|d| d.is_co_requisite(code));
            let min_slot = if shares { slot } else { slot + 1 };
            if at < min_slot {
                self.push_later(dependent, min_slot);
            }
        }
        true
    }

    /// Relocate anything sitting in an avoided term to the next open term.
    pub(super) fn purge_avoided_terms(&mut self) {
        for slot in 0..self.slots.len() {
            if !self.slots[slot].is_avoid_term || self.slots[slot].courses.is_empty() {
                continue;
            }
            let codes: Vec<String> = self.slots[slot].courses.iter().map(|c| c.code.clone()).collect();
            for code in codes {
                log::info!("{} sits in avoided term {}, relocating", code, self.slots[slot].name);
                if !self.push_later(&code, slot + 1) {
                    log::warn!("could not move {} out of avoided term {}", code, self.slots[slot].name);
                }
            }
        }
    }

    /// Evict courses from terms over the cap until each fits. The smallest
    /// course that no peer depends on goes first; a lone course stays.
    pub(super) fn repair_unit_cap(&mut self) {
        let mut slot = 0;
        while slot < self.slots.len() {
            while self.slots[slot].units > self.cap + EPSILON && self.slots[slot].courses.len() > 1 {
                let term = &self.slots[slot];
                let smallest = |free_only: bool| {
                    term.courses
                        .iter()
                        .filter(|c| !free_only || term.dependents_of(&c.code).is_empty())
                        .min_by(|a, b| a.units.partial_cmp(&b.units).unwrap_or(Ordering::Equal))
                        .map(|c| c.code.clone())
                };
                let Some(code) = smallest(true).or_else(|| smallest(false)) else { break };
                log::info!("{} is over {} units, evicting {}", term.name, self.cap, code);
                if !self.push_later(&code, slot + 1) {
                    break;
                }
            }
            slot += 1;
        }
    }

    /// Keep each sequence in consecutive terms where that is safe.
    pub(super) fn repair_continuous_sequences(&mut self, sequences: &[Vec<String>]) {
        for sequence in sequences {
            for pair in sequence.windows(2) {
                let (prev, curr) = (&pair[0], &pair[1]);
                let (Some(at_prev), Some(at_curr)) = (self.slot_of(prev), self.slot_of(curr)) else { continue };
                let target = at_prev + 1;
                if at_curr == target {
                    continue;
                }
                let safe = target < self.slots.len() && self.node(curr).is_some_and(|n| self.accepts(n, target));
                if safe {
                    log::info!("keeping {} right after {}", curr, prev);
                    self.relocate(curr, target);
                } else {
                    log::warn!("{} cannot follow {} directly; sequence left with a gap", curr, prev);
                }
            }
        }
    }
}
