//! Path objective and the hand state carried by the inactivity-aware solver.

use crate::domain::{CostWeights, NUM_FINGERS};
use crate::error::AppError;
use crate::fingering::{ACTIVE_HAND, Anchors, Fingering, Inactivity, finger_movement};
use crate::path::PathStep;
use crate::store::FingeringStore;

/// Cap on the inactivity modifier: a finger rested this long moves at a third of the cost.
pub const MAX_INACTIVITY: f64 = 3.0;

const COST_EPSILON: f64 = 1e-9;

/// `(cost, fret_total)` of `a` beats `b`: cheaper, or as cheap and lower on the neck.
pub fn is_better(a: (f64, u32), b: (f64, u32)) -> bool {
    if a.0 < b.0 - COST_EPSILON {
        return true;
    }
    (a.0 - b.0).abs() <= COST_EPSILON && a.1 < b.1
}

/// Fixed-weight cost of a full path: weighted stretch of every fingering plus
/// weighted plain transitions between neighbours.
pub fn path_cost(store: &FingeringStore, steps: &[PathStep], indices: &[usize]) -> Result<f64, AppError> {
    let weights = store.weights();
    let mut cost = 0.0;
    let mut prev: Option<&Fingering> = None;
    for (step, &index) in steps.iter().zip(indices) {
        let fingering = store.fingering(&step.chord, index)?;
        let transition = prev.map_or(0.0, |p| p.transition(fingering));
        cost += weights.step(transition, fingering.stretch_cost());
        prev = Some(fingering);
    }
    Ok(cost)
}

pub fn path_fret_total(store: &FingeringStore, steps: &[PathStep], indices: &[usize]) -> Result<u32, AppError> {
    steps
        .iter()
        .zip(indices)
        .map(|(step, &index)| store.fingering(&step.chord, index).map(Fingering::fret_total))
        .sum()
}

/// Where each finger last was and how long it has been resting.
#[derive(Debug, Clone, PartialEq)]
pub struct HandState {
    anchors: Anchors,
    idle: Inactivity,
}

impl HandState {
    /// No finger placed yet, none rested.
    pub fn blank() -> Self {
        Self {
            anchors: [None; NUM_FINGERS],
            idle: ACTIVE_HAND,
        }
    }

    /// Movement into `next`, each finger's distance eased by how long it rested.
    pub fn movement_to(&self, next: &Fingering) -> f64 {
        finger_movement(&self.anchors, &next.anchors(), &self.idle)
    }

    /// Hand after holding `fingering` for `duration` quarter notes.
    ///
    /// Fingers in use reset to full effort; the rest keep their last position
    /// and rest a little more.
    pub fn after(&self, fingering: &Fingering, duration: f64) -> HandState {
        let placed = fingering.anchors();
        let mut next = self.clone();
        for slot in 0..NUM_FINGERS {
            match placed[slot] {
                Some(position) => {
                    next.anchors[slot] = Some(position);
                    next.idle[slot] = 1.0;
                }
                None => next.idle[slot] = (self.idle[slot] + duration.max(0.0)).min(MAX_INACTIVITY),
            }
        }
        next
    }

    pub fn idle(&self) -> &Inactivity {
        &self.idle
    }

    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }
}

/// Weighted cost of stepping from `hand` into `next`.
pub fn inactivity_step(weights: CostWeights, hand: &HandState, next: &Fingering) -> f64 {
    weights.step(hand.movement_to(next), next.stretch_cost())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Finger, Position};

    fn pos(fret: u8, string: u8) -> Position {
        Position::new(fret, string)
    }

    #[test]
    fn better_prefers_cost_then_low_frets() {
        assert!(is_better((1.0, 10), (2.0, 0)));
        assert!(is_better((1.0, 3), (1.0 + 1e-12, 4)));
        assert!(!is_better((1.0, 4), (1.0, 4)));
        assert!(!is_better((2.0, 0), (1.0, 10)));
    }

    #[test]
    fn resting_fingers_move_cheaper() {
        let first = Fingering::from_assignment(&[(Finger::Index, pos(1, 2)), (Finger::Ring, pos(3, 4))]);
        let middle_only = Fingering::from_assignment(&[(Finger::Middle, pos(5, 3))]);
        let back = Fingering::from_assignment(&[(Finger::Index, pos(3, 2)), (Finger::Ring, pos(5, 4))]);

        let hand = HandState::blank().after(&first, 1.0);
        assert_eq!(hand.idle(), &[1.0, 2.0, 1.0, 2.0]);

        let rested = hand.after(&middle_only, 1.0);
        assert_eq!(rested.idle(), &[2.0, 1.0, 2.0, 3.0]);
        assert_eq!(rested.anchors()[0], Some(pos(1, 2)));

        // Index and ring return from where they were left, at half the cost.
        let plain = first.transition(&back);
        assert!((rested.movement_to(&back) - plain / 2.0).abs() < 1e-12);
    }

    #[test]
    fn inactivity_is_capped() {
        let f = Fingering::from_assignment(&[(Finger::Index, pos(1, 2))]);
        let hand = HandState::blank().after(&f, 10.0).after(&f, 10.0);
        assert_eq!(hand.idle(), &[1.0, MAX_INACTIVITY, MAX_INACTIVITY, MAX_INACTIVITY]);
    }

    #[test]
    fn blank_hand_moves_for_free() {
        let f = Fingering::from_assignment(&[(Finger::Index, pos(7, 2)), (Finger::Pinky, pos(9, 5))]);
        assert_eq!(HandState::blank().movement_to(&f), 0.0);
    }
}
