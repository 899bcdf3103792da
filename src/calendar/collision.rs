//! Drop-target resolution.
//!
//! A [`CollisionStrategy`] picks which registered cell the pointer is over.
//! Any `Fn(Pos2, &[DropCandidate]) -> Option<String>` works as a strategy, so
//! tests and alternative layouts can plug in their own geometry.

use egui::{Pos2, Rect};

/// A registered drop target
#[derive(Debug, Clone, PartialEq)]
pub struct DropCandidate {
    pub id: String,
    pub rect: Rect,
}

impl DropCandidate {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self { id: id.into(), rect }
    }
}

pub trait CollisionStrategy {
    fn resolve_drop_target(&self, pointer: Pos2, candidates: &[DropCandidate]) -> Option<String>;
}

impl<F> CollisionStrategy for F
where
    F: Fn(Pos2, &[DropCandidate]) -> Option<String>,
{
    fn resolve_drop_target(&self, pointer: Pos2, candidates: &[DropCandidate]) -> Option<String> {
        self(pointer, candidates)
    }
}

/// Nearest cell center wins; the first registered cell breaks ties
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestCenter;

impl CollisionStrategy for ClosestCenter {
    fn resolve_drop_target(&self, pointer: Pos2, candidates: &[DropCandidate]) -> Option<String> {
        let mut best: Option<(&DropCandidate, f32)> = None;
        for candidate in candidates {
            let distance = candidate.rect.center().distance_sq(pointer);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((candidate, distance));
            }
        }
        best.map(|(candidate, _)| candidate.id.clone())
    }
}

/// Only the cell that contains the pointer; the smallest one when cells overlap
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerWithin;

impl CollisionStrategy for PointerWithin {
    fn resolve_drop_target(&self, pointer: Pos2, candidates: &[DropCandidate]) -> Option<String> {
        candidates
            .iter()
            .filter(|candidate| candidate.rect.contains(pointer))
            .min_by(|a, b| a.rect.area().total_cmp(&b.rect.area()))
            .map(|candidate| candidate.id.clone())
    }
}
