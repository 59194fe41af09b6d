//! Per-decode proximity candidate sets.
//!
//! `ProximityState` resolves each touch point to a primary key plus its
//! proximity rings once, at session setup; the expander then classifies trie
//! letters against points in O(ring size).

use crate::keyboard::{base_lower, ProximityMap};
use crate::results::{TouchInput, NOT_A_CODE_POINT, NOT_A_COORDINATE};
use crate::settings::settings;

/// Host coordinates are integers in tenths of a key width; the layout grid
/// uses whole key widths.
pub const COORDINATE_SCALE: f32 = 10.0;

/// How a trie letter relates to a touch point's candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityType {
    MatchChar,
    ProximityChar,
    AdditionalProximityChar,
    SubstitutionChar,
    UnrelatedChar,
}

#[derive(Debug, Clone)]
struct PointCandidates {
    primary: u32,
    primary_cost: f32,
    /// First proximity ring with per-key spatial costs.
    first: Vec<(u32, f32)>,
    additional: Vec<u32>,
    space_adjacent: bool,
    time: i32,
}

/// Candidate keys and spatial costs for every input position of one pointer.
#[derive(Debug, Clone, Default)]
pub struct ProximityState {
    points: Vec<PointCandidates>,
    used: bool,
}

impl ProximityState {
    pub fn new(map: &ProximityMap, input: &TouchInput, max_spatial_distance: f32) -> Self {
        let s = settings();
        let mut points = Vec::with_capacity(input.len());
        for i in 0..input.len() {
            let typed = input.code_points[i];
            let candidates = if typed > NOT_A_CODE_POINT {
                Self::typed_candidates(map, typed as u32, time_at(input, i))
            } else if input.xs[i] > NOT_A_COORDINATE && input.ys[i] > NOT_A_COORDINATE {
                match Self::positional_candidates(
                    map,
                    input.xs[i] as f32 / COORDINATE_SCALE,
                    input.ys[i] as f32 / COORDINATE_SCALE,
                    time_at(input, i),
                    max_spatial_distance,
                    s.keyboard.proximity_radius,
                ) {
                    Some(c) => c,
                    None => return Self::unused(),
                }
            } else {
                return Self::unused();
            };
            points.push(candidates);
        }
        let used = !points.is_empty();
        Self { points, used }
    }

    fn unused() -> Self {
        Self {
            points: Vec::new(),
            used: false,
        }
    }

    fn typed_candidates(map: &ProximityMap, code_point: u32, time: i32) -> PointCandidates {
        let s = settings();
        let primary = base_lower(code_point);
        let first = map
            .first_ring(primary)
            .iter()
            .map(|&cp| (cp, s.costs.proximity))
            .collect();
        PointCandidates {
            primary,
            primary_cost: 0.0,
            first,
            additional: map.additional_ring(primary).to_vec(),
            space_adjacent: map.is_space_adjacent(primary),
            time,
        }
    }

    fn positional_candidates(
        map: &ProximityMap,
        x: f32,
        y: f32,
        time: i32,
        max_spatial_distance: f32,
        proximity_radius: f32,
    ) -> Option<PointCandidates> {
        let s = settings();
        let (nearest, nearest_dist) = map.layout().nearest_key(x, y)?;
        if nearest_dist > max_spatial_distance {
            return None;
        }
        let primary = nearest.code_point;
        let mut first = Vec::new();
        for key in map.layout().keys() {
            if key.code_point == primary {
                continue;
            }
            let dist = ((key.x - x).powi(2) + (key.y - y).powi(2)).sqrt();
            if dist <= proximity_radius {
                first.push((key.code_point, s.costs.proximity * (dist / proximity_radius)));
            }
        }
        let primary_cost = s.costs.proximity * (nearest_dist / proximity_radius).min(1.0) * 0.5;
        Some(PointCandidates {
            primary,
            primary_cost,
            first,
            additional: map.additional_ring(primary).to_vec(),
            space_adjacent: map.is_space_adjacent(primary),
            time,
        })
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn primary_code_point(&self, index: usize) -> u32 {
        self.points[index].primary
    }

    pub fn time(&self, index: usize) -> i32 {
        self.points[index].time
    }

    /// Ring classification of `code_point` against point `index`.
    ///
    /// Returns `UnrelatedChar` for anything outside both rings; whether that
    /// becomes a substitution is the traversal policy's call.
    pub fn classify(&self, index: usize, code_point: u32) -> ProximityType {
        let cp = base_lower(code_point);
        let point = &self.points[index];
        if cp == point.primary {
            return ProximityType::MatchChar;
        }
        if point.first.iter().any(|&(c, _)| c == cp) {
            return ProximityType::ProximityChar;
        }
        if point.additional.contains(&cp) {
            return ProximityType::AdditionalProximityChar;
        }
        ProximityType::UnrelatedChar
    }

    /// Spatial cost of aligning `code_point` to point `index`.
    ///
    /// Zero for keys outside the candidate rings; correction kinds carry
    /// their own constants for those.
    pub fn point_to_key_cost(&self, index: usize, code_point: u32) -> f32 {
        let cp = base_lower(code_point);
        let point = &self.points[index];
        if cp == point.primary {
            return point.primary_cost;
        }
        point
            .first
            .iter()
            .find(|&&(c, _)| c == cp)
            .map(|&(_, cost)| cost)
            .unwrap_or(0.0)
    }

    /// True when the key under point `index` borders the space bar.
    pub fn has_space_proximity(&self, index: usize) -> bool {
        self.points[index].space_adjacent
    }
}

fn time_at(input: &TouchInput, index: usize) -> i32 {
    input.times.get(index).copied().unwrap_or(-1)
}
