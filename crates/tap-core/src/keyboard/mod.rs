//! Keyboard geometry and key-proximity tables.
//!
//! `KeyboardLayout` places keys in key-width units; `ProximityMap` precomputes
//! the two proximity rings around every key plus space-bar adjacency. The
//! per-decode candidate sets live in [`proximity::ProximityState`].

pub mod proximity;

use std::collections::{HashMap, HashSet};

use crate::settings::settings;

/// One key: code point plus center position and extent, in key-width units.
#[derive(Debug, Clone, Copy)]
pub struct Key {
    pub code_point: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Lowercase a code point for key lookup; non-letters pass through.
pub fn base_lower(code_point: u32) -> u32 {
    match char::from_u32(code_point) {
        Some(c) => c.to_lowercase().next().map(|l| l as u32).unwrap_or(code_point),
        None => code_point,
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    keys: Vec<Key>,
    space: Key,
}

impl KeyboardLayout {
    /// Standard QWERTY letter block with an apostrophe key and a space bar.
    pub fn qwerty() -> Self {
        let mut keys = Vec::new();
        let rows: [(&str, f32, f32); 3] = [
            ("qwertyuiop", 0.5, 0.5),
            ("asdfghjkl'", 0.75, 1.5),
            ("zxcvbnm", 1.25, 2.5),
        ];
        for (row, x0, y) in rows {
            for (i, c) in row.chars().enumerate() {
                keys.push(Key {
                    code_point: c as u32,
                    x: x0 + i as f32,
                    y,
                    width: 1.0,
                    height: 1.0,
                });
            }
        }
        let space = Key {
            code_point: ' ' as u32,
            x: 4.5,
            y: 3.5,
            width: 4.0,
            height: 1.0,
        };
        Self { keys, space }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn key(&self, code_point: u32) -> Option<&Key> {
        let cp = base_lower(code_point);
        self.keys.iter().find(|k| k.code_point == cp)
    }

    /// Nearest key to a touch coordinate, with its center distance.
    pub fn nearest_key(&self, x: f32, y: f32) -> Option<(&Key, f32)> {
        self.keys
            .iter()
            .map(|k| (k, ((k.x - x).powi(2) + (k.y - y).powi(2)).sqrt()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Precomputed proximity rings and space adjacency for a layout.
#[derive(Debug, Clone)]
pub struct ProximityMap {
    layout: KeyboardLayout,
    first_ring: HashMap<u32, Vec<u32>>,
    additional_ring: HashMap<u32, Vec<u32>>,
    space_adjacent: HashSet<u32>,
}

impl ProximityMap {
    pub fn new(layout: KeyboardLayout) -> Self {
        let s = settings();
        let mut first_ring: HashMap<u32, Vec<u32>> = HashMap::new();
        let mut additional_ring: HashMap<u32, Vec<u32>> = HashMap::new();
        for a in layout.keys() {
            let mut first = Vec::new();
            let mut additional = Vec::new();
            for b in layout.keys() {
                if a.code_point == b.code_point {
                    continue;
                }
                let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                if dist <= s.keyboard.proximity_radius {
                    first.push(b.code_point);
                } else if dist <= s.keyboard.additional_radius {
                    additional.push(b.code_point);
                }
            }
            first_ring.insert(a.code_point, first);
            additional_ring.insert(a.code_point, additional);
        }

        // Keys in the row directly above the space bar and within its span
        // (plus half a key of slack on either side).
        let space = layout.space;
        let space_adjacent = layout
            .keys()
            .iter()
            .filter(|k| {
                (k.y - (space.y - 1.0)).abs() < 0.01
                    && k.x >= space.x - space.width / 2.0 - 0.5
                    && k.x <= space.x + space.width / 2.0 + 0.5
            })
            .map(|k| k.code_point)
            .collect();

        Self {
            layout,
            first_ring,
            additional_ring,
            space_adjacent,
        }
    }

    pub fn qwerty() -> Self {
        Self::new(KeyboardLayout::qwerty())
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn is_first_ring(&self, key: u32, other: u32) -> bool {
        self.first_ring
            .get(&base_lower(key))
            .is_some_and(|v| v.contains(&base_lower(other)))
    }

    pub fn is_additional_ring(&self, key: u32, other: u32) -> bool {
        self.additional_ring
            .get(&base_lower(key))
            .is_some_and(|v| v.contains(&base_lower(other)))
    }

    pub fn is_space_adjacent(&self, key: u32) -> bool {
        self.space_adjacent.contains(&base_lower(key))
    }

    pub fn first_ring(&self, key: u32) -> &[u32] {
        self.first_ring
            .get(&base_lower(key))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn additional_ring(&self, key: u32) -> &[u32] {
        self.additional_ring
            .get(&base_lower(key))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
