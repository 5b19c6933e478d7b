//! Dependency resolution over a universe of bolts.
//!
//! All functions here are pure and total: they derive blocked state, blocking
//! lists, and reverse-edge counts from the current statuses and edges, with no
//! error cases. A required id that does not exist in the universe counts as
//! blocking. Safe to call repeatedly; the output depends only on the input.

use std::collections::{HashMap, HashSet};

use crate::core::bolt::{Bolt, BoltStatus, ResolvedBolt};

/// Compute derived dependency state for every bolt in the universe.
///
/// A bolt already `Complete` is never blocked, regardless of its own
/// `requires` list; its `unblocks_count` is still computed and reported.
pub fn resolve(universe: &[Bolt]) -> Vec<ResolvedBolt> {
    let complete: HashSet<&str> = universe
        .iter()
        .filter(|bolt| bolt.status == BoltStatus::Complete)
        .map(|bolt| bolt.id.as_str())
        .collect();
    let unblocks = unblocks_counts(universe);

    universe
        .iter()
        .map(|bolt| {
            let unblocks_count = unblocks.get(bolt.id.as_str()).copied().unwrap_or(0);
            let blocked_by = if bolt.status == BoltStatus::Complete {
                Vec::new()
            } else {
                unmet_requirements(bolt, &complete)
            };
            let is_blocked = !blocked_by.is_empty();
            let status = if bolt.status == BoltStatus::Draft && is_blocked {
                BoltStatus::Blocked
            } else {
                bolt.status
            };
            ResolvedBolt {
                id: bolt.id.clone(),
                status,
                is_blocked,
                blocked_by,
                unblocks_count,
            }
        })
        .collect()
}

/// Priority-ordered schedulable work: bolts in `Draft` or `Blocked`, unblocked
/// first, then by how many downstream bolts they unlock, then by id.
///
/// Ready work is never hidden behind blocked work, and among equals the bolt
/// that unlocks the most follow-on work sorts first.
pub fn up_next(universe: &[Bolt]) -> Vec<ResolvedBolt> {
    let mut candidates: Vec<ResolvedBolt> = resolve(universe)
        .into_iter()
        .filter(|bolt| matches!(bolt.status, BoltStatus::Draft | BoltStatus::Blocked))
        .collect();
    candidates.sort_by(|a, b| {
        a.is_blocked
            .cmp(&b.is_blocked)
            .then_with(|| b.unblocks_count.cmp(&a.unblocks_count))
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates
}

/// Whether a single bolt is blocked against the given universe.
pub fn is_bolt_blocked(bolt: &Bolt, universe: &[Bolt]) -> bool {
    !blocking_bolts(bolt, universe).is_empty()
}

/// Unmet requirement ids for a single bolt, in `requires` order.
pub fn blocking_bolts(bolt: &Bolt, universe: &[Bolt]) -> Vec<String> {
    if bolt.status == BoltStatus::Complete {
        return Vec::new();
    }
    let complete: HashSet<&str> = universe
        .iter()
        .filter(|other| other.status == BoltStatus::Complete)
        .map(|other| other.id.as_str())
        .collect();
    unmet_requirements(bolt, &complete)
}

/// Number of bolts whose `requires` contains `id`.
pub fn count_unblocks(id: &str, universe: &[Bolt]) -> usize {
    universe
        .iter()
        .filter(|bolt| bolt.requires.iter().any(|req| req == id))
        .count()
}

fn unmet_requirements(bolt: &Bolt, complete: &HashSet<&str>) -> Vec<String> {
    bolt.requires
        .iter()
        .filter(|req| !complete.contains(req.as_str()))
        .cloned()
        .collect()
}

fn unblocks_counts(universe: &[Bolt]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for bolt in universe {
        // Containment, not multiplicity: a duplicated edge counts once.
        let unique: HashSet<&str> = bolt.requires.iter().map(String::as_str).collect();
        for req in unique {
            *counts.entry(req).or_insert(0) += 1;
        }
    }
    counts
}
