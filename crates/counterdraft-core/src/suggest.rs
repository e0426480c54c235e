// Counter suggestion: greedy, optionally lane-constrained assignment of own
// heroes to enemy picks.
//
// Candidates (every dataset record aimed at an enemy on the roster) are
// taken in descending score order. Each taken candidate is accepted when its
// enemy, hero and lane are all still free, and every remaining candidate that
// shares its hero, enemy or lane is pruned whether or not it was accepted.
// This is an approximation of a maximum-weight matching, not an optimum.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::CounterDataset;
use crate::roles::{Role, RoleMap};

/// The hero suggested against one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterPick {
    pub hero: String,
    pub score: f64,
    /// Lane the hero fills; set only for lane-constrained suggestions.
    pub role: Option<Role>,
}

/// An enemy from the roster and the counter assigned to it, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyAssignment {
    pub enemy: String,
    pub counter: Option<CounterPick>,
}

/// Output of [`suggest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Selected own heroes in selection order, no duplicates.
    pub chosen: Vec<String>,
    /// One entry per distinct enemy, in roster order.
    pub assignment: Vec<EnemyAssignment>,
    pub total: f64,
}

impl Suggestion {
    /// Counter assigned to `enemy` (case-insensitive).
    pub fn counter_for(&self, enemy: &str) -> Option<&CounterPick> {
        let key = enemy.trim().to_lowercase();
        self.assignment
            .iter()
            .find(|a| a.enemy.to_lowercase() == key)
            .and_then(|a| a.counter.as_ref())
    }

    /// Number of enemies that received a counter.
    pub fn assigned(&self) -> usize {
        self.assignment.iter().filter(|a| a.counter.is_some()).count()
    }
}

#[derive(Debug)]
struct Candidate<'a> {
    hero: &'a str,
    hero_key: String,
    enemy_key: String,
    score: f64,
    role: Option<Role>,
}

/// Descending score, then hero name, then enemy name, so equal scores
/// always come out in the same order.
fn candidate_order(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.hero_key.cmp(&b.hero_key))
        .then_with(|| a.enemy_key.cmp(&b.enemy_key))
}

/// Suggest up to `max_picks` counters for `enemies`.
///
/// With `roles`, only heroes mapped to one of the five canonical lanes are
/// considered and no two suggestions share a lane. Blank roster slots are
/// ignored; enemy identity is case-insensitive and the first spelling seen
/// is kept for display.
pub fn suggest<S: AsRef<str>>(
    dataset: &CounterDataset,
    enemies: &[S],
    max_picks: usize,
    roles: Option<&RoleMap>,
) -> Suggestion {
    let mut assignment: Vec<EnemyAssignment> = Vec::new();
    let mut slot_of: HashMap<String, usize> = HashMap::new();
    for enemy in enemies {
        let name = enemy.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let key = name.to_lowercase();
        if !slot_of.contains_key(&key) {
            slot_of.insert(key, assignment.len());
            assignment.push(EnemyAssignment {
                enemy: name.to_string(),
                counter: None,
            });
        }
    }
    let mut remaining: HashSet<String> = slot_of.keys().cloned().collect();

    let mut candidates: Vec<Candidate<'_>> = dataset
        .records()
        .iter()
        .filter_map(|r| {
            let enemy_key = r.enemy_hero.trim().to_lowercase();
            if !remaining.contains(&enemy_key) {
                return None;
            }
            let role = match roles {
                Some(map) => Some(map.role_of(&r.my_hero)?),
                None => None,
            };
            Some(Candidate {
                hero: r.my_hero.trim(),
                hero_key: r.my_hero.trim().to_lowercase(),
                enemy_key,
                score: r.score,
                role,
            })
        })
        .collect();
    candidates.sort_by(candidate_order);
    debug!(
        "{} counter candidates for {} enemies",
        candidates.len(),
        assignment.len()
    );

    let mut chosen: Vec<String> = Vec::new();
    let mut used_heroes: HashSet<String> = HashSet::new();
    let mut used_roles: HashSet<Role> = HashSet::new();
    let mut total = 0.0;

    while !remaining.is_empty() && chosen.len() < max_picks && !candidates.is_empty() {
        let c = candidates.remove(0);

        let role_free = c.role.map_or(true, |r| !used_roles.contains(&r));
        if remaining.contains(&c.enemy_key) && !used_heroes.contains(&c.hero_key) && role_free {
            remaining.remove(&c.enemy_key);
            used_heroes.insert(c.hero_key.clone());
            if let Some(role) = c.role {
                used_roles.insert(role);
            }
            chosen.push(c.hero.to_string());
            assignment[slot_of[&c.enemy_key]].counter = Some(CounterPick {
                hero: c.hero.to_string(),
                score: c.score,
                role: c.role,
            });
            total += c.score;
        }

        candidates.retain(|o| {
            o.hero_key != c.hero_key
                && o.enemy_key != c.enemy_key
                && (c.role.is_none() || o.role != c.role)
        });
    }

    Suggestion {
        chosen,
        assignment,
        total,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
