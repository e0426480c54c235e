// Counter dataset: the immutable table of `(hero, enemy hero, score)` triples
// and its ingestion from delimited text.
//
// Ingestion never fails. Anything that cannot be understood (missing columns,
// short rows, unparseable scores) is dropped with a log line so the engine
// always receives a valid, possibly empty, dataset.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::table::{read_table, strip_quotes};

// ---------------------------------------------------------------------------
// Column synonyms
// ---------------------------------------------------------------------------

const HERO_COLUMNS: &[&str] = &["my_hero", "my hero", "myhero", "hero"];
const ENEMY_COLUMNS: &[&str] = &["enemy_hero", "enemy hero", "enemyhero", "enemy"];
const SCORE_COLUMNS: &[&str] = &["score", "adv", "advantage"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One matchup: how strongly `my_hero` counters `enemy_hero`.
///
/// The sign and scale of `score` come from the data source; the engine only
/// relies on "larger is better for `my_hero`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub my_hero: String,
    pub enemy_hero: String,
    pub score: f64,
}

impl MatchupRecord {
    pub fn new(my_hero: impl Into<String>, enemy_hero: impl Into<String>, score: f64) -> Self {
        MatchupRecord {
            my_hero: my_hero.into(),
            enemy_hero: enemy_hero.into(),
            score,
        }
    }
}

/// Flat, immutable list of matchup records for one data generation.
#[derive(Debug, Clone, Default)]
pub struct CounterDataset {
    records: Vec<MatchupRecord>,
}

impl CounterDataset {
    /// Build a dataset from records that are already known to be valid.
    /// Records with empty names or non-finite scores are discarded.
    pub fn from_records(records: Vec<MatchupRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(|r| {
                !r.my_hero.trim().is_empty()
                    && !r.enemy_hero.trim().is_empty()
                    && r.score.is_finite()
            })
            .collect();
        CounterDataset { records }
    }

    pub fn records(&self) -> &[MatchupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonical hero names: the union of both name columns in first-seen
    /// order, exact duplicates removed.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut heroes = Vec::new();
        for r in &self.records {
            for name in [&r.my_hero, &r.enemy_hero] {
                if seen.insert(name.as_str()) {
                    heroes.push(name.clone());
                }
            }
        }
        heroes
    }

    /// Direct-lookup table keyed by the lower-cased pair.
    ///
    /// When a pair appears more than once the maximum score is kept.
    pub fn score_table(&self) -> ScoreTable {
        let mut scores: HashMap<(String, String), f64> = HashMap::new();
        for r in &self.records {
            scores
                .entry(pair_key(&r.my_hero, &r.enemy_hero))
                .and_modify(|s| *s = s.max(r.score))
                .or_insert(r.score);
        }
        ScoreTable { scores }
    }
}

/// Case-insensitive `(my_hero, enemy_hero) -> score` lookup.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    scores: HashMap<(String, String), f64>,
}

impl ScoreTable {
    /// Recorded score for the pair, if any.
    pub fn lookup(&self, my_hero: &str, enemy_hero: &str) -> Option<f64> {
        self.scores.get(&pair_key(my_hero, enemy_hero)).copied()
    }

    /// Recorded score for the pair; an unrecorded matchup counts as neutral.
    pub fn score(&self, my_hero: &str, enemy_hero: &str) -> f64 {
        self.lookup(my_hero, enemy_hero).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

fn pair_key(my_hero: &str, enemy_hero: &str) -> (String, String) {
    (
        my_hero.trim().to_lowercase(),
        enemy_hero.trim().to_lowercase(),
    )
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Collapse records sharing the exact same `(my_hero, enemy_hero)` pair,
/// keeping the maximum score. Output follows first-seen order.
///
/// Used for harvested feeds that emit the same pair repeatedly.
pub fn dedup_max(records: &[MatchupRecord]) -> Vec<MatchupRecord> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut out: Vec<MatchupRecord> = Vec::new();
    for r in records {
        match index.get(&(r.my_hero.as_str(), r.enemy_hero.as_str())) {
            Some(&i) => {
                if r.score > out[i].score {
                    out[i].score = r.score;
                }
            }
            None => {
                index.insert((r.my_hero.as_str(), r.enemy_hero.as_str()), out.len());
                out.push(r.clone());
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a score cell, accepting a decimal comma. Non-finite values are
/// rejected.
pub fn parse_score(cell: &str) -> Option<f64> {
    let cleaned = strip_quotes(cell).replacen(',', ".", 1);
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a counter table.
///
/// The header must name a hero column, an enemy column and a score column
/// (matched case-insensitively against the usual synonyms). A table without
/// all three yields an empty dataset.
pub fn parse_counter_table<R: Read>(rdr: R) -> CounterDataset {
    let Some(table) = read_table(rdr, "counter") else {
        return CounterDataset::default();
    };

    let (Some(idx_my), Some(idx_en), Some(idx_sc)) = (
        table.column(HERO_COLUMNS),
        table.column(ENEMY_COLUMNS),
        table.column(SCORE_COLUMNS),
    ) else {
        warn!(
            "counter table header {:?} lacks a hero, enemy or score column",
            table.headers
        );
        return CounterDataset::default();
    };
    let needed = idx_my.max(idx_en).max(idx_sc);

    let mut records = Vec::new();
    for (line, row) in table.records.iter().enumerate() {
        if row.len() <= needed {
            debug!("skipping short counter row {}", line + 2);
            continue;
        }
        let my_hero = strip_quotes(row.get(idx_my).unwrap_or_default());
        let enemy_hero = strip_quotes(row.get(idx_en).unwrap_or_default());
        if my_hero.is_empty() || enemy_hero.is_empty() {
            debug!("skipping counter row {} with an empty hero name", line + 2);
            continue;
        }
        let Some(score) = parse_score(row.get(idx_sc).unwrap_or_default()) else {
            warn!(
                "skipping counter row {} ({} vs {}): unparseable score",
                line + 2,
                my_hero,
                enemy_hero
            );
            continue;
        };
        records.push(MatchupRecord::new(my_hero, enemy_hero, score));
    }

    debug!("parsed {} counter records", records.len());
    CounterDataset { records }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
