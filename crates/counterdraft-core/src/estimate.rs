// Win estimation for two drafted rosters.
//
// The estimator searches every one-to-one pairing of the two rosters (at
// most 5! = 120 of them), keeps the pairing with the highest total counter
// score for team A, and maps that total through a logistic curve.

use serde::{Deserialize, Serialize};

use crate::dataset::{CounterDataset, ScoreTable};

/// Largest roster the exhaustive pairing search will consider.
pub const MAX_PAIRING_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// Probability model
// ---------------------------------------------------------------------------

/// Logistic mapping from an aggregate score to a win probability.
///
/// `probability(x) = 1 / (1 + e^(-slope * (x - midpoint)))`, clamped to
/// `[floor, ceiling]`. Setting `floor = 0` and `ceiling = 1` disables the
/// clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinModel {
    pub slope: f64,
    pub midpoint: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for WinModel {
    fn default() -> Self {
        WinModel {
            slope: 0.35,
            midpoint: 6.0,
            floor: 0.05,
            ceiling: 0.95,
        }
    }
}

impl WinModel {
    /// Unclamped logistic value.
    pub fn logistic(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-self.slope * (x - self.midpoint)).exp())
    }

    /// Logistic value clamped to `[floor, ceiling]`.
    pub fn probability(&self, x: f64) -> f64 {
        self.logistic(x).max(self.floor).min(self.ceiling)
    }

    /// Probability as a whole percentage.
    pub fn percent(&self, x: f64) -> u8 {
        (self.probability(x) * 100.0).round() as u8
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One matchup in the chosen pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub own: String,
    pub opposing: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinEstimate {
    pub pairs: Vec<Pairing>,
    /// Sum of the pair scores; the input to the probability model.
    pub total: f64,
    pub win_probability: f64,
}

/// Every-hero-against-every-hero advantage sums, for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossAdvantage {
    pub a_over_b: f64,
    pub b_over_a: f64,
    pub net: f64,
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

fn trimmed<S: AsRef<str>>(team: &[S]) -> Vec<&str> {
    team.iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Estimate team A's chance of beating team B.
///
/// Returns `None` when either roster has no non-blank entries. Only the
/// first `min(|A|, |B|, 5)` entries of each roster take part in the pairing.
pub fn estimate_win<S: AsRef<str>>(
    dataset: &CounterDataset,
    team_a: &[S],
    team_b: &[S],
    model: &WinModel,
) -> Option<WinEstimate> {
    let own = trimmed(team_a);
    let opposing = trimmed(team_b);
    if own.is_empty() || opposing.is_empty() {
        return None;
    }
    let n = own.len().min(opposing.len()).min(MAX_PAIRING_SIZE);
    let table = dataset.score_table();

    let (perm, total) = best_pairing(&table, &own[..n], &opposing[..n]);
    let pairs = perm
        .iter()
        .enumerate()
        .map(|(i, &j)| Pairing {
            own: own[i].to_string(),
            opposing: opposing[j].to_string(),
            score: table.score(own[i], opposing[j]),
        })
        .collect();

    Some(WinEstimate {
        pairs,
        total,
        win_probability: model.probability(total),
    })
}

/// Exhaustive search over permutations of `opposing`, in lexicographic order
/// of index sequences. Only a strictly better total replaces the incumbent.
fn best_pairing(table: &ScoreTable, own: &[&str], opposing: &[&str]) -> (Vec<usize>, f64) {
    let n = own.len();
    let mut best: Option<(Vec<usize>, f64)> = None;
    let mut perm = Vec::with_capacity(n);
    let mut used = vec![false; n];
    search(table, own, opposing, &mut perm, &mut used, &mut best);
    best.unwrap_or_default()
}

fn search(
    table: &ScoreTable,
    own: &[&str],
    opposing: &[&str],
    perm: &mut Vec<usize>,
    used: &mut [bool],
    best: &mut Option<(Vec<usize>, f64)>,
) {
    if perm.len() == own.len() {
        let total: f64 = perm
            .iter()
            .enumerate()
            .map(|(i, &j)| table.score(own[i], opposing[j]))
            .sum();
        if best.as_ref().map_or(true, |(_, b)| total > *b) {
            *best = Some((perm.clone(), total));
        }
        return;
    }
    for j in 0..opposing.len() {
        if used[j] {
            continue;
        }
        used[j] = true;
        perm.push(j);
        search(table, own, opposing, perm, used, best);
        perm.pop();
        used[j] = false;
    }
}

/// Sum of A-over-B scores for every pair of heroes, and the reverse.
pub fn cross_advantage<S: AsRef<str>>(
    dataset: &CounterDataset,
    team_a: &[S],
    team_b: &[S],
) -> CrossAdvantage {
    let a = trimmed(team_a);
    let b = trimmed(team_b);
    let table = dataset.score_table();

    let sum = |from: &[&str], to: &[&str]| -> f64 {
        let mut total = 0.0;
        for x in from {
            for y in to {
                total += table.score(x, y);
            }
        }
        total
    };
    let a_over_b = sum(&a, &b);
    let b_over_a = sum(&b, &a);
    CrossAdvantage {
        a_over_b,
        b_over_a,
        net: a_over_b - b_over_a,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
