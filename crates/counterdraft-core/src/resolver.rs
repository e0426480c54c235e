// Hero name resolution: snaps free-text input to the closest canonical hero
// name in the dataset vocabulary.
//
// Callers should only resolve at commit points (a slot losing focus, an
// explicit confirm), never per keystroke, so partially typed names are not
// rewritten under the user.

use std::collections::HashMap;

use tracing::debug;

use crate::dataset::CounterDataset;

/// Lower-case and keep only ASCII letters and digits.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Classic edit distance with unit insert, delete and substitute costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Single rolling row of the DP table.
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diag = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let next = (row[j] + 1).min(row[j - 1] + 1).min(diag + cost);
            diag = row[j];
            row[j] = next;
        }
    }
    row[b.len()]
}

/// Maximum edit distance accepted when snapping `input_len` characters to a
/// candidate of `candidate_len` characters (both normalized lengths).
pub fn acceptance_threshold(input_len: usize, candidate_len: usize) -> usize {
    let len = input_len.min(candidate_len).max(2);
    // ceil(0.4 * len) in integer arithmetic
    let scaled = (len * 2).div_ceil(5);
    scaled.max(2)
}

#[derive(Debug, Clone)]
struct VocabEntry {
    canonical: String,
    key: String,
}

/// Resolver over one dataset generation's hero vocabulary.
#[derive(Debug, Clone, Default)]
pub struct HeroResolver {
    entries: Vec<VocabEntry>,
    exact: HashMap<String, usize>,
}

impl HeroResolver {
    pub fn new(dataset: &CounterDataset) -> Self {
        Self::from_names(dataset.vocabulary())
    }

    /// Build from an explicit list of canonical names. For names that
    /// normalize identically, exact matches return the last spelling.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut exact = HashMap::new();
        for name in names {
            let canonical: String = name.into();
            let key = normalize(&canonical);
            if !key.is_empty() {
                exact.insert(key.clone(), entries.len());
            }
            entries.push(VocabEntry { canonical, key });
        }
        HeroResolver { entries, exact }
    }

    /// Canonical hero names in vocabulary order.
    pub fn heroes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.canonical.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `input` to a canonical hero name.
    ///
    /// Blank input resolves to an empty string. An input whose normalized
    /// form matches a vocabulary entry returns that entry. Otherwise the
    /// nearest entry by edit distance (earliest on ties) is returned when it
    /// is within the acceptance threshold, and `input` is returned unchanged
    /// when it is not.
    pub fn resolve(&self, input: &str) -> String {
        if input.trim().is_empty() {
            return String::new();
        }
        let key = normalize(input);
        if let Some(&i) = self.exact.get(&key) {
            return self.entries[i].canonical.clone();
        }

        let best = self
            .entries
            .iter()
            .map(|e| (e, levenshtein(&key, &e.key)))
            .fold(None::<(&VocabEntry, usize)>, |best, (e, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((e, d)),
            });

        match best {
            Some((entry, distance))
                if distance
                    <= acceptance_threshold(key.chars().count(), entry.key.chars().count()) =>
            {
                debug!(
                    "resolved '{}' to '{}' (distance {})",
                    input, entry.canonical, distance
                );
                entry.canonical.clone()
            }
            _ => input.to_string(),
        }
    }
}
