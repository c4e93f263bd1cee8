//! Window title matching policies.

use serde::{Deserialize, Serialize};

/// Default similarity threshold for [`TitleMatch::Fuzzy`].
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.9;

/// How a query string is compared against window titles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TitleMatch {
    /// Byte-for-byte equality.
    Exact,
    /// Case-insensitive containment of the query in the title.
    Substring,
    /// Best-aligned edit-distance similarity at or above `threshold`.
    Fuzzy { threshold: f64 },
}

impl TitleMatch {
    pub fn fuzzy() -> Self {
        TitleMatch::Fuzzy {
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    /// Parse a config name. `threshold` applies to the fuzzy mode only.
    pub fn from_name(name: &str, threshold: f64) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "exact" => Some(TitleMatch::Exact),
            "substring" => Some(TitleMatch::Substring),
            "fuzzy" => Some(TitleMatch::Fuzzy { threshold }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TitleMatch::Exact => "exact",
            TitleMatch::Substring => "substring",
            TitleMatch::Fuzzy { .. } => "fuzzy",
        }
    }

    pub fn matches(&self, query: &str, title: &str) -> bool {
        match self {
            TitleMatch::Exact => query == title,
            TitleMatch::Substring => title.to_lowercase().contains(&query.to_lowercase()),
            TitleMatch::Fuzzy { threshold } => partial_similarity(query, title) >= *threshold,
        }
    }
}

impl std::fmt::Display for TitleMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TitleMatch::Fuzzy { threshold } => write!(f, "fuzzy(>={threshold})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Edit distance over Unicode scalar values, every edit weighted 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio(&a, &b)
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_chars(a, b) as f64 / longest as f64
}

/// Best [`similarity`] between the shorter string and any equally long window
/// of the longer one.
///
/// Equal-length inputs reduce to plain [`similarity`]. An empty string only
/// scores 1.0 against another empty string.
pub fn partial_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return if long.is_empty() { 1.0 } else { 0.0 };
    }

    long.windows(short.len())
        .map(|window| ratio(short, window))
        .fold(0.0, f64::max)
}
