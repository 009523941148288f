//! Name normalization and similarity scoring
//!
//! Names are normalized (lowercased, diacritics folded, punctuation
//! stripped, whitespace collapsed) before comparison. Similarity is the
//! better of a direct Jaro-Winkler comparison and a token-sorted one, so
//! "Smith, John" and "John Smith" score as the same name.

use crate::types::{ReferenceEntry, ScreeningConfig, ScreeningQuery};
use chrono::Datelike;
use regex::Regex;
use std::sync::OnceLock;
use strsim::jaro_winkler;

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").unwrap())
}

/// Lowercase, fold diacritics, strip punctuation, collapse whitespace
pub fn normalize_name(name: &str) -> String {
    let folded: String = name.chars().map(fold_diacritic).collect();
    let cleaned = punctuation_re().replace_all(&folded, "");
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Similarity of two names in [0, 1], insensitive to case, diacritics,
/// punctuation and token order
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    let direct = jaro_winkler(&na, &nb);
    let sorted = jaro_winkler(&sorted_tokens(&na), &sorted_tokens(&nb));
    direct.max(sorted)
}

fn sorted_tokens(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split(' ').collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Combined score of a query against one reference entry
///
/// The name component is alias-aware: the entry's primary name or any
/// alias may carry the match. Date-of-birth and nationality agreement add
/// fixed bonuses; the result is clamped to 1.0.
pub fn combined_score(
    query: &ScreeningQuery,
    entry: &ReferenceEntry,
    config: &ScreeningConfig,
) -> f64 {
    let query_name = query.full_name();
    let mut best = name_similarity(&query_name, &entry.name);
    for alias in &entry.aliases {
        best = best.max(name_similarity(&query_name, alias));
    }

    let mut score = best;
    if let (Some(query_dob), Some(entry_dob)) = (query.date_of_birth, entry.date_of_birth) {
        if query_dob == entry_dob {
            score += config.dob_exact_bonus;
        } else if query_dob.year() == entry_dob.year() {
            score += config.dob_year_bonus;
        }
    }
    if let (Some(country), Some(nationality)) = (&query.country, &entry.nationality) {
        if country.eq_ignore_ascii_case(nationality) {
            score += config.country_bonus;
        }
    }

    score.min(1.0)
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        'ß' => 's',
        other => other,
    }
}
