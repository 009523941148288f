use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of watchlist an entry was published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Sanctions,
    Pep,
}

/// One entity on a reference list snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub id: String,
    pub kind: ListKind,
    pub name: String,
    pub aliases: Vec<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    /// Free-text citation of the listing (program, designation, authority)
    pub listing_info: String,
}

/// Identity attributes to screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningQuery {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub country: Option<String>,
}

impl ScreeningQuery {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// A reference entry that met the match threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub entry_id: String,
    pub entry_name: String,
    pub kind: ListKind,
    /// Combined similarity score in [0, 1]
    pub score: f64,
    /// Source the entry came from
    pub source: String,
    pub listing_info: String,
}

/// Screening outcome band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    /// No candidate met the match threshold
    Clear,
    /// At least one candidate matched but none reached the confirmed
    /// threshold; needs human review
    PotentialMatch,
    /// A candidate reached the confirmed threshold
    Match,
}

/// Immutable audit record of one screening call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub screening_id: Uuid,
    pub is_match: bool,
    /// Highest combined score observed across all candidates
    pub match_score: f64,
    pub status: ScreeningStatus,
    /// Candidates at or above the match threshold, best first
    pub matches: Vec<CandidateMatch>,
    /// Sources that contributed candidates
    pub sources: Vec<String>,
    /// Sources skipped because their snapshot was unavailable
    pub sources_unavailable: Vec<String>,
    pub screened_at: DateTime<Utc>,
}

/// Matching thresholds and bonus weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Combined score a candidate must reach to count as a match
    pub minimum_match_score: f64,
    /// Combined score above which a match is treated as near-certain
    pub confirmed_match_score: f64,
    /// Bonus for an exact date-of-birth agreement
    pub dob_exact_bonus: f64,
    /// Bonus when only the birth year agrees
    pub dob_year_bonus: f64,
    /// Bonus when the query country matches the entry nationality
    pub country_bonus: f64,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            minimum_match_score: 0.7,
            confirmed_match_score: 0.85,
            dob_exact_bonus: 0.08,
            dob_year_bonus: 0.03,
            country_bonus: 0.04,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_trims_parts() {
        let query = ScreeningQuery {
            first_name: " Jon ".to_string(),
            last_name: " Smith".to_string(),
            date_of_birth: None,
            country: None,
        };
        assert_eq!(query.full_name(), "Jon Smith");
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ScreeningStatus::PotentialMatch).unwrap();
        assert_eq!(json, "\"potential_match\"");
    }
}
