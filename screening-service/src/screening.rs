//! Watchlist screening over the configured reference sources

use crate::matcher::combined_score;
use crate::sources::ReferenceSource;
use crate::types::{
    CandidateMatch, ScreeningConfig, ScreeningQuery, ScreeningResult, ScreeningStatus,
};
use aml_core::{Clock, Error, Result};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Screens identity queries against sanctions and PEP reference lists
pub struct Screener {
    config: ScreeningConfig,
    sources: Vec<Arc<dyn ReferenceSource>>,
    clock: Arc<dyn Clock>,
}

impl Screener {
    pub fn new(config: ScreeningConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            sources: Vec::new(),
            clock,
        }
    }

    pub fn with_sources(
        config: ScreeningConfig,
        sources: Vec<Arc<dyn ReferenceSource>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            sources,
            clock,
        }
    }

    pub fn add_source(&mut self, source: Arc<dyn ReferenceSource>) {
        self.sources.push(source);
    }

    /// Screen a query against every configured source
    ///
    /// Sources that cannot produce a snapshot are excluded and listed on
    /// the result; the reference lists are never mutated. Missing name
    /// parts are a validation error, not a clear result.
    pub fn screen(&self, query: &ScreeningQuery) -> Result<ScreeningResult> {
        if query.first_name.trim().is_empty() {
            return Err(Error::validation("first_name", "required for screening"));
        }
        if query.last_name.trim().is_empty() {
            return Err(Error::validation("last_name", "required for screening"));
        }

        let mut matches: Vec<CandidateMatch> = Vec::new();
        let mut sources_used = Vec::new();
        let mut sources_unavailable = Vec::new();
        let mut best_observed: f64 = 0.0;

        for source in &self.sources {
            let entries = match source.snapshot() {
                Ok(entries) => entries,
                Err(Error::SourceUnavailable { source_name }) => {
                    warn!(source = %source_name, "screening proceeding without source");
                    sources_unavailable.push(source_name);
                    continue;
                }
                Err(e) => return Err(e),
            };

            sources_used.push(source.name().to_string());
            for entry in &entries {
                let score = combined_score(query, entry, &self.config);
                best_observed = best_observed.max(score);
                if score >= self.config.minimum_match_score {
                    matches.push(CandidateMatch {
                        entry_id: entry.id.clone(),
                        entry_name: entry.name.clone(),
                        kind: entry.kind,
                        score,
                        source: source.name().to_string(),
                        listing_info: entry.listing_info.clone(),
                    });
                }
            }
        }

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.entry_id.cmp(&b.entry_id))
        });

        let status = match matches.first() {
            None => ScreeningStatus::Clear,
            Some(best) if best.score >= self.config.confirmed_match_score => {
                ScreeningStatus::Match
            }
            Some(_) => ScreeningStatus::PotentialMatch,
        };

        let result = ScreeningResult {
            screening_id: Uuid::new_v4(),
            is_match: !matches.is_empty(),
            match_score: best_observed,
            status,
            matches,
            sources: sources_used,
            sources_unavailable,
            screened_at: self.clock.now(),
        };

        match result.status {
            ScreeningStatus::Match => warn!(
                screening_id = %result.screening_id,
                score = result.match_score,
                "confirmed watchlist match"
            ),
            ScreeningStatus::PotentialMatch => info!(
                screening_id = %result.screening_id,
                score = result.match_score,
                "potential watchlist match, review required"
            ),
            ScreeningStatus::Clear => {}
        }

        Ok(result)
    }
}
