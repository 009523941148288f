pub mod matcher;
pub mod screening;
pub mod sources;
pub mod types;

pub use aml_core::{Error, Result};
pub use matcher::{combined_score, name_similarity, normalize_name};
pub use screening::Screener;
pub use sources::{CsvSource, ReferenceSource, StaticSource};
pub use types::{
    CandidateMatch, ListKind, ReferenceEntry, ScreeningConfig, ScreeningQuery, ScreeningResult,
    ScreeningStatus,
};
