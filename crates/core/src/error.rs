use thiserror::Error;

/// Violations of catalog invariants, raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("indexer id must not be zero")]
    ZeroIndexerId,

    #[error("episode number zero is invalid")]
    ZeroEpisodeNumber,

    #[error("show id must be set before saving episodes")]
    MissingShowId,

    #[error("exception for indexer {found} cannot replace the {expected} list")]
    IndexerMismatch { expected: String, found: String },

    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },
}
