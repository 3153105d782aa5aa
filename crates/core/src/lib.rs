pub mod error;
pub mod quality;
pub mod types;

pub use error::ValidationError;
pub use quality::{Quality, QualityGroup};
pub use types::{
    Episode, EpisodeStatus, NameException, ProviderKind, ProviderResult, SeasonException, Show,
};
