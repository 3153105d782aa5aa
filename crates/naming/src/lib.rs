#![allow(
    clippy::collapsible_if,
    clippy::manual_range_contains,
    clippy::collapsible_str_replace
)]
pub mod dates;
pub mod media;
pub mod parser;
pub mod quality;
pub mod rules;
pub mod scene;
pub mod walk;

pub use parser::{NameParser, ParseResult};
pub use quality::classify_quality;
pub use rules::RuleSet;
pub use scene::{full_sanitize_scene_name, sanitize_scene_name};
