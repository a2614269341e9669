//! Static data sources: the tour document and per-stop transcripts.

pub mod fetch;
pub mod models;
pub mod tour;

pub use fetch::*;
pub use models::*;
pub use tour::*;
