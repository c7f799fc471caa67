//! The three resolution tiers

pub mod exact;
pub mod lexical;
pub mod semantic;

pub use exact::ExactMatcher;
pub use lexical::{LexicalIndex, LexicalMatcher};
pub use semantic::SemanticMatcher;
