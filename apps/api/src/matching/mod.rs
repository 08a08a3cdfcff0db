// Resume ↔ JD matching engine.
// Skill overlap and embedding similarity are computed independently, then
// fused under named weights. Embeddings come only through the injected provider.

pub mod engine;
pub mod error;
pub mod fusion;
pub mod handlers;
pub mod models;
pub mod similarity;
pub mod skills;

pub use engine::MatchEngine;
pub use error::MatchError;
pub use fusion::FusionWeights;
