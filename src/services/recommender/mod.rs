//! Collaborative filtering over retailer view history
//!
//! Three forward-only stages: view events are folded into a binary
//! [`InteractionMatrix`], rows are compared pairwise into a
//! [`SimilarityMatrix`], and [`SimilarityRecommender`] ranks neighbours of the
//! target retailer and unions the products they viewed.
//!
//! Everything here is pure and synchronous. Nothing is cached between calls.

pub mod matrix;
pub mod selector;
pub mod similarity;

pub use matrix::{InteractionMatrix, ViewEvent};
pub use selector::{rank_neighbors, RecommenderOptions, SelfExclusion, SimilarityRecommender};
pub use similarity::SimilarityMatrix;
