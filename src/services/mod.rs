pub mod recommendations;
pub mod recommender;

pub use recommender::{RecommenderOptions, SelfExclusion, SimilarityRecommender};
