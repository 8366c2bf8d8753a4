use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::matrix::{InteractionMatrix, ViewEvent};
use super::similarity::SimilarityMatrix;

/// How the target retailer is removed from its own neighbour ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfExclusion {
    /// Drop the single highest-ranked row, assumed to be the target itself.
    /// With a 1.0 tie against an identical retailer the wrong row may go.
    #[default]
    #[serde(rename = "rank")]
    TopRank,
    /// Drop the row whose retailer id is the target's
    Identity,
}

/// Policy knobs for [`SimilarityRecommender`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommenderOptions {
    pub self_exclusion: SelfExclusion,
    /// Filter out products the target retailer has already viewed
    pub exclude_viewed: bool,
}

/// Collaborative-filtering recommender over retailer view history
///
/// Stateless: every call rebuilds the interaction and similarity matrices from
/// the events it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRecommender {
    options: RecommenderOptions,
}

impl SimilarityRecommender {
    pub fn new(options: RecommenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> RecommenderOptions {
        self.options
    }

    /// Recommends products for `target` from the view events of similar retailers
    ///
    /// Returns distinct product ids in order of first appearance in `events`.
    /// An empty list means there is nothing to recommend: fewer than two
    /// retailers have views, or the target has none.
    pub fn recommend(&self, target: i64, events: &[ViewEvent]) -> Vec<i64> {
        let matrix = InteractionMatrix::from_events(events);

        if matrix.num_retailers() < 2 {
            tracing::debug!(
                retailer_id = target,
                retailers = matrix.num_retailers(),
                "Not enough retailers for similarity ranking"
            );
            return Vec::new();
        }

        let Some(target_row) = matrix.row_index(target) else {
            tracing::debug!(retailer_id = target, "Retailer has no recorded views");
            return Vec::new();
        };

        let similarity = SimilarityMatrix::cosine(&matrix);
        let neighbors: HashSet<i64> = self
            .select_neighbors(&matrix, &similarity, target_row)
            .into_iter()
            .map(|row| matrix.retailers()[row])
            .collect();

        let viewed: HashSet<i64> = if self.options.exclude_viewed {
            events
                .iter()
                .filter(|e| e.retailer_id == target)
                .map(|e| e.product_id)
                .collect()
        } else {
            HashSet::new()
        };

        let products = collect_products(events, &neighbors, &viewed);

        tracing::debug!(
            retailer_id = target,
            retailers = matrix.num_retailers(),
            products = matrix.num_products(),
            neighbors = neighbors.len(),
            recommended = products.len(),
            "Computed similarity recommendations"
        );

        products
    }

    /// Ranked rows of the retailers considered similar to `target_row`
    pub fn select_neighbors(
        &self,
        matrix: &InteractionMatrix,
        similarity: &SimilarityMatrix,
        target_row: usize,
    ) -> Vec<usize> {
        let ranked = rank_neighbors(similarity.row(target_row));

        match self.options.self_exclusion {
            SelfExclusion::TopRank => ranked.into_iter().skip(1).collect(),
            SelfExclusion::Identity => {
                let target = matrix.retailers()[target_row];
                ranked
                    .into_iter()
                    .filter(|&row| matrix.retailers()[row] != target)
                    .collect()
            }
        }
    }
}

/// Row positions sorted by descending score; equal scores keep ascending position
pub fn rank_neighbors(scores: ArrayView1<'_, f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Distinct products viewed by `retailers`, in first-seen order
fn collect_products(
    events: &[ViewEvent],
    retailers: &HashSet<i64>,
    excluded: &HashSet<i64>,
) -> Vec<i64> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| retailers.contains(&e.retailer_id))
        .map(|e| e.product_id)
        .filter(|product| !excluded.contains(product))
        .filter(|product| seen.insert(*product))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn events(pairs: &[(i64, i64)]) -> Vec<ViewEvent> {
        pairs.iter().map(|&(r, p)| ViewEvent::new(r, p)).collect()
    }

    fn reference_events() -> Vec<ViewEvent> {
        events(&[(1, 101), (2, 101), (1, 102), (3, 103)])
    }

    fn identity() -> SimilarityRecommender {
        SimilarityRecommender::new(RecommenderOptions {
            self_exclusion: SelfExclusion::Identity,
            exclude_viewed: false,
        })
    }

    #[test]
    fn test_reference_scenario() {
        let recommender = SimilarityRecommender::default();
        assert_eq!(recommender.recommend(1, &reference_events()), vec![101, 103]);
    }

    #[test]
    fn test_reference_scenario_neighbor_order() {
        let matrix = InteractionMatrix::from_events(&reference_events());
        let similarity = SimilarityMatrix::cosine(&matrix);

        let ranked = rank_neighbors(similarity.row(0));
        assert_eq!(ranked, vec![0, 1, 2]);

        let neighbors = SimilarityRecommender::default().select_neighbors(&matrix, &similarity, 0);
        assert_eq!(neighbors, vec![1, 2]);
    }

    #[test]
    fn test_absent_target_gets_nothing() {
        let recommender = SimilarityRecommender::default();
        assert!(recommender.recommend(99, &reference_events()).is_empty());
    }

    #[test]
    fn test_fewer_than_two_retailers_gets_nothing() {
        let recommender = SimilarityRecommender::default();
        assert!(recommender.recommend(1, &[]).is_empty());

        let single = events(&[(1, 101), (1, 102), (1, 101)]);
        assert!(recommender.recommend(1, &single).is_empty());
        assert!(recommender.recommend(2, &single).is_empty());
    }

    #[test]
    fn test_identical_pair_keeps_own_products() {
        let recommender = SimilarityRecommender::default();
        let pair = events(&[(1, 101), (1, 102), (2, 101), (2, 102)]);
        assert_eq!(recommender.recommend(1, &pair), vec![101, 102]);
        assert_eq!(recommender.recommend(2, &pair), vec![101, 102]);
    }

    #[test]
    fn test_top_rank_drops_first_retailer_on_tie() {
        // Retailers 1 and 2 are identical, so for target 2 the tie at 1.0
        // ranks retailer 1 first and that row is the one dropped.
        let data = events(&[(1, 101), (2, 101), (3, 103), (1, 104), (2, 104)]);

        let by_rank = SimilarityRecommender::default().recommend(2, &data);
        assert_eq!(by_rank, vec![101, 103, 104]);

        let matrix = InteractionMatrix::from_events(&data);
        let similarity = SimilarityMatrix::cosine(&matrix);
        let neighbors = SimilarityRecommender::default().select_neighbors(&matrix, &similarity, 1);
        assert_eq!(neighbors, vec![1, 2]);
    }

    #[test]
    fn test_identity_exclusion_drops_target_row() {
        let data = events(&[(1, 101), (2, 101), (3, 103), (1, 104), (2, 104)]);

        let matrix = InteractionMatrix::from_events(&data);
        let similarity = SimilarityMatrix::cosine(&matrix);
        let neighbors = identity().select_neighbors(&matrix, &similarity, 1);
        assert_eq!(neighbors, vec![0, 2]);

        assert_eq!(identity().recommend(2, &data), vec![101, 103, 104]);
        assert_eq!(identity().recommend(3, &data), vec![101, 104]);
    }

    #[test]
    fn test_exclude_viewed_filters_target_products() {
        let recommender = SimilarityRecommender::new(RecommenderOptions {
            self_exclusion: SelfExclusion::TopRank,
            exclude_viewed: true,
        });
        let data = events(&[(1, 101), (2, 101), (2, 105), (1, 102), (3, 103)]);

        assert_eq!(recommender.recommend(1, &data), vec![105, 103]);
        assert_eq!(
            SimilarityRecommender::default().recommend(1, &data),
            vec![101, 105, 103]
        );
    }

    #[test]
    fn test_output_has_no_duplicates() {
        let data = events(&[
            (1, 1),
            (2, 1),
            (2, 1),
            (3, 1),
            (2, 2),
            (3, 2),
            (4, 3),
            (4, 1),
        ]);
        let products = SimilarityRecommender::default().recommend(1, &data);
        let distinct: HashSet<i64> = products.iter().copied().collect();
        assert_eq!(distinct.len(), products.len());
        assert_eq!(products, vec![1, 2, 3]);
    }

    #[test]
    fn test_deterministic() {
        let data = events(&[(5, 1), (4, 2), (3, 1), (5, 3), (4, 1), (2, 9), (3, 3)]);
        let recommender = SimilarityRecommender::default();
        let first = recommender.recommend(3, &data);
        for _ in 0..10 {
            assert_eq!(recommender.recommend(3, &data), first);
        }
    }

    #[test]
    fn test_new_retailers_and_products_never_fail() {
        let mut data = reference_events();
        data.push(ViewEvent::new(42, 9000));
        data.push(ViewEvent::new(1, 9001));

        let recommender = SimilarityRecommender::default();
        assert_eq!(recommender.recommend(1, &data), vec![101, 103, 9000]);
        assert_eq!(recommender.recommend(42, &data).len(), 4);
    }

    #[test]
    fn test_rank_neighbors_stable_on_ties() {
        let scores = arr1(&[0.5, 1.0, 0.5, 1.0, 0.0]);
        assert_eq!(rank_neighbors(scores.view()), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_self_exclusion_serde() {
        assert_eq!(serde_json::to_string(&SelfExclusion::TopRank).unwrap(), "\"rank\"");
        let parsed: SelfExclusion = serde_json::from_str("\"identity\"").unwrap();
        assert_eq!(parsed, SelfExclusion::Identity);
    }
}
