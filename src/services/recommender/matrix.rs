use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single recorded "view" of a product by a retailer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewEvent {
    pub retailer_id: i64,
    pub product_id: i64,
}

impl ViewEvent {
    pub fn new(retailer_id: i64, product_id: i64) -> Self {
        Self {
            retailer_id,
            product_id,
        }
    }
}

/// Binary retailer x product incidence matrix
///
/// Rows are the distinct retailer ids in ascending order, columns the distinct
/// product ids in ascending order. A cell is `1` when the retailer viewed the
/// product at least once.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    retailers: Vec<i64>,
    products: Vec<i64>,
    cells: Array2<u8>,
}

impl InteractionMatrix {
    /// Builds the matrix from scratch out of a sequence of view events
    ///
    /// Repeated views collapse into a single `1`. An empty input produces a
    /// 0x0 matrix.
    pub fn from_events(events: &[ViewEvent]) -> Self {
        let retailers: Vec<i64> = events
            .iter()
            .map(|e| e.retailer_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let products: Vec<i64> = events
            .iter()
            .map(|e| e.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = Array2::<u8>::zeros((retailers.len(), products.len()));
        for event in events {
            // Both id lists were collected from these same events
            if let (Ok(row), Ok(col)) = (
                retailers.binary_search(&event.retailer_id),
                products.binary_search(&event.product_id),
            ) {
                cells[[row, col]] = 1;
            }
        }

        Self {
            retailers,
            products,
            cells,
        }
    }

    pub fn num_retailers(&self) -> usize {
        self.retailers.len()
    }

    pub fn num_products(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retailers.is_empty()
    }

    /// Retailer ids in row order
    pub fn retailers(&self) -> &[i64] {
        &self.retailers
    }

    /// Product ids in column order
    pub fn products(&self) -> &[i64] {
        &self.products
    }

    /// Positional row of a retailer, `None` if it has no recorded views
    pub fn row_index(&self, retailer_id: i64) -> Option<usize> {
        self.retailers.binary_search(&retailer_id).ok()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, u8> {
        self.cells.row(index)
    }

    /// Cell value for a (retailer, product) pair; unknown ids read as `0`
    pub fn get(&self, retailer_id: i64, product_id: i64) -> u8 {
        match (
            self.row_index(retailer_id),
            self.products.binary_search(&product_id),
        ) {
            (Some(row), Ok(col)) => self.cells[[row, col]],
            _ => 0,
        }
    }

    pub(crate) fn cells(&self) -> &Array2<u8> {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(pairs: &[(i64, i64)]) -> Vec<ViewEvent> {
        pairs.iter().map(|&(r, p)| ViewEvent::new(r, p)).collect()
    }

    #[test]
    fn test_empty_events_build_empty_matrix() {
        let matrix = InteractionMatrix::from_events(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.num_retailers(), 0);
        assert_eq!(matrix.num_products(), 0);
        assert_eq!(matrix.cells().dim(), (0, 0));
    }

    #[test]
    fn test_rows_and_columns_sorted_ascending() {
        let matrix = InteractionMatrix::from_events(&events(&[(3, 103), (1, 102), (2, 101)]));
        assert_eq!(matrix.retailers(), &[1, 2, 3]);
        assert_eq!(matrix.products(), &[101, 102, 103]);
        assert_eq!(matrix.row_index(1), Some(0));
        assert_eq!(matrix.row_index(3), Some(2));
    }

    #[test]
    fn test_duplicate_views_collapse_to_one() {
        let matrix =
            InteractionMatrix::from_events(&events(&[(1, 101), (1, 101), (1, 101), (2, 102)]));
        assert_eq!(matrix.get(1, 101), 1);
        assert_eq!(matrix.row(0).sum(), 1);
    }

    #[test]
    fn test_reference_scenario_cells() {
        let matrix =
            InteractionMatrix::from_events(&events(&[(1, 101), (2, 101), (1, 102), (3, 103)]));
        assert_eq!(matrix.row(0).to_vec(), vec![1, 1, 0]);
        assert_eq!(matrix.row(1).to_vec(), vec![1, 0, 0]);
        assert_eq!(matrix.row(2).to_vec(), vec![0, 0, 1]);
    }

    #[test]
    fn test_every_row_has_a_view() {
        let matrix = InteractionMatrix::from_events(&events(&[
            (10, 1),
            (20, 2),
            (30, 3),
            (10, 3),
        ]));
        for row in 0..matrix.num_retailers() {
            assert!(matrix.row(row).sum() >= 1);
        }
    }

    #[test]
    fn test_unknown_ids() {
        let matrix = InteractionMatrix::from_events(&events(&[(1, 101)]));
        assert_eq!(matrix.row_index(99), None);
        assert_eq!(matrix.get(99, 101), 0);
        assert_eq!(matrix.get(1, 999), 0);
    }
}
