//! Ordered record of lattice states produced by a driver.

use crate::lattice::resize;
use crate::render::Raster;
use rca_core::Lattice;
use serde::{Deserialize, Serialize};

/// Append-only list of states, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    states: Vec<Lattice>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: Lattice) {
        self.states.push(state);
    }

    pub fn last(&self) -> Option<&Lattice> {
        self.states.last()
    }

    pub fn get(&self, index: usize) -> Option<&Lattice> {
        self.states.get(index)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lattice> + '_ {
        self.states.iter()
    }

    /// Discard every recorded state
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Length of the longest recorded state
    pub fn max_width(&self) -> usize {
        self.states.iter().map(Lattice::len).max().unwrap_or(0)
    }

    /// Rectangular grid, shorter rows right-padded with zeros to the longest row
    pub fn raster(&self) -> Raster {
        self.raster_with_width(self.max_width())
    }

    /// Rectangular grid with every row cropped or padded to `width`
    pub fn raster_with_width(&self, width: usize) -> Raster {
        rasterize(&self.states, width)
    }

    /// Rows from index `start` on, padded to the widest of them
    pub fn raster_since(&self, start: usize) -> Raster {
        let rows = self.states.get(start..).unwrap_or_default();
        let width = rows.iter().map(Lattice::len).max().unwrap_or(0);
        rasterize(rows, width)
    }
}

fn rasterize(states: &[Lattice], width: usize) -> Raster {
    Raster::new(
        width,
        states
            .iter()
            .map(|state| resize(state.cells(), width).into_cells())
            .collect(),
    )
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Lattice;
    type IntoIter = std::slice::Iter<'a, Lattice>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(rows: &[&[u8]]) -> History {
        let mut history = History::new();
        for row in rows {
            history.push(Lattice::new(row.to_vec()));
        }
        history
    }

    #[test]
    fn test_push_and_clear() {
        let mut history = history_of(&[&[0, 1], &[1, 0]]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(Lattice::cells), Some(&[1u8, 0][..]));

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.max_width(), 0);
        assert!(history.raster().is_empty());
    }

    #[test]
    fn test_raster_pads_to_widest_row() {
        let history = history_of(&[&[1, 1, 1], &[1, 0, 1, 1, 1], &[1]]);
        let raster = history.raster();
        assert_eq!(raster.width(), 5);
        assert_eq!(raster.height(), 3);
        assert_eq!(raster.rows()[0], vec![1, 1, 1, 0, 0]);
        assert_eq!(raster.rows()[1], vec![1, 0, 1, 1, 1]);
        assert_eq!(raster.rows()[2], vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_raster_with_width_crops() {
        let history = history_of(&[&[1, 2, 3, 4], &[5, 6]]);
        let raster = history.raster_with_width(3);
        assert_eq!(raster.rows(), &[vec![1, 2, 3], vec![5, 6, 0]]);
    }

    #[test]
    fn test_raster_since_keeps_only_later_rows() {
        let history = history_of(&[&[1, 1, 1, 1], &[0, 1], &[1, 0, 1]]);
        let raster = history.raster_since(1);
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.rows(), &[vec![0, 1, 0], vec![1, 0, 1]]);

        assert_eq!(history.raster_since(0), history.raster());
        assert!(history.raster_since(3).is_empty());
        assert!(history.raster_since(10).is_empty());
    }

    #[test]
    fn test_serializes_as_list_of_states() {
        let history = history_of(&[&[0, 1], &[1, 1]]);
        assert_eq!(serde_json::to_string(&history).unwrap(), "[[0,1],[1,1]]");
    }
}
