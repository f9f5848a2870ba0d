//! The evolution engine: pure functions over lattice states.

use rca_core::{Cell, Lattice, Result};
use rca_rules::RuleTable;

/// Crop to the first `target_size` cells, or pad on the right with zeros.
pub fn resize(state: &[Cell], target_size: usize) -> Lattice {
    let mut cells = Vec::with_capacity(target_size);
    cells.extend(state.iter().take(target_size).copied());
    cells.resize(target_size, 0);
    Lattice::new(cells)
}

/// Fill `out` with the `2 * radius + 1` cells centered on `index`.
///
/// Offset `j` in `[-radius, radius]` reads `state[(index + j) mod size]`.
/// Cells past the end of `state` read as 0, matching [`resize`].
fn fill_neighborhood(
    state: &[Cell],
    index: usize,
    radius: usize,
    size: usize,
    out: &mut Vec<Cell>,
) {
    out.clear();
    if size == 0 {
        return;
    }
    let start = index % size + size - radius % size;
    out.extend((0..2 * radius + 1).map(|j| state.get((start + j) % size).copied().unwrap_or(0)));
}

/// The window of `2 * radius + 1` cells centered on `index`, wrapping around a
/// lattice of `size` cells.
pub fn neighborhood(state: &[Cell], index: usize, radius: usize, size: usize) -> Vec<Cell> {
    let mut out = Vec::with_capacity(2 * radius + 1);
    fill_neighborhood(state, index, radius, size, &mut out);
    out
}

/// Compute the next lattice state.
///
/// `state` is first resized to `size`; each cell's next value is the rule's
/// output for its neighborhood. The input is never modified. A neighborhood
/// missing from `rule` aborts the whole call with `RuleIncomplete`.
pub fn evolve(state: &[Cell], rule: &RuleTable, radius: usize, size: usize) -> Result<Lattice> {
    let current = resize(state, size);
    let mut window = Vec::with_capacity(2 * radius + 1);
    let mut next = Vec::with_capacity(size);

    for index in 0..size {
        fill_neighborhood(current.cells(), index, radius, size, &mut window);
        next.push(rule.lookup(&window)?);
    }

    Ok(Lattice::new(next))
}
