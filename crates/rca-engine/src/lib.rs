//! Evolution engine, driver and renderer for one-dimensional k-state automata.
//!
//! The engine (`lattice`) is a set of pure functions. The driver
//! (`simulation`) threads each output back in as the next input and appends
//! it to a caller-owned `History`, which `render` turns into images.

pub mod lattice;
pub mod history;
pub mod simulation;
pub mod render;

pub use lattice::{evolve, neighborhood, resize};
pub use history::History;
pub use simulation::{RunSummary, Simulation};
pub use render::{render_ascii, render_png, Raster};
