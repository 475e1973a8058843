//! Gridlife runs Game-of-Life style cellular automata on 2-D and 3-D grids.
//!
//! A [`Grid`] is a dense array of [`Cell`]s. A [`Rule`] looks at a window
//! around every cell and reports which cells change; a [`Simulation`] applies
//! those changes generation after generation and keeps a snapshot of each one.
//!
//! ```
//! use gridlife::{Grid, GridParams, Rule, Simulation};
//!
//! let block = vec![(0, 0), (0, 1), (1, 0), (1, 1)];
//! let grid = Grid::with_live_cells(&[10, 10], GridParams::<f64>::default(), block).unwrap();
//! let mut sim = Simulation::new(grid, Rule::life(2).unwrap()).unwrap();
//! sim.run(3).unwrap();
//! assert_eq!(sim.history().len(), 4);
//! assert_eq!(sim.grid().population(), 4);
//! ```

mod cell;
mod error;
mod grid;
mod position;
mod rule;
mod simulation;
mod state;
mod window;

pub use cell::*;
pub use error::*;
pub use grid::*;
pub use position::*;
pub use rule::*;
pub use simulation::*;
pub use state::*;
pub use window::*;
