//! Neighbor-window rules.
//!
//! A rule looks at every cell of a grid, counts the live cells in the window
//! around it and decides whether it lives in the next generation. Neighbors
//! that fall outside the grid are skipped (there is no wraparound), but the
//! neighbor count is always compared against the full window's
//! [`Window::max_neighbors`], so cells near an edge need proportionally more
//! of their in-bounds neighbors alive.

use crate::{Cell, Grid, GridParams, Result, RuleConfigError, State, Window};
use boolinator::Boolinator;
use enum_iterator::IntoEnumIterator;
use ndarray::{ArrayD, ArrayViewD, Zip};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Decides which states count as live.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Liveness {
    /// Live when the state's intensity is strictly above the threshold. A NaN
    /// intensity is never live.
    Threshold(f64),
    /// Compare against the grid's live and dead values. A neighbor is live
    /// when it is not the dead value; a cell is live when it is the live
    /// value. A cell holding neither settles to the dead value.
    Sentinel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Class {
    Live,
    Dead,
    Other,
}

impl Liveness {
    #[inline]
    fn neighbor_is_live<V: State>(&self, state: &V, params: &GridParams<V>) -> bool {
        match *self {
            Liveness::Threshold(threshold) => state.intensity() > threshold,
            Liveness::Sentinel => !params.is_dead_value(state),
        }
    }

    #[inline]
    fn classify<V: State>(&self, state: &V, params: &GridParams<V>) -> Class {
        match *self {
            Liveness::Threshold(threshold) => {
                if state.intensity() > threshold {
                    Class::Live
                } else {
                    Class::Dead
                }
            }
            Liveness::Sentinel => {
                if params.is_live_value(state) {
                    Class::Live
                } else if params.is_dead_value(state) {
                    Class::Dead
                } else {
                    Class::Other
                }
            }
        }
    }
}

/// The parameters shared by every window rule.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowRule {
    window: Window,
    liveness: Liveness,
}

impl WindowRule {
    /// Make new rule parameters. A threshold must be finite.
    pub fn new(window: Window, liveness: Liveness) -> Result<Self> {
        if let Liveness::Threshold(threshold) = liveness {
            if !threshold.is_finite() {
                return Err(RuleConfigError::NonFiniteThreshold(threshold).into());
            }
        }
        Ok(Self { window, liveness })
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    pub fn liveness(&self) -> Liveness {
        self.liveness
    }
}

/// The supported rule kinds.
///
/// Both are Game of Life generalized to arbitrary odd windows; they differ in
/// how the live neighbor count is turned into survival and birth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleConfig", into = "RuleConfig")]
pub enum Rule {
    /// With `N = max_neighbors` and `part = live / N`, a live cell survives
    /// when `2/8 <= part <= 3/8` and a dead cell is born when `part == 3/8`.
    ///
    /// Compared as `8 * live` against `2N` and `3N`, so the birth condition
    /// is an exact integer equality. With a 3x3 window this is B3/S23.
    Ratio(WindowRule),
    /// The older count rule: a live cell survives when
    /// `N/5 <= live < N/3` and a dead cell is born when `N/3 <= live <= N/2`,
    /// all divisions rounding down.
    Count(WindowRule),
}

impl Rule {
    /// The ratio rule on a unit window with a `0.5` live threshold.
    pub fn life(ndim: usize) -> Result<Self> {
        Ok(Rule::Ratio(WindowRule::new(
            Window::unit(ndim)?,
            Liveness::Threshold(0.5),
        )?))
    }

    /// Make the rule of the given kind with the given parameters.
    pub fn new(name: RuleName, params: WindowRule) -> Self {
        match name {
            RuleName::Ratio => Rule::Ratio(params),
            RuleName::Count => Rule::Count(params),
        }
    }

    /// The kind of this rule.
    pub fn name(&self) -> RuleName {
        match self {
            Rule::Ratio(_) => RuleName::Ratio,
            Rule::Count(_) => RuleName::Count,
        }
    }

    /// The window and liveness shared by every rule kind.
    pub fn params(&self) -> &WindowRule {
        match self {
            Rule::Ratio(params) | Rule::Count(params) => params,
        }
    }

    #[inline]
    pub fn window(&self) -> &Window {
        self.params().window()
    }

    /// Fails if the rule's window does not fit the grid's dimensionality.
    pub fn check_grid<V: State>(&self, grid: &Grid<V>) -> Result<()> {
        self.window().check_grid(grid.ndim())
    }

    /// Whether a cell is live next generation given its own liveness and its
    /// live neighbor count.
    pub fn next_live(&self, live: bool, count: usize) -> bool {
        let max = self.window().max_neighbors();
        match (self, live) {
            (Rule::Ratio(_), true) => 2 * max <= 8 * count && 8 * count <= 3 * max,
            (Rule::Ratio(_), false) => 8 * count == 3 * max,
            (Rule::Count(_), true) => max / 5 <= count && count < max / 3,
            (Rule::Count(_), false) => max / 3 <= count && count <= max / 2,
        }
    }

    /// The number of live in-bounds neighbors of every cell.
    pub fn live_counts<V: State>(&self, grid: &Grid<V>) -> Result<ArrayD<usize>> {
        self.check_grid(grid)?;
        let params = grid.params();
        let liveness = self.params().liveness();
        let live = map_cells(grid.cells(), |c| liveness.neighbor_is_live(&c.state, params));
        let window = self.window();
        let dimensions = grid.dimensions();
        Ok(map_cells(grid.cells(), |c| {
            window
                .neighbors(c.position(), dimensions)
                .filter(|p| live[p.as_slice()])
                .count()
        }))
    }

    /// Compute the cells that change in the next generation.
    ///
    /// The grid is only read. Cells that are not returned keep their state.
    pub fn evaluate<V: State>(&self, grid: &Grid<V>) -> Result<Vec<Cell<V>>> {
        let counts = self.live_counts(grid)?;
        let params = grid.params();
        let liveness = self.params().liveness();

        let next = |cell: &Cell<V>| -> Option<Cell<V>> {
            let count = counts[cell.position().as_slice()];
            let state = match liveness.classify(&cell.state, params) {
                Class::Live => (!self.next_live(true, count)).as_some(&params.dead_value)?,
                Class::Dead => self.next_live(false, count).as_some(&params.live_value)?,
                Class::Other => &params.dead_value,
            };
            (*state != cell.state).as_some_from(|| cell.with_state(state.clone()))
        };

        #[cfg(feature = "parallel")]
        let updates: Vec<Cell<V>> = grid.cells().into_par_iter().filter_map(next).collect();
        #[cfg(not(feature = "parallel"))]
        let updates: Vec<Cell<V>> = grid.cells().iter().filter_map(next).collect();

        trace!(
            rule = ?self.name(),
            updates = updates.len(),
            "evaluated rule"
        );
        Ok(updates)
    }
}

#[cfg(feature = "parallel")]
fn map_cells<V, R, F>(cells: ArrayViewD<'_, Cell<V>>, f: F) -> ArrayD<R>
where
    V: Sync,
    R: Send,
    F: Fn(&Cell<V>) -> R + Sync + Send,
{
    Zip::from(cells).par_map_collect(f)
}

#[cfg(not(feature = "parallel"))]
fn map_cells<V, R, F>(cells: ArrayViewD<'_, Cell<V>>, f: F) -> ArrayD<R>
where
    F: Fn(&Cell<V>) -> R,
{
    Zip::from(cells).map_collect(f)
}

/// Names the rule kinds, for front ends that list them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoEnumIterator, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    Ratio,
    Count,
}

impl Default for RuleName {
    fn default() -> Self {
        RuleName::Ratio
    }
}

impl RuleName {
    pub fn all() -> impl Iterator<Item = RuleName> {
        RuleName::into_enum_iter()
    }

    /// The preset parameters for this rule on a 2-D grid.
    pub fn default_config(self) -> RuleConfig {
        RuleConfig {
            rule: self,
            window_size: vec![3, 3],
            live_threshold: Some(0.5),
            sentinel: false,
        }
    }
}

/// The plain key/value form of a rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(default)]
    pub rule: RuleName,
    pub window_size: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_threshold: Option<f64>,
    #[serde(default)]
    pub sentinel: bool,
}

impl TryFrom<RuleConfig> for Rule {
    type Error = crate::Error;

    fn try_from(config: RuleConfig) -> Result<Self> {
        let liveness = match (config.live_threshold, config.sentinel) {
            (Some(threshold), false) => Liveness::Threshold(threshold),
            (None, true) => Liveness::Sentinel,
            (None, false) => return Err(RuleConfigError::MissingThreshold.into()),
            (Some(_), true) => return Err(RuleConfigError::ConflictingLiveness.into()),
        };
        let window = Window::new(&config.window_size)?;
        Ok(Rule::new(config.rule, WindowRule::new(window, liveness)?))
    }
}

impl From<Rule> for RuleConfig {
    fn from(rule: Rule) -> Self {
        let params = rule.params();
        let (live_threshold, sentinel) = match params.liveness() {
            Liveness::Threshold(threshold) => (Some(threshold), false),
            Liveness::Sentinel => (None, true),
        };
        RuleConfig {
            rule: rule.name(),
            window_size: params.window().size().to_vec(),
            live_threshold,
            sentinel,
        }
    }
}
