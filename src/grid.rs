use crate::position::check_ndim;
use crate::{Cell, Error, Position, Result, State};
use ndarray::{Array2, ArrayD, ArrayViewD, Dimension, IxDyn};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// How two states are compared when the grid needs to know whether a cell
/// holds its live or dead value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "EqualityConfig")]
pub enum Equality {
    /// `PartialEq` on the states themselves.
    Exact,
    /// Intensities within an absolute epsilon of each other. Build it with
    /// [`Equality::tolerance`] to have the epsilon checked.
    Tolerance(f64),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum EqualityConfig {
    Exact,
    Tolerance(f64),
}

impl TryFrom<EqualityConfig> for Equality {
    type Error = Error;

    fn try_from(config: EqualityConfig) -> Result<Self> {
        match config {
            EqualityConfig::Exact => Ok(Equality::Exact),
            EqualityConfig::Tolerance(epsilon) => Equality::tolerance(epsilon),
        }
    }
}

impl Default for Equality {
    fn default() -> Self {
        Equality::Exact
    }
}

impl Equality {
    /// Compare intensities within `epsilon`, which must be finite and not
    /// negative.
    pub fn tolerance(epsilon: f64) -> Result<Self> {
        if epsilon.is_finite() && epsilon >= 0.0 {
            Ok(Equality::Tolerance(epsilon))
        } else {
            Err(Error::InvalidTolerance(epsilon))
        }
    }

    #[inline]
    pub fn matches<V: State>(&self, a: &V, b: &V) -> bool {
        match *self {
            Equality::Exact => a == b,
            Equality::Tolerance(epsilon) => (a.intensity() - b.intensity()).abs() <= epsilon,
        }
    }
}

/// Domain configuration shared read-only by every rule evaluation on a grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridParams<V> {
    pub live_value: V,
    pub dead_value: V,
    #[serde(default)]
    pub equality: Equality,
}

impl<V: State> GridParams<V> {
    /// Make new params with exact equality.
    pub fn new(live_value: V, dead_value: V) -> Self {
        Self {
            live_value,
            dead_value,
            equality: Equality::Exact,
        }
    }

    pub fn with_equality(self, equality: Equality) -> Self {
        Self { equality, ..self }
    }

    #[inline]
    pub fn is_live_value(&self, state: &V) -> bool {
        self.equality.matches(state, &self.live_value)
    }

    #[inline]
    pub fn is_dead_value(&self, state: &V) -> bool {
        self.equality.matches(state, &self.dead_value)
    }
}

impl Default for GridParams<f64> {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Default for GridParams<f32> {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Default for GridParams<bool> {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Default for GridParams<u8> {
    fn default() -> Self {
        Self::new(u8::MAX, 0)
    }
}

impl Default for GridParams<i32> {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// A dense 2-D or 3-D array of cells.
///
/// Cloning a grid clones the whole array, so a clone is fully decoupled from
/// later updates to the original.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<V> {
    cells: ArrayD<Cell<V>>,
    params: GridParams<V>,
}

fn check_dimensions(dimensions: &[usize]) -> Result<()> {
    check_ndim(dimensions.len())?;
    match dimensions.iter().position(|&len| len == 0) {
        Some(axis) => Err(Error::EmptyDimension { axis }),
        None => Ok(()),
    }
}

impl<V: State> Grid<V> {
    /// Make a new grid where every cell holds the dead value.
    pub fn new(dimensions: &[usize], params: GridParams<V>) -> Result<Self> {
        check_dimensions(dimensions)?;
        let dead = &params.dead_value;
        let cells = ArrayD::from_shape_fn(IxDyn(dimensions), |ix| {
            Cell::new(dead.clone(), Position::from_index(ix.slice()))
        });
        Ok(Self { cells, params })
    }

    /// Make a grid where the listed coordinates hold the live value.
    pub fn with_live_cells<I>(dimensions: &[usize], params: GridParams<V>, coords: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Position>,
    {
        let live = params.live_value.clone();
        Self::with_states(
            dimensions,
            params,
            coords.into_iter().map(|c| (c, live.clone())),
        )
    }

    /// Make a grid from a list of coordinates with explicit states. Unlisted
    /// coordinates hold the dead value.
    pub fn with_states<I, P>(dimensions: &[usize], params: GridParams<V>, seeds: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<Position>,
    {
        let mut grid = Self::new(dimensions, params)?;
        grid.update_cells(seeds.into_iter().map(|(p, state)| Cell::new(state, p)))?;
        Ok(grid)
    }

    /// Make a grid from an array of raw states, one per coordinate.
    pub fn from_values(values: ArrayD<V>, params: GridParams<V>) -> Result<Self> {
        check_dimensions(values.shape())?;
        let cells = ArrayD::from_shape_fn(values.raw_dim(), |ix| {
            let ix = ix.slice();
            Cell::new(values[ix].clone(), Position::from_index(ix))
        });
        Ok(Self { cells, params })
    }

    /// A same-shaped array of the raw cell states.
    pub fn values(&self) -> ArrayD<V> {
        self.cells.map(|c| c.state.clone())
    }

    /// Overwrite the cell at each update's position.
    ///
    /// All positions are checked before anything is written, so an
    /// out-of-bounds update leaves the grid untouched.
    pub fn update_cells<I>(&mut self, updates: I) -> Result<()>
    where
        I: IntoIterator<Item = Cell<V>>,
    {
        let updates: Vec<Cell<V>> = updates.into_iter().collect();
        if let Some(bad) = updates.iter().find(|c| !c.position().within(self.dimensions())) {
            return Err(Error::OutOfBounds {
                position: bad.position().into(),
                dimensions: self.dimensions().to_vec(),
            });
        }
        for cell in updates {
            let position = cell.position();
            self.cells[position.as_slice()] = cell;
        }
        Ok(())
    }

    /// Per-(x, y) intensities. A 3-D grid is averaged along its last axis.
    pub fn intensities(&self) -> Array2<f64> {
        let shape = self.dimensions();
        match *shape {
            [width, height, depth] => Array2::from_shape_fn((width, height), |(i, j)| {
                (0..depth)
                    .map(|k| self.cells[&[i, j, k][..]].state.intensity())
                    .sum::<f64>()
                    / depth as f64
            }),
            _ => Array2::from_shape_fn((shape[0], shape[1]), |(i, j)| {
                self.cells[&[i, j][..]].state.intensity()
            }),
        }
    }

    /// An 8-bit luminance image with intensities `0.0..=1.0` mapped to `0..=255`.
    /// Scaled values are truncated, so `0.5` becomes `127`.
    pub fn to_image(&self) -> Array2<u8> {
        self.intensities()
            .mapv(|x| (x.clamp(0.0, 1.0) * 255.0) as u8)
    }

    /// The number of cells holding the live value.
    pub fn population(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| self.params.is_live_value(&c.state))
            .count()
    }

    #[inline]
    pub fn get(&self, position: impl Into<Position>) -> Option<&Cell<V>> {
        let position = position.into();
        if position.within(self.dimensions()) {
            self.cells.get(position.as_slice())
        } else {
            None
        }
    }

    #[inline]
    pub fn cells(&self) -> ArrayViewD<'_, Cell<V>> {
        self.cells.view()
    }

    #[inline]
    pub fn dimensions(&self) -> &[usize] {
        self.cells.shape()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.cells.ndim()
    }

    #[inline]
    pub fn params(&self) -> &GridParams<V> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Grid<f64> {
        Grid::with_live_cells(
            &[4, 5],
            GridParams::default(),
            vec![(0, 0), (0, 1), (1, 0), (1, 1)],
        )
        .unwrap()
    }

    #[test]
    fn seeded_cells_are_live() {
        let grid = block();
        let values = grid.values();
        assert_eq!(values.shape(), &[4, 5]);
        for (ix, &v) in values.indexed_iter() {
            let expected = if ix[0] < 2 && ix[1] < 2 { 1.0 } else { 0.0 };
            assert_eq!(v, expected, "at {:?}", ix);
        }
        assert_eq!(grid.population(), 4);
    }

    #[test]
    fn positions_match_indices() {
        let grid = Grid::new(&[2, 3, 4], GridParams::<bool>::default()).unwrap();
        for (ix, cell) in grid.cells().indexed_iter() {
            assert_eq!(cell.position().as_slice(), ix.slice());
        }
    }

    #[test]
    fn seeding_out_of_bounds_fails() {
        let err = Grid::with_live_cells(&[3, 3], GridParams::<f64>::default(), vec![(3, 0)]);
        assert_eq!(
            err,
            Err(Error::OutOfBounds {
                position: vec![3, 0],
                dimensions: vec![3, 3],
            })
        );
    }

    #[test]
    fn seeding_wrong_dimensionality_fails() {
        let err = Grid::with_live_cells(&[3, 3], GridParams::<f64>::default(), vec![(1, 1, 1)]);
        assert!(matches!(err, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert_eq!(
            Grid::new(&[5], GridParams::<f64>::default()),
            Err(Error::UnsupportedDimensions(1))
        );
        assert_eq!(
            Grid::new(&[5, 0], GridParams::<f64>::default()),
            Err(Error::EmptyDimension { axis: 1 })
        );
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut grid = block();
        let before = grid.clone();
        let updates = vec![Cell::new(1.0, (3, 3)), Cell::new(1.0, (4, 0))];
        assert!(grid.update_cells(updates).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn copies_are_independent() {
        let mut grid = block();
        let snapshot = grid.clone();
        grid.update_cells(vec![Cell::new(0.0, (0, 0))]).unwrap();
        assert_eq!(snapshot.get((0, 0)).unwrap().state, 1.0);
        assert_eq!(grid.get((0, 0)).unwrap().state, 0.0);
    }

    #[test]
    fn image_of_3d_grid_averages_depth() {
        let grid = Grid::with_live_cells(
            &[2, 2, 4],
            GridParams::<f64>::default(),
            vec![(0, 0, 0), (0, 0, 1), (1, 1, 0), (1, 1, 1), (1, 1, 2), (1, 1, 3)],
        )
        .unwrap();
        let intensities = grid.intensities();
        assert_eq!(intensities[(0, 0)], 0.5);
        assert_eq!(intensities[(1, 1)], 1.0);
        assert_eq!(intensities[(0, 1)], 0.0);
        let image = grid.to_image();
        assert_eq!(image[(0, 0)], 127);
        assert_eq!(image[(1, 1)], 255);
    }

    #[test]
    fn from_values_keeps_shape_and_states() {
        let values = ArrayD::from_shape_fn(IxDyn(&[3, 2]), |ix| ix[0] * 2 + ix[1]);
        let values = values.mapv(|v| v as i32);
        let grid = Grid::from_values(values.clone(), GridParams::default()).unwrap();
        assert_eq!(grid.values(), values);
        assert_eq!(grid.get((2, 1)).unwrap().position(), Position::from((2, 1)));
    }

    #[test]
    fn tolerance_equality() {
        let params = GridParams::new(1.0, 0.0).with_equality(Equality::tolerance(0.01).unwrap());
        assert!(params.is_live_value(&0.995));
        assert!(!params.is_live_value(&0.9));
    }

    #[test]
    fn bad_tolerances_are_rejected() {
        assert_eq!(Equality::tolerance(-0.1), Err(Error::InvalidTolerance(-0.1)));
        assert!(Equality::tolerance(f64::NAN).is_err());
        assert!(Equality::tolerance(f64::INFINITY).is_err());

        let parsed = serde_json::from_str::<GridParams<f64>>(
            r#"{"live_value": 1.0, "dead_value": 0.0, "equality": {"tolerance": -0.5}}"#,
        );
        assert!(parsed.is_err());

        let params: GridParams<f64> = serde_json::from_str(
            r#"{"live_value": 1.0, "dead_value": 0.0, "equality": {"tolerance": 0.25}}"#,
        )
        .unwrap();
        assert_eq!(params.equality, Equality::Tolerance(0.25));
        let params: GridParams<f64> =
            serde_json::from_str(r#"{"live_value": 1.0, "dead_value": 0.0}"#).unwrap();
        assert_eq!(params.equality, Equality::Exact);
    }
}
