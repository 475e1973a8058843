use crate::position::{check_ndim, MAX_DIMS};
use crate::{Error, Position, Result, RuleConfigError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// A neighborhood window centered on a cell: one odd length per axis.
///
/// The window's neighbor offsets are computed once on construction and
/// exclude the center, so iterating them visits every other coordinate in the
/// window exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<usize>", try_from = "Vec<usize>")]
pub struct Window {
    size: Vec<usize>,
    offsets: Vec<[isize; MAX_DIMS]>,
}

impl Window {
    /// Make a new window with the given length per axis. Every length must
    /// be odd.
    pub fn new(size: &[usize]) -> Result<Self> {
        check_ndim(size.len())?;
        for (axis, &len) in size.iter().enumerate() {
            if len == 0 {
                return Err(RuleConfigError::EmptyWindow { axis }.into());
            }
            if len % 2 == 0 {
                return Err(RuleConfigError::EvenWindow { axis, size: len }.into());
            }
        }
        let offsets = size
            .iter()
            .map(|&len| {
                let half = (len / 2) as isize;
                -half..=half
            })
            .multi_cartesian_product()
            .filter(|delta| delta.iter().any(|&d| d != 0))
            .map(|delta| {
                let mut stored = [0; MAX_DIMS];
                stored[..delta.len()].copy_from_slice(&delta);
                stored
            })
            .collect();
        Ok(Self {
            size: size.to_vec(),
            offsets,
        })
    }

    /// The classic 3x3 (or 3x3x3) window.
    pub fn unit(ndim: usize) -> Result<Self> {
        Self::new(&vec![3; ndim])
    }

    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.size.len()
    }

    /// The neighbor count of a cell whose whole window lies inside the grid.
    ///
    /// Cells near an edge see fewer neighbors, but rules still divide by this.
    #[inline]
    pub fn max_neighbors(&self) -> usize {
        self.offsets.len()
    }

    /// Every offset in the window except the center.
    pub fn offsets(&self) -> impl Iterator<Item = &[isize]> + '_ {
        let ndim = self.ndim();
        self.offsets.iter().map(move |o| &o[..ndim])
    }

    /// The in-bounds neighbors of `center` in a grid of `dimensions`.
    pub fn neighbors<'a>(
        &'a self,
        center: Position,
        dimensions: &'a [usize],
    ) -> impl Iterator<Item = Position> + 'a {
        self.offsets()
            .filter_map(move |delta| center.offset(delta))
            .filter(move |p| p.within(dimensions))
    }

    /// Fails if this window cannot be laid over a grid with `ndim` axes.
    pub fn check_grid(&self, ndim: usize) -> Result<()> {
        if self.ndim() == ndim {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: ndim,
                found: self.ndim(),
            })
        }
    }
}

impl TryFrom<Vec<usize>> for Window {
    type Error = Error;

    fn try_from(size: Vec<usize>) -> Result<Self> {
        Self::new(&size)
    }
}

impl From<Window> for Vec<usize> {
    fn from(window: Window) -> Self {
        window.size
    }
}
