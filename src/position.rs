use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::ops::Deref;

/// The most axes a grid can have.
pub const MAX_DIMS: usize = 3;

/// A coordinate of 2 or 3 axes.
///
/// Stored inline so that cells never allocate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<usize>", try_from = "Vec<usize>")]
pub struct Position {
    axes: [usize; MAX_DIMS],
    ndim: usize,
}

impl Position {
    /// Fails unless `axes` has 2 or 3 entries.
    pub fn new(axes: &[usize]) -> Result<Self> {
        check_ndim(axes.len())?;
        Ok(Self::from_index(axes))
    }

    /// For indices coming out of a grid's own array, which is never more than
    /// `MAX_DIMS` deep.
    #[inline]
    pub(crate) fn from_index(axes: &[usize]) -> Self {
        let mut stored = [0; MAX_DIMS];
        stored[..axes.len()].copy_from_slice(axes);
        Self {
            axes: stored,
            ndim: axes.len(),
        }
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.axes[..self.ndim]
    }

    /// Applies a signed offset, returning `None` if any axis goes negative.
    ///
    /// The upper bound is not checked here since it depends on the grid.
    #[inline]
    pub fn offset(&self, delta: &[isize]) -> Option<Self> {
        let mut axes = self.axes;
        for (axis, &d) in axes[..self.ndim].iter_mut().zip(delta) {
            let moved = *axis as isize + d;
            if moved < 0 {
                return None;
            }
            *axis = moved as usize;
        }
        Some(Self { axes, ndim: self.ndim })
    }

    /// Whether the position lies inside `dimensions`.
    #[inline]
    pub fn within(&self, dimensions: &[usize]) -> bool {
        self.ndim == dimensions.len()
            && self
                .as_slice()
                .iter()
                .zip(dimensions)
                .all(|(&axis, &len)| axis < len)
    }
}

pub(crate) fn check_ndim(ndim: usize) -> Result<()> {
    if ndim == 2 || ndim == 3 {
        Ok(())
    } else {
        Err(Error::UnsupportedDimensions(ndim))
    }
}

impl Deref for Position {
    type Target = [usize];

    #[inline]
    fn deref(&self) -> &[usize] {
        self.as_slice()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Position").field(&self.as_slice()).finish()
    }
}

impl From<[usize; 2]> for Position {
    fn from(axes: [usize; 2]) -> Self {
        Self {
            axes: [axes[0], axes[1], 0],
            ndim: 2,
        }
    }
}

impl From<[usize; 3]> for Position {
    fn from(axes: [usize; 3]) -> Self {
        Self { axes, ndim: 3 }
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        [x, y].into()
    }
}

impl From<(usize, usize, usize)> for Position {
    fn from((x, y, z): (usize, usize, usize)) -> Self {
        [x, y, z].into()
    }
}

impl TryFrom<Vec<usize>> for Position {
    type Error = Error;

    fn try_from(axes: Vec<usize>) -> Result<Self> {
        Self::new(&axes)
    }
}

impl TryFrom<&[usize]> for Position {
    type Error = Error;

    fn try_from(axes: &[usize]) -> Result<Self> {
        Self::new(axes)
    }
}

impl From<Position> for Vec<usize> {
    fn from(position: Position) -> Self {
        position.as_slice().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_stops_at_zero() {
        let p = Position::from((0, 4));
        assert_eq!(p.offset(&[-1, 0]), None);
        assert_eq!(p.offset(&[1, -1]), Some(Position::from((1, 3))));
    }

    #[test]
    fn rejects_other_dimensionalities() {
        assert_eq!(Position::new(&[1]), Err(Error::UnsupportedDimensions(1)));
        assert_eq!(
            Position::new(&[1, 2, 3, 4]),
            Err(Error::UnsupportedDimensions(4))
        );
    }

    #[test]
    fn within_checks_every_axis() {
        let p = Position::from((2, 9));
        assert!(p.within(&[3, 10]));
        assert!(!p.within(&[3, 9]));
        assert!(!p.within(&[3, 10, 1]));
    }
}
