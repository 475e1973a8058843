use std::fmt::Debug;

/// A value a cell can hold.
///
/// States only need to be comparable for equality. The intensity projection
/// is what threshold rules and image rendering see; for the usual `0.0`/`1.0`
/// states it is the value itself.
pub trait State: Clone + PartialEq + Debug + Send + Sync {
    /// The state as a scalar, nominally in `0.0..=1.0`.
    fn intensity(&self) -> f64;
}

impl State for f64 {
    #[inline]
    fn intensity(&self) -> f64 {
        *self
    }
}

impl State for f32 {
    #[inline]
    fn intensity(&self) -> f64 {
        f64::from(*self)
    }
}

impl State for bool {
    #[inline]
    fn intensity(&self) -> f64 {
        if *self {
            1.0
        } else {
            0.0
        }
    }
}

/// 8-bit states are treated as luminance.
impl State for u8 {
    #[inline]
    fn intensity(&self) -> f64 {
        f64::from(*self) / 255.0
    }
}

macro_rules! integer_state {
    ($($t:ty),*) => {
        $(
            impl State for $t {
                #[inline]
                fn intensity(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

integer_state!(u16, u32, i32, i64);

impl<T: State, const N: usize> State for [T; N] {
    fn intensity(&self) -> f64 {
        if N == 0 {
            return 0.0;
        }
        self.iter().map(State::intensity).sum::<f64>() / N as f64
    }
}

impl<A: State, B: State> State for (A, B) {
    fn intensity(&self) -> f64 {
        (self.0.intensity() + self.1.intensity()) / 2.0
    }
}

impl<A: State, B: State, C: State> State for (A, B, C) {
    fn intensity(&self) -> f64 {
        (self.0.intensity() + self.1.intensity() + self.2.intensity()) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_and_array_states_average() {
        assert_eq!((1.0, 0.0).intensity(), 0.5);
        assert_eq!([255u8, 0, 0].intensity(), 1.0 / 3.0);
        assert_eq!((true, false, true).intensity(), 2.0 / 3.0);
    }

    #[test]
    fn luminance_bytes() {
        assert_eq!(255u8.intensity(), 1.0);
        assert_eq!(0u8.intensity(), 0.0);
    }
}
