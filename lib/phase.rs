//! Exact powers of *i*.
//!
//! Products of Pauli strings and Majorana monomials only ever pick up phases
//! from {1, *i*, −1, −*i*}, so these are tracked as an integer modulo 4 and
//! applied to coefficients without going through `exp`.

use std::{
    fmt,
    ops::{ Add, AddAssign, Neg, Sub, SubAssign },
};
use num_complex::Complex64 as C64;

/// The argument of a complex phase factor, limited to integer multiples of π/2.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// 0
    Pi0,
    /// π/2
    Pi1h,
    /// π
    Pi,
    /// 3π/2
    Pi3h,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pi0 => write!(f, "+1"),
            Self::Pi1h => write!(f, "+i"),
            Self::Pi => write!(f, "-1"),
            Self::Pi3h => write!(f, "-i"),
        }
    }
}

impl Phase {
    /// Convert to the bare multiple of π/2.
    pub fn to_int(&self) -> i8 {
        match self {
            Self::Pi0  => 0,
            Self::Pi1h => 1,
            Self::Pi   => 2,
            Self::Pi3h => 3,
        }
    }

    /// Convert from a bare multiple of π/2 (modulo 4).
    pub fn from_int(i: i8) -> Self {
        match i.rem_euclid(4) {
            0 => Self::Pi0,
            1 => Self::Pi1h,
            2 => Self::Pi,
            3 => Self::Pi3h,
            _ => unreachable!(),
        }
    }

    /// Phase of `(-1)^k`.
    pub fn sign(k: usize) -> Self {
        if k % 2 == 0 { Self::Pi0 } else { Self::Pi }
    }

    pub fn as_complex(self) -> C64 {
        match self {
            Self::Pi0  => 1.0_f64.into(),
            Self::Pi1h => C64::i(),
            Self::Pi   => (-1.0_f64).into(),
            Self::Pi3h => -C64::i(),
        }
    }

    /// Multiply a coefficient by this phase, permuting and negating its parts
    /// rather than performing a complex multiplication.
    pub fn apply(self, c: C64) -> C64 {
        match self {
            Self::Pi0  => c,
            Self::Pi1h => C64::new(-c.im, c.re),
            Self::Pi   => -c,
            Self::Pi3h => C64::new(c.im, -c.re),
        }
    }

    /// Complex conjugate.
    pub fn conj(self) -> Self { -self }
}

impl Neg for Phase {
    type Output = Self;

    fn neg(self) -> Self::Output { Self::from_int(-self.to_int()) }
}

macro_rules! impl_phase_math {
    (
        $trait:ident,
        $trait_fn:ident,
        $trait_assign:ident,
        $trait_assign_fn:ident,
        $op:tt
    ) => {
        impl $trait for Phase {
            type Output = Self;

            fn $trait_fn(self, rhs: Self) -> Self::Output {
                Self::from_int(self.to_int() $op rhs.to_int())
            }
        }

        impl $trait_assign for Phase {
            fn $trait_assign_fn(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    }
}
impl_phase_math!(Add, add, AddAssign, add_assign, +);
impl_phase_math!(Sub, sub, SubAssign, sub_assign, -);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn int_round_trip() {
        for k in -8..8_i8 {
            assert_eq!(Phase::from_int(k).to_int(), k.rem_euclid(4));
        }
    }

    #[test]
    fn arithmetic() {
        assert_eq!(Phase::Pi1h + Phase::Pi1h, Phase::Pi);
        assert_eq!(Phase::Pi1h + Phase::Pi3h, Phase::Pi0);
        assert_eq!(Phase::Pi0 - Phase::Pi1h, Phase::Pi3h);
        assert_eq!(-Phase::Pi1h, Phase::Pi3h);
        assert_eq!(Phase::sign(3), Phase::Pi);
    }

    #[test]
    fn apply_matches_complex() {
        let c = C64::new(0.25, -1.5);
        for k in 0..4 {
            let ph = Phase::from_int(k);
            assert_eq!(ph.apply(c), c * ph.as_complex());
        }
    }
}
