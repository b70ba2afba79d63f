//! Capabilities shared by every operator stored as a list of symplectic bit
//! rows paired with complex coefficients.
//!
//! An implementor supplies the alphabet-specific pieces, namely the product of
//! two single terms (up to an exact phase), the commutation test between two
//! single terms, and the phase carried by a Hermitian generator. Addition,
//! multiplication, cleanup, commutation matrices, and rotations are then
//! derived once for both alphabets.

use log::warn;
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    bits::BitRow,
    error::{ SympError, SympResult },
    phase::Phase,
};

/// Coefficients with modulus at or below this value are dropped by
/// [`SymplecticOp::cleanup_zeros`] by default.
pub const ZERO_THRESHOLD: f64 = 1e-15;

/// Two operators compare equal if every coefficient of their difference has
/// modulus at or below this value.
pub const EQ_TOLERANCE: f64 = 1e-10;

/// Merge identical rows by summing their coefficients, returning the unique
/// rows in ascending order.
pub(crate) fn merge_terms(rows: &[BitRow], coeffs: &[C64])
    -> (Vec<BitRow>, Vec<C64>)
{
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| rows[a].cmp(&rows[b]));
    let mut rows_out: Vec<BitRow> = Vec::with_capacity(rows.len());
    let mut coeffs_out: Vec<C64> = Vec::with_capacity(rows.len());
    for k in order.into_iter() {
        match rows_out.last() {
            Some(last) if *last == rows[k] => {
                if let Some(c) = coeffs_out.last_mut() { *c += coeffs[k]; }
            },
            _ => {
                rows_out.push(rows[k].clone());
                coeffs_out.push(coeffs[k]);
            },
        }
    }
    (rows_out, coeffs_out)
}

/// A linear combination of symplectic terms.
///
/// All rows of an operator have the same length, reported by
/// [`width`][SymplecticOp::width]. Operators are values: every method returns
/// a new operator.
pub trait SymplecticOp: Sized + Clone {
    /// Length of every row.
    fn width(&self) -> usize;

    /// Bit rows, one per term.
    fn rows(&self) -> &[BitRow];

    /// Coefficients, one per term.
    fn coeffs(&self) -> &[C64];

    /// Assemble an operator with rows of length `width` from its parts without
    /// validation. Implementors that allow operands of different widths to be
    /// combined widen shorter rows here.
    ///
    /// *Panics if the number of rows and coefficients differ.*
    fn from_raw_parts(width: usize, rows: Vec<BitRow>, coeffs: Vec<C64>)
        -> Self;

    /// Product of two single terms with unit coefficients, as a row and the
    /// exact phase picked up.
    fn term_product(a: &BitRow, b: &BitRow) -> (BitRow, Phase);

    /// Return `true` if two single terms commute.
    fn term_commutes(a: &BitRow, b: &BitRow) -> bool;

    /// Phase that makes a single term Hermitian, which is the coefficient a
    /// rotation generator on that term must carry.
    fn generator_phase(row: &BitRow) -> Phase;

    /// Hermitian conjugate.
    fn dagger(&self) -> Self;

    /// Check that `self` and `other` may be combined. Accepts everything by
    /// default.
    fn check_dims(&self, _other: &Self) -> SympResult<()> { Ok(()) }

    /// Number of terms.
    fn n_terms(&self) -> usize { self.rows().len() }

    /// Return `true` if there are no terms.
    fn is_empty(&self) -> bool { self.rows().is_empty() }

    /// Merge duplicate rows and sort rows into canonical order.
    fn cleanup(&self) -> Self {
        let (rows, coeffs) = merge_terms(self.rows(), self.coeffs());
        Self::from_raw_parts(self.width(), rows, coeffs)
    }

    /// Like [`cleanup`][Self::cleanup], additionally dropping terms whose
    /// coefficient has modulus at or below `threshold`.
    fn cleanup_zeros(&self, threshold: f64) -> Self {
        let (rows, coeffs) = merge_terms(self.rows(), self.coeffs());
        let (rows, coeffs): (Vec<BitRow>, Vec<C64>)
            = rows.into_iter().zip(coeffs)
            .filter(|(_, c)| c.norm() > threshold)
            .unzip();
        Self::from_raw_parts(self.width(), rows, coeffs)
    }

    /// Multiply every coefficient by `c`.
    fn scale(&self, c: C64) -> Self {
        let coeffs = self.coeffs().iter().map(|a| a * c).collect();
        Self::from_raw_parts(self.width(), self.rows().to_vec(), coeffs)
    }

    /// Sum of two operators, cleaned up.
    fn sum(&self, other: &Self) -> SympResult<Self> {
        self.check_dims(other)?;
        let width = self.width().max(other.width());
        let rows: Vec<BitRow> = self.rows().iter().chain(other.rows())
            .cloned()
            .collect();
        let coeffs: Vec<C64> = self.coeffs().iter().chain(other.coeffs())
            .copied()
            .collect();
        Ok(Self::from_raw_parts(width, rows, coeffs).cleanup())
    }

    /// `self - other`, cleaned up.
    fn difference(&self, other: &Self) -> SympResult<Self> {
        self.sum(&other.scale(C64::new(-1.0, 0.0)))
    }

    /// Product of two operators, expanded over all ordered pairs of terms and
    /// cleaned up.
    fn product(&self, other: &Self) -> SympResult<Self> {
        self.check_dims(other)?;
        let width = self.width().max(other.width());
        let n = self.n_terms() * other.n_terms();
        let mut rows: Vec<BitRow> = Vec::with_capacity(n);
        let mut coeffs: Vec<C64> = Vec::with_capacity(n);
        for (a, ca) in self.rows().iter().zip(self.coeffs()) {
            for (b, cb) in other.rows().iter().zip(other.coeffs()) {
                let (row, ph) = Self::term_product(a, b);
                rows.push(row);
                coeffs.push(ph.apply(ca * cb));
            }
        }
        Ok(Self::from_raw_parts(width, rows, coeffs).cleanup())
    }

    /// `[self, other] = self·other − other·self`, with zeros dropped.
    fn commutator(&self, other: &Self) -> SympResult<Self> {
        let ab = self.product(other)?;
        let ba = other.product(self)?;
        Ok(ab.difference(&ba)?.cleanup_zeros(ZERO_THRESHOLD))
    }

    /// `{self, other} = self·other + other·self`, with zeros dropped.
    fn anticommutator(&self, other: &Self) -> SympResult<Self> {
        let ab = self.product(other)?;
        let ba = other.product(self)?;
        Ok(ab.sum(&ba)?.cleanup_zeros(ZERO_THRESHOLD))
    }

    /// Matrix whose `(i, j)` entry is `true` if term `i` of `self` commutes
    /// with term `j` of `other`.
    fn commutes_termwise(&self, other: &Self)
        -> SympResult<na::DMatrix<bool>>
    {
        self.check_dims(other)?;
        let (ra, rb) = (self.rows(), other.rows());
        Ok(na::DMatrix::from_fn(
            ra.len(), rb.len(), |i, j| Self::term_commutes(&ra[i], &rb[j])))
    }

    /// Return `true` if every term of `self` commutes with every term of
    /// `other`.
    fn commutes(&self, other: &Self) -> SympResult<bool> {
        Ok(self.commutes_termwise(other)?.iter().all(|b| *b))
    }

    /// Termwise commutation of `self` with itself.
    fn adjacency(&self) -> na::DMatrix<bool> {
        let r = self.rows();
        na::DMatrix::from_fn(
            r.len(), r.len(), |i, j| Self::term_commutes(&r[i], &r[j]))
    }

    /// Conjugate by the rotation generated by a single Hermitian term `Q`.
    ///
    /// Terms commuting with `Q` are unchanged; each anticommuting term `P`
    /// becomes `cos(θ) P − i sin(θ) P·Q`. An angle of `None` is the Clifford
    /// case θ = π/2, where `P` maps exactly onto `−i P·Q`.
    ///
    /// The generator's coefficient must be the phase making its term
    /// Hermitian (1 for Pauli strings); any other value is logged and
    /// replaced.
    fn rotate_by(&self, generator: &Self, angle: Option<f64>)
        -> SympResult<Self>
    {
        if generator.n_terms() != 1 {
            return Err(SympError::NotSingleTerm(generator.n_terms()));
        }
        self.check_dims(generator)?;
        let q = &generator.rows()[0];
        let q_phase = Self::generator_phase(q);
        if (generator.coeffs()[0] - q_phase.as_complex()).norm() > EQ_TOLERANCE {
            warn!(
                "rotation generator has coefficient {}; using {} instead",
                generator.coeffs()[0], q_phase,
            );
        }
        let width = self.width().max(generator.width());
        let mut rows: Vec<BitRow> = Vec::with_capacity(2 * self.n_terms());
        let mut coeffs: Vec<C64> = Vec::with_capacity(2 * self.n_terms());
        for (p, c) in self.rows().iter().zip(self.coeffs()) {
            if Self::term_commutes(p, q) {
                rows.push(p.clone());
                coeffs.push(*c);
                continue;
            }
            let (pq, ph) = Self::term_product(p, q);
            // -i · c · (phase of Q) · (phase of P·Q)
            let pq_coeff = (ph + q_phase + Phase::Pi3h).apply(*c);
            match angle {
                None => {
                    rows.push(pq);
                    coeffs.push(pq_coeff);
                },
                Some(t) => {
                    rows.push(p.clone());
                    coeffs.push(*c * t.cos());
                    rows.push(pq);
                    coeffs.push(pq_coeff * t.sin());
                },
            }
        }
        Ok(Self::from_raw_parts(width, rows, coeffs).cleanup())
    }

    /// Apply [`rotate_by`][Self::rotate_by] for each generator in order,
    /// cleaning up after each step. `angles`, if given, must have one entry
    /// per generator.
    fn recursive_rotate(&self, generators: &[Self], angles: Option<&[Option<f64>]>)
        -> SympResult<Self>
    {
        if let Some(a) = angles {
            if a.len() != generators.len() {
                return Err(SympError::AngleCount {
                    generators: generators.len(),
                    angles: a.len(),
                });
            }
        }
        generators.iter().enumerate()
            .try_fold(self.clone(), |acc, (k, rot)| {
                let angle = angles.and_then(|a| a[k]);
                acc.rotate_by(rot, angle)
            })
    }

    /// Return `true` if `self` and `other` agree up to [`EQ_TOLERANCE`].
    /// Operators that cannot be combined are unequal.
    fn approx_eq(&self, other: &Self) -> bool {
        self.difference(other)
            .map(|d| d.cleanup_zeros(EQ_TOLERANCE).is_empty())
            .unwrap_or(false)
    }

    /// Return `true` if `self` equals its Hermitian conjugate.
    fn is_hermitian(&self) -> bool { self.approx_eq(&self.dagger()) }
}

/// Implement `+`, `-`, `*`, unary `-`, and scaling by `C64` for an operator
/// type in terms of its [`SymplecticOp`] methods, along with tolerance-based
/// `PartialEq`.
///
/// The binary operators panic when the operands cannot be combined (see
/// [`SymplecticOp::check_dims`]); use the trait methods to handle that case.
macro_rules! impl_symplectic_arith {
    ($op:ty) => {
        impl<'a> std::ops::Add<&'a $op> for &'a $op {
            type Output = $op;

            fn add(self, rhs: &'a $op) -> $op {
                match $crate::symplectic::SymplecticOp::sum(self, rhs) {
                    Ok(out) => out,
                    Err(err) => panic!("{}", err),
                }
            }
        }

        impl std::ops::Add<$op> for $op {
            type Output = $op;

            fn add(self, rhs: $op) -> $op { &self + &rhs }
        }

        impl<'a> std::ops::Sub<&'a $op> for &'a $op {
            type Output = $op;

            fn sub(self, rhs: &'a $op) -> $op {
                match $crate::symplectic::SymplecticOp::difference(self, rhs) {
                    Ok(out) => out,
                    Err(err) => panic!("{}", err),
                }
            }
        }

        impl std::ops::Sub<$op> for $op {
            type Output = $op;

            fn sub(self, rhs: $op) -> $op { &self - &rhs }
        }

        impl<'a> std::ops::Mul<&'a $op> for &'a $op {
            type Output = $op;

            fn mul(self, rhs: &'a $op) -> $op {
                match $crate::symplectic::SymplecticOp::product(self, rhs) {
                    Ok(out) => out,
                    Err(err) => panic!("{}", err),
                }
            }
        }

        impl std::ops::Mul<$op> for $op {
            type Output = $op;

            fn mul(self, rhs: $op) -> $op { &self * &rhs }
        }

        impl std::ops::Mul<num_complex::Complex64> for &$op {
            type Output = $op;

            fn mul(self, c: num_complex::Complex64) -> $op {
                $crate::symplectic::SymplecticOp::scale(self, c)
            }
        }

        impl std::ops::Mul<num_complex::Complex64> for $op {
            type Output = $op;

            fn mul(self, c: num_complex::Complex64) -> $op {
                $crate::symplectic::SymplecticOp::scale(&self, c)
            }
        }

        impl std::ops::Neg for &$op {
            type Output = $op;

            fn neg(self) -> $op {
                $crate::symplectic::SymplecticOp::scale(
                    self, num_complex::Complex64::new(-1.0, 0.0))
            }
        }

        impl std::ops::Neg for $op {
            type Output = $op;

            fn neg(self) -> $op { -&self }
        }

        impl PartialEq for $op {
            fn eq(&self, other: &Self) -> bool {
                $crate::symplectic::SymplecticOp::approx_eq(self, other)
            }
        }
    }
}
pub(crate) use impl_symplectic_arith;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn merge_sums_and_sorts() {
        let a = BitRow::from_ones(4, [1]);
        let b = BitRow::from_ones(4, [0]);
        let rows = vec![a.clone(), b.clone(), a.clone()];
        let coeffs = vec![C64::new(1.0, 0.0), C64::new(2.0, 0.0), C64::new(0.5, 1.0)];
        let (r, c) = merge_terms(&rows, &coeffs);
        assert_eq!(r, vec![a, b]);
        assert_eq!(c, vec![C64::new(1.5, 1.0), C64::new(2.0, 0.0)]);
    }

    #[test]
    fn merge_empty() {
        let (r, c) = merge_terms(&[], &[]);
        assert!(r.is_empty() && c.is_empty());
    }
}
