//! Linear combinations of Majorana monomials over 2*N* modes.
//!
//! Majorana operators satisfy {γ<sub>*j*</sub>, γ<sub>*k*</sub>} =
//! 2δ<sub>*jk*</sub>, so a monomial is fixed up to sign by the set of modes it
//! contains. A term is stored as a presence mask over the modes, and a stored
//! coefficient *c* on mask *A* means *c* γ<sub>*a*1</sub> γ<sub>*a*2</sub> ⋯
//! with the modes in ascending order. The Hermitian monomials
//! *i*<sup>⌊|*A*|/2⌋</sup> γ<sub>*A*</sub> of
//! [arXiv:2102.00620](https://arxiv.org/abs/2102.00620) (eq. 10) are obtained by
//! folding that phase into the coefficient at construction.
//!
//! Operators on different numbers of modes are combined by zero-padding the
//! smaller one.

use std::fmt;
use itertools::Itertools;
use num_complex::Complex64 as C64;
use crate::{
    bits::BitRow,
    codec::{ canonical_order, decode_modes, encode_modes },
    error::{ SympError, SympResult },
    phase::Phase,
    symplectic::{ SymplecticOp, ZERO_THRESHOLD, impl_symplectic_arith },
};

/// Whether coefficients given at construction already include the Hermitian
/// phase *i*<sup>⌊*w*/2⌋</sup> of their term.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum HermitianPhase {
    /// Coefficients refer to the Hermitian monomials; multiply in the phase.
    #[default]
    Apply,
    /// Coefficients refer to the bare ascending products; use them as given.
    Included,
}

/// A single fermionic ladder operator on a site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ladder {
    /// *a*<sup>†</sup><sub>*p*</sub> = ½(γ<sub>2*p*</sub> − *i*γ<sub>2*p*+1</sub>)
    Create(usize),
    /// *a*<sub>*p*</sub> = ½(γ<sub>2*p*</sub> + *i*γ<sub>2*p*+1</sub>)
    Annihilate(usize),
}

impl Ladder {
    fn site(self) -> usize {
        match self {
            Self::Create(p) | Self::Annihilate(p) => p,
        }
    }
}

// i^floor(w / 2)
fn hermitian_phase(row: &BitRow) -> Phase {
    Phase::from_int(((row.count_ones() / 2) % 4) as i8)
}

/// A linear combination of Majorana monomials.
#[derive(Clone, Debug)]
pub struct MajoranaOp {
    n_modes: usize,
    rows: Vec<BitRow>,
    coeffs: Vec<C64>,
}

impl MajoranaOp {
    fn check_even(n_modes: usize) -> SympResult<()> {
        if n_modes % 2 == 0 {
            Ok(())
        } else {
            Err(SympError::format(
                format!("{n_modes} modes"),
                "the number of Majorana modes must be even",
            ))
        }
    }

    /// Create a new operator from lists of mode indices, each read as an
    /// ordered product γ<sub>*m*1</sub> γ<sub>*m*2</sub> ⋯. Products are
    /// reordered (with sign) and repeated modes cancelled.
    ///
    /// The number of modes is one more than the largest index, rounded up to
    /// an even number, and at least 2.
    pub fn from_modes<I, M>(terms: I, coeffs: Vec<C64>) -> SympResult<Self>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<[usize]>,
    {
        let terms: Vec<M> = terms.into_iter().collect();
        let max = terms.iter()
            .flat_map(|t| t.as_ref().iter().copied())
            .max();
        let n_modes =
            match max {
                Some(m) => (m + 1 + (m + 1) % 2).max(2),
                None => 2,
            };
        Self::from_modes_in(n_modes, terms, coeffs, HermitianPhase::Apply)
    }

    /// Like [`from_modes`][Self::from_modes], but with an explicit (even)
    /// number of modes and phase convention.
    pub fn from_modes_in<I, M>(
        n_modes: usize,
        terms: I,
        coeffs: Vec<C64>,
        phase: HermitianPhase,
    ) -> SympResult<Self>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<[usize]>,
    {
        Self::check_even(n_modes)?;
        let mut rows: Vec<BitRow> = Vec::new();
        let mut signs: Vec<i8> = Vec::new();
        for term in terms.into_iter() {
            let (row, sign) = encode_modes(term.as_ref(), n_modes)?;
            rows.push(row);
            signs.push(sign);
        }
        if rows.len() != coeffs.len() {
            return Err(SympError::CoefficientCount {
                terms: rows.len(),
                coeffs: coeffs.len(),
            });
        }
        let coeffs: Vec<C64>
            = coeffs.into_iter().zip(signs)
            .map(|(c, s)| if s < 0 { -c } else { c })
            .collect();
        Self::from_rows(n_modes, rows, coeffs, phase)
    }

    /// Create a new operator from mode masks of length `n_modes`.
    pub fn from_rows(
        n_modes: usize,
        rows: Vec<BitRow>,
        coeffs: Vec<C64>,
        phase: HermitianPhase,
    ) -> SympResult<Self>
    {
        Self::check_even(n_modes)?;
        if rows.len() != coeffs.len() {
            return Err(SympError::CoefficientCount {
                terms: rows.len(),
                coeffs: coeffs.len(),
            });
        }
        if let Some(row) = rows.iter().find(|r| r.len() != n_modes) {
            return Err(SympError::DimensionMismatch {
                left: n_modes,
                right: row.len(),
            });
        }
        let coeffs: Vec<C64>
            = match phase {
                HermitianPhase::Apply => {
                    rows.iter().zip(coeffs)
                        .map(|(r, c)| hermitian_phase(r).apply(c))
                        .collect()
                },
                HermitianPhase::Included => coeffs,
            };
        Ok(Self { n_modes, rows, coeffs })
    }

    /// The identity on `n_modes` modes with coefficient 1.
    ///
    /// *Panics if `n_modes` is odd.*
    pub fn identity(n_modes: usize) -> Self {
        assert!(n_modes % 2 == 0, "MajoranaOp::identity: odd number of modes");
        Self {
            n_modes,
            rows: vec![BitRow::zeros(n_modes)],
            coeffs: vec![C64::from(1.0)],
        }
    }

    /// The operator on `n_modes` modes with no terms.
    ///
    /// *Panics if `n_modes` is odd.*
    pub fn empty(n_modes: usize) -> Self {
        assert!(n_modes % 2 == 0, "MajoranaOp::empty: odd number of modes");
        Self { n_modes, rows: Vec::new(), coeffs: Vec::new() }
    }

    /// Convert a sum of products of fermionic ladder operators on `n_sites`
    /// sites into Majorana form over 2`n_sites` modes, using
    ///
    /// ```text
    /// a_p  = ½(γ_{2p} + iγ_{2p+1})
    /// a†_p = ½(γ_{2p} − iγ_{2p+1})
    /// ```
    ///
    /// Each item is a product of ladder operators, applied left to right, and
    /// its coefficient. Terms that cancel are dropped.
    pub fn from_ladder_terms<I, L>(n_sites: usize, terms: I) -> SympResult<Self>
    where
        I: IntoIterator<Item = (L, C64)>,
        L: AsRef<[Ladder]>,
    {
        let n_modes = 2 * n_sites;
        let half = C64::from(0.5);
        let mut acc = Self::empty(n_modes);
        for (product, c) in terms.into_iter() {
            let mut term = Self::identity(n_modes).scale(c);
            for op in product.as_ref().iter() {
                let p = op.site();
                if p >= n_sites {
                    return Err(SympError::format(
                        format!("{op:?}"),
                        format!("site {p} out of range for {n_sites} sites"),
                    ));
                }
                let odd = match op {
                    Ladder::Create(_) => -half * C64::i(),
                    Ladder::Annihilate(_) => half * C64::i(),
                };
                let factor = Self::from_rows(
                    n_modes,
                    vec![
                        BitRow::from_ones(n_modes, [2 * p]),
                        BitRow::from_ones(n_modes, [2 * p + 1]),
                    ],
                    vec![half, odd],
                    HermitianPhase::Included,
                )?;
                term = term.product(&factor)?;
            }
            acc = acc.sum(&term)?;
        }
        Ok(acc.cleanup_zeros(ZERO_THRESHOLD))
    }

    /// Return the number of modes.
    pub fn n_modes(&self) -> usize { self.n_modes }

    /// Return the single Hermitian monomial on `row`, i.e. the row with
    /// coefficient *i*<sup>⌊*w*/2⌋</sup>.
    pub fn hermitian_generator(row: &BitRow) -> Self {
        Self {
            n_modes: row.len() + row.len() % 2,
            rows: vec![row.padded(row.len() + row.len() % 2)],
            coeffs: vec![hermitian_phase(row).as_complex()],
        }
    }

    /// Return the unitary cos(θ/2) + *i* sin(θ/2) *Q* for a single term *Q*,
    /// taken with its Hermitian phase regardless of its stored coefficient.
    pub fn rotation_unitary(generator: &Self, angle: f64) -> SympResult<Self> {
        if generator.n_terms() != 1 {
            return Err(SympError::NotSingleTerm(generator.n_terms()));
        }
        let q = &generator.rows[0];
        let rows = vec![BitRow::zeros(generator.n_modes), q.clone()];
        let coeffs = vec![
            C64::from((angle / 2.0).cos()),
            C64::i() * (angle / 2.0).sin() * hermitian_phase(q).as_complex(),
        ];
        Ok(Self::from_raw_parts(generator.n_modes, rows, coeffs).cleanup())
    }

    /// Return *U* `self` *U*<sup>†</sup>.
    pub fn conjugate_by(&self, unitary: &Self) -> SympResult<Self> {
        Ok(
            unitary.product(self)?
                .product(&unitary.dagger())?
                .cleanup_zeros(ZERO_THRESHOLD)
        )
    }

    /// Return each term as its ascending list of modes and stored coefficient.
    pub fn to_mode_lists(&self) -> Vec<(Vec<usize>, C64)> {
        self.rows.iter().map(decode_modes)
            .zip(self.coeffs.iter().copied())
            .collect()
    }
}

impl SymplecticOp for MajoranaOp {
    fn width(&self) -> usize { self.n_modes }

    fn rows(&self) -> &[BitRow] { &self.rows }

    fn coeffs(&self) -> &[C64] { &self.coeffs }

    fn from_raw_parts(width: usize, rows: Vec<BitRow>, coeffs: Vec<C64>)
        -> Self
    {
        assert_eq!(rows.len(), coeffs.len(), "MajoranaOp: rows and coefficients differ in number");
        let rows: Vec<BitRow>
            = rows.into_iter()
            .map(|r| if r.len() < width { r.padded(width) } else { r })
            .collect();
        Self { n_modes: width, rows, coeffs }
    }

    fn term_product(a: &BitRow, b: &BitRow) -> (BitRow, Phase) {
        let modes: Vec<usize> = a.ones().chain(b.ones()).collect();
        let (_, sign) = canonical_order(&modes);
        (a.xor(b), if sign < 0 { Phase::Pi } else { Phase::Pi0 })
    }

    fn term_commutes(a: &BitRow, b: &BitRow) -> bool {
        (a.count_ones() * b.count_ones() + a.and_count(b)) % 2 == 0
    }

    fn generator_phase(row: &BitRow) -> Phase { hermitian_phase(row) }

    fn dagger(&self) -> Self {
        let coeffs: Vec<C64>
            = self.rows.iter().zip(&self.coeffs)
            .map(|(row, c)| {
                let reversed: Vec<usize> = decode_modes(row).into_iter().rev().collect();
                let (_, sign) = canonical_order(&reversed);
                if sign < 0 { -c.conj() } else { c.conj() }
            })
            .collect();
        Self { n_modes: self.n_modes, rows: self.rows.clone(), coeffs }
    }
}

impl_symplectic_arith!(MajoranaOp);

impl fmt::Display for MajoranaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.rows.len();
        for (k, (row, c)) in self.rows.iter().zip(&self.coeffs).enumerate() {
            write!(f, "{} ", c)?;
            if row.is_zero() {
                write!(f, "I")?;
            } else {
                write!(f, "{}", row.ones().map(|m| format!("γ{m}")).join(" "))?;
            }
            if k + 1 < n { writeln!(f, " +")?; }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn gamma(n_modes: usize, modes: &[usize]) -> MajoranaOp {
        MajoranaOp::from_modes_in(
            n_modes, [modes], vec![C64::from(1.0)], HermitianPhase::Included)
            .unwrap()
    }

    #[test]
    fn mode_count_inference() {
        let one = vec![C64::from(1.0)];
        assert_eq!(MajoranaOp::from_modes([[5_usize]], one.clone()).unwrap().n_modes(), 6);
        assert_eq!(MajoranaOp::from_modes([[4_usize]], one.clone()).unwrap().n_modes(), 6);
        assert_eq!(MajoranaOp::from_modes([[0_usize]], one.clone()).unwrap().n_modes(), 2);
        let empty: [[usize; 0]; 1] = [[]];
        assert_eq!(MajoranaOp::from_modes(empty, one).unwrap().n_modes(), 2);
        assert!(matches!(
            MajoranaOp::from_rows(3, vec![], vec![], HermitianPhase::Apply),
            Err(SympError::Format { .. }),
        ));
    }

    #[test]
    fn construction_sign_and_phase() {
        // i γ1 γ0 = -i γ0 γ1
        let a = MajoranaOp::from_modes([[1_usize, 0]], vec![C64::from(1.0)]).unwrap();
        assert_eq!(a.to_mode_lists(), vec![(vec![0, 1], -C64::i())]);
        // weight-1 and weight-3 phases
        let b = MajoranaOp::from_modes(
            [vec![2_usize], vec![0, 1, 3]], vec![C64::from(1.0); 2]).unwrap();
        assert_eq!(b.coeffs(), &[C64::from(1.0), C64::i()]);
    }

    #[test]
    fn anticommutation() {
        for i in 0..4 {
            for j in 0..4 {
                let gi = gamma(4, &[i]);
                let gj = gamma(4, &[j]);
                if i == j {
                    assert_eq!(&gi * &gj, MajoranaOp::identity(4));
                } else {
                    assert_eq!(&gi * &gj, -(&gj * &gi));
                }
            }
        }
    }

    #[test]
    fn product_sign() {
        // (γ0 γ1)(γ1 γ2) = γ0 γ2
        assert_eq!(&gamma(4, &[0, 1]) * &gamma(4, &[1, 2]), gamma(4, &[0, 2]));
        // (γ1 γ2)(γ0 γ1) = -γ0 γ2
        assert_eq!(&gamma(4, &[1, 2]) * &gamma(4, &[0, 1]), -gamma(4, &[0, 2]));
        // (γ0 γ1)^2 = -1
        assert_eq!(&gamma(2, &[0, 1]) * &gamma(2, &[0, 1]), -MajoranaOp::identity(2));
    }

    #[test]
    fn termwise_commutation() {
        let a = MajoranaOp::from_modes_in(
            4,
            [vec![0], vec![0, 1]],
            vec![C64::from(1.0); 2],
            HermitianPhase::Apply,
        ).unwrap();
        let b = MajoranaOp::from_modes_in(
            4,
            [vec![1], vec![2, 3], vec![1, 2]],
            vec![C64::from(1.0); 3],
            HermitianPhase::Apply,
        ).unwrap();
        let comm = a.commutes_termwise(&b).unwrap();
        assert!(!comm[(0, 0)]); // γ0, γ1
        assert!(comm[(0, 1)]); // γ0, γ2γ3
        assert!(comm[(0, 2)]); // γ0, γ1γ2
        assert!(!comm[(1, 0)]); // γ0γ1, γ1
        assert!(comm[(1, 1)]); // γ0γ1, γ2γ3
        assert!(!comm[(1, 2)]); // γ0γ1, γ1γ2
        // agrees with the products
        for i in 0..a.n_terms() {
            let ai = MajoranaOp::from_raw_parts(4, vec![a.rows()[i].clone()], vec![C64::from(1.0)]);
            for j in 0..b.n_terms() {
                let bj = MajoranaOp::from_raw_parts(4, vec![b.rows()[j].clone()], vec![C64::from(1.0)]);
                let commutes = &ai * &bj == &bj * &ai;
                assert_eq!(commutes, comm[(i, j)]);
            }
        }
    }

    #[test]
    fn padding() {
        let a = gamma(2, &[0]);
        let b = gamma(4, &[2]);
        let s = &a + &b;
        assert_eq!(s.n_modes(), 4);
        assert_eq!(s.n_terms(), 2);
        let p = &a * &b;
        assert_eq!(p, gamma(4, &[0, 2]));
        assert!(!a.commutes(&b).unwrap());
    }

    #[test]
    fn hermitian_monomials() {
        let a = MajoranaOp::from_modes(
            [vec![0_usize, 1], vec![0, 1, 2], vec![0, 1, 2, 3], vec![3]],
            vec![C64::from(1.0), C64::from(-2.0), C64::from(0.5), C64::from(3.0)],
        ).unwrap();
        assert!(a.is_hermitian());
        assert!(!gamma(2, &[0, 1]).is_hermitian());
        let h = MajoranaOp::hermitian_generator(&BitRow::from_ones(2, [0, 1]));
        assert_eq!(h.coeffs(), &[C64::i()]);
    }

    #[test]
    fn number_operator() {
        // a†_0 a_0 = ½ (1 + i γ0 γ1)
        let n = MajoranaOp::from_ladder_terms(
            1, [(vec![Ladder::Create(0), Ladder::Annihilate(0)], C64::from(1.0))],
        ).unwrap();
        let expected = MajoranaOp::from_modes_in(
            2,
            [vec![], vec![0, 1]],
            vec![C64::from(0.5), C64::new(0.0, 0.5)],
            HermitianPhase::Included,
        ).unwrap();
        assert_eq!(n, expected);
        // {a_0, a†_0} = 1
        let anti = MajoranaOp::from_ladder_terms(
            1,
            [
                (vec![Ladder::Annihilate(0), Ladder::Create(0)], C64::from(1.0)),
                (vec![Ladder::Create(0), Ladder::Annihilate(0)], C64::from(1.0)),
            ],
        ).unwrap();
        assert_eq!(anti, MajoranaOp::identity(2));
        assert!(MajoranaOp::from_ladder_terms(
            1, [(vec![Ladder::Create(1)], C64::from(1.0))]).is_err());
    }

    #[test]
    fn rotation_matches_conjugation() {
        let t = 0.7_f64;
        let p = MajoranaOp::from_modes_in(
            4,
            [vec![0], vec![1, 2]],
            vec![C64::from(1.0), C64::from(0.5)],
            HermitianPhase::Apply,
        ).unwrap();
        let q = MajoranaOp::hermitian_generator(&BitRow::from_ones(4, [1, 3]));
        let u = MajoranaOp::rotation_unitary(&q, t).unwrap();
        let rotated = p.rotate_by(&q, Some(t)).unwrap();
        assert_eq!(p.conjugate_by(&u).unwrap(), rotated);
        assert_eq!(
            p.conjugate_by(&MajoranaOp::rotation_unitary(&q, std::f64::consts::FRAC_PI_2).unwrap())
                .unwrap(),
            p.rotate_by(&q, None).unwrap(),
        );
    }

    #[test]
    fn clifford_rotation_to_pair() {
        // rotating γ0 by the Hermitian γ1 gives -i γ0 γ1, i.e. -(i γ0 γ1)
        let p = gamma(2, &[0]);
        let q = MajoranaOp::hermitian_generator(&BitRow::from_ones(2, [1]));
        let out = p.rotate_by(&q, None).unwrap();
        assert_eq!(out.to_mode_lists(), vec![(vec![0, 1], -C64::i())]);
    }

    #[test]
    fn display() {
        let a = MajoranaOp::from_modes_in(
            4,
            [vec![], vec![0, 3]],
            vec![C64::from(1.0), C64::from(2.0)],
            HermitianPhase::Included,
        ).unwrap();
        assert_eq!(format!("{}", a), "1+0i I +\n2+0i γ0 γ3");
    }
}
