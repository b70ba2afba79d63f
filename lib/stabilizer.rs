//! Independent sets of commuting Pauli strings with ±1 coefficients.
//!
//! A [`StabilizerOp`] can be rotated term by term onto single-qubit Paulis of
//! a chosen type, following the procedure of Lemma A.2 in
//! [Quantum 5, 456 (2021)](https://doi.org/10.22331/q-2021-05-14-456): first
//! the basis reduction of [`reduce_pauli_basis`], which lands every generator
//! on a single-qubit Pauli, then one extra rotation per qubit whose Pauli is
//! not the target.

use std::{ fmt, ops::Deref };
use log::debug;
use num_complex::Complex64 as C64;
use once_cell::sync::OnceCell;
use crate::{
    bits::BitRow,
    codec::{ Pauli, pauli_at },
    error::{ SympError, SympResult },
    gf2,
    pauli::PauliOp,
    rotation::{ RotationSequence, reduce_pauli_basis },
    symplectic::SymplecticOp,
};

/// Single-qubit Pauli that stabilizer generators are finally rotated onto.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum TargetSqp {
    #[default]
    X,
    Z,
}

impl TargetSqp {
    fn pauli(self) -> Pauli {
        match self {
            Self::X => Pauli::X,
            Self::Z => Pauli::Z,
        }
    }
}

/// A Pauli operator whose terms are algebraically independent and whose
/// coefficients are each exactly +1 or −1.
#[derive(Clone, Debug)]
pub struct StabilizerOp {
    op: PauliOp,
    target: TargetSqp,
    rotations: OnceCell<RotationSequence<PauliOp>>,
}

impl StabilizerOp {
    /// Create a new stabilizer set from a Pauli operator.
    ///
    /// Fails with [`SympError::AlgebraicConstraint`] if any coefficient is not
    /// exactly ±1 or if the terms are not independent over GF(2).
    pub fn new(op: PauliOp, target: TargetSqp) -> SympResult<Self> {
        let one = C64::from(1.0);
        if let Some(c) = op.coeffs().iter().find(|c| **c != one && **c != -one) {
            return Err(SympError::AlgebraicConstraint(format!(
                "stabilizer coefficients must be +1 or -1, found {c}")));
        }
        if !gf2::is_independent(op.rows()) {
            return Err(SympError::AlgebraicConstraint(
                "stabilizers are not independent".into()));
        }
        Ok(Self { op, target, rotations: OnceCell::new() })
    }

    /// Create a new stabilizer set from Pauli strings and ±1 coefficients.
    pub fn from_strings<I, S>(strings: I, coeffs: Vec<C64>, target: TargetSqp)
        -> SympResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(PauliOp::from_strings(strings, coeffs)?, target)
    }

    /// Return the target single-qubit Pauli.
    pub fn target(&self) -> TargetSqp { self.target }

    /// Return the underlying Pauli operator.
    pub fn as_pauli(&self) -> &PauliOp { &self.op }

    /// Set each coefficient to the eigenvalue of its term on the computational
    /// basis state `ref_state` (one entry per qubit, nonzero meaning |1⟩), i.e.
    /// (−1)<sup>|*Z* ∧ ref|</sup>.
    pub fn update_sector(&mut self, ref_state: &[u8]) -> SympResult<()> {
        let n = self.op.n_qubits();
        if ref_state.len() != n {
            return Err(SympError::DimensionMismatch {
                left: n,
                right: ref_state.len(),
            });
        }
        let reference = BitRow::from_bits(ref_state.iter().map(|b| *b != 0));
        let coeffs: Vec<C64>
            = self.op.rows().iter()
            .map(|row| {
                let parity = row.slice(n, 2 * n).and_count(&reference);
                if parity % 2 == 0 { C64::from(1.0) } else { C64::from(-1.0) }
            })
            .collect();
        self.op = PauliOp::from_raw_parts(2 * n, self.op.rows().to_vec(), coeffs);
        Ok(())
    }

    /// Return the Clifford rotations mapping each term onto a single-qubit
    /// Pauli of the target type. Computed once and kept.
    pub fn stabilizer_rotations(&self) -> SympResult<&RotationSequence<PauliOp>> {
        self.rotations.get_or_try_init(|| {
            let reduction = reduce_pauli_basis(&self.op)?;
            let mut rotations = reduction.rotations;
            let n = self.op.n_qubits();
            let target = self.target.pauli();
            for row in reduction.basis.rows().iter() {
                let Some(q) = (0..n).find(|q| row.get(*q) || row.get(n + *q))
                else { continue; };
                let sigma = pauli_at(row, q);
                if let Some(third) = sigma.third(target) {
                    debug!("rotating {sigma} on qubit {q} onto {target}");
                    rotations.push(PauliOp::single(n, q, third), None);
                }
            }
            Ok(rotations)
        })
    }

    /// Return the stabilizers rotated onto single-qubit Paulis of the target
    /// type.
    pub fn rotate_onto_single_qubit_paulis(&self) -> SympResult<Self> {
        let rotations = self.stabilizer_rotations()?;
        let rotated = if rotations.is_empty() {
            self.op.clone()
        } else {
            rotations.apply(&self.op)?
        };
        Self::new(rotated, self.target)
    }
}

impl Deref for StabilizerOp {
    type Target = PauliOp;

    fn deref(&self) -> &PauliOp { &self.op }
}

impl fmt::Display for StabilizerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.op, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ones(n: usize) -> Vec<C64> { vec![C64::from(1.0); n] }

    #[test]
    fn constraint_checks() {
        assert!(matches!(
            StabilizerOp::from_strings(["ZZ", "XX"], vec![C64::from(1.0), C64::from(0.5)], TargetSqp::X),
            Err(SympError::AlgebraicConstraint(_)),
        ));
        assert!(matches!(
            StabilizerOp::from_strings(["ZZ"], vec![C64::i()], TargetSqp::X),
            Err(SympError::AlgebraicConstraint(_)),
        ));
        assert!(matches!(
            StabilizerOp::from_strings(["ZZI", "IZZ", "ZIZ"], ones(3), TargetSqp::X),
            Err(SympError::AlgebraicConstraint(_)),
        ));
        assert!(StabilizerOp::from_strings(
            ["ZZI", "IZZ"], vec![C64::from(1.0), C64::from(-1.0)], TargetSqp::X).is_ok());
    }

    #[test]
    fn sector_from_reference_state() {
        let mut stab = StabilizerOp::from_strings(
            ["ZI", "ZZ", "XX"], ones(3), TargetSqp::Z).unwrap();
        stab.update_sector(&[1, 0]).unwrap();
        assert_eq!(
            stab.coeffs(),
            &[C64::from(-1.0), C64::from(-1.0), C64::from(1.0)],
        );
        stab.update_sector(&[1, 1]).unwrap();
        assert_eq!(
            stab.coeffs(),
            &[C64::from(-1.0), C64::from(1.0), C64::from(1.0)],
        );
        assert_eq!(
            stab.update_sector(&[1, 0, 0]).unwrap_err(),
            SympError::DimensionMismatch { left: 2, right: 3 },
        );
    }

    fn check_target(strings: &[&str], target: TargetSqp) {
        let stab = StabilizerOp::from_strings(strings, ones(strings.len()), target)
            .unwrap();
        let rotated = stab.rotate_onto_single_qubit_paulis().unwrap();
        assert_eq!(rotated.n_terms(), strings.len());
        let n = stab.n_qubits();
        let mut qubits: Vec<usize> = Vec::new();
        for row in rotated.rows().iter() {
            let support: Vec<usize>
                = (0..n).filter(|q| row.get(*q) || row.get(n + *q)).collect();
            assert_eq!(support.len(), 1);
            assert_eq!(pauli_at(row, support[0]), target.pauli());
            qubits.push(support[0]);
        }
        qubits.sort();
        qubits.dedup();
        assert_eq!(qubits.len(), strings.len());
        for c in rotated.coeffs().iter() {
            assert!(*c == C64::from(1.0) || *c == C64::from(-1.0));
        }
    }

    #[test]
    fn rotate_onto_x() {
        check_target(&["ZZI", "IZZ"], TargetSqp::X);
        check_target(&["XXXX", "ZZZZ", "YYII"], TargetSqp::X);
    }

    #[test]
    fn rotate_onto_z() {
        check_target(&["ZZI", "IZZ"], TargetSqp::Z);
        check_target(&["YYI", "IYY", "XXX"], TargetSqp::Z);
    }

    #[test]
    fn rotations_are_memoized() {
        let stab = StabilizerOp::from_strings(["XZ", "ZX"], ones(2), TargetSqp::X)
            .unwrap();
        let a = stab.stabilizer_rotations().unwrap() as *const _;
        let b = stab.stabilizer_rotations().unwrap() as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn already_on_target() {
        let stab = StabilizerOp::from_strings(["XI", "IX"], ones(2), TargetSqp::X)
            .unwrap();
        assert!(stab.stabilizer_rotations().unwrap().is_empty());
        let rotated = stab.rotate_onto_single_qubit_paulis().unwrap();
        assert_eq!(*rotated, *stab);
    }
}
