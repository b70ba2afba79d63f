//! Rotation search reducing an independent, commuting basis onto
//! single-generator terms.
//!
//! Both reductions repeatedly pick a pivot term from a shrinking working set,
//! find a Clifford rotation (or two) mapping it onto a single-qubit Z
//! (Pauli) or a single mode-pair term *i*γ<sub>2*k*</sub>γ<sub>2*k*+1</sub>
//! (Majorana), and apply that rotation to everything still in the working
//! set. Terms that are already single-generator are set aside as they appear.
//! The rotations are recorded so that applying them to the input basis in
//! order reproduces the emitted basis.

use log::debug;
use num_complex::Complex64 as C64;
use rustc_hash::FxHashSet;
use crate::{
    bits::BitRow,
    codec::{ Pauli, pauli_at },
    error::{ SympError, SympResult },
    majorana::MajoranaOp,
    pauli::PauliOp,
    symplectic::SymplecticOp,
};

/// An ordered list of rotation generators and their angles. An angle of
/// `None` stands for the Clifford angle π/2.
#[derive(Clone, Debug)]
pub struct RotationSequence<Op> {
    generators: Vec<Op>,
    angles: Vec<Option<f64>>,
}

impl<Op> Default for RotationSequence<Op> {
    fn default() -> Self { Self { generators: Vec::new(), angles: Vec::new() } }
}

impl<Op> RotationSequence<Op>
where Op: SymplecticOp
{
    /// Create a new, empty sequence.
    pub fn new() -> Self { Self::default() }

    /// Append a rotation.
    pub fn push(&mut self, generator: Op, angle: Option<f64>) -> &mut Self {
        self.generators.push(generator);
        self.angles.push(angle);
        self
    }

    /// Append every rotation of `other`.
    pub fn extend(&mut self, other: Self) -> &mut Self {
        self.generators.extend(other.generators);
        self.angles.extend(other.angles);
        self
    }

    /// Number of rotations.
    pub fn len(&self) -> usize { self.generators.len() }

    /// Return `true` if there are no rotations.
    pub fn is_empty(&self) -> bool { self.generators.is_empty() }

    /// Generators, in order of application.
    pub fn generators(&self) -> &[Op] { &self.generators }

    /// Angles, in order of application.
    pub fn angles(&self) -> &[Option<f64>] { &self.angles }

    /// Iterate over `(generator, angle)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Op, Option<f64>)> + '_ {
        self.generators.iter().zip(self.angles.iter().copied())
    }

    /// Apply all rotations to `op` in order.
    pub fn apply(&self, op: &Op) -> SympResult<Op> {
        op.recursive_rotate(&self.generators, Some(&self.angles))
    }
}

/// Output of a basis reduction.
#[derive(Clone, Debug)]
pub struct Reduction<Op> {
    /// Single-generator terms, in the order they were found.
    pub basis: Op,
    /// Rotations mapping the input basis onto `basis`.
    pub rotations: RotationSequence<Op>,
}

/* Pauli ***********************************************************************/

// qubit supporting a row that is non-identity on exactly one qubit
fn single_qubit_support(row: &BitRow, n: usize) -> Option<usize> {
    let mut support = (0..n).filter(|q| row.get(*q) || row.get(n + *q));
    match (support.next(), support.next()) {
        (Some(q), None) => Some(q),
        _ => None,
    }
}

// pull single-qubit rows out of `work` and into `emitted`
fn strip_single_qubit(
    work: &mut PauliOp,
    emitted: &mut Vec<(BitRow, C64)>,
    used: &mut FxHashSet<usize>,
) -> SympResult<()>
{
    let n = work.n_qubits();
    let mut keep_rows: Vec<BitRow> = Vec::new();
    let mut keep_coeffs: Vec<C64> = Vec::new();
    for (row, c) in work.rows().iter().zip(work.coeffs()) {
        if row.is_zero() {
            return Err(SympError::Reduction(
                "basis term reduced to the identity; terms are dependent".into()));
        }
        match single_qubit_support(row, n) {
            Some(q) => {
                if !used.insert(q) {
                    return Err(SympError::Reduction(format!(
                        "two basis terms reduced onto qubit {q}")));
                }
                debug!("qubit {q} already single: {}", pauli_at(row, q));
                emitted.push((row.clone(), *c));
            },
            None => {
                keep_rows.push(row.clone());
                keep_coeffs.push(*c);
            },
        }
    }
    *work = PauliOp::from_raw_parts(2 * n, keep_rows, keep_coeffs);
    Ok(())
}

/// Find Clifford rotations taking every term of an independent, commuting
/// Pauli basis onto a single-qubit Pauli.
///
/// The pivot at each step is the first term of least weight; its pivot qubit
/// is the unused qubit among its non-identity positions whose column is set
/// in the fewest remaining terms. Terms are rotated onto single-qubit Z's;
/// terms that are single-qubit from the start are emitted as they are.
pub fn reduce_pauli_basis(basis: &PauliOp) -> SympResult<Reduction<PauliOp>> {
    let n = basis.n_qubits();
    let mut work = basis.clone();
    let mut used: FxHashSet<usize> = FxHashSet::default();
    let mut emitted: Vec<(BitRow, C64)> = Vec::new();
    let mut rotations: RotationSequence<PauliOp> = RotationSequence::new();

    loop {
        strip_single_qubit(&mut work, &mut emitted, &mut used)?;
        if work.is_empty() { break; }

        let weights: Vec<usize> = work.rows().iter().map(|r| r.count_ones()).collect();
        let col_sum: Vec<usize>
            = (0..2 * n)
            .map(|c| work.rows().iter().filter(|r| r.get(c)).count())
            .collect();
        let pivot_idx = (0..work.n_terms())
            .min_by_key(|k| (weights[*k], *k))
            .ok_or_else(|| SympError::Pivot("empty working set".into()))?;
        let pivot_row = work.rows()[pivot_idx].clone();
        let pivot_col = pivot_row.ones()
            .filter(|c| !used.contains(&(c % n)))
            .min_by_key(|c| (col_sum[*c], *c))
            .ok_or_else(|| {
                SympError::Pivot(format!(
                    "no unused qubit in the support of term {pivot_idx}"))
            })?;
        let q = pivot_col % n;
        debug!(
            "pivot term {pivot_idx} (weight {}) on qubit {q}",
            weights[pivot_idx],
        );

        let mut pivot = PauliOp::from_raw_parts(
            2 * n, vec![pivot_row.clone()], vec![work.coeffs()[pivot_idx]]);
        let rest_rows: Vec<BitRow>
            = work.rows().iter().enumerate()
            .filter_map(|(k, r)| (k != pivot_idx).then(|| r.clone()))
            .collect();
        let rest_coeffs: Vec<C64>
            = work.coeffs().iter().enumerate()
            .filter_map(|(k, c)| (k != pivot_idx).then_some(*c))
            .collect();
        work = PauliOp::from_raw_parts(2 * n, rest_rows, rest_coeffs);

        match pauli_at(&pivot_row, q) {
            Pauli::I => {
                return Err(SympError::Pivot(format!(
                    "identity at pivot qubit {q}")));
            },
            Pauli::Z => {
                let pre = PauliOp::single(n, q, Pauli::X);
                debug!("pre-rotating by X on qubit {q}");
                work = work.rotate_by(&pre, None)?;
                pivot = pivot.rotate_by(&pre, None)?;
                rotations.push(pre, None);
            },
            Pauli::X | Pauli::Y => { },
        }

        // X <-> Y at the pivot qubit
        let mut gen_row = pivot.rows()[0].clone();
        gen_row.flip(n + q);
        let rot = PauliOp::from_raw_parts(2 * n, vec![gen_row], vec![C64::from(1.0)]);
        work = work.rotate_by(&rot, None)?;
        pivot = pivot.rotate_by(&rot, None)?;
        rotations.push(rot, None);

        let pivot_out = &pivot.rows()[0];
        if single_qubit_support(pivot_out, n) != Some(q) {
            return Err(SympError::Reduction(format!(
                "pivot did not reduce onto qubit {q}")));
        }
        debug!("emitted Z on qubit {q}");
        used.insert(q);
        emitted.push((pivot_out.clone(), pivot.coeffs()[0]));
    }

    let (rows, coeffs): (Vec<BitRow>, Vec<C64>) = emitted.into_iter().unzip();
    Ok(Reduction { basis: PauliOp::from_raw_parts(2 * n, rows, coeffs), rotations })
}

/* Majorana ********************************************************************/

// mode pair supporting a row made of exactly the two modes of one pair
fn single_pair(row: &BitRow) -> Option<usize> {
    let mut modes = row.ones();
    match (modes.next(), modes.next(), modes.next()) {
        (Some(a), Some(b), None) if a % 2 == 0 && b == a + 1 => Some(a / 2),
        _ => None,
    }
}

// pull single-pair rows out of `work` and into `emitted`
fn strip_single_pair(
    work: &mut MajoranaOp,
    emitted: &mut Vec<(BitRow, C64)>,
    used: &mut FxHashSet<usize>,
) -> SympResult<()>
{
    let n_modes = work.n_modes();
    let mut keep_rows: Vec<BitRow> = Vec::new();
    let mut keep_coeffs: Vec<C64> = Vec::new();
    for (row, c) in work.rows().iter().zip(work.coeffs()) {
        if row.is_zero() {
            return Err(SympError::Reduction(
                "basis term reduced to the identity; terms are dependent".into()));
        }
        match single_pair(row) {
            Some(k) => {
                if !used.insert(2 * k) || !used.insert(2 * k + 1) {
                    return Err(SympError::Reduction(format!(
                        "two basis terms reduced onto mode pair {k}")));
                }
                debug!("mode pair {k} already single");
                emitted.push((row.clone(), *c));
            },
            None => {
                keep_rows.push(row.clone());
                keep_coeffs.push(*c);
            },
        }
    }
    *work = MajoranaOp::from_raw_parts(n_modes, keep_rows, keep_coeffs);
    Ok(())
}

/// Find Clifford rotations taking every term of an independent, commuting
/// Majorana basis onto a single mode-pair term *i*γ<sub>2*k*</sub>γ<sub>2*k*+1</sub>.
///
/// The pivot at each step is the first term of greatest weight; its pivot
/// mode is the unused mode among the pairs it touches with the least support,
/// where support counts the remaining terms containing that mode (and is zero
/// for modes the pivot lacks). A pivot holding both modes of its pivot pair
/// *k* is first rotated by the Hermitian γ<sub>0</sub>γ<sub>1</sub>⋯γ<sub>2*k*</sub>.
pub fn reduce_majorana_basis(basis: &MajoranaOp)
    -> SympResult<Reduction<MajoranaOp>>
{
    let n_modes = basis.n_modes();
    let mut work = basis.clone();
    let mut used: FxHashSet<usize> = FxHashSet::default();
    let mut emitted: Vec<(BitRow, C64)> = Vec::new();
    let mut rotations: RotationSequence<MajoranaOp> = RotationSequence::new();

    loop {
        strip_single_pair(&mut work, &mut emitted, &mut used)?;
        if work.is_empty() { break; }

        let weights: Vec<usize> = work.rows().iter().map(|r| r.count_ones()).collect();
        let col_sum: Vec<usize>
            = (0..n_modes)
            .map(|m| work.rows().iter().filter(|r| r.get(m)).count())
            .collect();
        let pivot_idx = (0..work.n_terms())
            .min_by_key(|k| (std::cmp::Reverse(weights[*k]), *k))
            .ok_or_else(|| SympError::Pivot("empty working set".into()))?;
        let pivot_row = work.rows()[pivot_idx].clone();
        let support = |m: usize| if pivot_row.get(m) { col_sum[m] } else { 0 };
        let active_pairs: Vec<usize>
            = (0..n_modes / 2)
            .filter(|k| pivot_row.get(2 * k) || pivot_row.get(2 * k + 1))
            .collect();
        let pivot_mode = active_pairs.iter()
            .flat_map(|k| [2 * k, 2 * k + 1])
            .filter(|m| !used.contains(m))
            .min_by_key(|m| (support(*m), *m))
            .ok_or_else(|| {
                SympError::Pivot(format!(
                    "no unused mode pair in the support of term {pivot_idx}"))
            })?;
        let k = pivot_mode / 2;
        debug!(
            "pivot term {pivot_idx} (weight {}) on mode {pivot_mode}",
            weights[pivot_idx],
        );

        let mut pivot = MajoranaOp::from_raw_parts(
            n_modes, vec![pivot_row.clone()], vec![work.coeffs()[pivot_idx]]);
        let rest_rows: Vec<BitRow>
            = work.rows().iter().enumerate()
            .filter_map(|(j, r)| (j != pivot_idx).then(|| r.clone()))
            .collect();
        let rest_coeffs: Vec<C64>
            = work.coeffs().iter().enumerate()
            .filter_map(|(j, c)| (j != pivot_idx).then_some(*c))
            .collect();
        work = MajoranaOp::from_raw_parts(n_modes, rest_rows, rest_coeffs);

        match (pivot_row.get(2 * k), pivot_row.get(2 * k + 1)) {
            (false, false) => {
                return Err(SympError::Pivot(format!(
                    "identity at pivot mode pair {k}")));
            },
            (true, true) => {
                let pre = MajoranaOp::hermitian_generator(
                    &BitRow::from_ones(n_modes, 0..=2 * k));
                debug!("pre-rotating by γ0..γ{}", 2 * k);
                work = work.rotate_by(&pre, None)?;
                pivot = pivot.rotate_by(&pre, None)?;
                rotations.push(pre, None);
            },
            _ => { },
        }

        let mut gen_row = pivot.rows()[0].clone();
        gen_row.flip(2 * k).flip(2 * k + 1);
        let rot = MajoranaOp::hermitian_generator(&gen_row);
        work = work.rotate_by(&rot, None)?;
        pivot = pivot.rotate_by(&rot, None)?;
        rotations.push(rot, None);

        let pivot_out = &pivot.rows()[0];
        if single_pair(pivot_out) != Some(k) {
            return Err(SympError::Reduction(format!(
                "pivot did not reduce onto mode pair {k}")));
        }
        debug!("emitted mode pair {k}");
        used.insert(2 * k);
        used.insert(2 * k + 1);
        emitted.push((pivot_out.clone(), pivot.coeffs()[0]));
    }

    let (rows, coeffs): (Vec<BitRow>, Vec<C64>) = emitted.into_iter().unzip();
    Ok(Reduction {
        basis: MajoranaOp::from_raw_parts(n_modes, rows, coeffs),
        rotations,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::majorana::HermitianPhase;

    fn op(strings: &[&str]) -> PauliOp {
        PauliOp::from_strings(strings, vec![C64::from(1.0); strings.len()]).unwrap()
    }

    fn is_single_qubit(op: &PauliOp) -> bool {
        op.rows().iter().all(|r| single_qubit_support(r, op.n_qubits()).is_some())
    }

    #[test]
    fn pauli_already_reduced() {
        let basis = op(&["ZII", "IXI"]);
        let red = reduce_pauli_basis(&basis).unwrap();
        assert!(red.rotations.is_empty());
        assert_eq!(red.basis, basis);
    }

    #[test]
    fn pauli_round_trip() {
        let basis = op(&["ZZI", "IZZ", "XXX"]);
        let red = reduce_pauli_basis(&basis).unwrap();
        assert_eq!(red.basis.n_terms(), 3);
        assert!(is_single_qubit(&red.basis));
        let qubits: FxHashSet<usize>
            = red.basis.rows().iter()
            .filter_map(|r| single_qubit_support(r, 3))
            .collect();
        assert_eq!(qubits.len(), 3);
        assert_eq!(red.rotations.apply(&basis).unwrap(), red.basis);
    }

    #[test]
    fn pauli_z_pivot_prerotation() {
        // Z at the pivot qubit needs an extra rotation
        let basis = op(&["ZZ"]);
        let red = reduce_pauli_basis(&basis).unwrap();
        assert!(is_single_qubit(&red.basis));
        assert_eq!(red.rotations.len(), 2);
        assert_eq!(red.rotations.apply(&basis).unwrap(), red.basis);
        for (rot, angle) in red.rotations.iter() {
            assert_eq!(rot.n_terms(), 1);
            assert_eq!(rot.coeffs()[0], C64::from(1.0));
            assert!(angle.is_none());
        }
    }

    #[test]
    fn pauli_errors() {
        // dependent: third is the product of the first two
        let dependent = op(&["ZZI", "IZZ", "ZIZ"]);
        assert!(matches!(
            reduce_pauli_basis(&dependent),
            Err(SympError::Reduction(_)) | Err(SympError::Pivot(_)),
        ));
        // two single-qubit terms on the same qubit
        assert!(matches!(
            reduce_pauli_basis(&op(&["ZI", "XI"])),
            Err(SympError::Reduction(_)),
        ));
        assert!(matches!(
            reduce_pauli_basis(&op(&["II"])),
            Err(SympError::Reduction(_)),
        ));
    }

    #[test]
    fn majorana_round_trip() {
        let basis = MajoranaOp::from_modes_in(
            6,
            [vec![0, 1, 2, 3], vec![2, 3, 4, 5], vec![0, 2, 4]],
            vec![C64::from(1.0); 3],
            HermitianPhase::Apply,
        ).unwrap();
        assert!(basis.commutes(&basis).unwrap());
        let red = reduce_majorana_basis(&basis).unwrap();
        assert_eq!(red.basis.n_terms(), 3);
        assert!(red.basis.rows().iter().all(|r| single_pair(r).is_some()));
        assert_eq!(red.rotations.apply(&basis).unwrap(), red.basis);
    }

    #[test]
    fn majorana_already_reduced() {
        let basis = MajoranaOp::from_modes_in(
            4,
            [vec![0, 1], vec![2, 3]],
            vec![C64::from(1.0); 2],
            HermitianPhase::Apply,
        ).unwrap();
        let red = reduce_majorana_basis(&basis).unwrap();
        assert!(red.rotations.is_empty());
        assert_eq!(red.basis, basis);
    }

    #[test]
    fn majorana_errors() {
        let twice = MajoranaOp::from_modes_in(
            2, [vec![0, 1], vec![0, 1]], vec![C64::from(1.0); 2],
            HermitianPhase::Apply,
        ).unwrap();
        assert!(matches!(
            reduce_majorana_basis(&twice),
            Err(SympError::Reduction(_)),
        ));
    }

    #[test]
    fn sequence_bookkeeping() {
        let mut seq: RotationSequence<PauliOp> = RotationSequence::new();
        seq.push(op(&["ZI"]), None).push(op(&["IX"]), Some(0.5));
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.angles(), &[None, Some(0.5)]);
        let mut other = RotationSequence::new();
        other.push(op(&["XX"]), None);
        seq.extend(other);
        assert_eq!(seq.generators().len(), 3);
        assert_eq!(
            seq.apply(&op(&["XI"])).unwrap(),
            op(&["XI"]).recursive_rotate_by_strings(
                &["ZI", "IX", "XX"], Some(&[None, Some(0.5), None][..])).unwrap(),
        );
    }
}
