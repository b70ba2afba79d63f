//! Linear combinations of Pauli strings in the symplectic representation.
//!
//! Each term is a row of length 2*n* holding the X components of the string
//! in bits `0..n` and the Z components in bits `n..2n`; a Y is both. Products
//! carry their phase exactly, following
//!
//! ```text
//! P_a P_b = (-1)^{|X_a ∧ Z_b|} (-i)^{Y_a + Y_b} i^{Y_{a⊕b}} P_{a⊕b}
//! ```
//!
//! where *Y* counts the positions holding a Y. See e.g.
//! [arXiv:quant-ph/0406196](https://arxiv.org/abs/quant-ph/0406196) for the
//! underlying tableau picture.

use std::{ collections::BTreeMap, fmt };
use itertools::Itertools;
use nalgebra as na;
use nalgebra_sparse::{ CooMatrix, CsrMatrix };
use num_complex::Complex64 as C64;
use once_cell::sync::{ Lazy, OnceCell };
use crate::{
    bits::BitRow,
    codec::{ Pauli, decode_pauli, encode_pauli, pauli_at },
    error::{ SympError, SympResult },
    gf2,
    phase::Phase,
    symplectic::{ SymplecticOp, impl_symplectic_arith },
};

/// A single-qubit identity matrix.
pub static PAULI_I: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| na::DMatrix::identity(2, 2));

/// A single-qubit Pauli *X* matrix.
pub static PAULI_X: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| {
        let mut x = na::DMatrix::zeros(2, 2);
        x[(0, 1)] = C64::from(1.0);
        x[(1, 0)] = C64::from(1.0);
        x
    });

/// A single-qubit Pauli *Y* matrix.
pub static PAULI_Y: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| {
        let mut y = na::DMatrix::zeros(2, 2);
        y[(0, 1)] = -C64::i();
        y[(1, 0)] =  C64::i();
        y
    });

/// A single-qubit Pauli *Z* matrix.
pub static PAULI_Z: Lazy<na::DMatrix<C64>> =
    Lazy::new(|| {
        let mut z = na::DMatrix::zeros(2, 2);
        z[(0, 0)] = C64::from( 1.0);
        z[(1, 1)] = C64::from(-1.0);
        z
    });

// number of Y's in a symplectic row
fn y_weight(row: &BitRow) -> usize {
    let n = row.len() / 2;
    row.slice(0, n).and_count(&row.slice(n, 2 * n))
}

// exchange the X and Z blocks of a symplectic row
fn swap_xz(row: &BitRow) -> BitRow {
    let n = row.len() / 2;
    row.slice(n, 2 * n).concat(&row.slice(0, n))
}

/// A linear combination of *n*-qubit Pauli strings.
///
/// Derived data (Y counts, the adjacency matrix, and the dictionary form) is
/// computed on first use and kept for the lifetime of the value.
#[derive(Clone, Debug)]
pub struct PauliOp {
    n: usize,
    rows: Vec<BitRow>,
    coeffs: Vec<C64>,
    y_count: OnceCell<Vec<usize>>,
    adjacency: OnceCell<na::DMatrix<bool>>,
    dictionary: OnceCell<BTreeMap<String, C64>>,
}

impl PauliOp {
    fn new_unchecked(n: usize, rows: Vec<BitRow>, coeffs: Vec<C64>) -> Self {
        Self {
            n,
            rows,
            coeffs,
            y_count: OnceCell::new(),
            adjacency: OnceCell::new(),
            dictionary: OnceCell::new(),
        }
    }

    /// Create a new operator on `n` qubits from symplectic rows of length
    /// 2`n` and their coefficients.
    pub fn from_rows(n: usize, rows: Vec<BitRow>, coeffs: Vec<C64>)
        -> SympResult<Self>
    {
        if rows.len() != coeffs.len() {
            return Err(SympError::CoefficientCount {
                terms: rows.len(),
                coeffs: coeffs.len(),
            });
        }
        if let Some(row) = rows.iter().find(|r| r.len() != 2 * n) {
            return Err(SympError::DimensionMismatch {
                left: n,
                right: row.len() / 2,
            });
        }
        Ok(Self::new_unchecked(n, rows, coeffs))
    }

    /// Create a new operator from Pauli strings (`I`, `X`, `Y`, `Z`, qubit 0
    /// leftmost). The number of qubits is the length of the first string.
    pub fn from_strings<I, S>(strings: I, coeffs: Vec<C64>) -> SympResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut n: Option<usize> = None;
        let rows: Vec<BitRow>
            = strings.into_iter()
            .map(|s| {
                let s = s.as_ref();
                let n = *n.get_or_insert_with(|| s.chars().count());
                encode_pauli(s, n)
            })
            .collect::<SympResult<_>>()?;
        let n = n.ok_or_else(|| {
            SympError::format("", "cannot infer the number of qubits from no terms")
        })?;
        Self::from_rows(n, rows, coeffs)
    }

    /// Create a new operator from `(string, coefficient)` pairs.
    pub fn from_dict<I, S>(terms: I) -> SympResult<Self>
    where
        I: IntoIterator<Item = (S, C64)>,
        S: AsRef<str>,
    {
        let (strings, coeffs): (Vec<S>, Vec<C64>) = terms.into_iter().unzip();
        Self::from_strings(strings, coeffs)
    }

    /// Create a new operator from a 0/1 matrix whose rows are symplectic
    /// vectors.
    pub fn from_symplectic(matrix: &na::DMatrix<u8>, coeffs: Vec<C64>)
        -> SympResult<Self>
    {
        if matrix.ncols() % 2 != 0 {
            return Err(SympError::format(
                format!("{}x{} matrix", matrix.nrows(), matrix.ncols()),
                "symplectic matrix must have an even number of columns",
            ));
        }
        if let Some(v) = matrix.iter().find(|v| **v > 1) {
            return Err(SympError::format(
                format!("{}x{} matrix", matrix.nrows(), matrix.ncols()),
                format!("symplectic matrix entries must be 0 or 1, found {v}"),
            ));
        }
        let rows: Vec<BitRow>
            = matrix.row_iter()
            .map(|r| BitRow::from_bits(r.iter().map(|v| *v == 1)))
            .collect();
        Self::from_rows(matrix.ncols() / 2, rows, coeffs)
    }

    /// The identity on `n` qubits with coefficient 1.
    pub fn identity(n: usize) -> Self {
        Self::new_unchecked(n, vec![BitRow::zeros(2 * n)], vec![C64::from(1.0)])
    }

    /// The operator on `n` qubits with no terms.
    pub fn empty(n: usize) -> Self {
        Self::new_unchecked(n, Vec::new(), Vec::new())
    }

    /// A single Pauli on qubit `q` of an `n`-qubit register, coefficient 1.
    ///
    /// *Panics if `q >= n`.*
    pub fn single(n: usize, q: usize, pauli: Pauli) -> Self {
        let mut row = BitRow::zeros(2 * n);
        let (x, z) = pauli.xz();
        row.set(q, x).set(n + q, z);
        Self::new_unchecked(n, vec![row], vec![C64::from(1.0)])
    }

    /// Return the number of qubits.
    pub fn n_qubits(&self) -> usize { self.n }

    /// Return the rows as a 0/1 matrix.
    pub fn symp_matrix(&self) -> na::DMatrix<u8> {
        na::DMatrix::from_fn(
            self.rows.len(), 2 * self.n, |i, j| self.rows[i].get(j) as u8)
    }

    /// Return the `k`-th term as its own operator.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn term(&self, k: usize) -> Self {
        Self::new_unchecked(
            self.n, vec![self.rows[k].clone()], vec![self.coeffs[k]])
    }

    /// Iterate over all terms as single-term operators.
    pub fn terms(&self) -> impl Iterator<Item = Self> + '_ {
        (0..self.rows.len()).map(|k| self.term(k))
    }

    /// Return the number of Y's in each term.
    pub fn y_count(&self) -> &[usize] {
        self.y_count.get_or_init(|| self.rows.iter().map(y_weight).collect())
    }

    /// Return `true` if two single terms commute qubit-wise, i.e. they agree on
    /// every qubit where neither is the identity.
    pub fn qwc(&self, other: &Self) -> SympResult<bool> {
        if self.n_terms() != 1 { return Err(SympError::NotSingleTerm(self.n_terms())); }
        if other.n_terms() != 1 { return Err(SympError::NotSingleTerm(other.n_terms())); }
        self.check_dims(other)?;
        let (a, b) = (&self.rows[0], &other.rows[0]);
        Ok(
            (0..self.n).all(|q| {
                match (pauli_at(a, q), pauli_at(b, q)) {
                    (Pauli::I, _) | (_, Pauli::I) => true,
                    (pa, pb) => pa == pb,
                }
            })
        )
    }

    /// Express every term of `self` as a sum over the rows of `basis`,
    /// returning one selector row of length `basis.n_terms()` per term.
    pub fn basis_reconstruction(&self, basis: &Self) -> SympResult<Vec<BitRow>> {
        self.check_dims(basis)?;
        gf2::reconstruct_checked(&basis.rows, &self.rows)
    }

    /// [`recursive_rotate`][SymplecticOp::recursive_rotate] with generators
    /// given as Pauli strings.
    pub fn recursive_rotate_by_strings<S>(
        &self,
        generators: &[S],
        angles: Option<&[Option<f64>]>,
    ) -> SympResult<Self>
    where S: AsRef<str>
    {
        let generators: Vec<Self>
            = generators.iter()
            .map(|s| Self::from_strings([s.as_ref()], vec![C64::from(1.0)]))
            .collect::<SympResult<_>>()?;
        self.recursive_rotate(&generators, angles)
    }

    /// Return the cleaned-up operator as a map from Pauli strings to
    /// coefficients.
    pub fn to_dictionary(&self) -> &BTreeMap<String, C64> {
        self.dictionary.get_or_init(|| {
            let clean = self.cleanup();
            clean.rows.iter().map(decode_pauli)
                .zip(clean.coeffs.iter().copied())
                .collect()
        })
    }

    /// Return each term as a sparse label listing only the non-identity
    /// positions, e.g. `"X0 Z3"`. The identity is labeled `""`.
    pub fn to_labels(&self) -> Vec<(String, C64)> {
        self.rows.iter().zip(&self.coeffs)
            .map(|(row, c)| {
                let label
                    = (0..self.n)
                    .filter_map(|q| {
                        let p = pauli_at(row, q);
                        (p != Pauli::I).then(|| format!("{p}{q}"))
                    })
                    .join(" ");
                (label, *c)
            })
            .collect()
    }

    // nonzero entries of the 2^n × 2^n matrix of a single term
    fn term_entries(&self, row: &BitRow, c: C64)
        -> impl Iterator<Item = (usize, usize, C64)>
    {
        let x_int = row.slice(0, self.n).to_index_msb();
        let z_int = row.slice(self.n, 2 * self.n).to_index_msb();
        // (-i)^Y
        let coeff = Phase::from_int(-((y_weight(row) % 4) as i8)).apply(c);
        (0..1_usize << self.n)
            .map(move |i| {
                let sign = Phase::sign((i & z_int).count_ones() as usize);
                (i, i ^ x_int, sign.apply(coeff))
            })
    }

    /// Return the 2<sup>*n*</sup> × 2<sup>*n*</sup> matrix of `self` in
    /// compressed sparse row form, with qubit 0 as the most significant bit of
    /// the basis index.
    ///
    /// *Panics if `self` acts on 64 or more qubits.*
    pub fn to_sparse_matrix(&self) -> CsrMatrix<C64> {
        let dim = 1_usize << self.n;
        let mut coo: CooMatrix<C64> = CooMatrix::new(dim, dim);
        for (row, c) in self.rows.iter().zip(&self.coeffs) {
            self.term_entries(row, *c)
                .for_each(|(i, j, v)| { coo.push(i, j, v); });
        }
        CsrMatrix::from(&coo)
    }

    /// Return the dense 2<sup>*n*</sup> × 2<sup>*n*</sup> matrix of `self`,
    /// with qubit 0 as the leftmost tensor factor.
    pub fn to_matrix(&self) -> na::DMatrix<C64> {
        let dim = 1_usize << self.n;
        let mut acc: na::DMatrix<C64> = na::DMatrix::zeros(dim, dim);
        let mut row_acc: na::DMatrix<C64>;
        for (row, c) in self.rows.iter().zip(&self.coeffs) {
            row_acc = na::DMatrix::from_diagonal_element(1, 1, *c);
            for q in 0..self.n {
                let p: &na::DMatrix<C64> =
                    match pauli_at(row, q) {
                        Pauli::I => Lazy::force(&PAULI_I),
                        Pauli::X => Lazy::force(&PAULI_X),
                        Pauli::Y => Lazy::force(&PAULI_Y),
                        Pauli::Z => Lazy::force(&PAULI_Z),
                    };
                row_acc = row_acc.kronecker(p);
            }
            acc += &row_acc;
        }
        acc
    }
}

impl SymplecticOp for PauliOp {
    fn width(&self) -> usize { 2 * self.n }

    fn rows(&self) -> &[BitRow] { &self.rows }

    fn coeffs(&self) -> &[C64] { &self.coeffs }

    fn from_raw_parts(width: usize, rows: Vec<BitRow>, coeffs: Vec<C64>)
        -> Self
    {
        assert_eq!(rows.len(), coeffs.len(), "PauliOp: rows and coefficients differ in number");
        debug_assert!(rows.iter().all(|r| r.len() == width));
        Self::new_unchecked(width / 2, rows, coeffs)
    }

    fn term_product(a: &BitRow, b: &BitRow) -> (BitRow, Phase) {
        let n = a.len() / 2;
        let xa_zb = a.slice(0, n).and_count(&b.slice(n, 2 * n));
        let row = a.xor(b);
        let k = 2 * xa_zb + 3 * (y_weight(a) + y_weight(b)) + y_weight(&row);
        (row, Phase::from_int((k % 4) as i8))
    }

    fn term_commutes(a: &BitRow, b: &BitRow) -> bool {
        a.and_count(&swap_xz(b)) % 2 == 0
    }

    fn generator_phase(_row: &BitRow) -> Phase { Phase::Pi0 }

    fn dagger(&self) -> Self {
        Self::new_unchecked(
            self.n,
            self.rows.clone(),
            self.coeffs.iter().map(|c| c.conj()).collect(),
        )
    }

    fn check_dims(&self, other: &Self) -> SympResult<()> {
        if self.n == other.n {
            Ok(())
        } else {
            Err(SympError::DimensionMismatch { left: self.n, right: other.n })
        }
    }

    fn adjacency(&self) -> na::DMatrix<bool> {
        self.adjacency.get_or_init(|| {
            na::DMatrix::from_fn(
                self.rows.len(),
                self.rows.len(),
                |i, j| Self::term_commutes(&self.rows[i], &self.rows[j]),
            )
        })
        .clone()
    }
}

impl_symplectic_arith!(PauliOp);

impl fmt::Display for PauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.rows.len();
        for (k, (row, c)) in self.rows.iter().zip(&self.coeffs).enumerate() {
            write!(f, "{} {}", c, decode_pauli(row))?;
            if k + 1 < n { writeln!(f, " +")?; }
        }
        Ok(())
    }
}
