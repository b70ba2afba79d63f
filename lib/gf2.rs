//! Binary linear algebra over GF(2) on lists of [`BitRow`]s.
//!
//! Elimination follows the usual top-to-bottom, left-to-right reduced row
//! echelon procedure: for each column, the first row at or below the current
//! pivot row with a set bit is swapped up and XOR'd into every other row that
//! has the same bit set.

use std::fmt;
use crate::{
    bits::BitRow,
    error::{ SympError, SympResult },
};

/// Dense binary matrix under elimination.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Gf2Matrix {
    ncols: usize,
    rows: Vec<BitRow>,
}

impl Gf2Matrix {
    fn new(rows: Vec<BitRow>, ncols: usize) -> Self {
        let rows = rows.into_iter()
            .map(|r| if r.len() < ncols { r.padded(ncols) } else { r })
            .collect();
        Self { ncols, rows }
    }

    fn row_swap(&mut self, a: usize, b: usize) { self.rows.swap(a, b); }

    // rows[b] ^= rows[a]
    fn row_xor(&mut self, a: usize, b: usize) {
        if a == b { return; }
        if a < b {
            let (top, bot) = self.rows.split_at_mut(b);
            bot[0].xor_assign(&top[a]);
        } else {
            let (top, bot) = self.rows.split_at_mut(a);
            top[b].xor_assign(&bot[0]);
        }
    }

    fn find_first_col(&self, col: usize, row_min: usize) -> Option<usize> {
        (row_min..self.rows.len()).find(|i| self.rows[*i].get(col))
    }

    fn rref(&mut self) -> usize {
        let m = self.rows.len();
        let mut col_min: usize = 0;
        let mut row_min: usize = 0;
        while col_min < self.ncols && row_min < m {
            if let Some(k) = self.find_first_col(col_min, row_min) {
                if k != row_min { self.row_swap(k, row_min); }
                for i in 0..m {
                    if i == row_min { continue; }
                    if self.rows[i].get(col_min) { self.row_xor(row_min, i); }
                }
                row_min += 1;
            }
            col_min += 1;
        }
        row_min
    }
}

impl fmt::Display for Gf2Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            row.iter().try_for_each(|b| {
                write!(f, "{}", if b { '1' } else { '.' })
            })?;
            if i + 1 < self.rows.len() { writeln!(f)?; }
        }
        Ok(())
    }
}

fn width(rows: &[BitRow]) -> usize {
    rows.iter().map(|r| r.len()).max().unwrap_or(0)
}

/// Return the reduced row echelon form of `rows`.
///
/// Rows of differing length are zero-padded to the longest.
pub fn gaussian_eliminate(rows: &[BitRow]) -> Vec<BitRow> {
    let mut mat = Gf2Matrix::new(rows.to_vec(), width(rows));
    mat.rref();
    mat.rows
}

/// Return the dimension of the span of `rows`.
pub fn rank(rows: &[BitRow]) -> usize {
    let mut mat = Gf2Matrix::new(rows.to_vec(), width(rows));
    mat.rref()
}

/// Return `true` if no row of `rows` is a sum of the others. The empty set is
/// independent.
pub fn is_independent(rows: &[BitRow]) -> bool { rank(rows) == rows.len() }

/// Transpose a list of rows viewed as an `rows.len() × n_cols` matrix.
pub fn transpose(rows: &[BitRow], n_cols: usize) -> Vec<BitRow> {
    let mut out: Vec<BitRow> = vec![BitRow::zeros(rows.len()); n_cols];
    for (i, row) in rows.iter().enumerate() {
        row.ones().filter(|j| *j < n_cols).for_each(|j| { out[j].set(i, true); });
    }
    out
}

/// Express each row of `targets` in terms of `basis`.
///
/// Returns one row per target, of length `basis.len()`, whose set bits select
/// the basis rows summing to that target. The result is only meaningful when
/// `basis` is independent and every target lies in its span; see
/// [`reconstruct_checked`] for a variant that verifies this.
pub fn reconstruct(basis: &[BitRow], targets: &[BitRow]) -> Vec<BitRow> {
    let dim = basis.len();
    let n_targets = targets.len();
    let n_cols = width(basis).max(width(targets));
    let stacked: Vec<BitRow> = basis.iter().chain(targets)
        .map(|r| if r.len() < n_cols { r.padded(n_cols) } else { r.clone() })
        .collect();
    let mut mat = Gf2Matrix::new(transpose(&stacked, n_cols), dim + n_targets);
    mat.rref();
    let block: Vec<BitRow> = mat.rows.iter()
        .take(dim)
        .map(|row| row.slice(dim, dim + n_targets))
        .chain(
            std::iter::repeat(BitRow::zeros(n_targets))
                .take(dim.saturating_sub(mat.rows.len()))
        )
        .collect();
    transpose(&block, n_targets)
}

/// Like [`reconstruct`], but fail with [`SympError::NotInSpan`] on the first
/// target that the returned coefficients do not reproduce.
pub fn reconstruct_checked(basis: &[BitRow], targets: &[BitRow])
    -> SympResult<Vec<BitRow>>
{
    let coeffs = reconstruct(basis, targets);
    let n_cols = width(basis).max(width(targets));
    for (index, (target, c)) in targets.iter().zip(&coeffs).enumerate() {
        let recombined = combine(basis, c).padded(n_cols);
        if recombined != target.padded(n_cols) {
            return Err(SympError::NotInSpan { index });
        }
    }
    Ok(coeffs)
}

/// XOR together the rows of `basis` selected by `coefficients`.
pub fn combine(basis: &[BitRow], coefficients: &BitRow) -> BitRow {
    coefficients.ones()
        .filter_map(|k| basis.get(k))
        .fold(BitRow::zeros(width(basis)), |acc, row| acc.xor(row))
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(s: &str) -> BitRow { BitRow::from_bits(s.chars().map(|c| c == '1')) }

    #[test]
    fn rref_small() {
        let rows = vec![row("0110"), row("1100"), row("1010")];
        let rref = gaussian_eliminate(&rows);
        assert_eq!(rref, vec![row("1010"), row("0110"), row("0000")]);
        assert_eq!(rank(&rows), 2);
        assert!(!is_independent(&rows));
        assert!(is_independent(&rows[..2]));
        assert!(is_independent(&[]));
    }

    #[test]
    fn rref_display() {
        let mat = Gf2Matrix::new(vec![row("101"), row("011")], 3);
        assert_eq!(format!("{}", mat), "1.1\n.11");
    }

    #[test]
    fn transpose_shape() {
        let rows = vec![row("110"), row("011")];
        assert_eq!(transpose(&rows, 3), vec![row("10"), row("11"), row("01")]);
    }

    #[test]
    fn reconstruction() {
        let basis = vec![row("1100"), row("0110"), row("0001")];
        let targets = vec![row("1010"), row("0111"), row("0000")];
        let coeffs = reconstruct_checked(&basis, &targets).unwrap();
        assert_eq!(coeffs, vec![row("110"), row("011"), row("000")]);
        for (t, c) in targets.iter().zip(&coeffs) {
            assert_eq!(&combine(&basis, c), t);
        }
    }

    #[test]
    fn reconstruction_out_of_span() {
        let basis = vec![row("1100"), row("0011")];
        let targets = vec![row("1111"), row("1000")];
        assert_eq!(
            reconstruct_checked(&basis, &targets),
            Err(SympError::NotInSpan { index: 1 }),
        );
    }
}
