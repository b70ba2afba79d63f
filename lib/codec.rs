//! Conversion between human-readable operator labels and symplectic bit rows.
//!
//! A Pauli string on *n* qubits maps to a row of length 2*n*: bit `q` is the X
//! component on qubit `q` and bit `n + q` is the Z component. A Majorana
//! monomial on 2*n* modes maps to a presence mask of length 2*n*.

use std::fmt;
use crate::{
    bits::BitRow,
    error::{ SympError, SympResult },
};

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "I" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Pauli {
    /// Build from the (x, z) components.
    pub fn from_xz(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Self::I,
            (true, false) => Self::X,
            (true, true) => Self::Y,
            (false, true) => Self::Z,
        }
    }

    /// Return the (x, z) components.
    pub fn xz(self) -> (bool, bool) {
        match self {
            Self::I => (false, false),
            Self::X => (true, false),
            Self::Y => (true, true),
            Self::Z => (false, true),
        }
    }

    /// Parse a single character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::I),
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Return the remaining non-identity Pauli when given two distinct
    /// non-identity Paulis, and `None` otherwise.
    pub fn third(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::X, Self::Y) | (Self::Y, Self::X) => Some(Self::Z),
            (Self::Y, Self::Z) | (Self::Z, Self::Y) => Some(Self::X),
            (Self::Z, Self::X) | (Self::X, Self::Z) => Some(Self::Y),
            _ => None,
        }
    }
}

/// Encode a Pauli string of length `n` as a symplectic row.
pub fn encode_pauli(s: &str, n: usize) -> SympResult<BitRow> {
    let len = s.chars().count();
    if len != n {
        return Err(SympError::format(
            s, format!("expected {n} characters, found {len}")));
    }
    let mut row = BitRow::zeros(2 * n);
    for (q, c) in s.chars().enumerate() {
        let p = Pauli::from_char(c)
            .ok_or_else(|| {
                SympError::format(s, format!("unexpected character {c:?}"))
            })?;
        let (x, z) = p.xz();
        row.set(q, x).set(n + q, z);
    }
    Ok(row)
}

/// Return the Pauli at qubit `q` of a symplectic row.
pub fn pauli_at(row: &BitRow, q: usize) -> Pauli {
    let n = row.len() / 2;
    Pauli::from_xz(row.get(q), row.get(n + q))
}

/// Decode a symplectic row into a string with qubit 0 leftmost.
pub fn decode_pauli(row: &BitRow) -> String {
    let n = row.len() / 2;
    (0..n).map(|q| pauli_at(row, q).to_string()).collect()
}

/// Sort a list of Majorana mode indices with a bubble sort, returning the
/// sorted list and the sign `(-1)^swaps` of the reordering.
///
/// Equal elements are never swapped past each other.
pub fn canonical_order(modes: &[usize]) -> (Vec<usize>, i8) {
    let mut arr = modes.to_vec();
    let mut swaps: usize = 0;
    let n = arr.len();
    for i in 0..n.saturating_sub(1) {
        let mut swapped = false;
        for j in 0..n - 1 - i {
            if arr[j] > arr[j + 1] {
                arr.swap(j, j + 1);
                swaps += 1;
                swapped = true;
            }
        }
        if !swapped { break; }
    }
    (arr, if swaps % 2 == 0 { 1 } else { -1 })
}

/// Encode a product of Majorana operators γ<sub>*m*</sub> (in the given order)
/// as a mask over `n_modes` modes, returning the sign picked up by moving the
/// product into ascending order and cancelling repeated modes.
pub fn encode_modes(modes: &[usize], n_modes: usize) -> SympResult<(BitRow, i8)> {
    if let Some(m) = modes.iter().find(|m| **m >= n_modes) {
        return Err(SympError::format(
            format!("{modes:?}"),
            format!("mode {m} out of range for {n_modes} modes"),
        ));
    }
    let (sorted, sign) = canonical_order(modes);
    let mut row = BitRow::zeros(n_modes);
    // γ_j γ_j = 1; toggling drops adjacent equal pairs
    sorted.into_iter().for_each(|m| { row.flip(m); });
    Ok((row, sign))
}

/// Return the active modes of a mask in ascending order.
pub fn decode_modes(row: &BitRow) -> Vec<usize> { row.ones().collect() }

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pauli_encoding() {
        let row = encode_pauli("XYZI", 4).unwrap();
        assert_eq!(row, BitRow::from_ones(8, [0, 1, 5, 6]));
        assert_eq!(decode_pauli(&row), "XYZI");
        assert_eq!(pauli_at(&row, 1), Pauli::Y);
    }

    #[test]
    fn pauli_encoding_errors() {
        assert!(matches!(
            encode_pauli("XYZ", 4), Err(SympError::Format { .. })));
        assert!(matches!(
            encode_pauli("XAZI", 4), Err(SympError::Format { .. })));
    }

    #[test]
    fn pauli_display() {
        assert_eq!(format!("{}", Pauli::I), "I");
        assert_eq!(format!("{:#}", Pauli::I), ".");
        assert_eq!(format!("{:#}", Pauli::Y), "Y");
        assert_eq!(Pauli::X.third(Pauli::Z), Some(Pauli::Y));
        assert_eq!(Pauli::X.third(Pauli::X), None);
    }

    #[test]
    fn bubble_sort_parity() {
        assert_eq!(canonical_order(&[2, 0, 1]), (vec![0, 1, 2], 1));
        assert_eq!(canonical_order(&[1, 0]), (vec![0, 1], -1));
        assert_eq!(canonical_order(&[3, 1, 1]), (vec![1, 1, 3], 1));
        assert_eq!(canonical_order(&[]), (vec![], 1));
        assert_eq!(canonical_order(&[3, 2, 1, 0]), (vec![0, 1, 2, 3], 1));
    }

    #[test]
    fn mode_encoding() {
        // γ1 γ0 = -γ0 γ1
        let (row, sign) = encode_modes(&[1, 0], 4).unwrap();
        assert_eq!(row, BitRow::from_ones(4, [0, 1]));
        assert_eq!(sign, -1);
        // γ2 γ0 γ2 = -γ0 γ2 γ2 = -γ0
        let (row, sign) = encode_modes(&[2, 0, 2], 4).unwrap();
        assert_eq!(decode_modes(&row), vec![0]);
        assert_eq!(sign, -1);
        assert!(encode_modes(&[4], 4).is_err());
    }
}
