//! Fixed-width bit-vectors backing every operator term.
//!
//! Bits are packed into `u32` words, least significant bit first, so that bit
//! `k` lives in word `k >> 5` under the mask `PW[k & 31]`. Storage always holds
//! `floor(len / 32) + 1` words and every bit at or past `len` is kept at zero,
//! which lets equality, hashing, and popcounts work word-by-word.

use std::{ cmp::Ordering, fmt };

pub(crate) const PW: [u32; 32] = [ // PW[i] = 2^i
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608, 16777216,
    33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483648
];

/// A packed vector of `len` bits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitRow {
    len: usize,
    words: Vec<u32>, // size floor(len / 32) + 1
}

impl BitRow {
    /// Create a new all-zero row of `len` bits.
    pub fn zeros(len: usize) -> Self {
        Self { len, words: vec![0; (len >> 5) + 1] }
    }

    /// Create a row from a sequence of bits; the length is the number of items.
    pub fn from_bits<I>(bits: I) -> Self
    where I: IntoIterator<Item = bool>
    {
        let mut words: Vec<u32> = vec![0];
        let mut len: usize = 0;
        for b in bits {
            if len >> 5 == words.len() { words.push(0); }
            if b { words[len >> 5] |= PW[len & 31]; }
            len += 1;
            if len & 31 == 0 { words.push(0); }
        }
        words.truncate((len >> 5) + 1);
        Self { len, words }
    }

    /// Create a row of `len` bits with the given positions set.
    ///
    /// *Panics if any position is out of bounds.*
    pub fn from_ones<I>(len: usize, ones: I) -> Self
    where I: IntoIterator<Item = usize>
    {
        let mut row = Self::zeros(len);
        ones.into_iter().for_each(|k| { row.set(k, true); });
        row
    }

    /// Return the number of bits.
    pub fn len(&self) -> usize { self.len }

    /// Return `true` if the row has no bits at all.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Return `true` if no bit is set.
    pub fn is_zero(&self) -> bool { self.words.iter().all(|w| *w == 0) }

    /// Get the `k`-th bit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn get(&self, k: usize) -> bool {
        assert!(k < self.len, "BitRow::get: index {k} out of bounds");
        self.words[k >> 5] & PW[k & 31] != 0
    }

    /// Set the `k`-th bit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn set(&mut self, k: usize, b: bool) -> &mut Self {
        assert!(k < self.len, "BitRow::set: index {k} out of bounds");
        if b {
            self.words[k >> 5] |= PW[k & 31];
        } else {
            self.words[k >> 5] &= !PW[k & 31];
        }
        self
    }

    /// Flip the `k`-th bit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn flip(&mut self, k: usize) -> &mut Self {
        assert!(k < self.len, "BitRow::flip: index {k} out of bounds");
        self.words[k >> 5] ^= PW[k & 31];
        self
    }

    /// Return the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Return the number of positions set in both `self` and `other`.
    ///
    /// Rows of different length are compared over their common prefix.
    pub fn and_count(&self, other: &Self) -> usize {
        self.words.iter().zip(&other.words)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Return the bitwise AND of `self` and `other`, with the length of
    /// `self`.
    pub fn and(&self, other: &Self) -> Self {
        let mut words = self.words.clone();
        words.iter_mut()
            .zip(other.words.iter().chain(std::iter::repeat(&0)))
            .for_each(|(a, b)| { *a &= b; });
        Self { len: self.len, words }
    }

    /// Return the bitwise XOR of `self` and `other`.
    ///
    /// The shorter row is zero-padded, so the result has the larger length.
    pub fn xor(&self, other: &Self) -> Self {
        let (long, short) =
            if self.len >= other.len { (self, other) } else { (other, self) };
        let mut out = long.clone();
        out.xor_assign(short);
        out
    }

    /// XOR `other` into `self`.
    ///
    /// *Panics if `other` is longer than `self`.*
    pub fn xor_assign(&mut self, other: &Self) -> &mut Self {
        assert!(other.len <= self.len, "BitRow::xor_assign: length mismatch");
        self.words.iter_mut().zip(&other.words)
            .for_each(|(a, b)| { *a ^= b; });
        self
    }

    /// Iterate over all bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|k| self.words[k >> 5] & PW[k & 31] != 0)
    }

    /// Iterate over the positions of set bits, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate()
            .flat_map(|(j5, w)| {
                let mut w = *w;
                std::iter::from_fn(move || {
                    (w != 0).then(|| {
                        let jj = w.trailing_zeros() as usize;
                        w &= w - 1;
                        (j5 << 5) | jj
                    })
                })
            })
    }

    /// Return the bits in `start..end` as a new row.
    ///
    /// *Panics if the range is out of bounds.*
    pub fn slice(&self, start: usize, end: usize) -> Self {
        assert!(start <= end && end <= self.len, "BitRow::slice: bad range");
        Self::from_ones(
            end - start,
            self.ones()
                .skip_while(|k| *k < start)
                .take_while(|k| *k < end)
                .map(|k| k - start),
        )
    }

    /// Return `self` followed by `other`.
    pub fn concat(&self, other: &Self) -> Self {
        Self::from_ones(
            self.len + other.len,
            self.ones().chain(other.ones().map(|k| k + self.len)),
        )
    }

    /// Return `self` zero-extended to `len` bits.
    ///
    /// *Panics if `len` is smaller than the current length.*
    pub fn padded(&self, len: usize) -> Self {
        assert!(len >= self.len, "BitRow::padded: cannot truncate");
        let mut words = self.words.clone();
        words.resize((len >> 5) + 1, 0);
        Self { len, words }
    }

    /// Interpret the row as an unsigned integer with bit 0 as the *most*
    /// significant digit.
    ///
    /// *Panics if the row is longer than 63 bits.*
    pub fn to_index_msb(&self) -> usize {
        assert!(self.len < 64, "BitRow::to_index_msb: row too long");
        self.ones().fold(0_usize, |acc, k| acc | (1 << (self.len - 1 - k)))
    }
}

/// Rows are ordered first by length, then lexicographically by bit with bit 0
/// most significant and a set bit greater than an unset one.
impl Ord for BitRow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len.cmp(&other.len)
            .then_with(|| {
                self.words.iter().zip(&other.words)
                    .find(|(a, b)| a != b)
                    .map(|(a, b)| {
                        let t = (a ^ b).trailing_zeros() as usize;
                        if a & PW[t] != 0 {
                            Ordering::Greater
                        } else {
                            Ordering::Less
                        }
                    })
                    .unwrap_or(Ordering::Equal)
            })
    }
}

impl PartialOrd for BitRow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter()
            .try_for_each(|b| write!(f, "{}", if b { '1' } else { '0' }))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_bits_matches_from_ones() {
        let bits = [true, false, false, true, true];
        assert_eq!(BitRow::from_bits(bits), BitRow::from_ones(5, [0, 3, 4]));
        let long: Vec<bool> = (0..70).map(|k| k % 3 == 0).collect();
        let row = BitRow::from_bits(long.iter().copied());
        assert_eq!(row.len(), 70);
        assert_eq!(row.iter().collect::<Vec<bool>>(), long);
        assert_eq!(row.count_ones(), 24);
    }

    #[test]
    fn exact_word_boundary() {
        let row = BitRow::from_bits(std::iter::repeat(true).take(32));
        assert_eq!(row, BitRow::from_ones(32, 0..32));
        assert_eq!(row.ones().count(), 32);
    }

    #[test]
    fn ones_ascending_across_words() {
        let row = BitRow::from_ones(100, [99, 3, 40, 31, 32]);
        assert_eq!(row.ones().collect::<Vec<usize>>(), vec![3, 31, 32, 40, 99]);
    }

    #[test]
    fn xor_pads_shorter() {
        let a = BitRow::from_ones(4, [0, 1]);
        let b = BitRow::from_ones(6, [1, 5]);
        assert_eq!(a.xor(&b), BitRow::from_ones(6, [0, 5]));
        assert_eq!(b.xor(&a), BitRow::from_ones(6, [0, 5]));
        assert_eq!(a.and_count(&b), 1);
    }

    #[test]
    fn slice_and_concat() {
        let row = BitRow::from_ones(8, [1, 4, 6]);
        let (l, r) = (row.slice(0, 4), row.slice(4, 8));
        assert_eq!(l, BitRow::from_ones(4, [1]));
        assert_eq!(r, BitRow::from_ones(4, [0, 2]));
        assert_eq!(l.concat(&r), row);
    }

    #[test]
    fn ordering_msb_first() {
        let a = BitRow::from_ones(3, [0]); // 100
        let b = BitRow::from_ones(3, [1, 2]); // 011
        assert!(a > b);
        assert!(BitRow::zeros(3) < b);
        assert_eq!(a.to_index_msb(), 4);
        assert_eq!(b.to_index_msb(), 3);
    }
}
