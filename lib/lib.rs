//! Symplectic representations of Pauli and Majorana operators, and the
//! Clifford-rotation basis reduction built on them.
//!
//! Both operator alphabets are stored as rows of bits with one complex
//! coefficient per row: Pauli strings as *X*/*Z* halves of a length-2*n* row
//! and Majorana monomials as presence masks over the modes. Products,
//! commutation, and rotations by π/2 Clifford generators are carried out
//! exactly on the bit rows, with phases tracked as integer powers of *i*.
//!
//! A commuting, independent set of terms can be mapped term by term onto
//! single-qubit (or single-pair) operators by a short sequence of such
//! rotations; see [`reduce_pauli_basis`], [`reduce_majorana_basis`], and
//! [`StabilizerOp`].

pub mod bits;
pub mod codec;
pub mod error;
pub mod gf2;
pub mod majorana;
pub mod pauli;
pub mod phase;
pub mod rotation;
pub mod stabilizer;
pub mod symplectic;

pub use bits::BitRow;
pub use codec::Pauli;
pub use error::{ SympError, SympResult };
pub use majorana::{ HermitianPhase, Ladder, MajoranaOp };
pub use pauli::PauliOp;
pub use phase::Phase;
pub use rotation::{
    Reduction,
    RotationSequence,
    reduce_majorana_basis,
    reduce_pauli_basis,
};
pub use stabilizer::{ StabilizerOp, TargetSqp };
pub use symplectic::{ EQ_TOLERANCE, SymplecticOp, ZERO_THRESHOLD };
