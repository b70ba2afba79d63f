//! Error type shared by every operator and solver in the crate.

use thiserror::Error;

/// Everything that can go wrong when building or combining symplectic
/// operators.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SympError {
    /// A human-readable operator description could not be parsed.
    #[error("malformed operator {input:?}: {reason}")]
    Format { input: String, reason: String },

    /// The number of terms and the number of coefficients differ.
    #[error("{terms} terms were given with {coeffs} coefficients")]
    CoefficientCount { terms: usize, coeffs: usize },

    /// Two operands act on different numbers of qubits (or modes) where the
    /// operation requires them to agree.
    #[error("operands act on {left} and {right} qubits")]
    DimensionMismatch { left: usize, right: usize },

    /// An operand required to be a single term has some other number of
    /// terms.
    #[error("expected a single term, got {0}")]
    NotSingleTerm(usize),

    /// A rotation list and its angle list differ in length.
    #[error("{generators} rotation generators were given with {angles} angles")]
    AngleCount { generators: usize, angles: usize },

    /// Stabilizer coefficients are not all ±1, or the rows are dependent.
    #[error("stabilizer constraint violated: {0}")]
    AlgebraicConstraint(String),

    /// A target row cannot be written as a sum of basis rows.
    #[error("target row {index} is not in the span of the basis")]
    NotInSpan { index: usize },

    /// The reduction could not find a position to pivot on.
    #[error("pivot error: {0}")]
    Pivot(String),

    /// The reduction ended in a state that a valid (independent, commuting)
    /// basis cannot produce.
    #[error("basis reduction failed: {0}")]
    Reduction(String),
}

impl SympError {
    pub(crate) fn format<S, R>(input: S, reason: R) -> Self
    where
        S: Into<String>,
        R: Into<String>,
    {
        Self::Format { input: input.into(), reason: reason.into() }
    }
}

pub type SympResult<T> = Result<T, SympError>;
