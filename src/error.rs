//! Crate-wide error type.
//!
//! Construction and monitorability problems are reported as [`Error`] values;
//! they are never silently repaired. Data-missing conditions during
//! evaluation (an object id absent from a frame, a temporal slice that is
//! too short) are *not* errors and evaluate to `false` instead.

use thiserror::Error;

use crate::analysis::Bound;
use crate::ast::CompareOp;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Equality/inequality requested on a continuous-valued comparison
    /// (probability, area, distance, coordinates, time or frame bounds).
    #[error("cannot use `{op}` to compare {what}: only strict orderings are defined")]
    ContinuousEquality { what: &'static str, op: CompareOp },

    /// An ordering operator requested where only `==`/`!=` make sense
    /// (object identities, object classes).
    #[error("cannot use `{op}` to compare {what}: only `==` and `!=` are defined")]
    UnorderedComparison { what: &'static str, op: CompareOp },

    /// A variadic operator (`And`, `Or`, `Intersect`, `Union`) was given
    /// fewer than two operands.
    #[error("`{op}` needs at least 2 operands, got {found}")]
    TooFewOperands { op: &'static str, found: usize },

    /// A freeze/pin without a time variable and without a frame variable.
    #[error("a pinned frame must freeze a time variable, a frame variable, or both")]
    EmptyPin,

    /// A quantifier with an empty variable list.
    #[error("a quantifier must bind at least one object variable")]
    EmptyQuantifier,

    /// `Previous`/`Next` with a step count of zero.
    #[error("`{op}` requires a step count of at least 1")]
    ZeroStep { op: &'static str },

    /// A frame bound with a negative value.
    #[error("frame bounds must be non-negative, got {0}")]
    NegativeFrameBound(i64),

    /// A frame interval whose lower endpoint exceeds the upper one.
    #[error("frame interval [{lo}, {hi}] is empty")]
    EmptyInterval { lo: u64, hi: u64 },

    /// The formula cannot be monitored online with finite buffers.
    #[error("formula is not online-monitorable (history: {history}, horizon: {horizon})")]
    Unmonitorable { history: Bound, horizon: Bound },

    /// A frame arrived with a smaller frame number than the buffered tail.
    #[error("frames must arrive with non-decreasing frame numbers: got {got} after {last}")]
    OutOfOrderFrame { last: u64, got: u64 },
}
