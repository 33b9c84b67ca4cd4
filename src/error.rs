//! Crate-level error type.

use thiserror::Error;

/// Errors reported by the solver and the cage colorer.
///
/// Construction errors are returned before any matrix state is built,
/// so a failed [`Solver::new`](crate::Solver::new) leaves nothing behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A row referenced a column name that is neither primary nor secondary.
    #[error("unknown column `{0}` in membership row")]
    UnknownColumn(String),

    /// The problem declared no primary columns.
    #[error("no primary columns")]
    EmptyPrimary,

    /// The problem declared no rows.
    #[error("no rows in the membership matrix")]
    EmptyMatrix,

    /// The input graph has no vertex of degree five or less,
    /// which every planar graph must have.
    #[error("graph has no vertex of degree five or less, so it cannot be planar")]
    MustBePlanar,
}
