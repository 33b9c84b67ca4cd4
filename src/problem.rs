//! Provides a generic problem type that defines columns and membership rows.
//!
//! A complex exact cover problem (a puzzle, a packing, a scheduling instance)
//! first generates this basic [`Problem`] instance before handing it to a
//! [`Solver`](crate::Solver).

use std::hash::Hash;
use indexmap::IndexSet;

/// Base trait for row tags.
pub trait Value: Clone + Hash + Eq {}
impl<T: Clone + Hash + Eq> Value for T {}

/// An exact cover problem instance.
///
/// Columns are identified by name. *Primary* columns must be covered exactly
/// once in any solution; *secondary* columns at most once. Each row names the
/// columns it has a 1 in and carries a caller-supplied tag of type `N`,
/// echoed back at the reporting boundary.
///
/// # Ordering
///
/// The order of columns and rows is the insertion order ([`IndexSet`] keeps
/// track of it), and it determines the order in which solutions are emitted.
/// Column names are expected to be unique; re-adding a name is a no-op.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct Problem<N: Value> {
    primary: IndexSet<String>,
    secondary: IndexSet<String>,
    rows: Vec<(N, Vec<String>)>,
}

impl<N: Value> Default for Problem<N> {
    fn default() -> Problem<N> {
        Problem {
            primary: Default::default(),
            secondary: Default::default(),
            rows: Default::default(),
        }
    }
}

impl<N: Value> Problem<N> {
    /// Returns the primary column names, in insertion order.
    pub fn primary(&self) -> &IndexSet<String> { &self.primary }
    /// Returns the secondary column names, in insertion order.
    pub fn secondary(&self) -> &IndexSet<String> { &self.secondary }
    /// Returns the rows: tag plus member column names.
    pub fn rows(&self) -> &[(N, Vec<String>)] { &self.rows }

    /// Adds a primary column.
    pub fn add_primary(&mut self, name: impl Into<String>) {
        self.primary.insert(name.into());
    }

    /// Adds several primary columns.
    pub fn add_primaries<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for name in names {
            self.add_primary(name);
        }
    }

    /// Adds a secondary column.
    pub fn add_secondary(&mut self, name: impl Into<String>) {
        self.secondary.insert(name.into());
    }

    /// Adds several secondary columns.
    pub fn add_secondaries<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for name in names {
            self.add_secondary(name);
        }
    }

    /// Adds a row: the names of the columns it covers, plus a tag.
    ///
    /// Panics if `columns` is empty; membership rows must cover something.
    pub fn add_row<I>(&mut self, tag: N, columns: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        assert!(!columns.is_empty(), "a row must name at least one column");
        self.rows.push((tag, columns));
    }
}
