//! Provides a solver that solves a generic [`Problem`], optionally running
//! the iterated dancing links (IDLX) preprocessing pass first.
//!
//! IDLX exists for instances with a few very long columns: covering such a
//! column late in the search causes a great deal of link churn for rows that
//! could never belong to a solution anyway. The driver temporarily seconds
//! the long columns, solves the relaxed problem to learn which rows can
//! participate in any partial solution, permanently deletes the rest,
//! restores the long columns, and then runs the ordinary search on the
//! tightened instance.

use std::collections::HashSet;
use std::time::Instant;

use log::debug;
use regex::Regex;

use crate::dlx::{Callback, Matrix};
use crate::error::Error;
use crate::problem::{Problem, Value};

/// How many solutions to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop at the first solution.
    First,
    /// Enumerate every exact cover.
    All,
}

/// How a solve run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The search space was exhausted (or the first solution found, in
    /// [`Mode::First`]).
    Complete,
    /// The cancellation check fired. Solutions found so far are reported.
    Cancelled,
}

/// Progress snapshot handed to the cancellation check.
#[derive(Debug, Clone, Copy)]
pub struct SearchStats {
    /// Complete solutions recorded in the current pass.
    pub solutions: usize,
    /// Cumulative link updates, the solver's cost metric.
    pub updates: u64,
}

/// A cancellation predicate, invoked at each search step. Returning `true`
/// unwinds the search, restores the matrix, and ends the run with
/// [`Status::Cancelled`].
pub type CancelCheck = Box<dyn FnMut(&SearchStats) -> bool>;

/// Solver configuration.
pub struct Options {
    /// Column-name pattern of the iterated preprocessing pass. Columns whose
    /// name matches it *and* whose length exceeds [`long_bound`] are
    /// temporarily seconded before the main search. `None` disables the
    /// pass. Matching is unanchored; prepend `^` for prefix semantics.
    ///
    /// [`long_bound`]: Options::long_bound
    pub long_pattern: Option<Regex>,
    /// Length a matching column must exceed to count as long.
    pub long_bound: usize,
    /// Optional cancellation check, e.g. a wall-clock budget.
    pub cancel: Option<CancelCheck>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            long_pattern: None,
            long_bound: 42_000,
            cancel: None,
        }
    }
}

/// The outcome of a solve run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Solutions in emission order. Each is the list of chosen row ids
    /// (0-based, in branch order); ids always refer to the rows as
    /// originally added, even after IDLX deletes some.
    pub solutions: Vec<Vec<usize>>,
    /// `solutions.len()`, for convenience.
    pub count: usize,
    /// Wall-clock duration of the run.
    pub elapsed_seconds: f64,
    /// Cumulative link updates over the solver's lifetime.
    pub updates: u64,
    pub status: Status,
}

/// A solver for a [`Problem`] instance.
///
/// Construction validates the problem and builds the sparse matrix; a failed
/// construction leaves nothing behind. IDLX row deletions are permanent
/// within an instance, so re-solving with different preprocessing parameters
/// needs a fresh solver.
pub struct Solver<N: Value> {
    problem: Problem<N>,
    matrix: Matrix,
    col_names: Vec<String>, // 1-based, parallel to matrix columns
    options: Options,
}

impl<N: Value> Solver<N> {
    /// Creates a new solver for `problem`.
    ///
    /// Fails with [`Error::EmptyPrimary`] if the problem has no primary
    /// columns, [`Error::EmptyMatrix`] if it has no rows, and
    /// [`Error::UnknownColumn`] if a row names a column that is neither
    /// primary nor secondary.
    pub fn new(problem: Problem<N>, options: Options) -> Result<Solver<N>, Error> {
        if problem.primary().is_empty() {
            return Err(Error::EmptyPrimary);
        }
        if problem.rows().is_empty() {
            return Err(Error::EmptyMatrix);
        }

        let primary_cnt = problem.primary().len();
        let mut matrix = Matrix::new(primary_cnt, problem.secondary().len());

        for (_, columns) in problem.rows() {
            let mut row = Vec::with_capacity(columns.len());
            for name in columns {
                let col = if let Some(i) = problem.primary().get_index_of(name.as_str()) {
                    i + 1
                } else if let Some(i) = problem.secondary().get_index_of(name.as_str()) {
                    primary_cnt + i + 1
                } else {
                    return Err(Error::UnknownColumn(name.clone()));
                };
                row.push(col);
            }
            matrix.add_row(&row);
        }

        let col_names = std::iter::once(String::new())
            .chain(problem.primary().iter().cloned())
            .chain(problem.secondary().iter().cloned())
            .collect();

        Ok(Solver { problem, matrix, col_names, options })
    }

    /// Runs the search and reports the solutions found.
    ///
    /// If the configured long-column pattern matches nothing (or nothing
    /// long enough), this is a single ordinary search; otherwise the IDLX
    /// preprocessing pass runs first. Either way the solution set is the
    /// same, and two runs on the same input produce identical reports
    /// modulo timing.
    pub fn solve(&mut self, mode: Mode) -> Report {
        let start = Instant::now();

        let long_cols = self.long_columns();
        if !long_cols.is_empty() {
            debug!(
                "idlx: seconding {} long columns (bound {})",
                long_cols.len(),
                self.options.long_bound
            );
            for &col in &long_cols {
                self.matrix.cover2(col);
            }

            let mut pass = Collector::new(false, self.options.cancel.as_mut());
            self.matrix.solve(&mut pass);
            let Collector { solutions: partials, cancelled: pass_cancelled, .. } = pass;

            // Put the matrix back in its original condition.
            for &col in long_cols.iter().rev() {
                self.matrix.uncover2(col);
            }
            let blocked: HashSet<usize> = self.matrix.take_blocked().into_iter().collect();
            self.matrix.unsecond();

            if pass_cancelled {
                // Partial solutions of the relaxed problem are not
                // solutions of the instance; report none.
                return Report {
                    solutions: vec![],
                    count: 0,
                    elapsed_seconds: start.elapsed().as_secs_f64(),
                    updates: self.matrix.updates(),
                    status: Status::Cancelled,
                };
            }

            // Delete the useless rows: neither part of any partial solution
            // nor blocked out of the relaxed problem.
            let good: HashSet<usize> = partials.iter().flatten().copied().collect();
            let mut deleted = 0;
            for row in 1..=self.matrix.row_count() {
                if !good.contains(&row) && !blocked.contains(&row) {
                    self.matrix.delete_row(row);
                    deleted += 1;
                }
            }
            debug!("idlx: deleted {} of {} rows", deleted, self.matrix.row_count());
        }

        let mut main = Collector::new(mode == Mode::First, self.options.cancel.as_mut());
        self.matrix.solve(&mut main);
        let cancelled = main.cancelled;

        let solutions: Vec<Vec<usize>> = main
            .solutions
            .into_iter()
            .map(|sol| sol.into_iter().map(|r| r - 1).collect())
            .collect();

        Report {
            count: solutions.len(),
            solutions,
            elapsed_seconds: start.elapsed().as_secs_f64(),
            updates: self.matrix.updates(),
            status: if cancelled { Status::Cancelled } else { Status::Complete },
        }
    }

    /// Maps a solution's row ids back to the caller's symbolic row tags.
    pub fn row_names(&self, solution: &[usize]) -> Vec<N> {
        solution.iter().map(|&r| self.problem.rows()[r].0.clone()).collect()
    }

    /// The column number a name maps to, if any. Numbers index into the
    /// low-level [`matrix`](Solver::matrix).
    pub fn column_number(&self, name: &str) -> Option<usize> {
        self.col_names.iter().position(|n| n == name).filter(|&i| i > 0)
    }

    /// Read access to the underlying matrix, mainly for inspection.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Columns eligible for the preprocessing pass: name matches the pattern
    /// and length exceeds the bound. Scanned in column order, so the result
    /// is deterministic.
    fn long_columns(&self) -> Vec<usize> {
        let Some(pattern) = &self.options.long_pattern else {
            return vec![];
        };
        (1..self.col_names.len())
            .filter(|&c| {
                pattern.is_match(&self.col_names[c]) && self.matrix.size(c) > self.options.long_bound
            })
            .collect()
    }
}

/// Collects solutions for one search pass, stopping early in first-only
/// mode and driving the cancellation check.
struct Collector<'a> {
    solutions: Vec<Vec<usize>>,
    first_only: bool,
    cancel: Option<&'a mut CancelCheck>,
    cancelled: bool,
}

impl<'a> Collector<'a> {
    fn new(first_only: bool, cancel: Option<&'a mut CancelCheck>) -> Collector<'a> {
        Collector {
            solutions: vec![],
            first_only,
            cancel,
            cancelled: false,
        }
    }
}

impl Callback for Collector<'_> {
    fn on_solution(&mut self, sol: Vec<usize>, mat: &mut Matrix) {
        self.solutions.push(sol);
        if self.first_only {
            mat.abort();
        }
    }

    fn on_step(&mut self, mat: &mut Matrix) {
        if let Some(check) = self.cancel.as_mut() {
            let stats = SearchStats {
                solutions: self.solutions.len(),
                updates: mat.updates(),
            };
            if check(&stats) {
                self.cancelled = true;
                mat.abort();
            }
        }
    }
}
