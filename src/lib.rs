//! [Exact cover] solver library using Knuth's [dancing links (DLX)] algorithm,
//! with support for secondary columns and an iterated preprocessing pass (IDLX).
//!
//! [exact cover]: https://en.wikipedia.org/wiki/Exact_cover
//! [dancing links (DLX)]: https://en.wikipedia.org/wiki/Dancing_Links
//!
//! # Concept
//!
//! Many puzzle-like problems, such as polyomino packing, Sudoku, or KenKen,
//! can be modeled as exact cover problems: find a set of rows of a 0/1
//! matrix so that every *primary* column contains a 1 in exactly one chosen
//! row (and every *secondary* column in at most one). This library provides
//! an efficient solver for the generic problem, so that you can model your
//! own problem, solve it, and analyze the solutions in code.
//!
//! On instances with a few very long columns, the solver can optionally run
//! the iterated preprocessing pass first: the long columns are temporarily
//! demoted to secondary, the relaxed problem reveals which rows can take
//! part in any solution, the rest are deleted, and the ordinary search then
//! runs on the tightened instance. See [`Options::long_pattern`].
//!
//! # Basic example
//!
//! ```
//! use idlx::{Mode, Options, Problem, Solver};
//!
//! let mut prob = Problem::default();
//! prob.add_primaries(["A", "B", "C", "D", "E", "F", "G"]);
//! prob.add_row("r1", ["C", "E", "F"]);
//! prob.add_row("r2", ["A", "D", "G"]);
//! prob.add_row("r3", ["B", "C", "F"]);
//! prob.add_row("r4", ["A", "D"]);
//! prob.add_row("r5", ["B", "G"]);
//! prob.add_row("r6", ["D", "E", "G"]);
//!
//! let mut solver = Solver::new(prob, Options::default()).unwrap();
//! let report = solver.solve(Mode::All);
//!
//! assert_eq!(report.count, 1);
//! let mut names = solver.row_names(&report.solutions[0]);
//! names.sort();
//! assert_eq!(names, vec!["r1", "r4", "r5"]);
//! ```
//!
//! The crate also ships the planar six-coloring used to render puzzle cages
//! ([`color`]) and the `.ken` puzzle file converter built on it ([`ken`]).

pub mod color;
pub mod dlx;
pub mod error;
pub mod ken;
pub mod problem;
pub mod solver;

pub use error::Error;
pub use problem::Problem;
pub use solver::{Mode, Options, Report, Solver, Status};
