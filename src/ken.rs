//! Reading, coloring, and writing of `.ken` puzzle files.
//!
//! The format is a whitespace-separated token stream; `#` starts a comment
//! that runs to the end of the line:
//!
//! ```text
//! dim <N>
//! <OP> <value> [ <cell>... ] [<color>]
//! ...
//! Solution
//! <N rows of N solution values>
//! ```
//!
//! `<OP>` is one of `ADD SUB MUL DIV NONE`; cells are two-digit `rc` strings
//! with `1 <= r,c <= N` (so `N <= 9`); the trailing color in `0..=5` is what
//! [`Puzzle::color_cages`] computes and [`Puzzle::write`] emits, and is
//! optional on input for files predating the coloring.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use chrono::Utc;
use log::debug;
use thiserror::Error;

use crate::color::six_color;

/// Errors from reading a `.ken` file.
#[derive(Debug, Error)]
pub enum KenError {
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),

    #[error("expected {expected}, found `{found}`")]
    Unexpected { expected: &'static str, found: String },

    #[error("cell `{0}` is not a two-digit rc pair inside the grid")]
    BadCell(String),

    #[error(transparent)]
    Color(#[from] crate::error::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Arithmetic constraint of a cage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    None,
}

impl Op {
    fn from_token(tok: &str) -> Option<Op> {
        match tok {
            "ADD" => Some(Op::Add),
            "SUB" => Some(Op::Sub),
            "MUL" => Some(Op::Mul),
            "DIV" => Some(Op::Div),
            "NONE" => Some(Op::None),
            _ => Option::None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::None => "NONE",
        })
    }
}

/// A group of cells bound by one arithmetic constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cage {
    pub op: Op,
    pub value: u32,
    /// `(row, col)` pairs, 1-based, kept sorted.
    pub cells: Vec<(u8, u8)>,
    /// Display color in `0..=5`, if assigned.
    pub color: Option<u8>,
}

impl Cage {
    pub fn new(op: Op, value: u32, mut cells: Vec<(u8, u8)>) -> Cage {
        cells.sort_unstable();
        Cage { op, value, cells, color: Option::None }
    }
}

/// A parsed `.ken` puzzle: dimension, cages, and the solution grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub dim: usize,
    pub cages: Vec<Cage>,
    /// Solution values, row-major, `dim * dim` entries.
    pub solution: Vec<u8>,
}

impl Puzzle {
    /// Parses the textual format described in the module docs.
    pub fn parse(input: &str) -> Result<Puzzle, KenError> {
        let mut toks = tokens(input).peekable();

        expect(&mut toks, "dim")?;
        let dim = number(&mut toks, "grid dimension")? as usize;
        if !(1..=9).contains(&dim) {
            return Err(KenError::Unexpected {
                expected: "grid dimension in 1..=9",
                found: dim.to_string(),
            });
        }

        let mut cages = Vec::new();
        loop {
            let tok = toks.next().ok_or(KenError::UnexpectedEof("cage or Solution"))?;
            if tok == "Solution" {
                break;
            }
            let op = Op::from_token(tok).ok_or_else(|| KenError::Unexpected {
                expected: "cage operator or Solution",
                found: tok.into(),
            })?;
            let value = number(&mut toks, "cage value")?;
            expect(&mut toks, "[")?;

            let mut cells = Vec::new();
            loop {
                let tok = toks.next().ok_or(KenError::UnexpectedEof("cell or ]"))?;
                if tok == "]" {
                    break;
                }
                cells.push(cell(tok, dim)?);
            }
            if cells.is_empty() {
                return Err(KenError::Unexpected { expected: "at least one cell", found: "]".into() });
            }

            let mut cage = Cage::new(op, value, cells);
            // A numeric token after the bracket is this cage's color; an
            // operator or Solution belongs to what follows.
            if let Some(tok) = toks.peek() {
                if let Ok(color) = tok.parse::<u8>() {
                    if color > 5 {
                        return Err(KenError::Unexpected {
                            expected: "color in 0..=5",
                            found: (*tok).into(),
                        });
                    }
                    cage.color = Some(color);
                    toks.next();
                }
            }
            cages.push(cage);
        }

        let mut solution = Vec::with_capacity(dim * dim);
        for _ in 0..dim * dim {
            solution.push(number(&mut toks, "solution value")? as u8);
        }
        if let Some(extra) = toks.next() {
            return Err(KenError::Unexpected { expected: "end of input", found: extra.into() });
        }

        Ok(Puzzle { dim, cages, solution })
    }

    /// Solution value at `(row, col)`, 1-based.
    pub fn value_at(&self, row: usize, col: usize) -> u8 {
        self.solution[(row - 1) * self.dim + (col - 1)]
    }

    /// Assigns a color in `0..=5` to every cage so that orthogonally
    /// adjacent cages differ.
    ///
    /// Cage adjacency is planar by construction, so the six-coloring cannot
    /// fail on well-formed input.
    pub fn color_cages(&mut self) -> Result<(), KenError> {
        let mut ident = HashMap::new();
        for (idx, cage) in self.cages.iter().enumerate() {
            for &cell in &cage.cells {
                ident.insert(cell, idx);
            }
        }

        let mut adjacency: Vec<Vec<usize>> = vec![vec![]; self.cages.len()];
        for (idx, cage) in self.cages.iter().enumerate() {
            for &(r, c) in &cage.cells {
                for nbr in [(r + 1, c), (r, c + 1), (r - 1, c), (r, c - 1)] {
                    if let Some(&other) = ident.get(&nbr) {
                        if other != idx && !adjacency[idx].contains(&other) {
                            adjacency[idx].push(other);
                        }
                    }
                }
            }
        }

        let colors = six_color(&adjacency)?;
        for (cage, color) in self.cages.iter_mut().zip(colors) {
            cage.color = Some(color);
        }
        Ok(())
    }

    /// Writes the puzzle back out: header comments (name and a UTC
    /// timestamp), `dim`, one cage per line with its color, then the
    /// solution grid as right-justified two-column integers.
    pub fn write(&self, out: &mut impl Write, name: &str) -> io::Result<()> {
        writeln!(out, "# {}", name)?;
        writeln!(out, "# {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out, "dim {}", self.dim)?;
        for cage in &self.cages {
            write!(out, "{} {} [ ", cage.op, cage.value)?;
            for &(r, c) in &cage.cells {
                write!(out, "{}{} ", r, c)?;
            }
            write!(out, "]")?;
            if let Some(color) = cage.color {
                write!(out, " {}", color)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "#")?;
        writeln!(out, "Solution")?;
        for row in self.solution.chunks(self.dim) {
            for &v in row {
                write!(out, "{:2}", v)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Parses an old-format file, colors its cages, and renders the new-format
/// text: the whole job of the converter.
pub fn convert(input: &str, name: &str) -> Result<String, KenError> {
    let mut puzzle = Puzzle::parse(input)?;
    puzzle.color_cages()?;
    debug!("colored {} cages in {}", puzzle.cages.len(), name);

    let mut out = Vec::new();
    puzzle.write(&mut out, name)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn tokens(input: &str) -> impl Iterator<Item = &str> + '_ {
    input
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
}

fn expect<'a>(toks: &mut impl Iterator<Item = &'a str>, word: &'static str) -> Result<(), KenError> {
    match toks.next() {
        Some(tok) if tok == word => Ok(()),
        Some(tok) => Err(KenError::Unexpected { expected: word, found: tok.into() }),
        None => Err(KenError::UnexpectedEof(word)),
    }
}

fn number<'a>(
    toks: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<u32, KenError> {
    let tok = toks.next().ok_or(KenError::UnexpectedEof(what))?;
    tok.parse()
        .map_err(|_| KenError::Unexpected { expected: what, found: tok.into() })
}

fn cell(tok: &str, dim: usize) -> Result<(u8, u8), KenError> {
    let bytes = tok.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(KenError::BadCell(tok.into()));
    }
    let r = (bytes[0] - b'0') as usize;
    let c = (bytes[1] - b'0') as usize;
    if r < 1 || c < 1 || r > dim || c > dim {
        return Err(KenError::BadCell(tok.into()));
    }
    Ok((r as u8, c as u8))
}
