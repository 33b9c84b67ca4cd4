use idlx::ken;
use idlx::{Error, Mode, Options, Problem, Solver, Status};
use regex::Regex;

fn classic_problem() -> Problem<&'static str> {
    let mut prob = Problem::default();
    prob.add_primaries(["A", "B", "C", "D", "E", "F", "G"]);
    prob.add_row("r1", ["C", "E", "F"]);
    prob.add_row("r2", ["A", "D", "G"]);
    prob.add_row("r3", ["B", "C", "F"]);
    prob.add_row("r4", ["A", "D"]);
    prob.add_row("r5", ["B", "G"]);
    prob.add_row("r6", ["D", "E", "G"]);
    prob
}

/// One `long_0` column of length 1000 with two solving rows, plus a
/// thousand rows that no solution can use.
fn long_column_problem() -> Problem<usize> {
    let mut prob = Problem::default();
    prob.add_primaries(["long_0", "sel"]);
    prob.add_secondary("s");
    prob.add_row(0, ["long_0", "sel"]);
    prob.add_row(1, ["long_0", "sel"]);
    for i in 2..1000 {
        prob.add_row(i, ["long_0"]);
    }
    for i in 1000..2000 {
        prob.add_row(i, ["s"]);
    }
    prob
}

#[test]
fn classic_cover_has_unique_solution() {
    let mut solver = Solver::new(classic_problem(), Options::default()).unwrap();
    let report = solver.solve(Mode::All);

    assert_eq!(report.status, Status::Complete);
    assert_eq!(report.count, 1);
    let mut sol = report.solutions[0].clone();
    sol.sort_unstable();
    assert_eq!(sol, vec![0, 3, 4]);
    assert!(report.updates > 0);
    assert!(report.elapsed_seconds >= 0.0);
}

#[test]
fn unsatisfiable_instance_reports_zero_solutions() {
    let mut prob = Problem::default();
    prob.add_primaries(["A", "B"]);
    prob.add_row("r1", ["A"]);
    prob.add_row("r2", ["A"]);

    let mut solver = Solver::new(prob, Options::default()).unwrap();
    let report = solver.solve(Mode::All);
    assert_eq!(report.status, Status::Complete);
    assert_eq!(report.count, 0);

    // the matrix came back restored: the same instance still solves cleanly
    let again = solver.solve(Mode::All);
    assert_eq!(again.count, 0);
}

#[test]
fn secondary_column_is_used_at_most_once() {
    let mut prob = Problem::default();
    prob.add_primaries(["A", "B"]);
    prob.add_secondary("S");
    prob.add_row("r1", ["A", "S"]);
    prob.add_row("r2", ["B"]);
    prob.add_row("r3", ["A"]);
    prob.add_row("r4", ["B", "S"]);

    let mut solver = Solver::new(prob, Options::default()).unwrap();
    let report = solver.solve(Mode::All);

    assert_eq!(report.solutions, vec![vec![0, 1], vec![2, 1], vec![2, 3]]);
}

#[test]
fn idlx_prunes_useless_rows_and_preserves_solutions() {
    let options = Options {
        long_pattern: Some(Regex::new("^long_").unwrap()),
        long_bound: 50,
        ..Options::default()
    };
    let mut idlx = Solver::new(long_column_problem(), options).unwrap();
    let report = idlx.solve(Mode::All);

    // every row hanging off the secondary column was deleted
    let junk_col = idlx.column_number("s").unwrap();
    assert_eq!(idlx.matrix().size(junk_col), 0);
    // the long column itself is intact
    let long_col = idlx.column_number("long_0").unwrap();
    assert_eq!(idlx.matrix().size(long_col), 1000);

    let mut plain = Solver::new(long_column_problem(), Options::default()).unwrap();
    let plain_report = plain.solve(Mode::All);

    assert_eq!(report.status, Status::Complete);
    assert_eq!(report.solutions, plain_report.solutions);
    assert_eq!(report.solutions, vec![vec![0], vec![1]]);
}

#[test]
fn cancellation_keeps_solutions_found_so_far() {
    // twenty columns with two candidate rows each: 2^20 solutions
    let mut prob = Problem::default();
    prob.add_primaries((0..20).map(|c| format!("c{}", c)));
    for c in 0..20 {
        prob.add_row(2 * c, [format!("c{}", c)]);
        prob.add_row(2 * c + 1, [format!("c{}", c)]);
    }

    let options = Options {
        cancel: Some(Box::new(|stats| stats.solutions >= 1000)),
        ..Options::default()
    };
    let mut solver = Solver::new(prob, options).unwrap();
    let report = solver.solve(Mode::All);

    assert_eq!(report.status, Status::Cancelled);
    assert_eq!(report.count, 1000);

    // the unwound matrix is still consistent: a fresh pass works
    let first = solver.solve(Mode::First);
    assert_eq!(first.status, Status::Complete);
    assert_eq!(first.count, 1);
}

#[test]
fn emission_order_and_updates_are_deterministic() {
    let run = || {
        let mut solver = Solver::new(classic_problem(), Options::default()).unwrap();
        let report = solver.solve(Mode::All);
        (report.solutions, report.updates)
    };
    assert_eq!(run(), run());
}

#[test]
fn construction_never_leaves_a_partial_solver() {
    let mut prob = Problem::default();
    prob.add_primary("A");
    prob.add_row("r1", ["A", "missing"]);
    match Solver::new(prob, Options::default()) {
        Err(Error::UnknownColumn(name)) => assert_eq!(name, "missing"),
        _ => panic!("expected an unknown-column error"),
    }
}

#[test]
fn converted_ken_file_round_trips() {
    let input = "\
dim 3
ADD 6 [ 11 12 13 ]
MUL 12 [ 21 31 32 ]
SUB 1 [ 22 23 ]
NONE 2 [ 33 ]
Solution
 1 2 3
 3 1 2
 2 3 1
";
    let converted = ken::convert(input, "tiny.ken").unwrap();
    let reread = ken::Puzzle::parse(&converted).unwrap();

    assert_eq!(reread.dim, 3);
    assert_eq!(reread.cages.len(), 4);
    assert!(reread.cages.iter().all(|c| c.color.is_some()));
    assert_eq!(reread.value_at(2, 1), 3);

    // writing what was read back yields the same puzzle again
    let twice = ken::convert(&converted, "tiny.ken").unwrap();
    assert_eq!(ken::Puzzle::parse(&twice).unwrap(), reread);
}
