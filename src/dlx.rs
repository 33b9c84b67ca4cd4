//! A low-level API for the dancing links (DLX) algorithm and the primitives
//! behind its iterated variant (IDLX).
//!
//! Columns and rows are plain numbers here. If you are looking for a
//! named-column [`Problem`](crate::problem::Problem) solver API,
//! see the [`solver`](crate::solver) module.

/// A single node of [`Matrix`]: one nonzero entry of the membership matrix.
///
/// All four lists are circular in both directions; a node whose links point
/// to itself is detached.
#[derive(Default)]
#[cfg_attr(test, derive(Debug, Clone, PartialEq, Eq))]
struct Node {
    // row, col: 1-based b/c of the root and head nodes (only internally)
    row: usize,
    col: usize,
    left: usize,
    right: usize,
    up: usize,
    down: usize,
}

/// An undo record for a column temporarily demoted to secondary by
/// [`Matrix::cover2`]. Holds the neighbors the column had in the header list.
#[cfg_attr(test, derive(Debug))]
struct Seconded {
    col: usize,
    left: usize,
    right: usize,
}

/// A sparse matrix representation of an exact cover problem.
///
/// The node pool is an arena: the root lives at index 0, column head nodes at
/// `1..=col_cnt` (primary columns first), and body nodes follow in row-major
/// order. Nothing is ever freed individually; the arena goes away with the
/// matrix.
#[cfg_attr(test, derive(Debug))]
pub struct Matrix {
    row_cnt: usize,
    col_cnt: usize,
    primary_cnt: usize,
    pool: Vec<Node>,
    col_size: Vec<usize>,
    seconded: Vec<bool>,
    row_head: Vec<usize>, // first pool node of each row

    updates: u64,
    partial_sol: Vec<usize>,
    abort_requested: bool,

    // undo state for one IDLX preprocessing pass
    second_stack: Vec<Seconded>,
    blocked: Vec<usize>,
}

/// An interface of callback objects to pass to the search.
///
/// `on_step` runs once per search step, before anything is covered at that
/// level; it is the place to call [`Matrix::abort`] to cancel. Aborting
/// unwinds the search, uncovering in strict reverse order, so the matrix is
/// fully restored when [`Matrix::solve`] returns.
pub trait Callback {
    fn on_solution(&mut self, _sol: Vec<usize>, _mat: &mut Matrix) {}
    fn on_step(&mut self, _mat: &mut Matrix) {}
}

/// A simple callback that just collects solutions into a vector.
#[derive(Default)]
pub struct SolutionCallback {
    pub solutions: Vec<Vec<usize>>,
}

impl Callback for SolutionCallback {
    fn on_solution(&mut self, sol: Vec<usize>, _mat: &mut Matrix) {
        self.solutions.push(sol);
    }
}

// Methods for initializing Matrix
impl Matrix {
    const ROOT: usize = 0;

    /// Creates an empty matrix with `primary_cnt + secondary_cnt` columns.
    ///
    /// Primary column heads are threaded into the circular header list
    /// anchored at the root; secondary heads are left self-linked, since
    /// secondary columns never need to be covered.
    pub fn new(primary_cnt: usize, secondary_cnt: usize) -> Matrix {
        let col_cnt = primary_cnt + secondary_cnt;
        let mut mat = Matrix {
            row_cnt: 0,
            col_cnt,
            primary_cnt,
            pool: vec![Node::default()],
            col_size: vec![0; col_cnt + 1],
            seconded: vec![false; col_cnt + 1],
            row_head: vec![0],

            updates: 0,
            partial_sol: vec![],
            abort_requested: false,

            second_stack: vec![],
            blocked: vec![],
        };
        for col_num in 1..=col_cnt {
            let col = mat.create_node(0, col_num);
            if col_num <= primary_cnt {
                mat.insert_right(col - 1, col);
            }
        }
        mat
    }

    /// Appends one row, given as the numbers of the columns it has a 1 in,
    /// and returns the (1-based) row number.
    ///
    /// Each node is hooked in at the bottom of its column, just above the
    /// head, and the row's nodes are threaded into a circular horizontal
    /// list. Row membership is immutable afterwards.
    pub fn add_row(&mut self, cols: &[usize]) -> usize {
        assert!(!cols.is_empty(), "a row must contain at least one column");
        self.row_cnt += 1;
        let row_num = self.row_cnt;
        let mut left_node = 0;

        for &col_num in cols {
            assert!(
                1 <= col_num && col_num <= self.col_cnt,
                "column {} out of range (matrix has {} columns)",
                col_num,
                self.col_cnt
            );
            let node = self.create_node(row_num, col_num);

            self.insert_down(self.pool[col_num].up, node);
            if left_node == 0 {
                self.row_head.push(node);
            } else {
                self.insert_right(left_node, node);
            }

            self.col_size[col_num] += 1;
            left_node = node;
        }
        row_num
    }

    pub fn row_count(&self) -> usize {
        self.row_cnt
    }

    pub fn column_count(&self) -> usize {
        self.col_cnt
    }

    pub fn primary_count(&self) -> usize {
        self.primary_cnt
    }

    /// Current number of active 1-cells in a column.
    ///
    /// Not maintained while the column is seconded by [`Matrix::cover2`];
    /// it reads correctly again once the matrix is restored.
    pub fn size(&self, col: usize) -> usize {
        self.col_size[col]
    }

    /// Cumulative count of link updates performed so far.
    ///
    /// A research/profiling metric: deterministic for a given instance, but
    /// not otherwise meaningful.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Walks the header list from the root, yielding active column numbers.
    pub fn active_columns(&self) -> ActiveColumns<'_> {
        ActiveColumns { mat: self, cur: Matrix::ROOT }
    }

    /// Walks a column downward from its head, yielding the row number of
    /// each active node.
    pub fn column_rows(&self, col: usize) -> ColumnRows<'_> {
        assert!(1 <= col && col <= self.col_cnt, "column {} out of range", col);
        ColumnRows { mat: self, col, cur: col }
    }
}

// Main algorithm (dancing links)
impl Matrix {
    /// Runs the depth-first search, reporting solutions and steps to
    /// `callback`. Returns `true` if the search space was exhausted and
    /// `false` if the callback aborted it.
    ///
    /// Either way the matrix is bit-identical to its pre-call state on
    /// return.
    pub fn solve(&mut self, callback: &mut impl Callback) -> bool {
        self.abort_requested = false;
        self.recursive_search(callback);
        !self.abort_requested
    }

    /// Requests that the running search stop at the next step.
    pub fn abort(&mut self) {
        self.abort_requested = true;
    }

    fn recursive_search(&mut self, callback: &mut impl Callback) {
        callback.on_step(self);
        if self.abort_requested {
            return;
        }

        // All primary columns covered: the current choices are a solution.
        if self.pool[Matrix::ROOT].right == Matrix::ROOT {
            callback.on_solution(self.partial_sol.clone(), self);
            return;
        }

        // MRV (minimum remaining values) heuristic: branch on the column
        // that is hardest to cover. First-encountered wins ties.
        let (col, size) = self.choose_best_col();
        if size == 0 {
            return; // dead end
        }

        self.cover(col);

        let mut r = self.pool[col].down;
        while r != col {
            self.partial_sol.push(self.pool[r].row);
            let mut j = self.pool[r].right;
            while j != r {
                self.cover(self.pool[j].col);
                j = self.pool[j].right;
            }

            self.recursive_search(callback);

            // The left links exist precisely so that columns are uncovered
            // in LIFO order here.
            let mut j = self.pool[r].left;
            while j != r {
                self.uncover(self.pool[j].col);
                j = self.pool[j].left;
            }
            self.partial_sol.pop();

            if self.abort_requested {
                break;
            }
            r = self.pool[r].down;
        }

        self.uncover(col);
    }

    #[inline]
    fn choose_best_col(&self) -> (usize, usize) {
        let mut col = self.pool[Matrix::ROOT].right;
        let mut size = self.col_size[col];

        let mut c = col;
        while c != Matrix::ROOT {
            if self.col_size[c] < size {
                col = c;
                size = self.col_size[c];
            }
            c = self.pool[c].right;
        }
        (col, size)
    }
}

// The cover engine
impl Matrix {
    /// Removes `col` from the header list and blocks its rows: every node
    /// that shares a row with this column leaves its own column's list.
    ///
    /// A blocked row leaves all lists except the covered column's, so no
    /// node is ever removed from a list twice.
    #[inline]
    fn cover(&mut self, col: usize) {
        let mut updates = 1;
        let Node { left, right, .. } = self.pool[col];
        self.pool[left].right = right;
        self.pool[right].left = left;

        let mut rr = self.pool[col].down;
        while rr != col {
            let mut nn = self.pool[rr].right;
            while nn != rr {
                let Node { col: cc, up, down, .. } = self.pool[nn];
                self.pool[up].down = down;
                self.pool[down].up = up;
                self.col_size[cc] -= 1;
                updates += 1;
                nn = self.pool[nn].right;
            }
            rr = self.pool[rr].down;
        }
        self.updates += updates;
    }

    /// The strict inverse of [`cover`](Matrix::cover): traverses up and left
    /// where `cover` went down and right, so the pointers return exactly to
    /// their former state.
    #[inline]
    fn uncover(&mut self, col: usize) {
        let mut rr = self.pool[col].up;
        while rr != col {
            let mut nn = self.pool[rr].left;
            while nn != rr {
                let Node { col: cc, up, down, .. } = self.pool[nn];
                self.pool[up].down = nn;
                self.pool[down].up = nn;
                self.col_size[cc] += 1;
                nn = self.pool[nn].left;
            }
            rr = self.pool[rr].up;
        }

        let Node { left, right, .. } = self.pool[col];
        self.pool[left].right = col;
        self.pool[right].left = col;
    }
}

// IDLX primitives: seconding long columns, and deleting useless rows
impl Matrix {
    /// Variant of `cover` for covering a long column during IDLX
    /// preprocessing.
    ///
    /// Blocking a row not only removes its nodes from their columns but
    /// temporarily makes those columns secondary: each one leaves the header
    /// list, its old neighbors saved on the seconded stack so that
    /// [`unsecond`](Matrix::unsecond) can put it back. A column is never
    /// seconded twice. Column lengths are not maintained here; restoring the
    /// detached nodes with [`uncover2`](Matrix::uncover2) leaves every length
    /// at its old value.
    ///
    /// Every row visited in `col`'s own list is recorded as blocked.
    pub fn cover2(&mut self, col: usize) {
        let mut updates = 0;
        if !self.seconded[col] {
            self.second_out(col);
            updates = 1;
        }

        let mut rr = self.pool[col].down;
        while rr != col {
            self.blocked.push(self.pool[rr].row);
            let mut nn = self.pool[rr].right;
            while nn != rr {
                let Node { col: cc, up, down, .. } = self.pool[nn];
                self.pool[up].down = down;
                self.pool[down].up = up;
                if !self.seconded[cc] {
                    self.second_out(cc);
                }
                updates += 1;
                nn = self.pool[nn].right;
            }
            rr = self.pool[rr].down;
        }
        self.updates += updates;
    }

    /// Undoes the node detachments of [`cover2`](Matrix::cover2), in reverse
    /// traversal order. Seconded columns stay seconded; that is
    /// [`unsecond`](Matrix::unsecond)'s job.
    pub fn uncover2(&mut self, col: usize) {
        let mut rr = self.pool[col].up;
        while rr != col {
            let mut nn = self.pool[rr].left;
            while nn != rr {
                let Node { up, down, .. } = self.pool[nn];
                self.pool[up].down = nn;
                self.pool[down].up = nn;
                nn = self.pool[nn].left;
            }
            rr = self.pool[rr].up;
        }
    }

    /// Pops the seconded stack, restoring each column to the header list in
    /// LIFO order. Must run after every seconded long column has been
    /// `uncover2`ed.
    pub fn unsecond(&mut self) {
        while let Some(Seconded { col, left, right }) = self.second_stack.pop() {
            self.seconded[col] = false;
            self.pool[col].left = left;
            self.pool[col].right = right;
            self.pool[left].right = col;
            self.pool[right].left = col;
        }
    }

    /// Hands over the rows blocked by the `cover2` calls of the current
    /// preprocessing pass, clearing the list for the next one.
    pub fn take_blocked(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.blocked)
    }

    /// Physically deletes a row: every node leaves its column's list and the
    /// column length drops. Deletion is permanent; no undo record is kept.
    ///
    /// Must be called on a fully restored matrix, at most once per row.
    /// These updates are never undone, so they count half each, rounded on
    /// addition.
    pub fn delete_row(&mut self, row: usize) {
        let start = self.row_head[row];
        let mut half = 0f64;

        let mut nn = self.pool[start].right;
        while nn != start {
            let Node { col: cc, up, down, .. } = self.pool[nn];
            self.pool[up].down = down;
            self.pool[down].up = up;
            self.col_size[cc] -= 1;
            half += 0.5;
            nn = self.pool[nn].right;
        }

        // now the leading node itself
        let Node { col: cc, up, down, .. } = self.pool[start];
        self.pool[up].down = down;
        self.pool[down].up = up;
        self.col_size[cc] -= 1;

        self.updates += (half + 1.1) as u64;
    }

    fn second_out(&mut self, col: usize) {
        let Node { left, right, .. } = self.pool[col];
        self.pool[left].right = right;
        self.pool[right].left = left;
        self.pool[col].left = col;
        self.pool[col].right = col;
        self.seconded[col] = true;
        self.second_stack.push(Seconded { col, left, right });
    }
}

// Helper methods
impl Matrix {
    fn create_node(&mut self, row: usize, col: usize) -> usize {
        let idx = self.pool.len();
        self.pool.push(Node {
            row,
            col,
            left: idx,
            right: idx,
            up: idx,
            down: idx,
        });
        idx
    }

    fn insert_right(&mut self, at: usize, node: usize) {
        let right = self.pool[at].right;
        self.pool[node].right = right;
        self.pool[right].left = node;
        self.pool[node].left = at;
        self.pool[at].right = node;
    }

    fn insert_down(&mut self, at: usize, node: usize) {
        let down = self.pool[at].down;
        self.pool[node].down = down;
        self.pool[down].up = node;
        self.pool[node].up = at;
        self.pool[at].down = node;
    }
}

/// Iterator over active column numbers, in header-list order.
pub struct ActiveColumns<'a> {
    mat: &'a Matrix,
    cur: usize,
}

impl<'a> Iterator for ActiveColumns<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.cur = self.mat.pool[self.cur].right;
        if self.cur == Matrix::ROOT {
            None
        } else {
            Some(self.cur)
        }
    }
}

/// Iterator over the active row numbers of one column, top to bottom.
pub struct ColumnRows<'a> {
    mat: &'a Matrix,
    col: usize,
    cur: usize,
}

impl<'a> Iterator for ColumnRows<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.cur = self.mat.pool[self.cur].down;
        if self.cur == self.col {
            None
        } else {
            Some(self.mat.pool[self.cur].row)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    /// The classic 7-column instance from Knuth's paper.
    /// The unique solution is rows 1, 4, 5.
    fn knuth_matrix() -> Matrix {
        let mut mat = Matrix::new(7, 0);
        for row in [
            vec![3, 5, 6],
            vec![1, 4, 7],
            vec![2, 3, 6],
            vec![1, 4],
            vec![2, 7],
            vec![4, 5, 7],
        ] {
            mat.add_row(&row);
        }
        mat
    }

    fn snapshot(mat: &Matrix) -> (Vec<Node>, Vec<usize>) {
        (mat.pool.clone(), mat.col_size.clone())
    }

    /// Checks the four link-consistency equations and the length bookkeeping
    /// for every node reachable from an active column.
    fn assert_consistent(mat: &Matrix) {
        let mut c = mat.pool[Matrix::ROOT].right;
        while c != Matrix::ROOT {
            let mut n = mat.pool[c].down;
            let mut len = 0;
            while n != c {
                assert_eq!(mat.pool[mat.pool[n].up].down, n);
                assert_eq!(mat.pool[mat.pool[n].down].up, n);
                assert_eq!(mat.pool[mat.pool[n].left].right, n);
                assert_eq!(mat.pool[mat.pool[n].right].left, n);
                len += 1;
                n = mat.pool[n].down;
            }
            assert_eq!(mat.col_size[c], len, "length drift in column {}", c);
            c = mat.pool[c].right;
        }
    }

    struct StopAfter {
        limit: usize,
        solutions: Vec<Vec<usize>>,
    }

    impl Callback for StopAfter {
        fn on_solution(&mut self, sol: Vec<usize>, _mat: &mut Matrix) {
            self.solutions.push(sol);
        }

        fn on_step(&mut self, mat: &mut Matrix) {
            if self.solutions.len() >= self.limit {
                mat.abort();
            }
        }
    }

    #[test]
    fn search_solves_classic_exact_cover() {
        let mut mat = knuth_matrix();
        let mut cb = SolutionCallback::default();
        assert!(mat.solve(&mut cb));
        assert_eq!(cb.solutions.len(), 1);
        let mut sol = cb.solutions[0].clone();
        sol.sort_unstable();
        assert_eq!(sol, vec![1, 4, 5]);
    }

    #[test]
    fn search_finds_multiple_solutions() {
        let mut mat = Matrix::new(4, 0);
        for row in [vec![1], vec![2], vec![3], vec![4], vec![1, 3], vec![2, 4]] {
            mat.add_row(&row);
        }
        let mut cb = SolutionCallback::default();
        assert!(mat.solve(&mut cb));
        assert_eq!(cb.solutions.len(), 4);
    }

    #[test]
    fn secondary_columns_are_covered_at_most_once() {
        // primary A=1 B=2, secondary S=3
        let mut mat = Matrix::new(2, 1);
        for row in [vec![1, 3], vec![2], vec![1], vec![2, 3]] {
            mat.add_row(&row);
        }
        let mut cb = SolutionCallback::default();
        assert!(mat.solve(&mut cb));
        // deterministic depth-first order
        assert_eq!(cb.solutions, vec![vec![1, 2], vec![3, 2], vec![3, 4]]);
    }

    #[test]
    fn unsatisfiable_search_restores_matrix() {
        let mut mat = Matrix::new(2, 0);
        mat.add_row(&[1]);
        mat.add_row(&[1]);
        let before = snapshot(&mat);

        let mut cb = SolutionCallback::default();
        assert!(mat.solve(&mut cb));
        assert!(cb.solutions.is_empty());
        assert_eq!(snapshot(&mat), before);
        assert_consistent(&mat);
    }

    #[test]
    fn cover_then_uncover_is_identity() {
        let mut mat = knuth_matrix();
        let before = snapshot(&mat);

        mat.cover(1);
        assert_ne!(snapshot(&mat).0, before.0);
        mat.uncover(1);

        assert_eq!(snapshot(&mat), before);
        assert_consistent(&mat);
    }

    #[test]
    fn nested_cover_uncover_is_identity() {
        let mut rng = StdRng::seed_from_u64(0x1d1c);
        for _ in 0..50 {
            let cols = rng.gen_range(2..9);
            let mut mat = Matrix::new(cols, 0);
            for _ in 0..rng.gen_range(1..26) {
                let mut row: Vec<usize> = (1..=cols).filter(|_| rng.gen_bool(0.4)).collect();
                if row.is_empty() {
                    row.push(rng.gen_range(1..=cols));
                }
                mat.add_row(&row);
            }
            let before = snapshot(&mat);

            let mut order: Vec<usize> = (1..=cols).collect();
            order.shuffle(&mut rng);
            let depth = rng.gen_range(1..=cols);
            for &c in &order[..depth] {
                mat.cover(c);
            }
            for &c in order[..depth].iter().rev() {
                mat.uncover(c);
            }

            assert_eq!(snapshot(&mat), before);
            assert_consistent(&mat);
        }
    }

    #[test]
    fn abort_restores_matrix_and_keeps_solutions() {
        let mut mat = Matrix::new(4, 0);
        // two candidate rows per column: 16 solutions in total
        for c in 1..=4 {
            mat.add_row(&[c]);
            mat.add_row(&[c]);
        }
        let before = snapshot(&mat);

        let mut cb = StopAfter { limit: 3, solutions: vec![] };
        assert!(!mat.solve(&mut cb));
        assert_eq!(cb.solutions.len(), 3);
        assert_eq!(snapshot(&mat), before);
        assert_consistent(&mat);
    }

    #[test]
    fn cover2_uncover2_unsecond_is_identity() {
        let mut mat = knuth_matrix();
        let before = snapshot(&mat);

        mat.cover2(4); // rows 2, 4, 6 blocked; columns 1, 5, 7 seconded
        let blocked = mat.take_blocked();
        assert_eq!(blocked, vec![2, 4, 6]);
        assert!(mat.seconded[4] && mat.seconded[1] && mat.seconded[5] && mat.seconded[7]);

        mat.uncover2(4);
        mat.unsecond();

        assert_eq!(snapshot(&mat), before);
        assert!(!mat.seconded.iter().any(|&s| s));
        assert_consistent(&mat);
    }

    #[test]
    fn cover2_leaves_column_lengths_for_restore() {
        // The open case: lengths are not maintained while seconded, and must
        // read their original values after the full restore.
        let mut mat = knuth_matrix();
        let lengths = mat.col_size.clone();

        mat.cover2(7);
        mat.cover2(4); // 4's rows partly detached already; lengths untouched
        mat.uncover2(4);
        mat.uncover2(7);
        mat.unsecond();
        mat.take_blocked();

        assert_eq!(mat.col_size, lengths);
        assert_consistent(&mat);
    }

    #[test]
    fn delete_row_detaches_it_permanently() {
        let mut mat = knuth_matrix();
        mat.delete_row(6); // {4, 5, 7}, not part of the solution
        assert_eq!(mat.size(4), 2);
        assert_eq!(mat.size(5), 1);
        assert_eq!(mat.size(7), 1);
        assert_consistent(&mat);

        let mut cb = SolutionCallback::default();
        assert!(mat.solve(&mut cb));
        assert_eq!(cb.solutions.len(), 1);
        let mut sol = cb.solutions[0].clone();
        sol.sort_unstable();
        assert_eq!(sol, vec![1, 4, 5]);
    }

    #[test]
    fn updates_counter_is_deterministic() {
        let run = || {
            let mut mat = knuth_matrix();
            let mut cb = SolutionCallback::default();
            mat.solve(&mut cb);
            mat.updates()
        };
        let first = run();
        assert!(first > 0);
        assert_eq!(first, run());
    }

    #[test]
    fn iterators_walk_active_state() {
        let mut mat = knuth_matrix();
        let active: Vec<usize> = mat.active_columns().collect();
        assert_eq!(active, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(mat.column_rows(4).collect::<Vec<_>>(), vec![2, 4, 6]);

        mat.cover(4);
        let active: Vec<usize> = mat.active_columns().collect();
        assert_eq!(active, vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(mat.column_rows(1).collect::<Vec<_>>(), vec![]);
        mat.uncover(4);
    }
}
