// Linear assignment solvers over a square similarity matrix.
//
// The exact solver is the O(K^3) shortest-augmenting-path Hungarian method
// with row/column potentials, run on cost = max - similarity so that every
// cost is non-negative. Once it finishes, the potentials are an optimal
// dual: every optimal assignment uses only "tight" cells (reduced cost
// zero), and every perfect matching made of tight cells is optimal. Tie-breaking walks rows in order and moves each
// row to the smallest tight column that still admits a perfect matching,
// found by an alternating path over the unfixed rows. The result is the
// lexicographically smallest optimal assignment.
//
// The greedy solver is a documented approximation: repeatedly take the
// largest remaining cell. It is not guaranteed optimal.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::similarity::SimilarityMatrix;

/// Which assignment algorithm to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStrategy {
    /// Hungarian method, globally optimal with deterministic tie-breaking.
    #[default]
    Exact,
    /// Largest-cell-first approximation for very large K. Not optimal.
    Greedy,
}

impl AssignmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStrategy::Exact => "exact",
            AssignmentStrategy::Greedy => "greedy",
        }
    }
}

impl fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssignmentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "hungarian" => Ok(AssignmentStrategy::Exact),
            "greedy" => Ok(AssignmentStrategy::Greedy),
            other => Err(format!(
                "unknown assignment strategy '{other}' (expected exact or greedy)"
            )),
        }
    }
}

/// Maximum-weight assignment: `forward[i]` is the column matched to row `i`.
///
/// Among equally good assignments the lexicographically smallest `forward`
/// is returned.
pub fn max_weight_assignment(matrix: &SimilarityMatrix) -> Vec<usize> {
    let n = matrix.size();
    if n == 0 {
        return Vec::new();
    }

    let ceiling = (0..n)
        .flat_map(|i| matrix.row(i).iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let cost = |i: usize, j: usize| ceiling - matrix.get(i, j);
    let (mut col_of, u, v) = hungarian(n, cost);

    // Tightness threshold relative to the matrix scale
    let eps = 1e-9 * matrix.max_abs().max(1.0);
    let tight = |i: usize, j: usize| (cost(i, j) - u[i] - v[j]).abs() <= eps;

    let mut row_of = vec![0usize; n];
    for (i, &j) in col_of.iter().enumerate() {
        row_of[j] = i;
    }

    let mut fixed_col = vec![false; n];
    for i in 0..n {
        for j in 0..n {
            if j == col_of[i] {
                break;
            }
            if fixed_col[j] || !tight(i, j) {
                continue;
            }
            if reroute(i, j, &mut col_of, &mut row_of, &fixed_col, &tight) {
                break;
            }
        }
        fixed_col[col_of[i]] = true;
    }

    col_of
}

/// Greedy assignment: visit cells from largest to smallest similarity (ties
/// by lowest row, then column) and take each cell whose row and column are
/// both still free.
pub fn greedy_assignment(matrix: &SimilarityMatrix) -> Vec<usize> {
    let n = matrix.size();
    let mut cells: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..n).map(move |j| (i, j))).collect();
    cells.sort_by(|&(ai, aj), &(bi, bj)| {
        matrix
            .get(bi, bj)
            .total_cmp(&matrix.get(ai, aj))
            .then(ai.cmp(&bi))
            .then(aj.cmp(&bj))
    });

    let mut forward = vec![usize::MAX; n];
    let mut col_taken = vec![false; n];
    let mut assigned = 0;
    for (i, j) in cells {
        if assigned == n {
            break;
        }
        if forward[i] == usize::MAX && !col_taken[j] {
            forward[i] = j;
            col_taken[j] = true;
            assigned += 1;
        }
    }

    forward
}

/// Hungarian method (minimization) on an n x n cost function.
///
/// Returns `(col_of, u, v)`: the assignment and the row/column potentials,
/// with `u[i] + v[j] <= cost(i, j)` everywhere and equality on assigned
/// cells.
fn hungarian(n: usize, cost: impl Fn(usize, usize) -> f64) -> (Vec<usize>, Vec<f64>, Vec<f64>) {
    // 1-based internally; index 0 is the virtual source row/column.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut col_of = vec![0usize; n];
    for j in 1..=n {
        col_of[p[j] - 1] = j - 1;
    }

    (col_of, u[1..].to_vec(), v[1..].to_vec())
}

/// Try to move row `i` onto column `j` while keeping a perfect matching of
/// tight cells. Column `j`'s current owner has to reach the column `i` gives
/// up through an alternating path over unfixed rows and columns.
fn reroute(
    i: usize,
    j: usize,
    col_of: &mut [usize],
    row_of: &mut [usize],
    fixed_col: &[bool],
    tight: &impl Fn(usize, usize) -> bool,
) -> bool {
    let n = col_of.len();
    let start = row_of[j];
    let target = col_of[i];

    let mut parent = vec![usize::MAX; n];
    let mut seen_col = vec![false; n];
    seen_col[j] = true;

    let mut queue = VecDeque::from([start]);
    let mut reached = false;
    'search: while let Some(row) = queue.pop_front() {
        for c in 0..n {
            if seen_col[c] || fixed_col[c] || !tight(row, c) {
                continue;
            }
            seen_col[c] = true;
            parent[c] = row;
            if c == target {
                reached = true;
                break 'search;
            }
            queue.push_back(row_of[c]);
        }
    }

    if !reached {
        return false;
    }

    // Shift every row on the path onto the column it reached
    let mut c = target;
    loop {
        let row = parent[c];
        let previous = col_of[row];
        col_of[row] = c;
        row_of[c] = row;
        if row == start {
            break;
        }
        c = previous;
    }

    col_of[i] = j;
    row_of[j] = i;
    true
}
