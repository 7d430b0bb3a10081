/*!
# WFA module
Contains the wavefront alignment engines used to measure how far apart two sequences are.
Both engines use the same cost model: a match is free, while an insertion or a deletion each cost 1.
There is no mismatch operation, so a differing base is always paid for as one insertion plus one deletion.

- `GridWFA` expands a breadth-first wavefront over an explicit cell grid and keeps two backtraces, one preferring deletions and one preferring insertions. It is used to realign a single callset against the reference.
- `DiagonalWFA` stores only the furthest offset per diagonal and score, and is used for every haplotype distance during phase resolution.

In both engines, sequence A runs down the rows and sequence B runs across the columns.
Consuming a character of A is an insertion, consuming a character of B is a deletion.

## Example usage
```rust
use vcfdist::wfa::diagonal_wfa::DiagonalWFA;
use vcfdist::wfa::grid_wfa::GridWFA;

// a pure insertion
let dwfa = DiagonalWFA::align(b"AXC", b"AC").unwrap();
assert_eq!(dwfa.edit_distance(), 1);

// a substitution costs an insertion and a deletion
let grid = GridWFA::align(b"AGGT", b"ACGT").unwrap();
assert_eq!(grid.score(), 2);
```
*/

/// The cell-grid engine with dual backtraces
pub mod grid_wfa;
/// The diagonal-offset engine
pub mod diagonal_wfa;

#[derive(thiserror::Error, Debug)]
pub enum WFAError {
    #[error("maximum edit distance of {max_edit_distance} exceeded")]
    MaxEditDistance { max_edit_distance: usize },
    #[error("backtrack failed at cell ({row}, {col}), no predecessor was recorded")]
    BacktrackFailed { row: usize, col: usize }
}

/// A single step of an alignment between A (rows) and B (columns)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlignmentOp {
    /// Consumes one character of both sequences, which must be equal
    Match,
    /// Consumes one character of A
    Insertion,
    /// Consumes one character of B
    Deletion
}

/// Sums the cost of a list of alignment operations
pub fn alignment_cost(ops: &[AlignmentOp]) -> usize {
    ops.iter()
        .filter(|&&op| op != AlignmentOp::Match)
        .count()
}

/// Checks that a list of operations is a valid alignment of `seq_a` against `seq_b`.
/// Mostly useful for verifying backtraces.
pub fn is_valid_alignment(ops: &[AlignmentOp], seq_a: &[u8], seq_b: &[u8]) -> bool {
    let mut i = 0;
    let mut j = 0;
    for &op in ops.iter() {
        match op {
            AlignmentOp::Match => {
                if i >= seq_a.len() || j >= seq_b.len() || seq_a[i] != seq_b[j] {
                    return false;
                }
                i += 1;
                j += 1;
            },
            AlignmentOp::Insertion => {
                if i >= seq_a.len() {
                    return false;
                }
                i += 1;
            },
            AlignmentOp::Deletion => {
                if j >= seq_b.len() {
                    return false;
                }
                j += 1;
            }
        }
    }
    i == seq_a.len() && j == seq_b.len()
}
