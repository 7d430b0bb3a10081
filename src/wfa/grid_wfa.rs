use crate::wfa::{AlignmentOp, WFAError};

/// Cell was reached by a free diagonal match from `(row-1, col-1)`
pub const PTR_DIAG: u8 = 0x01;
/// Cell was reached by an insertion from `(row-1, col)`
pub const PTR_UP: u8 = 0x02;
/// Cell was reached by a deletion from `(row, col-1)`
pub const PTR_LEFT: u8 = 0x04;
/// Cell is on the backtrace that prefers deletions
pub const LEFT_PATH: u8 = 0x08;
/// Cell is on the backtrace that prefers insertions
pub const RIGHT_PATH: u8 = 0x10;
/// Cell has been assigned a score and will never be expanded into again
pub const FINALIZED: u8 = 0x20;

/// Edit distance engine that fills an explicit `(len_a+1) x (len_b+1)` grid by breadth-first wavefront expansion.
/// Cell `(row, col)` means `row` characters of A and `col` characters of B have been consumed.
/// After scoring, two greedy backtraces are traced from the final cell so diverging equal-cost alignments can be displayed.
#[derive(Clone, Debug)]
pub struct GridWFA {
    /// Number of rows, `len_a + 1`
    rows: usize,
    /// Number of columns, `len_b + 1`
    cols: usize,
    /// Pointer and path flags for each cell, row-major
    cells: Vec<u8>,
    /// The wavefront generation that finalized each cell, row-major
    generations: Vec<Option<usize>>,
    /// The final edit distance
    score: usize,
    /// Cells on the left-biased backtrace, origin first
    left_path: Vec<(usize, usize)>,
    /// Cells on the right-biased backtrace, origin first
    right_path: Vec<(usize, usize)>
}

impl GridWFA {
    /// Scores the alignment of `seq_a` (rows) against `seq_b` (columns) and traces both backtraces.
    /// # Arguments
    /// * `seq_a` - the first sequence, e.g. a haplotype sequence
    /// * `seq_b` - the second sequence, e.g. the reference
    /// # Errors
    /// * if either backtrace cannot find a predecessor, which indicates an inconsistent grid
    pub fn align(seq_a: &[u8], seq_b: &[u8]) -> Result<GridWFA, WFAError> {
        let rows = seq_a.len() + 1;
        let cols = seq_b.len() + 1;
        let mut grid = GridWFA {
            rows,
            cols,
            cells: vec![0; rows * cols],
            generations: vec![None; rows * cols],
            score: 0,
            left_path: vec![],
            right_path: vec![]
        };
        grid.fill(seq_a, seq_b);
        grid.left_path = grid.backtrack(true)?;
        grid.right_path = grid.backtrack(false)?;
        Ok(grid)
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Tries to reach a cell in generation `generation` through a move tagged `pointer`.
    /// Returns true if this was the first time the cell was reached.
    fn reach(&mut self, row: usize, col: usize, generation: usize, pointer: u8) -> bool {
        let index = self.index(row, col);
        match self.generations[index] {
            Some(g) if g < generation => false,
            Some(_) => {
                // another equal cost route into a cell from this generation
                self.cells[index] |= pointer;
                false
            },
            None => {
                self.generations[index] = Some(generation);
                self.cells[index] |= pointer | FINALIZED;
                true
            }
        }
    }

    /// Slides diagonally from a cell while the characters match, every touched cell joins `frontier`.
    fn slide(&mut self, seq_a: &[u8], seq_b: &[u8], row: usize, col: usize, generation: usize, frontier: &mut Vec<(usize, usize)>) {
        let (mut row, mut col) = (row, col);
        while row < seq_a.len() && col < seq_b.len() && seq_a[row] == seq_b[col] {
            row += 1;
            col += 1;
            if !self.reach(row, col, generation, PTR_DIAG) {
                // already part of this generation, its own slide covers the rest
                break;
            }
            frontier.push((row, col));
        }
    }

    /// Runs the wavefront generations until the bottom-right cell is finalized.
    fn fill(&mut self, seq_a: &[u8], seq_b: &[u8]) {
        let final_cell = (self.rows - 1, self.cols - 1);

        // generation 0 is the origin plus its free diagonal run
        let origin = self.index(0, 0);
        self.generations[origin] = Some(0);
        self.cells[origin] |= FINALIZED;
        let mut frontier = vec![(0, 0)];
        self.slide(seq_a, seq_b, 0, 0, 0, &mut frontier);

        let mut generation = 0;
        while self.generations[self.index(final_cell.0, final_cell.1)].is_none() {
            generation += 1;

            // every frontier cell steps down and right
            let mut next_frontier = vec![];
            for &(row, col) in frontier.iter() {
                if row < seq_a.len() && self.reach(row+1, col, generation, PTR_UP) {
                    next_frontier.push((row+1, col));
                }
                if col < seq_b.len() && self.reach(row, col+1, generation, PTR_LEFT) {
                    next_frontier.push((row, col+1));
                }
            }

            // then the new cells slide along free matches at the same cost
            let num_stepped = next_frontier.len();
            for i in 0..num_stepped {
                let (row, col) = next_frontier[i];
                self.slide(seq_a, seq_b, row, col, generation, &mut next_frontier);
            }
            frontier = next_frontier;
        }
        self.score = generation;
    }

    /// Greedy walk from the final cell back to the origin, tagging every visited cell.
    /// # Arguments
    /// * `prefer_left` - if true, prefers LEFT then DIAG then UP; otherwise prefers UP then DIAG then LEFT
    fn backtrack(&mut self, prefer_left: bool) -> Result<Vec<(usize, usize)>, WFAError> {
        let (path_flag, order) = if prefer_left {
            (LEFT_PATH, [PTR_LEFT, PTR_DIAG, PTR_UP])
        } else {
            (RIGHT_PATH, [PTR_UP, PTR_DIAG, PTR_LEFT])
        };

        let mut row = self.rows - 1;
        let mut col = self.cols - 1;
        let mut path = vec![(row, col)];
        let mut index = self.index(row, col);
        self.cells[index] |= path_flag;
        while (row, col) != (0, 0) {
            let flags = self.cells[index];
            let pointer = order.into_iter()
                .find(|&p| flags & p != 0)
                .ok_or(WFAError::BacktrackFailed { row, col })?;
            match pointer {
                PTR_LEFT => col -= 1,
                PTR_DIAG => {
                    row -= 1;
                    col -= 1;
                },
                _ => row -= 1
            };
            index = self.index(row, col);
            self.cells[index] |= path_flag;
            path.push((row, col));
        }

        path.reverse();
        Ok(path)
    }

    /// The alignment operations along the left-biased backtrace
    pub fn left_alignment(&self) -> Vec<AlignmentOp> {
        path_to_ops(&self.left_path)
    }

    /// The alignment operations along the right-biased backtrace
    pub fn right_alignment(&self) -> Vec<AlignmentOp> {
        path_to_ops(&self.right_path)
    }

    /// Returns true if the two backtraces take different routes through the grid
    pub fn paths_diverge(&self) -> bool {
        self.left_path != self.right_path
    }

    /// The flags for a single cell
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.cells[self.index(row, col)]
    }

    /// The generation that finalized a cell, `None` if it was never reached
    pub fn generation(&self, row: usize, col: usize) -> Option<usize> {
        self.generations[self.index(row, col)]
    }

    /// Renders the grid as plain text for diagnostics.
    /// Each cell shows its incoming pointers and its path membership:
    /// `\` diagonal, `|` up, `-` left, `+` several pointers, followed by `o` on both paths, `<` left path only, `>` right path only, `*` reached elsewhere.
    /// # Arguments
    /// * `seq_a` - the sequence used for the rows
    /// * `seq_b` - the sequence used for the columns
    pub fn render(&self, seq_a: &[u8], seq_b: &[u8]) -> String {
        let mut ret = String::new();
        ret.push_str("    ");
        for &c in seq_b.iter() {
            ret.push_str("  ");
            ret.push(c as char);
        }
        ret.push('\n');

        for row in 0..self.rows {
            let label = if row == 0 { ' ' } else { seq_a[row-1] as char };
            ret.push(label);
            for col in 0..self.cols {
                let flags = self.cell(row, col);
                let pointers = flags & (PTR_DIAG | PTR_UP | PTR_LEFT);
                let arrow = match pointers {
                    0 => if self.generation(row, col).is_some() { '#' } else { ' ' },
                    PTR_DIAG => '\\',
                    PTR_UP => '|',
                    PTR_LEFT => '-',
                    _ => '+'
                };
                let marker = match (flags & LEFT_PATH != 0, flags & RIGHT_PATH != 0) {
                    (true, true) => 'o',
                    (true, false) => '<',
                    (false, true) => '>',
                    (false, false) => if self.generation(row, col).is_some() { '*' } else { '.' }
                };
                ret.push(' ');
                ret.push(arrow);
                ret.push(marker);
            }
            ret.push('\n');
        }
        ret
    }

    // getters
    pub fn score(&self) -> usize {
        self.score
    }

    pub fn left_path(&self) -> &[(usize, usize)] {
        &self.left_path
    }

    pub fn right_path(&self) -> &[(usize, usize)] {
        &self.right_path
    }
}

/// Converts an origin-first list of cells into alignment operations
fn path_to_ops(path: &[(usize, usize)]) -> Vec<AlignmentOp> {
    path.windows(2)
        .map(|w| {
            let (r0, c0) = w[0];
            let (r1, c1) = w[1];
            match (r1 - r0, c1 - c0) {
                (1, 1) => AlignmentOp::Match,
                (1, 0) => AlignmentOp::Insertion,
                _ => AlignmentOp::Deletion
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::sequence_alignment::indel_distance;
    use crate::wfa::diagonal_wfa::DiagonalWFA;
    use crate::wfa::{alignment_cost, is_valid_alignment};

    #[test]
    fn test_basic_scores() {
        assert_eq!(GridWFA::align(b"", b"").unwrap().score(), 0);
        assert_eq!(GridWFA::align(b"ACG", b"").unwrap().score(), 3);
        assert_eq!(GridWFA::align(b"", b"AC").unwrap().score(), 2);
        assert_eq!(GridWFA::align(b"ACGT", b"ACGT").unwrap().score(), 0);
        assert_eq!(GridWFA::align(b"AXC", b"AC").unwrap().score(), 1);
        assert_eq!(GridWFA::align(b"AC", b"AXC").unwrap().score(), 1);
        assert_eq!(GridWFA::align(b"AGGT", b"ACGT").unwrap().score(), 2);
    }

    #[test]
    fn test_biased_backtraces() {
        // a single mismatch has two minimal alignments
        let grid = GridWFA::align(b"AGT", b"ACT").unwrap();
        assert_eq!(grid.score(), 2);
        assert!(grid.paths_diverge());

        // walking back, the left bias takes the deletion first, so it is the last op going forward
        assert_eq!(grid.left_alignment(), vec![
            AlignmentOp::Match, AlignmentOp::Insertion, AlignmentOp::Deletion, AlignmentOp::Match
        ]);
        assert_eq!(grid.right_alignment(), vec![
            AlignmentOp::Match, AlignmentOp::Deletion, AlignmentOp::Insertion, AlignmentOp::Match
        ]);

        // shared cells carry both path flags
        assert_ne!(grid.cell(0, 0) & LEFT_PATH, 0);
        assert_ne!(grid.cell(0, 0) & RIGHT_PATH, 0);
        assert_ne!(grid.cell(3, 3) & LEFT_PATH, 0);
        assert_ne!(grid.cell(3, 3) & RIGHT_PATH, 0);
        assert_ne!(grid.cell(2, 1) & LEFT_PATH, 0);
        assert_eq!(grid.cell(2, 1) & RIGHT_PATH, 0);
        assert_ne!(grid.cell(1, 2) & RIGHT_PATH, 0);
    }

    #[test]
    fn test_identical_paths() {
        let grid = GridWFA::align(b"ACGT", b"ACGT").unwrap();
        assert!(!grid.paths_diverge());
        assert_eq!(grid.left_path(), &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
        assert_eq!(grid.generation(4, 4), Some(0));
        assert_eq!(grid.generation(1, 0), None);
    }

    #[test]
    fn test_render() {
        let grid = GridWFA::align(b"AGT", b"ACT").unwrap();
        let rendered = grid.render(b"AGT", b"ACT");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "      A  C  T");
        assert!(lines[1].starts_with("  #o"));
        assert!(lines[4].ends_with("\\o"));
    }

    #[test]
    fn test_agrees_with_diagonal_engine() {
        let pairs: [(&[u8], &[u8]); 8] = [
            (b"ACGT", b"AGGT"),
            (b"ACGTTGCA", b"ACGTGCA"),
            (b"TTTT", b"AAAA"),
            (b"GATTACA", b"GCATGCT"),
            (b"AAAAAAAAAC", b"CAAAAAAAAA"),
            (b"", b"ACGT"),
            (b"ACACACAC", b"CACACACA"),
            (b"ACGGTCA", b"ACGTCCA")
        ];
        for (seq_a, seq_b) in pairs.into_iter() {
            let grid = GridWFA::align(seq_a, seq_b).unwrap();
            let dwfa = DiagonalWFA::align(seq_a, seq_b).unwrap();
            let expected = indel_distance(seq_a, seq_b);
            assert_eq!(grid.score(), expected);
            assert_eq!(dwfa.edit_distance(), expected);

            for ops in [grid.left_alignment(), grid.right_alignment()] {
                assert!(is_valid_alignment(&ops, seq_a, seq_b));
                assert_eq!(alignment_cost(&ops), expected);
            }
        }
    }

    fn all_sequences(alphabet: &[u8], max_len: usize) -> Vec<Vec<u8>> {
        let mut ret: Vec<Vec<u8>> = vec![vec![]];
        let mut previous: Vec<Vec<u8>> = vec![vec![]];
        for _ in 0..max_len {
            let next: Vec<Vec<u8>> = previous.iter()
                .flat_map(|seq| alphabet.iter().map(move |&c| {
                    let mut extended = seq.clone();
                    extended.push(c);
                    extended
                }))
                .collect();
            ret.extend(next.iter().cloned());
            previous = next;
        }
        ret
    }

    #[test]
    fn test_exhaustive_small_sequences() {
        let sequences = all_sequences(b"ACG", 4);
        for seq_a in sequences.iter() {
            for seq_b in sequences.iter() {
                let grid = GridWFA::align(seq_a, seq_b).unwrap();
                let reverse = GridWFA::align(seq_b, seq_a).unwrap();
                let dwfa = DiagonalWFA::align(seq_a, seq_b).unwrap();
                assert_eq!(grid.score(), dwfa.edit_distance());
                assert_eq!(grid.score(), reverse.score());
                assert_eq!(grid.score(), indel_distance(seq_a, seq_b));
                assert!(grid.score() <= seq_a.len() + seq_b.len());

                for ops in [grid.left_alignment(), grid.right_alignment()] {
                    assert!(is_valid_alignment(&ops, seq_a, seq_b));
                    assert_eq!(alignment_cost(&ops), grid.score());
                }
            }
        }
    }
}
