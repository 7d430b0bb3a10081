use crate::wfa::{AlignmentOp, WFAError};

/// Records how a diagonal offset was reached from the previous score layer
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provenance {
    /// The zero diagonal at score 0
    Start,
    /// From the diagonal to the left, consuming one character of B
    Left,
    /// From the diagonal above, consuming one character of A
    Up
}

/// Edit distance engine that keeps one furthest-reaching offset per diagonal for every score.
/// Diagonal `d = offset_b - offset_a` is stored in column `d + len_a`, so the table is `len_a + len_b + 1` wide.
/// Offsets are the number of characters of A consumed on that diagonal, and the matching offset into B is implied by the diagonal.
/// Both sequences are described by consumed-prefix lengths, which lets either one be empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiagonalWFA {
    /// Length of sequence A, the rows
    len_a: usize,
    /// Length of sequence B, the columns
    len_b: usize,
    /// The final edit distance between A and B
    edit_distance: usize,
    /// Furthest A offset reached, indexed by `[score][diagonal]`
    offsets: Vec<Vec<Option<usize>>>,
    /// Parallel to `offsets`, which predecessor each offset came from
    provenance: Vec<Vec<Option<Provenance>>>
}

impl DiagonalWFA {
    /// Aligns two sequences end-to-end with no bound on the edit distance.
    /// # Arguments
    /// * `seq_a` - the first sequence, rows of the conceptual grid
    /// * `seq_b` - the second sequence, columns of the conceptual grid
    /// # Errors
    /// * None currently, the result type is shared with `align_bounded`
    pub fn align(seq_a: &[u8], seq_b: &[u8]) -> Result<DiagonalWFA, WFAError> {
        Self::align_bounded(seq_a, seq_b, usize::MAX)
    }

    /// Aligns two sequences end-to-end, giving up once the score would exceed `max_edit_distance`.
    /// # Arguments
    /// * `seq_a` - the first sequence, rows of the conceptual grid
    /// * `seq_b` - the second sequence, columns of the conceptual grid
    /// * `max_edit_distance` - the largest edit distance we will compute
    /// # Errors
    /// * if the sequences are further apart than `max_edit_distance`
    pub fn align_bounded(seq_a: &[u8], seq_b: &[u8], max_edit_distance: usize) -> Result<DiagonalWFA, WFAError> {
        let len_a = seq_a.len();
        let len_b = seq_b.len();
        let width = len_a + len_b + 1;
        let final_diagonal = len_b;

        // score 0 is the free run of matches from the origin
        let mut initial: Vec<Option<usize>> = vec![None; width];
        let mut initial_provenance: Vec<Option<Provenance>> = vec![None; width];
        initial[len_a] = Some(extend(seq_a, seq_b, 0, 0));
        initial_provenance[len_a] = Some(Provenance::Start);

        let mut offsets = vec![initial];
        let mut provenance = vec![initial_provenance];
        let mut score = 0;
        while offsets[score][final_diagonal] != Some(len_a) {
            if score >= max_edit_distance {
                return Err(WFAError::MaxEditDistance { max_edit_distance });
            }

            let (layer, layer_provenance) = next_layer(seq_a, seq_b, &offsets[score], score + 1);
            offsets.push(layer);
            provenance.push(layer_provenance);
            score += 1;
        }

        Ok(DiagonalWFA {
            len_a,
            len_b,
            edit_distance: score,
            offsets,
            provenance
        })
    }

    /// Replays the provenance table from the final cell back to the origin.
    /// The returned operations are in forward order and consume all of A and B.
    /// # Errors
    /// * if a recorded predecessor is missing, which indicates an internal inconsistency
    pub fn alignment_path(&self) -> Result<Vec<AlignmentOp>, WFAError> {
        let mut ops = vec![];
        let mut score = self.edit_distance;
        let mut diagonal = self.len_b;
        let mut offset_a = self.len_a;
        loop {
            let failure = || WFAError::BacktrackFailed { row: offset_a, col: (offset_a + diagonal).saturating_sub(self.len_a) };
            let source = self.provenance[score][diagonal];

            // find the offset this layer started from before extending along the diagonal
            let (start_a, previous) = match source {
                Some(Provenance::Start) => (0, None),
                Some(Provenance::Left) => {
                    let previous_diagonal = diagonal.checked_sub(1).ok_or_else(failure)?;
                    let previous_offset = self.previous_offset(score, previous_diagonal).ok_or_else(failure)?;
                    (previous_offset, Some((previous_diagonal, previous_offset)))
                },
                Some(Provenance::Up) => {
                    let previous_diagonal = diagonal + 1;
                    let previous_offset = self.previous_offset(score, previous_diagonal).ok_or_else(failure)?;
                    (previous_offset + 1, Some((previous_diagonal, previous_offset)))
                },
                None => return Err(failure())
            };

            if start_a > offset_a {
                return Err(failure());
            }
            ops.extend(std::iter::repeat(AlignmentOp::Match).take(offset_a - start_a));
            match source {
                Some(Provenance::Left) => ops.push(AlignmentOp::Deletion),
                Some(Provenance::Up) => ops.push(AlignmentOp::Insertion),
                _ => {}
            }

            match previous {
                Some((previous_diagonal, previous_offset)) => {
                    diagonal = previous_diagonal;
                    offset_a = previous_offset;
                    score -= 1;
                },
                None => break
            }
        }

        ops.reverse();
        Ok(ops)
    }

    /// Looks up the offset one layer below `score`
    fn previous_offset(&self, score: usize, diagonal: usize) -> Option<usize> {
        let previous_score = score.checked_sub(1)?;
        self.offsets[previous_score].get(diagonal).copied().flatten()
    }

    /// Returns the furthest A offset on a diagonal for a given score, where `diagonal = offset_b - offset_a`.
    pub fn offset(&self, score: usize, diagonal: isize) -> Option<usize> {
        let column = diagonal + self.len_a as isize;
        if column < 0 {
            return None;
        }
        self.offsets.get(score)?
            .get(column as usize)
            .copied()
            .flatten()
    }

    // getters
    pub fn edit_distance(&self) -> usize {
        self.edit_distance
    }

    pub fn offsets(&self) -> &[Vec<Option<usize>>] {
        &self.offsets
    }

    pub fn provenance(&self) -> &[Vec<Option<Provenance>>] {
        &self.provenance
    }
}

/// Slides along a diagonal while the characters match, returns the final A offset.
fn extend(seq_a: &[u8], seq_b: &[u8], mut offset_a: usize, mut offset_b: usize) -> usize {
    while offset_a < seq_a.len() && offset_b < seq_b.len() && seq_a[offset_a] == seq_b[offset_b] {
        offset_a += 1;
        offset_b += 1;
    }
    offset_a
}

/// Builds the wavefront for `score` from the wavefront at `score - 1`.
/// Each diagonal takes the further of its left predecessor and its up predecessor plus one, preferring left on ties.
fn next_layer(seq_a: &[u8], seq_b: &[u8], previous: &[Option<usize>], score: usize) -> (Vec<Option<usize>>, Vec<Option<Provenance>>) {
    let len_a = seq_a.len();
    let len_b = seq_b.len();
    let width = previous.len();
    let mut layer: Vec<Option<usize>> = vec![None; width];
    let mut layer_provenance: Vec<Option<Provenance>> = vec![None; width];

    // at a given score, only diagonals with |d| <= score can be populated
    let first_diagonal = len_a.saturating_sub(score);
    let last_diagonal = (len_a + score).min(width - 1);
    for diagonal in first_diagonal..=last_diagonal {
        // left: same A offset, one more character of B; must not run off the end of B
        let left = if diagonal > 0 {
            previous[diagonal-1].filter(|&a| a + diagonal <= len_a + len_b)
        } else {
            None
        };

        // up: one more character of A; must not run off the end of A
        let up = previous.get(diagonal+1)
            .copied()
            .flatten()
            .map(|a| a + 1)
            .filter(|&a| a <= len_a);

        let (offset_a, source) = match (left, up) {
            (Some(l), Some(u)) => if l >= u { (l, Provenance::Left) } else { (u, Provenance::Up) },
            (Some(l), None) => (l, Provenance::Left),
            (None, Some(u)) => (u, Provenance::Up),
            (None, None) => continue
        };

        let offset_b = offset_a + diagonal - len_a;
        layer[diagonal] = Some(extend(seq_a, seq_b, offset_a, offset_b));
        layer_provenance[diagonal] = Some(source);
    }

    (layer, layer_provenance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::sequence_alignment::indel_distance;
    use crate::wfa::{alignment_cost, is_valid_alignment};

    /// All sequences over a small alphabet up to a maximum length
    fn all_sequences(alphabet: &[u8], max_len: usize) -> Vec<Vec<u8>> {
        let mut ret: Vec<Vec<u8>> = vec![vec![]];
        let mut previous: Vec<Vec<u8>> = vec![vec![]];
        for _ in 0..max_len {
            let mut next = vec![];
            for seq in previous.iter() {
                for &c in alphabet.iter() {
                    let mut extended = seq.clone();
                    extended.push(c);
                    next.push(extended);
                }
            }
            ret.extend(next.iter().cloned());
            previous = next;
        }
        ret
    }

    #[test]
    fn test_basic_distances() {
        assert_eq!(DiagonalWFA::align(b"", b"").unwrap().edit_distance(), 0);
        assert_eq!(DiagonalWFA::align(b"ACGT", b"").unwrap().edit_distance(), 4);
        assert_eq!(DiagonalWFA::align(b"", b"ACG").unwrap().edit_distance(), 3);
        assert_eq!(DiagonalWFA::align(b"ACGT", b"ACGT").unwrap().edit_distance(), 0);
        assert_eq!(DiagonalWFA::align(b"AC", b"AXC").unwrap().edit_distance(), 1);
        assert_eq!(DiagonalWFA::align(b"AXC", b"AC").unwrap().edit_distance(), 1);
        assert_eq!(DiagonalWFA::align(b"AGGT", b"ACGT").unwrap().edit_distance(), 2);
        assert_eq!(DiagonalWFA::align(b"ACGTTT", b"TTACGT").unwrap().edit_distance(), 4);
    }

    #[test]
    fn test_identity_uses_initial_extension() {
        let dwfa = DiagonalWFA::align(b"ACGTACGT", b"ACGTACGT").unwrap();
        assert_eq!(dwfa.edit_distance(), 0);
        assert_eq!(dwfa.offsets().len(), 1);
        assert_eq!(dwfa.offset(0, 0), Some(8));
        assert_eq!(dwfa.alignment_path().unwrap(), vec![AlignmentOp::Match; 8]);
    }

    #[test]
    fn test_left_preferred_on_ties() {
        // both predecessors reach the final cell, the left one wins
        let dwfa = DiagonalWFA::align(b"A", b"C").unwrap();
        assert_eq!(dwfa.edit_distance(), 2);
        assert_eq!(dwfa.provenance()[2][1], Some(Provenance::Left));
        assert_eq!(dwfa.alignment_path().unwrap(), vec![AlignmentOp::Insertion, AlignmentOp::Deletion]);
    }

    #[test]
    fn test_max_edit_distance() {
        let result = DiagonalWFA::align_bounded(b"AAAA", b"CCCC", 3);
        assert!(matches!(result, Err(WFAError::MaxEditDistance { max_edit_distance: 3 })));
        let dwfa = DiagonalWFA::align_bounded(b"AAAA", b"CCCC", 8).unwrap();
        assert_eq!(dwfa.edit_distance(), 8);
    }

    #[test]
    fn test_exhaustive_small_sequences() {
        let sequences = all_sequences(b"AC", 4);
        for seq_a in sequences.iter() {
            for seq_b in sequences.iter() {
                let forward = DiagonalWFA::align(seq_a, seq_b).unwrap();
                let reverse = DiagonalWFA::align(seq_b, seq_a).unwrap();
                let expected = indel_distance(seq_a, seq_b);
                assert_eq!(forward.edit_distance(), expected, "{seq_a:?} vs {seq_b:?}");
                assert_eq!(reverse.edit_distance(), expected, "{seq_b:?} vs {seq_a:?}");
                assert!(expected <= seq_a.len() + seq_b.len());

                let path = forward.alignment_path().unwrap();
                assert!(is_valid_alignment(&path, seq_a, seq_b), "{seq_a:?} vs {seq_b:?}: {path:?}");
                assert_eq!(alignment_cost(&path), expected);
            }
        }
    }
}
