use crate::wfa::WFAError;
use crate::wfa::diagonal_wfa::DiagonalWFA;

/// Diagonal WFA wrapper for the indel edit distance of two known sequences.
/// This is much faster than `indel_distance(...)` when the sequences are similar.
/// # Arguments
/// * `v1` - the first sequence
/// * `v2` - the second sequence
/// * `max_edit_distance` - the alignment gives up once the distance exceeds this
/// # Errors
/// * if the distance exceeds `max_edit_distance`
pub fn wfa_distance(v1: &[u8], v2: &[u8], max_edit_distance: usize) -> Result<usize, WFAError> {
    let dwfa = DiagonalWFA::align_bounded(v1, v2, max_edit_distance)?;
    Ok(dwfa.edit_distance())
}

/// Returns the indel edit distance (no substitutions) between two u8 slices by doing the full grid calculation.
/// This version is row-based (rows are length of v1) for the main loop.
/// # Arguments
/// * `v1` - the first sequence
/// * `v2` - the second sequence
pub fn indel_distance(v1: &[u8], v2: &[u8]) -> usize {
    // each "row" is the length of v1
    let l1: usize = v1.len();
    let mut row: Vec<usize> = vec![0; l1+1];
    let mut prev_row: Vec<usize> = (0..l1+1).collect();

    for (i, &c2) in v2.iter().enumerate() {
        row[0] = i+1;
        for (j, &c1) in v1.iter().enumerate() {
            // skip a character in either sequence
            let skip = prev_row[j+1].min(row[j]) + 1;
            row[j+1] = if c1 == c2 {
                skip.min(prev_row[j])
            } else {
                skip
            };
        }
        std::mem::swap(&mut row, &mut prev_row);
    }

    prev_row[l1]
}
