use crate::data_types::phase_enums::PhaseDecision;
use crate::util::sequence_alignment::wfa_distance;
use crate::wfa::WFAError;

/// The outcome of comparing both call haplotypes against both truth haplotypes
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PhaseResult {
    /// Which pairing was chosen
    decision: PhaseDecision,
    /// d(C1,H1) + d(C2,H2)
    orig_distance: usize,
    /// d(C2,H1) + d(C1,H2)
    swap_distance: usize,
    /// The four pairwise distances in the order C1H1, C1H2, C2H1, C2H2
    pair_distances: [usize; 4]
}

impl PhaseResult {
    /// Derives the phase verdict from the four pairwise distances.
    /// # Arguments
    /// * `pair_distances` - distances in the order C1H1, C1H2, C2H1, C2H2
    pub fn from_distances(pair_distances: [usize; 4]) -> Self {
        let [c1h1, c1h2, c2h1, c2h2] = pair_distances;
        let orig_distance = c1h1 + c2h2;
        let swap_distance = c2h1 + c1h2;
        Self {
            decision: PhaseDecision::from_distances(orig_distance, swap_distance),
            orig_distance,
            swap_distance,
            pair_distances
        }
    }

    /// The distance contributed to the total, which is the better of the two pairings
    pub fn distance(&self) -> usize {
        self.orig_distance.min(self.swap_distance)
    }

    // getters
    pub fn decision(&self) -> PhaseDecision {
        self.decision
    }

    pub fn orig_distance(&self) -> usize {
        self.orig_distance
    }

    pub fn swap_distance(&self) -> usize {
        self.swap_distance
    }

    pub fn pair_distances(&self) -> [usize; 4] {
        self.pair_distances
    }
}

/// Scores both call haplotypes against both truth haplotypes and picks the cheaper pairing.
/// # Arguments
/// * `call1` - the call hap1 sequence
/// * `call2` - the call hap2 sequence
/// * `truth1` - the truth hap1 sequence
/// * `truth2` - the truth hap2 sequence
/// * `max_edit_distance` - the bound passed to each alignment
/// # Errors
/// * if any of the four alignments exceeds `max_edit_distance`
pub fn resolve_phase(call1: &[u8], call2: &[u8], truth1: &[u8], truth2: &[u8], max_edit_distance: usize) -> Result<PhaseResult, WFAError> {
    let distance = |call: &[u8], truth: &[u8]| wfa_distance(call, truth, max_edit_distance);
    let pair_distances = [
        distance(call1, truth1)?,
        distance(call1, truth2)?,
        distance(call2, truth1)?,
        distance(call2, truth2)?
    ];
    Ok(PhaseResult::from_distances(pair_distances))
}
