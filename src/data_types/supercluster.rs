use std::ops::Range;

use crate::data_types::coordinates::Coordinates;
use crate::phase_resolver::PhaseResult;

/// The four streams that feed a supercluster, in tie-breaking priority order
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum_macros::AsRefStr, strum_macros::EnumIter)]
pub enum StreamLabel {
    #[strum(serialize = "call_hap1")]
    CallHap1=0,
    #[strum(serialize = "call_hap2")]
    CallHap2,
    #[strum(serialize = "truth_hap1")]
    TruthHap1,
    #[strum(serialize = "truth_hap2")]
    TruthHap2
}

impl StreamLabel {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// A reference interval plus the clusters absorbed from each of the four streams
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Supercluster {
    /// First reference position, inclusive
    beg_pos: usize,
    /// Last reference position, exclusive
    end_pos: usize,
    /// Absorbed cluster indices per stream, indexed by `StreamLabel::index()`
    cluster_ranges: [Range<usize>; 4]
}

impl Supercluster {
    /// Creates a new supercluster
    /// # Panics
    /// * if `beg_pos > end_pos`
    pub fn new(beg_pos: usize, end_pos: usize, cluster_ranges: [Range<usize>; 4]) -> Self {
        assert!(beg_pos <= end_pos, "beg_pos must be <= end_pos");
        Self {
            beg_pos,
            end_pos,
            cluster_ranges
        }
    }

    /// The clusters absorbed from one stream, possibly empty
    pub fn cluster_range(&self, label: StreamLabel) -> &Range<usize> {
        &self.cluster_ranges[label.index()]
    }

    /// Total number of clusters absorbed across all streams
    pub fn num_clusters(&self) -> usize {
        self.cluster_ranges.iter().map(|r| r.len()).sum()
    }

    // getters
    pub fn beg_pos(&self) -> usize {
        self.beg_pos
    }

    pub fn end_pos(&self) -> usize {
        self.end_pos
    }

    pub fn cluster_ranges(&self) -> &[Range<usize>; 4] {
        &self.cluster_ranges
    }
}

/// The retained output for one supercluster: where it was, what it summarized, and the phase verdict
#[derive(Clone, Debug)]
pub struct SuperclusterResult {
    /// Index of the supercluster within its contig
    supercluster_id: usize,
    /// The reference interval that was compared
    coordinates: Coordinates,
    /// The underlying supercluster
    supercluster: Supercluster,
    /// The phase verdict and distances
    phase_result: PhaseResult
}

impl SuperclusterResult {
    pub fn new(supercluster_id: usize, chrom: &str, supercluster: Supercluster, phase_result: PhaseResult) -> Self {
        let coordinates = Coordinates::new(chrom.to_string(), supercluster.beg_pos(), supercluster.end_pos());
        Self {
            supercluster_id,
            coordinates,
            supercluster,
            phase_result
        }
    }

    /// The distance this supercluster contributes to the total
    pub fn distance(&self) -> usize {
        self.phase_result.distance()
    }

    // getters
    pub fn supercluster_id(&self) -> usize {
        self.supercluster_id
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn supercluster(&self) -> &Supercluster {
        &self.supercluster
    }

    pub fn phase_result(&self) -> &PhaseResult {
        &self.phase_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_stream_label_order() {
        let indices: Vec<usize> = StreamLabel::iter().map(|l| l.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(StreamLabel::TruthHap2.as_ref(), "truth_hap2");
    }

    #[test]
    fn test_supercluster() {
        let supercluster = Supercluster::new(5, 20, [0..1, 0..0, 2..4, 1..2]);
        assert_eq!(supercluster.num_clusters(), 4);
        assert_eq!(supercluster.cluster_range(StreamLabel::TruthHap1), &(2..4));
        assert!(supercluster.cluster_range(StreamLabel::CallHap2).is_empty());
    }
}
