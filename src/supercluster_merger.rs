use std::ops::Range;

use crate::data_types::supercluster::{StreamLabel, Supercluster};
use crate::data_types::variant_stream::VariantStream;

/// Sweeps the clusters of four haplotype streams on one contig and groups them into superclusters.
/// Two clusters land in the same supercluster whenever one starts before the other's (growing) end plus the gap threshold.
pub struct SuperclusterMerger<'a> {
    /// The input streams, indexed by `StreamLabel::index()`
    streams: [&'a VariantStream; 4],
    /// The next un-absorbed cluster in each stream
    next_cluster: [usize; 4],
    /// Gap threshold in reference bases
    gap: usize,
    /// Length of the contig, used to clamp the emitted intervals
    contig_length: usize
}

impl<'a> SuperclusterMerger<'a> {
    /// Creates a new merger over the four streams of one contig.
    /// # Arguments
    /// * `streams` - the streams in `StreamLabel` order: call hap1, call hap2, truth hap1, truth hap2
    /// * `gap` - the gap threshold, clusters closer than this are merged
    /// * `contig_length` - the length of the contig
    pub fn new(streams: [&'a VariantStream; 4], gap: usize, contig_length: usize) -> Self {
        Self {
            streams,
            next_cluster: [0; 4],
            gap,
            contig_length
        }
    }

    /// Start of the next un-absorbed cluster in a stream, if any remain
    fn next_start(&self, stream_index: usize) -> Option<usize> {
        let stream = self.streams[stream_index];
        let cluster_index = self.next_cluster[stream_index];
        if cluster_index < stream.num_clusters() {
            Some(stream.cluster_start(cluster_index))
        } else {
            None
        }
    }

    /// Absorbs the next cluster of a stream, returning its (start, end) span
    fn absorb(&mut self, stream_index: usize) -> (usize, usize) {
        let stream = self.streams[stream_index];
        let cluster_index = self.next_cluster[stream_index];
        self.next_cluster[stream_index] += 1;
        (stream.cluster_start(cluster_index), stream.cluster_end(cluster_index))
    }

    /// Returns the input stream for a label
    pub fn stream(&self, label: StreamLabel) -> &'a VariantStream {
        self.streams[label.index()]
    }
}

impl Iterator for SuperclusterMerger<'_> {
    type Item = Supercluster;

    fn next(&mut self) -> Option<Self::Item> {
        // earliest start wins, strict comparison keeps the label priority on ties
        let mut first_stream: Option<(usize, usize)> = None;
        for stream_index in 0..self.streams.len() {
            if let Some(start) = self.next_start(stream_index) {
                if first_stream.map_or(true, |(_, best_start)| start < best_start) {
                    first_stream = Some((stream_index, start));
                }
            }
        }
        let (first_index, _) = first_stream?;

        let range_starts = self.next_cluster;
        let (mut beg_pos, mut end_pos) = self.absorb(first_index);

        // absorb from every stream until a full pass adds nothing
        let mut absorbed = true;
        while absorbed {
            absorbed = false;
            for stream_index in 0..self.streams.len() {
                while let Some(start) = self.next_start(stream_index) {
                    if start >= end_pos + self.gap {
                        break;
                    }
                    let (start, end) = self.absorb(stream_index);
                    beg_pos = beg_pos.min(start);
                    end_pos = end_pos.max(end);
                    absorbed = true;
                }
            }
        }

        let cluster_ranges: [Range<usize>; 4] = std::array::from_fn(|i| range_starts[i]..self.next_cluster[i]);
        let end_pos = end_pos.min(self.contig_length);
        let beg_pos = beg_pos.min(end_pos);
        Some(Supercluster::new(beg_pos, end_pos, cluster_ranges))
    }
}
