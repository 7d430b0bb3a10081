use itertools::Itertools;
use std::ops::Range;

use crate::data_types::phase_enums::Haplotype;
use crate::data_types::variants::{Variant, VariantType};

#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("variant #{index} at position {position} belongs to {found:?}, expected {expected:?}")]
    WrongHaplotype { index: usize, position: usize, expected: Haplotype, found: Haplotype },
    #[error("variant #{index} at position {position} overlaps the previous variant ending at {previous_end}")]
    Overlap { index: usize, position: usize, previous_end: usize },
    #[error("variant #{index} at position {position} has unexpected type {variant_type:?}")]
    UnexpectedVariantType { index: usize, position: usize, variant_type: VariantType },
    #[error("cluster boundaries must start at 0, strictly increase, and end with the stream length {length}: {boundaries:?}")]
    InvalidBoundaries { length: usize, boundaries: Vec<usize> }
}

/// An ordered, non-overlapping list of variants on one haplotype of one contig, pre-grouped into clusters.
/// Cluster `c` covers the variant indices `boundaries[c]..boundaries[c+1]`, the last boundary is a sentinel equal to the stream length.
#[derive(Clone, Debug)]
pub struct VariantStream {
    /// The haplotype every variant belongs to
    haplotype: Haplotype,
    /// The variants in position order
    variants: Vec<Variant>,
    /// Index of the first variant in each cluster, followed by the sentinel
    boundaries: Vec<usize>
}

impl VariantStream {
    /// Creates an empty stream, which has no clusters but still carries the sentinel.
    pub fn empty(haplotype: Haplotype) -> Self {
        Self {
            haplotype,
            variants: vec![],
            boundaries: vec![0]
        }
    }

    /// Creates a stream with the provided cluster boundaries.
    /// # Arguments
    /// * `haplotype` - the haplotype of this stream
    /// * `variants` - the variants, sorted and non-overlapping
    /// * `boundaries` - cluster start indices with a trailing sentinel equal to `variants.len()`
    /// # Errors
    /// * if any variant is on the wrong haplotype, is a reference call, or overlaps the previous variant
    /// * if the boundaries are not a strictly increasing partition of the stream
    pub fn new(haplotype: Haplotype, variants: Vec<Variant>, boundaries: Vec<usize>) -> Result<Self, StreamError> {
        validate_variants(haplotype, &variants)?;

        let length = variants.len();
        let valid_boundaries = boundaries.first() == Some(&0) &&
            boundaries.last() == Some(&length) &&
            boundaries.iter().tuple_windows().all(|(a, b)| a < b);
        if !valid_boundaries {
            return Err(StreamError::InvalidBoundaries { length, boundaries });
        }

        Ok(Self {
            haplotype,
            variants,
            boundaries
        })
    }

    /// Creates a stream and splits it into clusters using the gap threshold.
    /// A new cluster starts whenever a variant's span starts at or beyond the current cluster end plus `gap`.
    /// # Arguments
    /// * `haplotype` - the haplotype of this stream
    /// * `variants` - the variants, sorted and non-overlapping
    /// * `gap` - the gap threshold in reference bases
    /// # Errors
    /// * if any variant is on the wrong haplotype, is a reference call, or overlaps the previous variant
    pub fn from_variants(haplotype: Haplotype, variants: Vec<Variant>, gap: usize) -> Result<Self, StreamError> {
        validate_variants(haplotype, &variants)?;

        let mut boundaries = vec![];
        let mut cluster_end: Option<usize> = None;
        for (index, variant) in variants.iter().enumerate() {
            let (start, end) = variant_span(variant);
            cluster_end = match cluster_end {
                Some(current_end) if start < current_end + gap => Some(current_end.max(end)),
                _ => {
                    boundaries.push(index);
                    Some(end)
                }
            };
        }
        boundaries.push(variants.len());

        Ok(Self {
            haplotype,
            variants,
            boundaries
        })
    }

    /// Number of clusters in the stream, which excludes the sentinel
    pub fn num_clusters(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// The variant indices belonging to cluster `cluster_index`
    /// # Panics
    /// * if `cluster_index` is not a valid cluster
    pub fn cluster_variants(&self, cluster_index: usize) -> Range<usize> {
        self.boundaries[cluster_index]..self.boundaries[cluster_index+1]
    }

    /// Converts a range of cluster indices into the range of variant indices they cover.
    /// An empty cluster range maps to an empty variant range.
    pub fn variant_range(&self, clusters: &Range<usize>) -> Range<usize> {
        if clusters.is_empty() {
            let index = self.boundaries[clusters.start.min(self.num_clusters())];
            index..index
        } else {
            self.boundaries[clusters.start]..self.boundaries[clusters.end]
        }
    }

    /// First reference position of a cluster's span, one flanking base before the first variant
    pub fn cluster_start(&self, cluster_index: usize) -> usize {
        let first = &self.variants[self.boundaries[cluster_index]];
        variant_span(first).0
    }

    /// Reference position after a cluster's span, exclusive, with one flanking base after the furthest variant end.
    pub fn cluster_end(&self, cluster_index: usize) -> usize {
        self.variants[self.cluster_variants(cluster_index)].iter()
            .map(|v| variant_span(v).1)
            .max()
            .unwrap_or_default()
    }

    /// Returns the variants in a given index range
    pub fn slice(&self, range: Range<usize>) -> &[Variant] {
        &self.variants[range]
    }

    // getters
    pub fn haplotype(&self) -> Haplotype {
        self.haplotype
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// The span of reference covered by a variant, including one flanking base on either side
fn variant_span(variant: &Variant) -> (usize, usize) {
    (variant.position().saturating_sub(1), variant.end() + 1)
}

/// Checks the invariants shared by every stream constructor
fn validate_variants(haplotype: Haplotype, variants: &[Variant]) -> Result<(), StreamError> {
    for (index, variant) in variants.iter().enumerate() {
        if variant.haplotype() != haplotype {
            return Err(StreamError::WrongHaplotype {
                index, position: variant.position(), expected: haplotype, found: variant.haplotype()
            });
        }
        if variant.variant_type() == VariantType::Reference {
            return Err(StreamError::UnexpectedVariantType {
                index, position: variant.position(), variant_type: variant.variant_type()
            });
        }
    }

    // variants may share a position only when the earlier one is an insertion
    for (index, (previous, current)) in variants.iter().tuple_windows().enumerate() {
        if current.position() < previous.end() {
            return Err(StreamError::Overlap {
                index: index + 1, position: current.position(), previous_end: previous.end()
            });
        }
    }
    Ok(())
}
