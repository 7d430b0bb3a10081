use anyhow::Context;
use derive_builder::Builder;
use indicatif::ParallelProgressIterator;
use itertools::Itertools;
use log::{debug, info, trace};
use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::allele_builder::build_haplotype;
use crate::data_types::callset::Callset;
use crate::data_types::coordinates::Coordinates;
use crate::data_types::phase_enums::Haplotype;
use crate::data_types::reference::ReferenceAccessor;
use crate::data_types::variant_stream::VariantStream;
use crate::data_types::variants::Variant;
use crate::util::progress_bar::get_progress_style;
use crate::wfa::AlignmentOp;
use crate::wfa::grid_wfa::GridWFA;

/// Controls the diagnostic output of the realigner
#[derive(Builder, Clone, Copy, Debug, Default)]
#[builder(default)]
pub struct RealignConfig {
    /// If true, every cluster alignment grid is rendered at trace level
    render_alignments: bool
}

impl RealignConfig {
    pub fn render_alignments(&self) -> bool {
        self.render_alignments
    }
}

/// The realignment of a single cluster against the reference
#[derive(Clone, Debug)]
pub struct RealignedCluster {
    /// The reference span of the cluster
    coordinates: Coordinates,
    /// The stream haplotype
    haplotype: Haplotype,
    /// Index of the cluster within the stream
    cluster_id: usize,
    /// Number of variants in the original cluster
    num_variants: usize,
    /// Summed indel cost of the original variants
    old_distance: usize,
    /// Edit distance of the realigned sequence against the reference
    new_distance: usize,
    /// The variants read back from the left-biased alignment
    variants: Vec<Variant>
}

impl RealignedCluster {
    /// Returns true if realignment found a cheaper representation
    pub fn is_reduced(&self) -> bool {
        self.new_distance < self.old_distance
    }

    // getters
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn haplotype(&self) -> Haplotype {
        self.haplotype
    }

    pub fn cluster_id(&self) -> usize {
        self.cluster_id
    }

    pub fn num_variants(&self) -> usize {
        self.num_variants
    }

    pub fn old_distance(&self) -> usize {
        self.old_distance
    }

    pub fn new_distance(&self) -> usize {
        self.new_distance
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

/// Realignment totals for one callset
#[derive(Clone, Debug, Default)]
pub struct RealignResults {
    clusters: Vec<RealignedCluster>
}

impl RealignResults {
    /// Number of clusters where the distance went down
    pub fn num_reduced(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_reduced()).count()
    }

    pub fn old_distance(&self) -> usize {
        self.clusters.iter().map(|c| c.old_distance()).sum()
    }

    pub fn new_distance(&self) -> usize {
        self.clusters.iter().map(|c| c.new_distance()).sum()
    }

    pub fn clusters(&self) -> &[RealignedCluster] {
        &self.clusters
    }
}

/// Converts alignment operations of a haplotype (A) against the reference (B) into variants.
/// Each run of insertions becomes one insertion, each run of deletions becomes one deletion.
/// # Arguments
/// * `ops` - the alignment operations
/// * `alt_seq` - the haplotype sequence that was aligned
/// * `ref_seq` - the reference sequence that was aligned
/// * `beg_pos` - the reference coordinate of `ref_seq[0]`
/// * `haplotype` - the haplotype to assign to the new variants
/// # Errors
/// * if the operations do not fit the sequences
pub fn ops_to_variants(ops: &[AlignmentOp], alt_seq: &[u8], ref_seq: &[u8], beg_pos: usize, haplotype: Haplotype) -> anyhow::Result<Vec<Variant>> {
    let mut variants = vec![];
    let mut alt_index = 0;
    let mut ref_index = 0;
    for (op, run) in &ops.iter().chunk_by(|&&op| op) {
        let run_length = run.count();
        match op {
            AlignmentOp::Match => {},
            AlignmentOp::Insertion => {
                let inserted = alt_seq.get(alt_index..alt_index+run_length)
                    .with_context(|| format!("Insertion at alt offset {alt_index} runs past the haplotype"))?;
                variants.push(Variant::new_insertion(haplotype, beg_pos + ref_index, inserted.to_vec())?);
            },
            AlignmentOp::Deletion => {
                let deleted = ref_seq.get(ref_index..ref_index+run_length)
                    .with_context(|| format!("Deletion at reference offset {ref_index} runs past the reference"))?;
                variants.push(Variant::new_deletion(haplotype, beg_pos + ref_index, deleted.to_vec())?);
            }
        };

        if op != AlignmentOp::Deletion {
            alt_index += run_length;
        }
        if op != AlignmentOp::Insertion {
            ref_index += run_length;
        }
    }
    Ok(variants)
}

/// Realigns a single cluster of a stream against the reference.
/// # Arguments
/// * `contig` - the contig name
/// * `stream` - the haplotype stream
/// * `cluster_id` - the cluster to realign
/// * `reference` - the reference lookup
/// * `config` - the realignment settings
/// # Errors
/// * if the contig is missing from the reference
/// * if the haplotype cannot be built or aligned
pub fn realign_cluster<R: ReferenceAccessor + ?Sized>(
    contig: &str, stream: &VariantStream, cluster_id: usize, reference: &R, config: RealignConfig
) -> anyhow::Result<RealignedCluster> {
    let contig_length = reference.contig_length(contig)
        .with_context(|| format!("Error while looking up contig {contig:?}:"))?;
    let end_pos = stream.cluster_end(cluster_id).min(contig_length);
    let beg_pos = stream.cluster_start(cluster_id).min(end_pos);
    let coordinates = Coordinates::new(contig.to_string(), beg_pos, end_pos);

    let cluster_variants = stream.slice(stream.cluster_variants(cluster_id));
    let alt_seq = build_haplotype(reference, contig, beg_pos, end_pos, cluster_variants)
        .with_context(|| format!("Error while building haplotype for {coordinates}:"))?;
    let ref_seq = reference.subsequence(contig, beg_pos, end_pos)?;

    let grid = GridWFA::align(alt_seq.sequence(), ref_seq)
        .with_context(|| format!("Error while aligning haplotype for {coordinates}:"))?;
    if config.render_alignments() {
        trace!("{} cluster {cluster_id} at {coordinates}, score {}:\n{}",
            stream.haplotype().as_ref(), grid.score(), grid.render(alt_seq.sequence(), ref_seq)
        );
    }

    let variants = ops_to_variants(&grid.left_alignment(), alt_seq.sequence(), ref_seq, beg_pos, stream.haplotype())
        .with_context(|| format!("Error while converting alignment for {coordinates}:"))?;
    let old_distance: usize = cluster_variants.iter().map(|v| v.indel_cost()).sum();
    let new_distance = grid.score();
    if new_distance < old_distance {
        debug!("{} cluster {cluster_id} at {coordinates}: {old_distance} => {new_distance}", stream.haplotype().as_ref());
    }

    Ok(RealignedCluster {
        coordinates,
        haplotype: stream.haplotype(),
        cluster_id,
        num_variants: cluster_variants.len(),
        old_distance,
        new_distance,
        variants
    })
}

/// Realigns every cluster of both haplotypes of a callset, contigs are processed in parallel.
/// # Arguments
/// * `callset` - the callset to realign
/// * `reference` - the reference lookup
/// * `config` - the realignment settings
/// # Errors
/// * if any cluster fails, in which case no results are returned
pub fn realign_callset<R: ReferenceAccessor + Sync + ?Sized>(
    callset: &Callset, reference: &R, config: RealignConfig
) -> anyhow::Result<RealignResults> {
    let contigs: Vec<(&String, Haplotype)> = callset.contigs().keys()
        .cartesian_product(Haplotype::iter())
        .collect();

    info!("Realigning {} haplotype streams from {:?}...", contigs.len(), callset.label());
    let style = get_progress_style();
    let all_results: Vec<anyhow::Result<Vec<RealignedCluster>>> = contigs.par_iter()
        .map(|&(contig, haplotype)| -> anyhow::Result<Vec<RealignedCluster>> {
            let stream = callset.get_contig(contig)
                .with_context(|| format!("Contig {contig:?} is missing from the callset"))?
                .get(haplotype);
            (0..stream.num_clusters())
                .map(|cluster_id| realign_cluster(contig, stream, cluster_id, reference, config))
                .collect()
        })
        .progress_with_style(style)
        .collect();

    let mut clusters = vec![];
    for result in all_results.into_iter() {
        clusters.extend(result?);
    }
    let results = RealignResults { clusters };

    info!("Edit distance reduced in {} of {} clusters, from {} to {}.",
        results.num_reduced(), results.clusters().len(), results.old_distance(), results.new_distance()
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_lib_reference_genome::reference_genome::ReferenceGenome;
    use crate::data_types::callset::HaplotypeStreams;
    use crate::data_types::variants::VariantType;

    fn mock_reference() -> ReferenceGenome {
        let mut reference = ReferenceGenome::empty_reference();
        reference.add_contig("mock".to_string(), "ACGTACGTACGTACGTACGT").unwrap();
        reference
    }

    #[test]
    fn test_ops_to_variants() {
        let ops = [
            AlignmentOp::Match, AlignmentOp::Insertion, AlignmentOp::Insertion,
            AlignmentOp::Match, AlignmentOp::Deletion, AlignmentOp::Deletion, AlignmentOp::Deletion,
            AlignmentOp::Match
        ];
        let variants = ops_to_variants(&ops, b"ATTCG", b"ACGTAG", 10, Haplotype::Hap2).unwrap();
        assert_eq!(variants, vec![
            Variant::new_insertion(Haplotype::Hap2, 11, b"TT".to_vec()).unwrap(),
            Variant::new_deletion(Haplotype::Hap2, 12, b"GTA".to_vec()).unwrap()
        ]);

        // operations that run past the sequences are rejected
        assert!(ops_to_variants(&[AlignmentOp::Insertion], b"", b"", 0, Haplotype::Hap1).is_err());
    }

    #[test]
    fn test_cancelling_indels() {
        // deleting C and re-inserting it is the reference
        let reference = mock_reference();
        let variants = vec![
            Variant::new_deletion(Haplotype::Hap1, 1, b"C".to_vec()).unwrap(),
            Variant::new_insertion(Haplotype::Hap1, 2, b"C".to_vec()).unwrap()
        ];
        let stream = VariantStream::from_variants(Haplotype::Hap1, variants, 50).unwrap();
        let realigned = realign_cluster("mock", &stream, 0, &reference, RealignConfig::default()).unwrap();
        assert_eq!(realigned.coordinates().start(), 0);
        assert_eq!(realigned.coordinates().end(), 3);
        assert_eq!(realigned.old_distance(), 2);
        assert_eq!(realigned.new_distance(), 0);
        assert!(realigned.is_reduced());
        assert!(realigned.variants().is_empty());
    }

    #[test]
    fn test_substitution_left_alignment() {
        let reference = mock_reference();
        let variants = vec![Variant::new_substitution(Haplotype::Hap1, 1, b"C".to_vec(), b"G".to_vec()).unwrap()];
        let stream = VariantStream::from_variants(Haplotype::Hap1, variants, 50).unwrap();
        let realigned = realign_cluster("mock", &stream, 0, &reference, RealignConfig::default()).unwrap();
        assert_eq!(realigned.old_distance(), 2);
        assert_eq!(realigned.new_distance(), 2);
        assert!(!realigned.is_reduced());

        let types: Vec<VariantType> = realigned.variants().iter().map(|v| v.variant_type()).collect();
        assert_eq!(types, vec![VariantType::Insertion, VariantType::Deletion]);
        assert_eq!(realigned.variants()[0].position(), 1);
        assert_eq!(realigned.variants()[0].alt_allele(), b"G");
        assert_eq!(realigned.variants()[1].position(), 1);
        assert_eq!(realigned.variants()[1].ref_allele(), b"C");
    }

    #[test]
    fn test_realign_callset() {
        let reference = mock_reference();
        let hap1 = VariantStream::from_variants(Haplotype::Hap1, vec![
            Variant::new_deletion(Haplotype::Hap1, 5, b"C".to_vec()).unwrap(),
            Variant::new_insertion(Haplotype::Hap1, 6, b"C".to_vec()).unwrap()
        ], 50).unwrap();
        let hap2 = VariantStream::from_variants(Haplotype::Hap2, vec![
            Variant::new_insertion(Haplotype::Hap2, 12, b"GG".to_vec()).unwrap()
        ], 50).unwrap();
        let mut callset = Callset::new("query".to_string(), "sample".to_string());
        callset.insert_contig("mock".to_string(), HaplotypeStreams::new(hap1, hap2));

        let results = realign_callset(&callset, &reference, RealignConfig::default()).unwrap();
        assert_eq!(results.clusters().len(), 2);
        assert_eq!(results.clusters()[0].haplotype(), Haplotype::Hap1);
        assert_eq!(results.num_reduced(), 1);
        assert_eq!(results.old_distance(), 4);
        assert_eq!(results.new_distance(), 2);
    }
}
