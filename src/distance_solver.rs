use anyhow::Context;
use derive_builder::Builder;
use indicatif::ParallelProgressIterator;
use log::{debug, info, trace};
use rayon::prelude::*;

use crate::allele_builder::build_haplotype_pair;
use crate::data_types::callset::{Callset, HaplotypeStreams, joint_contig_order};
use crate::data_types::phase_enums::PhaseDecision;
use crate::data_types::reference::ReferenceAccessor;
use crate::data_types::supercluster::{StreamLabel, Supercluster, SuperclusterResult};
use crate::data_types::variant_stream::VariantStream;
use crate::data_types::variants::Variant;
use crate::phase_resolver::resolve_phase;
use crate::supercluster_merger::SuperclusterMerger;
use crate::util::progress_bar::get_progress_style;
use crate::wfa::grid_wfa::GridWFA;

/// Controls how superclusters are formed and scored
#[derive(Builder, Clone, Copy, Debug)]
#[builder(default)]
pub struct DistanceConfig {
    /// Clusters closer than this many bases are compared together
    gap: usize,
    /// Alignments that would exceed this edit distance are errors
    max_edit_distance: usize,
    /// If true, the chosen call/truth alignments of mismatched superclusters are rendered at trace level
    render_alignments: bool
}

impl Default for DistanceConfig {
    fn default() -> Self {
        // these settings are set to reasonable defaults for unit tests
        // main.rs will set each of them manually based on user input
        Self {
            gap: 50,
            max_edit_distance: usize::MAX,
            render_alignments: false
        }
    }
}

impl DistanceConfig {
    pub fn gap(&self) -> usize {
        self.gap
    }

    pub fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }

    pub fn render_alignments(&self) -> bool {
        self.render_alignments
    }
}

/// All supercluster results for one contig
#[derive(Clone, Debug)]
pub struct ContigResult {
    /// The contig name
    contig: String,
    /// Every supercluster in position order
    superclusters: Vec<SuperclusterResult>,
    /// Sum of the supercluster distances
    total_distance: usize
}

impl ContigResult {
    fn new(contig: String, superclusters: Vec<SuperclusterResult>) -> Self {
        let total_distance = superclusters.iter().map(|s| s.distance()).sum();
        Self {
            contig,
            superclusters,
            total_distance
        }
    }

    /// Number of superclusters that received a given phase decision
    pub fn decision_count(&self, decision: PhaseDecision) -> usize {
        self.superclusters.iter()
            .filter(|s| s.phase_result().decision() == decision)
            .count()
    }

    // getters
    pub fn contig(&self) -> &str {
        &self.contig
    }

    pub fn superclusters(&self) -> &[SuperclusterResult] {
        &self.superclusters
    }

    pub fn total_distance(&self) -> usize {
        self.total_distance
    }
}

/// The genome-wide comparison, contigs are in the joint callset order
#[derive(Clone, Debug)]
pub struct DistanceResults {
    contigs: Vec<ContigResult>,
    total_distance: usize
}

impl DistanceResults {
    fn new(contigs: Vec<ContigResult>) -> Self {
        let total_distance = contigs.iter().map(|c| c.total_distance()).sum();
        Self {
            contigs,
            total_distance
        }
    }

    /// Total number of superclusters across all contigs
    pub fn num_superclusters(&self) -> usize {
        self.contigs.iter().map(|c| c.superclusters().len()).sum()
    }

    /// Number of superclusters across all contigs with a given phase decision
    pub fn decision_count(&self, decision: PhaseDecision) -> usize {
        self.contigs.iter().map(|c| c.decision_count(decision)).sum()
    }

    // getters
    pub fn contigs(&self) -> &[ContigResult] {
        &self.contigs
    }

    pub fn total_distance(&self) -> usize {
        self.total_distance
    }
}

/// Returns the variants a supercluster absorbed from one stream
fn supercluster_variants<'a>(stream: &'a VariantStream, supercluster: &Supercluster, label: StreamLabel) -> &'a [Variant] {
    stream.slice(stream.variant_range(supercluster.cluster_range(label)))
}

/// Compares the call and truth haplotypes of a single contig.
/// # Arguments
/// * `contig` - the contig name
/// * `call` - the call haplotype streams for the contig
/// * `truth` - the truth haplotype streams for the contig
/// * `reference` - the reference lookup
/// * `config` - the distance settings
/// # Errors
/// * if the contig is missing from the reference, before anything is compared
/// * if any supercluster fails to build or align
pub fn solve_contig<R: ReferenceAccessor + ?Sized>(
    contig: &str, call: &HaplotypeStreams, truth: &HaplotypeStreams, reference: &R, config: DistanceConfig
) -> anyhow::Result<ContigResult> {
    let contig_length = reference.contig_length(contig)
        .with_context(|| format!("Error while looking up contig {contig:?}:"))?;

    let streams: [&VariantStream; 4] = [call.hap1(), call.hap2(), truth.hap1(), truth.hap2()];
    let merger = SuperclusterMerger::new(streams, config.gap(), contig_length);

    let mut superclusters = vec![];
    for (supercluster_id, supercluster) in merger.enumerate() {
        let variants = |label: StreamLabel| supercluster_variants(streams[label.index()], &supercluster, label);
        let (call1, call2) = (variants(StreamLabel::CallHap1), variants(StreamLabel::CallHap2));
        let (truth1, truth2) = (variants(StreamLabel::TruthHap1), variants(StreamLabel::TruthHap2));
        let beg_pos = supercluster.beg_pos();
        let end_pos = supercluster.end_pos();

        let (call_seq1, call_seq2) = build_haplotype_pair(reference, contig, beg_pos, end_pos, call1, call2)
            .with_context(|| format!("Error while building call sequences for {contig}:{beg_pos}-{end_pos}:"))?
            .into_sequences();
        let (truth_seq1, truth_seq2) = build_haplotype_pair(reference, contig, beg_pos, end_pos, truth1, truth2)
            .with_context(|| format!("Error while building truth sequences for {contig}:{beg_pos}-{end_pos}:"))?
            .into_sequences();

        let phase_result = resolve_phase(
            call_seq1.sequence(), call_seq2.sequence(),
            truth_seq1.sequence(), truth_seq2.sequence(),
            config.max_edit_distance()
        ).with_context(|| format!("Error while resolving phase for {contig}:{beg_pos}-{end_pos}:"))?;

        debug!("Supercluster {contig}#{supercluster_id} {beg_pos}-{end_pos}: clusters={:?} decision={} orig={} swap={}",
            supercluster.cluster_ranges(), phase_result.decision().as_ref(),
            phase_result.orig_distance(), phase_result.swap_distance()
        );
        if phase_result.distance() > 0 {
            debug!("\tCALL1: {}", String::from_utf8_lossy(call_seq1.sequence()));
            debug!("\tCALL2: {}", String::from_utf8_lossy(call_seq2.sequence()));
            debug!("\tTRUTH1: {}", String::from_utf8_lossy(truth_seq1.sequence()));
            debug!("\tTRUTH2: {}", String::from_utf8_lossy(truth_seq2.sequence()));

            if config.render_alignments() {
                let pairs = match phase_result.decision() {
                    PhaseDecision::Swapped => [(&call_seq1, &truth_seq2), (&call_seq2, &truth_seq1)],
                    PhaseDecision::Original |
                    PhaseDecision::Unresolved => [(&call_seq1, &truth_seq1), (&call_seq2, &truth_seq2)]
                };
                for (call_seq, truth_seq) in pairs {
                    let grid = GridWFA::align(call_seq.sequence(), truth_seq.sequence())
                        .with_context(|| format!("Error while rendering alignment for {contig}:{beg_pos}-{end_pos}:"))?;
                    trace!("Alignment with score {}:\n{}", grid.score(), grid.render(call_seq.sequence(), truth_seq.sequence()));
                }
            }
        }

        superclusters.push(SuperclusterResult::new(supercluster_id, contig, supercluster, phase_result));
    }

    Ok(ContigResult::new(contig.to_string(), superclusters))
}

/// Compares two callsets over every contig either of them contains, solving contigs in parallel.
/// # Arguments
/// * `call` - the query callset
/// * `truth` - the truth callset
/// * `reference` - the reference lookup, shared by all workers
/// * `config` - the distance settings
/// # Errors
/// * if any contig fails, in which case no results are returned
pub fn solve_callsets<R: ReferenceAccessor + Sync + ?Sized>(
    call: &Callset, truth: &Callset, reference: &R, config: DistanceConfig
) -> anyhow::Result<DistanceResults> {
    let contig_order = joint_contig_order(call, truth);
    let empty_streams = HaplotypeStreams::empty();

    // every contig must be in the reference before anything is compared
    for contig in contig_order.iter() {
        reference.contig_length(contig)
            .with_context(|| format!("Contig {contig:?} from the callsets is missing from the reference:"))?;
    }

    info!("Comparing {} contigs...", contig_order.len());
    let style = get_progress_style();
    let mut all_results: Vec<(usize, anyhow::Result<ContigResult>)> = contig_order.par_iter()
        .enumerate()
        .map(|(contig_index, contig)| {
            let call_streams = call.get_contig(contig).unwrap_or(&empty_streams);
            let truth_streams = truth.get_contig(contig).unwrap_or(&empty_streams);
            let result = solve_contig(contig, call_streams, truth_streams, reference, config);
            (contig_index, result)
        })
        .progress_with_style(style)
        .collect();

    // restore the contig order before joining
    all_results.sort_by_key(|(i, _r)| *i);
    let contigs = all_results.into_iter()
        .map(|(_i, r)| r)
        .collect::<anyhow::Result<Vec<ContigResult>>>()?;

    for contig_result in contigs.iter() {
        info!("\t{}: {} superclusters, distance = {}",
            contig_result.contig(), contig_result.superclusters().len(), contig_result.total_distance()
        );
    }
    Ok(DistanceResults::new(contigs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_lib_reference_genome::reference_genome::ReferenceGenome;
    use crate::data_types::phase_enums::Haplotype;

    fn mock_reference() -> ReferenceGenome {
        let mut reference = ReferenceGenome::empty_reference();
        reference.add_contig("chr1".to_string(), "ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT").unwrap();
        reference.add_contig("chr2".to_string(), "ACGT").unwrap();
        reference
    }

    fn streams(hap1: Vec<Variant>, hap2: Vec<Variant>, gap: usize) -> HaplotypeStreams {
        HaplotypeStreams::new(
            VariantStream::from_variants(Haplotype::Hap1, hap1, gap).unwrap(),
            VariantStream::from_variants(Haplotype::Hap2, hap2, gap).unwrap()
        )
    }

    fn sub(haplotype: Haplotype, position: usize, ref_base: &[u8], alt_base: &[u8]) -> Variant {
        Variant::new_substitution(haplotype, position, ref_base.to_vec(), alt_base.to_vec()).unwrap()
    }

    #[test]
    fn test_identical_callsets() {
        let reference = mock_reference();
        let config = DistanceConfig::default();
        let call = streams(vec![sub(Haplotype::Hap1, 1, b"C", b"G")], vec![], config.gap());
        let truth = streams(vec![sub(Haplotype::Hap1, 1, b"C", b"G")], vec![], config.gap());
        let result = solve_contig("chr2", &call, &truth, &reference, config).unwrap();
        assert_eq!(result.superclusters().len(), 1);
        assert_eq!(result.total_distance(), 0);

        let supercluster = &result.superclusters()[0];
        assert_eq!(supercluster.coordinates().start(), 0);
        assert_eq!(supercluster.coordinates().end(), 3);
        assert_eq!(supercluster.phase_result().decision(), PhaseDecision::Original);
        assert_eq!(supercluster.phase_result().pair_distances(), [0, 2, 2, 0]);
    }

    #[test]
    fn test_missed_and_false_variants() {
        let reference = mock_reference();
        let config = DistanceConfigBuilder::default().gap(5).build().unwrap();

        // truth-only SNP, call-only deletion far away, and a phase swap
        let call = streams(
            vec![sub(Haplotype::Hap1, 40, b"A", b"T")],
            vec![Variant::new_deletion(Haplotype::Hap2, 20, b"AC".to_vec()).unwrap()],
            config.gap()
        );
        let truth = streams(
            vec![sub(Haplotype::Hap1, 5, b"C", b"T")],
            vec![sub(Haplotype::Hap2, 40, b"A", b"T")],
            config.gap()
        );
        let result = solve_contig("chr1", &call, &truth, &reference, config).unwrap();
        let superclusters = result.superclusters();
        assert_eq!(superclusters.len(), 3);
        assert_eq!(superclusters.iter().map(|s| s.distance()).collect::<Vec<usize>>(), vec![2, 2, 0]);
        assert_eq!(superclusters[2].phase_result().decision(), PhaseDecision::Swapped);
        assert_eq!(superclusters[0].supercluster_id(), 0);
        assert_eq!(result.total_distance(), 4);
        assert_eq!(result.decision_count(PhaseDecision::Swapped), 1);
    }

    #[test]
    fn test_missing_contig() {
        let reference = mock_reference();
        let empty = HaplotypeStreams::empty();
        assert!(solve_contig("chr9", &empty, &empty, &reference, DistanceConfig::default()).is_err());
    }

    #[test]
    fn test_solve_callsets() {
        let reference = mock_reference();
        let config = DistanceConfig::default();

        let mut call = Callset::new("query".to_string(), "sample".to_string());
        call.insert_contig("chr2".to_string(), streams(vec![sub(Haplotype::Hap1, 2, b"G", b"A")], vec![], config.gap()));
        let mut truth = Callset::new("truth".to_string(), "sample".to_string());
        truth.insert_contig("chr1".to_string(), streams(vec![], vec![sub(Haplotype::Hap2, 9, b"C", b"G")], config.gap()));

        let results = solve_callsets(&call, &truth, &reference, config).unwrap();
        let contigs: Vec<&str> = results.contigs().iter().map(|c| c.contig()).collect();
        assert_eq!(contigs, vec!["chr2", "chr1"]);
        assert_eq!(results.total_distance(), 4);
        assert_eq!(results.num_superclusters(), 2);
        assert_eq!(results.decision_count(PhaseDecision::Unresolved), 2);

        // a contig missing from the reference fails the whole run
        truth.insert_contig("chrUn".to_string(), HaplotypeStreams::empty());
        assert!(solve_callsets(&call, &truth, &reference, config).is_err());
    }
}
