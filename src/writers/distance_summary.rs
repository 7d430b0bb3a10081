use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use strum::IntoEnumIterator;

use crate::data_types::phase_enums::PhaseDecision;
use crate::distance_solver::DistanceResults;
use crate::util::json_io::save_json;

/// Per-contig totals in the summary
#[derive(Clone, Debug, Serialize)]
pub struct ContigSummary {
    contig: String,
    superclusters: usize,
    distance: usize
}

/// The genome-wide summary written to JSON
#[derive(Clone, Debug, Serialize)]
pub struct DistanceSummary {
    /// Sample name in the query VCF
    query_sample: String,
    /// Sample name in the truth VCF
    truth_sample: String,
    /// Sum of every supercluster distance
    total_distance: usize,
    /// Number of superclusters compared
    num_superclusters: usize,
    /// Count of each phase decision, keyed by ORIG/SWAP/NONE
    phase_counts: BTreeMap<String, usize>,
    /// Totals per contig, in the comparison order
    contigs: Vec<ContigSummary>
}

impl DistanceSummary {
    /// Collapses the full results into the summary
    /// # Arguments
    /// * `results` - the solved callsets
    /// * `query_sample` - sample name used from the query VCF
    /// * `truth_sample` - sample name used from the truth VCF
    pub fn new(results: &DistanceResults, query_sample: &str, truth_sample: &str) -> Self {
        let phase_counts = PhaseDecision::iter()
            .map(|d| (d.as_ref().to_string(), results.decision_count(d)))
            .collect();
        let contigs = results.contigs().iter()
            .map(|c| ContigSummary {
                contig: c.contig().to_string(),
                superclusters: c.superclusters().len(),
                distance: c.total_distance()
            })
            .collect();
        Self {
            query_sample: query_sample.to_string(),
            truth_sample: truth_sample.to_string(),
            total_distance: results.total_distance(),
            num_superclusters: results.num_superclusters(),
            phase_counts,
            contigs
        }
    }

    /// Saves the summary as JSON
    /// # Arguments
    /// * `filename` - the output path, gzip compressed if it ends in .gz
    /// # Errors
    /// * if the file cannot be written
    pub fn write(&self, filename: &Path) -> anyhow::Result<()> {
        save_json(self, filename)
    }

    pub fn total_distance(&self) -> usize {
        self.total_distance
    }

    pub fn phase_counts(&self) -> &BTreeMap<String, usize> {
        &self.phase_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_lib_reference_genome::reference_genome::ReferenceGenome;
    use crate::data_types::callset::{Callset, HaplotypeStreams};
    use crate::data_types::phase_enums::Haplotype;
    use crate::data_types::variant_stream::VariantStream;
    use crate::data_types::variants::Variant;
    use crate::distance_solver::{DistanceConfig, solve_callsets};

    #[test]
    fn test_distance_summary() {
        let mut reference = ReferenceGenome::empty_reference();
        reference.add_contig("chr1".to_string(), "ACGTACGTACGT").unwrap();

        let variant = Variant::new_insertion(Haplotype::Hap1, 4, b"T".to_vec()).unwrap();
        let mut call = Callset::new("query".to_string(), "query_sample".to_string());
        call.insert_contig("chr1".to_string(), HaplotypeStreams::new(
            VariantStream::from_variants(Haplotype::Hap1, vec![variant], 50).unwrap(),
            VariantStream::empty(Haplotype::Hap2)
        ));
        let truth = Callset::new("truth".to_string(), "truth_sample".to_string());

        let results = solve_callsets(&call, &truth, &reference, DistanceConfig::default()).unwrap();
        let summary = DistanceSummary::new(&results, "query_sample", "truth_sample");
        assert_eq!(summary.total_distance(), 1);
        assert_eq!(summary.phase_counts().get("NONE"), Some(&1));
        assert_eq!(summary.phase_counts().get("ORIG"), Some(&0));

        let out_dir = std::env::temp_dir().join(format!("vcfdist_summary_{}", std::process::id()));
        std::fs::create_dir_all(&out_dir).unwrap();
        let out_fn = out_dir.join("summary.json");
        summary.write(&out_fn).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out_fn).unwrap()).unwrap();
        assert_eq!(parsed["total_distance"], 1);
        assert_eq!(parsed["contigs"][0]["contig"], "chr1");
        assert_eq!(parsed["phase_counts"]["SWAP"], 0);
        std::fs::remove_dir_all(&out_dir).unwrap();
    }
}
