use anyhow::Context;
use log::info;
use serde::Serialize;
use std::path::Path;

use crate::distance_solver::DistanceResults;
use crate::realigner::RealignResults;
use crate::util::json_io::save_json;
use crate::writers::distance_summary::DistanceSummary;
use crate::writers::realign_summary::RealignSummaryWriter;
use crate::writers::supercluster_summary::SuperclusterSummaryWriter;

/// Creates the output folder and saves the CLI options into it
fn prepare_output_folder<T: Serialize>(output_folder: &Path, settings: &T) -> anyhow::Result<()> {
    info!("Creating output folder at {output_folder:?}...");
    std::fs::create_dir_all(output_folder)
        .with_context(|| format!("Error while creating output folder {output_folder:?}:"))?;

    let cli_json = output_folder.join("cli_settings.json");
    info!("Saving CLI options to {cli_json:?}...");
    save_json(settings, &cli_json)
        .with_context(|| format!("Error while saving CLI options to {cli_json:?}:"))
}

/// Writes every output of a distance run. Nothing touches `output_folder` until this is called,
/// so it should only be called with fully solved results.
/// # Arguments
/// * `output_folder` - the folder to create and fill
/// * `settings` - the CLI settings, saved as `cli_settings.json`
/// * `results` - the solved callsets
/// * `query_sample` - sample name used from the query VCF
/// * `truth_sample` - sample name used from the truth VCF
pub fn write_distance_outputs<T: Serialize>(
    output_folder: &Path, settings: &T, results: &DistanceResults, query_sample: &str, truth_sample: &str
) -> anyhow::Result<()> {
    prepare_output_folder(output_folder, settings)?;

    let supercluster_fn = output_folder.join("superclusters.tsv");
    info!("Saving supercluster table to {supercluster_fn:?}...");
    let mut writer = SuperclusterSummaryWriter::new(&supercluster_fn)
        .with_context(|| format!("Error while opening {supercluster_fn:?}:"))?;
    for contig_result in results.contigs().iter() {
        writer.write_contig(contig_result)
            .with_context(|| format!("Error while writing superclusters for {}:", contig_result.contig()))?;
    }
    writer.flush()?;

    let summary_fn = output_folder.join("summary.json");
    info!("Saving output summary to {summary_fn:?}...");
    DistanceSummary::new(results, query_sample, truth_sample).write(&summary_fn)
}

/// Writes every output of a realign run, with the same contract as `write_distance_outputs`.
/// # Arguments
/// * `output_folder` - the folder to create and fill
/// * `settings` - the CLI settings, saved as `cli_settings.json`
/// * `results` - the realigned clusters
pub fn write_realign_outputs<T: Serialize>(output_folder: &Path, settings: &T, results: &RealignResults) -> anyhow::Result<()> {
    prepare_output_folder(output_folder, settings)?;

    let cluster_fn = output_folder.join("realign_clusters.tsv");
    let variant_fn = output_folder.join("realigned_variants.tsv");
    info!("Saving realignment tables to {cluster_fn:?} and {variant_fn:?}...");
    let mut writer = RealignSummaryWriter::new(&cluster_fn, &variant_fn)
        .with_context(|| format!("Error while opening {cluster_fn:?}:"))?;
    writer.write_results(results)?;
    Ok(())
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
    use crate::realigner::{RealignConfig, realign_callset};

    #[derive(Serialize)]
    struct MockSettings {
        gap: usize
    }

    fn mock_inputs() -> (ReferenceGenome, Callset, Callset) {
        let mut reference = ReferenceGenome::empty_reference();
        reference.add_contig("chr1".to_string(), "ACGTACGTACGT").unwrap();

        let variant = Variant::new_deletion(Haplotype::Hap1, 4, b"A".to_vec()).unwrap();
        let mut call = Callset::new("query".to_string(), "query_sample".to_string());
        call.insert_contig("chr1".to_string(), HaplotypeStreams::new(
            VariantStream::from_variants(Haplotype::Hap1, vec![variant], 50).unwrap(),
            VariantStream::empty(Haplotype::Hap2)
        ));
        let truth = Callset::new("truth".to_string(), "truth_sample".to_string());
        (reference, call, truth)
    }

    fn temp_folder(name: &str) -> std::path::PathBuf {
        let out_dir = std::env::temp_dir().join(format!("vcfdist_{name}_{}", std::process::id()));
        if out_dir.exists() {
            std::fs::remove_dir_all(&out_dir).unwrap();
        }
        out_dir
    }

    #[test]
    fn test_failed_run_leaves_no_output() {
        let (reference, call, mut truth) = mock_inputs();
        truth.insert_contig("chrUn".to_string(), HaplotypeStreams::empty());
        let out_dir = temp_folder("failed_run");

        // the writers are only reachable with solved results, so a failed solve never creates the folder
        let results = solve_callsets(&call, &truth, &reference, DistanceConfig::default())
            .and_then(|r| write_distance_outputs(&out_dir, &MockSettings { gap: 50 }, &r, "query_sample", "truth_sample"));
        assert!(results.is_err());
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_write_distance_outputs() {
        let (reference, call, truth) = mock_inputs();
        let results = solve_callsets(&call, &truth, &reference, DistanceConfig::default()).unwrap();
        let out_dir = temp_folder("distance_outputs");
        assert!(!out_dir.exists());

        write_distance_outputs(&out_dir, &MockSettings { gap: 50 }, &results, "query_sample", "truth_sample").unwrap();
        for filename in ["cli_settings.json", "superclusters.tsv", "summary.json"] {
            assert!(out_dir.join(filename).exists(), "{filename} is missing");
        }
        let settings: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(out_dir.join("cli_settings.json")).unwrap()
        ).unwrap();
        assert_eq!(settings["gap"], 50);
        std::fs::remove_dir_all(&out_dir).unwrap();
    }

    #[test]
    fn test_write_realign_outputs() {
        let (reference, call, _truth) = mock_inputs();
        let results = realign_callset(&call, &reference, RealignConfig::default()).unwrap();
        let out_dir = temp_folder("realign_outputs");

        write_realign_outputs(&out_dir, &MockSettings { gap: 50 }, &results).unwrap();
        for filename in ["cli_settings.json", "realign_clusters.tsv", "realigned_variants.tsv"] {
            assert!(out_dir.join(filename).exists(), "{filename} is missing");
        }
        let clusters = std::fs::read_to_string(out_dir.join("realign_clusters.tsv")).unwrap();
        assert_eq!(clusters.lines().count(), 2);
        std::fs::remove_dir_all(&out_dir).unwrap();
    }
}
