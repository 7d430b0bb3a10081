use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_load_settings, check_optional_filename, check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::parsing::noodles_helper::get_vcf_sample_name;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct DistanceSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    vcfdist_version: String,

    /// Reference FASTA file
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "FASTA")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_fn: PathBuf,

    /// Truth variant call file (VCF)
    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "truth-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub truth_vcf_filename: PathBuf,

    /// Query variant call file (VCF)
    #[clap(required = true)]
    #[clap(short = 'q')]
    #[clap(long = "query-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub query_vcf_filename: PathBuf,

    /// Regions to evaluate (BED); variants outside of them are discarded
    #[clap(short = 'b')]
    #[clap(long = "regions")]
    #[clap(value_name = "BED")]
    #[clap(help_heading = Some("Input/Output"))]
    pub regions: Option<PathBuf>,

    /// Output directory containing the supercluster table and summary
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// The sample name to use in the truth VCF [default: first sample]
    #[clap(long = "truth-sample")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "", hide_default_value = true)]
    pub truth_sample: String,

    /// The sample name to use in the query VCF [default: first sample]
    #[clap(long = "query-sample")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "", hide_default_value = true)]
    pub query_sample: String,

    /// The minimum gap (bp) between variants to split them into separate clusters
    #[clap(long = "gap")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Variant loading"))]
    #[clap(default_value = "50")]
    pub gap: usize,

    /// Records with a QUAL below this value are discarded
    #[clap(long = "min-qual")]
    #[clap(value_name = "QUAL")]
    #[clap(help_heading = Some("Variant loading"))]
    #[clap(default_value = "0")]
    pub min_quality: f32,

    /// Alleles where both REF and ALT are shorter than this are discarded
    #[clap(long = "min-size")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Variant loading"))]
    #[clap(default_value = "1")]
    pub min_size: usize,

    /// Alleles where REF or ALT is longer than this are discarded
    #[clap(long = "max-size")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Variant loading"))]
    #[clap(default_value = "5000")]
    pub max_size: usize,

    /// Maximum edit distance in any supercluster alignment before quitting; 0 = unbounded
    #[clap(long = "max-edit-distance")]
    #[clap(value_name = "INT")]
    #[clap(help_heading = Some("Distance parameters"))]
    #[clap(default_value = "0")]
    #[clap(hide = true)]
    pub max_edit_distance: usize,

    /// Number of threads to use in the distance step
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8
}

pub fn check_distance_settings(mut settings: DistanceSettings) -> anyhow::Result<DistanceSettings> {
    // hard code the version in
    settings.vcfdist_version = FULL_VERSION.clone();
    info!("vcfdist version: {:?}", &settings.vcfdist_version);
    info!("Sub-command: distance");
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.reference_fn, "Reference FASTA")?;
    check_required_filename(&settings.truth_vcf_filename, "Truth VCF")?;
    check_required_filename(&settings.query_vcf_filename, "Query VCF")?;
    check_optional_filename(settings.regions.as_deref(), "Regions")?;

    // dump stuff to the logger
    info!("\tReference: {:?}", &settings.reference_fn);
    info!("\tTruth VCF: {:?}", &settings.truth_vcf_filename);
    if settings.truth_sample.is_empty() {
        settings.truth_sample = get_vcf_sample_name(&settings.truth_vcf_filename, 0)?;
    }
    info!("\tTruth sample: {:?}", &settings.truth_sample);
    info!("\tQuery VCF: {:?}", &settings.query_vcf_filename);
    if settings.query_sample.is_empty() {
        settings.query_sample = get_vcf_sample_name(&settings.query_vcf_filename, 0)?;
    }
    info!("\tQuery sample: {:?}", &settings.query_sample);
    if let Some(bed_fn) = settings.regions.as_deref() {
        info!("\tRegions: {bed_fn:?}");
    } else {
        info!("\tRegions: None");
    }

    // outputs
    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);

    check_load_settings(settings.gap, settings.min_quality, settings.min_size, settings.max_size)?;

    // 0 is just a sentinel for unbounded
    if settings.max_edit_distance == 0 {
        settings.max_edit_distance = usize::MAX;
    } else {
        info!("Distance parameters:");
        info!("\tMax edit distance: {}", settings.max_edit_distance);
    }

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
