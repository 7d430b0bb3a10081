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
pub struct RealignSettings {
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

    /// Variant call file (VCF) to realign
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub vcf_filename: PathBuf,

    /// Regions to evaluate (BED); variants outside of them are discarded
    #[clap(short = 'b')]
    #[clap(long = "regions")]
    #[clap(value_name = "BED")]
    #[clap(help_heading = Some("Input/Output"))]
    pub regions: Option<PathBuf>,

    /// Output directory containing the realignment tables
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// The sample name to use in the VCF [default: first sample]
    #[clap(long = "sample")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "", hide_default_value = true)]
    pub sample: String,

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

    /// Number of threads to use in the realignment step
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

pub fn check_realign_settings(mut settings: RealignSettings) -> anyhow::Result<RealignSettings> {
    // hard code the version in
    settings.vcfdist_version = FULL_VERSION.clone();
    info!("vcfdist version: {:?}", &settings.vcfdist_version);
    info!("Sub-command: realign");
    info!("Inputs:");

    check_required_filename(&settings.reference_fn, "Reference FASTA")?;
    check_required_filename(&settings.vcf_filename, "Input VCF")?;
    check_optional_filename(settings.regions.as_deref(), "Regions")?;

    info!("\tReference: {:?}", &settings.reference_fn);
    info!("\tInput VCF: {:?}", &settings.vcf_filename);
    if settings.sample.is_empty() {
        settings.sample = get_vcf_sample_name(&settings.vcf_filename, 0)?;
    }
    info!("\tSample: {:?}", &settings.sample);
    if let Some(bed_fn) = settings.regions.as_deref() {
        info!("\tRegions: {bed_fn:?}");
    } else {
        info!("\tRegions: None");
    }

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);

    check_load_settings(settings.gap, settings.min_quality, settings.min_size, settings.max_size)?;

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
