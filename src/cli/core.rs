use anyhow::bail;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use log::info;
use std::path::Path;

use crate::cli::distance::DistanceSettings;
use crate::cli::realign::RealignSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.11.0-6bb9635-dirty` - while on a dirty branch
    /// * `0.11.0-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2004-{}     Pacific Biosciences of California, Inc.
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author, 
    version = &**FULL_VERSION, 
    about, 
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// vcfdist, a tool for comparing variant callsets by the edit distance of the sequences they imply.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Core function for measuring the distance of a query VCF from a truth VCF
    Distance(Box<DistanceSettings>),
    /// Realigns the clusters of a single VCF against the reference and reports the distance change
    Realign(Box<RealignSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) -> anyhow::Result<()> {
    if let Some(filename) = opt_filename {
        if !filename.exists() {
            bail!("{} does not exist: \"{}\"", label, filename.display());
        }
    }

    // file either was not specified OR it exists
    Ok(())
}

/// Checks the loader options shared by every subcommand and logs them
/// # Arguments
/// * `gap` - the cluster gap threshold
/// * `min_quality` - minimum QUAL to keep a record
/// * `min_size` - minimum allele size to keep
/// * `max_size` - maximum allele size to keep
pub fn check_load_settings(gap: usize, min_quality: f32, min_size: usize, max_size: usize) -> anyhow::Result<()> {
    info!("Variant loading parameters:");
    if gap == 0 {
        bail!("--gap must be >0");
    }
    info!("\tCluster gap: {gap}");
    if !min_quality.is_finite() || min_quality < 0.0 {
        bail!("--min-qual must be a non-negative number");
    }
    info!("\tMinimum QUAL: {min_quality}");
    if min_size > max_size {
        bail!("--min-size ({min_size}) must be <= --max-size ({max_size})");
    }
    info!("\tSize range: {min_size}-{max_size}");
    Ok(())
}
