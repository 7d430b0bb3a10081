/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Helper functions for noodles, including the region BED loader
pub mod noodles_helper;
/// Loads a VCF sample into clustered haplotype streams
pub mod vcf_loader;
