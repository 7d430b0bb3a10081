/*!
# vcfdist
Measures how far a query variant callset is from a truth callset by the edit distance of the haplotype sequences each one implies.
Variants are clustered per haplotype, clusters from all four haplotypes are merged into superclusters, and each supercluster is scored under both phasings.
*/

/// Builds haplotype sequences from a reference interval and a list of variants
pub mod allele_builder;
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Core logic for measuring the distance between two callsets
pub mod distance_solver;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Chooses the cheaper pairing of call and truth haplotypes
pub mod phase_resolver;
/// Realigns each cluster of a callset against the reference
pub mod realigner;
/// Merges the clusters of four haplotype streams into superclusters
pub mod supercluster_merger;
/// Various utility functions that tend to be very generic
pub mod util;
/// Contains the wavefront edit distance engines
pub mod wfa;
/// All output writers
pub mod writers;
