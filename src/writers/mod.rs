/*!
# Writers module
Contains the logic for writing the output files for the distance and realign commands.
*/
/// Generates the JSON summary of a distance run
pub mod distance_summary;
/// Generates the cluster and variant tables of a realign run
pub mod realign_summary;
/// Generates the per-supercluster table
pub mod supercluster_summary;
/// Creates the output folder and writes every output file of a run
pub mod output_folder;
