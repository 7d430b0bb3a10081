/// Per-sample callsets made of haplotype streams for each contig
pub mod callset;
/// Wrapper for coordinates with some additional functionalities
pub mod coordinates;
/// Haplotype and phasing enumerations
pub mod phase_enums;
/// Reference sequence lookup by contig
pub mod reference;
/// Superclusters and the results attached to them
pub mod supercluster;
/// Ordered variant lists for one haplotype, with cluster boundaries
pub mod variant_stream;
/// Contains variant definition functionality and checks
pub mod variants;
