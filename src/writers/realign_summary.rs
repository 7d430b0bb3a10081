use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::realigner::{RealignedCluster, RealignResults};

/// Writes the per-cluster realignment results and the variants read back from each alignment
pub struct RealignSummaryWriter {
    /// One row per cluster
    cluster_writer: csv::Writer<File>,
    /// One row per realigned variant
    variant_writer: csv::Writer<File>
}

#[derive(Serialize)]
struct ClusterRow {
    contig: String,
    haplotype: String,
    cluster_id: usize,
    start: usize,
    end: usize,
    num_variants: usize,
    old_distance: usize,
    new_distance: usize
}

#[derive(Serialize)]
struct VariantRow {
    contig: String,
    haplotype: String,
    cluster_id: usize,
    /// 0-based
    position: usize,
    variant_type: String,
    ref_allele: String,
    alt_allele: String
}

impl ClusterRow {
    fn new(cluster: &RealignedCluster) -> Self {
        let coordinates = cluster.coordinates();
        Self {
            contig: coordinates.chrom().to_string(),
            haplotype: cluster.haplotype().as_ref().to_string(),
            cluster_id: cluster.cluster_id(),
            start: coordinates.start(),
            end: coordinates.end(),
            num_variants: cluster.num_variants(),
            old_distance: cluster.old_distance(),
            new_distance: cluster.new_distance()
        }
    }
}

fn tsv_writer(filename: &Path) -> csv::Result<csv::Writer<File>> {
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)
}

impl RealignSummaryWriter {
    /// Creates the two output files
    /// # Arguments
    /// * `cluster_fn` - path for the cluster table, must be .csv/.tsv
    /// * `variant_fn` - path for the variant table, must be .csv/.tsv
    pub fn new(cluster_fn: &Path, variant_fn: &Path) -> csv::Result<Self> {
        Ok(Self {
            cluster_writer: tsv_writer(cluster_fn)?,
            variant_writer: tsv_writer(variant_fn)?
        })
    }

    /// Writes all clusters and their realigned variants, then flushes both files
    pub fn write_results(&mut self, results: &RealignResults) -> csv::Result<()> {
        for cluster in results.clusters().iter() {
            self.cluster_writer.serialize(ClusterRow::new(cluster))?;
            for variant in cluster.variants().iter() {
                self.variant_writer.serialize(VariantRow {
                    contig: cluster.coordinates().chrom().to_string(),
                    haplotype: cluster.haplotype().as_ref().to_string(),
                    cluster_id: cluster.cluster_id(),
                    position: variant.position(),
                    variant_type: variant.variant_type().as_ref().to_string(),
                    ref_allele: String::from_utf8_lossy(variant.ref_allele()).to_string(),
                    alt_allele: String::from_utf8_lossy(variant.alt_allele()).to_string()
                })?;
            }
        }
        self.cluster_writer.flush()?;
        self.variant_writer.flush()?;
        Ok(())
    }
}
