use serde::Serialize;
use std::fs::File;
use std::ops::Range;
use std::path::Path;

use crate::data_types::supercluster::{StreamLabel, SuperclusterResult};
use crate::distance_solver::ContigResult;

/// Writes one row per supercluster with the phase verdict and both candidate distances
pub struct SuperclusterSummaryWriter {
    /// Handle on the writer
    csv_writer: csv::Writer<File>
}

/// Contains all the data written to each row of the supercluster file
#[derive(Serialize)]
struct SuperclusterRow {
    contig: String,
    supercluster_id: usize,
    /// 0-based, inclusive
    start: usize,
    /// 0-based, exclusive
    end: usize,
    /// Absorbed cluster indices as `begin-end`
    call_hap1_clusters: String,
    call_hap2_clusters: String,
    truth_hap1_clusters: String,
    truth_hap2_clusters: String,
    orig_distance: usize,
    swap_distance: usize,
    /// ORIG, SWAP, or NONE
    phase: String,
    /// The smaller of the two candidate distances
    distance: usize
}

fn format_range(range: &Range<usize>) -> String {
    format!("{}-{}", range.start, range.end)
}

impl SuperclusterRow {
    fn new(result: &SuperclusterResult) -> Self {
        let coordinates = result.coordinates();
        let supercluster = result.supercluster();
        let phase_result = result.phase_result();
        let range = |label: StreamLabel| format_range(supercluster.cluster_range(label));
        Self {
            contig: coordinates.chrom().to_string(),
            supercluster_id: result.supercluster_id(),
            start: coordinates.start(),
            end: coordinates.end(),
            call_hap1_clusters: range(StreamLabel::CallHap1),
            call_hap2_clusters: range(StreamLabel::CallHap2),
            truth_hap1_clusters: range(StreamLabel::TruthHap1),
            truth_hap2_clusters: range(StreamLabel::TruthHap2),
            orig_distance: phase_result.orig_distance(),
            swap_distance: phase_result.swap_distance(),
            phase: phase_result.decision().as_ref().to_string(),
            distance: result.distance()
        }
    }
}

impl SuperclusterSummaryWriter {
    /// Creates a new writer
    /// # Arguments
    /// * `filename` - path to the filename that will get opened, must be .csv/.tsv
    pub fn new(filename: &Path) -> csv::Result<Self> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;
        Ok(Self {
            csv_writer
        })
    }

    /// Writes every supercluster of a contig
    /// # Arguments
    /// * `contig_result` - the solved contig
    pub fn write_contig(&mut self, contig_result: &ContigResult) -> csv::Result<()> {
        for result in contig_result.superclusters().iter() {
            self.csv_writer.serialize(SuperclusterRow::new(result))?;
        }
        Ok(())
    }

    /// Flushes anything buffered to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.csv_writer.flush()
    }
}
