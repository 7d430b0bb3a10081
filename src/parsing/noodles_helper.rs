use anyhow::{Context, anyhow};
use indexmap::IndexMap;
use log::debug;
use noodles::bed::io::reader::Builder as BedBuilder;
use noodles::bed::{io::Reader as BedReader, Record as BedRecord};
use std::io::BufReader;
use std::path::Path;

/// Wrapper function that handles both gzip compressed and uncompressed BED files
/// # Arguments
/// * `filename` - path to the .bed(.gz) file to open
pub fn open_bed_file(filename: &Path) -> anyhow::Result<BedReader<3, BufReader<Box<dyn std::io::Read>>>> {
    let is_compressed = match filename.extension() {
        Some(extension) => {
            extension == "gz"
        },
        None => false
    };

    let buf_reader: Box<dyn std::io::Read> = if is_compressed {
        #[allow(clippy::default_constructed_unit_structs)]
        let bgzf_reader = noodles::bgzf::io::reader::Builder::default()
            .build_from_path(filename)
            .with_context(|| format!("Error while loading {filename:?}:"))?;
        Box::new(bgzf_reader)
    } else {
        Box::new(std::fs::File::open(filename)?)
    };

    #[allow(clippy::default_constructed_unit_structs)]
    let bed_reader = BedBuilder::<3>::default()
        .build_from_reader(buf_reader);
    Ok(bed_reader)
}

/// How a variant's reference span relates to the loaded regions
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::AsRefStr)]
pub enum RegionContainment {
    /// The span does not touch any region on its contig
    #[strum(serialize = "OUTSIDE")]
    Outside,
    /// The span is fully inside a single region
    #[strum(serialize = "INSIDE")]
    Inside,
    /// The span partially overlaps a region
    #[strum(serialize = "BORDER")]
    Border,
    /// The contig has no regions at all
    #[strum(serialize = "OFF_CONTIG")]
    OffContig
}

/// A pre-loaded BED file where chromosome order is preserved and the intervals are sorted and merged.
/// Intervals are stored 0-based and half-open.
#[derive(Clone, Debug, Default)]
pub struct LoadedBed {
    /// Map from chromosome to the sorted, non-overlapping intervals
    chrom_lookup: IndexMap<String, Vec<(usize, usize)>>
}

impl LoadedBed {
    /// This will load an entire BED file into memory, preserving chromosome order but also sorting and merging the intervals.
    /// # Arguments
    /// * `filename` - path to the .bed(.gz) file to open
    pub fn preload_bed_file(filename: &Path) -> anyhow::Result<Self> {
        debug!("Pre-loading {filename:?}...");
        let mut bed_handle = open_bed_file(filename)?;

        let mut record = BedRecord::<3>::default();
        let mut chrom_lookup: IndexMap<String, Vec<(usize, usize)>> = Default::default();
        while bed_handle.read_record(&mut record)? > 0 {
            let chrom = record.reference_sequence_name().to_string();
            let start = record.feature_start()
                .with_context(|| format!("Error while parsing start for record: {record:?}"))?;
            let end = record.feature_end()
                .unwrap_or(Err(std::io::Error::other("Missing end")))
                .with_context(|| format!("Error while parsing end for record: {record:?}"))?;

            // noodles positions are 1-based and inclusive
            let entry = chrom_lookup.entry(chrom).or_default();
            entry.push((start.get() - 1, end.get()));
        }

        Ok(Self::from_intervals(chrom_lookup))
    }

    /// Builds the lookup from raw 0-based half-open intervals, which may be unsorted or overlapping
    pub fn from_intervals(mut chrom_lookup: IndexMap<String, Vec<(usize, usize)>>) -> Self {
        for (chrom, interval_set) in chrom_lookup.iter_mut() {
            let num_entries = interval_set.len();
            if !interval_set.is_sorted() {
                debug!("Sorting {num_entries} BED entries for {chrom}...");
                interval_set.sort();
            }

            let mut merged: Vec<(usize, usize)> = Vec::with_capacity(num_entries);
            for &(start, end) in interval_set.iter() {
                match merged.last_mut() {
                    Some(last) if start <= last.1 => last.1 = last.1.max(end),
                    _ => merged.push((start, end))
                };
            }
            debug!("Found {} merged BED entries for {chrom}.", merged.len());
            *interval_set = merged;
        }

        Self {
            chrom_lookup
        }
    }

    /// Classifies a 0-based, half-open span against the regions.
    /// An empty span (an insertion) is treated as covering the base at `start`.
    /// # Arguments
    /// * `chrom` - the contig of the span
    /// * `start` - the first reference position, inclusive
    /// * `end` - the last reference position, exclusive
    pub fn containment(&self, chrom: &str, start: usize, end: usize) -> RegionContainment {
        let intervals = match self.chrom_lookup.get(chrom) {
            Some(i) => i,
            None => return RegionContainment::OffContig
        };
        let end = end.max(start + 1);

        // first interval that ends after the span starts
        let index = intervals.partition_point(|&(_s, e)| e <= start);
        match intervals.get(index) {
            Some(&(s, e)) if s < end => {
                if s <= start && end <= e {
                    RegionContainment::Inside
                } else {
                    RegionContainment::Border
                }
            },
            _ => RegionContainment::Outside
        }
    }

    /// Total bases covered by the regions
    pub fn total_bases(&self) -> usize {
        self.chrom_lookup.values()
            .flat_map(|intervals| intervals.iter().map(|(s, e)| e - s))
            .sum()
    }

    // getters
    pub fn chrom_lookup(&self) -> &IndexMap<String, Vec<(usize, usize)>> {
        &self.chrom_lookup
    }
}

/// This will open a VCF file and retrieve the sample name at the given index
/// # Arguments
/// * `vcf_fn` - the VCF filename to open
/// * `index` - the index of the sample to return; 0 = first sample
pub fn get_vcf_sample_name(vcf_fn: &Path, index: usize) -> anyhow::Result<String> {
    use noodles_util::variant::io::reader::Builder as VcfBuilder;

    let mut vcf_reader = VcfBuilder::default()
        .build_from_path(vcf_fn)
        .with_context(|| format!("Error while opening {vcf_fn:?}:"))?;
    let vcf_header = vcf_reader.read_header()
        .with_context(|| format!("Error while reading header of {vcf_fn:?}:"))?;

    let sample_name = vcf_header.sample_names().get_index(index)
        .ok_or(anyhow!("Sample index {index} does not exist in {vcf_fn:?}."))?
        .clone();

    Ok(sample_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_bed() -> LoadedBed {
        let mut chrom_lookup: IndexMap<String, Vec<(usize, usize)>> = Default::default();
        chrom_lookup.insert("chr2".to_string(), vec![(50, 60), (10, 20), (15, 30)]);
        chrom_lookup.insert("chr1".to_string(), vec![(0, 5)]);
        LoadedBed::from_intervals(chrom_lookup)
    }

    #[test]
    fn test_from_intervals() {
        let bed = mock_bed();
        assert_eq!(bed.chrom_lookup().get("chr2").unwrap(), &vec![(10, 30), (50, 60)]);
        let keys: Vec<&String> = bed.chrom_lookup().keys().collect();
        assert_eq!(keys, vec!["chr2", "chr1"]);
        assert_eq!(bed.total_bases(), 35);
    }

    #[test]
    fn test_containment() {
        let bed = mock_bed();
        assert_eq!(bed.containment("chr3", 0, 1), RegionContainment::OffContig);
        assert_eq!(bed.containment("chr2", 12, 14), RegionContainment::Inside);
        assert_eq!(bed.containment("chr2", 10, 30), RegionContainment::Inside);
        assert_eq!(bed.containment("chr2", 8, 12), RegionContainment::Border);
        assert_eq!(bed.containment("chr2", 28, 52), RegionContainment::Border);
        assert_eq!(bed.containment("chr2", 30, 50), RegionContainment::Outside);
        assert_eq!(bed.containment("chr2", 60, 70), RegionContainment::Outside);
        assert_eq!(bed.containment("chr2", 0, 10), RegionContainment::Outside);

        // insertions
        assert_eq!(bed.containment("chr1", 4, 4), RegionContainment::Inside);
        assert_eq!(bed.containment("chr1", 5, 5), RegionContainment::Outside);
    }
}
