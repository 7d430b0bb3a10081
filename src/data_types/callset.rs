use indexmap::IndexMap;

use crate::data_types::phase_enums::Haplotype;
use crate::data_types::variant_stream::VariantStream;

/// The pair of haplotype streams for a single contig
#[derive(Clone, Debug)]
pub struct HaplotypeStreams {
    hap1: VariantStream,
    hap2: VariantStream
}

impl HaplotypeStreams {
    /// Creates a new pair, the streams are expected to be labeled hap1 and hap2 respectively.
    pub fn new(hap1: VariantStream, hap2: VariantStream) -> Self {
        Self { hap1, hap2 }
    }

    /// Creates a pair with no variants on either haplotype
    pub fn empty() -> Self {
        Self {
            hap1: VariantStream::empty(Haplotype::Hap1),
            hap2: VariantStream::empty(Haplotype::Hap2)
        }
    }

    /// Returns the stream for a haplotype
    pub fn get(&self, haplotype: Haplotype) -> &VariantStream {
        match haplotype {
            Haplotype::Hap1 => &self.hap1,
            Haplotype::Hap2 => &self.hap2
        }
    }

    /// Total number of variants across both haplotypes
    pub fn num_variants(&self) -> usize {
        self.hap1.len() + self.hap2.len()
    }

    // getters
    pub fn hap1(&self) -> &VariantStream {
        &self.hap1
    }

    pub fn hap2(&self) -> &VariantStream {
        &self.hap2
    }
}

/// All the variants from one sample of one input file, grouped by contig in file order
#[derive(Clone, Debug, Default)]
pub struct Callset {
    /// User facing label, e.g. "truth" or "query"
    label: String,
    /// The sample the genotypes were pulled from
    sample: String,
    /// Map from contig to the haplotype streams, preserving input order
    contigs: IndexMap<String, HaplotypeStreams>
}

impl Callset {
    /// Creates an empty callset
    pub fn new(label: String, sample: String) -> Self {
        Self {
            label,
            sample,
            contigs: Default::default()
        }
    }

    /// Adds the streams for a contig, replacing any previous entry
    pub fn insert_contig(&mut self, contig: String, streams: HaplotypeStreams) {
        self.contigs.insert(contig, streams);
    }

    /// Returns the streams for a contig if it had any variants
    pub fn get_contig(&self, contig: &str) -> Option<&HaplotypeStreams> {
        self.contigs.get(contig)
    }

    /// Total number of variants across all contigs and haplotypes
    pub fn num_variants(&self) -> usize {
        self.contigs.values()
            .map(|s| s.num_variants())
            .sum()
    }

    // getters
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn contigs(&self) -> &IndexMap<String, HaplotypeStreams> {
        &self.contigs
    }
}

/// Builds the ordered union of contigs across two callsets; contigs of `first` come first.
pub fn joint_contig_order(first: &Callset, second: &Callset) -> Vec<String> {
    let mut ret: Vec<String> = first.contigs().keys().cloned().collect();
    ret.extend(
        second.contigs().keys()
            .filter(|k| !first.contigs().contains_key(k.as_str()))
            .cloned()
    );
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::variants::Variant;

    fn single_variant_streams(position: usize) -> HaplotypeStreams {
        let variant = Variant::new_insertion(Haplotype::Hap1, position, b"A".to_vec()).unwrap();
        HaplotypeStreams::new(
            VariantStream::from_variants(Haplotype::Hap1, vec![variant], 10).unwrap(),
            VariantStream::empty(Haplotype::Hap2)
        )
    }

    #[test]
    fn test_callset() {
        let mut callset = Callset::new("truth".to_string(), "HG002".to_string());
        callset.insert_contig("chr2".to_string(), single_variant_streams(5));
        callset.insert_contig("chr1".to_string(), single_variant_streams(8));
        assert_eq!(callset.num_variants(), 2);
        assert_eq!(callset.label(), "truth");
        assert_eq!(callset.sample(), "HG002");
        assert!(callset.get_contig("chr3").is_none());
        assert_eq!(callset.get_contig("chr1").unwrap().get(Haplotype::Hap1).len(), 1);
        assert!(callset.get_contig("chr1").unwrap().hap2().is_empty());

        // insertion order is preserved
        let keys: Vec<&String> = callset.contigs().keys().collect();
        assert_eq!(keys, vec!["chr2", "chr1"]);
    }

    #[test]
    fn test_joint_contig_order() {
        let mut first = Callset::new("truth".to_string(), "S".to_string());
        first.insert_contig("chr2".to_string(), HaplotypeStreams::empty());
        first.insert_contig("chr1".to_string(), HaplotypeStreams::empty());
        let mut second = Callset::new("query".to_string(), "S".to_string());
        second.insert_contig("chr3".to_string(), HaplotypeStreams::empty());
        second.insert_contig("chr1".to_string(), HaplotypeStreams::empty());

        assert_eq!(joint_contig_order(&first, &second), vec!["chr2", "chr1", "chr3"]);
    }
}
