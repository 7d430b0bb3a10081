use anyhow::{Context, anyhow, bail, ensure};
use derive_builder::Builder;
use log::{debug, info, warn};
use noodles::vcf;
use noodles::vcf::variant::record::samples::keys::key as vcf_key;
use noodles::vcf::variant::record_buf::samples::sample::Value as SampleValue;
use noodles_util::variant::io::reader::Builder as VcfBuilder;
use rustc_hash::FxHashSet;
use std::path::Path;
use strum::IntoEnumIterator;

use crate::data_types::callset::{Callset, HaplotypeStreams};
use crate::data_types::phase_enums::Haplotype;
use crate::data_types::variant_stream::VariantStream;
use crate::data_types::variants::{Variant, VariantType};
use crate::parsing::noodles_helper::{LoadedBed, RegionContainment};

/// Controls which records are kept while loading a callset
#[derive(Builder, Clone, Copy, Debug)]
#[builder(default)]
pub struct LoadConfig {
    /// Gap threshold used to split each haplotype into clusters
    gap: usize,
    /// Records with QUAL below this are dropped
    min_quality: f32,
    /// Alleles where both REF and ALT are shorter than this are dropped
    min_size: usize,
    /// Alleles where either REF or ALT is longer than this are dropped
    max_size: usize
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            gap: 50,
            min_quality: 0.0,
            min_size: 1,
            max_size: 5000
        }
    }
}

/// Counts of everything seen while loading a callset, reported once at the end
#[derive(Clone, Debug, Default)]
pub struct LoadStatistics {
    /// Total records read
    pub records: usize,
    /// Records without PASS or an empty filter
    pub failed_filter: usize,
    /// Records with QUAL below the minimum
    pub failed_quality: usize,
    /// Records with more than one GT entry that differed from the contig ploidy
    pub wrong_ploidy: usize,
    /// Records with no GT value for the sample
    pub missing_genotype: usize,
    /// Haplotype alleles that were `.`
    pub unknown_alleles: usize,
    /// Haplotype alleles that were `*`
    pub spanning_deletions: usize,
    /// Haplotype alleles that were symbolic or breakends
    pub symbolic_alleles: usize,
    /// Haplotype alleles identical to the reference
    pub reference_alleles: usize,
    /// Region classification counts, in `RegionContainment` order: outside, inside, border, off-contig
    pub region_counts: [usize; 4],
    /// Alleles skipped for exceeding the maximum size
    pub large_variants: usize,
    /// Alleles skipped for being under the minimum size
    pub small_variants: usize,
    /// Alleles skipped for overlapping the previous variant on the same haplotype
    pub overlapping_variants: usize,
    /// Accepted variants per haplotype and `VariantType`
    pub type_counts: [[usize; 5]; 2]
}

impl LoadStatistics {
    fn count_region(&mut self, containment: RegionContainment) {
        let index = match containment {
            RegionContainment::Outside => 0,
            RegionContainment::Inside => 1,
            RegionContainment::Border => 2,
            RegionContainment::OffContig => 3
        };
        self.region_counts[index] += 1;
    }

    /// Total accepted variants across both haplotypes
    pub fn accepted(&self) -> usize {
        self.type_counts.iter().flatten().sum()
    }

    /// Logs the statistics, with warnings for anything that was skipped
    fn log_summary(&self, label: &str, config: &LoadConfig) {
        info!("Loaded {} variants from {} {label} records.", self.accepted(), self.records);
        debug!("\tFailed filter: {}", self.failed_filter);
        debug!("\tFailed min QUAL ({}): {}", config.min_quality, self.failed_quality);
        debug!("\tRegions (outside, inside, border, off-contig): {:?}", self.region_counts);
        for haplotype in Haplotype::iter() {
            let counts = &self.type_counts[haplotype.index()];
            debug!("\t{}: REF={} SUB={} INS={} DEL={} GRP={}", haplotype.as_ref(),
                counts[0], counts[1], counts[2], counts[3], counts[4]
            );
        }

        if self.missing_genotype > 0 {
            warn!("{} total {label} records without a genotype skipped", self.missing_genotype);
        }
        if self.unknown_alleles > 0 {
            warn!("{} total unknown alleles (.) found in {label} VCF, skipped", self.unknown_alleles);
        }
        if self.wrong_ploidy > 0 {
            warn!("{} total variants with incorrect ploidy found in {label} VCF, kept", self.wrong_ploidy);
        }
        if self.symbolic_alleles > 0 {
            warn!("{} total symbolic {label} VCF alleles skipped", self.symbolic_alleles);
        }
        if self.large_variants > 0 {
            warn!("{} total large {label} VCF variant calls skipped, size > {}", self.large_variants, config.max_size);
        }
        if self.small_variants > 0 {
            warn!("{} total small {label} VCF variant calls skipped, size < {}", self.small_variants, config.min_size);
        }
        if self.overlapping_variants > 0 {
            warn!("{} total overlapping {label} VCF variant calls skipped", self.overlapping_variants);
        }
    }
}

/// A single allele after removing the bases it shares with the reference allele
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrimmedAllele {
    pub variant_type: VariantType,
    pub position: usize,
    pub ref_allele: Vec<u8>,
    pub alt_allele: Vec<u8>
}

/// Trims a REF/ALT pair and classifies what remains.
/// Indels have the shared prefix and suffix removed; if one side is exhausted it is a clean insertion or deletion, otherwise a group.
/// Same-length alleles become a substitution when exactly one base differs after trimming, otherwise a group.
/// # Arguments
/// * `position` - the 0-based position of the record
/// * `ref_allele` - the REF column
/// * `alt_allele` - the chosen ALT allele
pub fn classify_allele(position: usize, ref_allele: &[u8], alt_allele: &[u8]) -> TrimmedAllele {
    let ref_len = ref_allele.len();
    let alt_len = alt_allele.len();
    let shorter = ref_len.min(alt_len);

    let prefix = ref_allele.iter().zip(alt_allele.iter())
        .take_while(|(r, a)| r == a)
        .count();
    let suffix = ref_allele[prefix..].iter().rev()
        .zip(alt_allele[prefix..].iter().rev())
        .take_while(|(r, a)| r == a)
        .count();

    let trimmed_ref = ref_allele[prefix..ref_len-suffix].to_vec();
    let trimmed_alt = alt_allele[prefix..alt_len-suffix].to_vec();
    let variant_type = if ref_len == alt_len {
        match trimmed_ref.len() {
            0 => VariantType::Reference,
            1 => VariantType::Substitution,
            _ => VariantType::Group
        }
    } else if prefix + suffix == shorter {
        if ref_len < alt_len {
            VariantType::Insertion
        } else {
            VariantType::Deletion
        }
    } else {
        VariantType::Group
    };

    if variant_type == VariantType::Reference {
        TrimmedAllele {
            variant_type,
            position,
            ref_allele: ref_allele.to_vec(),
            alt_allele: alt_allele.to_vec()
        }
    } else {
        TrimmedAllele {
            variant_type,
            position: position + prefix,
            ref_allele: trimmed_ref,
            alt_allele: trimmed_alt
        }
    }
}

/// Everything accumulated for the contig currently being read
struct ContigState {
    name: String,
    variants: [Vec<Variant>; 2],
    previous_end: [usize; 2],
    ploidy: Option<usize>
}

impl ContigState {
    fn new(name: String) -> Self {
        Self {
            name,
            variants: [vec![], vec![]],
            previous_end: [0; 2],
            ploidy: None
        }
    }

    /// Converts the accumulated variants into clustered streams and stores them
    fn finish(self, callset: &mut Callset, gap: usize) -> anyhow::Result<()> {
        let [hap1, hap2] = self.variants;
        let streams = HaplotypeStreams::new(
            VariantStream::from_variants(Haplotype::Hap1, hap1, gap)
                .with_context(|| format!("Error while building hap1 stream for {}:", self.name))?,
            VariantStream::from_variants(Haplotype::Hap2, hap2, gap)
                .with_context(|| format!("Error while building hap2 stream for {}:", self.name))?
        );
        debug!("\t{}: {} | {} variants", self.name, streams.hap1().len(), streams.hap2().len());
        callset.insert_contig(self.name, streams);
        Ok(())
    }
}

/// Pulls the per-haplotype allele indices out of a sample GT value
fn genotype_alleles(value: &SampleValue) -> Option<Vec<Option<usize>>> {
    match value {
        SampleValue::Genotype(genotype) => Some(
            genotype.as_ref().iter()
                .map(|allele| allele.position())
                .collect()
        ),
        _ => None
    }
}

/// Reads GQ from a sample, which may be stored as either an integer or a float
fn genotype_quality(sample: &vcf::variant::record_buf::samples::Sample<'_>) -> f32 {
    match sample.get(vcf_key::CONDITIONAL_GENOTYPE_QUALITY) {
        Some(Some(SampleValue::Integer(gq))) => *gq as f32,
        Some(Some(SampleValue::Float(gq))) => *gq,
        _ => 0.0
    }
}

/// Loads one sample of a VCF into a callset of clustered haplotype streams.
/// # Arguments
/// * `vcf_fn` - the VCF/BCF file, optionally bgzipped
/// * `sample_name` - the sample to load
/// * `label` - a label for log messages, e.g. "truth"
/// * `regions` - optional regions to restrict the variants to
/// * `config` - record filters and the cluster gap
/// # Errors
/// * if the file cannot be opened or parsed
/// * if the sample is missing, a record has ploidy above 2, or the contigs are unsorted
pub fn load_callset(vcf_fn: &Path, sample_name: &str, label: &str, regions: Option<&LoadedBed>, config: LoadConfig) -> anyhow::Result<Callset> {
    info!("Loading {label} variants from {vcf_fn:?}...");
    let mut vcf_reader = VcfBuilder::default()
        .build_from_path(vcf_fn)
        .with_context(|| format!("Error while opening {vcf_fn:?}:"))?;
    let vcf_header = vcf_reader.read_header()
        .with_context(|| format!("Error while reading header of {vcf_fn:?}:"))?;

    let sample_index = vcf_header.sample_names().get_index_of(sample_name)
        .ok_or(anyhow!("Sample name {sample_name:?} was not found in {vcf_fn:?}"))?;
    let has_genotype = vcf_header.formats().contains_key(vcf_key::GENOTYPE);
    if !has_genotype {
        warn!("'GT' tag not defined in {label} VCF header, assuming haploid ALT calls");
    }

    let mut callset = Callset::new(label.to_string(), sample_name.to_string());
    let mut stats = LoadStatistics::default();
    let mut seen_contigs: FxHashSet<String> = Default::default();
    let mut state: Option<ContigState> = None;

    for result in vcf_reader.records(&vcf_header) {
        let record: Box<dyn vcf::variant::Record> = result
            .with_context(|| format!("Error while reading record from {vcf_fn:?}:"))?;
        let record = vcf::variant::RecordBuf::try_from_variant_record(&vcf_header, record.as_ref())?;
        stats.records += 1;

        // contig changes close out the previous contig
        let chrom = record.reference_sequence_name();
        if state.as_ref().map(|s| s.name.as_str()) != Some(chrom) {
            if let Some(previous) = state.take() {
                previous.finish(&mut callset, config.gap)?;
            }
            if !seen_contigs.insert(chrom.to_string()) {
                bail!("Unsorted {label} VCF {vcf_fn:?}, contig {chrom:?} was already parsed");
            }
            state = Some(ContigState::new(chrom.to_string()));
        }
        let contig_state = state.as_mut().ok_or(anyhow!("No active contig"))?;

        let filters = record.filters().as_ref();
        if !(filters.is_empty() || filters.contains("PASS")) {
            stats.failed_filter += 1;
            continue;
        }

        // missing QUAL is treated as 0
        let variant_quality = record.quality_score().unwrap_or(0.0);
        if variant_quality < config.min_quality {
            stats.failed_quality += 1;
            continue;
        }

        let position = record.variant_start()
            .ok_or(anyhow!("Missing POS in {chrom}"))?
            .get() - 1;
        let sample = record.samples().get_index(sample_index)
            .ok_or(anyhow!("Missing sample {sample_name:?} at {chrom}:{}", position + 1))?;
        let gq = genotype_quality(&sample);

        let alleles: Vec<Option<usize>> = if has_genotype {
            match sample.get(vcf_key::GENOTYPE) {
                Some(Some(value)) => genotype_alleles(value)
                    .ok_or(anyhow!("Unexpected GT value at {chrom}:{}", position + 1))?,
                _ => {
                    stats.missing_genotype += 1;
                    continue;
                }
            }
        } else {
            vec![Some(1)]
        };
        ensure!(alleles.len() <= 2, "Expected haploid/diploid {label} VCF, found ploidy {} at {chrom}:{}", alleles.len(), position + 1);

        // the ploidy of a contig is fixed by its first record, except on X
        match contig_state.ploidy {
            Some(p) if p != alleles.len() && !chrom.ends_with('X') => stats.wrong_ploidy += 1,
            Some(_) => {},
            None => contig_state.ploidy = Some(alleles.len())
        };

        let ref_bases = record.reference_bases().as_bytes();
        let alt_alleles = record.alternate_bases().as_ref();
        for (allele, haplotype) in alleles.iter().zip(Haplotype::iter()) {
            let alt_index = match allele {
                Some(0) => continue,
                Some(i) => *i,
                None => {
                    stats.unknown_alleles += 1;
                    continue;
                }
            };
            let alt_bases = alt_alleles.get(alt_index - 1)
                .ok_or(anyhow!("GT allele {alt_index} is not defined at {chrom}:{}", position + 1))?;
            if alt_bases == "*" {
                stats.spanning_deletions += 1;
                continue;
            }
            if alt_bases.starts_with('<') || alt_bases.contains(&['[', ']'][..]) {
                stats.symbolic_alleles += 1;
                continue;
            }

            let trimmed = classify_allele(position, ref_bases, alt_bases.as_bytes());
            if trimmed.variant_type == VariantType::Reference {
                stats.reference_alleles += 1;
                continue;
            }

            let variant = Variant::new(trimmed.variant_type, haplotype, trimmed.position, trimmed.ref_allele, trimmed.alt_allele)
                .with_context(|| format!("Error while creating variant at {chrom}:{}", position + 1))?
                .with_qualities(gq, variant_quality);

            if let Some(bed) = regions {
                let containment = bed.containment(chrom, variant.position(), variant.end());
                stats.count_region(containment);
                if matches!(containment, RegionContainment::Outside | RegionContainment::OffContig) {
                    continue;
                }
            }

            let ref_size = variant.ref_allele().len();
            let alt_size = variant.alt_allele().len();
            if ref_size > config.max_size || alt_size > config.max_size {
                stats.large_variants += 1;
                continue;
            }
            if ref_size < config.min_size && alt_size < config.min_size {
                stats.small_variants += 1;
                continue;
            }

            let hap = haplotype.index();
            if contig_state.previous_end[hap] > variant.position() {
                debug!("Overlap in {label} VCF variants at {chrom}:{}, skipping", variant.position());
                stats.overlapping_variants += 1;
                continue;
            }

            contig_state.previous_end[hap] = variant.end();
            stats.type_counts[hap][variant.variant_type() as usize] += 1;
            contig_state.variants[hap].push(variant);
        }
    }

    if let Some(last) = state.take() {
        last.finish(&mut callset, config.gap)?;
    }

    stats.log_summary(label, &config);
    Ok(callset)
}
