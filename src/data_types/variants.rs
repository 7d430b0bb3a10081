use crate::data_types::phase_enums::Haplotype;

/// All the variant types a haplotype stream can describe
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, strum_macros::AsRefStr)]
pub enum VariantType {
    /// REF and ALT are identical; these are dropped while parsing and never allowed in a stream
    #[strum(serialize = "REF")]
    Reference=0,
    /// REF and ALT are both length = 1 and differ
    #[strum(serialize = "SUB")]
    Substitution,
    /// REF is empty after trimming, ALT is not
    #[strum(serialize = "INS")]
    Insertion,
    /// ALT is empty after trimming, REF is not
    #[strum(serialize = "DEL")]
    Deletion,
    /// Complex replacement of multiple reference bases, kept as a single unit
    #[strum(serialize = "GRP")]
    Group
}

#[derive(thiserror::Error, Debug)]
pub enum VariantError {
    #[error("{variant_type:?} requires a {allele} allele of length {expected}, found {found}")]
    AlleleLength { variant_type: VariantType, allele: &'static str, expected: usize, found: usize },
    #[error("{variant_type:?} requires a non-empty {allele} allele")]
    EmptyAllele { variant_type: VariantType, allele: &'static str },
    #[error("substitution alleles must differ")]
    IdenticalSubstitution,
    #[error("reference variant alleles must be identical")]
    ReferenceMismatch
}

/// A single haplotype-specific variant, positions are 0-based on the contig.
/// Alleles are stored after prefix/suffix trimming, so an insertion has an empty REF and a deletion has an empty ALT.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    /// The coordinate of the first affected reference base, 0-based
    position: usize,
    /// The haplotype this variant was called on
    haplotype: Haplotype,
    /// The type of variant represented by this entry
    variant_type: VariantType,
    /// the reference allele
    ref_allele: Vec<u8>,
    /// the alternate allele
    alt_allele: Vec<u8>,
    /// GQ from the sample column, 0 if missing
    genotype_quality: f32,
    /// QUAL from the record, 0 if missing
    variant_quality: f32
}

impl Variant {
    /// Creates a new variant of the given type, dispatching to the type-specific constructors.
    /// # Arguments
    /// * `variant_type` - the type of the variant
    /// * `haplotype` - the haplotype this was called on
    /// * `position` - the 0-based coordinate of the variant
    /// * `ref_allele` - the trimmed reference allele
    /// * `alt_allele` - the trimmed alternate allele
    /// # Errors
    /// * if the alleles do not match the shape required by `variant_type`
    pub fn new(variant_type: VariantType, haplotype: Haplotype, position: usize, ref_allele: Vec<u8>, alt_allele: Vec<u8>) -> Result<Variant, VariantError> {
        match variant_type {
            VariantType::Reference => Variant::new_reference(haplotype, position, ref_allele, alt_allele),
            VariantType::Substitution => Variant::new_substitution(haplotype, position, ref_allele, alt_allele),
            VariantType::Insertion => Variant::new_insertion(haplotype, position, alt_allele),
            VariantType::Deletion => Variant::new_deletion(haplotype, position, ref_allele),
            VariantType::Group => Variant::new_group(haplotype, position, ref_allele, alt_allele)
        }
    }

    /// Creates a new single-base substitution.
    /// # Errors
    /// * if either allele is not exactly 1 bp
    /// * if the alleles are identical
    pub fn new_substitution(haplotype: Haplotype, position: usize, ref_allele: Vec<u8>, alt_allele: Vec<u8>) -> Result<Variant, VariantError> {
        let variant_type = VariantType::Substitution;
        if ref_allele.len() != 1 {
            return Err(VariantError::AlleleLength { variant_type, allele: "REF", expected: 1, found: ref_allele.len() });
        }
        if alt_allele.len() != 1 {
            return Err(VariantError::AlleleLength { variant_type, allele: "ALT", expected: 1, found: alt_allele.len() });
        }
        if ref_allele == alt_allele {
            return Err(VariantError::IdenticalSubstitution);
        }
        Ok(Self::build(variant_type, haplotype, position, ref_allele, alt_allele))
    }

    /// Creates a new insertion before the reference base at `position`.
    /// # Errors
    /// * if the inserted sequence is empty
    pub fn new_insertion(haplotype: Haplotype, position: usize, alt_allele: Vec<u8>) -> Result<Variant, VariantError> {
        if alt_allele.is_empty() {
            return Err(VariantError::EmptyAllele { variant_type: VariantType::Insertion, allele: "ALT" });
        }
        Ok(Self::build(VariantType::Insertion, haplotype, position, vec![], alt_allele))
    }

    /// Creates a new deletion of the reference bases starting at `position`.
    /// # Errors
    /// * if the deleted sequence is empty
    pub fn new_deletion(haplotype: Haplotype, position: usize, ref_allele: Vec<u8>) -> Result<Variant, VariantError> {
        if ref_allele.is_empty() {
            return Err(VariantError::EmptyAllele { variant_type: VariantType::Deletion, allele: "REF" });
        }
        Ok(Self::build(VariantType::Deletion, haplotype, position, ref_allele, vec![]))
    }

    /// Creates a new complex variant that replaces the full REF allele with the ALT allele.
    /// # Errors
    /// * if either allele is empty
    pub fn new_group(haplotype: Haplotype, position: usize, ref_allele: Vec<u8>, alt_allele: Vec<u8>) -> Result<Variant, VariantError> {
        let variant_type = VariantType::Group;
        if ref_allele.is_empty() {
            return Err(VariantError::EmptyAllele { variant_type, allele: "REF" });
        }
        if alt_allele.is_empty() {
            return Err(VariantError::EmptyAllele { variant_type, allele: "ALT" });
        }
        Ok(Self::build(variant_type, haplotype, position, ref_allele, alt_allele))
    }

    /// Creates a reference call, mostly useful for tracking filtered records.
    /// # Errors
    /// * if the alleles are not identical
    pub fn new_reference(haplotype: Haplotype, position: usize, ref_allele: Vec<u8>, alt_allele: Vec<u8>) -> Result<Variant, VariantError> {
        if ref_allele != alt_allele {
            return Err(VariantError::ReferenceMismatch);
        }
        Ok(Self::build(VariantType::Reference, haplotype, position, ref_allele, alt_allele))
    }

    fn build(variant_type: VariantType, haplotype: Haplotype, position: usize, ref_allele: Vec<u8>, alt_allele: Vec<u8>) -> Variant {
        Variant {
            position,
            haplotype,
            variant_type,
            ref_allele,
            alt_allele,
            genotype_quality: 0.0,
            variant_quality: 0.0
        }
    }

    /// Attaches the quality values parsed from the record.
    pub fn with_qualities(mut self, genotype_quality: f32, variant_quality: f32) -> Self {
        self.genotype_quality = genotype_quality;
        self.variant_quality = variant_quality;
        self
    }

    /// The number of reference bases consumed by this variant
    pub fn ref_len(&self) -> usize {
        match self.variant_type {
            VariantType::Insertion => 0,
            VariantType::Substitution => 1,
            VariantType::Reference |
            VariantType::Deletion |
            VariantType::Group => self.ref_allele.len()
        }
    }

    /// The first reference coordinate after this variant, exclusive
    pub fn end(&self) -> usize {
        self.position + self.ref_len()
    }

    /// The number of insert/delete operations needed to describe this variant against the reference.
    /// A substitution costs 2 since there is no direct mismatch operation.
    pub fn indel_cost(&self) -> usize {
        match self.variant_type {
            VariantType::Reference => 0,
            VariantType::Substitution => 2,
            VariantType::Insertion => self.alt_allele.len(),
            VariantType::Deletion => self.ref_allele.len(),
            VariantType::Group => self.ref_allele.len() + self.alt_allele.len()
        }
    }

    // getters
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn haplotype(&self) -> Haplotype {
        self.haplotype
    }

    pub fn variant_type(&self) -> VariantType {
        self.variant_type
    }

    pub fn ref_allele(&self) -> &[u8] {
        &self.ref_allele
    }

    pub fn alt_allele(&self) -> &[u8] {
        &self.alt_allele
    }

    pub fn genotype_quality(&self) -> f32 {
        self.genotype_quality
    }

    pub fn variant_quality(&self) -> f32 {
        self.variant_quality
    }
}
