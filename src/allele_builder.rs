/*!
Materializes the haplotype sequences for a reference interval by walking two variant lists in lock-step.
The walk records which bytes of each sequence come from the same reference base, which is what lets a pair be compared position by position.
*/

use crate::data_types::reference::{ReferenceAccessor, ReferenceError};
use crate::data_types::variants::{Variant, VariantType};

#[derive(thiserror::Error, Debug)]
pub enum BuilderError {
    #[error("variant at position {position} has type {variant_type:?}, which cannot be applied to a haplotype")]
    UnexpectedVariantType { position: usize, variant_type: VariantType },
    #[error("variant at position {position} starts before the current reference cursor {cursor}")]
    OutOfOrder { position: usize, cursor: usize },
    #[error("variant at position {position} was not applied before the interval end {end_pos}")]
    UnconsumedVariant { position: usize, end_pos: usize },
    #[error(transparent)]
    Reference(#[from] ReferenceError)
}

/// The bytes of one haplotype over an interval, plus the correspondence to its sibling sequence
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AlleleSequence {
    /// The haplotype sequence
    sequence: Vec<u8>,
    /// For each byte, the index in the sibling sequence that holds the same reference base
    pointers: Vec<Option<usize>>
}

impl AlleleSequence {
    fn push(&mut self, base: u8, pointer: Option<usize>) {
        self.sequence.push(base);
        self.pointers.push(pointer);
    }

    fn extend(&mut self, bases: &[u8]) {
        self.sequence.extend_from_slice(bases);
        self.pointers.extend(std::iter::repeat(None).take(bases.len()));
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    // getters
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn pointers(&self) -> &[Option<usize>] {
        &self.pointers
    }
}

/// The two sequences produced by one lock-step walk
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HaplotypePair {
    first: AlleleSequence,
    second: AlleleSequence
}

impl HaplotypePair {
    pub fn first(&self) -> &AlleleSequence {
        &self.first
    }

    pub fn second(&self) -> &AlleleSequence {
        &self.second
    }

    /// Consumes the pair, returning both sequences
    pub fn into_sequences(self) -> (AlleleSequence, AlleleSequence) {
        (self.first, self.second)
    }
}

/// Walk state for one of the two variant lists
struct Walker<'a> {
    variants: &'a [Variant],
    next_variant: usize,
    cursor: usize,
    allele: AlleleSequence
}

impl<'a> Walker<'a> {
    fn new(variants: &'a [Variant], beg_pos: usize) -> Self {
        Self {
            variants,
            next_variant: 0,
            cursor: beg_pos,
            allele: AlleleSequence::default()
        }
    }

    /// Returns the next variant if it starts exactly at the cursor
    fn pending(&self) -> Result<Option<&'a Variant>, BuilderError> {
        match self.variants.get(self.next_variant) {
            Some(v) if v.position() < self.cursor => Err(BuilderError::OutOfOrder {
                position: v.position(),
                cursor: self.cursor
            }),
            Some(v) if v.position() == self.cursor => Ok(Some(v)),
            _ => Ok(None)
        }
    }

    /// Applies a variant to the sequence and moves the cursor past the reference bases it replaces
    fn consume(&mut self, variant: &Variant) -> Result<(), BuilderError> {
        match variant.variant_type() {
            VariantType::Insertion => {
                self.allele.extend(variant.alt_allele());
            },
            VariantType::Deletion => {
                self.cursor += variant.ref_len();
            },
            VariantType::Substitution |
            VariantType::Group => {
                self.allele.extend(variant.alt_allele());
                self.cursor += variant.ref_len();
            },
            VariantType::Reference => {
                return Err(BuilderError::UnexpectedVariantType {
                    position: variant.position(),
                    variant_type: variant.variant_type()
                });
            }
        };
        self.next_variant += 1;
        Ok(())
    }

    /// Copies the reference base under the cursor
    fn copy_base(&mut self, reference: &[u8], beg_pos: usize, pointer: Option<usize>) {
        self.allele.push(reference[self.cursor - beg_pos], pointer);
        self.cursor += 1;
    }

    /// Consumes the pending variant if there is one, otherwise copies a reference base with no correspondence
    fn advance(&mut self, reference: &[u8], beg_pos: usize) -> Result<(), BuilderError> {
        match self.pending()? {
            Some(variant) => self.consume(variant),
            None => {
                self.copy_base(reference, beg_pos, None);
                Ok(())
            }
        }
    }

    /// Errors if any variants were left over after the walk
    fn finish(self, end_pos: usize) -> Result<AlleleSequence, BuilderError> {
        match self.variants.get(self.next_variant) {
            Some(v) => Err(BuilderError::UnconsumedVariant { position: v.position(), end_pos }),
            None => Ok(self.allele)
        }
    }
}

/// Builds the two haplotype sequences for `[beg_pos, end_pos)` in one lock-step walk.
/// Reference bases copied at the same position by both walkers are linked through the pointer lists.
/// # Arguments
/// * `reference` - the reference lookup
/// * `contig` - the contig containing the interval
/// * `beg_pos` - the first reference position, inclusive
/// * `end_pos` - the last reference position, exclusive
/// * `first` - the variants for the first haplotype, sorted and inside the interval
/// * `second` - the variants for the second haplotype, sorted and inside the interval
/// # Errors
/// * if the contig is missing or the interval does not fit in it
/// * if a variant is a reference call, overlaps the previous one, or falls outside of the interval
pub fn build_haplotype_pair<R: ReferenceAccessor + ?Sized>(
    reference: &R, contig: &str, beg_pos: usize, end_pos: usize, first: &[Variant], second: &[Variant]
) -> Result<HaplotypePair, BuilderError> {
    let reference_seq = reference.subsequence(contig, beg_pos, end_pos)?;
    let mut walker1 = Walker::new(first, beg_pos);
    let mut walker2 = Walker::new(second, beg_pos);

    while walker1.cursor < end_pos || walker2.cursor < end_pos {
        match walker1.cursor.cmp(&walker2.cursor) {
            std::cmp::Ordering::Less => walker1.advance(reference_seq, beg_pos)?,
            std::cmp::Ordering::Greater => walker2.advance(reference_seq, beg_pos)?,
            std::cmp::Ordering::Equal => {
                match (walker1.pending()?, walker2.pending()?) {
                    (Some(v1), Some(v2)) => {
                        walker1.consume(v1)?;
                        walker2.consume(v2)?;
                    },
                    (Some(v1), None) => {
                        walker1.consume(v1)?;
                        walker2.copy_base(reference_seq, beg_pos, None);
                    },
                    (None, Some(v2)) => {
                        walker1.copy_base(reference_seq, beg_pos, None);
                        walker2.consume(v2)?;
                    },
                    (None, None) => {
                        let len1 = walker1.allele.len();
                        let len2 = walker2.allele.len();
                        walker1.copy_base(reference_seq, beg_pos, Some(len2));
                        walker2.copy_base(reference_seq, beg_pos, Some(len1));
                    }
                };
            }
        };
    }

    Ok(HaplotypePair {
        first: walker1.finish(end_pos)?,
        second: walker2.finish(end_pos)?
    })
}

/// Builds a single haplotype sequence for `[beg_pos, end_pos)`, pairing it against the unmodified reference.
/// # Arguments
/// * `reference` - the reference lookup
/// * `contig` - the contig containing the interval
/// * `beg_pos` - the first reference position, inclusive
/// * `end_pos` - the last reference position, exclusive
/// * `variants` - the variants to apply, sorted and inside the interval
/// # Errors
/// * see `build_haplotype_pair(...)`
pub fn build_haplotype<R: ReferenceAccessor + ?Sized>(
    reference: &R, contig: &str, beg_pos: usize, end_pos: usize, variants: &[Variant]
) -> Result<AlleleSequence, BuilderError> {
    let pair = build_haplotype_pair(reference, contig, beg_pos, end_pos, variants, &[])?;
    Ok(pair.first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_lib_reference_genome::reference_genome::ReferenceGenome;
    use crate::data_types::phase_enums::Haplotype;

    fn mock_reference() -> ReferenceGenome {
        let mut reference = ReferenceGenome::empty_reference();
        reference.add_contig("mock".to_string(), "ACGTACGTAC").unwrap();
        reference
    }

    #[test]
    fn test_no_variants() {
        let reference = mock_reference();
        let pair = build_haplotype_pair(&reference, "mock", 2, 6, &[], &[]).unwrap();
        assert_eq!(pair.first().sequence(), b"GTAC");
        assert_eq!(pair.second().sequence(), b"GTAC");
        let expected: Vec<Option<usize>> = (0..4).map(Some).collect();
        assert_eq!(pair.first().pointers(), &expected);
        assert_eq!(pair.second().pointers(), &expected);
    }

    #[test]
    fn test_substitution() {
        let reference = mock_reference();
        let variants = [Variant::new_substitution(Haplotype::Hap1, 1, b"C".to_vec(), b"G".to_vec()).unwrap()];
        let pair = build_haplotype_pair(&reference, "mock", 0, 4, &variants, &[]).unwrap();
        assert_eq!(pair.first().sequence(), b"AGGT");
        assert_eq!(pair.second().sequence(), b"ACGT");
        assert_eq!(pair.first().pointers(), &[Some(0), None, Some(2), Some(3)]);
        assert_eq!(pair.second().pointers(), &[Some(0), None, Some(2), Some(3)]);
    }

    #[test]
    fn test_insertion() {
        let reference = mock_reference();
        let variants = [Variant::new_insertion(Haplotype::Hap1, 2, b"TT".to_vec()).unwrap()];
        let pair = build_haplotype_pair(&reference, "mock", 0, 4, &variants, &[]).unwrap();
        assert_eq!(pair.first().sequence(), b"ACTTGT");
        assert_eq!(pair.second().sequence(), b"ACGT");

        // the base after the insertion is copied by each side at different times, so it is unlinked
        assert_eq!(pair.first().pointers(), &[Some(0), Some(1), None, None, None, Some(3)]);
        assert_eq!(pair.second().pointers(), &[Some(0), Some(1), None, Some(5)]);
    }

    #[test]
    fn test_deletion() {
        let reference = mock_reference();
        let variants = [Variant::new_deletion(Haplotype::Hap2, 1, b"CG".to_vec()).unwrap()];
        let pair = build_haplotype_pair(&reference, "mock", 0, 4, &[], &variants).unwrap();
        assert_eq!(pair.first().sequence(), b"ACGT");
        assert_eq!(pair.second().sequence(), b"AT");
        assert_eq!(pair.first().pointers(), &[Some(0), None, None, Some(1)]);
        assert_eq!(pair.second().pointers(), &[Some(0), Some(3)]);
    }

    #[test]
    fn test_shared_position() {
        let reference = mock_reference();
        let first = [
            Variant::new_substitution(Haplotype::Hap1, 4, b"A".to_vec(), b"C".to_vec()).unwrap(),
            Variant::new_group(Haplotype::Hap1, 6, b"GT".to_vec(), b"T".to_vec()).unwrap()
        ];
        let second = [
            Variant::new_substitution(Haplotype::Hap2, 4, b"A".to_vec(), b"T".to_vec()).unwrap()
        ];
        let pair = build_haplotype_pair(&reference, "mock", 3, 9, &first, &second).unwrap();
        assert_eq!(pair.first().sequence(), b"TCCTA");
        assert_eq!(pair.second().sequence(), b"TTCGTA");
        assert_eq!(pair.first().pointers(), &[Some(0), None, Some(2), None, Some(5)]);
        assert_eq!(pair.second().pointers(), &[Some(0), None, Some(2), None, None, Some(4)]);
    }

    #[test]
    fn test_single_haplotype() {
        let reference = mock_reference();
        let variants = [
            Variant::new_insertion(Haplotype::Hap1, 0, b"GG".to_vec()).unwrap(),
            Variant::new_deletion(Haplotype::Hap1, 3, b"TA".to_vec()).unwrap()
        ];
        let allele = build_haplotype(&reference, "mock", 0, 7, &variants).unwrap();
        assert_eq!(allele.sequence(), b"GGACGCG");
        assert_eq!(allele.len(), 7);
    }

    #[test]
    fn test_errors() {
        let reference = mock_reference();

        assert!(matches!(
            build_haplotype_pair(&reference, "missing", 0, 4, &[], &[]),
            Err(BuilderError::Reference(ReferenceError::MissingContig { .. }))
        ));
        assert!(matches!(
            build_haplotype_pair(&reference, "mock", 5, 12, &[], &[]),
            Err(BuilderError::Reference(ReferenceError::OutOfBounds { .. }))
        ));

        let reference_call = [Variant::new_reference(Haplotype::Hap1, 1, b"C".to_vec(), b"C".to_vec()).unwrap()];
        assert!(matches!(
            build_haplotype(&reference, "mock", 0, 4, &reference_call),
            Err(BuilderError::UnexpectedVariantType { position: 1, variant_type: VariantType::Reference })
        ));

        let before_interval = [Variant::new_deletion(Haplotype::Hap1, 1, b"C".to_vec()).unwrap()];
        assert!(matches!(
            build_haplotype(&reference, "mock", 2, 6, &before_interval),
            Err(BuilderError::OutOfOrder { position: 1, cursor: 2 })
        ));

        let after_interval = [Variant::new_deletion(Haplotype::Hap1, 8, b"A".to_vec()).unwrap()];
        assert!(matches!(
            build_haplotype(&reference, "mock", 2, 6, &after_interval),
            Err(BuilderError::UnconsumedVariant { position: 8, end_pos: 6 })
        ));
    }
}
