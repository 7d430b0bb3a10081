use indexmap::IndexMap;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;

#[derive(thiserror::Error, Debug)]
pub enum ReferenceError {
    #[error("contig {contig:?} was not found in the reference")]
    MissingContig { contig: String },
    #[error("interval {start}-{end} is outside of contig {contig:?} with length {length}")]
    OutOfBounds { contig: String, start: usize, end: usize, length: usize }
}

/// Lookup of reference sequences by contig name.
/// Implementations are read-only after construction, so one instance can be shared by every worker.
pub trait ReferenceAccessor {
    /// Returns the full sequence of a contig
    /// # Errors
    /// * if the contig is not present
    fn sequence(&self, contig: &str) -> Result<&[u8], ReferenceError>;

    /// Returns the length of a contig
    /// # Errors
    /// * if the contig is not present
    fn contig_length(&self, contig: &str) -> Result<usize, ReferenceError> {
        Ok(self.sequence(contig)?.len())
    }

    /// Returns the 0-based, half-open sub-sequence of a contig
    /// # Errors
    /// * if the contig is not present
    /// * if the interval does not fit in the contig
    fn subsequence(&self, contig: &str, start: usize, end: usize) -> Result<&[u8], ReferenceError> {
        let sequence = self.sequence(contig)?;
        if start > end || end > sequence.len() {
            return Err(ReferenceError::OutOfBounds {
                contig: contig.to_string(), start, end, length: sequence.len()
            });
        }
        Ok(&sequence[start..end])
    }
}

impl ReferenceAccessor for ReferenceGenome {
    fn sequence(&self, contig: &str) -> Result<&[u8], ReferenceError> {
        // get_full_chromosome panics on a missing key, so check first
        if self.contig_keys().iter().any(|k| k.as_str() == contig) {
            Ok(self.get_full_chromosome(contig))
        } else {
            Err(ReferenceError::MissingContig { contig: contig.to_string() })
        }
    }
}

/// Plain map from contig to sequence, for callers that already hold the bases in memory
impl ReferenceAccessor for IndexMap<String, Vec<u8>> {
    fn sequence(&self, contig: &str) -> Result<&[u8], ReferenceError> {
        self.get(contig)
            .map(|s| s.as_slice())
            .ok_or_else(|| ReferenceError::MissingContig { contig: contig.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_genome_accessor() {
        let mut reference_genome = ReferenceGenome::empty_reference();
        reference_genome.add_contig("mock_chr1".to_string(), "ACGTACGT").unwrap();

        assert_eq!(reference_genome.sequence("mock_chr1").unwrap(), b"ACGTACGT");
        assert_eq!(reference_genome.contig_length("mock_chr1").unwrap(), 8);
        assert_eq!(reference_genome.subsequence("mock_chr1", 2, 5).unwrap(), b"GTA");
        assert!(matches!(
            reference_genome.sequence("chr2"),
            Err(ReferenceError::MissingContig { .. })
        ));
        assert!(matches!(
            reference_genome.subsequence("mock_chr1", 4, 9),
            Err(ReferenceError::OutOfBounds { length: 8, .. })
        ));
    }

    #[test]
    fn test_map_accessor() {
        let mut reference: IndexMap<String, Vec<u8>> = Default::default();
        reference.insert("chrM".to_string(), b"GATCACAGG".to_vec());
        assert_eq!(reference.contig_length("chrM").unwrap(), 9);
        assert_eq!(reference.subsequence("chrM", 0, 4).unwrap(), b"GATC");
        assert!(reference.sequence("chr1").is_err());
    }
}
