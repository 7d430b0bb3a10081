use serde::Serialize;

/// A 0-based, half-open interval on a contig
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Coordinates {
    chrom: String,
    start: usize,
    end: usize
}

impl Coordinates {
    /// Creates a new interval
    /// # Panics
    /// * if `start > end`
    pub fn new(chrom: String, start: usize, end: usize) -> Self {
        assert!(start <= end, "start must be <= end");
        Self { chrom, start, end }
    }

    /// Number of reference bases covered
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `[start, end)` is fully inside this interval
    pub fn contains(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}
