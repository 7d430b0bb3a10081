/// Helper functions for writing JSON via serde
pub mod json_io;
/// Helper functions for generating the progress bars
pub mod progress_bar;
/// Reference implementations for indel edit distance
pub mod sequence_alignment;
