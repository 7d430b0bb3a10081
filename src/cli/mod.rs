/*!
# CLI module
Command line interface functionality that is specific to vcfdist.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The distance CLI subcommand
pub mod distance;
/// The realign CLI subcommand
pub mod realign;
