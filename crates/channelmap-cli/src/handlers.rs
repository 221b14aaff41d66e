//! Command handlers for CLI subcommands
//!
//! Each handler loads what it needs (catalog, input files), drives
//! `channelmap-core` and writes results through the [`OutputWriter`](crate::output::OutputWriter).

mod channels;
mod completions;
mod config;
mod mappings;
mod preview;
mod test_rule;
pub(crate) mod utils;
mod validate;

pub use channels::handle_channels;
pub use completions::handle_completions;
pub use config::handle_config;
pub use mappings::handle_mappings;
pub use preview::handle_preview;
pub use test_rule::handle_test_rule;
pub use validate::handle_validate;
