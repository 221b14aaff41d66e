//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Channelmap CLI - map payment channel payloads onto the internal order schema
///
/// Preview mappings against sample channel responses, test individual transform
/// rules and validate mapping sets before they are saved.
#[derive(Parser, Debug)]
#[command(
    name = "channelmap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CHANNELMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalog file with channels, schemas and mappings (JSON or YAML)
    #[arg(long, global = true, env = "CHANNELMAP_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a channel's mappings over a sample input document
    Preview(PreviewArgs),

    /// Evaluate a single transform rule against a value
    TestRule(TestRuleArgs),

    /// Validate a channel's mapping set
    Validate(ValidateArgs),

    /// Show or replace a channel's mapping set
    Mappings(MappingsArgs),

    /// List channels in the catalog
    Channels(ChannelsArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the preview command
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Channel id or code
    #[arg(value_name = "CHANNEL")]
    pub channel: String,

    /// Sample channel response (JSON or YAML)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Preview an unsaved mapping set from this file instead of the stored one
    #[arg(long, value_name = "FILE")]
    pub mappings: Option<PathBuf>,

    /// Write the mapped document to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the test-rule command
#[derive(Parser, Debug)]
pub struct TestRuleArgs {
    /// Rule descriptor as JSON, or @path to read it from a file
    #[arg(long, value_name = "JSON|@FILE", conflicts_with = "preset")]
    pub rule: Option<String>,

    /// Use a built-in rule by name
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Value to transform; parsed as JSON when possible
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    /// Treat VALUE as a plain string even if it parses as JSON
    #[arg(long)]
    pub string: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Channel id or code
    #[arg(value_name = "CHANNEL")]
    pub channel: String,

    /// Also check a sample input document against the declared field types
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the mappings command
#[derive(Parser, Debug)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub action: MappingsAction,
}

/// Mapping set actions
#[derive(Subcommand, Debug)]
pub enum MappingsAction {
    /// Print the stored mapping set
    Show {
        /// Channel id or code
        channel: String,
    },

    /// Validate and store a mapping set from a file
    Save {
        /// Channel id or code
        channel: String,

        /// Mapping set (JSON or YAML list of mappings)
        file: PathBuf,

        /// Validate only; leave the catalog untouched
        #[arg(long)]
        dry_run: bool,
    },
}

/// Arguments for the channels command
#[derive(Parser, Debug)]
pub struct ChannelsArgs {
    /// Include each channel's declared fields
    #[arg(long)]
    pub fields: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),

    /// Print the configuration file in use and the search paths
    Path,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to the user config directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Force overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli {
            verbose: 2,
            quiet: false,
            config: None,
            catalog: None,
            output: OutputFormat::Human,
            no_color: false,
            command: Commands::Channels(ChannelsArgs { fields: false }),
        };
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli { quiet: true, ..cli };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_test_rule_accepts_negative_values() {
        let cli = Cli::parse_from(["channelmap", "test-rule", "--preset", "cents_to_yuan", "-1999"]);
        match cli.command {
            Commands::TestRule(args) => {
                assert_eq!(args.value, "-1999");
                assert_eq!(args.preset.as_deref(), Some("cents_to_yuan"));
                assert!(args.rule.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rule_and_preset_conflict() {
        let parsed = Cli::try_parse_from([
            "channelmap",
            "test-rule",
            "--preset",
            "cents_to_yuan",
            "--rule",
            "{}",
            "1",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_mappings_save_parsing() {
        let cli = Cli::parse_from([
            "channelmap",
            "--catalog",
            "catalog.yaml",
            "mappings",
            "save",
            "wechat",
            "mappings.json",
            "--dry-run",
        ]);
        assert_eq!(cli.catalog, Some(PathBuf::from("catalog.yaml")));
        match cli.command {
            Commands::Mappings(MappingsArgs {
                action: MappingsAction::Save { channel, file, dry_run },
            }) => {
                assert_eq!(channel, "wechat");
                assert_eq!(file, PathBuf::from("mappings.json"));
                assert!(dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
