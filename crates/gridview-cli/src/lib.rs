//! Shared CLI definitions for gridview.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::Path;

/// File format for data files (used to bypass extension-based detection).
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Parquet columnar format
    Parquet,
    /// JSON array format
    Json,
    /// JSON Lines / NDJSON (one JSON object per line)
    Jsonl,
}

impl FileFormat {
    /// Detect file format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "parquet", "csv").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "parquet" => Some(Self::Parquet),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Jsonl),
            _ => None,
        }
    }
}

/// Command-line arguments for gridview
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "gridview",
    version,
    about = "Filter, sort and rearrange tabular data in the terminal",
    long_about = "Filter, sort and rearrange tabular data in the terminal.\n\n\
        Without a PATH the built-in demo dataset is shown. Sort, filter and column \
        order are remembered per screen between runs."
)]
pub struct Args {
    /// Data file to open (CSV, TSV, Parquet, JSON, NDJSON). Omit to show the demo dataset.
    #[arg(value_name = "PATH")]
    pub path: Option<std::path::PathBuf>,

    /// Specify the file format explicitly instead of detecting it from the extension
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Name under which view state (sort, filters, column order) is remembered.
    /// Defaults to the file stem, or "demo" for the built-in dataset.
    #[arg(long = "screen", value_name = "NAME")]
    pub screen: Option<String>,

    /// Ignore remembered view state for this run (it is overwritten on the next change)
    #[arg(long = "reset-view", action)]
    pub reset_view: bool,

    /// Delete remembered view state for the screen and exit
    #[arg(long = "clear-state", action)]
    pub clear_state: bool,

    /// First month (1-12) of the fiscal year used by fiscal date filters
    #[arg(long = "fiscal-year-start", value_name = "MONTH", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub fiscal_year_start: Option<u32>,

    /// Display row numbers on the left side of the table
    #[arg(long = "row-numbers", action)]
    pub row_numbers: bool,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write a log file to this path (RUST_LOG controls the level)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Overwrite an existing configuration file (with --generate-config)
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("data.parquet")),
            Some(FileFormat::Parquet)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("data.csv")),
            Some(FileFormat::Csv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("file.jsonl")),
            Some(FileFormat::Jsonl)
        );
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
        assert_eq!(
            FileFormat::from_path(Path::new("file.NDJSON")),
            Some(FileFormat::Jsonl)
        );
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::try_parse_from(["gridview"]).unwrap();
        assert!(args.path.is_none());
        assert!(!args.reset_view);
        assert!(args.fiscal_year_start.is_none());
    }

    #[test]
    fn test_fiscal_year_start_range() {
        assert!(Args::try_parse_from(["gridview", "--fiscal-year-start", "7"]).is_ok());
        assert!(Args::try_parse_from(["gridview", "--fiscal-year-start", "13"]).is_err());
        assert!(Args::try_parse_from(["gridview", "--fiscal-year-start", "0"]).is_err());
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["gridview", "--force"]).is_err());
        assert!(Args::try_parse_from(["gridview", "--generate-config", "--force"]).is_ok());
    }

    #[test]
    fn test_render_options_markdown() {
        let md = render_options_markdown();
        assert!(md.contains("--screen"));
        assert!(md.contains("[<PATH>]"));
    }
}
