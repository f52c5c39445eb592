use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use exporter_logging::LogDestination;

/// Harvest a manga chapter and package it as an EPUB for e-readers.
#[derive(Debug, Parser)]
#[command(name = "manga-exporter", version, about)]
pub struct Cli {
    /// Source profile, e.g. tcb-one-piece, read-onepiece, chainsaw-man.
    #[arg(long, required_unless_present_any = ["print_config", "list_sources"])]
    pub source: Option<String>,

    /// Chapter identifier as used in the source URL, e.g. 1070.
    #[arg(long, required_unless_present_any = ["print_config", "list_sources"])]
    pub chapter: Option<String>,

    /// RON configuration file.
    #[arg(long, default_value = "manga-exporter.ron")]
    pub config: PathBuf,

    /// Directory the book is written to; overrides the configuration.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Debug level logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Leave the working directory with the harvested images in place.
    #[arg(long)]
    pub keep_workdir: bool,

    /// Print the effective configuration as RON and exit.
    #[arg(long)]
    pub print_config: bool,

    /// List the built-in source profiles and exit.
    #[arg(long)]
    pub list_sources: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_run_arguments() {
        let cli = Cli::try_parse_from([
            "manga-exporter",
            "--source",
            "tcb-one-piece",
            "--chapter",
            "1070",
            "--log",
            "both",
            "--keep-workdir",
        ])
        .unwrap();
        assert_eq!(cli.source.as_deref(), Some("tcb-one-piece"));
        assert_eq!(cli.chapter.as_deref(), Some("1070"));
        assert_eq!(cli.log, LogTarget::Both);
        assert!(cli.keep_workdir);
        assert_eq!(cli.config, PathBuf::from("manga-exporter.ron"));
    }

    #[test]
    fn chapter_is_required_for_a_run() {
        assert!(Cli::try_parse_from(["manga-exporter", "--source", "chainsaw-man"]).is_err());
        assert!(Cli::try_parse_from(["manga-exporter", "--print-config"]).is_ok());
    }
}
