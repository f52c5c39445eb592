mod cli;
mod config;
mod export;

use std::process::ExitCode;

use clap::Parser;
use exporter_core::SourceProfile;
use exporter_logging::{exporter_error, exporter_info, exporter_warn};
use log::LevelFilter;

use crate::cli::Cli;
use crate::config::{load_config, ExporterConfig};
use crate::export::{ExportJob, Outcome};

const EXIT_NOT_AVAILABLE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    exporter_logging::initialize(cli.log.into(), level, Some(&config.log_file));
    if let Err(err) = &loaded {
        exporter_warn!("{:#}; using default configuration", err);
    }

    if cli.print_config {
        return match config.to_ron() {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                exporter_error!("{:#}", err);
                ExitCode::FAILURE
            }
        };
    }
    if cli.list_sources {
        for profile in SourceProfile::builtins() {
            println!("{:<16} {}", profile.name, profile.url_template);
        }
        return ExitCode::SUCCESS;
    }

    let (Some(source), Some(chapter)) = (cli.source.clone(), cli.chapter.clone()) else {
        exporter_error!("--source and --chapter are required");
        return ExitCode::FAILURE;
    };
    let job = ExportJob {
        source,
        chapter,
        output_dir: cli
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir.clone()),
        keep_workdir: cli.keep_workdir,
    };

    run(&job, &config).await
}

async fn run(job: &ExportJob, config: &ExporterConfig) -> ExitCode {
    match export::run(job, config).await {
        Ok(Outcome::Exported(path)) => {
            exporter_info!("Book written to {}", path.display());
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Ok(Outcome::NotAvailable) => {
            exporter_warn!("Chapter {} is not available from {}", job.chapter, job.source);
            ExitCode::from(EXIT_NOT_AVAILABLE)
        }
        Err(err) => {
            exporter_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
