use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Context};
use chrono::Utc;
use exporter_core::{BookMetadata, SourceProfile};
use exporter_engine::{
    ChapterAssembler, ChapterHarvester, FetchSettings, HarvestResult, ReqwestImageFetcher,
};
use exporter_logging::{exporter_info, exporter_warn};

use crate::config::ExporterConfig;

/// A chapter run request after argument and config resolution.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub source: String,
    pub chapter: String,
    pub output_dir: PathBuf,
    pub keep_workdir: bool,
}

#[derive(Debug)]
pub enum Outcome {
    Exported(PathBuf),
    /// The source has no (complete) chapter under this id.
    NotAvailable,
}

pub fn resolve_profile(name: &str) -> anyhow::Result<SourceProfile> {
    SourceProfile::builtin(name).ok_or_else(|| {
        let known: Vec<String> = SourceProfile::builtins()
            .into_iter()
            .map(|profile| profile.name)
            .collect();
        anyhow!("Unknown source {name:?}; known sources: {}", known.join(", "))
    })
}

fn validate_chapter(chapter: &str) -> anyhow::Result<()> {
    ensure!(!chapter.is_empty(), "Chapter id must not be empty");
    ensure!(
        chapter
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-'),
        "Chapter id {chapter:?} may only contain letters, digits, '.' and '-'"
    );
    Ok(())
}

/// Harvest, assemble, clean up. The working directory is released on every
/// path after assembly unless the job keeps it.
pub async fn run(job: &ExportJob, config: &ExporterConfig) -> anyhow::Result<Outcome> {
    validate_chapter(&job.chapter)?;
    let profile = resolve_profile(&job.source)?;
    let request = profile.chapter_request(&job.chapter);

    let mut harvester = ChapterHarvester::new(profile.clone(), config.harvest_settings());
    if config.fallback_download {
        let settings = FetchSettings {
            referer: Some(request.source_url.clone()),
            ..FetchSettings::default()
        };
        harvester = harvester.with_fetcher(Arc::new(ReqwestImageFetcher::new(settings)));
    }

    exporter_info!("Exporting {} chapter {}", profile.series, job.chapter);
    let Some(harvested) = harvester.harvest(&request).await else {
        return Ok(Outcome::NotAvailable);
    };
    let HarvestResult {
        working_dir,
        ordered_image_paths,
        cover_path,
    } = harvested;

    let metadata = BookMetadata::for_chapter(&profile, &job.chapter, &config.language, cover_path);
    let assembler = ChapterAssembler::new(config.device(), config.spread_order())
        .with_modified_utc(Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    let file_name = format!("{}-{}.epub", profile.slug, job.chapter);
    let output_dir = job.output_dir.clone();
    let work_path = working_dir.path().to_path_buf();

    let assembled = tokio::task::spawn_blocking(move || {
        assembler.assemble(
            &ordered_image_paths,
            &work_path,
            &metadata,
            &output_dir,
            &file_name,
        )
    })
    .await;

    if job.keep_workdir {
        exporter_info!("Working directory kept at {}", working_dir.path().display());
    } else if let Err(err) = working_dir.release() {
        exporter_warn!("Could not remove working directory: {}", err);
    }

    let book = assembled
        .context("Assembly task failed")?
        .context("Failed to assemble the chapter")?;
    Ok(Outcome::Exported(book))
}
