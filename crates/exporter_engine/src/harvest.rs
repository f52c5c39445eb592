//! Drives one browser session through the chapter collection state machine.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use exporter_core::{
    update, ChapterRequest, CollectState, Discovery, HarvestFailure, Msg, Phase, SourceProfile,
};
use exporter_logging::{exporter_debug, exporter_error, exporter_info, exporter_warn};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, timeout, Instant};

use crate::browser::{BrowserSettings, ChromiumSession};
use crate::dom::image_sources;
use crate::effects::EffectRunner;
use crate::fetch::ImageFetcher;
use crate::persist::AtomicFileWriter;
use crate::session::{BrowserSession, ImageResponse};
use crate::workdir::WorkingDirectory;
use crate::{HarvestError, HarvestResult};

pub const COVER_FILE: &str = "cover.jpg";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Bound on loading the chapter page, independent of the discovery deadline.
    pub navigation_timeout: Duration,
    pub browser: BrowserSettings,
    /// Parent of the working directory; the system temp dir when unset.
    pub work_root: Option<PathBuf>,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            browser: BrowserSettings::default(),
            work_root: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    chapter_id: &'a str,
    source_url: &'a str,
    cover: &'a str,
    pages: Vec<ManifestPage<'a>>,
}

#[derive(Debug, Serialize)]
struct ManifestPage<'a> {
    file: &'a str,
    url: &'a str,
}

pub struct ChapterHarvester {
    profile: SourceProfile,
    settings: HarvestSettings,
    fetcher: Option<Arc<dyn ImageFetcher>>,
}

impl ChapterHarvester {
    pub fn new(profile: SourceProfile, settings: HarvestSettings) -> Self {
        Self {
            profile,
            settings,
            fetcher: None,
        }
    }

    /// Downloads images again when the browser cannot hand out their body.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Harvests the chapter in a fresh Chromium session. `None` when the
    /// chapter is not (yet) available or the harvest failed; the reason is
    /// logged and the working directory, if any, is kept.
    pub async fn harvest(&self, request: &ChapterRequest) -> Option<HarvestResult> {
        let working_dir = match self.create_working_dir(request) {
            Ok(dir) => dir,
            Err(err) => {
                exporter_error!("Cannot create working directory: {}", err);
                return None;
            }
        };
        let (session, events) =
            match ChromiumSession::launch(&self.settings.browser, &request.source_url).await {
                Ok(opened) => opened,
                Err(err) => {
                    exporter_error!("Browser session failed to start: {}", err);
                    exporter_warn!("Working directory kept at {}", working_dir.path().display());
                    return None;
                }
            };
        self.harvest_with(&session, events, request, working_dir).await
    }

    pub async fn harvest_with(
        &self,
        session: &dyn BrowserSession,
        events: UnboundedReceiver<ImageResponse>,
        request: &ChapterRequest,
        working_dir: WorkingDirectory,
    ) -> Option<HarvestResult> {
        let kept = working_dir.path().to_path_buf();
        match self
            .try_harvest_with(session, events, request, working_dir)
            .await
        {
            Ok(result) => Some(result),
            Err(err) => {
                exporter_error!(
                    "Chapter {} from {} not harvested: {}",
                    request.chapter_id,
                    self.profile.name,
                    err
                );
                exporter_warn!("Working directory kept at {}", kept.display());
                None
            }
        }
    }

    /// Like [`harvest_with`](Self::harvest_with) but reports why it failed.
    /// The session is closed on every path.
    pub async fn try_harvest_with(
        &self,
        session: &dyn BrowserSession,
        mut events: UnboundedReceiver<ImageResponse>,
        request: &ChapterRequest,
        working_dir: WorkingDirectory,
    ) -> Result<HarvestResult, HarvestError> {
        let collected = self
            .collect(session, &mut events, request, &working_dir)
            .await;
        if let Err(err) = session.close().await {
            exporter_warn!("Browser session did not close cleanly: {}", err);
        }
        let state = collected?;
        finalize(&state, request, working_dir)
    }

    fn create_working_dir(&self, request: &ChapterRequest) -> std::io::Result<WorkingDirectory> {
        let prefix = format!("{}-{}-", self.profile.slug, request.chapter_id);
        match &self.settings.work_root {
            Some(root) => WorkingDirectory::create_in(root, &prefix),
            None => WorkingDirectory::create(&self.profile.slug, &request.chapter_id),
        }
    }

    async fn collect(
        &self,
        session: &dyn BrowserSession,
        events: &mut UnboundedReceiver<ImageResponse>,
        request: &ChapterRequest,
        working_dir: &WorkingDirectory,
    ) -> Result<CollectState, HarvestError> {
        let started = Instant::now();
        let runner = EffectRunner::new(
            session,
            self.fetcher.clone(),
            AtomicFileWriter::new(working_dir.path().to_path_buf())?,
        );
        let mut state = CollectState::new(&self.profile, request.chapter_id.clone());
        let mut responses: HashMap<String, ImageResponse> = HashMap::new();

        exporter_info!("Navigating to {}", request.source_url);
        let navigation = timeout(
            self.settings.navigation_timeout,
            session.navigate(&request.source_url),
        );
        tokio::pin!(navigation);
        let mut navigating = true;

        loop {
            let wakeup = state.next_wakeup().map(|offset| started + offset);
            // Queued responses go first so an overdue tick never skips them.
            let msg = tokio::select! {
                biased;
                Some(response) = events.recv() => {
                    let url = response.url.clone();
                    let at = response.received.saturating_duration_since(started);
                    responses.entry(url.clone()).or_insert(response);
                    Msg::ImageResponse { url, at }
                }
                result = &mut navigation, if navigating => {
                    navigating = false;
                    match result {
                        Ok(Ok(())) => Msg::NavigationFinished { at: started.elapsed() },
                        Ok(Err(err)) => return Err(err.into()),
                        Err(_) => Msg::NavigationTimedOut,
                    }
                }
                _ = sleep_or_pending(wakeup) => Msg::Tick { now: started.elapsed() },
            };

            let loaded = matches!(msg, Msg::NavigationFinished { .. });
            let (next, mut effects) = update(state, msg);
            state = next;

            let selector = match state.discovery() {
                Discovery::KnownCount { dom_selector, .. } if loaded => Some(dom_selector.clone()),
                _ => None,
            };
            if let Some(selector) = selector {
                let html = session.page_html().await?;
                let urls = image_sources(&html, &request.source_url, &selector)?;
                exporter_info!("Chapter page lists {} images", urls.len());
                let (next, more) = update(state, Msg::ExpectedPages(urls));
                state = next;
                effects.extend(more);
            }

            runner.run(effects, &responses).await?;

            match state.phase() {
                Phase::Complete => {
                    exporter_debug!("Collection finished: {:?}", state.view());
                    return Ok(state);
                }
                Phase::Failed(failure) => {
                    exporter_debug!("Collection failed: {:?}", state.view());
                    return Err(failure.clone().into());
                }
                Phase::Navigating | Phase::Collecting => {}
            }
        }
    }
}

async fn sleep_or_pending(wakeup: Option<Instant>) {
    match wakeup {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn finalize(
    state: &CollectState,
    request: &ChapterRequest,
    working_dir: WorkingDirectory,
) -> Result<HarvestResult, HarvestError> {
    let pages: Vec<(&str, &str)> = state.stored_pages().collect();
    let Some((first, _)) = pages.first() else {
        return Err(HarvestFailure::NoPagesFound { matched: 0 }.into());
    };

    let cover_path = working_dir.join(COVER_FILE);
    fs::copy(working_dir.join(first), &cover_path)?;

    let manifest = Manifest {
        chapter_id: &request.chapter_id,
        source_url: &request.source_url,
        cover: COVER_FILE,
        pages: pages
            .iter()
            .map(|&(file, url)| ManifestPage { file, url })
            .collect(),
    };
    let json = serde_json::to_vec_pretty(&manifest)?;
    AtomicFileWriter::new(working_dir.path().to_path_buf())?.write(MANIFEST_FILE, &json)?;

    let ordered_image_paths = pages
        .iter()
        .map(|(file, _)| working_dir.join(file))
        .collect();
    exporter_info!(
        "Harvested {} pages of chapter {} into {}",
        pages.len(),
        request.chapter_id,
        working_dir.path().display()
    );
    Ok(HarvestResult {
        working_dir,
        ordered_image_paths,
        cover_path,
    })
}
