//! Chromium-backed [`BrowserSession`] over the DevTools protocol.

use std::collections::HashMap;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
    FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, ErrorReason, EventLoadingFinished,
    EventResponseReceived, GetResponseBodyParams, RequestId, ResourceType,
};
use chromiumoxide::page::Page;
use exporter_core::{guard_request, InterceptDecision};
use exporter_logging::{exporter_debug, exporter_info, exporter_warn};
use futures_util::StreamExt;
use tempfile::TempDir;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::session::{BrowserSession, ImageResponse, ResponseToken};
use crate::SessionError;

const CHROME_ENV: &str = "MANGA_EXPORTER_CHROME";

#[derive(Debug, Clone, Default)]
pub struct BrowserSettings {
    /// Explicit browser binary; located automatically when unset.
    pub chrome_path: Option<PathBuf>,
    /// Run with a visible window.
    pub headful: bool,
}

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CHROME_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

struct Live {
    browser: Browser,
    tasks: Vec<JoinHandle<()>>,
    _profile_dir: TempDir,
}

pub struct ChromiumSession {
    page: Page,
    live: Mutex<Option<Live>>,
}

impl ChromiumSession {
    /// Launches a fresh browser with its own profile, opens a blank page and
    /// installs the navigation guard for `target_url` and the image listener.
    pub async fn launch(
        settings: &BrowserSettings,
        target_url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ImageResponse>), SessionError> {
        let chrome_path = match &settings.chrome_path {
            Some(path) if path.exists() => path.clone(),
            Some(_) => return Err(SessionError::ChromiumNotFound),
            None => find_chromium().ok_or(SessionError::ChromiumNotFound)?,
        };

        let profile_dir = TempDir::new().map_err(|err| SessionError::Launch(err.to_string()))?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(profile_dir.path())
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        builder = if settings.headful {
            builder.with_head()
        } else {
            builder.arg("--headless=new")
        };
        let config = builder.build().map_err(SessionError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| SessionError::Launch(err.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match open_page(&browser).await {
            Ok(page) => page,
            Err(err) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(err);
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let mut tasks = vec![handler_task];
        match install_listeners(&page, target_url, tx).await {
            Ok(listeners) => tasks.extend(listeners),
            Err(err) => {
                let _ = browser.close().await;
                for task in tasks {
                    task.abort();
                }
                return Err(err);
            }
        }
        exporter_info!("Browser session ready for {}", target_url);

        Ok((
            Self {
                page,
                live: Mutex::new(Some(Live {
                    browser,
                    tasks,
                    _profile_dir: profile_dir,
                })),
            },
            rx,
        ))
    }
}

async fn open_page(browser: &Browser) -> Result<Page, SessionError> {
    browser.new_page("about:blank").await.map_err(cdp)
}

/// Both listeners are registered before the first navigation.
async fn install_listeners(
    page: &Page,
    target_url: &str,
    tx: mpsc::UnboundedSender<ImageResponse>,
) -> Result<Vec<JoinHandle<()>>, SessionError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(cdp)?;
    let mut responses = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(cdp)?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(cdp)?;

    page.execute(NetworkEnableParams::default())
        .await
        .map_err(cdp)?;
    let documents = RequestPattern::builder()
        .url_pattern("*")
        .resource_type(ResourceType::Document)
        .request_stage(RequestStage::Request)
        .build();
    page.execute(FetchEnableParams::builder().pattern(documents).build())
        .await
        .map_err(cdp)?;

    let guard_page = page.clone();
    let target = target_url.to_string();
    let guard = tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let is_document = event.resource_type == ResourceType::Document;
            let decision = guard_request(&target, &event.request.url, is_document);
            let outcome = match decision {
                InterceptDecision::Continue => guard_page
                    .execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ()),
                InterceptDecision::Abort => {
                    exporter_info!("Blocked navigation to {}", event.request.url);
                    guard_page
                        .execute(FailRequestParams::new(
                            event.request_id.clone(),
                            ErrorReason::BlockedByClient,
                        ))
                        .await
                        .map(|_| ())
                }
            };
            if let Err(err) = outcome {
                exporter_warn!("Request guard could not answer {}: {}", event.request.url, err);
            }
        }
    });

    let images = tokio::spawn(async move {
        let mut in_flight: HashMap<String, String> = HashMap::new();
        loop {
            tokio::select! {
                Some(event) = responses.next() => {
                    if event.r#type == ResourceType::Image {
                        in_flight.insert(event.request_id.inner().clone(), event.response.url.clone());
                    }
                }
                Some(event) = finished.next() => {
                    let id = event.request_id.inner().clone();
                    if let Some(url) = in_flight.remove(&id) {
                        exporter_debug!("Image loaded: {}", url);
                        let response = ImageResponse::new(url, ResponseToken(id));
                        if tx.send(response).is_err() {
                            break;
                        }
                    }
                }
                else => break,
            }
        }
    });

    Ok(vec![guard, images])
}

fn cdp(err: impl std::fmt::Display) -> SessionError {
    SessionError::Cdp(err.to_string())
}

#[async_trait::async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.page.goto(url).await.map_err(cdp)?;
        Ok(())
    }

    async fn page_html(&self) -> Result<String, SessionError> {
        self.page.content().await.map_err(cdp)
    }

    async fn response_body(&self, response: &ImageResponse) -> Result<Vec<u8>, SessionError> {
        let reply = self
            .page
            .execute(GetResponseBodyParams::new(RequestId::new(
                response.token.0.clone(),
            )))
            .await
            .map_err(cdp)?;
        let body = &reply.result;
        if body.base64_encoded {
            STANDARD.decode(body.body.as_bytes()).map_err(cdp)
        } else {
            Ok(body.body.clone().into_bytes())
        }
    }

    async fn close(&self) -> Result<(), SessionError> {
        let Some(mut live) = self.live.lock().await.take() else {
            return Ok(());
        };
        let closed = live.browser.close().await.map(|_| ()).map_err(cdp);
        if let Err(err) = live.browser.wait().await {
            exporter_warn!("Browser process did not exit cleanly: {}", err);
        }
        for task in live.tasks.drain(..) {
            task.abort();
        }
        exporter_debug!("Browser session closed");
        closed
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.live.try_lock() {
            if let Some(live) = guard.as_mut() {
                for task in live.tasks.drain(..) {
                    task.abort();
                }
            }
        }
    }
}
