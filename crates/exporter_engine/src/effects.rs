use std::collections::HashMap;
use std::sync::Arc;

use exporter_core::Effect;
use exporter_logging::{exporter_debug, exporter_info, exporter_warn};

use crate::fetch::ImageFetcher;
use crate::persist::AtomicFileWriter;
use crate::session::{BrowserSession, ImageResponse};
use crate::HarvestError;

/// Executes the effects of the collection state machine against the browser
/// session and the working directory.
pub(crate) struct EffectRunner<'a> {
    session: &'a dyn BrowserSession,
    fetcher: Option<Arc<dyn ImageFetcher>>,
    writer: AtomicFileWriter,
}

impl<'a> EffectRunner<'a> {
    pub(crate) fn new(
        session: &'a dyn BrowserSession,
        fetcher: Option<Arc<dyn ImageFetcher>>,
        writer: AtomicFileWriter,
    ) -> Self {
        Self {
            session,
            fetcher,
            writer,
        }
    }

    pub(crate) async fn run(
        &self,
        effects: Vec<Effect>,
        responses: &HashMap<String, ImageResponse>,
    ) -> Result<(), HarvestError> {
        for effect in effects {
            match effect {
                Effect::StoreImage { url, file_name } => {
                    let bytes = self.body(&url, responses.get(&url)).await?;
                    self.writer.write(&file_name, &bytes)?;
                    exporter_debug!("Stored {} ({} bytes) from {}", file_name, bytes.len(), url);
                }
                Effect::Finalize => {
                    exporter_info!("All pages collected");
                }
                Effect::Abort(failure) => {
                    exporter_warn!("Collection aborted: {}", failure);
                }
            }
        }
        Ok(())
    }

    async fn body(
        &self,
        url: &str,
        response: Option<&ImageResponse>,
    ) -> Result<Vec<u8>, HarvestError> {
        let session_error = match response {
            Some(response) => match self.session.response_body(response).await {
                Ok(bytes) if !bytes.is_empty() => return Ok(bytes),
                Ok(_) => "empty response body".to_string(),
                Err(err) => err.to_string(),
            },
            None => "response not observed".to_string(),
        };

        let Some(fetcher) = &self.fetcher else {
            return Err(HarvestError::MissingBody {
                url: url.to_string(),
                message: session_error,
            });
        };
        exporter_warn!("Re-downloading {} ({})", url, session_error);
        let output = fetcher
            .fetch(url)
            .await
            .map_err(|err| HarvestError::MissingBody {
                url: url.to_string(),
                message: format!("{session_error}; fallback download failed: {err}"),
            })?;
        let meta = &output.metadata;
        exporter_debug!(
            "Downloaded {} bytes ({}) from {} after {} redirects",
            meta.byte_len,
            meta.content_type.as_deref().unwrap_or("unknown type"),
            meta.final_url,
            meta.redirect_count
        );
        Ok(output.bytes)
    }
}
