use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::view_model::CollectView;
use crate::{Discovery, HarvestFailure, NamingPolicy, SourceProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Navigating,
    Collecting,
    Complete,
    Failed(HarvestFailure),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Failed(_))
    }
}

/// Owned collection state of one harvest. Only `update` mutates it.
#[derive(Debug, Clone)]
pub struct CollectState {
    pub(crate) chapter_id: String,
    pub(crate) naming: NamingPolicy,
    pub(crate) discovery: Discovery,
    pub(crate) phase: Phase,
    /// Known-count only: expected URLs in DOM order, once read.
    pub(crate) expected: Option<Vec<String>>,
    /// Known-count only: URLs seen before the expected list was known.
    pub(crate) pending: Vec<String>,
    /// File name -> source URL.
    pub(crate) stored: BTreeMap<String, String>,
    pub(crate) seen: HashSet<String>,
    pub(crate) ignored: usize,
    pub(crate) last_arrival: Option<Duration>,
}

impl CollectState {
    pub fn new(profile: &SourceProfile, chapter_id: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            naming: profile.naming(),
            discovery: profile.discovery.clone(),
            phase: Phase::Navigating,
            expected: None,
            pending: Vec::new(),
            stored: BTreeMap::new(),
            seen: HashSet::new(),
            ignored: 0,
            last_arrival: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// Stored pages as `(file_name, source_url)`, sorted by file name.
    pub fn stored_pages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stored
            .iter()
            .map(|(file, url)| (file.as_str(), url.as_str()))
    }

    pub fn view(&self) -> CollectView {
        CollectView {
            phase: self.phase.clone(),
            expected: self.expected.as_ref().map(Vec::len),
            stored: self.stored.len(),
            pending: self.pending.len(),
            ignored: self.ignored,
        }
    }

    /// When the driver should deliver the next `Msg::Tick`, as an offset from
    /// the start of the harvest. `None` once the harvest is over.
    pub fn next_wakeup(&self) -> Option<Duration> {
        if self.phase.is_terminal() {
            return None;
        }
        match &self.discovery {
            Discovery::KnownCount { deadline, .. } => Some(*deadline),
            Discovery::Settling {
                min_pages,
                quiet_window,
                deadline,
                ..
            } => {
                let quiet_deadline = match (self.phase == Phase::Collecting, self.last_arrival) {
                    (true, Some(last)) if self.stored.len() >= *min_pages => {
                        Some(last + *quiet_window)
                    }
                    _ => None,
                };
                Some(quiet_deadline.map_or(*deadline, |quiet| quiet.min(*deadline)))
            }
        }
    }
}
