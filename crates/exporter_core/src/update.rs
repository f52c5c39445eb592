use std::time::Duration;

use crate::{
    CollectState, Discovery, Effect, HarvestFailure, Msg, NamingError, PageKey, Phase,
};

/// Pure update function: applies a message to the collection state and
/// returns the effects the driver has to execute, in order.
pub fn update(mut state: CollectState, msg: Msg) -> (CollectState, Vec<Effect>) {
    if state.phase.is_terminal() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::NavigationTimedOut => {
            if state.phase == Phase::Navigating {
                fail(&mut state, HarvestFailure::NavigationTimeout)
            } else {
                Vec::new()
            }
        }
        Msg::NavigationFinished { .. } => {
            if state.phase == Phase::Navigating {
                state.phase = Phase::Collecting;
            }
            Vec::new()
        }
        Msg::ExpectedPages(urls) => apply_expected(&mut state, urls),
        Msg::ImageResponse { url, at } => apply_image(&mut state, url, at),
        Msg::Tick { now } => apply_tick(&mut state, now),
    };

    (state, effects)
}

fn apply_expected(state: &mut CollectState, urls: Vec<String>) -> Vec<Effect> {
    if !matches!(state.discovery, Discovery::KnownCount { .. }) || state.expected.is_some() {
        return Vec::new();
    }

    let mut expected: Vec<String> = Vec::with_capacity(urls.len());
    for url in urls {
        if !expected.contains(&url) {
            expected.push(url);
        }
    }
    if expected.is_empty() {
        return fail(state, HarvestFailure::NoPagesFound { matched: 0 });
    }
    state.expected = Some(expected);

    let mut effects = Vec::new();
    for url in std::mem::take(&mut state.pending) {
        match store_expected(state, &url) {
            Ok(Some(effect)) => effects.push(effect),
            Ok(None) => state.ignored += 1,
            Err(err) => return fail_naming(state, url, err),
        }
    }
    effects.extend(check_known_count_complete(state));
    effects
}

fn apply_image(state: &mut CollectState, url: String, at: Duration) -> Vec<Effect> {
    if !state.seen.insert(url.clone()) {
        return Vec::new();
    }

    match &state.discovery {
        Discovery::KnownCount { .. } => {
            if state.expected.is_none() {
                state.pending.push(url);
                return Vec::new();
            }
            match store_expected(state, &url) {
                Ok(Some(effect)) => {
                    let mut effects = vec![effect];
                    effects.extend(check_known_count_complete(state));
                    effects
                }
                Ok(None) => {
                    state.ignored += 1;
                    Vec::new()
                }
                Err(err) => fail_naming(state, url, err),
            }
        }
        Discovery::Settling { url_pattern, .. } => {
            if !url_pattern.is_match(&url) {
                state.ignored += 1;
                return Vec::new();
            }
            let file_name = match state
                .naming
                .file_name(&state.chapter_id, PageKey::SourceUrl(&url))
            {
                Ok(name) => name,
                Err(err) => return fail_naming(state, url, err),
            };
            if state.stored.contains_key(&file_name) {
                // Same page number under a different URL (resized variant).
                state.ignored += 1;
                return Vec::new();
            }
            // Arrivals may be delivered out of order.
            state.last_arrival = Some(state.last_arrival.map_or(at, |last| last.max(at)));
            state.stored.insert(file_name.clone(), url.clone());
            vec![Effect::StoreImage { url, file_name }]
        }
    }
}

fn apply_tick(state: &mut CollectState, now: Duration) -> Vec<Effect> {
    match &state.discovery {
        Discovery::KnownCount { deadline, .. } => {
            if now < *deadline {
                return Vec::new();
            }
            let failure = match &state.expected {
                Some(expected) => HarvestFailure::UnmatchedResponse {
                    missing: expected
                        .iter()
                        .filter(|url| !state.stored.values().any(|stored| stored == *url))
                        .cloned()
                        .collect(),
                },
                None => HarvestFailure::NoPagesFound { matched: 0 },
            };
            fail(state, failure)
        }
        Discovery::Settling {
            min_pages,
            quiet_window,
            deadline,
            ..
        } => {
            let found = state.stored.len();
            let enough = found >= *min_pages;
            let quiet = state
                .last_arrival
                .is_some_and(|last| now >= last + *quiet_window);
            if state.phase == Phase::Collecting && enough && quiet {
                return complete(state);
            }
            if now < *deadline {
                return Vec::new();
            }
            if enough {
                complete(state)
            } else if found == 0 {
                fail(state, HarvestFailure::NoPagesFound { matched: 0 })
            } else {
                let minimum = *min_pages;
                fail(state, HarvestFailure::TooFewPages { found, minimum })
            }
        }
    }
}

/// Names and records an expected URL. `Ok(None)` when the URL is not part of
/// the chapter.
fn store_expected(state: &mut CollectState, url: &str) -> Result<Option<Effect>, NamingError> {
    let Some(index) = state
        .expected
        .as_ref()
        .and_then(|expected| expected.iter().position(|candidate| candidate == url))
    else {
        return Ok(None);
    };
    let file_name = state
        .naming
        .file_name(&state.chapter_id, PageKey::DomIndex(index))?;
    state.stored.insert(file_name.clone(), url.to_string());
    Ok(Some(Effect::StoreImage {
        url: url.to_string(),
        file_name,
    }))
}

fn check_known_count_complete(state: &mut CollectState) -> Vec<Effect> {
    let expected = state.expected.as_ref().map_or(usize::MAX, Vec::len);
    if state.stored.len() == expected {
        complete(state)
    } else {
        Vec::new()
    }
}

fn complete(state: &mut CollectState) -> Vec<Effect> {
    state.phase = Phase::Complete;
    vec![Effect::Finalize]
}

fn fail(state: &mut CollectState, failure: HarvestFailure) -> Vec<Effect> {
    state.phase = Phase::Failed(failure.clone());
    vec![Effect::Abort(failure)]
}

fn fail_naming(state: &mut CollectState, url: String, err: NamingError) -> Vec<Effect> {
    fail(
        state,
        HarvestFailure::UnnamedPage {
            url,
            reason: err.to_string(),
        },
    )
}
