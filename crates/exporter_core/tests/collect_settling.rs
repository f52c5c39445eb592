use std::time::Duration;

use exporter_core::{
    update, CollectState, Discovery, Effect, HarvestFailure, Msg, Phase, SourceProfile,
};
use regex::Regex;
use pretty_assertions::assert_eq;

fn page_url(n: u32) -> String {
    format!("https://cdn.read-onepiece.net/wp-content/uploads/one-piece-1070-{n}.jpg")
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn started() -> CollectState {
    let state = CollectState::new(&SourceProfile::read_onepiece(), "1070");
    let (state, _) = update(state, Msg::NavigationFinished { at: secs(0) });
    state
}

fn arrive(state: CollectState, n: u32, at: u64) -> (CollectState, Vec<Effect>) {
    update(
        state,
        Msg::ImageResponse {
            url: page_url(n),
            at: secs(at),
        },
    )
}

#[test]
fn quiet_window_after_minimum_completes() {
    let mut state = started();
    for (n, at) in [(1, 0), (2, 0), (3, 1), (4, 1), (5, 2)] {
        let (next, effects) = arrive(state, n, at);
        assert_eq!(
            effects,
            vec![Effect::StoreImage {
                url: page_url(n),
                file_name: format!("one-piece-1070-0{n}.jpg"),
            }]
        );
        state = next;
    }
    assert_eq!(state.next_wakeup(), Some(secs(10)));

    let (state, effects) = update(state, Msg::Tick { now: secs(9) });
    assert!(effects.is_empty());
    assert_eq!(state.phase(), &Phase::Collecting);

    let (state, effects) = update(state, Msg::Tick { now: secs(10) });
    assert_eq!(effects, vec![Effect::Finalize]);
    assert_eq!(state.phase(), &Phase::Complete);

    let (state, effects) = arrive(state, 6, 11);
    assert!(effects.is_empty());
    assert_eq!(state.view().stored, 5);
}

#[test]
fn new_arrival_restarts_the_quiet_window() {
    let mut state = started();
    for n in 1..=5 {
        state = arrive(state, n, 1).0;
    }
    assert_eq!(state.next_wakeup(), Some(secs(9)));
    let (state, _) = arrive(state, 6, 7);
    assert_eq!(state.next_wakeup(), Some(secs(15)));
}

#[test]
fn earlier_stamp_delivered_late_keeps_latest_arrival() {
    let mut state = started();
    for n in 1..=5 {
        state = arrive(state, n, 6).0;
    }
    let (state, _) = arrive(state, 6, 2);
    assert_eq!(state.next_wakeup(), Some(secs(14)));
}

#[test]
fn single_digit_markers_sort_before_two_digit_ones() {
    let mut state = started();
    for n in [10, 2, 1] {
        state = arrive(state, n, 0).0;
    }
    let files: Vec<&str> = state.stored_pages().map(|(file, _)| file).collect();
    assert_eq!(
        files,
        vec![
            "one-piece-1070-01.jpg",
            "one-piece-1070-02.jpg",
            "one-piece-1070-10.jpg",
        ]
    );
}

#[test]
fn unrelated_images_are_ignored() {
    let state = started();
    let (state, effects) = update(
        state,
        Msg::ImageResponse {
            url: "https://cdn.read-onepiece.net/logo.png".to_string(),
            at: secs(0),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().ignored, 1);
    assert_eq!(state.next_wakeup(), Some(secs(120)));
}

#[test]
fn deadline_below_minimum_fails() {
    let mut state = started();
    for n in 1..=3 {
        state = arrive(state, n, 1).0;
    }
    let (state, effects) = update(state, Msg::Tick { now: secs(120) });
    let failure = HarvestFailure::TooFewPages {
        found: 3,
        minimum: 5,
    };
    assert_eq!(effects, vec![Effect::Abort(failure.clone())]);
    assert_eq!(state.phase(), &Phase::Failed(failure));
}

#[test]
fn deadline_without_pages_reports_nothing_found() {
    let (_, effects) = update(started(), Msg::Tick { now: secs(120) });
    assert_eq!(
        effects,
        vec![Effect::Abort(HarvestFailure::NoPagesFound { matched: 0 })]
    );
}

#[test]
fn out_of_range_marker_fails_the_harvest() {
    let (state, effects) = arrive(started(), 100, 0);
    assert!(matches!(
        effects.as_slice(),
        [Effect::Abort(HarvestFailure::UnnamedPage { .. })]
    ));
    assert!(state.phase().is_terminal());
}

#[test]
fn late_arrivals_after_quiet_window_are_not_collected() {
    let mut profile = SourceProfile::read_onepiece();
    profile.discovery = Discovery::Settling {
        url_pattern: Regex::new(r"one-piece-.{4}-\d+\.jpg").unwrap(),
        min_pages: 3,
        quiet_window: secs(8),
        deadline: secs(120),
    };
    let state = CollectState::new(&profile, "1070");
    let (mut state, _) = update(state, Msg::NavigationFinished { at: secs(0) });
    for (n, at) in [(1, 0), (2, 1), (3, 2)] {
        state = arrive(state, n, at).0;
    }
    assert_eq!(state.next_wakeup(), Some(secs(10)));

    let (state, effects) = update(state, Msg::Tick { now: secs(10) });
    assert_eq!(effects, vec![Effect::Finalize]);

    let (state, effects) = arrive(state, 4, 11);
    assert!(effects.is_empty());
    let (state, effects) = arrive(state, 5, 12);
    assert!(effects.is_empty());
    assert_eq!(state.view().stored, 3);
}
