//! Exporter core: pure chapter collection state machine, page naming,
//! layout classification and page planning. No IO lives here.
mod book;
mod effect;
mod failure;
mod layout;
pub mod markup;
mod msg;
mod naming;
mod navigation;
mod pages;
mod profile;
mod state;
mod update;
mod view_model;

pub use book::BookMetadata;
pub use effect::Effect;
pub use failure::HarvestFailure;
pub use layout::{classify, PageImageInfo, PageLayout};
pub use msg::Msg;
pub use naming::{page_marker, padded_token, NamingError, NamingPolicy, PageKey, MAX_PAGE_NUMBER};
pub use navigation::{guard_request, same_document, InterceptDecision};
pub use pages::{expected_page_count, page_specs, DerivedAssets, LayoutDecision, PageSpec, SpreadOrder};
pub use profile::{ChapterRequest, DeviceProfile, Discovery, SourceProfile};
pub use state::{CollectState, Phase};
pub use update::update;
pub use view_model::CollectView;
