use crate::HarvestFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the body of the response for `url` under `file_name`.
    StoreImage { url: String, file_name: String },
    /// Every page is stored; sort, pick the cover and hand over.
    Finalize,
    /// The harvest failed; close the session and keep the working directory.
    Abort(HarvestFailure),
}
