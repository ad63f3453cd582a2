//! Link-time handler table.
//!
//! Every `#[handler]` impl block contributes one [`LinkedHandler`] entry to
//! [`HANDLER_TABLE`]. The registry builder reads the table during
//! `fetch_candidates` and keeps entries whose crate is in scope.
//!
//! Entry order is linker-defined. Applications that need a deterministic
//! subscriber order should pass explicit candidates instead.

use linkme::distributed_slice;

use crate::candidate::CandidateType;

/// One entry contributed by the `#[handler]` attribute.
#[derive(Debug, Clone, Copy)]
pub struct LinkedHandler {
    /// `module_path!()` at the impl site; its first segment is the crate name.
    pub module_path: &'static str,
    /// Name of the concrete handler type, as written at the impl site.
    pub handler: &'static str,
    /// Builds the candidate declaring the one contract of this impl block.
    pub candidate: fn() -> CandidateType,
}

impl LinkedHandler {
    /// Crate the entry was declared in. Module paths spell crate names with `_`.
    pub fn crate_name(&self) -> &'static str {
        self.module_path
            .split("::")
            .next()
            .unwrap_or(self.module_path)
    }
}

/// Registry of handler declarations gathered at link time.
#[distributed_slice]
pub static HANDLER_TABLE: [LinkedHandler];

/// Iterates over every linked entry.
pub fn linked_handlers() -> impl Iterator<Item = &'static LinkedHandler> {
    HANDLER_TABLE.iter()
}
