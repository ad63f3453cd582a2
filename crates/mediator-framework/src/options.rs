//! Options controlling handler discovery and registration.

use mediator_core::{CandidateType, Lifetime};

use crate::anchor::{RootAnchor, normalize_crate_name};

/// Inputs of [`add_mediator`](crate::add_mediator).
///
/// ```rust,ignore
/// let options = MediatorOptions::new()
///     .root(RootAnchor::of::<App>())
///     .reference("billing")
///     .candidate(CandidateType::of::<AuditLog>().subscribes::<OrderPlaced>());
/// ```
#[derive(Debug, Clone)]
pub struct MediatorOptions {
    root: Option<RootAnchor>,
    referenced: Vec<String>,
    candidates: Vec<CandidateType>,
    lifetime: Lifetime,
    linked: bool,
}

impl Default for MediatorOptions {
    fn default() -> Self {
        Self {
            root: None,
            referenced: Vec::new(),
            candidates: Vec::new(),
            lifetime: Lifetime::Transient,
            linked: true,
        }
    }
}

impl MediatorOptions {
    /// Options with no root anchor, no candidates and transient handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root anchor.
    pub fn root(mut self, anchor: RootAnchor) -> Self {
        self.root = Some(anchor);
        self
    }

    /// Adds a crate whose linked handlers are in scope next to the root crate.
    pub fn reference(mut self, crate_name: impl Into<String>) -> Self {
        let name = normalize_crate_name(&crate_name.into());
        if !self.referenced.contains(&name) {
            self.referenced.push(name);
        }
        self
    }

    /// Adds an explicit candidate. Explicit candidates are always in scope
    /// and are registered before linked ones, in the order supplied.
    pub fn candidate(mut self, candidate: impl Into<CandidateType>) -> Self {
        self.candidates.push(candidate.into());
        self
    }

    /// Adds several explicit candidates.
    pub fn candidates<I>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = CandidateType>,
    {
        self.candidates.extend(candidates);
        self
    }

    /// Lifetime used for every handler registration.
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Ignores the link-time handler table; only explicit candidates are used.
    pub fn without_linked_handlers(mut self) -> Self {
        self.linked = false;
        self
    }

    /// The root anchor, if set.
    pub fn root_anchor(&self) -> Option<&RootAnchor> {
        self.root.as_ref()
    }

    /// Referenced crates, in the order added.
    pub fn referenced_crates(&self) -> &[String] {
        &self.referenced
    }

    /// Explicit candidates, in the order supplied.
    pub fn explicit_candidates(&self) -> &[CandidateType] {
        &self.candidates
    }

    /// Registration lifetime for handlers.
    pub fn handler_lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Whether the link-time handler table is consulted.
    pub fn uses_linked_handlers(&self) -> bool {
        self.linked
    }
}
