//! Root anchor: the crate handler discovery starts from.

use std::fmt;

/// Identifies the root crate of the application.
///
/// Only link-time handler entries declared in the root crate, or in a crate
/// explicitly referenced through
/// [`MediatorOptions::reference`](crate::MediatorOptions::reference), are
/// registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootAnchor {
    crate_name: String,
}

impl RootAnchor {
    /// Anchors on the crate that defines `T`.
    ///
    /// ```rust,ignore
    /// let anchor = RootAnchor::of::<AppState>();
    /// ```
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(crate_of(std::any::type_name::<T>()))
    }

    /// Anchors on a crate by name. `-` is normalised to `_`.
    pub fn named(crate_name: impl Into<String>) -> Self {
        Self {
            crate_name: normalize_crate_name(&crate_name.into()),
        }
    }

    /// The anchored crate, as it appears in module paths.
    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }
}

impl fmt::Display for RootAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.crate_name)
    }
}

/// Anchors on the crate invoking the macro.
///
/// ```rust,ignore
/// let options = MediatorOptions::new().root(mediator::root_anchor!());
/// ```
#[macro_export]
macro_rules! root_anchor {
    () => {
        $crate::RootAnchor::named(env!("CARGO_CRATE_NAME"))
    };
}

/// Normalises a package name to its crate name.
pub(crate) fn normalize_crate_name(name: &str) -> String {
    name.trim().replace('-', "_")
}

fn crate_of(type_name: &str) -> &str {
    let path = type_name
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ");
    path.split("::").next().unwrap_or(path)
}
