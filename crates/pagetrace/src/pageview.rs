//! Single-page navigation instrumentation.

use std::sync::Mutex;

/// Which history entry point the host observed. All three apply the same
/// pageview emission rule; the kind only distinguishes them in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// A pushState-equivalent mutation.
    Push,
    /// A replaceState-equivalent mutation.
    Replace,
    /// A back/forward (popstate-equivalent) transition.
    Pop,
}

/// Navigation-observer state: the referrer chain for single-page pageviews.
///
/// Holds the last known URL. Installed at most once per tracker; uninstall
/// exists for contract symmetry even though a tracker normally lives for the
/// whole page session.
#[derive(Debug, Default)]
pub(crate) struct HistoryHooks {
    last_href: Mutex<Option<String>>,
}

impl HistoryHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install with the URL the next transition should report as referrer.
    pub fn install(&self, href: String) {
        *self.last_href.lock().unwrap() = Some(href);
    }

    pub fn uninstall(&self) {
        *self.last_href.lock().unwrap() = None;
    }

    pub fn is_installed(&self) -> bool {
        self.last_href.lock().unwrap().is_some()
    }

    /// Record `current` as the new last known URL, returning the previous
    /// one. `None` when not installed; the update is unconditional so the
    /// referrer chain stays accurate even while emission is gated off.
    pub fn rotate(&self, current: String) -> Option<String> {
        let mut last = self.last_href.lock().unwrap();
        last.as_ref()?;
        last.replace(current)
    }
}
