//! Click instrumentation: payload construction and the navigation guard.

use crate::page::Page;
use crate::selector::selector_from_path;
use crate::types::{ElementDescriptor, Message};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How long an intercepted click may delay a real navigation while its
/// tracking send completes.
pub const NAVIGATION_GUARD: Duration = Duration::from_millis(1000);

/// Maximum element text carried on a click event.
const MAX_CONTENT_LEN: usize = 255;

/// A click observed by the host: the composed dispatch path from the event
/// target up through shadow boundaries to the document, target first.
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    pub path: Vec<ElementDescriptor>,
}

impl ClickEvent {
    pub fn new(path: Vec<ElementDescriptor>) -> Self {
        Self { path }
    }

    /// The original event target.
    pub fn target(&self) -> Option<&ElementDescriptor> {
        self.path.first()
    }
}

/// What the host should do with the platform's default click action.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    /// Let the default action proceed.
    AllowDefault,
    /// Cancel the default action. The tracker has taken over the navigation
    /// and will perform it once the tracking send settles, or when the
    /// [`NAVIGATION_GUARD`] expires, whichever comes first.
    PreventDefault,
}

/// Build the `$element_*` payload for `el`, with the selector computed over
/// `path` (the dispatch path from `el` upward).
pub(crate) fn click_payload(el: &ElementDescriptor, path: &[ElementDescriptor]) -> Message {
    let mut payload = Message::new();
    payload.insert("$element_tag_name", el.tag.to_ascii_lowercase());
    if let Some(id) = nonempty(el.id.as_deref()) {
        payload.insert("$element_id", id);
    }
    if let Some(name) = nonempty(el.name.as_deref()) {
        payload.insert("$element_name", name);
    }
    if !el.classes.is_empty() {
        payload.insert("$element_class_name", el.classes.join(" "));
    }
    if let Some(href) = nonempty(el.href.as_deref()) {
        payload.insert("$element_target_url", href);
    }
    if let Some(text) = el.text.as_deref() {
        let content = collapse_whitespace(text);
        if !content.is_empty() {
            payload.insert("$element_content", truncate(&content, MAX_CONTENT_LEN));
        }
    }
    payload.insert("$element_selector", selector_from_path(path));
    payload
}

/// Whether `el` is a candidate for the nearest-anchor-or-button search.
pub(crate) fn is_clickable(el: &ElementDescriptor) -> bool {
    el.is_tag("a") || el.is_tag("button")
}

/// Anchors qualify for navigation takeover only when they would actually
/// unload the page: absolute http(s) target, same frame, not a download.
pub(crate) fn is_interceptable_anchor(el: &ElementDescriptor) -> bool {
    el.is_tag("a")
        && el
            .href
            .as_deref()
            .is_some_and(|href| href.starts_with("http://") || href.starts_with("https://"))
        && el.target.as_deref() != Some("_blank")
        && !el.download
}

/// Race the tracking send against the navigation guard, then navigate.
///
/// The losing branch is dropped before `navigate` runs, so the navigation
/// happens exactly once whether the send settles first or never settles.
pub(crate) async fn navigate_after(
    send: impl Future<Output = ()>,
    page: Arc<dyn Page>,
    href: String,
) {
    tokio::select! {
        _ = send => {}
        _ = tokio::time::sleep(NAVIGATION_GUARD) => {}
    }
    page.navigate(&href);
}

fn nonempty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
