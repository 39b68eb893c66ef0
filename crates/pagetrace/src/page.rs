//! The page surface the tracker observes and acts on.

use std::sync::Mutex;

/// What the tracker needs from the surrounding page environment.
///
/// Hosts implement this over their webview or document bindings. The tracker
/// reads at event time, never caching — `$title`/`$url` always reflect the
/// document as it is when an event fires.
pub trait Page: Send + Sync {
    /// Current document title.
    fn title(&self) -> String;

    /// Current location as a full href.
    fn url(&self) -> String;

    /// The document referrer; empty when there is none.
    fn referrer(&self) -> String;

    /// Perform a real top-level navigation to `href`. Called for intercepted
    /// link clicks once their tracking send settles (or the guard expires).
    fn navigate(&self, href: &str);

    /// User-agent string of the environment.
    fn user_agent(&self) -> String {
        String::new()
    }

    /// BCP 47 language tag of the environment.
    fn language(&self) -> String {
        String::new()
    }

    /// Platform identifier of the environment.
    fn platform(&self) -> String {
        String::new()
    }
}

#[derive(Debug, Default)]
struct PageState {
    title: String,
    url: String,
    referrer: String,
    user_agent: String,
    language: String,
    platform: String,
}

/// An in-memory [`Page`], for tests and hosts without a live document.
///
/// `navigate` records the target and moves the location there, so a test can
/// assert both that a navigation happened and where it went.
#[derive(Debug, Default)]
pub struct MemoryPage {
    state: Mutex<PageState>,
    navigations: Mutex<Vec<String>>,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let page = Self::default();
        {
            let mut state = page.state.lock().unwrap();
            state.url = url.into();
            state.title = title.into();
        }
        page
    }

    pub fn set_location(&self, url: impl Into<String>) {
        self.state.lock().unwrap().url = url.into();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().unwrap().title = title.into();
    }

    pub fn set_referrer(&self, referrer: impl Into<String>) {
        self.state.lock().unwrap().referrer = referrer.into();
    }

    pub fn set_user_agent(&self, user_agent: impl Into<String>) {
        self.state.lock().unwrap().user_agent = user_agent.into();
    }

    pub fn set_language(&self, language: impl Into<String>) {
        self.state.lock().unwrap().language = language.into();
    }

    pub fn set_platform(&self, platform: impl Into<String>) {
        self.state.lock().unwrap().platform = platform.into();
    }

    /// Every href passed to [`Page::navigate`], in order.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Page for MemoryPage {
    fn title(&self) -> String {
        self.state.lock().unwrap().title.clone()
    }

    fn url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    fn referrer(&self) -> String {
        self.state.lock().unwrap().referrer.clone()
    }

    fn navigate(&self, href: &str) {
        self.navigations.lock().unwrap().push(href.into());
        self.state.lock().unwrap().url = href.into();
    }

    fn user_agent(&self) -> String {
        self.state.lock().unwrap().user_agent.clone()
    }

    fn language(&self) -> String {
        self.state.lock().unwrap().language.clone()
    }

    fn platform(&self) -> String {
        self.state.lock().unwrap().platform.clone()
    }
}
