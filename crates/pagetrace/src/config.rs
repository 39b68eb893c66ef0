//! Tracker configuration.

use serde::Deserialize;

/// Default public path for single-page route classification.
pub const DEFAULT_SINGLE_PAGE_PUBLIC_PATH: &str = "/";

/// Which transport a tracker sends with. Resolved once per tracker; there is
/// no fallback or runtime renegotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendType {
    /// Fire-and-forget form POST, beacon style.
    Beacon,
    /// GET with the message in the query string, pixel style.
    Image,
}

/// Tracker configuration. Immutable once built.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub(crate) dsn: String,
    pub(crate) use_client_time: bool,
    pub(crate) send_type: SendType,
    pub(crate) track_page_view: bool,
    pub(crate) track_click: bool,
    pub(crate) track_single_page: bool,
    pub(crate) single_page_public_path: String,
    pub(crate) debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            use_client_time: true,
            send_type: SendType::Beacon,
            track_page_view: true,
            track_click: true,
            track_single_page: true,
            single_page_public_path: DEFAULT_SINGLE_PAGE_PUBLIC_PATH.into(),
            debug: false,
        }
    }
}

impl Config {
    /// Load options from JSON, applying defaults for absent keys and the
    /// same validation the builder performs.
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        let config: Config = serde_json::from_str(json)?;
        config.validated()
    }

    /// Get the collection endpoint URL.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Whether events carry a client-side `$timestamp`.
    pub fn use_client_time(&self) -> bool {
        self.use_client_time
    }

    /// Get the transport selection.
    pub fn send_type(&self) -> SendType {
        self.send_type
    }

    /// Whether navigation transitions emit `$pageview` events.
    pub fn track_page_view(&self) -> bool {
        self.track_page_view
    }

    /// Whether clicks are tracked.
    pub fn track_click(&self) -> bool {
        self.track_click
    }

    /// Whether single-page navigation instrumentation is enabled.
    pub fn track_single_page(&self) -> bool {
        self.track_single_page
    }

    /// Get the single-page public path prefix. Always begins with `/`.
    pub fn single_page_public_path(&self) -> &str {
        &self.single_page_public_path
    }

    /// Whether assembled messages are logged before dispatch.
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn validated(mut self) -> Result<Self, crate::Error> {
        if self.dsn.is_empty() {
            return Err(crate::Error::Config("dsn cannot be empty".into()));
        }
        // Malformed paths are normalized, never rejected.
        if !self.single_page_public_path.starts_with('/') {
            self.single_page_public_path = format!("/{}", self.single_page_public_path);
        }
        Ok(self)
    }
}

/// Builder for a [`Tracker`](crate::Tracker). Options merge over defaults
/// exactly once, at build time.
#[derive(Debug)]
pub struct TrackerBuilder {
    dsn: String,
    use_client_time: Option<bool>,
    send_type: Option<SendType>,
    track_page_view: Option<bool>,
    track_click: Option<bool>,
    track_single_page: Option<bool>,
    single_page_public_path: Option<String>,
    debug: Option<bool>,
}

impl TrackerBuilder {
    /// Create a new builder with the given collection endpoint.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            use_client_time: None,
            send_type: None,
            track_page_view: None,
            track_click: None,
            track_single_page: None,
            single_page_public_path: None,
            debug: None,
        }
    }

    /// Attach a client-side epoch-millisecond `$timestamp` to every event.
    pub fn use_client_time(mut self, on: bool) -> Self {
        self.use_client_time = Some(on);
        self
    }

    /// Set the transport.
    pub fn send_type(mut self, send_type: SendType) -> Self {
        self.send_type = Some(send_type);
        self
    }

    /// Emit `$pageview` on single-page navigation transitions.
    pub fn track_page_view(mut self, on: bool) -> Self {
        self.track_page_view = Some(on);
        self
    }

    /// Track clicks forwarded by the host.
    pub fn track_click(mut self, on: bool) -> Self {
        self.track_click = Some(on);
        self
    }

    /// Enable single-page navigation instrumentation.
    pub fn track_single_page(mut self, on: bool) -> Self {
        self.track_single_page = Some(on);
        self
    }

    /// Set the path prefix under which same-origin links are in-app routes.
    pub fn single_page_public_path(mut self, path: impl Into<String>) -> Self {
        self.single_page_public_path = Some(path.into());
        self
    }

    /// Log every assembled message before dispatch.
    pub fn debug(mut self, on: bool) -> Self {
        self.debug = Some(on);
        self
    }

    /// Build the configuration.
    pub(crate) fn build_config(self) -> Result<Config, crate::Error> {
        let defaults = Config::default();
        Config {
            dsn: self.dsn,
            use_client_time: self.use_client_time.unwrap_or(defaults.use_client_time),
            send_type: self.send_type.unwrap_or(defaults.send_type),
            track_page_view: self.track_page_view.unwrap_or(defaults.track_page_view),
            track_click: self.track_click.unwrap_or(defaults.track_click),
            track_single_page: self.track_single_page.unwrap_or(defaults.track_single_page),
            single_page_public_path: self
                .single_page_public_path
                .unwrap_or(defaults.single_page_public_path),
            debug: self.debug.unwrap_or(defaults.debug),
        }
        .validated()
    }
}
