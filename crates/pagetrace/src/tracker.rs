//! Tracker context object and init flow.

use crate::click::{
    click_payload, is_clickable, is_interceptable_anchor, navigate_after, ClickDisposition,
    ClickEvent,
};
use crate::config::{Config, TrackerBuilder};
use crate::identity::{ensure_distinct_id, Storage, DISTINCT_ID_KEY};
use crate::page::Page;
use crate::pageview::{HistoryHooks, NavigationKind};
use crate::transport::Sender;
use crate::types::{Message, EVENT_CLICK, EVENT_PAGEVIEW};
use crate::ua::parse_user_agent;
use crate::Error;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use url::Url;

/// Get current timestamp in milliseconds.
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// How a qualifying anchor click should be dispatched.
enum AnchorClass {
    /// Same-origin link under the single-page public path; the in-page
    /// router will handle it.
    InApp,
    /// A real page unload; navigation is taken over, deferred behind the
    /// tracking send. Carries the resolved href.
    External(String),
    /// The href did not parse; tracked like any other element.
    Invalid,
}

/// An analytics tracker bound to one page surface.
///
/// Construction runs the whole init flow: merge options, restore or create
/// the distinct id, resolve the transport, emit the initial `$pageview`, and
/// arm the navigation and click instrumentation the options ask for. All
/// later event emission funnels through [`track`](Tracker::track).
///
/// There is no global state: independent trackers coexist, each closing over
/// its own page, storage scope, and preset attributes.
///
/// # Example
///
/// ```rust,no_run
/// use pagetrace::{MemoryPage, MemoryStore, SendType, Tracker};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), pagetrace::Error> {
/// let page = Arc::new(MemoryPage::new("https://shop.example/app", "Shop"));
/// let tracker = Tracker::builder("https://collect.example/e")
///     .send_type(SendType::Image)
///     .single_page_public_path("/app")
///     .build(page, &MemoryStore::default())?;
///
/// let mut payload = pagetrace::Message::new();
/// payload.insert("plan", "pro");
/// tracker.track("signup", payload).await;
/// # Ok(())
/// # }
/// ```
pub struct Tracker {
    config: Config,
    page: Arc<dyn Page>,
    sender: Arc<Sender>,
    preset: Mutex<Message>,
    hooks: HistoryHooks,
}

impl Tracker {
    /// Create a new builder with the given collection endpoint.
    pub fn builder(dsn: impl Into<String>) -> TrackerBuilder {
        TrackerBuilder::new(dsn)
    }

    /// Create a tracker from finished options, running the init flow.
    pub(crate) fn from_config(
        config: Config,
        page: Arc<dyn Page>,
        storage: &dyn Storage,
    ) -> Result<Self, Error> {
        let sender = Arc::new(Sender::new(&config)?);

        let user_agent = page.user_agent();
        let agent = parse_user_agent(&user_agent);
        let mut preset = Message::new();
        preset.insert("$sdk_version", env!("CARGO_PKG_VERSION"));
        preset.insert("$sdk_type", "rust");
        preset.insert("$user_agent", user_agent);
        preset.insert("$browser_brand", agent.brand);
        preset.insert("$browser_version", agent.version);
        preset.insert("$language", page.language());
        preset.insert("$platform", page.platform());
        preset.insert(DISTINCT_ID_KEY, ensure_distinct_id(storage));

        let tracker = Self {
            config,
            page,
            sender,
            preset: Mutex::new(preset),
            hooks: HistoryHooks::new(),
        };

        // Initial pageview carries the real document referrer.
        let mut payload = Message::new();
        payload.insert("$url", tracker.page.url());
        payload.insert("$referrer", tracker.page.referrer());
        tracker.spawn_track(EVENT_PAGEVIEW, payload);

        if tracker.config.track_single_page() {
            tracker.hooks.install(tracker.page.url());
        }

        Ok(tracker)
    }

    /// Get the tracker configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Add or overwrite one attribute sent with every future event.
    pub fn append_preset(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.preset.lock().unwrap().insert(name, value);
    }

    /// Override the generated device identifier.
    pub fn set_distinct_id(&self, id: impl Into<String>) {
        self.append_preset(DISTINCT_ID_KEY, id.into());
    }

    /// The distinct id events currently carry.
    pub fn distinct_id(&self) -> Option<String> {
        self.preset
            .lock()
            .unwrap()
            .get(DISTINCT_ID_KEY)
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Emit one event.
    ///
    /// The message is assembled from the preset attributes, `payload`, and
    /// the page as it is right now, then handed to the transport resolved at
    /// init. The returned future resolves exactly once, when the transport
    /// reports the message dispatched; it never resolves early and never
    /// hangs past the send settling.
    pub async fn track(&self, event_type: &str, payload: Message) {
        let message = self.assemble(event_type, &payload);
        self.sender.send(&message).await;
    }

    /// Whether single-page navigation instrumentation is installed.
    pub fn navigation_hooks_installed(&self) -> bool {
        self.hooks.is_installed()
    }

    /// Disable single-page navigation instrumentation for the rest of this
    /// tracker's life. Present for contract symmetry; a tracker normally
    /// lives for the whole page session and never uninstalls.
    pub fn uninstall_navigation_hooks(&self) {
        self.hooks.uninstall();
    }

    /// Notify the tracker of a completed pushState-equivalent mutation.
    ///
    /// Call after the underlying navigation has applied, so the emitted
    /// `$pageview` captures the new location.
    pub async fn push_state(&self) {
        self.handle_navigation(NavigationKind::Push).await;
    }

    /// Notify the tracker of a completed replaceState-equivalent mutation.
    pub async fn replace_state(&self) {
        self.handle_navigation(NavigationKind::Replace).await;
    }

    /// Notify the tracker of a completed back/forward transition.
    pub async fn pop_state(&self) {
        self.handle_navigation(NavigationKind::Pop).await;
    }

    /// Process one navigation transition forwarded by the host, after the
    /// underlying mutation has applied. All kinds share the same emission
    /// rule: one `$pageview` whose `$referrer` is the previous location.
    pub async fn handle_navigation(&self, kind: NavigationKind) {
        // Rotation is unconditional so the referrer chain stays accurate
        // even while pageview emission is gated off.
        let Some(referrer) = self.hooks.rotate(self.page.url()) else {
            return;
        };
        if !self.config.track_page_view() {
            return;
        }
        debug!(?kind, "navigation transition");

        let mut payload = Message::new();
        payload.insert("$url", self.page.url());
        payload.insert("$referrer", referrer);
        self.track(EVENT_PAGEVIEW, payload).await;
    }

    /// Process one click forwarded by the host.
    ///
    /// Returns what to do with the platform's default action. On
    /// [`ClickDisposition::PreventDefault`] the tracker has taken over the
    /// navigation: it emits `$click` and navigates to the link target when
    /// the send settles or the guard expires, whichever comes first.
    pub fn handle_click(&self, event: ClickEvent) -> ClickDisposition {
        use ClickDisposition::{AllowDefault, PreventDefault};

        if !self.config.track_click() {
            return AllowDefault;
        }
        let Some(target) = event.target() else {
            return AllowDefault;
        };
        if target.is_tag("html") || target.is_tag("body") {
            return AllowDefault;
        }

        let path = &event.path;
        let Some(index) = path.iter().position(is_clickable) else {
            // No anchor or button anywhere in the path: track the raw target.
            self.spawn_track(EVENT_CLICK, click_payload(target, path));
            return AllowDefault;
        };

        let el = &path[index];
        let payload = click_payload(el, &path[index..]);
        if !is_interceptable_anchor(el) {
            self.spawn_track(EVENT_CLICK, payload);
            return AllowDefault;
        }

        match self.classify_anchor(el.href.as_deref().unwrap_or_default()) {
            AnchorClass::InApp | AnchorClass::Invalid => {
                self.spawn_track(EVENT_CLICK, payload);
                AllowDefault
            }
            AnchorClass::External(href) => {
                self.spawn_guarded_navigation(payload, href);
                PreventDefault
            }
        }
    }

    fn classify_anchor(&self, href: &str) -> AnchorClass {
        let parsed = match Url::parse(href) {
            Ok(url) => url,
            Err(err) => {
                warn!(href, error = %err, "failed to parse link URL");
                return AnchorClass::Invalid;
            }
        };
        if self.config.track_single_page() {
            if let Ok(current) = Url::parse(&self.page.url()) {
                let prefix = format!(
                    "{}{}",
                    current.origin().ascii_serialization(),
                    self.config.single_page_public_path()
                );
                if parsed.origin() == current.origin() && parsed.as_str().starts_with(&prefix) {
                    return AnchorClass::InApp;
                }
            }
        }
        AnchorClass::External(parsed.into())
    }

    /// Assemble the wire message for one event from the preset attributes,
    /// the event payload, and the page as it is right now.
    fn assemble(&self, event_type: &str, payload: &Message) -> Message {
        let mut message = self.preset.lock().unwrap().clone();
        message.extend(payload);
        message.insert("$event_type", event_type);
        if self.config.use_client_time() {
            message.insert("$timestamp", now_ms());
        }
        let url = self.page.url();
        let url_path = Url::parse(&url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        message.insert("$title", self.page.title());
        message.insert("$url", url);
        message.insert("$url_path", url_path);
        if self.config.debug() {
            debug!(?message, "assembled message");
        }
        message
    }

    /// Emit without a completion consumer: the send runs on its own task.
    fn spawn_track(&self, event_type: &str, payload: Message) {
        let message = self.assemble(event_type, &payload);
        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            sender.send(&message).await;
        });
    }

    fn spawn_guarded_navigation(&self, payload: Message, href: String) {
        let message = self.assemble(EVENT_CLICK, &payload);
        let sender = Arc::clone(&self.sender);
        let page = Arc::clone(&self.page);
        tokio::spawn(async move {
            let send = async move { sender.send(&message).await };
            navigate_after(send, page, href).await;
        });
    }
}

impl TrackerBuilder {
    /// Build the tracker against a page surface and a storage scope.
    ///
    /// Must run inside a tokio runtime: the initial `$pageview` and all
    /// fire-and-forget click sends are dispatched on spawned tasks.
    pub fn build(self, page: Arc<dyn Page>, storage: &dyn Storage) -> Result<Tracker, Error> {
        let config = self.build_config()?;
        Tracker::from_config(config, page, storage)
    }
}
