//! Pagetrace analytics SDK.
//!
//! A client-side event tracker for hosts that drive a page-like surface:
//! webview shells, wasm glue layers, instrumented test harnesses. The
//! tracker auto-instruments page views and clicks, enriches every event with
//! device and page metadata, and ships it to a collection endpoint over a
//! beacon-style POST or a pixel-style GET.
//!
//! The host supplies the page through the [`Page`] trait and forwards
//! navigation transitions and clicks; the tracker owns everything else —
//! configuration, the persisted distinct id, message assembly, the referrer
//! chain, and the click dispatch policy (including taking over navigation
//! for outbound links so the tracking request wins the race against page
//! unload).
//!
//! # Example
//!
//! ```rust,ignore
//! use pagetrace::{ClickEvent, FileStore, MemoryPage, SendType, Tracker};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pagetrace::Error> {
//!     let page = Arc::new(MemoryPage::new("https://shop.example/app", "Shop"));
//!     let tracker = Tracker::builder("https://collect.example/e")
//!         .send_type(SendType::Beacon)
//!         .single_page_public_path("/app")
//!         .build(page, &FileStore::default())?;
//!
//!     // custom events
//!     let mut payload = pagetrace::Message::new();
//!     payload.insert("plan", "pro");
//!     tracker.track("signup", payload).await;
//!
//!     // forwarded instrumentation
//!     tracker.push_state().await;
//!     let _disposition = tracker.handle_click(ClickEvent::default());
//!     Ok(())
//! }
//! ```

mod click;
mod config;
mod error;
mod identity;
mod page;
mod pageview;
mod selector;
mod tracker;
mod transport;
mod types;
mod ua;

pub use click::{ClickDisposition, ClickEvent, NAVIGATION_GUARD};
pub use config::{Config, SendType, TrackerBuilder, DEFAULT_SINGLE_PAGE_PUBLIC_PATH};
pub use error::Error;
pub use identity::{ensure_distinct_id, FileStore, MemoryStore, Storage, DISTINCT_ID_KEY};
pub use page::{MemoryPage, Page};
pub use pageview::NavigationKind;
pub use selector::selector_from_path;
pub use tracker::Tracker;
pub use types::{ElementDescriptor, Message, EVENT_CLICK, EVENT_PAGEVIEW};
pub use ua::{parse_user_agent, UserAgentData};
