//! Auto-instrumentation tests: the single-page referrer chain and the click
//! dispatch policy, driven end-to-end against a mock endpoint.

use pagetrace::{
    ClickDisposition, ClickEvent, ElementDescriptor, MemoryPage, MemoryStore, SendType, Tracker,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query_map(request: &wiremock::Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
    for _ in 0..100 {
        let requests = server.received_requests().await.unwrap();
        if requests.len() >= count {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    server.received_requests().await.unwrap()
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..150 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Pixel tracker on `https://shop.example/app/home` with `/app` as the
/// single-page public path, plus its mock endpoint.
async fn spa_tracker() -> (MockServer, Arc<MemoryPage>, Tracker) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/e"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let page = Arc::new(MemoryPage::new("https://shop.example/app/home", "Home"));
    let tracker = Tracker::builder(format!("{}/e", server.uri()))
        .send_type(SendType::Image)
        .single_page_public_path("/app")
        .build(page.clone(), &MemoryStore::default())
        .unwrap();
    // let the init pageview land so later assertions index past it
    wait_for_requests(&server, 1).await;
    (server, page, tracker)
}

fn anchor_click(href: &str) -> ClickEvent {
    ClickEvent::new(vec![
        ElementDescriptor::new("span").with_text("Go"),
        ElementDescriptor::new("a")
            .with_href(href)
            .with_class("nav-link"),
        ElementDescriptor::new("body"),
    ])
}

#[tokio::test]
async fn test_each_transition_emits_one_pageview_with_previous_url() {
    let (server, page, tracker) = spa_tracker().await;

    page.set_location("https://shop.example/app/products");
    tracker.push_state().await;

    page.set_location("https://shop.example/app/cart");
    tracker.replace_state().await;

    page.set_location("https://shop.example/app/products");
    tracker.pop_state().await;

    let requests = wait_for_requests(&server, 4).await;
    assert_eq!(requests.len(), 4);

    let queries: Vec<_> = requests.iter().map(query_map).collect();
    for query in &queries {
        assert_eq!(query["$event_type"], "$pageview");
    }

    assert_eq!(queries[1]["$url"], "https://shop.example/app/products");
    assert_eq!(queries[1]["$referrer"], "https://shop.example/app/home");
    assert_eq!(queries[2]["$url"], "https://shop.example/app/cart");
    assert_eq!(queries[2]["$referrer"], "https://shop.example/app/products");
    assert_eq!(queries[3]["$url"], "https://shop.example/app/products");
    assert_eq!(queries[3]["$referrer"], "https://shop.example/app/cart");
}

#[tokio::test]
async fn test_gated_pageview_emits_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let page = Arc::new(MemoryPage::new("https://shop.example/app/home", "Home"));
    let tracker = Tracker::builder(format!("{}/e", server.uri()))
        .send_type(SendType::Image)
        .track_page_view(false)
        .build(page.clone(), &MemoryStore::default())
        .unwrap();
    wait_for_requests(&server, 1).await;

    page.set_location("https://shop.example/app/products");
    tracker.push_state().await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_transitions_without_single_page_tracking_are_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let page = Arc::new(MemoryPage::new("https://shop.example/app/home", "Home"));
    let tracker = Tracker::builder(format!("{}/e", server.uri()))
        .send_type(SendType::Image)
        .track_single_page(false)
        .build(page.clone(), &MemoryStore::default())
        .unwrap();
    wait_for_requests(&server, 1).await;

    page.set_location("https://shop.example/app/products");
    tracker.pop_state().await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_in_app_click_emits_without_navigation() {
    let (server, page, tracker) = spa_tracker().await;

    let disposition = tracker.handle_click(anchor_click("https://shop.example/app/next"));
    assert_eq!(disposition, ClickDisposition::AllowDefault);

    let requests = wait_for_requests(&server, 2).await;
    let query = query_map(&requests[1]);
    assert_eq!(query["$event_type"], "$click");
    assert_eq!(query["$element_tag_name"], "a");
    assert_eq!(
        query["$element_target_url"],
        "https://shop.example/app/next"
    );
    assert_eq!(query["$element_class_name"], "nav-link");
    assert_eq!(query["$element_selector"], "body>.nav-link");

    // the single-page router handles the move; the tracker must not
    assert!(page.navigations().is_empty());
}

#[tokio::test]
async fn test_cross_origin_click_navigates_exactly_once() {
    let (server, page, tracker) = spa_tracker().await;

    let disposition = tracker.handle_click(anchor_click("https://other.example/x"));
    assert_eq!(disposition, ClickDisposition::PreventDefault);

    wait_until(|| !page.navigations().is_empty()).await;
    assert_eq!(page.navigations(), vec!["https://other.example/x"]);

    let requests = wait_for_requests(&server, 2).await;
    let query = query_map(&requests[1]);
    assert_eq!(query["$event_type"], "$click");
    assert_eq!(query["$element_target_url"], "https://other.example/x");

    // nothing fires twice
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(page.navigations().len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_same_origin_outside_prefix_is_taken_over() {
    let (_server, page, tracker) = spa_tracker().await;

    let disposition = tracker.handle_click(anchor_click("https://shop.example/legal/terms"));
    assert_eq!(disposition, ClickDisposition::PreventDefault);

    wait_until(|| !page.navigations().is_empty()).await;
    assert_eq!(page.navigations(), vec!["https://shop.example/legal/terms"]);
}

#[tokio::test]
async fn test_button_click_tracks_nearest_element() {
    let (server, page, tracker) = spa_tracker().await;

    let event = ClickEvent::new(vec![
        ElementDescriptor::new("span").with_text("  Add   to cart  "),
        ElementDescriptor::new("button")
            .with_id("add-to-cart")
            .with_name("add")
            .with_text("Add to cart"),
        ElementDescriptor::new("div").with_class("product-card"),
        ElementDescriptor::new("body"),
    ]);
    let disposition = tracker.handle_click(event);
    assert_eq!(disposition, ClickDisposition::AllowDefault);

    let requests = wait_for_requests(&server, 2).await;
    let query = query_map(&requests[1]);
    assert_eq!(query["$event_type"], "$click");
    assert_eq!(query["$element_tag_name"], "button");
    assert_eq!(query["$element_id"], "add-to-cart");
    assert_eq!(query["$element_name"], "add");
    assert_eq!(query["$element_content"], "Add to cart");
    assert_eq!(query["$element_selector"], "#add-to-cart");
    assert!(page.navigations().is_empty());
}

#[tokio::test]
async fn test_plain_element_click_tracks_the_target() {
    let (server, _page, tracker) = spa_tracker().await;

    let event = ClickEvent::new(vec![
        ElementDescriptor::new("img").with_class("hero"),
        ElementDescriptor::new("section"),
        ElementDescriptor::new("body"),
    ]);
    let disposition = tracker.handle_click(event);
    assert_eq!(disposition, ClickDisposition::AllowDefault);

    let requests = wait_for_requests(&server, 2).await;
    let query = query_map(&requests[1]);
    assert_eq!(query["$element_tag_name"], "img");
    assert_eq!(query["$element_selector"], "body>section>.hero");
}

#[tokio::test]
async fn test_unparseable_href_still_tracks() {
    let (server, page, tracker) = spa_tracker().await;

    let disposition = tracker.handle_click(anchor_click("https://["));
    assert_eq!(disposition, ClickDisposition::AllowDefault);

    let requests = wait_for_requests(&server, 2).await;
    let query = query_map(&requests[1]);
    assert_eq!(query["$event_type"], "$click");
    assert!(page.navigations().is_empty());
}
