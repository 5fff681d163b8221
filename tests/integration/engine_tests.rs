//! Integration tests for the pipeline engine
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! collect cycles end-to-end: fetch, rule evaluation, persistence, export.

use skrapa::engine::{Engine, FetchError};
use skrapa::export::{export_csv, export_json};
use skrapa::script::{Action, MainConfig, OutputFormat, Rule, Script};
use skrapa::storage::{SqliteStorage, Storage};
use skrapa::SkrapaError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test script rooted at the given entry URL
fn test_script(url: &str, pipeline: Vec<Rule>) -> Script {
    Script {
        main: MainConfig {
            url: url.to_string(),
            file: "./out.json".to_string(),
            format: OutputFormat::Json,
            user_agent: Some("SkrapaTest".to_string()),
            delay: None,
            random_delay: None,
            allowed_domains: vec![],
        },
        pipeline,
    }
}

fn collect_rule(selector: &str, attr: &str, column: &str) -> Rule {
    Rule {
        selector: selector.to_string(),
        action: Action::Collect,
        attr: attr.to_string(),
        column: Some(column.to_string()),
        visit_once: false,
    }
}

fn follow_rule(selector: &str, visit_once: bool) -> Rule {
    Rule {
        selector: selector.to_string(),
        action: Action::Follow,
        attr: "href".to_string(),
        column: None,
        visit_once,
    }
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.to_string().into_bytes(), "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_collect_from_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <h1>Widget</h1>
            <span class="price">9.99</span>
            <span class="price">19.99</span>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/", server.uri()),
        vec![
            collect_rule("h1", "text", "title"),
            collect_rule("span.price", "text", "price"),
        ],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();
    let snapshot = store.snapshot();

    assert_eq!(snapshot["title"], vec!["Widget"]);
    assert_eq!(snapshot["price"], vec!["9.99", "19.99"]);
}

#[tokio::test]
async fn test_collect_attribute_and_missing_attribute() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="/first">one</a>
            <a>two</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/", server.uri()),
        vec![collect_rule("a", "href", "link")],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();

    // Absent attribute reads as empty string, and the value is still kept
    assert_eq!(store.snapshot()["link"], vec!["/first", ""]);
}

#[tokio::test]
async fn test_visit_once_self_loop_fetches_once() {
    let server = MockServer::start().await;

    // The page's "next" link points back at itself; expect(1) makes the
    // mock server itself assert there was no second fetch
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(html_response(
            r#"<html><body>
            <a class="next" href="/loop">same page</a>
            <h1>Only Title</h1>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/loop", server.uri()),
        vec![
            follow_rule("a.next", true),
            collect_rule("h1", "text", "title"),
        ],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();
    assert_eq!(store.snapshot()["title"], vec!["Only Title"]);
}

#[tokio::test]
async fn test_follow_pagination_collects_in_visit_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page/1"))
        .respond_with(html_response(
            r#"<html><body>
            <h1>First</h1>
            <a class="next" href="/page/2">next</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(html_response("<html><body><h1>Second</h1></body></html>"))
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/page/1", server.uri()),
        vec![
            collect_rule("h1", "text", "title"),
            follow_rule("a.next", true),
        ],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();
    assert_eq!(store.snapshot()["title"], vec!["First", "Second"]);
}

#[tokio::test]
async fn test_followed_link_fetch_failure_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body><a class="next" href="/gone">broken</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    // /gone is unmocked and returns 404

    let script = test_script(
        &format!("{}/", server.uri()),
        vec![follow_rule("a.next", false)],
    );

    let result = Engine::new(script).unwrap().run().await;
    assert!(matches!(
        result,
        Err(SkrapaError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}

#[tokio::test]
async fn test_entry_fetch_failure_aborts_run() {
    let server = MockServer::start().await;
    // Nothing mounted at all: the entry fetch itself 404s

    let script = test_script(
        &format!("{}/missing", server.uri()),
        vec![collect_rule("h1", "text", "title")],
    );

    let result = Engine::new(script).unwrap().run().await;
    assert!(matches!(result, Err(SkrapaError::Fetch(_))));
}

#[tokio::test]
async fn test_follow_outside_allowed_domains_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body><a class="next" href="http://elsewhere.invalid/page">away</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    let mut script = test_script(
        &format!("{}/", server.uri()),
        vec![follow_rule("a.next", false)],
    );
    script.main.allowed_domains = vec!["127.0.0.1".to_string()];

    let result = Engine::new(script).unwrap().run().await;
    assert!(matches!(
        result,
        Err(SkrapaError::Fetch(FetchError::DomainNotAllowed { .. }))
    ));
}

#[tokio::test]
async fn test_robots_disallow_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /private/\n"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body><a class="next" href="/private/page">secret</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/", server.uri()),
        vec![follow_rule("a.next", false)],
    );

    let result = Engine::new(script).unwrap().run().await;
    assert!(matches!(
        result,
        Err(SkrapaError::Fetch(FetchError::RobotsDenied { .. }))
    ));
}

#[tokio::test]
async fn test_missing_robots_allows_crawl() {
    let server = MockServer::start().await;

    // No robots.txt mock: the fetch 404s and everything is allowed
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("<html><body><h1>Open</h1></body></html>"))
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/", server.uri()),
        vec![collect_rule("h1", "text", "title")],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();
    assert_eq!(store.snapshot()["title"], vec!["Open"]);
}

#[tokio::test]
async fn test_non_html_page_is_skipped_not_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <h1>Index</h1>
            <a class="next" href="/feed.json">feed</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"h1": "not html"}"#)
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/", server.uri()),
        vec![
            collect_rule("h1", "text", "title"),
            follow_rule("a.next", false),
        ],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();

    // The JSON page is fetched but contributes nothing
    assert_eq!(store.snapshot()["title"], vec!["Index"]);
}

#[tokio::test]
async fn test_collect_persist_export_json_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(html_response(
            r#"<html><body>
            <a class="next" href="/item">self</a>
            <h1> Widget Deluxe </h1>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/item", server.uri()),
        vec![
            follow_rule("a.next", true),
            collect_rule("h1", "text", "title"),
        ],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("skrapa.db");

    let mut storage = SqliteStorage::create(&db_path).unwrap();
    storage
        .save_script("# the script text", "deadbeef")
        .unwrap();
    storage.save(&store.snapshot()).unwrap();
    drop(storage);

    // Separate invocation: reopen read-only and export
    let reopened = SqliteStorage::open(&db_path).unwrap();
    let data = reopened.load_all().unwrap();

    let out_path = dir.path().join("out.json");
    export_json(&data, &out_path).unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written, r#"[{"title":"Widget Deluxe"}]"#);
}

#[tokio::test]
async fn test_collect_persist_export_csv_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <div class="item"><h2>A</h2><span class="price">1</span></div>
            <div class="item"><h2>B</h2><span class="price">2</span></div>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let script = test_script(
        &format!("{}/", server.uri()),
        vec![
            collect_rule("div.item h2", "text", "title"),
            collect_rule("div.item span.price", "text", "price"),
        ],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("skrapa.db");

    let mut storage = SqliteStorage::create(&db_path).unwrap();
    storage.save(&store.snapshot()).unwrap();
    drop(storage);

    let data = SqliteStorage::open(&db_path).unwrap().load_all().unwrap();

    let out_path = dir.path().join("out.csv");
    export_csv(&data, &out_path).unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written, "price,title\n1,A\n2,B\n");
}

#[tokio::test]
async fn test_pipeline_order_controls_column_accumulation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body><p class="x">P</p></body></html>"#,
        ))
        .mount(&server)
        .await;

    // Two collect rules over the same element into the same column:
    // rule order decides value order
    let script = test_script(
        &format!("{}/", server.uri()),
        vec![
            collect_rule("p.x", "text", "field"),
            collect_rule("p", "class", "field"),
        ],
    );

    let store = Engine::new(script).unwrap().run().await.unwrap();
    assert_eq!(store.snapshot()["field"], vec!["P", "x"]);
}
