//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_ledger::config::{CrawlConfig, Settings};
use site_ledger::crawler::{Coordinator, FetchBackend, PlainFetcher};
use site_ledger::output::{CsvSink, OutputResult, PageRecord, ResultSink};
use site_ledger::state::{PageOutcome, RunState};
use site_ledger::{CrawlReport, LedgerError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sink that keeps records in memory for inspection
#[derive(Clone, Default)]
struct MemorySink {
    records: Arc<Mutex<Vec<PageRecord>>>,
    calls: Arc<AtomicUsize>,
}

impl MemorySink {
    fn urls(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResultSink for MemorySink {
    fn write_records(&mut self, records: &[PageRecord]) -> OutputResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    fn target(&self) -> String {
        "memory".to_string()
    }
}

/// Creates a run configuration with no pacing and the given timeout
fn create_test_config(origin: &str, output: PathBuf, concurrency: u32, timeout: u64) -> CrawlConfig {
    let mut settings = Settings::default();
    settings.crawler.delay_seconds = Some(0.0);
    settings.crawler.concurrency = concurrency;
    settings.fetch.timeout_seconds = timeout;

    CrawlConfig::from_settings(origin, Some(output), &settings).expect("valid test config")
}

fn plain_backend(config: &CrawlConfig) -> FetchBackend {
    FetchBackend::Plain(PlainFetcher::new(&config.fetch).expect("Failed to build client"))
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn page(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    html(format!(
        r#"<html><head><title>{}</title><meta name="description" content="About {}"></head><body>{}</body></html>"#,
        title, title, anchors
    ))
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn run_with_memory_sink(
    origin: &str,
    concurrency: u32,
    timeout: u64,
) -> (CrawlReport, MemorySink) {
    let config = create_test_config(origin, PathBuf::from("unused.csv"), concurrency, timeout);
    let backend = plain_backend(&config);
    let sink = MemorySink::default();

    let report = Coordinator::new(
        config,
        backend,
        Box::new(sink.clone()),
        CancellationToken::new(),
    )
    .run()
    .await
    .expect("crawl failed");

    (report, sink)
}

/// Reads data rows (header excluded) from a CSV written with a BOM
fn read_csv_rows(path: &Path) -> Vec<Vec<String>> {
    let bytes = std::fs::read(path).expect("output file missing");
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "missing byte-order mark");

    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), ["url", "title", "description"]);

    reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(
        &mock_server,
        "/",
        page(
            "Home",
            &[
                "/page1",
                "/page2",
                "/page1/",
                "#top",
                "https://other.com/x",
                "/files/report.pdf",
                "mailto:team@example.com",
            ],
        ),
    )
    .await;
    mount(&mock_server, "/page1", page("Page 1", &["/", "/page2"])).await;
    mount(&mock_server, "/page2", page("Page 2", &["page1"])).await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("pages.csv");
    let config = create_test_config(&base_url, output.clone(), 1, 5);
    let backend = plain_backend(&config);

    let report = Coordinator::new(
        config,
        backend,
        Box::new(CsvSink::new(&output)),
        CancellationToken::new(),
    )
    .run()
    .await
    .expect("crawl failed");

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.records_saved, 3);
    assert_eq!(report.statistics.pages_visited(), 3);

    let rows = read_csv_rows(&output);
    assert_eq!(
        rows,
        vec![
            vec![base_url.clone(), "Home".to_string(), "About Home".to_string()],
            vec![
                format!("{}/page1", base_url),
                "Page 1".to_string(),
                "About Page 1".to_string()
            ],
            vec![
                format!("{}/page2", base_url),
                "Page 2".to_string(),
                "About Page 2".to_string()
            ],
        ]
    );
}

#[tokio::test]
async fn test_cross_domain_link_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(
        &mock_server,
        "/",
        page("Home", &["/about", "https://other.com/x"]),
    )
    .await;
    mount(&mock_server, "/about", ResponseTemplate::new(404)).await;

    let (report, sink) = run_with_memory_sink(&base_url, 1, 5).await;

    assert_eq!(sink.urls(), vec![base_url.clone()]);
    assert_eq!(report.statistics.links_discovered, 2);
    assert_eq!(report.statistics.links_queued, 1);
    assert_eq!(report.statistics.count(PageOutcome::TransportError), 1);

    let requested: Vec<String> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(requested, vec!["/", "/about"]);
}

#[tokio::test]
async fn test_timeout_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(&mock_server, "/", page("Home", &["/about", "/contact"])).await;
    mount(
        &mock_server,
        "/about",
        page("About", &[]).set_delay(Duration::from_secs(3)),
    )
    .await;
    mount(&mock_server, "/contact", page("Contact", &[])).await;

    let (report, sink) = run_with_memory_sink(&base_url, 1, 1).await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(
        sink.urls(),
        vec![base_url.clone(), format!("{}/contact", base_url)]
    );
    assert_eq!(report.records_saved, 2);
    assert_eq!(report.statistics.count(PageOutcome::Timeout), 1);
}

#[tokio::test]
async fn test_non_html_page_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(&mock_server, "/", page("Home", &["/api/status"])).await;
    mount(
        &mock_server,
        "/api/status",
        ResponseTemplate::new(200).set_body_raw(r#"{"links": ["/hidden"]}"#, "application/json"),
    )
    .await;
    mount(&mock_server, "/hidden", page("Hidden", &[])).await;

    let (report, sink) = run_with_memory_sink(&base_url, 1, 5).await;

    assert_eq!(sink.urls(), vec![base_url]);
    assert_eq!(report.statistics.count(PageOutcome::NotHtml), 1);
    assert_eq!(report.statistics.pages_visited(), 2);
}

#[tokio::test]
async fn test_no_results_leaves_output_untouched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(
        &mock_server,
        "/",
        ResponseTemplate::new(200).set_body_raw("plain text", "text/plain"),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("pages.csv");
    let config = create_test_config(&base_url, output.clone(), 1, 5);
    let backend = plain_backend(&config);

    let report = Coordinator::new(
        config,
        backend,
        Box::new(CsvSink::new(&output)),
        CancellationToken::new(),
    )
    .run()
    .await
    .expect("crawl failed");

    assert_eq!(report.records_saved, 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_interrupt_saves_collected_records() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(&mock_server, "/", page("Home", &["/a", "/b", "/slow", "/never"])).await;
    mount(&mock_server, "/a", page("A", &[])).await;
    mount(&mock_server, "/b", page("B", &[])).await;
    mount(
        &mock_server,
        "/slow",
        page("Slow", &[]).set_delay(Duration::from_secs(30)),
    )
    .await;
    mount(&mock_server, "/never", page("Never", &[])).await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("pages.csv");
    let config = create_test_config(&base_url, output.clone(), 1, 60);
    let backend = plain_backend(&config);
    let cancel = CancellationToken::new();

    let crawl = Coordinator::new(
        config,
        backend,
        Box::new(CsvSink::new(&output)),
        cancel.clone(),
    )
    .run();

    // Cancel once the slow page is in flight
    let watch = async {
        loop {
            let requests = mock_server.received_requests().await.unwrap_or_default();
            if requests.iter().any(|r| r.url.path() == "/slow") {
                cancel.cancel();
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };

    let started = std::time::Instant::now();
    let (report, _) = tokio::join!(crawl, watch);
    let report = report.expect("interrupted crawl should still succeed");

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(report.state, RunState::Interrupted);
    assert_eq!(report.records_saved, 3);
    assert_eq!(report.statistics.count(PageOutcome::Abandoned), 1);

    let rows = read_csv_rows(&output);
    let titles: Vec<&str> = rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(titles, vec!["Home", "A", "B"]);
}

#[tokio::test]
async fn test_cancel_before_start_writes_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount(&mock_server, "/", page("Home", &[])).await;

    let config = create_test_config(&base_url, PathBuf::from("unused.csv"), 1, 5);
    let backend = plain_backend(&config);
    let sink = MemorySink::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = Coordinator::new(config, backend, Box::new(sink.clone()), cancel)
        .run()
        .await
        .expect("crawl failed");

    assert_eq!(report.state, RunState::Interrupted);
    assert_eq!(report.records_saved, 0);
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_workers_visit_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let pages: Vec<String> = (0..12).map(|i| format!("/p{}", i)).collect();
    let mut all_links: Vec<&str> = pages.iter().map(String::as_str).collect();
    all_links.push("/");
    all_links.push("https://elsewhere.test/p1");

    mount(&mock_server, "/", page("Home", &all_links)).await;
    for (i, route) in pages.iter().enumerate() {
        mount(&mock_server, route, page(&format!("P{}", i), &all_links)).await;
    }

    let (report, sink) = run_with_memory_sink(&base_url, 4, 5).await;

    let urls = sink.urls();
    let unique: HashSet<&String> = urls.iter().collect();
    assert_eq!(urls.len(), 13);
    assert_eq!(unique.len(), 13);
    assert!(urls.iter().all(|u| u.starts_with(&base_url)));
    assert_eq!(sink.calls(), 1);
    assert_eq!(report.state, RunState::Done);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 13);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(&mock_server, "/", page("Home", &["/start"])).await;
    mount(
        &mock_server,
        "/start",
        ResponseTemplate::new(301).insert_header("Location", "/docs/index"),
    )
    .await;
    mount(&mock_server, "/docs/index", page("Docs", &["next"])).await;
    mount(&mock_server, "/docs/next", page("Next", &[])).await;

    let (_, sink) = run_with_memory_sink(&base_url, 1, 5).await;

    assert_eq!(
        sink.urls(),
        vec![
            base_url.clone(),
            format!("{}/start", base_url),
            format!("{}/docs/next", base_url),
        ]
    );
}

#[tokio::test]
async fn test_sink_failure_is_reported() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount(&mock_server, "/", page("Home", &[])).await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("missing-dir").join("pages.csv");
    let config = create_test_config(&base_url, output.clone(), 1, 5);
    let backend = plain_backend(&config);

    let result = Coordinator::new(
        config,
        backend,
        Box::new(CsvSink::new(&output)),
        CancellationToken::new(),
    )
    .run()
    .await;

    assert!(matches!(result, Err(LedgerError::Output(_))));
}

#[tokio::test]
async fn test_records_keep_visit_order_across_workers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // /slow is dequeued before /fast but finishes after it
    mount(&mock_server, "/", page("Home", &["/slow", "/fast"])).await;
    mount(
        &mock_server,
        "/slow",
        page("Slow", &[]).set_delay(Duration::from_millis(800)),
    )
    .await;
    mount(&mock_server, "/fast", page("Fast", &[])).await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("pages.csv");
    let config = create_test_config(&base_url, output.clone(), 2, 5);
    let backend = plain_backend(&config);

    let report = Coordinator::new(
        config,
        backend,
        Box::new(CsvSink::new(&output)),
        CancellationToken::new(),
    )
    .run()
    .await
    .expect("crawl failed");

    assert_eq!(report.records_saved, 3);

    let rows = read_csv_rows(&output);
    let titles: Vec<&str> = rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(titles, vec!["Home", "Slow", "Fast"]);
}

#[tokio::test]
async fn test_delay_applies_to_pages_and_errors_but_not_skips() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(
        &mock_server,
        "/",
        page("Home", &["/a", "/data1", "/data2", "/data3", "/missing", "/b"]),
    )
    .await;
    mount(&mock_server, "/a", page("A", &[])).await;
    for route in ["/data1", "/data2", "/data3"] {
        mount(
            &mock_server,
            route,
            ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
        )
        .await;
    }
    mount(&mock_server, "/missing", ResponseTemplate::new(404)).await;
    mount(&mock_server, "/b", page("B", &[])).await;

    let mut settings = Settings::default();
    settings.crawler.delay_seconds = Some(0.5);
    settings.crawler.concurrency = 1;
    settings.fetch.timeout_seconds = 5;
    let config = CrawlConfig::from_settings(&base_url, Some(PathBuf::from("unused.csv")), &settings)
        .expect("valid test config");
    let backend = plain_backend(&config);
    let sink = MemorySink::default();

    let started = std::time::Instant::now();
    let report = Coordinator::new(config, backend, Box::new(sink.clone()), CancellationToken::new())
        .run()
        .await
        .expect("crawl failed");
    let elapsed = started.elapsed();

    assert_eq!(report.statistics.pages_visited(), 7);
    assert_eq!(report.statistics.count(PageOutcome::NotHtml), 3);
    assert_eq!(report.statistics.count(PageOutcome::TransportError), 1);
    assert_eq!(sink.urls().len(), 3);

    // Paced gaps follow Home, A and the 404; the JSON skips add none
    assert!(
        elapsed >= Duration::from_millis(1500),
        "too fast: {:?}",
        elapsed
    );
    assert!(
        elapsed < Duration::from_millis(1900),
        "non-HTML skips were paced: {:?}",
        elapsed
    );
}
