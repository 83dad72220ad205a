//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl, save and notify cycle end-to-end.

use careerfind::crawler::{Coordinator, CrawlSettings, FetchSettings, HttpFetcher, RetryPolicy};
use careerfind::notify::{format_message, Notifier, TelegramNotifier};
use careerfind::output::{FileSink, OutputFormat, ResultSink, SqliteSink};
use careerfind::{CrawlError, PageResult, ResultStore};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetchSettings {
        user_agent: "CareerFindTest/1.0".to_string(),
        request_timeout: Duration::from_secs(5),
        proxy_address: None,
    })
    .expect("Failed to build fetcher")
}

fn settings(max_retries: u32) -> CrawlSettings {
    CrawlSettings {
        rate_limit: Duration::from_millis(20),
        retry: RetryPolicy::new(max_retries).with_base_delay(Duration::from_millis(5)),
        verbose: true,
    }
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_collects_emails() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/careers",
        r#"<html><body>
            <h1>Join us</h1>
            <p>Send your CV to jobs@acme.test or hr@acme.test.</p>
            <a href="mailto:talent@acme.test?subject=Application">Apply</a>
            <p>Again: jobs@acme.test</p>
        </body></html>"#,
    )
    .await;
    mount_html(
        &server,
        "/contact",
        "<html><body><footer>contact@globex.test</footer></body></html>",
    )
    .await;
    mount_html(&server, "/about", "<html><body><p>No addresses here.</p></body></html>").await;

    let pages: Vec<String> = ["/careers", "/contact", "/about"]
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect();

    let store = ResultStore::new();
    let coordinator = Coordinator::new(fetcher(), store.clone(), settings(1));
    coordinator
        .crawl(&CancellationToken::new(), &pages)
        .await
        .expect("Crawl failed");

    let results = store.snapshot();
    assert_eq!(results.len(), 2, "pages without emails must not produce results");

    let careers = results
        .iter()
        .find(|r| r.location == pages[0])
        .expect("careers page result");
    let mut emails = careers.emails.clone();
    emails.sort();
    assert_eq!(emails, vec!["hr@acme.test", "jobs@acme.test", "talent@acme.test"]);
    assert_eq!(careers.source, pages[0]);

    let contact = results.iter().find(|r| r.location == pages[1]).unwrap();
    assert_eq!(contact.emails, vec!["contact@globex.test".to_string()]);
}

#[tokio::test]
async fn test_failing_page_is_retried_and_reported() {
    let server = MockServer::start().await;

    mount_html(&server, "/good", "<p>recruiting@initech.test</p>").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let pages = vec![
        format!("{}/good", server.uri()),
        format!("{}/broken", server.uri()),
    ];

    let store = ResultStore::new();
    let coordinator = Coordinator::new(fetcher(), store.clone(), settings(2));
    let err = coordinator
        .crawl(&CancellationToken::new(), &pages)
        .await
        .unwrap_err();

    match err {
        CrawlError::Aggregate(aggregate) => {
            assert_eq!(aggregate.errors.len(), 1);
            assert!(aggregate.errors[0].contains("/broken"));
            assert!(aggregate.errors[0].contains("HTTP 500"));
        }
        other => panic!("expected aggregate error, got {other:?}"),
    }

    let results = store.snapshot();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].emails, vec!["recruiting@initech.test".to_string()]);
}

#[tokio::test]
async fn test_crawl_results_saved_and_announced() {
    let server = MockServer::start().await;
    mount_html(&server, "/jobs", "<p>work@hooli.test</p><p>apply@hooli.test</p>").await;

    Mock::given(method("POST"))
        .and(path("/botTESTTOKEN/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let store = ResultStore::new();
    let coordinator = Coordinator::new(fetcher(), store.clone(), settings(0));
    coordinator
        .crawl(&CancellationToken::new(), &[format!("{}/jobs", server.uri())])
        .await
        .unwrap();
    let results: Vec<PageResult> = store.snapshot();

    let dir = TempDir::new().unwrap();

    let saved = FileSink::new(OutputFormat::Txt, dir.path())
        .persist(&results)
        .unwrap();
    let text = std::fs::read_to_string(&saved).unwrap();
    assert!(text.contains("Email: work@hooli.test\nEmail: apply@hooli.test\n---\n"));

    let database = SqliteSink::new(&dir.path().join("careerfind.db")).unwrap();
    database.persist(&results).unwrap();
    assert_eq!(database.load_results().unwrap()[0].emails, results[0].emails);

    let notifier = TelegramNotifier::new(reqwest::Client::new(), "TESTTOKEN", "12345")
        .with_api_base(server.uri());
    let message = format_message(&results);
    assert!(message.contains("- work@hooli.test\n"));
    notifier.send(&message).await.unwrap();
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x@y.test"))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let store = ResultStore::new();
    let coordinator = Coordinator::new(fetcher(), store.clone(), settings(0));
    let result = coordinator.crawl(&cancel, &[server.uri()]).await;

    assert!(matches!(result, Err(CrawlError::Cancelled)));
    assert!(store.is_empty());
}
