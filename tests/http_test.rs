//! Racing real HTTP delivery paths against a mock server

use feedrace::config::{Config, HumanDuration, PathConfig};
use feedrace::race::{CancelHandle, FetchError, RaceFetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel/></rss>";
const TARGET: &str = "https://origin.example/feed.xml";

fn config_for(server: &MockServer, routes: &[&str], deadline: Duration) -> Config {
    let mut config = Config::default();
    config.race.deadline = HumanDuration(deadline);
    config.race.user_agent = "feedrace-test/1.0".to_string();
    config.paths = routes
        .iter()
        .map(|route| {
            PathConfig::new(
                route.trim_start_matches('/'),
                format!("{}{}?url={{url_encoded}}", server.uri(), route),
            )
        })
        .collect();
    config
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fastest_successful_path_wins() {
    let server = MockServer::start().await;
    mount(&server, "/missing", ResponseTemplate::new(404)).await;
    mount(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(3))
            .set_body_string("slow body"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .and(query_param("url", TARGET))
        .and(header("user-agent", "feedrace-test/1.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_string(FEED),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &["/missing", "/slow", "/relay"], Duration::from_secs(10));
    let fetcher = RaceFetcher::from_config(&config).unwrap();

    let started = std::time::Instant::now();
    let success = fetcher.fetch_detailed(TARGET, None, None).await.unwrap();

    assert_eq!(success.body, FEED);
    assert_eq!(success.won_by_index, 2);
    assert_eq!(success.path_name, "relay");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_every_path_erroring_is_all_failed() {
    let server = MockServer::start().await;
    mount(&server, "/a", ResponseTemplate::new(404)).await;
    mount(&server, "/b", ResponseTemplate::new(500)).await;
    mount(&server, "/c", ResponseTemplate::new(403)).await;

    let config = config_for(&server, &["/a", "/b", "/c"], Duration::from_secs(10));
    let fetcher = RaceFetcher::from_config(&config).unwrap();

    let err = fetcher.fetch(TARGET, None, None).await.unwrap_err();

    assert_eq!(err, FetchError::AllPathsFailed { attempts: 3 });
    assert_eq!(fetcher.metrics().snapshot().attempts_failed, 3);
}

#[tokio::test]
async fn test_unreachable_path_does_not_block_success() {
    let server = MockServer::start().await;
    mount(&server, "/ok", ResponseTemplate::new(200).set_body_string(FEED)).await;

    let mut config = config_for(&server, &["/ok"], Duration::from_secs(10));
    // Nothing listens on port 9 of localhost
    config
        .paths
        .insert(0, PathConfig::new("dead", "http://127.0.0.1:9/?url={url_encoded}"));
    let fetcher = RaceFetcher::from_config(&config).unwrap();

    let success = fetcher.fetch_detailed(TARGET, None, None).await.unwrap();

    assert_eq!(success.won_by_index, 1);
    assert_eq!(success.body, FEED);
}

#[tokio::test]
async fn test_slow_paths_hit_the_deadline() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(5))
            .set_body_string(FEED),
    )
    .await;

    let deadline = Duration::from_millis(200);
    let config = config_for(&server, &["/slow"], deadline);
    let fetcher = RaceFetcher::from_config(&config).unwrap();

    let started = std::time::Instant::now();
    let err = fetcher.fetch(TARGET, None, None).await.unwrap_err();

    assert_eq!(err, FetchError::Timeout { after: deadline });
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_external_cancel_stops_http_race() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(5))
            .set_body_string(FEED),
    )
    .await;

    let config = config_for(&server, &["/slow"], Duration::from_secs(10));
    let fetcher = RaceFetcher::from_config(&config).unwrap();
    let cancel = CancelHandle::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = fetcher.fetch(TARGET, Some(&cancel), None).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(cancel.listener_count(), 0);
}
