//! End-to-end dispatch tests: real backends, real proxy, real client.

use std::time::{Duration, Instant};

use reqwest::StatusCode;

mod common;

use common::{client, config_for, http, start_echo_backend, start_proxy, start_slow_backend, unreachable_addr};

fn backend_of(body: &str) -> &str {
    body.split('|').next().unwrap_or("")
}

#[tokio::test]
async fn two_backends_alternate() {
    let s1 = start_echo_backend("s1").await;
    let s2 = start_echo_backend("s2").await;
    let proxy = start_proxy(config_for(vec![http(s1), http(s2)])).await;
    let client = client();

    let mut seen = Vec::new();
    for _ in 0..4 {
        let res = client.get(proxy.url("/")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.text().await.unwrap();
        seen.push(backend_of(&body).to_string());
    }
    assert_eq!(seen, vec!["s1", "s2", "s1", "s2"]);

    proxy.stop();
}

#[tokio::test]
async fn single_backend_gets_everything() {
    let s1 = start_echo_backend("only").await;
    let proxy = start_proxy(config_for(vec![http(s1)])).await;
    let client = client();

    for path in ["/", "/a", "/a/b/c"] {
        let body = client.get(proxy.url(path)).send().await.unwrap().text().await.unwrap();
        assert_eq!(backend_of(&body), "only");
    }

    proxy.stop();
}

#[tokio::test]
async fn request_and_response_pass_through() {
    let backend = start_echo_backend("echo").await;
    let proxy = start_proxy(config_for(vec![http(backend)])).await;

    let res = client()
        .post(proxy.url("/orders/42?expand=items&sort=desc"))
        .header("x-custom", "custom-value")
        .header("x-reply-status", "201")
        .body("{\"qty\":3}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let headers = res.headers().clone();
    assert_eq!(headers["x-backend"], "echo");
    assert_eq!(headers["x-seen-custom"], "custom-value");
    assert_eq!(headers["x-seen-host"], backend.to_string().as_str());
    assert_eq!(headers["x-seen-forwarded-for"], "127.0.0.1");

    let body = res.text().await.unwrap();
    assert_eq!(body, "echo|POST|/orders/42?expand=items&sort=desc|{\"qty\":3}");

    proxy.stop();
}

#[tokio::test]
async fn backend_base_path_prefixes_requests() {
    let backend = start_echo_backend("prefixed").await;
    let proxy = start_proxy(config_for(vec![format!("{}/api", http(backend))])).await;

    let body = client()
        .delete(proxy.url("/users/7?hard=true"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "prefixed|DELETE|/api/users/7?hard=true|");

    proxy.stop();
}

#[tokio::test]
async fn unreachable_backend_yields_bad_gateway() {
    let dead = unreachable_addr().await;
    let proxy = start_proxy(config_for(vec![http(dead)])).await;
    let client = client();

    for _ in 0..2 {
        let res = client.get(proxy.url("/")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    proxy.stop();
}

#[tokio::test]
async fn malformed_backend_yields_server_error() {
    let proxy = start_proxy(config_for(vec!["http//missing-colon:8001".to_string()])).await;
    let client = client();

    for _ in 0..3 {
        let res = client.get(proxy.url("/anything")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.text().await.unwrap(), "Server error");
    }

    proxy.stop();
}

#[tokio::test]
async fn failed_backend_does_not_affect_healthy_one() {
    let dead = unreachable_addr().await;
    let alive = start_echo_backend("alive").await;
    let proxy = start_proxy(config_for(vec![http(dead), http(alive)])).await;
    let client = client();

    let first = tokio::spawn({
        let client = client.clone();
        let url = proxy.url("/");
        async move { client.get(url).send().await.unwrap().status() }
    });
    let second = tokio::spawn({
        let client = client.clone();
        let url = proxy.url("/");
        async move { client.get(url).send().await.unwrap().status() }
    });

    let mut statuses = vec![first.await.unwrap(), second.await.unwrap()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::BAD_GATEWAY]);

    // The failure changed nothing: the rotation keeps alternating.
    let statuses: Vec<StatusCode> = {
        let mut out = Vec::new();
        for _ in 0..4 {
            out.push(client.get(proxy.url("/")).send().await.unwrap().status());
        }
        out
    };
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 2);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_GATEWAY).count(), 2);

    proxy.stop();
}

#[tokio::test]
async fn slow_backend_does_not_block_other_requests() {
    let slow = start_slow_backend("slow", Duration::from_secs(2)).await;
    let fast = start_echo_backend("fast").await;
    let proxy = start_proxy(config_for(vec![http(slow), http(fast)])).await;
    let client = client();

    let pending = tokio::spawn({
        let client = client.clone();
        let url = proxy.url("/");
        async move { client.get(url).send().await.unwrap().text().await.unwrap() }
    });

    // Give the first request time to claim the slow backend.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    let body = client.get(proxy.url("/")).send().await.unwrap().text().await.unwrap();
    assert_eq!(backend_of(&body), "fast");
    assert!(started.elapsed() < Duration::from_secs(1));

    assert_eq!(backend_of(&pending.await.unwrap()), "slow");

    proxy.stop();
}

#[tokio::test]
async fn request_timeout_yields_gateway_timeout() {
    let slow = start_slow_backend("slow", Duration::from_secs(5)).await;
    let mut config = config_for(vec![http(slow)]);
    config.timeouts.request_secs = Some(1);
    let proxy = start_proxy(config).await;

    let res = client().get(proxy.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);

    proxy.stop();
}
