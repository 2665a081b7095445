//! End-to-end forwarding through a running proxy.

use reqwest::StatusCode;

use cors_proxy::ProxyConfig;

mod common;

fn assert_cors(res: &reqwest::Response) {
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, OPTIONS, PUT, DELETE"
    );
    assert_eq!(headers["access-control-allow-headers"], "*");
}

#[tokio::test]
async fn test_relays_destination_response() {
    let backend = common::start_mock_backend(
        "HTTP/1.1 201 Created\r\nX-Custom: v1\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
    )
    .await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(proxy.forward_url(&format!("http://{}/", backend)))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_cors(&res);
    assert_eq!(res.headers()["x-custom"], "v1");
    assert_eq!(res.bytes().await.unwrap(), "hello");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_strips_hop_by_hop_response_headers() {
    let backend = common::start_mock_backend(
        "HTTP/1.1 200 OK\r\n\
         Connection: close, X-Foo\r\n\
         X-Foo: bar\r\n\
         Keep-Alive: timeout=5\r\n\
         Proxy-Authenticate: Basic\r\n\
         Trailers: X-Sum\r\n\
         X-Kept: yes\r\n\
         Content-Length: 2\r\n\r\nok",
    )
    .await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(proxy.forward_url(&format!("http://{}/", backend)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    for name in ["x-foo", "keep-alive", "proxy-authenticate", "trailers"] {
        assert!(res.headers().get(name).is_none(), "{name} leaked");
    }
    assert_eq!(res.headers()["x-kept"], "yes");
    assert_cors(&res);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_request_headers_round_trip_through_echo() {
    let backend = common::start_echo_backend().await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(proxy.forward_url(&format!("http://{}/echo", backend)))
        .header("X-Multi", "1")
        .header("X-Multi", "2")
        .header("X-Token", "abc")
        .header("Connection", "X-Private")
        .header("X-Private", "hop-only")
        .header("Proxy-Authorization", "Basic abc")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_cors(&res);
    let multi: Vec<_> = res.headers().get_all("x-multi").iter().collect();
    assert_eq!(multi, ["1", "2"]);
    assert_eq!(res.headers()["x-token"], "abc");
    assert!(res.headers().get("x-private").is_none());
    assert!(res.headers().get("proxy-authorization").is_none());

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_forwards_method_path_and_body() {
    let backend = common::start_programmable_backend(|request| {
        let body = format!("{}|{}", request.request_line, String::from_utf8_lossy(&request.body));
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .into_bytes()
    })
    .await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .put(proxy.forward_url(&format!("http://{}/items/7?full=1", backend)))
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.text().await.unwrap(),
        "PUT /items/7?full=1 HTTP/1.1|payload"
    );

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_streams_large_body_verbatim() {
    let payload: Vec<u8> = (0..(1 << 20)).map(|i: u32| (i % 251) as u8).collect();
    let expected = payload.clone();
    let backend = common::start_programmable_backend(move |_| {
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            payload.len()
        )
        .into_bytes();
        response.extend_from_slice(&payload);
        response
    })
    .await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(proxy.forward_url(&format!("http://{}/blob", backend)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
    let body = res.bytes().await.unwrap();
    assert_eq!(body.len(), expected.len());
    assert!(body[..] == expected[..]);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_preflight_answered_locally() {
    let proxy = common::start_proxy(ProxyConfig::default()).await;
    let closed = common::closed_addr().await;

    let res = common::client()
        .request(
            reqwest::Method::OPTIONS,
            proxy.forward_url(&format!("http://{}/", closed)),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_cors(&res);
    assert!(res.bytes().await.unwrap().is_empty());

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_follows_redirects_by_default() {
    let target = common::start_mock_backend(
        "HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\nlanded",
    )
    .await;
    let location = format!("http://{}/final", target);
    let origin = common::start_programmable_backend(move |_| {
        format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            location
        )
        .into_bytes()
    })
    .await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(proxy.forward_url(&format!("http://{}/start", origin)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "landed");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_redirects_passed_through_when_disabled() {
    let origin = common::start_mock_backend(
        "HTTP/1.1 302 Found\r\nLocation: http://elsewhere.invalid/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    )
    .await;
    let mut config = ProxyConfig::default();
    config.upstream.max_redirects = 0;
    let proxy = common::start_proxy(config).await;

    let res = common::client()
        .get(proxy.forward_url(&format!("http://{}/start", origin)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "http://elsewhere.invalid/");
    assert_cors(&res);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_any_path_is_forwarded() {
    let backend = common::start_mock_backend(
        "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
    )
    .await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let mut url = reqwest::Url::parse(&format!("http://{}/some/path", proxy.addr)).unwrap();
    url.query_pairs_mut()
        .append_pair("url", &format!("http://{}/", backend));
    let res = common::client().get(url).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    proxy.shutdown.trigger();
}
