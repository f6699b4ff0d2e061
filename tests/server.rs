//! Live server tests: the demo application over a real socket.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::{header, redirect, Client, StatusCode};
use tokio::net::TcpListener;

use mvc_router::lifecycle::Shutdown;
use mvc_router::{demo, AppConfig, HttpServer, Resolver};

async fn start_demo() -> (SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let table = demo::routes().unwrap();
    let registry = demo::registry().unwrap();
    let app = Resolver::new(&table, &registry).resolve().unwrap();
    let server = HttpServer::new(AppConfig::default(), app);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let stop = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.run(listener, stop).await.unwrap();
    });
    (addr, shutdown, handle)
}

fn client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

async fn submit(client: &Client, url: String, body: &'static str) -> reqwest::Response {
    client
        .post(url)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (addr, shutdown, handle) = start_demo().await;

    let res = client()
        .get(format!("http://{}/api/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["x-powered-by"], "mvc-router");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_message_lifecycle_through_forms() {
    let (addr, shutdown, handle) = start_demo().await;
    let client = client();
    let base = format!("http://{}", addr);

    let res = submit(&client, format!("{}/messages", base), "title=first+post").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/messages/1");

    let page = client.get(format!("{}/messages/1/edit", base)).send().await.unwrap();
    let html = page.text().await.unwrap();
    assert!(html.contains("<input type='hidden' name='_method' value=PUT>"));

    let res = submit(&client, format!("{}/messages/1", base), "_method=put&title=edited").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let res = client.get(format!("{}/messages/1", base)).send().await.unwrap();
    assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
    assert!(res.text().await.unwrap().contains("<h1>edited</h1>"));

    let res = submit(&client, format!("{}/messages/1", base), "_method=delete").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/messages");

    let res = client.get(format!("{}/messages/1", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    drop(client);
    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_plain_post_to_member_is_rejected() {
    let (addr, shutdown, handle) = start_demo().await;

    let res = submit(&client(), format!("http://{}/messages/1", addr), "title=x").await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    shutdown.trigger();
    handle.await.unwrap();
}
