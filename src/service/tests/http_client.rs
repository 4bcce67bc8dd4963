//! Tests for the HTTP client against a local one-shot server

use crate::service::api::{HttpProductService, ProductService, ServiceError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serve exactly one response, returning the raw request that was received
async fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn client(base_url: &str) -> HttpProductService {
    HttpProductService::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_lookup_success() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"barcode":"3017620422003","product_name":"Nutella","brands":"Ferrero","eco-score":22,"overall_sustainability_score":38.05}"#,
    )
    .await;

    let record = client(&url).lookup_barcode("3017620422003").await.unwrap();
    assert_eq!(record.display_name(), "Nutella");
    assert_eq!(record.overall_sustainability_score, Some(38.05));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/barcode HTTP/1.1"), "{}", request);
    assert!(request.contains(r#"{"barcode":"3017620422003"}"#), "{}", request);
    assert!(request.to_lowercase().contains("content-type: application/json"));
}

#[tokio::test]
async fn test_lookup_non_success_status_is_api_error() {
    let (url, server) = serve_once("404 Not Found", r#"{"Error":"Product not found"}"#).await;

    let err = client(&url).lookup_barcode("0000").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Api {
            status: Some(404),
            message: "API Error: 404 Not Found".to_string()
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_lookup_error_field_with_ok_status() {
    let (url, server) = serve_once("200 OK", r#"{"error":"Failed to reach OpenFoodFacts"}"#).await;

    let err = client(&url).lookup_barcode("0000").await.unwrap_err();
    assert!(matches!(err, ServiceError::Api { status: None, ref message } if message == "Failed to reach OpenFoodFacts"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_lookup_without_identifying_fields_is_not_found() {
    let (url, server) = serve_once("200 OK", r#"{"barcode":"0000","eco-score":10}"#).await;

    let err = client(&url).lookup_barcode("0000").await.unwrap_err();
    assert!(matches!(err, ServiceError::ProductNotFound { ref barcode } if barcode == "0000"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_lookup_non_json_body_is_api_error() {
    let (url, server) = serve_once("200 OK", "<html>maintenance</html>").await;

    let err = client(&url).lookup_barcode("0000").await.unwrap_err();
    assert!(matches!(err, ServiceError::Api { status: Some(200), .. }));
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .lookup_barcode("0000")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Network { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_suggest_alternatives() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"suggestions":[{"name":"Refill jar","brand":"Loop","reason":"Reusable glass"}]}"#,
    )
    .await;

    let suggestions = client(&url).suggest_alternatives("Nutella").await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].name, "Refill jar");
    assert_eq!(suggestions[0].image, None);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/suggest_alternatives HTTP/1.1"));
    assert!(request.contains(r#"{"product_name":"Nutella"}"#));
}

#[tokio::test]
async fn test_suggest_alternatives_failure_status() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"suggestions":[]}"#).await;

    let err = client(&url).suggest_alternatives("Nutella").await.unwrap_err();
    assert!(matches!(err, ServiceError::Api { status: Some(500), .. }));
    server.await.unwrap();
}

#[test]
fn test_base_url_trailing_slash_is_trimmed() {
    let service = HttpProductService::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
    assert_eq!(service.base_url(), "http://127.0.0.1:5000");
}
