//! HttpImageSource against a one-shot local HTTP server

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use mrw_images::{FetchError, HttpImageSource, Image, ImageSource};

/// Serve a single canned response, returning the base URL and the request line
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let request = String::from_utf8_lossy(&request);
        request.lines().next().unwrap_or_default().to_string()
    });

    (format!("http://{addr}"), handle)
}

/// Direct connections only, whatever proxy the environment sets
fn source(base: &str) -> HttpImageSource {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpImageSource::with_client(client, base)
}

#[tokio::test]
async fn test_fetch_parses_image_list() {
    let body = r#"[
        {"id": "1", "url": "/uploads/a.png", "filename": "a.png", "uniqueId": "u1",
         "timestamp": "2017-03-14T09:30:00Z"},
        {"id": "2", "filename": "b.png"}
    ]"#;
    let (base, server) = serve_once("200 OK", body).await;

    let images = source(&base).fetch_images().await.unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].id, "1");
    assert_eq!(images[0].unique_id, "u1");
    assert!(images[0].timestamp.is_some());
    assert_eq!(images[1], Image::new("2").with_filename("b.png"));

    assert_eq!(server.await.unwrap(), "GET /api/images HTTP/1.1");
}

#[tokio::test]
async fn test_fetch_accepts_database_field_names() {
    let body = r#"[{"_id": "58c7a1f0", "uniqueid": "abc123", "url": "/uploads/x.jpg"}]"#;
    let (base, _server) = serve_once("200 OK", body).await;

    let images = source(&base).fetch_images().await.unwrap();

    assert_eq!(images[0].id, "58c7a1f0");
    assert_eq!(images[0].unique_id, "abc123");
    assert_eq!(images[0].label(), "/uploads/x.jpg");
}

#[tokio::test]
async fn test_empty_list() {
    let (base, _server) = serve_once("200 OK", "[]").await;
    let images = source(&base).fetch_images().await.unwrap();
    assert!(images.is_empty());
}

#[tokio::test]
async fn test_server_error_is_status() {
    let (base, _server) = serve_once("500 Internal Server Error", r#"{"error":"db"}"#).await;
    let err = source(&base).fetch_images().await.unwrap_err();
    assert_eq!(err, FetchError::Status(500));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let (base, _server) = serve_once("200 OK", "<html>not json</html>").await;
    let err = source(&base).fetch_images().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source(&format!("http://{addr}"))
        .fetch_images()
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "{err:?}");
}
