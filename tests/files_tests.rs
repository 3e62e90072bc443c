#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Upload and download tests for the Request Gateway.

mod common;

use dumb_api_client::{ApiClient, ClientConfig};
use futures_util::StreamExt;

use common::{MockHttpServer, MockReply, RecordedRequest};

fn client_for(server: &MockHttpServer) -> ApiClient {
    ApiClient::new(ClientConfig::new(&server.base_url)).unwrap()
}

/// Case-insensitive search in a multipart body.
fn contains(body: &[u8], needle: &str) -> bool {
    String::from_utf8_lossy(body)
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

fn assert_multipart(req: &RecordedRequest) {
    let content_type = req.header("content-type").unwrap();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "{content_type}"
    );
}

// ════════════════════════════════════════════════════════════════════
// Uploads
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn upload_file_reads_path_and_sends_file_part() {
    let dir = std::env::temp_dir().join(format!("dumb-api-client-upload-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("notes.txt");
    tokio::fs::write(&path, b"hello upload").await.unwrap();

    let server = MockHttpServer::always(MockReply::json(
        200,
        r#"{"file":{"id":"f1","filename":"1700-notes.txt","originalName":"notes.txt",
                    "mimetype":"text/plain","size":12,"downloadUrl":"/api/download/1700-notes.txt"}}"#,
    ))
    .await;

    let resp = client_for(&server).upload_file(&path).await;
    let file = resp.into_result().unwrap().file.unwrap();
    assert_eq!(file.id, "f1");
    assert_eq!(file.original_name, "notes.txt");

    let req = server.single_request();
    assert_eq!((req.method.as_str(), req.route()), ("POST", "/api/upload/file"));
    assert_multipart(&req);
    assert!(contains(&req.body, r#"name="file"; filename="notes.txt""#));
    assert!(contains(&req.body, "hello upload"));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn upload_of_missing_file_fails_without_a_request() {
    let server = MockHttpServer::always(MockReply::json(200, "{}")).await;
    let client = client_for(&server);

    let file = client.upload_file("/no/such/dir/missing.bin").await;
    let avatar = client.upload_avatar("/no/such/dir/me.png").await;

    assert!(file.error().unwrap().contains("missing.bin"));
    assert!(!avatar.is_success());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn avatar_bytes_use_avatar_part() {
    let server = MockHttpServer::always(MockReply::json(
        200,
        r#"{"filename":"alice.png","avatarUrl":"/api/user/alice/avatar"}"#,
    ))
    .await;

    let resp = client_for(&server)
        .upload_avatar_bytes("me.png", vec![0x89, b'P', b'N', b'G'])
        .await;
    let data = resp.into_result().unwrap();
    assert_eq!(data.filename, "alice.png");
    assert_eq!(data.avatar_url.as_deref(), Some("/api/user/alice/avatar"));

    let req = server.single_request();
    assert_eq!(req.route(), "/api/upload/avatar");
    assert_multipart(&req);
    assert!(contains(&req.body, r#"name="avatar"; filename="me.png""#));
}

#[tokio::test]
async fn voice_message_is_announced_then_uploaded_as_ogg() {
    let server = MockHttpServer::start(|req| match req.route() {
        "/api/voice/upload" => MockReply::json(200, r#"{"voiceId":"v-42"}"#),
        _ => MockReply::json(200, r#"{"success":true}"#),
    })
    .await;
    let client = client_for(&server);

    let announced = client.upload_voice_message("general", 2.5).await;
    let voice_id = announced.into_result().unwrap().voice_id;
    assert_eq!(voice_id, "v-42");

    let uploaded = client.upload_voice_file(&voice_id, b"OggS....".to_vec()).await;
    assert!(uploaded.is_success());

    let requests = server.requests();
    assert_eq!(
        requests[0].json(),
        serde_json::json!({ "channel": "general", "duration": 2.5 })
    );

    let upload = &requests[1];
    assert_eq!(upload.route(), "/api/upload/voice/v-42");
    assert_multipart(upload);
    assert!(contains(&upload.body, r#"name="voice"; filename="voice.ogg""#));
    assert!(contains(&upload.body, "Content-Type: audio/ogg"));
    assert!(contains(&upload.body, "OggS...."));
}

#[tokio::test]
async fn voice_id_may_arrive_as_a_number() {
    let server = MockHttpServer::always(MockReply::json(200, r#"{"voiceId":17}"#)).await;
    let resp = client_for(&server).upload_voice_message("general", 1.0).await;
    assert_eq!(resp.into_result().unwrap().voice_id, "17");
}

#[tokio::test]
async fn rejected_upload_reports_server_error() {
    let server =
        MockHttpServer::always(MockReply::json(413, r#"{"error":"File too large"}"#)).await;
    let resp = client_for(&server)
        .upload_file_bytes("big.bin", vec![0; 1024])
        .await;
    assert_eq!(resp.error(), Some("File too large"));
}

// ════════════════════════════════════════════════════════════════════
// Downloads
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn download_file_returns_bytes() {
    let payload: Vec<u8> = (0..=255).collect();
    let server = MockHttpServer::always(MockReply::bytes(200, payload.clone())).await;

    let bytes = client_for(&server).download_file("1700-cat.png").await;
    assert_eq!(bytes, Some(payload));
    assert_eq!(server.single_request().path, "/api/download/1700-cat.png");
}

#[tokio::test]
async fn download_on_404_is_none() {
    let server = MockHttpServer::always(MockReply::json(404, r#"{"error":"File not found"}"#)).await;
    let client = client_for(&server);

    assert!(client.download_file("gone.png").await.is_none());
    assert!(client.download_file_stream("gone.png").await.is_none());
    assert!(client.get_user_avatar("nobody").await.is_none());
}

#[tokio::test]
async fn download_from_unreachable_host_is_none() {
    let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();
    assert!(client.download_file("x").await.is_none());
}

#[tokio::test]
async fn download_stream_yields_whole_body() {
    let payload = vec![7u8; 64 * 1024];
    let server = MockHttpServer::always(MockReply::bytes(200, payload.clone())).await;

    let client = client_for(&server);
    let stream = client.download_file_stream("big.bin").await.unwrap();
    let mut stream = Box::pin(stream);
    let mut received = Vec::new();
    while let Some(chunk) = stream.next().await {
        received.extend(chunk.unwrap());
    }
    assert_eq!(received, payload);
}

#[tokio::test]
async fn avatar_download_path() {
    let server = MockHttpServer::always(MockReply::bytes(200, vec![1, 2, 3])).await;
    let avatar = client_for(&server).get_user_avatar("alice").await;
    assert_eq!(avatar.as_deref(), Some(&[1u8, 2, 3][..]));
    assert_eq!(server.single_request().path, "/api/user/alice/avatar");
}
