mod common;

use reqwest::StatusCode;
use session_fetch::{Error, MultipartForm, Request};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn multipart_upload_is_resent_with_boundary_after_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/me/avatar"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/me/avatar"))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"avatar":"a.png"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"token":"T2"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server, Some("T1"));
    let form = MultipartForm::new().file("file", "a.png", "image/png", vec![0x89, 0x50, 0x4e]);
    let resp = client
        .request(&Request::post("/users/me/avatar").multipart(form))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let uploads: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/users/me/avatar")
        .collect();
    assert_eq!(uploads.len(), 2);
    for upload in uploads {
        let content_type = upload.headers.get("content-type").unwrap().to_str().unwrap();
        assert!(
            content_type.starts_with("multipart/form-data; boundary="),
            "unexpected content type {content_type}"
        );
        assert!(String::from_utf8_lossy(&upload.body).contains("a.png"));
    }
}

#[tokio::test]
async fn invalid_part_mime_is_a_config_error() {
    let server = MockServer::start().await;

    let client = common::client(&server, Some("T1"));
    let form = MultipartForm::new().file("file", "a.bin", "not a mime", vec![0x00]);
    let err = client
        .request(&Request::post("/users/me/avatar").multipart(form))
        .await
        .unwrap_err();

    assert!(!err.is_network(), "unexpected network error: {err}");
    match err {
        Error::Config(msg) => assert!(msg.contains("not a mime"), "{msg}"),
        other => panic!("expected Error::Config, got {other}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}
