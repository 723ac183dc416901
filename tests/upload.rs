//! Multi-page upload protocol against a mock server.

mod common;

use std::path::Path;

use common::logged_in_client;
use serde_json::json;
use transkribus::{TranskribusError, UploadPage};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPLOAD_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
    <trpUpload><uploadId>77</uploadId><md><title>Letters</title></md></trpUpload>";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn three_pages(dir: &Path) -> Vec<UploadPage> {
    (1..=3)
        .map(|nr| {
            let img = write(dir, &format!("p{nr}.jpg"), &format!("image {nr}"));
            let xml = (nr == 1).then(|| write(dir, "p1.xml", "<PcGts/>"));
            UploadPage::new(img, xml, nr).unwrap()
        })
        .collect()
}

async fn mock_create(server: &MockServer, body: &str, expect: u64) {
    Mock::given(method("POST"))
        .and(path("/uploads"))
        .and(query_param("collId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expect)
        .mount(server)
        .await;
}

async fn mock_push(server: &MockServer, status: u16, expect: u64) {
    Mock::given(method("PUT"))
        .and(path("/uploads/77"))
        .respond_with(ResponseTemplate::new(status).set_body_string("page rejected"))
        .expect(expect)
        .mount(server)
        .await;
}

async fn mock_status(server: &MockServer, body: serde_json::Value, expect: u64) {
    Mock::given(method("GET"))
        .and(path("/uploads/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expect)
        .mount(server)
        .await;
}

async fn mock_job(server: &MockServer, body: serde_json::Value, expect: u64) {
    Mock::given(method("GET"))
        .and(path("/jobs/555"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expect)
        .mount(server)
        .await;
}

#[tokio::test]
async fn uploads_three_pages_and_returns_the_document_id() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let pages = three_pages(dir.path());

    mock_create(&server, UPLOAD_XML, 1).await;
    mock_push(&server, 200, 3).await;
    mock_status(&server, json!({ "uploadId": 77, "jobId": "555" }), 1).await;
    mock_job(&server, json!({ "jobId": "555", "docId": 42, "state": "CREATED" }), 1).await;

    let mut client = logged_in_client(&server).await;
    let mut md = serde_json::Map::new();
    md.insert("authority".into(), json!("Archive"));

    let doc_id = client
        .upload_document(7, "Letters", &pages, &md)
        .await
        .unwrap();
    assert_eq!(doc_id, 42);

    let requests = server.received_requests().await.unwrap();

    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/uploads")
        .unwrap();
    let structure: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
    assert_eq!(structure["md"]["title"], "Letters");
    assert_eq!(structure["md"]["authority"], "Archive");
    let sent = &structure["pageList"]["pages"];
    assert_eq!(sent.as_array().unwrap().len(), 3);
    assert_eq!(sent[0]["fileName"], "p1.jpg");
    assert_eq!(sent[0]["pageXmlName"], "p1.xml");
    assert_eq!(sent[0]["imgChecksum"], pages[0].image_md5());
    assert_eq!(sent[1]["pageXmlName"], serde_json::Value::Null);
    assert_eq!(sent[2]["pageNr"], 3);

    // Pages go out one by one, in the order given.
    let pushes: Vec<String> = requests
        .iter()
        .filter(|r| r.method.as_str() == "PUT")
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect();
    assert_eq!(pushes.len(), 3);
    for (i, body) in pushes.iter().enumerate() {
        assert!(body.contains("name=\"img\""), "push {i}: {body}");
        assert!(body.contains(&format!("filename=\"p{}.jpg\"", i + 1)));
        assert!(body.contains(&format!("image {}", i + 1)));
        assert!(body.contains("application/octet-stream"));
    }
    assert!(pushes[0].contains("name=\"xml\""));
    assert!(pushes[0].contains("filename=\"p1.xml\""));
    assert!(!pushes[1].contains("name=\"xml\""));

    // Structure, pushes, status and job lookup happen strictly in sequence.
    let order: Vec<(String, String)> = requests
        .iter()
        .map(|r| (r.method.as_str().to_string(), r.url.path().to_string()))
        .filter(|(_, p)| p != "/auth/login")
        .collect();
    assert_eq!(
        order,
        vec![
            ("POST".to_string(), "/uploads".to_string()),
            ("PUT".to_string(), "/uploads/77".to_string()),
            ("PUT".to_string(), "/uploads/77".to_string()),
            ("PUT".to_string(), "/uploads/77".to_string()),
            ("GET".to_string(), "/uploads/77".to_string()),
            ("GET".to_string(), "/jobs/555".to_string()),
        ]
    );
}

#[tokio::test]
async fn numeric_job_ids_are_accepted() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let img = write(dir.path(), "p1.png", "png");
    let pages = vec![UploadPage::new(img, None, 1).unwrap()];

    mock_create(&server, UPLOAD_XML, 1).await;
    mock_push(&server, 200, 1).await;
    mock_status(&server, json!({ "uploadId": 77, "jobId": 555 }), 1).await;
    mock_job(&server, json!({ "jobId": "555", "docId": "43" }), 1).await;

    let mut client = logged_in_client(&server).await;
    let doc_id = client
        .upload_document(7, "Single", &pages, &Default::default())
        .await
        .unwrap();
    assert_eq!(doc_id, 43);
}

#[tokio::test]
async fn duplicate_page_numbers_are_rejected_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.jpg", "a");
    let b = write(dir.path(), "b.jpg", "b");
    let pages = vec![
        UploadPage::new(a, None, 1).unwrap(),
        UploadPage::new(b, None, 1).unwrap(),
    ];

    mock_create(&server, UPLOAD_XML, 0).await;

    let mut client = logged_in_client(&server).await;
    let err = client
        .upload_document(7, "Dup", &pages, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranskribusError::Upload(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_upload_id_fails_before_pushing_pages() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let pages = three_pages(dir.path());

    mock_create(&server, "<trpUpload><md/></trpUpload>", 1).await;
    mock_push(&server, 200, 0).await;

    let mut client = logged_in_client(&server).await;
    let err = client
        .upload_document(7, "Letters", &pages, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranskribusError::Upload(_)), "got {err:?}");
}

#[tokio::test]
async fn rejected_page_aborts_the_upload() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let pages = three_pages(dir.path());

    mock_create(&server, UPLOAD_XML, 1).await;
    mock_push(&server, 500, 1).await;
    mock_status(&server, json!({ "jobId": "555" }), 0).await;

    let mut client = logged_in_client(&server).await;
    let err = client
        .upload_document(7, "Letters", &pages, &Default::default())
        .await
        .unwrap_err();

    match err {
        TranskribusError::Upload(message) => {
            assert!(message.contains("500"), "message: {message}");
            assert!(message.contains("page rejected"), "message: {message}");
        }
        other => panic!("expected upload error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_job_or_document_id_is_an_upload_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let img = write(dir.path(), "p1.jpg", "jpg");
    let pages = vec![UploadPage::new(img, None, 1).unwrap()];

    mock_create(&server, UPLOAD_XML, 2).await;
    mock_push(&server, 200, 2).await;
    Mock::given(method("GET"))
        .and(path("/uploads/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uploadId": 77 })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mock_status(&server, json!({ "uploadId": 77, "jobId": "555" }), 1).await;
    mock_job(&server, json!({ "jobId": "555", "state": "CREATED" }), 1).await;

    let mut client = logged_in_client(&server).await;

    let err = client
        .upload_document(7, "No job", &pages, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranskribusError::Upload(ref m) if m.contains("jobId")), "got {err:?}");

    let err = client
        .upload_document(7, "No doc", &pages, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranskribusError::Upload(ref m) if m.contains("docId")), "got {err:?}");
}

#[tokio::test]
async fn unreadable_status_or_job_is_an_upload_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let img = write(dir.path(), "p1.jpg", "jpg");
    let pages = vec![UploadPage::new(img, None, 1).unwrap()];

    mock_create(&server, UPLOAD_XML, 2).await;
    mock_push(&server, 200, 2).await;
    Mock::given(method("GET"))
        .and(path("/uploads/77"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mock_status(&server, json!({ "uploadId": 77, "jobId": "555" }), 1).await;
    Mock::given(method("GET"))
        .and(path("/jobs/555"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = logged_in_client(&server).await;

    let err = client
        .upload_document(7, "Bad status", &pages, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranskribusError::Upload(ref m) if m.contains("upload 77")), "got {err:?}");

    let err = client
        .upload_document(7, "Bad job", &pages, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranskribusError::Upload(ref m) if m.contains("job 555")), "got {err:?}");
}
