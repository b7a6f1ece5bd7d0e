//! Mock upstream catalog fixtures

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Search endpoint path on the mock server
pub const SEARCH_PATH: &str = "/topics/api/public/topics/search";

/// Upstream-shaped topic record
pub fn upstream_topic(code: &str, topic_id: &str) -> Value {
    json!({
        "topicCode": code,
        "topicId": topic_id,
        "topicTitle": format!("Title for {code}"),
        "component": "USAF",
        "topicStatus": "Open",
        "solicitationTitle": "DoD SBIR 25.1",
        "programYear": 2025,
        "releaseNumber": 3,
        "technologyArea": null,
        "keywords": ["autonomy"]
    })
}

/// Mount a search response listing `(code, id)` pairs
pub async fn mount_search(server: &MockServer, topics: &[(&str, &str)], total: u64) {
    let data: Vec<Value> = topics
        .iter()
        .map(|(code, id)| upstream_topic(code, id))
        .collect();

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "total": total
        })))
        .mount(server)
        .await;
}

/// Mount a PDF behind a redirect, the way the catalog serves documents
pub async fn mount_document(server: &MockServer, topic_id: &str, bytes: &[u8]) {
    let blob_path = format!("/blobs/{topic_id}.pdf");

    Mock::given(method("GET"))
        .and(path(format!(
            "/topics/api/public/topics/{topic_id}/download/PDF"
        )))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}{blob_path}", server.uri())),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(blob_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(bytes.to_vec()),
        )
        .mount(server)
        .await;
}

/// Mount a failing document endpoint
pub async fn mount_document_error(server: &MockServer, topic_id: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/topics/api/public/topics/{topic_id}/download/PDF"
        )))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream failure"))
        .mount(server)
        .await;
}

/// Read every entry of a ZIP archive as `(name, bytes)`
pub fn zip_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("response should be a ZIP");
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).expect("entry readable");
            let mut content = Vec::new();
            file.read_to_end(&mut content).expect("entry content");
            (file.name().to_string(), content)
        })
        .collect()
}
