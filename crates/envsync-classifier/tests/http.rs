//! HttpClassifier against a local listener serving canned responses.

use envsync_classifier::{
    Classifier, ClassifierError, EnvironmentName, HttpClassifier, HttpClassifierConfig, NodeId,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accept one connection, answer it with `status` and `body`, and return the
/// request line the client sent.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if request_complete(&request) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        let text = String::from_utf8_lossy(&request).into_owned();
        text.lines().next().unwrap_or_default().to_string()
    });

    (endpoint, handle)
}

/// Headers received and the declared body fully read.
fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}

fn classifier(endpoint: &str) -> HttpClassifier {
    HttpClassifier::new(HttpClassifierConfig::new(endpoint).with_timeout(5)).unwrap()
}

// ---------------------------------------------------------------------------
// Status mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ok_response_with_class_object_is_parsed() {
    let (endpoint, server) = serve_once(
        200,
        r#"{"environment": "production", "classes": {"role::web": {}, "profile::base": {"port": 80}}}"#,
    )
    .await;

    let classification = classifier(&endpoint)
        .classify(&NodeId::new("web01"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        classification.environment,
        EnvironmentName::parse("production").unwrap()
    );
    let mut classes = classification.classes;
    classes.sort();
    assert_eq!(classes, vec!["profile::base", "role::web"]);

    let request_line = server.await.unwrap();
    assert_eq!(request_line, "POST /v1/classified/nodes/web01 HTTP/1.1");
}

#[tokio::test]
async fn ok_response_with_class_array_is_parsed() {
    let (endpoint, server) =
        serve_once(200, r#"{"environment": "testing", "classes": ["ntp", "ssh"]}"#).await;

    let classification = classifier(&endpoint)
        .classify(&NodeId::new("web01"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(classification.environment.as_str(), "testing");
    assert_eq!(classification.classes, vec!["ntp", "ssh"]);
    server.await.unwrap();
}

#[tokio::test]
async fn not_found_means_no_classification() {
    let (endpoint, server) = serve_once(404, r#"{"error": "unknown node"}"#).await;

    let result = classifier(&endpoint)
        .classify(&NodeId::new("db01"))
        .await
        .unwrap();

    assert!(result.is_none());
    server.await.unwrap();
}

#[tokio::test]
async fn client_error_status_is_bad_response() {
    let (endpoint, server) = serve_once(403, r#"{"error": "forbidden"}"#).await;

    let err = classifier(&endpoint)
        .classify(&NodeId::new("web01"))
        .await
        .unwrap_err();

    match err {
        ClassifierError::BadResponse { node, status } => {
            assert_eq!(node, "web01");
            assert_eq!(status, 403);
        }
        other => panic!("expected BadResponse, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn server_error_status_is_unavailable() {
    let (endpoint, server) = serve_once(503, "").await;

    let err = classifier(&endpoint)
        .classify(&NodeId::new("web01"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifierError::Unavailable { .. }));
    assert_eq!(err.kind(), "CLASSIFIER_UNAVAILABLE");
    assert!(err.to_string().contains("503"));
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (endpoint, server) = serve_once(200, "{not json").await;

    let err = classifier(&endpoint)
        .classify(&NodeId::new("web01"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifierError::Decode(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn invalid_assigned_environment_is_rejected() {
    let (endpoint, server) = serve_once(200, r#"{"environment": "../etc"}"#).await;

    let err = classifier(&endpoint)
        .classify(&NodeId::new("web01"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifierError::InvalidEnvironment(_)));
    server.await.unwrap();
}

// ---------------------------------------------------------------------------
// Node addressing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn node_with_path_characters_stays_one_segment() {
    let (endpoint, server) = serve_once(404, "").await;

    let result = classifier(&endpoint)
        .classify(&NodeId::new("evil/../other"))
        .await
        .unwrap();
    assert!(result.is_none());

    let request_line = server.await.unwrap();
    assert_eq!(
        request_line,
        "POST /v1/classified/nodes/evil%2F..%2Fother HTTP/1.1"
    );
}
