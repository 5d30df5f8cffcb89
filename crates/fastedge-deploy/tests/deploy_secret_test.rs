use fastedge_deploy::{run_secret, RecordingReporter, SecretInputs};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn inputs(server: &MockServer) -> SecretInputs {
    SecretInputs {
        api_key: "test-api-key".to_string(),
        api_url: server.uri(),
        secret_name: "db-password".to_string(),
        ..Default::default()
    }
}

async fn mount_secret(server: &MockServer, id: u64, slots: &[u32]) {
    let slots: Vec<_> = slots
        .iter()
        .map(|slot| json!({"slot": slot, "checksum": "redacted"}))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/fastedge/v1/secrets/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "name": "db-password",
            "app_count": 2,
            "comment": null,
            "secret_slots": slots,
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn creates_secret_when_name_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fastedge/v1/secrets"))
        .and(query_param("secret_name", "db-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"secrets": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/fastedge/v1/secrets"))
        .and(header("Authorization", "APIKey test-api-key"))
        .and(body_json(json!({
            "name": "db-password",
            "comment": "",
            "secret_slots": [{"slot": 0, "value": "hunter2"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 31,
            "name": "db-password",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = RecordingReporter::new();
    let secret_inputs = SecretInputs {
        secret: "hunter2".to_string(),
        ..inputs(&server)
    };
    let deployed = run_secret(&secret_inputs, &reporter).await.unwrap();

    assert!(deployed.created);
    assert_eq!(reporter.output("secret_id").as_deref(), Some("31"));
    assert_eq!(
        reporter.notices(),
        vec!["Secret created with ID: 31".to_string()]
    );
}

#[tokio::test]
async fn updates_secret_by_id_deleting_stale_slots() {
    let server = MockServer::start().await;
    mount_secret(&server, 789, &[0, 1, 2, 3]).await;
    Mock::given(method("PATCH"))
        .and(path("/fastedge/v1/secrets/789"))
        .and(body_json(json!({
            "id": 789,
            "name": "db-password",
            "comment": "rotated",
            "secret_slots": [
                {"slot": 0, "value": "a"},
                {"slot": 2, "value": "b"},
                {"slot": 1},
                {"slot": 3},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 789,
            "name": "db-password",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = RecordingReporter::new();
    let secret_inputs = SecretInputs {
        secret_id: "789".to_string(),
        comment: "rotated".to_string(),
        secret_slots: r#"[{"slot": 0, "value": "a"}, {"slot": 2, "value": "b"}]"#.to_string(),
        ..inputs(&server)
    };
    let deployed = run_secret(&secret_inputs, &reporter).await.unwrap();

    assert!(!deployed.created);
    assert_eq!(reporter.output("secret_id").as_deref(), Some("789"));
    assert_eq!(
        reporter.notices(),
        vec!["Secret updated with ID: 789".to_string()]
    );
}

#[tokio::test]
async fn secret_found_by_name_is_refetched_before_reconciling() {
    let server = MockServer::start().await;
    // The search result has no slots, so reconciling against it would
    // delete nothing.
    Mock::given(method("GET"))
        .and(path("/fastedge/v1/secrets"))
        .and(query_param("secret_name", "db-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secrets": [{"id": 44, "name": "db-password", "app_count": 1}],
        })))
        .mount(&server)
        .await;
    mount_secret(&server, 44, &[0, 5]).await;
    Mock::given(method("PATCH"))
        .and(path("/fastedge/v1/secrets/44"))
        .and(body_json(json!({
            "id": 44,
            "name": "db-password",
            "comment": "",
            "secret_slots": [{"slot": 0, "value": "new"}, {"slot": 5}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 44})))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = RecordingReporter::new();
    let secret_inputs = SecretInputs {
        secret: "new".to_string(),
        ..inputs(&server)
    };
    run_secret(&secret_inputs, &reporter).await.unwrap();

    assert_eq!(reporter.output("secret_id").as_deref(), Some("44"));
    assert!(reporter.failures().is_empty());
}

#[tokio::test]
async fn secret_without_content_fails_before_any_request() {
    let server = MockServer::start().await;

    let reporter = RecordingReporter::new();
    let secret_inputs = SecretInputs {
        secret_slots: r#"[{"slot": 0, "value": ""}]"#.to_string(),
        ..inputs(&server)
    };
    assert!(run_secret(&secret_inputs, &reporter).await.is_none());

    assert_eq!(
        reporter.failures(),
        vec![
            "You must provide a \"secret\" value or a \"secret_slots\" string with at least one slot."
                .to_string()
        ]
    );
    assert_eq!(reporter.warnings().len(), 2);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_secret_update_is_reported_once() {
    let server = MockServer::start().await;
    mount_secret(&server, 7, &[0]).await;
    Mock::given(method("PATCH"))
        .and(path("/fastedge/v1/secrets/7"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let reporter = RecordingReporter::new();
    let secret_inputs = SecretInputs {
        secret_id: "7".to_string(),
        secret: "value".to_string(),
        ..inputs(&server)
    };
    assert!(run_secret(&secret_inputs, &reporter).await.is_none());

    assert_eq!(
        reporter.failures(),
        vec!["Error updating secret: Bad Request".to_string()]
    );
    assert_eq!(reporter.output("secret_id"), None);
}

#[tokio::test]
async fn secret_lookup_transport_error_is_not_treated_as_missing_secret() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fastedge/v1/secrets"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/fastedge/v1/secrets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let reporter = RecordingReporter::new();
    let secret_inputs = SecretInputs {
        secret: "value".to_string(),
        ..inputs(&server)
    };
    assert!(run_secret(&secret_inputs, &reporter).await.is_none());

    assert_eq!(
        reporter.failures(),
        vec!["Error fetching secrets: Bad Gateway".to_string()]
    );
    assert_eq!(reporter.output("secret_id"), None);
}
