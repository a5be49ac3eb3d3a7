//! Browser request handling against a live namespace

use super::test_utils::{exists, memory_client, p, seed};
use std::sync::Arc;
use upspin_ui::browser::{ApiCall, ApiResponse, BrowserServer, UploadFile};
use upspin_ui::client::Client;
use upspin_ui::config::UiConfig;
use upspin_ui::error::ApiError;
use upspin_ui::namespace::LocalClient;
use upspin_ui::store::MemoryStore;

fn server_with(dir_endpoint: Option<&str>) -> (BrowserServer, LocalClient<MemoryStore>, String) {
    let client = memory_client();
    let config = UiConfig {
        user_name: Some("ann@example.com".to_string()),
        dir_endpoint: dir_endpoint.map(str::to_string),
        ..UiConfig::default()
    };
    let server = BrowserServer::new();
    server.install_session(&config, Arc::new(client.clone())).unwrap();
    let key = server.key().to_string();
    (server, client, key)
}

fn error_of(response: ApiResponse) -> String {
    response.error().to_string()
}

#[test]
fn test_startup_opens_user_root_for_remote_endpoint() {
    let (server, _, key) = server_with(Some("remote,dir.example.com:443"));
    match server.handle(&key, ApiCall::Startup).unwrap() {
        ApiResponse::Startup(r) => {
            assert_eq!(r.left_path.unwrap().as_str(), "ann@example.com/");
            assert_eq!(r.right_path.unwrap().as_str(), "augie@upspin.io/");
        }
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn test_startup_response_json_shape() {
    let (server, _, key) = server_with(None);
    let json = server.handle(&key, ApiCall::Startup).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["UserName"], "ann@example.com");
    assert_eq!(value["Error"], "");
}

#[test]
fn test_mkdir_copy_rm_round() {
    let (server, client, key) = server_with(None);
    seed(&client, &[("ann@example.com/src", None), ("ann@example.com/src/f", Some("f"))]);

    let r = server
        .handle(&key, ApiCall::Mkdir { path: p("ann@example.com/dst") })
        .unwrap();
    assert_eq!(error_of(r), "");

    let r = server
        .handle(
            &key,
            ApiCall::Copy {
                dest: p("ann@example.com/dst"),
                paths: vec![p("ann@example.com/src")],
            },
        )
        .unwrap();
    assert_eq!(error_of(r), "");
    assert!(exists(&client, "ann@example.com/dst/src/f"));

    let r = server
        .handle(
            &key,
            ApiCall::Rm {
                paths: vec![p("ann@example.com/src"), p("ann@example.com/dst")],
            },
        )
        .unwrap();
    assert_eq!(error_of(r), "");
    assert!(!exists(&client, "ann@example.com/src"));
    assert!(!exists(&client, "ann@example.com/dst"));
}

#[test]
fn test_operation_errors_travel_in_response() {
    let (server, client, key) = server_with(None);
    seed(&client, &[("ann@example.com/keep", Some("k"))]);

    let r = server
        .handle(
            &key,
            ApiCall::Rm {
                paths: vec![p("ann@example.com/missing"), p("ann@example.com/keep")],
            },
        )
        .unwrap();
    assert!(error_of(r).contains("does not exist"));
    // rm stops at the first failure.
    assert!(exists(&client, "ann@example.com/keep"));

    let r = server
        .handle(
            &key,
            ApiCall::Copy {
                dest: p("ann@example.com/keep"),
                paths: vec![p("ann@example.com/")],
            },
        )
        .unwrap();
    assert!(error_of(r).contains("not a directory"));
}

#[test]
fn test_put_uploads_into_directory() {
    let (server, client, key) = server_with(None);
    let r = server
        .handle(
            &key,
            ApiCall::Put {
                dir: p("ann@example.com/"),
                files: vec![
                    UploadFile {
                        name: "a.txt".to_string(),
                        content: b"alpha".to_vec(),
                    },
                    UploadFile {
                        name: "b.txt".to_string(),
                        content: b"beta".to_vec(),
                    },
                ],
            },
        )
        .unwrap();
    assert_eq!(error_of(r), "");
    assert_eq!(client.get(&p("ann@example.com/a.txt")).unwrap(), b"alpha");
    assert_eq!(client.get(&p("ann@example.com/b.txt")).unwrap(), b"beta");
}

#[test]
fn test_list_tokens_are_per_server() {
    let (server, client, key) = server_with(None);
    seed(&client, &[("ann@example.com/f", Some("data"))]);
    let entries = match server
        .handle(&key, ApiCall::List { path: p("ann@example.com/") })
        .unwrap()
    {
        ApiResponse::List(r) => r.entries,
        other => panic!("unexpected response {:?}", other),
    };
    let token = entries[0].file_token.clone();

    let (other_server, _, _) = server_with(None);
    let err = other_server
        .serve_content(&token, &p("ann@example.com/f"))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
    assert_eq!(err.status_code(), 403);

    let (_, data) = server.serve_content(&token, &p("ann@example.com/f")).unwrap();
    assert_eq!(data, b"data");
}

#[test]
fn test_serve_content_of_missing_file_is_404() {
    let (server, _, _) = server_with(None);
    let name = p("ann@example.com/gone");
    let user = upspin_ui::path::UserName::new("ann@example.com");
    let token = server.file_token(&user, &name);
    let err = server.serve_content(&token, &name).unwrap_err();
    assert_eq!(err.status_code(), 404);
}
