// Startup behaviour of the gateway binary
//
// The binary must refuse to serve when credentials are missing or when the
// session cannot be created, and it must say why.

use archive_gateway::Config;
use std::io::Write;
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BIN: &str = env!("CARGO_BIN_EXE_archive-gateway");

async fn run(envs: &[(&str, &str)]) -> Output {
    Command::new(BIN)
        .env_clear()
        .envs(envs.iter().copied())
        .args(["--config", "/nonexistent/archive-gateway"])
        .output()
        .await
        .expect("failed to run gateway binary")
}

fn all_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[tokio::test]
async fn test_missing_credentials_exit_nonzero() {
    let output = run(&[("PORT", "0")]).await;

    assert!(!output.status.success());
    let text = all_output(&output);
    assert!(text.contains("TOKBOX_API_KEY"), "output was: {}", text);
    assert!(!text.contains("Server running"));
}

#[tokio::test]
async fn test_missing_secret_exit_nonzero() {
    let output = run(&[("TOKBOX_API_KEY", "123456"), ("PORT", "0")]).await;
    assert!(!output.status.success());
    assert!(all_output(&output).contains("TOKBOX_SECRET"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_session_failure_prevents_listening() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/create"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "message": "Invalid credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = run(&[
        ("TOKBOX_API_KEY", "123456"),
        ("TOKBOX_SECRET", "project-secret"),
        ("API_URL", uri.as_str()),
        ("PORT", "0"),
    ])
    .await;

    assert!(!output.status.success());
    let text = all_output(&output);
    assert!(text.contains("Failed to create session"), "output was: {}", text);
    assert!(!text.contains("Server running"));
}

#[test]
fn test_config_file_is_read() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
tokbox_api_key = "123456"
tokbox_secret = "from-file"
port = 8080
bucket = "archives"
"#
    )
    .unwrap();

    let settings = Config::defaults()
        .unwrap()
        .add_source(config::File::from(file.path()))
        .build()
        .unwrap();
    let cfg = Config::from_settings(settings).unwrap();

    assert_eq!(cfg.credentials.api_key, "123456");
    assert_eq!(cfg.credentials.api_secret, "from-file");
    assert_eq!(cfg.service.port, 8080);
    assert_eq!(cfg.storage.bucket.as_deref(), Some("archives"));
    assert_eq!(cfg.platform.archive_name, "Archive Gateway Recording");
}
