//! End-to-end capture tests: feed a recording in, check the WAV that comes out

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use muteone::domain::audio::{wav, SampleMatrix};

const FRAMES: usize = 800;

fn muteone_bin(config_home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("muteone").expect("binary should build");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("MUTEONE_UPLOAD_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// A stereo 8 kHz WAV recording to use as captured input
fn input_recording() -> Vec<u8> {
    let matrix = SampleMatrix::new(8000, vec![vec![0.25; FRAMES], vec![-0.25; FRAMES]]).unwrap();
    wav::encode(matrix).bytes().to_vec()
}

fn assert_converted(bytes: &[u8]) {
    assert_eq!(bytes.len(), 44 + FRAMES * 2 * 2);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 2);
    assert_eq!(
        u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
        8000
    );
    assert_eq!(&bytes[36..40], b"data");
}

#[test]
fn stdin_capture_saves_wav() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    muteone_bin(dir.path())
        .args(["--chunk-size", "256", "--output-dir"])
        .arg(&out)
        .write_stdin(input_recording())
        .assert()
        .success()
        .stdout(predicate::str::contains("muteone_capture.wav"))
        .stderr(predicate::str::contains("Saved as"));

    let saved = std::fs::read(out.join("muteone_capture.wav")).unwrap();
    assert_converted(&saved);
}

#[test]
fn file_capture_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tab.wav");
    std::fs::write(&input, input_recording()).unwrap();

    for _ in 0..2 {
        muteone_bin(dir.path())
            .arg("--input")
            .arg(&input)
            .arg("--output-dir")
            .arg(dir.path())
            .assert()
            .success();
    }

    assert!(dir.path().join("muteone_capture.wav").exists());
    let second = std::fs::read(dir.path().join("muteone_capture (1).wav")).unwrap();
    assert_converted(&second);
}

#[test]
fn output_dir_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("from-config");
    let config_dir = dir.path().join("muteone");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!("output_dir = {:?}\n", out.to_string_lossy()),
    )
    .unwrap();

    muteone_bin(dir.path())
        .write_stdin(input_recording())
        .assert()
        .success();

    assert!(out.join("muteone_capture.wav").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_reports_follow_up_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains(r#"name="estimatedDuration""#))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"uploadId":"rec-7"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("muteone");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "follow_up_url = \"https://app.example/edit?upload={upload_id}\"\n",
    )
    .unwrap();

    let upload_url = format!("{}/upload", server.uri());
    let config_home = dir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        muteone_bin(&config_home)
            .arg("--upload")
            .arg("--output-dir")
            .arg(config_home.join("out"))
            .env("MUTEONE_UPLOAD_URL", upload_url)
            .write_stdin(input_recording())
            .output()
            .expect("Failed to execute command")
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("https://app.example/edit?upload=rec-7"));
    assert!(!dir.path().join("out").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_upload_falls_back_to_local_save() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let upload_url = server.uri();
    let config_home = dir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        muteone_bin(&config_home)
            .arg("--upload")
            .arg("--output-dir")
            .arg(config_home.join("out"))
            .env("MUTEONE_UPLOAD_URL", upload_url)
            .write_stdin(input_recording())
            .output()
            .expect("Failed to execute command")
    })
    .await
    .unwrap();

    output
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HTTP 500"))
        .stderr(predicate::str::contains("Saved locally instead"));

    let saved = std::fs::read(dir.path().join("out/muteone_capture.wav")).unwrap();
    assert_converted(&saved);
}

#[test]
fn upload_without_endpoint_keeps_recording() {
    let dir = tempfile::tempdir().unwrap();

    muteone_bin(dir.path())
        .arg("--upload")
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .write_stdin(input_recording())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No upload URL configured"));

    assert!(dir.path().join("out/muteone_capture.wav").exists());
}

#[test]
fn monitor_flag_still_saves() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    muteone_bin(dir.path())
        .arg("--monitor")
        .arg("--output-dir")
        .arg(&out)
        .write_stdin(input_recording())
        .assert()
        .success()
        .stderr(predicate::str::contains("Playing recording"));

    let saved = std::fs::read(out.join("muteone_capture.wav")).unwrap();
    assert_converted(&saved);
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn interrupted_upload_falls_back_to_local_save() {
    use std::io::Write;
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"uploadId":"never"}"#)
                .set_delay(Duration::from_secs(60)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("muteone"))
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .env("MUTEONE_UPLOAD_URL", server.uri())
        .env_remove("RUST_LOG")
        .arg("--upload")
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(&input_recording()).unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(30);
    while server.received_requests().await.unwrap_or_default().is_empty() {
        assert!(Instant::now() < deadline, "upload never started");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let status = std::process::Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(status.success());

    let output = tokio::task::spawn_blocking(move || child.wait_with_output().unwrap());
    let output = tokio::time::timeout(Duration::from_secs(10), output)
        .await
        .expect("process should exit after interrupt")
        .unwrap();

    output
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Upload interrupted"))
        .stderr(predicate::str::contains("Saved locally instead"));

    let saved = std::fs::read(dir.path().join("out/muteone_capture.wav")).unwrap();
    assert_converted(&saved);
}
