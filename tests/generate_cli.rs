//! End-to-end runs of the `hmeta` binary against a temp deployment.

use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn hmeta(args: &[&str], config: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hmeta"))
        .args(args)
        .arg("--config")
        .arg(config)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run hmeta")
}

fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn write_config(dir: &Path, max_history_days: &str) -> PathBuf {
    let path = dir.join("hmeta.json");
    let config = format!(
        r#"{{
  "schema_version": 1,
  "owner_name": "ACME Sp. z o.o.",
  "owner_id": "9543cc89-477f-4e21-b865-2aef92679a20",
  "resource_base_url": "https://acme.example.org/raport",
  "data_filename": "dane.xlsx",
  "max_history_days": {max_history_days},
  "outputs": {{
    "document": "out/raport.xml",
    "checksum": "out/raport.md5",
    "state": "state/history.json"
  }}
}}"#
    );
    std::fs::write(&path, config).expect("write config");
    path
}

#[test]
fn generate_writes_verifiable_artifacts_and_is_idempotent() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let config = write_config(temp_dir.path(), "30");

    let first = hmeta(&["generate", "--date", "2025-01-01"], &config);
    assert!(
        first.status.success(),
        "{}",
        String::from_utf8_lossy(&first.stderr)
    );
    let document_path = temp_dir.path().join("out/raport.xml");
    let checksum_path = temp_dir.path().join("out/raport.md5");
    let document = std::fs::read(&document_path).expect("read document");
    let checksum = std::fs::read_to_string(&checksum_path).expect("read checksum");
    assert_eq!(checksum, md5_hex(&document));

    let text = String::from_utf8(document.clone()).expect("utf-8 document");
    assert!(text.contains(
        "<extIdent>ZASOB_9543cc89-477f-4e21-b865-2aef92679a20_20250101</extIdent>"
    ));
    assert!(text.contains("<url>https://acme.example.org/raport/dane.xlsx</url>"));

    let second = hmeta(&["generate", "--date", "2025-01-01"], &config);
    assert!(second.status.success());
    assert_eq!(
        std::fs::read(&document_path).expect("reread document"),
        document
    );
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("1 entries (replaced for 2025-01-01, 0 evicted)"), "{stdout}");

    let verify = hmeta(&["verify"], &config);
    assert!(
        verify.status.success(),
        "{}",
        String::from_utf8_lossy(&verify.stderr)
    );

    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path().join("out"))
        .expect("list output dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "staging leftovers: {leftovers:?}");
}

#[test]
fn history_accumulates_and_expires_by_date() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let config = write_config(temp_dir.path(), "10");

    for day in ["2020-01-01", "2020-01-02", "2020-01-03"] {
        let out = hmeta(&["generate", "--date", day], &config);
        assert!(out.status.success());
    }
    let document =
        std::fs::read_to_string(temp_dir.path().join("out/raport.xml")).expect("read document");
    assert_eq!(document.matches("<resource status=\"published\">").count(), 3);

    let out = hmeta(&["generate", "--date", "2020-02-10"], &config);
    assert!(out.status.success());
    let document =
        std::fs::read_to_string(temp_dir.path().join("out/raport.xml")).expect("read document");
    assert_eq!(document.matches("<resource status=\"published\">").count(), 1);
    assert!(document.contains("<dataDate>2020-02-10</dataDate>"));
}

#[test]
fn verify_fails_after_document_edit() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let config = write_config(temp_dir.path(), "null");
    assert!(hmeta(&["generate", "--date", "2025-05-05"], &config)
        .status
        .success());

    let document_path = temp_dir.path().join("out/raport.xml");
    let mut text = std::fs::read_to_string(&document_path).expect("read document");
    text = text.replace("daily", "weekly");
    std::fs::write(&document_path, text).expect("edit document");

    let verify = hmeta(&["verify"], &config);
    assert!(!verify.status.success());
    assert!(String::from_utf8_lossy(&verify.stderr).contains("checksum mismatch"));
}

#[test]
fn missing_owner_id_exits_non_zero_without_artifacts() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let config = temp_dir.path().join("hmeta.json");
    let init = hmeta(&["init", "--owner-name", "ACME"], &config);
    assert!(init.status.success());

    let out = hmeta(&["generate", "--date", "2025-01-01"], &config);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("owner_id"));
    assert!(!temp_dir.path().join("dataset.xml").exists());
    assert!(!temp_dir.path().join("history.json").exists());
}
