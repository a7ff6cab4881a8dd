//! End-to-end tests for the `stcheck` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = r#"{
    "invoice_number": "15",
    "invoice_date": "2024-03-01",
    "seller_name": "ООО «Агро Фрукт», г. Ташкент, ул. Навои 5",
    "buyer_name": "ООО \"Север\"",
    "products": [
        {"name": "Хурма свежая", "package_count": 10, "gross_weight": 200, "net_weight": 190}
    ]
}"#;

const CERTIFICATE: &str = r#"{
    "st_number": "UZ 1234",
    "exporter_name": "ООО «Агро Фрукт»",
    "importer_name": "ООО «Север»",
    "transport_method": "Автотранспорт",
    "invoice_ref_number": "15",
    "invoice_ref_date": "2024-03-01",
    "certification_date": "2024-03-02",
    "declaration_date": "2024-03-02",
    "products": [
        {"name": "Хурма свежая", "package_count": 10, "gross_weight": 200, "net_weight": 190}
    ]
}"#;

const INVOICE_TEXT: &str = "СЧЁТ-ФАКТУРА № 15\n\
                            Наименование товара   Мест   Брутто   Нетто\n\
                            Хурма свежая | 10 | 200 | 190\n";

/// Temp workspace with a config file that points at an unset API key variable.
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(
            &config,
            r#"{"model": {"api_key_env": "STCHECK_TEST_UNSET_API_KEY"}}"#,
        )
        .unwrap();
        Self { dir, config }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn stcheck(&self) -> Command {
        let mut cmd = Command::cargo_bin("stcheck").unwrap();
        cmd.env_remove("STCHECK_TEST_UNSET_API_KEY")
            .arg("--config")
            .arg(&self.config);
        cmd
    }
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn validate_matching_records() {
    let ws = Workspace::new();
    let invoice = ws.file("invoice.json", INVOICE);
    let certificate = ws.file("certificate.json", CERTIFICATE);

    ws.stcheck()
        .args(["validate", path_arg(&invoice), path_arg(&certificate)])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status": "OK""#));
}

#[test]
fn validate_mismatch_exits_with_two() {
    let ws = Workspace::new();
    let invoice = ws.file("invoice.json", INVOICE);
    let certificate = ws.file(
        "certificate.json",
        &CERTIFICATE.replace("\"package_count\": 10", "\"package_count\": 12"),
    );

    ws.stcheck()
        .args(["validate", path_arg(&invoice), path_arg(&certificate)])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("MISMATCH"))
        .stdout(predicate::str::contains("package count does not match"));
}

#[test]
fn validate_text_format() {
    let ws = Workspace::new();
    let invoice = ws.file("invoice.json", INVOICE);
    let certificate = ws.file(
        "certificate.json",
        &CERTIFICATE.replace("Автотранспорт", "Авиа"),
    );

    ws.stcheck()
        .args(["validate", "--format", "text"])
        .args([path_arg(&invoice), path_arg(&certificate)])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("transport method must be road transport"));
}

#[test]
fn validate_rejects_invalid_json() {
    let ws = Workspace::new();
    let invoice = ws.file("invoice.json", "{ not json");
    let certificate = ws.file("certificate.json", CERTIFICATE);

    ws.stcheck()
        .args(["validate", path_arg(&invoice), path_arg(&certificate)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn heuristic_json_output() {
    let ws = Workspace::new();
    let invoice = ws.file("invoice.txt", INVOICE_TEXT);

    ws.stcheck()
        .args(["heuristic", path_arg(&invoice)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Хурма свежая"))
        .stdout(predicate::str::contains("\"confidence\""));
}

#[test]
fn heuristic_csv_output() {
    let ws = Workspace::new();
    let invoice = ws.file("invoice.txt", INVOICE_TEXT);

    ws.stcheck()
        .args(["heuristic", "--format", "csv", path_arg(&invoice)])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "name,package_count,gross_weight,net_weight,confidence",
        ))
        .stdout(predicate::str::contains("Хурма свежая,10"));
}

#[test]
fn heuristic_text_without_products() {
    let ws = Workspace::new();
    let invoice = ws.file("invoice.txt", "Invoice 42\nTotal 100\n");

    ws.stcheck()
        .args(["heuristic", "--format", "text", path_arg(&invoice)])
        .assert()
        .success()
        .stdout(predicate::str::contains("No products found"));
}

#[test]
fn compare_with_supplied_records_skips_model() {
    let ws = Workspace::new();
    let invoice_text = ws.file("invoice.txt", INVOICE_TEXT);
    let certificate_text = ws.file("certificate.txt", "СЕРТИФИКАТ ST-1");
    let invoice = ws.file("invoice.json", INVOICE);
    let certificate = ws.file("certificate.json", CERTIFICATE);

    ws.stcheck()
        .args(["compare", path_arg(&invoice_text), path_arg(&certificate_text)])
        .args(["--invoice-json", path_arg(&invoice)])
        .args(["--certificate-json", path_arg(&certificate)])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status": "OK""#));
}

#[test]
fn compare_fills_invoice_products_from_text() {
    let ws = Workspace::new();
    let invoice_text = ws.file("invoice.txt", INVOICE_TEXT);
    let certificate_text = ws.file("certificate.txt", "СЕРТИФИКАТ ST-1");
    let invoice = ws.file(
        "invoice.json",
        r#"{"invoice_number": "15", "invoice_date": "2024-03-01",
            "seller_name": "ООО «Агро Фрукт»", "buyer_name": "ООО «Север»", "products": []}"#,
    );
    let certificate = ws.file("certificate.json", CERTIFICATE);

    ws.stcheck()
        .args(["compare", path_arg(&invoice_text), path_arg(&certificate_text)])
        .args(["--invoice-json", path_arg(&invoice)])
        .args(["--certificate-json", path_arg(&certificate)])
        .assert()
        .success();
}

#[test]
fn compare_without_api_key_fails() {
    let ws = Workspace::new();
    let invoice_text = ws.file("invoice.txt", INVOICE_TEXT);
    let certificate_text = ws.file("certificate.txt", "СЕРТИФИКАТ ST-1");

    ws.stcheck()
        .args(["compare", path_arg(&invoice_text), path_arg(&certificate_text)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STCHECK_TEST_UNSET_API_KEY"));
}

#[test]
fn extract_missing_input() {
    let ws = Workspace::new();

    ws.stcheck()
        .args(["extract", "--type", "invoice", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn config_get_and_set() {
    let ws = Workspace::new();

    ws.stcheck()
        .args(["config", "set", "extraction.timeout_ms", "5000"])
        .assert()
        .success();

    ws.stcheck()
        .args(["config", "get", "extraction.timeout_ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5000"));

    ws.stcheck()
        .args(["config", "get", "model.api_key_env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("STCHECK_TEST_UNSET_API_KEY"));
}

#[test]
fn config_set_rejects_wrong_type() {
    let ws = Workspace::new();

    ws.stcheck()
        .args(["config", "set", "extraction.timeout_ms", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn config_path_prints_override() {
    let ws = Workspace::new();

    ws.stcheck()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}

#[test]
fn broken_config_file_is_reported() {
    let ws = Workspace::new();
    fs::write(&ws.config, "{ not json").unwrap();
    let invoice = ws.file("invoice.txt", INVOICE_TEXT);

    ws.stcheck()
        .args(["heuristic", path_arg(&invoice)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}
