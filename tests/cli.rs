use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const OPERATIONS_CSV: &str = "\
number,date,direction,dollars,pen_amount,usd_amount,customer_name,customer_document,customer_type,email
13157,2025-01-15,COMPRA,2000,7546,,Importadora Andina SAC,20512345678,empresa,pagos@andina.pe
14775,2025-02-03,VENTA,500,1851.85,500,Rosa Quispe,40123456,persona,
";

fn cuadre(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cuadre").expect("bin");
    cmd.env("CUADRE_DATA_DIR", data_dir).env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let temp_dir = TempDir::new().expect("tempdir");
    cuadre(temp_dir.path()).arg("init").assert().success();

    let csv_path = temp_dir.path().join("operations.csv");
    fs::write(&csv_path, OPERATIONS_CSV).expect("write csv");
    cuadre(temp_dir.path())
        .args(["operation", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 operation(s)"));

    temp_dir
}

#[test]
fn init_creates_data_files() {
    let temp_dir = TempDir::new().unwrap();
    cuadre(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(temp_dir.path().join("config.json").exists());
    assert!(temp_dir.path().join("data/operations.json").exists());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("keys/scraper_keys.json"))
            .unwrap()
            .trim(),
        "[]"
    );
}

#[test]
fn list_and_filter_operations() {
    let temp_dir = initialized();

    cuadre(temp_dir.path())
        .args(["operation", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("13157"))
        .stdout(predicate::str::contains("14775"))
        .stdout(predicate::str::contains("Page 1 of 1 (2 operation(s))"));

    cuadre(temp_dir.path())
        .args(["operation", "list", "--search", "quispe", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 1"))
        .stdout(predicate::str::contains("14775"));

    cuadre(temp_dir.path())
        .args(["operation", "list", "--page", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error [400]"));
}

#[test]
fn register_entry_and_export_report() {
    let temp_dir = initialized();

    cuadre(temp_dir.path())
        .args([
            "entry", "add", "usd", "13157", "--date", "16/01/2025", "--amount", "2000",
            "--reference", "OP-991",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered USD entry for operation #13157"));

    cuadre(temp_dir.path())
        .args(["entry", "show", "13157"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OP-991"))
        .stdout(predicate::str::contains("PEN pending"));

    let output = temp_dir.path().join("report.csv");
    cuadre(temp_dir.path())
        .args(["report", "export", "--direction", "compra", "--format", "csv", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 operation(s), 1 row(s)"));

    let csv = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Fecha Operación,Número"));
    assert!(lines[1].starts_with("2025-01-15,13157,Importadora Andina SAC,BUY,2000.00,7546.00"));
    assert!(lines[1].ends_with(",7546.00"));
}

#[test]
fn export_defaults_to_exports_dir() {
    let temp_dir = initialized();

    cuadre(temp_dir.path())
        .args(["report", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cuadre-operaciones.xlsx"));

    let workbook = fs::read(temp_dir.path().join("exports/cuadre-operaciones.xlsx")).unwrap();
    assert_eq!(&workbook[..2], b"PK");

    cuadre(temp_dir.path())
        .args(["report", "export", "--format", "csv"])
        .assert()
        .success();

    let csv = fs::read_to_string(temp_dir.path().join("exports/cuadre-operaciones.csv")).unwrap();
    assert!(csv.starts_with("Fecha Operación,Número"));
}

#[test]
fn bad_input_maps_to_status_codes() {
    let temp_dir = initialized();

    cuadre(temp_dir.path())
        .args(["operation", "show", "99999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error [404]"));

    cuadre(temp_dir.path())
        .args(["entry", "add", "pen", "13157", "--date", "2025-01-16", "--amount", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error [400]"))
        .stderr(predicate::str::contains("DD/MM/YYYY"));

    cuadre(temp_dir.path())
        .args(["report", "export", "--direction", "otros"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error [400]"));
}

#[test]
fn fix_signs_generates_entries() {
    let temp_dir = initialized();

    cuadre(temp_dir.path())
        .args(["correction", "fix-signs", "14775", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1 operation(s)"))
        .stdout(predicate::str::contains("Entries created:   2"))
        .stdout(predicate::str::contains("Not found:         1"));

    cuadre(temp_dir.path())
        .args(["report", "show", "14775"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-500.00"))
        .stdout(predicate::str::contains("1851.85"));
}

#[test]
fn key_rotation_round() {
    let temp_dir = TempDir::new().unwrap();
    cuadre(temp_dir.path()).arg("init").assert().success();

    for key in ["aaaaaaaa-first", "bbbbbbbb-second"] {
        cuadre(temp_dir.path())
            .args(["keys", "add", key])
            .assert()
            .success();
    }

    cuadre(temp_dir.path())
        .args(["keys", "add", "aaaaaaaa-first"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error [400]"));

    cuadre(temp_dir.path())
        .args(["keys", "acquire"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aaaaaaaa-first"));

    cuadre(temp_dir.path())
        .args(["keys", "acquire"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bbbbbbbb-second"));

    cuadre(temp_dir.path())
        .args(["keys", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keys:              2 (2 active)"))
        .stdout(predicate::str::contains("0.10%"))
        .stdout(predicate::str::contains("aaaaaaaa-first").not());

    cuadre(temp_dir.path())
        .args(["audit", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aaaaaaaa..."));
}
