//! Integration tests for the valves CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VALVE_SHEET: &str = "\
Valve,Location,Location Notes,Function
V1,North gate,Behind hedge,Main isolation
V2,Pool house,,Pool feed
V3,East road,Under lid,Branch
V4,Barn,,Spare
";

const ZONE_SHEET: &str = "\
Valve,Zone,Lot #
V1,Zone 1,101
V2,Zone 1,102
V2,Zone 2,201
V3,Zone 2,202
V9,Zone 3,301
";

/// Helper to get a valves command isolated from the user's config
fn valves(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("valves").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("VALVES_DATA_DIR")
        .env_remove("VALVES_CACHE_TTL")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized project with no sheet data
fn setup_empty_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    valves(tmp.path())
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Helper to create a project holding the sample sheets
fn setup_test_project() -> TempDir {
    let tmp = setup_empty_project();
    write_sheets(tmp.path(), VALVE_SHEET, ZONE_SHEET);
    tmp
}

fn write_sheets(root: &Path, valve_sheet: &str, zone_sheet: &str) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("Valve Sheet.csv"), valve_sheet).unwrap();
    fs::write(data.join("Zone Sheet.csv"), zone_sheet).unwrap();
}

fn run_json(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = valves(tmp.path())
        .current_dir(tmp.path())
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    valves(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("interactive"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    valves(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("valves"));
}

#[test]
fn test_completions_generate() {
    let tmp = TempDir::new().unwrap();
    valves(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valves"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = setup_empty_project();

    assert!(tmp.path().join(".valves/config.yaml").exists());
    let header = fs::read_to_string(tmp.path().join("data/Zone Sheet.csv")).unwrap();
    assert_eq!(header, "Valve,Zone,Lot #\n");
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_empty_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Search Tests
// ============================================================================

#[test]
fn test_search_zone_shuts_it_off_completely() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "Z1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completely shut off: Zone 1"))
        .stdout(predicate::str::contains("Lots in zone: 101, 102"))
        .stdout(predicate::str::contains("Affected lots: 201"));
}

#[test]
fn test_search_single_valve_only_reduces_pressure() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "V1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reduced pressure: Zone 1"))
        .stdout(predicate::str::contains("Completely shut off").not());
}

#[test]
fn test_search_multiple_valves_json() {
    let tmp = setup_test_project();
    let json = run_json(&tmp, &["search", "V1,V2"]);

    assert_eq!(json["stale"], false);
    assert_eq!(json["search"]["singleValveLookup"], false);
    assert_eq!(json["shutoff"]["completelyShutOff"], serde_json::json!(["Zone 1"]));
    assert_eq!(json["shutoff"]["affectedZones"], serde_json::json!(["Zone 2"]));
}

#[test]
fn test_search_repeated_terms_match_comma_list() {
    let tmp = setup_test_project();
    let repeated = run_json(&tmp, &["search", "V1", "V2"]);
    let comma = run_json(&tmp, &["search", "V1, V2"]);
    assert_eq!(repeated["shutoff"], comma["shutoff"]);
}

#[test]
fn test_search_lot_scopes_to_its_zone() {
    let tmp = setup_test_project();
    let json = run_json(&tmp, &["search", "202"]);

    assert_eq!(json["shutoff"]["scopeSource"], "lot_lookup");
    assert_eq!(json["shutoff"]["lotZones"], serde_json::json!(["Zone 2"]));
    assert_eq!(json["shutoff"]["affectedZones"], serde_json::json!(["Zone 2"]));
}

#[test]
fn test_search_ids_are_pipeable() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "Zone 1", "--format", "id"])
        .assert()
        .success()
        .stdout("V1\nV2\n");
}

#[test]
fn test_search_count() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "pool", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1"));
}

#[test]
fn test_search_without_match() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "nowhere"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No valves found"));
}

#[test]
fn test_search_from_subdirectory_finds_project() {
    let tmp = setup_test_project();
    let nested = tmp.path().join("notes/2026");
    fs::create_dir_all(&nested).unwrap();

    valves(tmp.path())
        .current_dir(&nested)
        .args(["search", "V3", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("V3"));
}

#[test]
fn test_project_flag_overrides_cwd() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();

    valves(tmp.path())
        .current_dir(elsewhere.path())
        .arg("--project")
        .arg(tmp.path())
        .args(["show", "V1", "--format", "id"])
        .assert()
        .success()
        .stdout("V1\n");
}

#[test]
fn test_data_dir_env_override() {
    let tmp = setup_empty_project();
    let exports = TempDir::new().unwrap();
    write_sheets(exports.path(), VALVE_SHEET, ZONE_SHEET);

    valves(tmp.path())
        .current_dir(tmp.path())
        .env("VALVES_DATA_DIR", exports.path().join("data"))
        .args(["list", "--count"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_fresh_project_config_loads_quietly() {
    let tmp = setup_test_project();

    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["list", "--count"])
        .assert()
        .success()
        .stdout("4\n")
        .stderr(predicate::str::contains("Ignoring invalid config").not());
}

#[test]
fn test_rust_log_takes_precedence_over_quiet() {
    let tmp = setup_test_project();

    valves(tmp.path())
        .current_dir(tmp.path())
        .env("RUST_LOG", "debug")
        .args(["--quiet", "list", "--count"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Reading sheets from"));

    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["--verbose", "list", "--count"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Reading sheets from"));
}

#[test]
fn test_default_format_from_project_config() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".valves/config.yaml"), "default_format: id\n").unwrap();

    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["list"])
        .assert()
        .success()
        .stdout("V1\nV2\nV3\nV4\n");
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[test]
fn test_show_falls_back_to_case_insensitive_id() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["show", "v2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pool house"))
        .stdout(predicate::str::contains("also fed by V1"));
}

#[test]
fn test_show_missing_valve_fails() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["show", "V99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valve found"));
}

#[test]
fn test_show_json_includes_stale_flag() {
    let tmp = setup_test_project();
    let json = run_json(&tmp, &["show", "V2"]);
    assert_eq!(json["valveId"], "V2");
    assert_eq!(json["stale"], false);
    assert_eq!(json["zones"], serde_json::json!(["Zone 1", "Zone 2"]));
    assert_eq!(json["lots"], serde_json::json!(["102", "201"]));
}

#[test]
fn test_list_filters_by_zone() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["list", "--zone", "z2", "--format", "id"])
        .assert()
        .success()
        .stdout("V2\nV3\n");
}

#[test]
fn test_list_json_has_cache_metadata() {
    let tmp = setup_test_project();
    let json = run_json(&tmp, &["list"]);
    assert_eq!(json["count"], 4);
    assert_eq!(json["stale"], false);
    assert!(json["updatedAt"].is_string());
}

#[test]
fn test_zones_csv() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["zones", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zone,Valve Count,Valves,Lot Count"))
        .stdout(predicate::str::contains("Zone 1,2,\"V1, V2\",2"))
        .stdout(predicate::str::contains("Zone 3").not());
}

#[test]
fn test_lot_lookup() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["lot", "201"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lot 201 is in zone Zone 2"));
}

#[test]
fn test_lot_of_orphaned_row_is_not_mapped() {
    let tmp = setup_test_project();
    let json = run_json(&tmp, &["lot", "301"]);
    assert_eq!(json["zones"], serde_json::json!([]));
}

#[test]
fn test_zone_lookup_accepts_short_name() {
    let tmp = setup_test_project();
    let json = run_json(&tmp, &["zone", "z1"]);
    assert_eq!(json["lots"], serde_json::json!(["101", "102"]));
    assert_eq!(json["valves"], serde_json::json!(["V1", "V2"]));
}

// ============================================================================
// Check Tests
// ============================================================================

#[test]
fn test_check_reports_problems() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 Zone Sheet row(s) reference valves not in Valve Sheet",
        ))
        .stdout(predicate::str::contains("Not mapped to any zone: V4"));
}

#[test]
fn test_check_strict_fails_on_problems() {
    let tmp = setup_test_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["check", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("problem(s) found"));
}

#[test]
fn test_check_json() {
    let tmp = setup_test_project();
    let json = run_json(&tmp, &["check"]);
    assert_eq!(json["valves"], 4);
    assert_eq!(json["orphanedRows"], 1);
    assert_eq!(json["unmappedValves"], serde_json::json!(["V4"]));
    assert_eq!(json["thinZones"], serde_json::json!([]));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_header_only_valve_sheet_is_empty() {
    let tmp = setup_empty_project();
    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "V1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn test_missing_valve_column_is_schema_error() {
    let tmp = setup_empty_project();
    write_sheets(tmp.path(), "Id,Location\nV1,Gate\n", ZONE_SHEET);

    valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "V1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must have a"));
}

#[test]
fn test_json_failure_carries_error_kind() {
    let tmp = setup_empty_project();
    write_sheets(tmp.path(), "Id,Location\nV1,Gate\n", ZONE_SHEET);

    let output = valves(tmp.path())
        .current_dir(tmp.path())
        .args(["search", "V1", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"]["kind"], "data_source");
}

#[test]
fn test_missing_sheet_fails() {
    let tmp = setup_empty_project();
    fs::remove_file(tmp.path().join("data/Zone Sheet.csv")).unwrap();

    let output = valves(tmp.path())
        .current_dir(tmp.path())
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.contains("\"Zone Sheet\" not found"), "{}", message);
}
