//! Integration tests for the `shiny` CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HAVEN: &str = r#"[ShinyMUD Version "0.5"]

[Area]
{"name": "haven", "title": "Haven", "description": "A quiet town.", "level_range": "1-5", "builders": "jess"}
[End Area]

[Scripts]
[{"id": "1", "name": "welcome", "body": "say Welcome to Haven!"}]
[End Scripts]

[Items]
[{"id": "1", "name": "sword", "keywords": "sword blade", "weight": 3}]
[End Items]

[Item Types]
[{"item": "1", "item_type": "equippable", "equip_slot": "main hand"}]
[End Item Types]

[Npcs]
[{"id": "1", "name": "guard", "gender": "neutral"}]
[End Npcs]

[Npc Events]
[{"prototype": "1", "script": "1", "event_trigger": "pc_enter", "probability": 100}]
[End Npc Events]

[Rooms]
[{"id": "1", "name": "Gate"}, {"id": "2", "name": "Square"}]
[End Rooms]

[Room Exits]
[{"room": "1", "direction": "north", "to_id": "2", "to_area": "haven", "to_room": null, "openable": true},
 {"room": "2", "direction": "south", "to_id": "1", "to_area": "haven", "to_room": null}]
[End Room Exits]

[Room Spawns]
{"1": [{"id": "1", "spawn_type": "npc", "spawn_object_id": "1"}]}
[End Room Spawns]
"#;

/// Create a temp import directory holding the "haven" area.
fn area_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("haven.txt"), HAVEN).unwrap();
    dir
}

fn shiny() -> Command {
    let mut cmd = Command::cargo_bin("shiny").unwrap();
    cmd.env_remove("SHINY_IMPORT_DIR")
        .env_remove("SHINY_EXPORT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_shows_available_areas() {
    let dir = area_dir();
    fs::write(dir.path().join("README.md"), "ignored").unwrap();
    shiny()
        .args(["list", "--import-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Available For Import"))
        .stdout(predicate::str::contains("haven"))
        .stdout(predicate::str::contains("README").not());
}

#[test]
fn list_empty_directory() {
    let dir = TempDir::new().unwrap();
    shiny()
        .args(["list", "--import-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "There are no area files in your import directory.",
        ));
}

#[test]
fn list_reads_import_dir_from_environment() {
    let dir = area_dir();
    shiny()
        .arg("list")
        .env("SHINY_IMPORT_DIR", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("haven"));
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

#[test]
fn import_named_area() {
    let dir = area_dir();
    shiny()
        .args(["import", "haven", "--import-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Importing haven.txt... Haven has been successfully imported.",
        ))
        .stdout(predicate::str::contains("1 area(s) loaded"));
}

#[test]
fn import_all_with_no_files() {
    let dir = TempDir::new().unwrap();
    shiny()
        .args(["import", "all", "--import-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "I couldn't find any pre-packaged areas.",
        ));
}

#[test]
fn import_reports_failures_and_continues() {
    let dir = area_dir();
    fs::write(
        dir.path().join("broken.txt"),
        HAVEN.replace("[End Rooms]", ""),
    )
    .unwrap();
    shiny()
        .args(["import", "broken", "ghost", "haven", "--import-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Importing broken.txt... Failed: Corrupted file: missing or malformed Rooms tag.",
        ))
        .stdout(predicate::str::contains(
            "Importing ghost.txt... Failed: Error: ghost.txt does not exist.",
        ))
        .stdout(predicate::str::contains(
            "Haven has been successfully imported.",
        ))
        .stderr(predicate::str::contains("error: 2 of 3 areas failed to import"));
}

#[test]
fn import_with_dangling_reference_is_aborted() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("haven.txt"),
        HAVEN.replace(r#""script": "1""#, r#""script": "9""#),
    )
    .unwrap();
    shiny()
        .args(["import", "haven", "--import-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "There was a horrible error on import! Aborting!",
        ))
        .stderr(predicate::str::contains("script 9 not found"));
}

#[test]
fn import_logs_decode_detail_for_malformed_section() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("junk.txt"),
        HAVEN.replace(
            r#"[{"id": "1", "name": "guard", "gender": "neutral"}]"#,
            "{not json",
        ),
    )
    .unwrap();
    shiny()
        .args(["import", "junk", "--import-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Importing junk.txt... Failed: Corrupted file: malformed Npcs section.",
        ))
        .stderr(predicate::str::contains("cannot decode area file"))
        .stderr(predicate::str::contains("key must be a string"));
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[test]
fn convert_writes_current_format() {
    let dir = area_dir();
    let out = TempDir::new().unwrap();
    let export_dir = out.path().join("exported");
    shiny()
        .args(["convert", "all", "--import-dir"])
        .arg(dir.path())
        .arg("--export-dir")
        .arg(&export_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export complete!"));

    let text = fs::read_to_string(export_dir.join("haven.txt")).unwrap();
    assert!(text.starts_with("[ShinyMUD Version \"1.0\"]"));
    assert!(text.contains("\"weight\":3"));
    assert!(text.contains("\"openable\":true"));
    assert!(!text.contains("dbid"));
}

#[test]
fn converted_file_imports_again() {
    let dir = area_dir();
    let out = TempDir::new().unwrap();
    shiny()
        .args(["convert", "haven", "--import-dir"])
        .arg(dir.path())
        .arg("--export-dir")
        .arg(out.path())
        .assert()
        .success();

    shiny()
        .args(["import", "haven", "--import-dir"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Haven has been successfully imported.",
        ));
}

#[test]
fn convert_with_nothing_imported_fails() {
    let dir = TempDir::new().unwrap();
    shiny()
        .args(["convert", "ghost", "--import-dir"])
        .arg(dir.path())
        .arg("--export-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
