use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// 在空白临时目录中运行，避免读取仓库内的默认配置。
fn zbim(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("zbim").expect("找不到 zbim 可执行文件");
    cmd.current_dir(workdir).env_remove("ZBIM_CONFIG");
    cmd
}

#[test]
fn sheet_index_is_duplicated_for_requested_elevation() {
    let dir = TempDir::new().expect("create temp dir");
    zbim(dir.path())
        .args(["duplicate_sheet_index", "--arg", "B", "--designation", "B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("已生成明细表：Sheet Index - Elevation B"))
        .stdout(predicate::str::contains("立面标识：B"));
}

#[test]
fn sheet_index_without_filter_fails() {
    let dir = TempDir::new().expect("create temp dir");
    zbim(dir.path())
        .arg("duplicate_sheet_index")
        .assert()
        .failure()
        .stdout(predicate::str::contains("[失败] duplicate_sheet_index"));
}

#[test]
fn full_run_provisions_every_elevation_artifact() {
    let dir = TempDir::new().expect("create temp dir");
    zbim(dir.path())
        .args(["--designation", "C", "--sheet-filter", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Roof Ventilation Equipment - Elevation C"))
        .stdout(predicate::str::contains("Sheet Index - Elevation C"))
        .stdout(predicate::str::contains("Exterior Veneer Calculations - Elevation C"))
        .stdout(predicate::str::contains("已放置区域 103 Porch"))
        .stdout(predicate::str::contains("已绑定 Area Category 并添加图例"))
        .stdout(predicate::str::contains("下一插入点：区域=(0.00, -24.00)"));
}

#[test]
fn config_file_supplies_designation() {
    let dir = TempDir::new().expect("create temp dir");
    let config = dir.path().join("zbim.toml");
    fs::write(
        &config,
        "[pipeline]\ndesignation = \"D\"\nsheet_index_filter = \"D\"\n",
    )
    .expect("写入配置失败");

    zbim(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("duplicate_veneer_schedule")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exterior Veneer Calculations - Elevation D"));
}

#[test]
fn saved_snapshot_can_be_reloaded() {
    let dir = TempDir::new().expect("create temp dir");
    let snapshot = dir.path().join("model.json");

    zbim(dir.path())
        .args(["duplicate_equipment_schedule", "--designation", "B", "--save"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("文档已保存"));
    assert!(snapshot.exists());

    zbim(dir.path())
        .arg("--document")
        .arg(&snapshot)
        .arg("list_levels")
        .assert()
        .success()
        .stdout(predicate::str::contains("已从快照加载文档"))
        .stdout(predicate::str::contains("Roof Ventilation Equipment - Elevation B"))
        .stdout(predicate::str::contains("Level 1, Level 2, Floor 3"));
}

#[test]
fn missing_snapshot_is_fatal() {
    let dir = TempDir::new().expect("create temp dir");
    zbim(dir.path())
        .args(["--document", "absent.json", "list_levels"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("无法加载文档快照"));
}

#[test]
fn list_commands_prints_registry() {
    let dir = TempDir::new().expect("create temp dir");
    zbim(dir.path())
        .arg("--list-commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("attach_area_legend"))
        .stdout(predicate::str::contains("place_area"));
}
