//! Drives the `tzaharon` binary against a real `tzaharon serve`.

use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

struct Server {
    process: Child,
    url: String,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind probe")
        .local_addr()
        .expect("probe addr")
        .port()
}

fn start_server(data_file: &Path) -> Server {
    let port = free_port();
    let process = Command::cargo_bin("tzaharon")
        .expect("binary")
        .args(["serve", "--store", "file", "--bind"])
        .arg(format!("127.0.0.1:{port}"))
        .arg("--data-file")
        .arg(data_file)
        .env("RUST_LOG", "warn")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn server");
    let server = Server {
        process,
        url: format!("http://127.0.0.1:{port}"),
    };

    let deadline = Instant::now() + Duration::from_secs(10);
    let probe = format!("{}/api/data", server.url);
    while ureq::get(&probe).call().is_err() {
        assert!(Instant::now() < deadline, "server did not come up");
        sleep(Duration::from_millis(50));
    }
    server
}

fn tzaharon(server: &Server) -> Command {
    let mut cmd = Command::cargo_bin("tzaharon").expect("binary");
    cmd.env("TZAHARON_SERVER", &server.url)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "warn");
    cmd
}

fn board_json(server: &Server, extra: &[&str]) -> Value {
    let output = tzaharon(server)
        .args(["board", "--json"])
        .args(extra)
        .output()
        .expect("run board");
    assert!(output.status.success(), "board failed: {output:?}");
    serde_json::from_slice(&output.stdout).expect("board JSON")
}

fn names(board: &Value) -> Vec<String> {
    board["children"]
        .as_array()
        .expect("children array")
        .iter()
        .map(|c| format!("{} {}", c["firstName"].as_str().unwrap(), c["lastName"].as_str().unwrap()))
        .collect()
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("tzaharon")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("serve"))
        .stdout(contains("board"))
        .stdout(contains("reset"));
}

#[test]
fn unreachable_server_is_reported() {
    let port = free_port();
    Command::cargo_bin("tzaharon")
        .expect("binary")
        .args(["board", "--server"])
        .arg(format!("http://127.0.0.1:{port}"))
        .env("NO_COLOR", "1")
        .assert()
        .failure()
        .stderr(contains("cannot load board"));
}

#[test]
fn attendance_day_end_to_end() {
    let dir = TempDir::new().expect("tempdir");
    let data_file = dir.path().join("daycare_data.json");
    let server = start_server(&data_file);

    let board = board_json(&server, &[]);
    assert_eq!(board["total"], 0);
    assert_eq!(board["counts"].as_array().unwrap().len(), 4);

    for (first, last) in [("Dana", "Cohen"), ("Avi", "Levi"), ("Tom", "Ron")] {
        tzaharon(&server)
            .args(["child", "add", first, last])
            .assert()
            .success()
            .stdout(contains("added"));
    }
    tzaharon(&server)
        .args(["child", "status", "Dana Cohen", "לא הגיע"])
        .assert()
        .success();
    tzaharon(&server)
        .args(["child", "status", "Tom Ron", "חוג"])
        .assert()
        .success();
    tzaharon(&server)
        .args(["child", "note", "Avi Levi", "אבא אוסף ב-16:00"])
        .assert()
        .success();

    let board = board_json(&server, &[]);
    assert_eq!(names(&board), ["Avi Levi", "Tom Ron", "Dana Cohen"]);
    assert_eq!(board["children"][0]["notes"], "אבא אוסף ב-16:00");

    let filtered = board_json(&server, &["--filter", "חוג"]);
    assert_eq!(names(&filtered), ["Tom Ron"]);

    // Without --yes nothing is removed.
    tzaharon(&server)
        .args(["child", "remove", "Avi Levi"])
        .assert()
        .success()
        .stdout(contains("Nothing was changed"));
    assert_eq!(board_json(&server, &[])["total"], 3);

    tzaharon(&server)
        .args(["child", "remove", "Avi Levi", "--yes"])
        .assert()
        .success();
    assert_eq!(names(&board_json(&server, &[])), ["Tom Ron", "Dana Cohen"]);

    // Removing a status moves its children to the first one.
    tzaharon(&server)
        .args(["status", "remove", "חוג"])
        .assert()
        .success()
        .stdout(contains("1 children moved to כיתה"));

    tzaharon(&server).args(["reset", "--yes"]).assert().success();
    let board = board_json(&server, &[]);
    for child in board["children"].as_array().unwrap() {
        assert_eq!(child["statusId"], "1");
        assert!(child["lastUpdated"].is_string());
    }
    drop(server);

    // The file store keeps everything across a restart.
    let server = start_server(&data_file);
    let board = board_json(&server, &[]);
    assert_eq!(board["total"], 2);
    assert_eq!(board["counts"].as_array().unwrap().len(), 3);
}

#[test]
fn status_editing() {
    let dir = TempDir::new().expect("tempdir");
    let server = start_server(&dir.path().join("daycare_data.json"));

    tzaharon(&server)
        .args(["status", "add", "טיול", "--color", "bg-yellow-500"])
        .assert()
        .success();
    tzaharon(&server)
        .args(["status", "move", "טיול", "up"])
        .assert()
        .success();
    tzaharon(&server)
        .args(["status", "edit", "כיתה", "--label", "כיתה א"])
        .assert()
        .success();
    tzaharon(&server)
        .args(["status", "edit", "2", "--label", " "])
        .assert()
        .failure();

    let output = tzaharon(&server)
        .args(["status", "list", "--json"])
        .output()
        .expect("status list");
    let statuses: Value = serde_json::from_slice(&output.stdout).expect("statuses JSON");
    let labels: Vec<&str> = statuses
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["כיתה א", "שער", "חוג", "טיול", "לא הגיע"]);
    assert_eq!(statuses[3]["color"], "bg-yellow-500");
    assert_eq!(statuses[4]["kind"], "absent");
}
