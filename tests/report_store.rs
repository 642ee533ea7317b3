use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

const FAST: [&str; 3] = ["--no-docker", "--no-audio", "--no-temp"];

fn sysreport_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sysreport"));
    cmd.env("HOME", home);
    for key in [
        "SYSREPORT_CONFIG",
        "SYSREPORT_LOG",
        "SYSREPORT_LOGS_DIR",
        "SYSREPORT_LOGS_MAX",
        "SYSREPORT_COLLECT_BUDGET_SECS",
        "SYSREPORT_COLLECT_DOCKER",
        "SYSREPORT_COLLECT_AUDIO",
        "SYSREPORT_COLLECT_TEMPERATURE",
        "SYSREPORT_UI_COLOR",
        "SYSREPORT_UI_ECHO",
        "SUDO_UID",
        "SUDO_GID",
        "SUDO_USER",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("SYSREPORT_COLLECT_TIMEOUT_SECS", "2");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    sysreport_cmd(home).args(args).output().expect("run sysreport")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home = std::env::temp_dir().join(format!(
        "sysreport-store-test-{}-{seq}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn logs_dir(home: &Path) -> PathBuf {
    home.join(".config/sysreport/logs")
}

fn log_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read logs dir")
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.ends_with(".log") && !n.starts_with('.'))
        .collect();
    names.sort();
    names
}

fn report_path(stdout: &[u8]) -> PathBuf {
    let stdout = String::from_utf8_lossy(stdout);
    let line = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Report:"))
        .unwrap_or_else(|| panic!("no Report line in {stdout}"));
    PathBuf::from(line.trim())
}

fn section_headers(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|l| l.strip_prefix("=== ")?.strip_suffix(" ==="))
        .map(str::to_string)
        .collect()
}

#[test]
fn default_run_writes_timestamped_report_and_summary() {
    let home = make_temp_home();
    let out = run(&home, &FAST);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Platform: "), "stdout={stdout}");
    assert!(stdout.contains("Logs:     1/10 retained"), "stdout={stdout}");

    let path = report_path(&out.stdout);
    assert_eq!(path.parent(), Some(logs_dir(&home).as_path()));
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(name.starts_with("sysreport_") && name.ends_with(".log"), "name={name}");

    let body = std::fs::read_to_string(&path).expect("read report");
    assert!(body.contains(" System Diagnostic Report"));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn disabled_toggles_leave_exactly_seven_sections_in_order() {
    let home = make_temp_home();
    let out = run(&home, &FAST);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let body = std::fs::read_to_string(report_path(&out.stdout)).expect("read report");
    assert_eq!(
        section_headers(&body),
        vec![
            "System Overview",
            "CPU",
            "Memory",
            "Disk",
            "Network",
            "Processes",
            "Mounts"
        ]
    );
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn output_name_with_and_without_extension_share_a_path() {
    let home = make_temp_home();
    let mut args = FAST.to_vec();
    args.extend(["-o", "myreport"]);
    let a = run(&home, &args);
    assert!(a.status.success(), "stderr={}", String::from_utf8_lossy(&a.stderr));

    let mut args = FAST.to_vec();
    args.extend(["-o", "myreport.log"]);
    let b = run(&home, &args);
    assert!(b.status.success(), "stderr={}", String::from_utf8_lossy(&b.stderr));

    let path = report_path(&a.stdout);
    assert_eq!(path, report_path(&b.stdout));
    assert_eq!(path, logs_dir(&home).join("sysreport_myreport.log"));
    assert_eq!(log_names(&logs_dir(&home)), vec!["sysreport_myreport.log"]);
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn output_name_cannot_escape_the_log_directory() {
    let home = make_temp_home();
    let mut args = FAST.to_vec();
    args.extend(["-o", "../../escaped"]);
    let out = run(&home, &args);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(report_path(&out.stdout), logs_dir(&home).join("sysreport_escaped.log"));
    assert!(!home.join(".config/escaped.log").exists());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn retention_limit_two_keeps_the_two_newest_of_three() {
    let home = make_temp_home();
    for (i, name) in ["report-1", "report-2", "report-3"].into_iter().enumerate() {
        let mut args = FAST.to_vec();
        args.extend(["-o", name]);
        let out = sysreport_cmd(&home)
            .env("SYSREPORT_LOGS_MAX", "2")
            .args(&args)
            .output()
            .expect("run sysreport");
        assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

        let path = report_path(&out.stdout);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .and_then(|f| {
                f.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 * (i as u64 + 1)))
            })
            .expect("pin mtime");

        let stdout = String::from_utf8_lossy(&out.stdout);
        let expected = format!("Logs:     {}/2 retained", std::cmp::min(i + 1, 2));
        assert!(stdout.contains(&expected), "stdout={stdout}");
        if i == 2 {
            assert!(stdout.contains("Removed:  1 old report(s)"), "stdout={stdout}");
        }
    }

    assert_eq!(
        log_names(&logs_dir(&home)),
        vec!["sysreport_report-2.log", "sysreport_report-3.log"]
    );
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn retention_leaves_other_logs_in_a_shared_directory_alone() {
    let home = make_temp_home();
    let shared = home.join("shared-logs");
    std::fs::create_dir_all(&shared).expect("create shared dir");
    std::fs::write(shared.join("nginx-access.log"), b"GET /\n").expect("write foreign log");
    std::fs::write(shared.join("other.log"), b"x\n").expect("write foreign log");

    for name in ["first", "second"] {
        let mut args = FAST.to_vec();
        args.extend(["-o", name]);
        let out = sysreport_cmd(&home)
            .env("SYSREPORT_LOGS_DIR", &shared)
            .env("SYSREPORT_LOGS_MAX", "1")
            .args(&args)
            .output()
            .expect("run sysreport");
        assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("Logs:     1/1 retained"), "stdout={stdout}");
    }

    assert_eq!(
        log_names(&shared),
        vec!["nginx-access.log", "other.log", "sysreport_second.log"]
    );
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn quiet_suppresses_the_summary() {
    let home = make_temp_home();
    let mut args = FAST.to_vec();
    args.push("--quiet");
    let out = run(&home, &args);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());
    assert_eq!(log_names(&logs_dir(&home)).len(), 1);
    let _ = std::fs::remove_dir_all(&home);
}
