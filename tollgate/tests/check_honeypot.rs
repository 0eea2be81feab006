use chrono::{TimeDelta, Utc};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const INHERITED_ENV: &[&str] = &[
    "RUST_LOG",
    "TOLLGATE_VERBOSE",
    "TOLLGATE_CONFIG",
    "TOLLGATE_ENV_FILE",
    "TOLLGATE_VHOST",
    "TOLLGATE_HONEYPOT",
    "TOLLGATE_PERIOD",
];

fn check_honeypot(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_check_honeypot"));
    for var in INHERITED_ENV {
        cmd.env_remove(var);
    }
    cmd.args(args)
        .output()
        .expect("failed to run check_honeypot")
}

fn write_site(dir: &Path, log_lines: &[String]) -> String {
    let log = dir.join("access.log");
    let conf = dir.join("apache2.conf");
    fs::write(&log, log_lines.concat()).unwrap();
    fs::write(&conf, format!("CustomLog {} combined\n", log.display())).unwrap();
    conf.display().to_string()
}

fn line(host: &str, path: &str, status: u16, minutes_ago: i64) -> String {
    let at = Utc::now() - TimeDelta::minutes(minutes_ago);
    format!(
        "{host} - - [{}] \"GET {path} HTTP/1.1\" {status} 0 \"-\" \"scanner\"\n",
        at.format("%d/%b/%Y:%H:%M:%S +0000")
    )
}

/// Three recent hits from two hosts: WARNING with one line per host.
#[test]
fn honeypot_hits_exit_with_warning() {
    let dir = tempdir().unwrap();
    let conf = write_site(
        dir.path(),
        &[
            line("1.2.3.4", "/trap", 404, 5),
            line("5.6.7.8", "/trap", 404, 10),
            line("1.2.3.4", "/trap", 404, 15),
            line("1.2.3.4", "/", 200, 20),
            line("9.9.9.9", "/trap", 404, 24 * 60),
        ],
    );

    let out = check_honeypot(&["-p", &conf, "--honeypot", "/trap"]);

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, "|1.2.3.4=2\n|5.6.7.8=1\n");
}

/// No hits: OK and nothing on stdout.
#[test]
fn quiet_logs_exit_ok() {
    let dir = tempdir().unwrap();
    let conf = write_site(dir.path(), &[line("1.2.3.4", "/", 200, 5)]);

    let out = check_honeypot(&["-p", &conf, "--honeypot", "/trap"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_config_exits_critical() {
    let dir = tempdir().unwrap();
    let conf = dir.path().join("absent.conf");

    let out = check_honeypot(&["-p", conf.to_str().unwrap(), "--honeypot", "/trap"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("CRITICAL: "));
}

#[test]
fn invalid_period_exits_unknown() {
    let out = check_honeypot(&["--honeypot", "/trap", "--period", "100h"]);

    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("UNKNOWN: "));
}

#[test]
fn missing_argument_exits_unknown() {
    let out = check_honeypot(&[]);

    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn help_exits_ok() {
    let out = check_honeypot(&["--help"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("--period"));
}
