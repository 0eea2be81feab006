use chrono::{TimeDelta, Utc};
use integration_tests::harness::{ApacheSite, access_line, init_test_tracing};
use pretty_assertions::assert_eq;
use tollgate_core::conf::{LoaderOptions, load_config, load_config_with_env};
use tollgate_core::honeypot::{evaluate, run_at};
use tollgate_core::plugin::Status;

const DEBIAN_CONF: &str = "\
ServerRoot {root}
Include ports.conf
LogFormat \"%v:%p %h %l %u %t \\\"%r\\\" %>s %O \\\"%{Referer}i\\\" \\\"%{User-Agent}i\\\"\" vhost_combined
LogFormat \"%h %l %u %t \\\"%r\\\" %>s %O \\\"%{Referer}i\\\" \\\"%{User-Agent}i\\\"\" combined
<IfModule log_config_module>
    CustomLog ${APACHE_LOG_DIR}/access.log combined
</IfModule>
IncludeOptional sites-enabled/*.conf
";

const SHOP_VHOST: &str = "\
<VirtualHost *:80>
    ServerName shop.example
    ServerAlias www.shop.example
    CustomLog ${APACHE_LOG_DIR}/shop_access.log combined
</VirtualHost>
";

const BLOG_VHOST: &str = "\
<VirtualHost *:80>
    ServerName blog.example
</VirtualHost>
";

fn debian_site() -> ApacheSite {
    let site = ApacheSite::new();
    site.write_config(DEBIAN_CONF);
    site.write("ports.conf", "Listen 80\n");
    site.write("sites-enabled/010-shop.conf", SHOP_VHOST);
    site.write("sites-enabled/020-blog.conf", BLOG_VHOST);
    site.write(
        "envvars",
        "export APACHE_RUN_USER=www-data\nexport APACHE_LOG_DIR={root}/log$SUFFIX\n",
    );
    site
}

/// Five lines, three honeypot hits inside the last hour from two hosts.
#[test]
fn reports_each_offending_host() {
    // Arrange
    let now = Utc::now();
    let site = ApacheSite::new();
    site.write_config("CustomLog {root}/access.log combined\n");
    site.write_log(
        "access.log",
        &[
            access_line("1.2.3.4", "/trap", 404, now, TimeDelta::minutes(50)),
            access_line("10.0.0.1", "/index.html", 200, now, TimeDelta::minutes(40)),
            access_line("5.6.7.8", "/trap", 404, now, TimeDelta::minutes(30)),
            access_line("10.0.0.2", "/trap", 200, now, TimeDelta::minutes(20)),
            access_line("1.2.3.4", "/trap", 404, now, TimeDelta::minutes(10)),
        ],
    );

    // Act
    let output = evaluate(&site.settings("/trap", "1h"), now);

    // Assert
    assert_eq!(output.status, Status::Warning);
    assert_eq!(output.status.code(), 1);
    assert_eq!(output.render(), "|1.2.3.4=2\n|5.6.7.8=1\n");
}

#[test]
fn no_matches_is_ok_and_silent() {
    let now = Utc::now();
    let site = ApacheSite::new();
    site.write_config("CustomLog {root}/access.log combined\n");
    site.write_log(
        "access.log",
        &[access_line("1.2.3.4", "/", 200, now, TimeDelta::minutes(1))],
    );

    let output = evaluate(&site.settings("/trap", "1h"), now);

    assert_eq!(output.status, Status::Ok);
    assert_eq!(output.render(), "");
}

#[test]
fn hits_outside_the_window_are_ignored() {
    // Arrange
    let now = Utc::now();
    let site = ApacheSite::new();
    site.write_config("CustomLog {root}/access.log combined\n");
    site.write_log(
        "access.log",
        &[
            access_line("1.2.3.4", "/trap", 404, now, TimeDelta::hours(3)),
            access_line("5.6.7.8", "/trap", 404, now, TimeDelta::minutes(90)),
            access_line("9.9.9.9", "/trap", 404, now, TimeDelta::minutes(5)),
        ],
    );

    // Act
    let hour = evaluate(&site.settings("/trap", "1h"), now);
    let two_hours = evaluate(&site.settings("/trap", "2h"), now);
    let day = evaluate(&site.settings("/trap", "1d"), now);

    // Assert
    assert_eq!(hour.lines, vec!["|9.9.9.9=1"]);
    assert_eq!(two_hours.lines, vec!["|5.6.7.8=1", "|9.9.9.9=1"]);
    assert_eq!(day.lines.len(), 3);
}

/// Debian layout: includes, envvars, per-vhost logs.
#[test]
fn debian_layout_main_server() {
    // Arrange
    let now = Utc::now();
    let site = debian_site();
    site.write_log(
        "log/access.log",
        &[access_line("1.2.3.4", "/wp-login.php", 404, now, TimeDelta::minutes(3))],
    );
    site.write_log(
        "log/shop_access.log",
        &[access_line("5.6.7.8", "/wp-login.php", 404, now, TimeDelta::minutes(3))],
    );
    let mut settings = site.settings("/wp-login.php", "1h");
    settings.env_file = Some(site.root().join("envvars"));

    // Act
    let counts = run_at(&settings, now).unwrap();

    // Assert
    assert_eq!(counts.get("1.2.3.4"), 1);
    assert_eq!(counts.get("5.6.7.8"), 0);
}

#[test]
fn debian_layout_virtual_host() {
    // Arrange
    let now = Utc::now();
    let site = debian_site();
    site.write_log(
        "log/access.log",
        &[access_line("1.2.3.4", "/wp-login.php", 404, now, TimeDelta::minutes(3))],
    );
    site.write_log(
        "log/shop_access.log",
        &[
            access_line("5.6.7.8", "/wp-login.php", 404, now, TimeDelta::minutes(3)),
            access_line("5.6.7.8", "/wp-login.php", 404, now, TimeDelta::minutes(2)),
        ],
    );
    let mut settings = site.settings("/wp-login.php", "1h");
    settings.env_file = Some(site.root().join("envvars"));

    // Act
    settings.vhost = Some("www.shop.example".to_string());
    let shop = evaluate(&settings, now);
    settings.vhost = Some("blog.example".to_string());
    let blog = evaluate(&settings, now);
    settings.vhost = Some("missing.example".to_string());
    let missing = evaluate(&settings, now);

    // Assert
    assert_eq!(shop.lines, vec!["|5.6.7.8=2"]);
    // blog has no CustomLog of its own and shares the main server log
    assert_eq!(blog.lines, vec!["|1.2.3.4=1"]);
    assert_eq!(missing.status, Status::Critical);
}

#[test]
fn debian_layout_without_envvars_is_critical() {
    // ${APACHE_LOG_DIR} stays literal, so the log cannot be opened
    let site = debian_site();

    let output = evaluate(&site.settings("/wp-login.php", "1h"), Utc::now());

    assert_eq!(output.status, Status::Critical);
    assert_eq!(output.lines.len(), 1);
}

#[test]
fn resolving_twice_yields_equal_trees() {
    let site = debian_site();
    let root = site.config_path();
    let options = LoaderOptions::for_root(&root);
    let env = site.root().join("envvars");

    let first = load_config(&root, &options).unwrap();
    let second = load_config(&root, &options).unwrap();
    let with_env = load_config_with_env(&root, &options, Some(&env)).unwrap();
    let with_env_again = load_config_with_env(&root, &options, Some(&env)).unwrap();

    assert_eq!(first, second);
    assert_eq!(with_env, with_env_again);
}

#[test]
fn unreadable_config_is_critical() {
    let site = ApacheSite::new();

    let output = evaluate(&site.settings("/trap", "1h"), Utc::now());

    assert_eq!(output.status, Status::Critical);
    assert!(output.lines[0].starts_with("CRITICAL: "));
}

#[test]
fn scan_summary_is_logged() {
    // Arrange
    let events = init_test_tracing();
    let now = Utc::now();
    let site = ApacheSite::new();
    site.write_config("CustomLog {root}/access.log combined\n");
    site.write_log(
        "access.log",
        &[
            access_line("1.2.3.4", "/summary-trap", 404, now, TimeDelta::minutes(1)),
            access_line("5.6.7.8", "/summary-trap", 404, now, TimeDelta::minutes(1)),
        ],
    );

    // Act
    run_at(&site.settings("/summary-trap", "1h"), now).unwrap();

    // Assert
    let events = events.lock().unwrap();
    let summary = events
        .iter()
        .find(|e| e.field("honeypot") == Some("/summary-trap"))
        .expect("summary event");
    assert_eq!(summary.message.as_deref(), Some("honeypot scan complete"));
    assert_eq!(summary.field("hosts"), Some("2"));
    assert_eq!(summary.field("hits"), Some("2"));
}

#[test]
fn verbose_run_dumps_config_hits_and_counts_as_json() {
    // Arrange
    let events = init_test_tracing();
    let now = Utc::now();
    let site = ApacheSite::new();
    site.write_config("CustomLog {root}/json-access.log combined\n");
    site.write_log(
        "json-access.log",
        &[
            access_line("1.2.3.4", "/json-trap", 404, now, TimeDelta::minutes(1)),
            access_line("1.2.3.4", "/", 200, now, TimeDelta::minutes(1)),
        ],
    );

    // Act
    run_at(&site.settings("/json-trap", "1h"), now).unwrap();

    // Assert
    let events = events.lock().unwrap();
    let config = events
        .iter()
        .filter(|e| e.message.as_deref() == Some("resolved configuration"))
        .find_map(|e| e.field("config").filter(|c| c.contains("json-access.log")))
        .expect("config dump");
    assert!(config.starts_with('['));

    let hits: Vec<_> = events
        .iter()
        .filter(|e| e.message.as_deref() == Some("honeypot hit"))
        .filter(|e| e.field("honeypot") == Some("/json-trap"))
        .filter_map(|e| e.field("record"))
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].contains("\"remote_host\":\"1.2.3.4\""));
    assert!(hits[0].contains("\"request_url_path\":\"/json-trap\""));

    let counts = events
        .iter()
        .filter(|e| e.message.as_deref() == Some("host counts"))
        .find(|e| e.field("honeypot") == Some("/json-trap"))
        .and_then(|e| e.field("counts"))
        .expect("counts dump");
    assert_eq!(counts, r#"{"1.2.3.4":1}"#);
}
