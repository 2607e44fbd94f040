//! Integration tests for the full config-file → Settings → validation path.

use lb::config::{load_settings_from, validate};

fn write_config(contents: &str) -> tempfile::TempPath {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, contents.as_bytes()).unwrap();
    file.into_temp_path()
}

#[test]
fn a_complete_config_file_loads_and_validates() {
    let path = write_config(
        r#"
acceptor:
  port: 9000
  ip_version: 4
thread_pool:
  threads_number: auto
logging:
  console:
    level: info
  file:
    level: debug
    name: lb.log
load_balancing:
  algorithm: consistent_hash
  replicas: 32
  endpoints:
    - { ip: 127.0.0.1, port: 9001 }
    - { url: "http://backend.internal:8080" }
"#,
    );
    let settings = load_settings_from(path.as_ref()).unwrap();
    let result = validate(&settings);
    assert!(result.is_valid, "errors: {:?}", result.errors);
}

#[test]
fn weighted_round_robin_without_weights_fails_validation() {
    let path = write_config(
        r#"
acceptor:
  port: 9000
thread_pool:
  threads_number: 4
logging:
  console:
    level: info
load_balancing:
  algorithm: weighted_round_robin
  endpoints:
    - { ip: 127.0.0.1, port: 9001 }
"#,
    );
    let settings = load_settings_from(path.as_ref()).unwrap();
    let result = validate(&settings);
    assert!(!result.is_valid);
}

#[test]
fn endpoint_with_both_ip_and_url_fails_validation() {
    let path = write_config(
        r#"
acceptor:
  port: 9000
thread_pool:
  threads_number: auto
logging:
  console:
    level: info
load_balancing:
  algorithm: round_robin
  endpoints:
    - { ip: 127.0.0.1, port: 9001, url: "http://x" }
"#,
    );
    let settings = load_settings_from(path.as_ref()).unwrap();
    assert!(!validate(&settings).is_valid);
}
