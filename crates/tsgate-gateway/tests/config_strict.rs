#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tsgate_core::TimestampPolicy;
use tsgate_gateway::config::{self, Backend, Credentials};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8000"
datastore:
  timeout_msec: 5000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8000");
    assert_eq!(cfg.datastore.backend, Backend::Postgrest);
    assert_eq!(cfg.datastore.timeout_ms, 5000);
    assert_eq!(cfg.datastore.retries, 1);
    assert_eq!(cfg.datastore.url_env, "SUPABASE_URL");
    assert_eq!(cfg.datastore.api_key_env, "SUPABASE_API");
    assert_eq!(cfg.ingest.timestamp_policy, TimestampPolicy::Lenient);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
datastore:
  backend: memory
  timeout_ms: 2500
  retries: 0
ingest:
  timestamp_policy: strict
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.datastore.backend, Backend::Memory);
    assert_eq!(cfg.datastore.retries, 0);
    assert_eq!(cfg.ingest.timestamp_policy, TimestampPolicy::Strict);
}

#[test]
fn range_checks() {
    for bad in [
        "version: 2\n",
        "version: 1\ndatastore:\n  timeout_ms: 10\n",
        "version: 1\ndatastore:\n  retries: 9\n",
        "version: 1\nserver:\n  listen: \"not-an-addr\"\n",
        "version: 1\ndatastore:\n  url_env: \"\"\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "accepted: {bad}");
    }
}

#[test]
fn credentials_come_from_named_variables() {
    let cfg = config::load_from_str("version: 1\n").unwrap();

    let creds = Credentials::resolve(&cfg.datastore, |name| match name {
        "SUPABASE_URL" => Some("https://example.supabase.co".into()),
        "SUPABASE_API" => Some("secret-key".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(creds.url, "https://example.supabase.co");
    assert!(!format!("{creds:?}").contains("secret-key"));

    let err = Credentials::resolve(&cfg.datastore, |name| match name {
        "SUPABASE_URL" => Some("https://example.supabase.co".into()),
        _ => None,
    })
    .unwrap_err();
    assert!(err.to_string().contains("SUPABASE_API"));

    let blank = Credentials::resolve(&cfg.datastore, |_| Some("   ".into()));
    assert!(blank.is_err());
}
