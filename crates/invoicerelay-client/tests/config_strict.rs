#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use invoicerelay_client::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
channel:
  base_url: "wss://relay.example.com/ws"
  max_reconect_attempts: 3 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.channel.base_url, "ws://localhost:8000/ws");
    assert_eq!(cfg.channel.max_reconnect_attempts, 5);
    assert_eq!(cfg.channel.base_reconnect_delay_ms, 1000);
    assert!(cfg.flags.realtime);
    assert!(cfg.flags.notifications);
    assert!(cfg.flags.ai_insights);
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
channel:
  base_url: "wss://relay.example.com/ws"
  max_reconnect_attempts: 0
  base_reconnect_delay_ms: 250
flags:
  ai_insights: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.channel.max_reconnect_attempts, 0);
    assert_eq!(cfg.channel.base_reconnect_delay().as_millis(), 250);
    assert!(cfg.flags.realtime);
    assert!(!cfg.flags.ai_insights);
}

#[test]
fn rejects_future_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_non_websocket_base_url() {
    for url in ["http://relay.example.com/ws", "not a url"] {
        let yaml = format!("version: 1\nchannel:\n  base_url: \"{url}\"\n");
        let err = config::load_from_str(&yaml).expect_err("must fail");
        assert_eq!(err.code().as_str(), "CONFIG", "{url}");
    }
}

#[test]
fn rejects_out_of_range_backoff() {
    let too_many = "version: 1\nchannel:\n  max_reconnect_attempts: 33\n";
    assert_eq!(
        config::load_from_str(too_many).unwrap_err().code().as_str(),
        "CONFIG"
    );

    let zero_delay = "version: 1\nchannel:\n  base_reconnect_delay_ms: 0\n";
    assert_eq!(
        config::load_from_str(zero_delay).unwrap_err().code().as_str(),
        "CONFIG"
    );
}

#[test]
fn missing_file_is_config_error() {
    let err = config::load_from_file("/nonexistent/invoicerelay.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}
