use serial_test::serial;
use std::io::Write;
use std::net::SocketAddr;
use tempfile::NamedTempFile;
use webhook_receiver::cli::Cli;
use webhook_receiver::config::Config;
use webhook_receiver::notification::MarkerLevel;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let file = config_file(
        r#"
        log_level = "debug"
        [server]
        host = "127.0.0.1"
        port = 8080
        max_body_bytes = 4096
        [metrics]
        enabled = true
        listen_address = "0.0.0.0:9200"
        [[categories]]
        name = "network"
        message = "Network alert"
        level = "warn"
        [[categories]]
        name = "storage"
        message = "Storage alert"
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.max_body_bytes, 4096);
    assert!(config.metrics.enabled);
    assert_eq!(
        config.metrics.listen_address,
        "0.0.0.0:9200".parse::<SocketAddr>().unwrap()
    );
    assert_eq!(config.categories.len(), 2);
    assert_eq!(config.categories[0].level, MarkerLevel::Warn);
    assert_eq!(config.categories[1].level, MarkerLevel::Info);
}

#[test]
#[serial]
fn test_load_default_values() {
    let file = config_file("");

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.server.port, 5001);
    assert_eq!(config.server.bind_address(), "0.0.0.0:5001");
}

#[test]
#[serial]
fn test_no_config_file_uses_defaults() {
    let config = Config::load(&Cli::default()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_invalid_value_type() {
    let file = config_file(
        r#"
        [server]
        port = "five thousand"
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    assert!(Config::load(&cli).is_err());
}

#[test]
#[serial]
fn test_category_missing_message_is_rejected() {
    let file = config_file(
        r#"
        [[categories]]
        name = "network"
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    assert!(Config::load(&cli).is_err());
}

#[test]
#[serial]
fn test_env_overrides_file_and_cli_overrides_env() {
    let file = config_file(
        r#"
        log_level = "warn"
        [server]
        port = 7000
    "#,
    );

    std::env::set_var("WEBHOOK_RECEIVER_SERVER__PORT", "7100");
    std::env::set_var("WEBHOOK_RECEIVER_LOG_LEVEL", "debug");

    let from_env = Config::load(&Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    });
    let from_cli = Config::load(&Cli {
        config: Some(file.path().to_path_buf()),
        port: Some(7200),
        metrics: true,
        ..Default::default()
    });

    std::env::remove_var("WEBHOOK_RECEIVER_SERVER__PORT");
    std::env::remove_var("WEBHOOK_RECEIVER_LOG_LEVEL");

    let from_env = from_env.unwrap();
    assert_eq!(from_env.server.port, 7100);
    assert_eq!(from_env.log_level, "debug");
    assert!(!from_env.metrics.enabled);

    let from_cli = from_cli.unwrap();
    assert_eq!(from_cli.server.port, 7200);
    assert_eq!(from_cli.server.host, "0.0.0.0");
    assert!(from_cli.metrics.enabled);
}
