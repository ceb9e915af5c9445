//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use origins_config::OriginsConfig;

#[test]
fn loads_storage_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[storage]
access_key_id = "toml-key"
secret_access_key = "toml-secret"
bucket_name = "toml-bucket"
endpoint = "http://localhost:9000"
region = "auto"
url_ttl_secs = 120
"#,
        )?;

        let config: OriginsConfig = Figment::from(Serialized::defaults(OriginsConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.storage.access_key_id, "toml-key");
        assert_eq!(config.storage.secret_access_key, "toml-secret");
        assert_eq!(config.storage.bucket_name, "toml-bucket");
        assert_eq!(config.storage.endpoint, "http://localhost:9000");
        assert_eq!(config.storage.url_ttl_secs, 120);
        assert!(config.storage.is_configured());
        Ok(())
    });
}

#[test]
fn loads_report_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[report]
recipients = ["usr-11111111", "usr-22222222"]
extra_chat_id = "987654321"
target_day = "saturday"
public_base_url = "https://origins.example.com"
"#,
        )?;

        let config: OriginsConfig = Figment::from(Serialized::defaults(OriginsConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(
            config.report.recipients,
            vec!["usr-11111111".to_string(), "usr-22222222".to_string()]
        );
        assert_eq!(config.report.extra_chat_id, "987654321");
        assert_eq!(config.report.public_base_url, "https://origins.example.com");
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[bot]
token = "123456:abcdef"
"#,
        )?;

        let config: OriginsConfig = Figment::from(Serialized::defaults(OriginsConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.bot.token, "123456:abcdef");
        assert_eq!(config.bot.api_base, "https://api.telegram.org");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.report.target_day, "saturday");
        Ok(())
    });
}
