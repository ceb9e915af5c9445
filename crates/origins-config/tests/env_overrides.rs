//! Integration tests for environment variable overrides.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::Jail;
use origins_config::OriginsConfig;

#[test]
fn env_vars_fill_config_values() {
    Jail::expect_with(|jail| {
        jail.set_env("ORIGINS_BOT__TOKEN", "123456:env-token");
        jail.set_env("ORIGINS_STORAGE__BUCKET_NAME", "env-bucket");

        let config = OriginsConfig::load().expect("config loads");
        assert_eq!(config.bot.token, "123456:env-token");
        assert_eq!(config.storage.bucket_name, "env-bucket");
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".origins")?;
        jail.create_file(
            ".origins/config.toml",
            r#"
[server]
bind = "0.0.0.0:9999"
"#,
        )?;
        jail.set_env("ORIGINS_SERVER__BIND", "127.0.0.1:7777");

        let config = OriginsConfig::load().expect("config loads");
        assert_eq!(config.server.bind, "127.0.0.1:7777");
        Ok(())
    });
}

#[test]
fn project_toml_beats_defaults() {
    Jail::expect_with(|jail| {
        jail.create_dir(".origins")?;
        jail.create_file(
            ".origins/config.toml",
            r#"
[server]
db_path = "/var/lib/origins/origins.db"
"#,
        )?;

        let config = OriginsConfig::load().expect("config loads");
        assert_eq!(config.server.db_path, "/var/lib/origins/origins.db");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        Ok(())
    });
}
