//! Configuration loading tests

use tempfile::TempDir;

use biolinks::config::{MissingUrlPolicy, StaticConfig};
use biolinks::errors::BioLinksError;

const SAMPLE: &str = r#"
[database]
on_missing_url = "memory"
lazy_init = true

[database.init_retry]
max_retries = 7
initial_delay_ms = 250

[retention]
max_age_days = 90

[page]
title = "Jane Roe"
tagline = "Rustacean"

[[links]]
name = "Mastodon"
url = "https://mastodon.social/@janeroe"
icon = "fa-mastodon"
category = "Social"
"#;

#[test]
fn test_load_reads_toml_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("biolinks.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let config = StaticConfig::load(Some(path.to_str().unwrap())).unwrap();

    assert_eq!(config.database.on_missing_url, MissingUrlPolicy::Memory);
    assert!(config.database.lazy_init);
    assert_eq!(config.database.init_retry.max_retries, 7);
    assert_eq!(config.database.init_retry.initial_delay_ms, 250);
    // 未写出的字段取默认值
    assert_eq!(config.database.init_retry.exponential_base, 2.0);
    assert_eq!(config.database.op_retry.max_retries, 3);
    assert_eq!(config.retention.max_age_days, Some(90));
    assert_eq!(config.page.title, "Jane Roe");
    assert_eq!(config.links.len(), 1);
    assert_eq!(config.links[0].category.as_deref(), Some("Social"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let config = StaticConfig::load(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.links.len(), 4);
    assert_eq!(config.retention.max_age_days, None);
    assert_eq!(config.database.on_missing_url, MissingUrlPolicy::Fail);
}

#[test]
fn test_saved_sample_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    StaticConfig::write_sample_config(&path).unwrap();
    let config = StaticConfig::load(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.page.title, StaticConfig::default().page.title);
    assert_eq!(config.links, StaticConfig::default().links);
}

#[test]
fn test_malformed_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = "eighty"

[database]
database_url = "postgres://u:p@db/app"

[page]
title = "Jane"
"#,
    )
    .unwrap();

    let err = StaticConfig::load(Some(path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, BioLinksError::Configuration(_)));
    assert!(err.message().contains("broken.toml"));
}

#[test]
fn test_unparseable_toml_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("syntax.toml");
    std::fs::write(&path, "[page\ntitle = ").unwrap();

    assert!(matches!(
        StaticConfig::load(Some(path.to_str().unwrap())),
        Err(BioLinksError::Configuration(_))
    ));
}
