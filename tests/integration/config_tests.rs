use dupefind::cli::OutputFormat;
use dupefind::config::Config;
use dupefind::scanner::HashAlgorithm;
use figment::providers::Serialized;
use figment::{Figment, Jail};
use std::path::Path;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::from_figment(figment).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_file_then_env_precedence() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "dupefind.toml",
            r#"
                output = "csv"
                threads = 2
                skip_hidden = true
                ignore = ["*.bak"]
            "#,
        )?;
        jail.set_env("DUPEFIND_THREADS", 6);
        jail.set_env("DUPEFIND_HASH", "sha256");

        let config = Config::load(Some(Path::new("dupefind.toml"))).map_err(|e| e.to_string())?;

        assert_eq!(config.output, OutputFormat::Csv);
        assert_eq!(config.threads, Some(6));
        assert_eq!(config.hash, HashAlgorithm::Sha256);
        assert!(config.skip_hidden);
        assert_eq!(config.ignore, vec!["*.bak".to_string()]);
        Ok(())
    });
}

#[test]
fn test_config_env_with_wrong_type_is_error() {
    Jail::expect_with(|jail| {
        jail.create_file("dupefind.toml", "")?;
        jail.set_env("DUPEFIND_CHUNK_SIZE", "lots");

        let result = Config::load(Some(Path::new("dupefind.toml")));
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_config_missing_explicit_file() {
    Jail::expect_with(|_jail| {
        let err = Config::load(Some(Path::new("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
        Ok(())
    });
}

#[test]
fn test_config_feeds_finder() {
    let config = Config {
        follow_file_symlinks: false,
        threads: Some(1),
        chunk_size: 512,
        ..Default::default()
    };

    let finder_config = config.finder_config();
    assert!(!finder_config.follow_file_symlinks());
    assert_eq!(finder_config.max_concurrency, 1);
    assert_eq!(finder_config.chunk_size, 512);
}
