// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use codex::config::{ConfigFile, load_and_validate, load_optional};
use codex::errors::CodexError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_run_section_is_parsed() {
    let file = config_file(
        r#"
[run]
cwd = "/tmp"
env = ["FOO=bar", "EMPTY="]
timeout = "30s"
fallback_exit_code = 70
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.run.cwd, Some(PathBuf::from("/tmp")));
    assert_eq!(cfg.run.env, vec!["FOO=bar", "EMPTY="]);
    assert_eq!(cfg.run.timeout, Some(Duration::from_secs(30)));
    assert_eq!(cfg.run.fallback_exit_code, 70);
}

#[test]
fn empty_file_yields_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg, ConfigFile::default());
    assert_eq!(cfg.run.fallback_exit_code, 1);
}

#[test]
fn zero_timeout_means_no_timeout() {
    let file = config_file("[run]\ntimeout = \"0s\"\n");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.run.timeout, None);
}

#[test]
fn bad_timeout_returns_config_error() {
    let file = config_file("[run]\ntimeout = \"soon\"\n");

    match load_and_validate(file.path()) {
        Err(CodexError::ConfigError(msg)) => assert!(msg.contains("[run].timeout")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn bad_env_entry_returns_config_error() {
    let file = config_file("[run]\nenv = [\"JUSTAKEY\"]\n");

    match load_and_validate(file.path()) {
        Err(CodexError::ConfigError(msg)) => assert!(msg.contains("JUSTAKEY")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn zero_fallback_exit_code_is_rejected() {
    let file = config_file("[run]\nfallback_exit_code = 0\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(CodexError::ConfigError(_))
    ));
}

#[test]
fn unknown_keys_are_toml_errors() {
    let file = config_file("[run]\nshell = \"bash\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(CodexError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_io_error_and_absent_path_is_default() {
    assert!(matches!(
        load_and_validate("/no/such/codex.toml"),
        Err(CodexError::IoError(_))
    ));
    assert_eq!(load_optional(None).unwrap(), ConfigFile::default());
}

#[test]
fn cli_overrides_are_layered_over_config() {
    let file = config_file(
        r#"
[run]
cwd = "/srv"
env = ["A=config"]
timeout = "1m"
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();
    let base = vec!["PATH=/bin".to_string()];

    let opts = cfg.run.to_exec_options(
        Some(PathBuf::from("/work")),
        &["A=cli".to_string()],
        None,
        base.clone(),
    );
    assert_eq!(opts.cwd, Some(PathBuf::from("/work")));
    assert_eq!(opts.env, vec!["PATH=/bin", "A=config", "A=cli"]);
    assert_eq!(opts.timeout, Some(Duration::from_secs(60)));

    // Without any env overrides the child inherits instead of getting a copy.
    let inherit = ConfigFile::default()
        .run
        .to_exec_options(None, &[], Some(Duration::from_secs(2)), base);
    assert!(inherit.env.is_empty());
    assert_eq!(inherit.cwd, None);
    assert_eq!(inherit.timeout, Some(Duration::from_secs(2)));
}
