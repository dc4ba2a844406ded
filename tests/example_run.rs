//! Integration tests for the `example run` command.
use h2grid::cli::RunOpts;
use h2grid::cli::example::handle_example_run_command;
use h2grid::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    let dir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(dir.path().to_path_buf()),
        ..RunOpts::default()
    };
    let settings = Settings {
        log_level: "off".to_string(),
        ..Settings::default()
    };
    handle_example_run_command("hydrogen_microgrid", &opts, Some(settings)).unwrap();

    assert!(dir.path().join("schedule.csv").is_file());
    assert!(dir.path().join("summary.toml").is_file());
}

#[test]
fn test_handle_example_run_command_unknown_example() {
    let opts = RunOpts::default();
    assert!(handle_example_run_command("no_such_example", &opts, None).is_err());
}
