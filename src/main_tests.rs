use super::*;
use dining_ring::Error;
use std::io::Write;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn flag_overrides_the_config_file() {
    let file = Config::default().with_philosophers(5);
    assert_eq!(requested_philosophers(Some(3), Some(&file), 2), 3);
}

#[test]
fn config_file_overrides_the_peer_count() {
    let file = Config::default().with_philosophers(5);
    assert_eq!(requested_philosophers(None, Some(&file), 2), 5);
}

#[test]
fn peer_count_is_the_last_resort() {
    assert_eq!(requested_philosophers(None, None, 4), 4);
}

#[tokio::test]
async fn node_refuses_a_ring_the_config_does_not_match() {
    let file = config_file("philosophers = 5\nconnect_attempts = 1\n");
    let path = file.path().to_string_lossy().into_owned();
    let cli = Cli::try_parse_from([
        "dining-ring",
        "--config",
        path.as_str(),
        "node",
        "--rank",
        "0",
        "--peers",
        "127.0.0.1:1,127.0.0.1:2",
    ])
    .unwrap();

    let err = run(cli).await.unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(
        err,
        Error::CountMismatch {
            requested: 5,
            launched: 2
        }
    ));
}

#[test]
fn report_names_the_verdict() {
    assert!(report(true).contains("true"));
    assert!(report(false).contains("false"));
}
