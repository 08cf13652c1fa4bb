//! Error surface checks

use ballot_verify::error::{BallotError, Result};
use ballot_verify::roll::VoterRoll;

#[test]
fn test_display_messages() {
    let err = BallotError::FileNotFound("roll.csv".into());
    assert_eq!(err.to_string(), "file not found: roll.csv");

    let err = BallotError::Schema("WARD".into());
    assert!(err.to_string().contains("missing required column"));
    assert!(err.to_string().contains("WARD"));

    let err = BallotError::Provider("command not found".into());
    assert_eq!(err.to_string(), "OCR provider error: command not found");

    let err = BallotError::EmptyCorpus;
    assert_eq!(err.to_string(), "empty candidate corpus");
}

#[test]
fn test_io_error_converts() {
    fn read_missing() -> Result<String> {
        let content = std::fs::read_to_string("/nonexistent/voters.csv")?;
        Ok(content)
    }

    let err = read_missing().unwrap_err();
    assert!(matches!(err, BallotError::Io(_)));
    assert!(err.to_string().starts_with("IO error:"));
}

#[test]
fn test_json_error_converts() {
    fn parse_bad() -> Result<serde_json::Value> {
        let value = serde_json::from_str("not json")?;
        Ok(value)
    }

    assert!(matches!(parse_bad().unwrap_err(), BallotError::JsonParse(_)));
}

#[test]
fn test_roll_load_reports_missing_file() {
    let err = VoterRoll::load_csv(std::path::Path::new("/nonexistent/roll.csv")).unwrap_err();
    assert!(matches!(err, BallotError::FileNotFound(_)));
}

#[test]
fn test_roll_schema_error_lists_all_missing_columns() {
    let csv = "First_Name,Last_Name\nJane,Doe\n";
    let err = VoterRoll::from_reader(csv.as_bytes()).unwrap_err();
    match err {
        BallotError::Schema(missing) => {
            assert!(missing.contains("Street_Number"));
            assert!(missing.contains("WARD"));
            assert!(!missing.contains("First_Name"));
        }
        other => panic!("expected schema error, got: {other}"),
    }
}
