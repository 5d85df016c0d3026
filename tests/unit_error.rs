use std::path::PathBuf;

use pomo::error::{exit_codes, Error};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let config = Error::InvalidConfig("bad".to_string());
    assert_eq!(config.exit_code(), exit_codes::USER_ERROR);

    let op = Error::OperationFailed("boom".to_string());
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);

    let lock = Error::LockFailed(PathBuf::from("/data/pomo.lock"));
    assert_eq!(lock.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn malformed_json_message_names_offset() {
    let err = Error::MalformedJson {
        offset: 7,
        reason: "object is never closed".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    assert!(err.to_string().contains("offset 7"));
}

#[test]
fn details_carry_structured_context() {
    let err = Error::MalformedJson {
        offset: 3,
        reason: "x".to_string(),
    };
    assert_eq!(err.details(), Some(serde_json::json!({ "offset": 3 })));

    let err = Error::LockFailed(PathBuf::from("/data/pomo.lock"));
    assert_eq!(
        err.details(),
        Some(serde_json::json!({ "path": "/data/pomo.lock" }))
    );

    assert!(Error::InvalidArgument("x".to_string()).details().is_none());
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}
