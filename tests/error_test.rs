//! エラーケーステスト

use live_detect::error::LiveDetectError;
use live_detect_common::Endpoints;

/// LiveDetectErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        LiveDetectError::Config("テスト設定エラー".to_string()),
        LiveDetectError::Status {
            status: 400,
            message: "Invalid image".to_string(),
        },
        LiveDetectError::FileNotFound("test.jpg".to_string()),
        LiveDetectError::StreamClosed,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// バックエンドのエラーメッセージがそのまま見えること
#[test]
fn test_status_message() {
    let err = LiveDetectError::Status {
        status: 400,
        message: "Invalid image".to_string(),
    };
    let display = format!("{}", err);
    assert!(display.contains("400"));
    assert!(display.contains("Invalid image"));
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let common = Endpoints::new("ftp://example.com").unwrap_err();
    let expected = common.to_string();
    let err: LiveDetectError = common.into();
    assert!(matches!(err, LiveDetectError::Common(_)));
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
    let err: LiveDetectError = io_error.into();
    assert!(matches!(err, LiveDetectError::Io(_)));
    assert!(format!("{}", err).contains("access denied"));
}
