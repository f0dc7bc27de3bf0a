use chainpost::http::{TransportError, TransportErrorKind};
use chainpost::{ChainpostError, Result};

#[test]
fn test_parse_error() {
    let err = ChainpostError::ParseError("test error".to_string());
    assert_eq!(err.to_string(), "解析错误: test error");
}

#[test]
fn test_invalid_definition() {
    let err = ChainpostError::InvalidDefinition("重复的步骤 id: a".to_string());
    assert_eq!(err.to_string(), "无效的请求链定义: 重复的步骤 id: a");
}

#[test]
fn test_error_conversion_from_anyhow() {
    let anyhow_err = anyhow::anyhow!("test anyhow error");
    let err: ChainpostError = anyhow_err.into();
    assert!(err.to_string().contains("test anyhow error"));
}

#[test]
fn test_error_conversion_from_url() {
    fn parse() -> Result<url::Url> {
        Ok(url::Url::parse("::not a url")?)
    }

    assert!(matches!(parse(), Err(ChainpostError::UrlParseError(_))));
}

#[test]
fn test_result_type() {
    fn returns_error() -> Result<()> {
        Err(ChainpostError::ParseError("test".to_string()))
    }

    match returns_error() {
        Err(ChainpostError::ParseError(msg)) => assert_eq!(msg, "test"),
        _ => panic!("Expected ParseError"),
    }
}

#[test]
fn test_transport_error_codes_are_stable() {
    let cases = [
        (TransportErrorKind::Timeout, "TIMEOUT"),
        (TransportErrorKind::Network, "NETWORK_ERROR"),
        (TransportErrorKind::Http, "HTTP_ERROR"),
        (TransportErrorKind::GraphQl, "GRAPHQL_ERROR"),
        (TransportErrorKind::Url, "URL_ERROR"),
        (TransportErrorKind::Request, "REQUEST_ERROR"),
    ];

    for (kind, code) in cases {
        assert_eq!(kind.code(), code);
    }

    assert_eq!(TransportError::timeout().to_string(), "TIMEOUT: Request timed out");
}
