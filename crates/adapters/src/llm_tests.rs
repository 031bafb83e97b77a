use super::*;

#[test]
fn new_rejects_empty_api_key() {
    let err = ClaudeClient::new("", "claude-sonnet-4-5-20250929", 4096).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey));
}

#[test]
fn new_accepts_nonempty_api_key() {
    let client = ClaudeClient::new("sk-ant-test", "claude-sonnet-4-5-20250929", 4096);
    assert!(client.is_ok());
}

#[test]
fn extract_text_picks_first_text_block() {
    let response = MessagesResponse {
        content: vec![
            ContentBlock {
                kind: "tool_use".to_string(),
                text: String::new(),
            },
            ContentBlock {
                kind: "text".to_string(),
                text: "hello from claude".to_string(),
            },
        ],
    };
    assert_eq!(extract_text(response).unwrap(), "hello from claude");
}

#[test]
fn extract_text_errors_when_no_text_block_present() {
    let response = MessagesResponse {
        content: vec![ContentBlock {
            kind: "tool_use".to_string(),
            text: String::new(),
        }],
    };
    assert!(matches!(extract_text(response), Err(LlmError::NoTextContent)));
}

#[test]
fn retryable_status_set_matches_anthropic_transient_codes() {
    for code in [429, 500, 502, 503, 529] {
        assert!(RETRYABLE_STATUS.contains(&code));
    }
    assert!(!RETRYABLE_STATUS.contains(&400));
    assert!(!RETRYABLE_STATUS.contains(&401));
}
