use super::*;

fn update(id: i64) -> Update {
    Update {
        update_id: id,
        message: Some(ChatMessage {
            chat: Chat { id: "123".to_string() },
            text: "/status".to_string(),
        }),
    }
}

#[test]
fn next_offset_advances_past_highest_update_id() {
    let batch = vec![update(5), update(7), update(6)];
    assert_eq!(next_offset(0, &batch), 8);
}

#[test]
fn next_offset_unchanged_when_batch_empty() {
    assert_eq!(next_offset(42, &[]), 42);
}

#[test]
fn transport_url_includes_bot_token_and_method() {
    let transport = TelegramTransport::new("abc123");
    assert_eq!(transport.url("getUpdates"), "https://api.telegram.org/botabc123/getUpdates");
}

#[test]
fn update_deserializes_message_text() {
    let json = r#"{"update_id": 1, "message": {"chat": {"id": 999}, "text": "/help"}}"#;
    let update: Update = serde_json::from_str(json).expect("parse");
    assert_eq!(update.update_id, 1);
    let message = update.message.expect("message");
    assert_eq!(message.text, "/help");
    assert_eq!(message.chat.id, "999");
}
