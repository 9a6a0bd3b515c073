//! Integration tests for the listener buffer and loopback backend
//!
//! Covers:
//! - FIFO delivery under concurrent producers
//! - Non-blocking polls on empty queues
//! - Scripted delivery through the loopback backend
use nova_messaging_shared::{
    load_script, AppContext, AppOptions, ListenerBuffer, LoopbackConfig, LoopbackMessaging,
    Message, MessagingModule, PlatformContext,
};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_three_tokens_scenario() {
    let buffer = ListenerBuffer::new();
    buffer.push_token("A");
    buffer.push_token("B");
    buffer.push_token("C");

    assert_eq!(buffer.poll_token().as_deref(), Some("A"));
    assert_eq!(buffer.poll_token().as_deref(), Some("B"));
    assert_eq!(buffer.poll_token().as_deref(), Some("C"));
    assert_eq!(buffer.poll_token(), None);
}

#[test]
fn test_concurrent_producer_preserves_order() {
    let buffer = Arc::new(ListenerBuffer::new());
    const COUNT: usize = 2_000;

    let producer = {
        let buffer = buffer.clone();
        thread::spawn(move || {
            for i in 0..COUNT {
                buffer.push_token(format!("token-{i}"));
                buffer.push_message(Message::with_id(format!("msg-{i}")));
            }
        })
    };

    let mut tokens = Vec::with_capacity(COUNT);
    let mut messages = Vec::with_capacity(COUNT);
    let deadline = Instant::now() + Duration::from_secs(10);
    while (tokens.len() < COUNT || messages.len() < COUNT) && Instant::now() < deadline {
        if let Some(token) = buffer.poll_token() {
            tokens.push(token);
        }
        if let Some(message) = buffer.poll_message() {
            messages.push(message.message_id.unwrap());
        }
    }
    producer.join().unwrap();

    let expected_tokens: Vec<_> = (0..COUNT).map(|i| format!("token-{i}")).collect();
    let expected_messages: Vec<_> = (0..COUNT).map(|i| format!("msg-{i}")).collect();
    assert_eq!(tokens, expected_tokens);
    assert_eq!(messages, expected_messages);
    assert!(buffer.poll_token().is_none());
    assert!(buffer.poll_message().is_none());
}

#[test]
fn test_multiple_producers_never_duplicate() {
    let buffer = Arc::new(ListenerBuffer::new());
    let producers: Vec<_> = (0..4)
        .map(|p| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    buffer.push_token(format!("{p}-{i}"));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let mut seen = Vec::new();
    while let Some(token) = buffer.poll_token() {
        seen.push(token);
    }
    assert_eq!(seen.len(), 2_000);

    // Per-producer order survives interleaving
    for p in 0..4 {
        let prefix = format!("{p}-");
        let own: Vec<usize> = seen
            .iter()
            .filter_map(|t| t.strip_prefix(&prefix))
            .map(|i| i.parse().unwrap())
            .collect();
        assert_eq!(own, (0..500).collect::<Vec<_>>());
    }
}

#[test]
fn test_poll_on_empty_returns_immediately() {
    let buffer = ListenerBuffer::new();
    let started = Instant::now();
    for _ in 0..10_000 {
        assert!(buffer.poll_token().is_none());
        assert!(buffer.poll_message().is_none());
    }
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_load_script_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"message_id": "m1"}},
            {{"from": "/topics/TestTopic", "data": {{"k": "v"}},
              "notification": {{"title": "Hi"}}, "notification_opened": true}}
        ]"#
    )
    .unwrap();

    let script = load_script(file.path()).unwrap();
    assert_eq!(script.len(), 2);
    assert_eq!(script[0], Message::with_id("m1"));
    assert_eq!(script[1].data.get("k").map(String::as_str), Some("v"));
    assert_eq!(script[1].notification_opened, Some(true));
    assert_eq!(
        script[1].notification.as_ref().unwrap().title.as_deref(),
        Some("Hi")
    );
}

#[tokio::test]
async fn test_loopback_delivers_script_in_order() {
    let module = LoopbackMessaging::new(
        LoopbackConfig::default()
            .with_token("tok")
            .with_script(vec![
                Message::with_id("m1"),
                Message::with_id("m2"),
                Message::with_id("m3"),
            ])
            .with_delivery_interval(Duration::from_millis(1)),
    );
    let app = Arc::new(
        AppContext::create(AppOptions::new("app", "project"), PlatformContext::none()).unwrap(),
    );
    let listener = Arc::new(ListenerBuffer::new());
    module.initialize(app, listener.clone()).await.unwrap();

    let mut ids = Vec::new();
    for _ in 0..200 {
        while let Some(message) = listener.poll_message() {
            ids.push(message.message_id.unwrap());
        }
        if ids.len() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert_eq!(listener.poll_token().as_deref(), Some("tok"));
    module.terminate();
}
