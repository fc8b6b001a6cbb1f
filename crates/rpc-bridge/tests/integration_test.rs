use rpc_bridge::mock::{send_raw, MockHandler};
use rpc_bridge::{
    handler_fn, BusClient, ClientError, HandlerError, InMemoryBus, MessageBus, PatternRouter,
    RequestEnvelope, ResponseEnvelope,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

async fn next_reply(replies: &mut rpc_bridge::Subscription) -> ResponseEnvelope {
    let message = tokio::time::timeout(Duration::from_secs(5), replies.recv())
        .await
        .expect("reply in time")
        .expect("inbox open");
    serde_json::from_slice(&message.payload).expect("well-formed reply")
}

/// The reply carries the request's id verbatim, the empty id included.
#[tokio::test]
async fn test_correlation_id_round_trips() {
    let bus = Arc::new(InMemoryBus::new());
    let mut router = PatternRouter::new(bus.clone());
    router
        .register("echo", handler_fn(|v: Value| async move { Ok::<_, HandlerError>(v) }))
        .unwrap();
    let handle = router.serve().await.unwrap();

    for id in ["", "abc", "ünïcode-id", "  spaced  "] {
        let request = RequestEnvelope::new(id, "echo", json!({"n": 1}));
        let mut replies = send_raw(bus.as_ref(), "echo", request.to_bytes()).await.unwrap();
        let reply = next_reply(&mut replies).await;
        assert_eq!(reply.id, id);
        assert!(reply.is_disposed);
        assert_eq!(reply.response, json!({"n": 1}));
        assert!(reply.err.is_null());
    }

    handle.shutdown().await;
}

/// Success, handler failure, decode failure and panic each produce one reply.
#[tokio::test]
async fn test_exactly_one_reply_on_every_path() {
    let bus = Arc::new(InMemoryBus::new());
    let mut mock = MockHandler::new();
    mock.expect_request().return_ok(json!("fine"));
    mock.expect_request().return_err(json!({"error": "domain failure"}));
    // The third request finds no expectation and panics inside the handler.

    let mut router = PatternRouter::new(bus.clone());
    router.register_route("svc.op", mock.route()).unwrap();
    let handle = router.serve().await.unwrap();

    let payloads = [
        RequestEnvelope::new("1", "svc.op", Value::Null).to_bytes(),
        RequestEnvelope::new("2", "svc.op", Value::Null).to_bytes(),
        RequestEnvelope::new("3", "svc.op", Value::Null).to_bytes(),
        br#"{"id":"4","pattern":["not","a","string"]}"#.to_vec(),
    ];

    let mut outcomes = Vec::new();
    for payload in payloads {
        let mut replies = send_raw(bus.as_ref(), "svc.op", payload).await.unwrap();
        let reply = next_reply(&mut replies).await;
        // No second reply shows up on the same inbox.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(replies.try_recv().is_err(), "duplicate reply for {}", reply.id);
        outcomes.push(reply);
    }

    assert_eq!(outcomes[0].response, json!("fine"));
    assert_eq!(outcomes[1].err, json!({"error": "domain failure"}));
    assert_eq!(outcomes[2].id, "3");
    assert!(outcomes[2].err["error"].is_string());
    assert_eq!(outcomes[3].id, "4");
    assert!(outcomes[3].err["error"]
        .as_str()
        .unwrap()
        .starts_with("Malformed request envelope"));

    mock.verify();
    handle.shutdown().await;
}

/// Garbage with no readable id still gets an answer, addressed to the empty id.
#[tokio::test]
async fn test_unparseable_message_is_answered() {
    let bus = Arc::new(InMemoryBus::new());
    let mut router = PatternRouter::new(bus.clone());
    router
        .register("echo", handler_fn(|v: Value| async move { Ok::<_, HandlerError>(v) }))
        .unwrap();
    let handle = router.serve().await.unwrap();

    let mut replies = send_raw(bus.as_ref(), "echo", b"\xff\xfe".to_vec()).await.unwrap();
    let reply = next_reply(&mut replies).await;
    assert_eq!(reply.id, "");
    assert!(reply.response.is_null());
    assert!(!reply.err.is_null());

    // A message without a reply subject is dropped without taking the router down.
    bus.publish("echo", None, b"{}".to_vec()).await.unwrap();
    let client = BusClient::new(bus.clone());
    assert_eq!(client.send("echo", json!(7)).await.unwrap(), json!(7));

    handle.shutdown().await;
}

/// A slow handler does not hold up another topic or other calls to itself.

/// The in-flight bound is per topic: a saturated topic leaves others free.
#[tokio::test]
async fn test_saturated_topic_does_not_block_other_topics() {
    let bus = Arc::new(InMemoryBus::new());
    let mut router = PatternRouter::new(bus.clone()).with_max_in_flight(2);
    router
        .register(
            "slow",
            handler_fn(|ms: u64| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok::<_, HandlerError>(ms)
            }),
        )
        .unwrap();
    router
        .register("fast", handler_fn(|v: Value| async move { Ok::<_, HandlerError>(v) }))
        .unwrap();
    let handle = router.serve().await.unwrap();
    let client = BusClient::new(bus.clone()).with_timeout(Duration::from_secs(1));

    for _ in 0..2 {
        let slow_client = client.clone();
        tokio::spawn(async move { slow_client.send("slow", json!(2000)).await });
    }
    // Let both slow requests take the topic's permits.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = tokio::time::Instant::now();
    let fast = client.send("fast", json!("hi")).await;
    assert_eq!(fast, Ok(json!("hi")));
    assert!(started.elapsed() < Duration::from_millis(500));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_slow_handler_does_not_starve_others() {
    let bus = Arc::new(InMemoryBus::new());
    let mut router = PatternRouter::new(bus.clone());
    router
        .register(
            "slow",
            handler_fn(|ms: u64| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok::<_, HandlerError>(ms)
            }),
        )
        .unwrap();
    router
        .register("fast", handler_fn(|v: Value| async move { Ok::<_, HandlerError>(v) }))
        .unwrap();
    let handle = router.serve().await.unwrap();
    let client = BusClient::new(bus.clone());

    let slow_client = client.clone();
    let slow = tokio::spawn(async move { slow_client.send("slow", json!(500)).await });

    // Both of these finish while the first slow call is still sleeping.
    let started = tokio::time::Instant::now();
    let quick_slow = client.send("slow", json!(1)).await.unwrap();
    let fast = client.send("fast", json!("hi")).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(quick_slow, json!(1));
    assert_eq!(fast, json!("hi"));

    assert_eq!(slow.await.unwrap().unwrap(), json!(500));
    handle.shutdown().await;
}

/// Many concurrent requests on one topic each get their own reply.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_same_topic() {
    let bus = Arc::new(InMemoryBus::new());
    let mut router = PatternRouter::new(bus.clone()).with_max_in_flight(8);
    router
        .register(
            "double",
            handler_fn(|n: i64| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, HandlerError>(n * 2)
            }),
        )
        .unwrap();
    let handle = router.serve().await.unwrap();
    let client = BusClient::new(bus.clone());

    let mut tasks = Vec::new();
    for n in 0..50i64 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let reply = client.send("double", json!(n)).await.unwrap();
            (n, reply)
        }));
    }
    for task in tasks {
        let (n, reply) = task.await.unwrap();
        assert_eq!(reply, json!(n * 2));
    }

    handle.shutdown().await;
}

/// A remote `err` surfaces as `ClientError::Remote` with the message intact.
#[tokio::test]
async fn test_client_sees_remote_error() {
    let bus = Arc::new(InMemoryBus::new());
    let mut router = PatternRouter::new(bus.clone());
    router
        .register(
            "fails",
            handler_fn(|_: Value| async move { Err::<Value, _>(HandlerError::Failed("nope".into())) }),
        )
        .unwrap();
    let handle = router.serve().await.unwrap();

    let err = BusClient::new(bus.clone())
        .send("fails", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Remote(_)));
    assert_eq!(err.remote_message(), Some("nope"));

    handle.shutdown().await;
}
