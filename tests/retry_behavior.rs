//! End-to-end dispatch behavior through the public API, driven by a
//! scripted transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use discord_rest::prelude::*;
use discord_rest::{Body, RawResponse, TransportRequest};

type Scripted = std::result::Result<RawResponse, TransportError>;

/// Replays a scripted response sequence; panics if dispatched past the end.
struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    seen_urls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen_urls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn perform(&self, request: TransportRequest<'_>) -> Scripted {
        self.seen_urls.lock().unwrap().push(request.url.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport exhausted")
    }
}

fn response(status: u16, body: Value) -> Scripted {
    Ok(RawResponse {
        status,
        body: Some(body.to_string()),
    })
}

fn client(script: Vec<Scripted>) -> (RestClient, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::new(script);
    let client = RestClient::with_transport(
        RestConfig::with_base_url("https://api.test/"),
        transport.clone(),
    );
    (client, transport)
}

#[tokio::test(start_paused = true)]
async fn rate_limited_session_recovers_and_reports_each_attempt() {
    let (mut rest, transport) = client(vec![
        response(429, json!({"message": "limited", "retry_after": 0.25, "global": false})),
        response(429, json!({"message": "limited", "retry_after": 0.5, "global": false})),
        response(200, json!({"id": "99", "content": "done"})),
    ]);

    let log: Arc<Mutex<Vec<(u32, f64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    rest.set_default_options(
        RequestOptions::new()
            .with_authorization(Authorization::bot("session-token"))
            .with_rate_limit(RateLimitPolicy::default().with_callback(Arc::new(
                move |body: &RateLimitBody, attempts| {
                    sink.lock()
                        .unwrap()
                        .push((attempts, body.retry_after.unwrap_or_default()));
                },
            ))),
    );

    let start = tokio::time::Instant::now();
    let message = rest
        .post(
            "channels/5/messages",
            None,
            Some(Body::Json(json!({"content": "hello"}))),
        )
        .await
        .unwrap();

    assert_eq!(message, json!({"id": "99", "content": "done"}));
    // both server-named waits were honored: 250 ms + 500 ms
    assert!(start.elapsed() >= Duration::from_millis(750));

    let log = log.lock().unwrap();
    assert_eq!(*log, [(1, 0.25), (2, 0.5)]);
    assert_eq!(
        *transport.seen_urls.lock().unwrap(),
        ["https://api.test/channels/5/messages"; 3]
    );
}

#[tokio::test]
async fn exhausted_budget_surfaces_last_body_and_attempt_count() {
    let (mut rest, _transport) = client(vec![
        response(429, json!({"message": "first", "retry_after": 0.001})),
        response(429, json!({"message": "second", "retry_after": 0.001})),
        response(429, json!({"message": "third", "retry_after": 9.0})),
    ]);
    rest.set_default_options(
        RequestOptions::new().with_rate_limit(RateLimitPolicy::with_retry_count(2)),
    );

    let err = rest.get("channels/5", None).await.unwrap_err();
    match err {
        Error::RateLimited { body, attempts } => {
            assert_eq!(attempts, 3);
            assert_eq!(body.message, "third");
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn client_error_rejects_without_consuming_the_budget() {
    let (rest, transport) = client(vec![response(
        404,
        json!({"message": "Unknown Channel", "code": 10003}),
    )]);

    let err = rest.get("channels/0", None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    match err {
        Error::Api { body, .. } => {
            assert_eq!(body["code"], 10003);
            assert_eq!(body["message"], "Unknown Channel");
        }
        other => panic!("expected Api, got {other:?}"),
    }
    assert_eq!(transport.seen_urls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn transport_faults_are_opaque_and_terminal() {
    for fault in [
        TransportError::Timeout,
        TransportError::Incomplete("connection reset".to_string()),
        TransportError::UnknownResponse("no status line".to_string()),
        TransportError::Connection("dns failure".to_string()),
    ] {
        let (rest, transport) = client(vec![Err(fault)]);
        let err = rest.get("gateway", None).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert_eq!(transport.seen_urls.lock().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn credential_rotation_applies_to_the_next_dispatch() {
    // the credential is owned by the caller; swapping the token between
    // calls must be reflected in the very next request
    let (mut rest, _transport) = client(vec![
        response(200, json!({})),
        response(200, json!({})),
    ]);

    let mut auth = Authorization::bearer("stale");
    auth.set_token("fresh");
    rest.set_default_options(RequestOptions::new().with_authorization(auth.clone()));
    rest.get("users/@me", None).await.unwrap();

    auth.set_token_type(TokenType::None);
    assert_eq!(auth.header_value(), "fresh");
    rest.set_default_options(RequestOptions::new().with_authorization(auth));
    rest.get("users/@me", None).await.unwrap();
}

#[tokio::test]
async fn mixed_outcomes_across_sequential_dispatches() {
    let (rest, _transport) = client(vec![
        response(200, json!({"id": "1"})),
        response(403, json!({"message": "Missing Access", "code": 50001})),
        response(502, json!({})),
        response(204, json!("")),
    ]);

    assert_eq!(rest.get("channels/1", None).await.unwrap(), json!({"id": "1"}));

    let forbidden = rest.get("guilds/2", None).await.unwrap_err();
    assert_eq!(forbidden.status(), Some(403));

    let upstream = rest.get("guilds/3", None).await.unwrap_err();
    assert!(matches!(upstream, Error::UnexpectedStatus(502)));

    // one failure never poisons the next dispatch
    assert_eq!(
        rest.delete("channels/4/pins/9", None).await.unwrap(),
        json!("")
    );
}
