use crate::api::RemoteApi;
use crate::api::models::{BulkMessage, Conversation, MessagesResponse, OutboundMessage, UserId};
use crate::error::TransportError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub struct ApiClient {
    pub http: HttpClient,
    base_api: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &Url, token: Option<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = HttpClient::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().map_err(|e| TransportError::Unreachable(e.to_string()))?;
        Ok(Self {
            http,
            base_api: Self::base_api(base_url.as_str()),
            token,
        })
    }

    fn base_api(base_url: &str) -> String {
        let trimmed = base_url.trim_end_matches('/');
        if trimmed.ends_with("/api") { trimmed.to_string() } else { format!("{}/api", trimmed) }
    }

    fn with_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(t) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", t));
        }
        req
    }

    fn messages_endpoint(&self, user_id: &UserId) -> String {
        format!("{}/drivers/{}/messages", self.base_api, user_id)
    }

    async fn post_json<T: serde::Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<(), TransportError> {
        debug!("POST {endpoint}");
        let resp = self
            .with_auth(self.http.post(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}

/// Accepts `{ "data": [...] }` as well as a bare array of conversations.
pub(crate) fn parse_messages(json: Value) -> Result<MessagesResponse, TransportError> {
    let items = match json {
        Value::Array(arr) => arr,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(arr)) => arr,
            _ => return Err(TransportError::Decode("missing \"data\" array".into())),
        },
        _ => return Err(TransportError::Decode("expected an object or array".into())),
    };
    let data = items
        .into_iter()
        .map(serde_json::from_value::<Conversation>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TransportError::Decode(e.to_string()))?;
    Ok(MessagesResponse { data })
}

#[async_trait]
impl RemoteApi for ApiClient {
    async fn get_messages(&self, user_id: &UserId) -> Result<MessagesResponse, TransportError> {
        let endpoint = self.messages_endpoint(user_id);
        debug!("GET {endpoint}");
        let resp = self
            .with_auth(self.http.get(&endpoint))
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }
        let json: Value = resp.json().await.map_err(|e| TransportError::Decode(e.to_string()))?;
        parse_messages(json)
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let endpoint = format!("{}/messages", self.base_api);
        self.post_json(&endpoint, message).await
    }

    async fn send_bulk_message(&self, message: &BulkMessage) -> Result<(), TransportError> {
        let endpoint = format!("{}/messages/bulk", self.base_api);
        self.post_json(&endpoint, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ConversationId;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&Url::parse(base).unwrap(), None, None).unwrap()
    }

    struct Captured {
        head: String,
        body: String,
    }

    impl Captured {
        fn header(&self, name: &str) -> Option<String> {
            self.head.lines().find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim().eq_ignore_ascii_case(name).then(|| value.trim().to_string())
            })
        }

        fn json(&self) -> Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    /// One-shot HTTP server: answers a single request and hands back what it received.
    async fn serve_once(status: u16, reply: &'static str) -> (Url, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let (head, body) = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending a full request");
                buf.extend_from_slice(&chunk[..n]);
                let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&buf[..end]).into_owned();
                let len = head
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.trim().eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break (head, String::from_utf8_lossy(&buf[end + 4..end + 4 + len]).into_owned());
                }
            };
            let response = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
                reply.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            Captured { head, body }
        });
        (url, handle)
    }

    fn authed(url: &Url) -> ApiClient {
        ApiClient::new(url, Some("s3cret".into()), Some(Duration::from_secs(5))).unwrap()
    }

    #[test]
    fn test_base_api_is_not_doubled() {
        assert_eq!(ApiClient::base_api("https://rides.example.com/"), "https://rides.example.com/api");
        assert_eq!(ApiClient::base_api("https://rides.example.com/api"), "https://rides.example.com/api");
    }

    #[test]
    fn test_messages_endpoint() {
        let c = client("https://rides.example.com");
        assert_eq!(
            c.messages_endpoint(&UserId::from("driver1")),
            "https://rides.example.com/api/drivers/driver1/messages"
        );
    }

    #[test]
    fn test_parse_wrapped_and_bare_payloads() {
        let conv = json!({"id": 1, "from": {"id": 10, "name": "Ann"}, "message": "hi", "isRead": false});
        let wrapped = parse_messages(json!({ "data": [conv.clone()] })).unwrap();
        let bare = parse_messages(json!([conv])).unwrap();
        assert_eq!(wrapped.data, bare.data);
        assert_eq!(wrapped.data[0].id, ConversationId::Number(1));
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        assert!(matches!(parse_messages(json!({"chats": []})), Err(TransportError::Decode(_))));
        assert!(matches!(parse_messages(json!("nope")), Err(TransportError::Decode(_))));
        assert!(matches!(
            parse_messages(json!({"data": [{"id": 1}]})),
            Err(TransportError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_get_messages_sends_bearer_and_decodes() {
        let (url, server) =
            serve_once(200, r#"{"data":[{"id":1,"from":{"id":10,"name":"Ann"},"message":"hi","isRead":false}]}"#).await;

        let resp = authed(&url).get_messages(&UserId::from("driver1")).await.unwrap();
        let req = server.await.unwrap();

        assert!(req.head.starts_with("GET /api/drivers/driver1/messages "));
        assert_eq!(req.header("authorization").as_deref(), Some("Bearer s3cret"));
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].counterparty.name, "Ann");
    }

    #[tokio::test]
    async fn test_no_token_means_no_authorization_header() {
        let (url, server) = serve_once(200, "[]").await;

        client(url.as_str()).get_messages(&UserId::Number(7)).await.unwrap();
        let req = server.await.unwrap();

        assert!(req.head.starts_with("GET /api/drivers/7/messages "));
        assert_eq!(req.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let (url, server) = serve_once(500, r#"{"error":"boom"}"#).await;
        let err = authed(&url).get_messages(&UserId::from("driver1")).await.unwrap_err();
        server.await.unwrap();
        assert_eq!(err, TransportError::Status(500));

        let (url, server) = serve_once(403, "{}").await;
        let bulk = BulkMessage { driver_id: UserId::from("driver1"), message: "hi".into() };
        let err = authed(&url).send_bulk_message(&bulk).await.unwrap_err();
        server.await.unwrap();
        assert_eq!(err, TransportError::Status(403));
    }

    #[tokio::test]
    async fn test_send_message_posts_json_body() {
        let (url, server) = serve_once(201, "{}").await;
        let message = OutboundMessage {
            from: UserId::from("driver1"),
            to: UserId::Number(10),
            message: "On my way".into(),
        };

        authed(&url).send_message(&message).await.unwrap();
        let req = server.await.unwrap();

        assert!(req.head.starts_with("POST /api/messages "));
        assert_eq!(req.header("authorization").as_deref(), Some("Bearer s3cret"));
        assert!(req.header("content-type").unwrap().starts_with("application/json"));
        assert_eq!(req.json(), json!({"from": "driver1", "to": 10, "message": "On my way"}));
    }

    #[tokio::test]
    async fn test_send_bulk_message_posts_driver_id() {
        let (url, server) = serve_once(200, "{}").await;
        let bulk = BulkMessage { driver_id: UserId::from("driver1"), message: "Running late".into() };

        authed(&url).send_bulk_message(&bulk).await.unwrap();
        let req = server.await.unwrap();

        assert!(req.head.starts_with("POST /api/messages/bulk "));
        assert_eq!(req.json(), json!({"driverId": "driver1", "message": "Running late"}));
    }
}
