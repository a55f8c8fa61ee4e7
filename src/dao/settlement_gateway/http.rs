use futures::future::BoxFuture;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderValue},
};

use crate::dto::settlement::{RemoteReply, SettlementRequest};

use super::{
    SettlementGateway,
    error::{GatewayError, GatewayResult},
};

/// Content type the endpoint expects; plain text keeps the request simple for script hosts.
const BODY_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// [`SettlementGateway`] issuing a single `POST` per submission.
#[derive(Clone)]
pub struct HttpSettlementGateway {
    client: Client,
}

impl HttpSettlementGateway {
    /// Build a gateway with its own HTTP client.
    pub fn new() -> GatewayResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| GatewayError::ClientBuilder { source })?;
        Ok(Self { client })
    }

    async fn post(&self, url: String, body: String) -> GatewayResult<RemoteReply> {
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static(BODY_CONTENT_TYPE))
            .body(body)
            .send()
            .await
            .map_err(|source| GatewayError::RequestSend {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::RequestStatus { url, status });
        }

        response
            .json::<RemoteReply>()
            .await
            .map_err(|source| GatewayError::DecodeResponse { url, source })
    }
}

impl SettlementGateway for HttpSettlementGateway {
    fn submit(
        &self,
        endpoint: &str,
        request: &SettlementRequest,
    ) -> BoxFuture<'static, GatewayResult<RemoteReply>> {
        let gateway = self.clone();
        let url = endpoint.to_string();
        let body = serde_json::to_string(request).map_err(|source| GatewayError::Encode { source });
        Box::pin(async move { gateway.post(url, body?).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;
    use crate::dto::settlement::SettlementPlayer;

    type Captured = Arc<Mutex<Option<(String, Value)>>>;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/exec")
    }

    fn request() -> SettlementRequest {
        SettlementRequest {
            players: vec![SettlementPlayer {
                name: "A".into(),
                score: 1000,
                id: "1".into(),
            }],
            rate_point: 1,
            rate_yen: 1,
            sanma: false,
            webhook_url: String::new(),
        }
    }

    #[tokio::test]
    async fn posts_json_as_plain_text_and_decodes_reply() {
        let captured: Captured = Arc::default();
        let sink = captured.clone();
        let router = Router::new().route(
            "/exec",
            post(move |headers: HeaderMap, body: String| {
                let sink = sink.clone();
                async move {
                    let content_type = headers[CONTENT_TYPE].to_str().unwrap().to_string();
                    let payload: Value = serde_json::from_str(&body).unwrap();
                    *sink.lock().unwrap() = Some((content_type, payload));
                    Json(json!({ "status": "success", "message": "ok" }))
                }
            }),
        );
        let url = serve(router).await;

        let gateway = HttpSettlementGateway::new().unwrap();
        let reply = gateway.submit(&url, &request()).await.unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.message, "ok");

        let (content_type, payload) = captured.lock().unwrap().take().unwrap();
        assert_eq!(content_type, BODY_CONTENT_TYPE);
        assert_eq!(payload["players"][0]["id"], json!("1"));
        assert_eq!(payload["ratePoint"], json!(1));
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_code() {
        let router = Router::new().route(
            "/exec",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": "success", "message": "ignored" })),
                )
            }),
        );
        let url = serve(router).await;

        let gateway = HttpSettlementGateway::new().unwrap();
        let err = gateway.submit(&url, &request()).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::RequestStatus { status, .. } if status.as_u16() == 500
        ));
        assert_eq!(err.to_string(), "request failed: 500");
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let router = Router::new().route("/exec", post(|| async { "<html>oops</html>" }));
        let url = serve(router).await;

        let gateway = HttpSettlementGateway::new().unwrap();
        let err = gateway.submit(&url, &request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::DecodeResponse { .. }));
    }
}
