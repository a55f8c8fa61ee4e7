mod error;
mod http;

pub use error::{GatewayError, GatewayResult};
pub use http::HttpSettlementGateway;

use futures::future::BoxFuture;

use crate::dto::settlement::{RemoteReply, SettlementRequest};

/// Abstraction over the remote endpoint that computes settlements.
pub trait SettlementGateway: Send + Sync {
    /// Send `request` to `endpoint` once and decode the reply.
    fn submit(
        &self,
        endpoint: &str,
        request: &SettlementRequest,
    ) -> BoxFuture<'static, GatewayResult<RemoteReply>>;
}
