// This file is part of Setcode.
//
// Setcode is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Setcode is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Setcode.
// If not, see https://www.gnu.org/licenses/.

use std::task::{Context, Poll};

use alloy_json_rpc::{RequestPacket, ResponsePacket, RpcError};
use alloy_transport::{TransportError, TransportErrorKind, TransportFut};
use setcode_utils::retry::{self, BackoffOpts};
use tower::{Layer, Service};

/// A Transport Layer that retries requests the node rejected for exceeding its rate limit.
///
/// Any other error is handed back to the caller untouched.
#[derive(Debug, Clone)]
pub(crate) struct RateLimitRetryLayer {
    opts: BackoffOpts,
}

impl RateLimitRetryLayer {
    pub(crate) const fn new(opts: BackoffOpts) -> Self {
        Self { opts }
    }
}

impl<S> Layer<S> for RateLimitRetryLayer {
    type Service = RateLimitRetryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitRetryService {
            inner,
            opts: self.opts,
        }
    }
}

/// A Tower Service used by the RateLimitRetryLayer.
#[derive(Debug, Clone)]
pub(crate) struct RateLimitRetryService<S> {
    inner: S,
    opts: BackoffOpts,
}

/// Classifies transport errors as rate limit rejections.
pub trait RateLimitExt {
    /// True if the node rejected the request for exceeding its rate limit
    fn is_rate_limited(&self) -> bool;
}

impl RateLimitExt for TransportError {
    fn is_rate_limited(&self) -> bool {
        match self {
            RpcError::Transport(TransportErrorKind::HttpError(err)) => {
                err.status == 429 || retry::is_rate_limit_message(&err.body)
            }
            RpcError::Transport(kind) => retry::is_rate_limit_message(&kind.to_string()),
            RpcError::ErrorResp(payload) => {
                payload.code == 429 || retry::is_rate_limit_message(&payload.message)
            }
            // some providers answer with a non JSON-RPC body when throttling
            RpcError::DeserError { text, .. } => retry::is_rate_limit_message(text),
            _ => false,
        }
    }
}

impl<S> Service<RequestPacket> for RateLimitRetryService<S>
where
    S: Service<RequestPacket, Future = TransportFut<'static>, Error = TransportError>
        + Send
        + Sync
        + 'static
        + Clone,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);
        let opts = self.opts;
        Box::pin(async move {
            retry::with_backoff(
                "send rpc request",
                || {
                    let mut inner = inner.clone();
                    let request = request.clone();
                    async move {
                        let res = inner.call(request).await?;
                        // error payloads arrive as successful transport responses
                        match res.as_error() {
                            Some(e) => Err(TransportError::ErrorResp(e.clone())),
                            None => Ok(res),
                        }
                    }
                },
                |err: &TransportError| err.is_rate_limited(),
                opts,
            )
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicU32, Ordering},
            Arc,
        },
        time::Duration,
    };

    use alloy_json_rpc::{ErrorPayload, Id, Request};

    use super::*;

    fn request() -> RequestPacket {
        Request::new("eth_chainId", Id::Number(1), ())
            .serialize()
            .unwrap()
            .into()
    }

    fn success() -> ResponsePacket {
        serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0xaa36a7"}"#).unwrap()
    }

    fn error_resp(code: i64, message: &'static str) -> TransportError {
        TransportError::ErrorResp(ErrorPayload {
            code,
            message: message.into(),
            data: None,
        })
    }

    fn service(
        calls: Arc<AtomicU32>,
        fail_first: u32,
        make_err: fn() -> TransportError,
    ) -> RateLimitRetryService<
        tower::util::ServiceFn<
            impl FnMut(RequestPacket) -> TransportFut<'static> + Clone + Send + Sync + 'static,
        >,
    > {
        let inner = tower::service_fn(move |_req: RequestPacket| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let fut: TransportFut<'static> = Box::pin(async move {
                if n < fail_first {
                    Err(make_err())
                } else {
                    Ok(success())
                }
            });
            fut
        });
        RateLimitRetryLayer::new(BackoffOpts::default()).layer(inner)
    }

    #[test]
    fn test_rate_limit_classification() {
        assert!(TransportErrorKind::http_error(429, String::new()).is_rate_limited());
        assert!(
            TransportErrorKind::http_error(503, "Too Many Requests".to_string()).is_rate_limited()
        );
        assert!(!TransportErrorKind::http_error(500, "internal".to_string()).is_rate_limited());
        assert!(error_resp(429, "slow down").is_rate_limited());
        assert!(error_resp(-32005, "daily request count exceeded, request rate limited")
            .is_rate_limited());
        assert!(!error_resp(3, "execution reverted").is_rate_limited());
        assert!(TransportErrorKind::custom_str("rate limit exceeded").is_rate_limited());
        assert!(!TransportErrorKind::custom_str("connection refused").is_rate_limited());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_rate_limited_requests() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut svc = service(calls.clone(), 2, || {
            TransportErrorKind::http_error(429, String::new())
        });

        let res = svc.call(request()).await;

        assert!(res.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut svc = service(calls.clone(), u32::MAX, || error_resp(429, "rate limited"));
        let start = tokio::time::Instant::now();

        let err = svc.call(request()).await.unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() >= Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut svc = service(calls.clone(), u32::MAX, || {
            error_resp(-32000, "insufficient funds for gas * price + value")
        });

        let err = svc.call(request()).await.unwrap_err();

        assert!(!err.is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
