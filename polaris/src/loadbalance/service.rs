/*
 * Licensed to the Apache Software Foundation (ASF) under one or more
 * contributor license agreements.  See the NOTICE file distributed with
 * this work for additional information regarding copyright ownership.
 * The ASF licenses this file to You under the Apache License, Version 2.0
 * (the "License"); you may not use this file except in compliance with
 * the License.  You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::{
    sync::Arc,
    task::{Context, Poll},
};

use futures_util::future::BoxFuture;
use polaris_base::{Endpoint, NewService, StdError};
use tower::ServiceExt;
use tower_service::Service;

use crate::{
    error::PolarisError,
    loadbalance::{PickArgs, PickResult, Picker, PolarisLoadBalancer},
    status::Code,
};

/// Anything that can hand out the current picker.
pub trait PickerSource<H>: Send + Sync {
    fn current_picker(&self) -> Arc<dyn Picker<H>>;
}

impl<N> PickerSource<N::Service> for PolarisLoadBalancer<N>
where
    N: NewService<Endpoint> + Send + Sync,
    N::Service: Clone + Send + Sync + 'static,
{
    fn current_picker(&self) -> Arc<dyn Picker<N::Service>> {
        self.picker()
    }
}

/// Routes every request through the picker and reports its outcome. The
/// call status is read from the `grpc-status` response header. A response
/// without one is reported as soon as its head arrives, so a status sent
/// later in the trailers is not seen.
pub struct PolarisService<H> {
    source: Arc<dyn PickerSource<H>>,
}

impl<H> PolarisService<H> {
    pub fn new(source: Arc<dyn PickerSource<H>>) -> Self {
        PolarisService { source }
    }

    pub fn from_balancer<N>(balancer: Arc<PolarisLoadBalancer<N>>) -> Self
    where
        N: NewService<Endpoint, Service = H> + Send + Sync + 'static,
        H: Clone + Send + Sync + 'static,
    {
        let source: Arc<dyn PickerSource<H>> = balancer;
        PolarisService { source }
    }
}

impl<H> Clone for PolarisService<H> {
    fn clone(&self) -> Self {
        PolarisService {
            source: self.source.clone(),
        }
    }
}

impl<H, B, RB> Service<http::Request<B>> for PolarisService<H>
where
    H: Service<http::Request<B>, Response = http::Response<RB>> + Clone + Send + Sync + 'static,
    H::Error: Into<StdError> + Send,
    H::Future: Send,
    B: Send + 'static,
    RB: Send + 'static,
{
    type Response = http::Response<RB>;

    type Error = StdError;

    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // readiness is decided per call by the picked handle
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let picker = self.source.current_picker();

        let fut = async move {
            let args = PickArgs::from_request(&req);
            let (handle, reporter) = match picker.pick(&args).await {
                PickResult::Selected { handle, reporter } => (handle, reporter),
                PickResult::NoResult => {
                    return Err(Into::<StdError>::into(PolarisError::NoAvailableEndpoint))
                }
                PickResult::Error(err) => return Err(Into::<StdError>::into(err)),
            };

            match handle.oneshot(req).await {
                Ok(resp) => {
                    match Code::from_headers(resp.headers()) {
                        // trailers-only response carries the final status
                        Some(code) => reporter.stream_closed(code),
                        // response head arrived, the status follows in trailers
                        None => reporter.inbound_message_read(),
                    }
                    Ok(resp)
                }
                Err(err) => {
                    reporter.stream_closed(Code::Unavailable);
                    Err(Into::<StdError>::into(err))
                }
            }
        };

        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use polaris_base::ServiceKey;
    use tower::service_fn;

    use super::*;
    use crate::{
        discovery::{memory::MemoryConsumerApi, Instance},
        resolver::{Attributes, ResolverListener},
        status::GRPC_STATUS,
    };

    async fn call_with_status(status: Option<Code>) -> Arc<MemoryConsumerApi> {
        let target = ServiceKey::new("Test", "echo");
        let consumer = Arc::new(MemoryConsumerApi::new());
        consumer.add_instance(target.clone(), Instance::new("10.0.0.1", 8080));

        let new_service = move |_: Endpoint| {
            service_fn(move |_: http::Request<()>| async move {
                let mut resp = http::Response::new(());
                if let Some(code) = status {
                    resp.headers_mut()
                        .insert(GRPC_STATUS, code.to_http_header_value());
                }
                Ok::<_, Infallible>(resp)
            })
        };
        let balancer = Arc::new(PolarisLoadBalancer::new(new_service, consumer.clone()));
        balancer.on_addresses(vec![Endpoint::new("10.0.0.1", 8080)], Attributes { target });

        let req = http::Request::builder()
            .uri("http://echo/echo.Echo/Say")
            .body(())
            .unwrap();
        PolarisService::from_balancer(balancer)
            .oneshot(req)
            .await
            .unwrap();
        consumer
    }

    #[tokio::test]
    async fn test_response_head_without_status_counts_as_read() {
        let reported = call_with_status(None).await.reported();
        assert_eq!(reported.len(), 1);
        assert!(reported[0].outcome.success);
        assert_eq!(reported[0].outcome.code, Code::Ok);
    }

    #[tokio::test]
    async fn test_trailers_only_status_closes_the_call() {
        let reported = call_with_status(Some(Code::PermissionDenied)).await.reported();
        assert_eq!(reported.len(), 1);
        assert!(!reported[0].outcome.success);
        assert_eq!(reported[0].outcome.code, Code::PermissionDenied);
    }
}
