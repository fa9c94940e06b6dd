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

use std::{collections::HashMap, io, sync::Arc};

use polaris_grpc::{
    discovery::{memory::MemoryConsumerApi, Instance},
    loadbalance::PolarisService,
    router::{MatchString, Route, RoutingRule, SourceMatch},
    status::{Code, GRPC_STATUS},
    Endpoint, PolarisError, PolarisLoadBalancer, PolarisNameResolver, ServiceKey, SourceService,
    StdError,
};
use tower::{service_fn, ServiceExt};

fn echo() -> ServiceKey {
    ServiceKey::new("Test", "echo")
}

fn gateway() -> SourceService {
    SourceService::new(ServiceKey::new("Test", "gateway"))
        .with_metadata(HashMap::from([("env".to_string(), "gray".to_string())]))
}

// Answers with the address it was created for. `x-status` is echoed back as
// grpc-status, `x-broken` fails the transport.
async fn handle(
    endpoint: Endpoint,
    req: http::Request<String>,
) -> Result<http::Response<String>, io::Error> {
    if req.headers().contains_key("x-broken") {
        return Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "reset by peer",
        ));
    }
    let mut resp = http::Response::new(endpoint.to_string());
    if let Some(status) = req.headers().get("x-status") {
        resp.headers_mut().insert(GRPC_STATUS, status.clone());
    }
    Ok(resp)
}

fn consumer() -> Arc<MemoryConsumerApi> {
    let consumer = Arc::new(MemoryConsumerApi::new());
    consumer.add_instance(echo(), Instance::new("10.0.0.1", 8080).with_metadata("x-lane", "blue"));
    consumer.add_instance(echo(), Instance::new("10.0.0.2", 8080).with_metadata("x-lane", "gray"));
    consumer.add_instance(
        echo(),
        Instance::new("10.0.0.3", 8080)
            .with_metadata("x-lane", "gray")
            .with_healthy(false),
    );
    consumer.set_rule(
        echo(),
        RoutingRule::new(
            vec![Route::new(vec![SourceMatch::new("Test", "gateway")
                .with_metadata("x-lane", MatchString::exact("gray"))])],
            vec![],
        ),
    );
    consumer
}

fn request(lane: &str) -> http::Request<String> {
    http::Request::builder()
        .uri("http://echo/echo.Echo/Say")
        .header("x-lane", lane)
        .body(String::new())
        .unwrap()
}

fn polaris_error(err: &StdError) -> &PolarisError {
    err.downcast_ref::<PolarisError>()
        .expect("error raised by the picker")
}

#[tokio::test]
async fn test_pick_call_report() {
    polaris_logger::init();
    let consumer = consumer();
    let balancer = Arc::new(
        PolarisLoadBalancer::new(
            |endpoint: Endpoint| service_fn(move |req| handle(endpoint.clone(), req)),
            consumer.clone(),
        )
        .with_source(Some(gateway())),
    );
    let resolver =
        PolarisNameResolver::from_target("polaris://echo?namespace=Test", consumer.clone())
            .unwrap();
    resolver.start(balancer.as_ref()).await.unwrap();
    assert_eq!(balancer.registry().len(), 2);

    let svc = PolarisService::from_balancer(balancer.clone());
    for _ in 0..4 {
        let resp = svc.clone().oneshot(request("gray")).await.unwrap();
        assert_eq!(resp.body(), "10.0.0.2:8080");
    }

    let reported = consumer.reported();
    assert_eq!(reported.len(), 4);
    for result in reported.iter() {
        assert_eq!(result.endpoint, Endpoint::new("10.0.0.2", 8080));
        assert_eq!(result.method, "Say");
        assert_eq!(result.target, echo());
        assert!(result.outcome.success);
        assert_eq!(result.outcome.code, Code::Ok);
    }

    let requests = consumer.instance_requests();
    assert_eq!(requests[0].labels.get("x-lane").map(String::as_str), Some("gray"));
    assert_eq!(requests[0].metadata, gateway().metadata);
}

#[tokio::test]
async fn test_failed_calls_are_reported() {
    let consumer = consumer();
    let balancer = Arc::new(
        PolarisLoadBalancer::new(
            |endpoint: Endpoint| service_fn(move |req| handle(endpoint.clone(), req)),
            consumer.clone(),
        )
        .with_source(Some(gateway())),
    );
    let resolver =
        PolarisNameResolver::from_target("polaris://echo?namespace=Test", consumer.clone())
            .unwrap();
    resolver.start(balancer.as_ref()).await.unwrap();
    let svc = PolarisService::from_balancer(balancer);

    let mut req = request("gray");
    req.headers_mut()
        .insert("x-status", Code::ResourceExhausted.to_http_header_value());
    let resp = svc.clone().oneshot(req).await.unwrap();
    assert_eq!(
        Code::from_headers(resp.headers()),
        Some(Code::ResourceExhausted)
    );

    let mut req = request("gray");
    req.headers_mut()
        .insert("x-broken", http::HeaderValue::from_static("1"));
    let err = svc.clone().oneshot(req).await.unwrap_err();
    assert!(err.downcast_ref::<io::Error>().is_some());

    let reported = consumer.reported();
    assert_eq!(reported.len(), 2);
    assert!(!reported[0].outcome.success);
    assert_eq!(reported[0].outcome.code, Code::ResourceExhausted);
    assert!(!reported[1].outcome.success);
    assert_eq!(reported[1].outcome.code, Code::Unavailable);
}

#[tokio::test]
async fn test_no_addresses_is_unavailable() {
    let consumer = consumer();
    let balancer = Arc::new(PolarisLoadBalancer::new(
        |endpoint: Endpoint| service_fn(move |req| handle(endpoint.clone(), req)),
        consumer.clone(),
    ));
    let svc = PolarisService::from_balancer(balancer);

    let err = svc.oneshot(request("gray")).await.unwrap_err();
    let err = polaris_error(&err);
    assert_eq!(err, &PolarisError::NoAvailableEndpoint);
    assert_eq!(err.code(), Code::Unavailable);
    assert!(consumer.instance_requests().is_empty());
    assert!(consumer.reported().is_empty());
}

#[tokio::test]
async fn test_instance_without_connection_is_not_found() {
    let consumer = consumer();
    let balancer = Arc::new(
        PolarisLoadBalancer::new(
            |endpoint: Endpoint| service_fn(move |req| handle(endpoint.clone(), req)),
            consumer.clone(),
        )
        .with_source(Some(gateway())),
    );
    let resolver =
        PolarisNameResolver::from_target("polaris://echo?namespace=Test", consumer.clone())
            .unwrap();
    resolver.start(balancer.as_ref()).await.unwrap();

    // registered after the last resolution, so no connection exists yet
    consumer.add_instance(echo(), Instance::new("10.0.0.9", 8080).with_metadata("x-lane", "red"));
    let svc = PolarisService::from_balancer(balancer.clone());

    let err = svc.clone().oneshot(request("red")).await.unwrap_err();
    assert_eq!(
        polaris_error(&err),
        &PolarisError::NoConnectionForInstance {
            endpoint: Endpoint::new("10.0.0.9", 8080)
        }
    );
    assert_eq!(polaris_error(&err).code(), Code::NotFound);
    assert!(consumer.reported().is_empty());

    // the next resolution picks it up
    resolver.refresh(balancer.as_ref()).await.unwrap();
    let resp = svc.oneshot(request("red")).await.unwrap();
    assert_eq!(resp.body(), "10.0.0.9:8080");
}
