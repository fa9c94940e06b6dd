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

//! Endpoint selection. A [`Picker`] turns one outgoing call into a connection
//! handle plus the reporter for that call; [`PolarisLoadBalancer`] keeps the
//! pickers fresh as addresses change and [`PolarisService`] drives a picker
//! from a tower stack.

pub mod balancer;
pub mod picker;
pub mod registry;
pub mod service;

use async_trait::async_trait;

use crate::{error::PolarisError, metadata::Metadata, tracer::CallResultReporter};

pub use balancer::PolarisLoadBalancer;
pub use picker::{EmptyPicker, PolarisPicker};
pub use registry::ConnectionRegistry;
pub use service::{PickerSource, PolarisService};

/// What a picker sees of the call being routed.
#[derive(Debug, Clone, Default)]
pub struct PickArgs {
    pub method: String,
    pub headers: Metadata,
}

impl PickArgs {
    pub fn new(method: impl Into<String>, headers: Metadata) -> Self {
        PickArgs {
            method: method.into(),
            headers,
        }
    }

    /// The method is the last segment of a grpc path, eg. `SayHello` of
    /// `/helloworld.Greeter/SayHello`.
    pub fn from_request<B>(req: &http::Request<B>) -> Self {
        let method = req
            .uri()
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        PickArgs {
            method,
            headers: Metadata::from_headers(req.headers()),
        }
    }
}

#[derive(Debug)]
pub enum PickResult<H> {
    Selected {
        handle: H,
        reporter: CallResultReporter,
    },
    // nothing to pick from, let the caller decide how to wait or fail
    NoResult,
    Error(PolarisError),
}

impl<H> PickResult<H> {
    pub fn is_selected(&self) -> bool {
        matches!(self, PickResult::Selected { .. })
    }
}

#[async_trait]
pub trait Picker<H>: Send + Sync {
    async fn pick(&self, args: &PickArgs) -> PickResult<H>;
}
