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

//! The discovery client seam. Lookups, rule fetches and call-result
//! statistics all go through [`ConsumerApi`]; balancing, health checking and
//! circuit breaking are the implementation's business.

pub mod memory;

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use polaris_base::{Endpoint, ServiceKey, SourceService};
use thiserror::Error;

use crate::{
    router::{LabelMap, RoutingRule},
    status::Code,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("no available instance for service {0}")]
    InstanceNotFound(ServiceKey),
    #[error("discovery server unavailable: {0}")]
    Unavailable(String),
    #[error("discovery server error, code: {code}, message: {message}")]
    Server { code: i32, message: String },
}

// only routing rules are consumed here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    Routing,
}

/// One replica of a service as known by the discovery server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub healthy: bool,
    pub isolated: bool,
    pub weight: u32,
    pub metadata: HashMap<String, String>,
}

impl Instance {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        Instance {
            id: format!("{}:{}", host, port),
            host,
            port,
            healthy: true,
            isolated: false,
            weight: 100,
            metadata: HashMap::new(),
        }
    }

    pub fn with_healthy(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn with_isolated(mut self, isolated: bool) -> Self {
        self.isolated = isolated;
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Healthy and not isolated: the only instances a resolver hands out.
    pub fn is_available(&self) -> bool {
        self.healthy && !self.isolated
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOneInstanceRequest {
    pub target: ServiceKey,
    pub source: Option<SourceService>,
    // labels collected from the matched routes, steer the routing decision
    pub labels: LabelMap,
    // static metadata of the source service
    pub metadata: HashMap<String, String>,
}

impl GetOneInstanceRequest {
    pub fn new(target: ServiceKey) -> Self {
        GetOneInstanceRequest {
            target,
            source: None,
            labels: LabelMap::new(),
            metadata: HashMap::new(),
        }
    }
}

/// Outcome of one call, captured once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    pub code: Code,
    pub elapsed: Duration,
}

impl CallOutcome {
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCallResult {
    pub endpoint: Endpoint,
    pub method: String,
    pub target: ServiceKey,
    pub outcome: CallOutcome,
}

#[async_trait]
pub trait ConsumerApi: Send + Sync {
    async fn get_one_instance(
        &self,
        request: GetOneInstanceRequest,
    ) -> Result<Instance, DiscoveryError>;

    async fn get_all_instances(&self, key: &ServiceKey) -> Result<Vec<Instance>, DiscoveryError>;

    /// `Ok(None)` when the service has no rule of that type.
    async fn get_service_rule(
        &self,
        key: &ServiceKey,
        rule_type: RuleType,
    ) -> Result<Option<RoutingRule>, DiscoveryError>;

    // called from stream callbacks, so it must not block
    fn report_call_result(&self, result: ServiceCallResult) -> Result<(), DiscoveryError>;
}

pub type SharedConsumerApi = Arc<dyn ConsumerApi>;
