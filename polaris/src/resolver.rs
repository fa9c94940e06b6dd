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

//! Name resolution of `polaris://` targets through the discovery client.

use std::sync::atomic::{AtomicBool, Ordering};

use polaris_base::{Endpoint, ServiceKey, TargetUri};
use polaris_logger::tracing::{debug, info, warn};

use crate::{discovery::SharedConsumerApi, error::PolarisError};

/// Carried from the resolver to the balancer with every address update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub target: ServiceKey,
}

pub trait ResolverListener: Send + Sync {
    fn on_addresses(&self, endpoints: Vec<Endpoint>, attributes: Attributes);

    fn on_error(&self, err: &PolarisError);
}

pub struct PolarisNameResolver {
    target: TargetUri,
    consumer: SharedConsumerApi,
    shutdown: AtomicBool,
}

impl PolarisNameResolver {
    pub fn new(target: TargetUri, consumer: SharedConsumerApi) -> Self {
        PolarisNameResolver {
            target,
            consumer,
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn from_target(target: &str, consumer: SharedConsumerApi) -> Result<Self, PolarisError> {
        let target = TargetUri::parse(target)?;
        Ok(PolarisNameResolver::new(target, consumer))
    }

    pub fn service_authority(&self) -> &str {
        self.target.service()
    }

    pub fn target(&self) -> &ServiceKey {
        self.target.service_key()
    }

    pub async fn start(&self, listener: &dyn ResolverListener) -> Result<(), PolarisError> {
        if self.shutdown.load(Ordering::Acquire) {
            debug!("resolver of {} is shut down", self.target);
            return Ok(());
        }

        let key = self.target.service_key();
        let instances = match self.consumer.get_all_instances(key).await {
            Ok(instances) => instances,
            Err(err) => {
                let err = PolarisError::from(err);
                warn!("resolve {} failed: {}", key, err);
                listener.on_error(&err);
                return Err(err);
            }
        };

        let endpoints: Vec<Endpoint> = instances
            .iter()
            .filter(|instance| instance.is_available())
            .map(|instance| instance.endpoint())
            .collect();
        info!(
            "resolved {} to {} of {} instances",
            key,
            endpoints.len(),
            instances.len()
        );
        debug!("resolved endpoints of {}: {:?}", key, endpoints);
        listener.on_addresses(endpoints, Attributes { target: key.clone() });
        Ok(())
    }

    pub async fn refresh(&self, listener: &dyn ResolverListener) -> Result<(), PolarisError> {
        self.start(listener).await
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}
