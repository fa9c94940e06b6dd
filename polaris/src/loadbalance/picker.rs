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

use std::sync::Arc;

use async_trait::async_trait;
use polaris_base::SourceService;
use polaris_logger::tracing::{debug, error};

use crate::{
    discovery::{GetOneInstanceRequest, SharedConsumerApi},
    error::PolarisError,
    loadbalance::{ConnectionRegistry, PickArgs, PickResult, Picker},
    resolver::Attributes,
    router::{collect_routing_labels, LabelInjector, RuleStore},
    status::Status,
    tracer::CallResultReporter,
};

/// Asks the discovery client for one instance of the target, steered by the
/// routing labels of the call, and hands out the local connection to it.
pub struct PolarisPicker<H> {
    registry: Arc<ConnectionRegistry<H>>,
    consumer: SharedConsumerApi,
    rule_store: RuleStore,
    attributes: Attributes,
    source: Option<SourceService>,
    injector: Arc<dyn LabelInjector>,
}

impl<H> PolarisPicker<H> {
    pub fn new(
        registry: Arc<ConnectionRegistry<H>>,
        consumer: SharedConsumerApi,
        attributes: Attributes,
        source: Option<SourceService>,
        injector: Arc<dyn LabelInjector>,
    ) -> Self {
        PolarisPicker {
            registry,
            rule_store: RuleStore::new(consumer.clone()),
            consumer,
            attributes,
            source,
            injector,
        }
    }

    async fn build_request(&self, args: &PickArgs) -> Result<GetOneInstanceRequest, PolarisError> {
        let target = &self.attributes.target;
        let rule_set = self
            .rule_store
            .load(target, self.source.as_ref().map(|source| &source.key))
            .await?;
        let routes = rule_set.matched_routes();
        let labels = collect_routing_labels(&routes, &args.headers, self.injector.as_ref());
        debug!(
            "pick {} {} with {} matched routes, labels {:?}",
            target,
            args.method,
            routes.len(),
            labels
        );

        let mut request = GetOneInstanceRequest::new(target.clone());
        request.labels = labels;
        if let Some(source) = &self.source {
            request.metadata = source.metadata.clone();
            request.source = Some(source.clone());
        }
        Ok(request)
    }
}

impl<H> PolarisPicker<H>
where
    H: Clone + Send + Sync,
{
    async fn select(&self, args: &PickArgs) -> Result<PickResult<H>, PolarisError> {
        let request = self.build_request(args).await?;
        let instance = self.consumer.get_one_instance(request).await?;

        let endpoint = instance.endpoint();
        let Some(handle) = self.registry.lookup(&endpoint) else {
            return Err(PolarisError::NoConnectionForInstance { endpoint });
        };
        let reporter = CallResultReporter::new(
            endpoint,
            args.method.as_str(),
            self.attributes.target.clone(),
            self.consumer.clone(),
        );
        Ok(PickResult::Selected { handle, reporter })
    }
}

#[async_trait]
impl<H> Picker<H> for PolarisPicker<H>
where
    H: Clone + Send + Sync + 'static,
{
    async fn pick(&self, args: &PickArgs) -> PickResult<H> {
        if self.registry.is_empty() {
            return PickResult::NoResult;
        }
        match self.select(args).await {
            Ok(result) => result,
            Err(err) => {
                error!(
                    "pick instance of {} for {} failed: {}",
                    self.attributes.target, args.method, err
                );
                PickResult::Error(err)
            }
        }
    }
}

/// Picker used while there are no addresses, or after resolution failed.
#[derive(Debug, Clone)]
pub struct EmptyPicker {
    status: Status,
}

impl EmptyPicker {
    pub fn new(status: Status) -> Self {
        EmptyPicker { status }
    }

    pub fn no_result() -> Self {
        EmptyPicker::new(Status::ok())
    }
}

#[async_trait]
impl<H> Picker<H> for EmptyPicker
where
    H: Send + 'static,
{
    async fn pick(&self, _args: &PickArgs) -> PickResult<H> {
        if self.status.is_ok() {
            PickResult::NoResult
        } else {
            PickResult::Error(PolarisError::Status(self.status.clone()))
        }
    }
}
