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
    collections::HashSet,
    sync::{Arc, RwLock},
};

use polaris_base::{Endpoint, NewService, SourceService};
use polaris_config::{get_root_config, RootConfig};
use polaris_logger::tracing::{debug, info, warn};

use crate::{
    discovery::SharedConsumerApi,
    error::PolarisError,
    loadbalance::{ConnectionRegistry, EmptyPicker, Picker, PolarisPicker},
    resolver::{Attributes, ResolverListener},
    router::{LabelInjector, NoopLabelInjector, StaticLabelInjector},
    status::Status,
};

/// Keeps one connection handle per resolved endpoint and publishes a fresh
/// picker whenever the address list changes.
pub struct PolarisLoadBalancer<N>
where
    N: NewService<Endpoint>,
{
    new_service: N,
    registry: Arc<ConnectionRegistry<N::Service>>,
    consumer: SharedConsumerApi,
    source: Option<SourceService>,
    injector: Arc<dyn LabelInjector>,
    picker: RwLock<Arc<dyn Picker<N::Service>>>,
}

impl<N> PolarisLoadBalancer<N>
where
    N: NewService<Endpoint>,
    N::Service: Clone + Send + Sync + 'static,
{
    pub fn new(new_service: N, consumer: SharedConsumerApi) -> Self {
        let picker: Arc<dyn Picker<N::Service>> = Arc::new(EmptyPicker::no_result());
        PolarisLoadBalancer {
            new_service,
            registry: Arc::new(ConnectionRegistry::new()),
            consumer,
            source: None,
            injector: Arc::new(NoopLabelInjector),
            picker: RwLock::new(picker),
        }
    }

    /// Source identity and static labels come from the `consumer` section.
    pub fn from_config(new_service: N, consumer: SharedConsumerApi, config: &RootConfig) -> Self {
        let mut balancer = PolarisLoadBalancer::new(new_service, consumer)
            .with_source(config.source_service());
        if !config.consumer.labels.is_empty() {
            balancer = balancer.with_label_injector(Arc::new(StaticLabelInjector::new(
                config.consumer.labels.clone(),
            )));
        }
        balancer
    }

    /// Like [`Self::from_config`], reading the process-wide config including
    /// overrides made through `ConfigApi`.
    pub fn from_root_config(new_service: N, consumer: SharedConsumerApi) -> Self {
        let config = get_root_config().snapshot();
        PolarisLoadBalancer::from_config(new_service, consumer, &config)
    }

    pub fn with_source(mut self, source: Option<SourceService>) -> Self {
        self.source = source;
        self
    }

    pub fn with_label_injector(mut self, injector: Arc<dyn LabelInjector>) -> Self {
        self.injector = injector;
        self
    }

    pub fn picker(&self) -> Arc<dyn Picker<N::Service>> {
        self.picker
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry<N::Service>> {
        &self.registry
    }

    pub fn shutdown(&self) {
        self.registry.clear();
        self.update_picker(Arc::new(EmptyPicker::no_result()));
        info!("polaris load balancer shut down");
    }

    fn update_picker(&self, picker: Arc<dyn Picker<N::Service>>) {
        *self.picker.write().unwrap_or_else(|e| e.into_inner()) = picker;
    }
}

impl<N> ResolverListener for PolarisLoadBalancer<N>
where
    N: NewService<Endpoint> + Send + Sync,
    N::Service: Clone + Send + Sync + 'static,
{
    fn on_addresses(&self, endpoints: Vec<Endpoint>, attributes: Attributes) {
        let fresh: HashSet<&Endpoint> = endpoints.iter().collect();
        self.registry.retain(|endpoint| fresh.contains(endpoint));

        for endpoint in endpoints.iter() {
            if !self.registry.contains(endpoint) {
                debug!("new connection to {} for {}", endpoint, attributes.target);
                let handle = self.new_service.new_service(endpoint.clone());
                self.registry.insert(endpoint.clone(), handle);
            }
        }

        info!(
            "{} has {} connections after address update",
            attributes.target,
            self.registry.len()
        );
        self.update_picker(Arc::new(PolarisPicker::new(
            self.registry.clone(),
            self.consumer.clone(),
            attributes,
            self.source.clone(),
            self.injector.clone(),
        )));
    }

    fn on_error(&self, err: &PolarisError) {
        warn!("name resolution failed: {}", err);
        self.update_picker(Arc::new(EmptyPicker::new(Status::unavailable(
            err.to_string(),
        ))));
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use polaris_base::ServiceKey;
    use polaris_config::types::consumer::SourceConfig;

    use super::*;
    use crate::{
        discovery::{memory::MemoryConsumerApi, DiscoveryError, Instance},
        loadbalance::{PickArgs, PickResult},
        status::Code,
    };

    fn attributes() -> Attributes {
        Attributes {
            target: ServiceKey::new("Test", "echo"),
        }
    }

    #[tokio::test]
    async fn test_no_result_before_addresses() {
        let balancer =
            PolarisLoadBalancer::new(|ep: Endpoint| ep, Arc::new(MemoryConsumerApi::new()));
        let result = balancer.picker().pick(&PickArgs::default()).await;
        assert!(matches!(result, PickResult::NoResult));
    }

    #[tokio::test]
    async fn test_addresses_sync_registry() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let new_service = move |ep: Endpoint| {
            counter.fetch_add(1, Ordering::SeqCst);
            ep.authority()
        };
        let consumer = Arc::new(MemoryConsumerApi::new());
        consumer.add_instance(attributes().target, Instance::new("10.0.0.2", 8080));
        let balancer = PolarisLoadBalancer::new(new_service, consumer);

        balancer.on_addresses(
            vec![Endpoint::new("10.0.0.1", 8080), Endpoint::new("10.0.0.2", 8080)],
            attributes(),
        );
        balancer.on_addresses(
            vec![Endpoint::new("10.0.0.2", 8080), Endpoint::new("10.0.0.3", 8080)],
            attributes(),
        );

        // 10.0.0.2 keeps its connection
        assert_eq!(created.load(Ordering::SeqCst), 3);
        let mut endpoints = balancer.registry().endpoints();
        endpoints.sort();
        assert_eq!(
            endpoints,
            vec![Endpoint::new("10.0.0.2", 8080), Endpoint::new("10.0.0.3", 8080)]
        );

        let result = balancer.picker().pick(&PickArgs::default()).await;
        let PickResult::Selected { handle, .. } = result else {
            panic!("expect selected");
        };
        assert_eq!(handle, "10.0.0.2:8080");
    }

    #[tokio::test]
    async fn test_error_installs_unavailable_picker() {
        let balancer =
            PolarisLoadBalancer::new(|ep: Endpoint| ep, Arc::new(MemoryConsumerApi::new()));
        balancer.on_error(&PolarisError::from(DiscoveryError::Unavailable(
            "timeout".to_string(),
        )));

        let result = balancer.picker().pick(&PickArgs::default()).await;
        let PickResult::Error(err) = result else {
            panic!("expect error");
        };
        assert_eq!(err.code(), Code::Unavailable);
    }

    #[tokio::test]
    async fn test_shutdown_clears_registry() {
        let balancer =
            PolarisLoadBalancer::new(|ep: Endpoint| ep, Arc::new(MemoryConsumerApi::new()));
        balancer.on_addresses(vec![Endpoint::new("10.0.0.1", 8080)], attributes());
        assert_eq!(balancer.registry().len(), 1);

        balancer.shutdown();
        assert!(balancer.registry().is_empty());
        let result = balancer.picker().pick(&PickArgs::default()).await;
        assert!(matches!(result, PickResult::NoResult));
    }

    #[tokio::test]
    async fn test_from_config_uses_source_and_labels() {
        let mut config = RootConfig::default();
        config.global.namespace = "Test".to_string();
        config.consumer.source = Some(SourceConfig {
            namespace: None,
            service: "gateway".to_string(),
            metadata: HashMap::new(),
        });
        config.consumer.labels = HashMap::from([("lane".to_string(), "gray".to_string())]);

        let consumer = Arc::new(MemoryConsumerApi::new());
        consumer.add_instance(attributes().target, Instance::new("10.0.0.1", 8080));
        let balancer =
            PolarisLoadBalancer::from_config(|ep: Endpoint| ep, consumer.clone(), &config);
        balancer.on_addresses(vec![Endpoint::new("10.0.0.1", 8080)], attributes());

        let result = balancer.picker().pick(&PickArgs::default()).await;
        assert!(result.is_selected());
        let requests = consumer.instance_requests();
        assert_eq!(
            requests[0].source.as_ref().map(|source| &source.key),
            Some(&ServiceKey::new("Test", "gateway"))
        );
        assert_eq!(requests[0].labels, config.consumer.labels);
        // both routing rules of the target and of the source were looked up
        assert_eq!(
            consumer.rule_requests(),
            vec![attributes().target, ServiceKey::new("Test", "gateway")]
        );
    }
}
