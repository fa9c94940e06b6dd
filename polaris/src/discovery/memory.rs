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
    collections::{HashMap, VecDeque},
    sync::{Mutex, RwLock},
};

use async_trait::async_trait;
use polaris_base::ServiceKey;
use polaris_logger::tracing::debug;
use rand::seq::SliceRandom;

use super::{
    ConsumerApi, DiscoveryError, GetOneInstanceRequest, Instance, RuleType, ServiceCallResult,
};
use crate::router::RoutingRule;

/// In-process discovery client. Keeps instances and routing rules in memory
/// and records every reported call result. Balancing is a weighted random
/// choice, narrowed to the instances whose metadata carries all requested
/// labels when there are any.
#[derive(Debug, Default)]
pub struct MemoryConsumerApi {
    instances: RwLock<HashMap<ServiceKey, Vec<Instance>>>,
    rules: RwLock<HashMap<ServiceKey, RoutingRule>>,
    reported: Mutex<Vec<ServiceCallResult>>,
    failures: Mutex<VecDeque<DiscoveryError>>,
    rule_requests: Mutex<Vec<ServiceKey>>,
    instance_requests: Mutex<Vec<GetOneInstanceRequest>>,
}

impl MemoryConsumerApi {
    pub fn new() -> MemoryConsumerApi {
        MemoryConsumerApi::default()
    }

    pub fn add_instance(&self, key: ServiceKey, instance: Instance) {
        let mut map = self.instances.write().unwrap_or_else(|e| e.into_inner());
        let instances = map.entry(key).or_default();
        instances.retain(|i| i.endpoint() != instance.endpoint());
        instances.push(instance);
    }

    pub fn set_rule(&self, key: ServiceKey, rule: RoutingRule) {
        self.rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, rule);
    }

    /// The next lookup or rule fetch fails with `err`.
    pub fn fail_next(&self, err: DiscoveryError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }

    pub fn reported(&self) -> Vec<ServiceCallResult> {
        self.reported
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn rule_requests(&self) -> Vec<ServiceKey> {
        self.rule_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn instance_requests(&self) -> Vec<GetOneInstanceRequest> {
        self.instance_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn take_failure(&self) -> Result<(), DiscoveryError> {
        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn available(&self, key: &ServiceKey) -> Vec<Instance> {
        self.instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map(|instances| {
                instances
                    .iter()
                    .filter(|i| i.is_available())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConsumerApi for MemoryConsumerApi {
    async fn get_one_instance(
        &self,
        request: GetOneInstanceRequest,
    ) -> Result<Instance, DiscoveryError> {
        self.instance_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.take_failure()?;

        let candidates = self.available(&request.target);
        let labelled: Vec<Instance> = candidates
            .iter()
            .filter(|i| {
                !request.labels.is_empty()
                    && request
                        .labels
                        .iter()
                        .all(|(k, v)| i.metadata.get(k) == Some(v))
            })
            .cloned()
            .collect();
        let pool = if labelled.is_empty() {
            candidates
        } else {
            labelled
        };

        let instance = pool
            .choose_weighted(&mut rand::thread_rng(), |i| i.weight.max(1))
            .map_err(|_| DiscoveryError::InstanceNotFound(request.target.clone()))?
            .clone();
        debug!(
            "memory consumer pick {} for {} with labels {:?}",
            instance.id, request.target, request.labels
        );
        Ok(instance)
    }

    async fn get_all_instances(&self, key: &ServiceKey) -> Result<Vec<Instance>, DiscoveryError> {
        self.take_failure()?;
        Ok(self
            .instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_service_rule(
        &self,
        key: &ServiceKey,
        _rule_type: RuleType,
    ) -> Result<Option<RoutingRule>, DiscoveryError> {
        self.rule_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.clone());
        self.take_failure()?;
        Ok(self
            .rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn report_call_result(&self, result: ServiceCallResult) -> Result<(), DiscoveryError> {
        debug!("report call result {:?}", result);
        self.reported
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::LabelMap;

    fn echo() -> ServiceKey {
        ServiceKey::new("Test", "echo")
    }

    #[tokio::test]
    async fn test_pick_skips_unhealthy_and_isolated() {
        let consumer = MemoryConsumerApi::new();
        consumer.add_instance(echo(), Instance::new("10.0.0.1", 8080).with_healthy(false));
        consumer.add_instance(echo(), Instance::new("10.0.0.2", 8080).with_isolated(true));
        consumer.add_instance(echo(), Instance::new("10.0.0.3", 8080));

        for _ in 0..8 {
            let instance = consumer
                .get_one_instance(GetOneInstanceRequest::new(echo()))
                .await
                .unwrap();
            assert_eq!(instance.host, "10.0.0.3");
        }
        assert_eq!(consumer.get_all_instances(&echo()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_pick_prefers_labelled_instances() {
        let consumer = MemoryConsumerApi::new();
        consumer.add_instance(echo(), Instance::new("10.0.0.1", 8080).with_metadata("lane", "blue"));
        consumer.add_instance(echo(), Instance::new("10.0.0.2", 8080).with_metadata("lane", "gray"));

        let mut request = GetOneInstanceRequest::new(echo());
        request.labels = LabelMap::from([("lane".to_string(), "gray".to_string())]);
        for _ in 0..8 {
            let instance = consumer.get_one_instance(request.clone()).await.unwrap();
            assert_eq!(instance.host, "10.0.0.2");
        }
        assert_eq!(consumer.instance_requests().len(), 8);
    }

    #[tokio::test]
    async fn test_no_instance() {
        let consumer = MemoryConsumerApi::new();
        let err = consumer
            .get_one_instance(GetOneInstanceRequest::new(echo()))
            .await
            .unwrap_err();
        assert_eq!(err, DiscoveryError::InstanceNotFound(echo()));
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed_once() {
        let consumer = MemoryConsumerApi::new();
        consumer.fail_next(DiscoveryError::Unavailable("down".to_string()));
        assert!(consumer.get_all_instances(&echo()).await.is_err());
        assert!(consumer.get_all_instances(&echo()).await.is_ok());
    }
}
