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

use polaris_base::ServiceKey;
use polaris_logger::tracing::debug;

use crate::{
    discovery::{RuleType, SharedConsumerApi},
    error::PolarisError,
    router::{filter::filter_routes, Route},
};

/// Routes fetched for one pick, plus who they were fetched for and who they match against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRuleSet {
    rules: Arc<[Route]>,
    origin: Option<ServiceKey>,
    subject: Option<ServiceKey>,
}

impl RouteRuleSet {
    pub fn new(rules: Vec<Route>, origin: ServiceKey, subject: ServiceKey) -> Self {
        RouteRuleSet {
            rules: rules.into(),
            origin: Some(origin),
            subject: Some(subject),
        }
    }

    /// No routing info: contributes no labels.
    pub fn empty() -> Self {
        RouteRuleSet {
            rules: Vec::<Route>::new().into(),
            origin: None,
            subject: None,
        }
    }

    pub fn rules(&self) -> &[Route] {
        &self.rules
    }

    pub fn origin(&self) -> Option<&ServiceKey> {
        self.origin.as_ref()
    }

    pub fn subject(&self) -> Option<&ServiceKey> {
        self.subject.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn matched_routes(&self) -> Vec<Route> {
        match &self.subject {
            Some(subject) => filter_routes(&self.rules, subject),
            None => Vec::new(),
        }
    }
}

/// Picks the active routing rules: inbound rules of the target first, outbound
/// rules of the source when the target declares none.
#[derive(Clone)]
pub struct RuleStore {
    consumer: SharedConsumerApi,
}

impl RuleStore {
    pub fn new(consumer: SharedConsumerApi) -> Self {
        RuleStore { consumer }
    }

    pub async fn load(
        &self,
        target: &ServiceKey,
        source: Option<&ServiceKey>,
    ) -> Result<RouteRuleSet, PolarisError> {
        // routes are matched against the source, without one no route can
        // apply, so the inbound fetch is skipped as well
        let Some(source) = source else {
            debug!("no source service, skip route rules for {}", target);
            return Ok(RouteRuleSet::empty());
        };

        let inbound = self
            .consumer
            .get_service_rule(target, RuleType::Routing)
            .await?
            .map(|rule| rule.inbounds)
            .unwrap_or_default();
        if !inbound.is_empty() {
            debug!("use {} inbound routes of {}", inbound.len(), target);
            return Ok(RouteRuleSet::new(inbound, target.clone(), source.clone()));
        }

        let outbound = self
            .consumer
            .get_service_rule(source, RuleType::Routing)
            .await?
            .map(|rule| rule.outbounds)
            .unwrap_or_default();
        debug!("use {} outbound routes of {}", outbound.len(), source);
        Ok(RouteRuleSet::new(outbound, source.clone(), source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        discovery::{memory::MemoryConsumerApi, DiscoveryError},
        router::{RoutingRule, SourceMatch},
    };

    fn target() -> ServiceKey {
        ServiceKey::new("Test", "echo")
    }

    fn source() -> ServiceKey {
        ServiceKey::new("Test", "gateway")
    }

    #[tokio::test]
    async fn test_inbound_rules_win() {
        let consumer = Arc::new(MemoryConsumerApi::new());
        let inbound = Route::new(vec![SourceMatch::any()]);
        consumer.set_rule(target(), RoutingRule::new(vec![inbound.clone()], vec![]));
        consumer.set_rule(
            source(),
            RoutingRule::new(vec![], vec![Route::new(vec![SourceMatch::any()])]),
        );

        let store = RuleStore::new(consumer.clone());
        let rule_set = store.load(&target(), Some(&source())).await.unwrap();

        assert_eq!(rule_set.rules(), &[inbound]);
        assert_eq!(rule_set.origin(), Some(&target()));
        assert_eq!(rule_set.subject(), Some(&source()));
        // outbound rules of the source never fetched
        assert_eq!(consumer.rule_requests(), vec![target()]);
    }

    #[tokio::test]
    async fn test_fallback_to_outbound_rules() {
        let consumer = Arc::new(MemoryConsumerApi::new());
        let outbound = Route::new(vec![SourceMatch::new("Test", "gateway")]);
        consumer.set_rule(target(), RoutingRule::default());
        consumer.set_rule(source(), RoutingRule::new(vec![], vec![outbound.clone()]));

        let store = RuleStore::new(consumer.clone());
        let rule_set = store.load(&target(), Some(&source())).await.unwrap();

        assert_eq!(rule_set.rules(), &[outbound.clone()]);
        assert_eq!(rule_set.origin(), Some(&source()));
        assert_eq!(rule_set.matched_routes(), vec![outbound]);
        assert_eq!(consumer.rule_requests(), vec![target(), source()]);
    }

    #[tokio::test]
    async fn test_no_source_means_no_rules() {
        let consumer = Arc::new(MemoryConsumerApi::new());
        consumer.set_rule(
            target(),
            RoutingRule::new(vec![Route::new(vec![SourceMatch::any()])], vec![]),
        );

        let store = RuleStore::new(consumer.clone());
        let rule_set = store.load(&target(), None).await.unwrap();

        assert!(rule_set.is_empty());
        assert!(rule_set.matched_routes().is_empty());
        assert!(consumer.rule_requests().is_empty());
    }

    #[tokio::test]
    async fn test_rule_fetch_error_propagates() {
        let consumer = Arc::new(MemoryConsumerApi::new());
        consumer.fail_next(DiscoveryError::Unavailable("timeout".to_string()));

        let store = RuleStore::new(consumer);
        let err = store.load(&target(), Some(&source())).await.unwrap_err();
        assert!(matches!(
            err,
            PolarisError::Discovery(DiscoveryError::Unavailable(_))
        ));
    }
}
