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

//! Routing rules as fetched from the discovery server, and the steps that turn
//! them into routing labels: rule selection, source filtering, label collection.

pub mod filter;
pub mod labels;
pub mod rule_store;

use std::collections::HashMap;

use polaris_base::constants::MATCH_ALL;

pub use filter::filter_routes;
pub use labels::{collect_routing_labels, LabelInjector, NoopLabelInjector, StaticLabelInjector};
pub use rule_store::{RouteRuleSet, RuleStore};

pub type LabelMap = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStringType {
    #[default]
    Exact,
    Regex,
}

/// A metadata matcher. Only its key matters to label collection; the value is
/// evaluated by the discovery server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchString {
    pub match_type: MatchStringType,
    pub value: String,
}

impl MatchString {
    pub fn exact(value: impl Into<String>) -> Self {
        MatchString {
            match_type: MatchStringType::Exact,
            value: value.into(),
        }
    }

    pub fn regex(value: impl Into<String>) -> Self {
        MatchString {
            match_type: MatchStringType::Regex,
            value: value.into(),
        }
    }
}

/// Which callers a route applies to. `*` in namespace or service matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceMatch {
    pub namespace: String,
    pub service: String,
    pub metadata: HashMap<String, MatchString>,
}

impl SourceMatch {
    pub fn new(namespace: impl Into<String>, service: impl Into<String>) -> Self {
        SourceMatch {
            namespace: namespace.into(),
            service: service.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn any() -> Self {
        SourceMatch::new(MATCH_ALL, MATCH_ALL)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MatchString) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub namespace: String,
    pub service: String,
    pub metadata: HashMap<String, MatchString>,
    pub priority: u32,
    pub weight: u32,
}

impl Destination {
    pub fn new(namespace: impl Into<String>, service: impl Into<String>) -> Self {
        Destination {
            namespace: namespace.into(),
            service: service.into(),
            metadata: HashMap::new(),
            priority: 0,
            weight: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub sources: Vec<SourceMatch>,
    pub destinations: Vec<Destination>,
}

impl Route {
    pub fn new(sources: Vec<SourceMatch>) -> Self {
        Route {
            sources,
            destinations: Vec::new(),
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destinations.push(destination);
        self
    }
}

/// Routing rule document of one service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutingRule {
    pub inbounds: Vec<Route>,
    pub outbounds: Vec<Route>,
}

impl RoutingRule {
    pub fn new(inbounds: Vec<Route>, outbounds: Vec<Route>) -> Self {
        RoutingRule {
            inbounds,
            outbounds,
        }
    }
}
