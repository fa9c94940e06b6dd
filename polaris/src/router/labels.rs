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

use std::collections::BTreeSet;

use crate::{
    metadata::Metadata,
    router::{LabelMap, Route},
};

/// Hook for custom routing labels computed from the request headers.
/// Injected labels override labels read from headers.
pub trait LabelInjector: Send + Sync {
    fn inject_routing_labels(&self, headers: &Metadata) -> LabelMap;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLabelInjector;

impl LabelInjector for NoopLabelInjector {
    fn inject_routing_labels(&self, _headers: &Metadata) -> LabelMap {
        LabelMap::new()
    }
}

/// Adds the same labels to every call, eg. `consumer.labels` from config.
#[derive(Debug, Default, Clone)]
pub struct StaticLabelInjector {
    labels: LabelMap,
}

impl StaticLabelInjector {
    pub fn new(labels: LabelMap) -> Self {
        StaticLabelInjector { labels }
    }
}

impl LabelInjector for StaticLabelInjector {
    fn inject_routing_labels(&self, _headers: &Metadata) -> LabelMap {
        self.labels.clone()
    }
}

impl<F> LabelInjector for F
where
    F: Fn(&Metadata) -> LabelMap + Send + Sync,
{
    fn inject_routing_labels(&self, headers: &Metadata) -> LabelMap {
        (self)(headers)
    }
}

pub fn collect_routing_labels(
    routes: &[Route],
    headers: &Metadata,
    injector: &dyn LabelInjector,
) -> LabelMap {
    let label_keys: BTreeSet<&str> = routes
        .iter()
        .flat_map(|route| route.sources.iter())
        .flat_map(|source| source.metadata.keys())
        .map(String::as_str)
        .collect();

    let mut labels: LabelMap = label_keys
        .into_iter()
        .filter_map(|key| headers.get(key).map(|value| (key.to_string(), value.to_string())))
        .collect();

    labels.extend(injector.inject_routing_labels(headers));
    labels
}
