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

use dashmap::DashMap;
use polaris_base::Endpoint;

/// Connection handles by endpoint. Mutated by the balancer on topology
/// change while pickers look handles up concurrently.
#[derive(Debug)]
pub struct ConnectionRegistry<H> {
    connections: DashMap<Endpoint, H>,
}

impl<H> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        ConnectionRegistry {
            connections: DashMap::new(),
        }
    }
}

impl<H> ConnectionRegistry<H> {
    pub fn new() -> Self {
        ConnectionRegistry::default()
    }

    pub fn lookup(&self, endpoint: &Endpoint) -> Option<H>
    where
        H: Clone,
    {
        self.connections
            .get(endpoint)
            .map(|handle| handle.value().clone())
    }

    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.connections.contains_key(endpoint)
    }

    pub fn insert(&self, endpoint: Endpoint, handle: H) -> Option<H> {
        self.connections.insert(endpoint, handle)
    }

    pub fn remove(&self, endpoint: &Endpoint) -> Option<H> {
        self.connections.remove(endpoint).map(|(_, handle)| handle)
    }

    /// Keeps only the endpoints `keep` returns true for.
    pub fn retain(&self, mut keep: impl FnMut(&Endpoint) -> bool) {
        self.connections.retain(|endpoint, _| keep(endpoint));
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn clear(&self) {
        self.connections.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }
}
