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
    collections::HashMap,
    fmt::{Display, Formatter},
    net::SocketAddr,
};

/// Identifies a logical service inside a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey {
    pub namespace: String,
    pub service: String,
}

impl ServiceKey {
    pub fn new(namespace: impl Into<String>, service: impl Into<String>) -> Self {
        ServiceKey {
            namespace: namespace.into(),
            service: service.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Display for ServiceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.service)
    }
}

/// The calling (local) service: its identity plus the static metadata it advertises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceService {
    pub key: ServiceKey,
    pub metadata: HashMap<String, String>,
}

impl SourceService {
    pub fn new(key: ServiceKey) -> Self {
        SourceService {
            key,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Network identity of one instance. Connection handles are keyed by value on this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Endpoint {
            host: host.into(),
            port,
        }
    }

    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.authority().as_str())
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Endpoint::new(addr.ip().to_string(), addr.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_key_eq() {
        let k1 = ServiceKey::new("ns1", "svcA");
        let k2 = ServiceKey::new("ns1".to_string(), "svcA".to_string());
        assert_eq!(k1, k2);
        assert_ne!(k1, ServiceKey::new("ns2", "svcA"));
        assert_eq!(k1.to_string(), "ns1/svcA");
    }

    #[test]
    fn test_endpoint_authority() {
        assert_eq!(Endpoint::new("127.0.0.1", 8080).to_string(), "127.0.0.1:8080");
        assert_eq!(Endpoint::new("::1", 8080).authority(), "[::1]:8080");
        let addr: SocketAddr = "10.0.0.2:9000".parse().unwrap();
        assert_eq!(Endpoint::from(addr), Endpoint::new("10.0.0.2", 9000));
    }
}
