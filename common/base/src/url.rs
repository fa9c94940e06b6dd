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
    str::FromStr,
};

use thiserror::Error;

use crate::{
    constants::{DEFAULT_NAMESPACE, NAMESPACE_KEY, POLARIS_SCHEME},
    ServiceKey,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetUriError {
    #[error("invalid target uri {0}")]
    Malformed(String),
    #[error("unsupported scheme {0}, expect polaris")]
    Scheme(String),
    #[error("target uri {0} has no service name")]
    MissingService(String),
}

/// Parsed resolver target, eg. `polaris://echo-server?namespace=Test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUri {
    raw: String,
    key: ServiceKey,
    params: HashMap<String, String>,
}

impl TargetUri {
    pub fn parse(target: &str) -> Result<Self, TargetUriError> {
        let uri = target
            .parse::<http::Uri>()
            .map_err(|_| TargetUriError::Malformed(target.to_string()))?;

        match uri.scheme_str() {
            Some(POLARIS_SCHEME) => {}
            Some(other) => return Err(TargetUriError::Scheme(other.to_string())),
            None => return Err(TargetUriError::Malformed(target.to_string())),
        }

        let service = uri
            .authority()
            .map(|authority| authority.host().to_string())
            .unwrap_or_default();
        if service.is_empty() {
            return Err(TargetUriError::MissingService(target.to_string()));
        }

        let params = uri.query().map(Self::decode).unwrap_or_default();
        let namespace = params
            .get(NAMESPACE_KEY)
            .filter(|ns| !ns.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        Ok(TargetUri {
            raw: target.to_string(),
            key: ServiceKey::new(namespace, service),
            params,
        })
    }

    fn decode(raw_query_string: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        for pair in raw_query_string.split('&') {
            let mut kv = pair.splitn(2, '=');
            let (Some(k), Some(v)) = (kv.next(), kv.next()) else {
                continue;
            };
            let value = urlencoding::decode(v.trim())
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| v.trim().to_string());
            params.insert(k.trim().to_string(), value);
        }
        params
    }

    pub fn service_key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn namespace(&self) -> &str {
        &self.key.namespace
    }

    pub fn service(&self) -> &str {
        &self.key.service
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl Display for TargetUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.raw.as_str())
    }
}

impl FromStr for TargetUri {
    type Err = TargetUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetUri::parse(s)
    }
}
