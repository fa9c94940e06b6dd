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

use anyhow::Error;
use polaris_base::constants::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, types::ConfigValidator};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GlobalConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    // addresses of the discovery server, handed to whichever ConsumerApi is plugged in
    #[serde(default)]
    pub server_addresses: Vec<String>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            namespace: default_namespace(),
            server_addresses: Vec::new(),
        }
    }
}

impl ConfigValidator for GlobalConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("global.namespace is empty".to_string()).into());
        }
        Ok(())
    }
}
