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
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{error::ConfigError, types::ConfigValidator};

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConsumerConfig {
    #[serde(default)]
    pub source: Option<SourceConfig>,

    // static routing labels added to every pick
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct SourceConfig {
    #[serde(default)]
    pub namespace: Option<String>,
    pub service: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ConfigValidator for ConsumerConfig {
    fn validate(&self) -> Result<(), Error> {
        match &self.source {
            Some(source) if source.service.trim().is_empty() => Err(ConfigError::Invalid(
                "consumer.source.service is empty".to_string(),
            )
            .into()),
            _ => Ok(()),
        }
    }
}
