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

use crate::error::ConfigError;
use crate::get_config_location;
use crate::types::consumer::ConsumerConfig;
use crate::types::global::GlobalConfig;
use crate::types::logging::LoggingConfig;
use anyhow::Error;
use polaris_base::constants::POLARIS_KEY;
use polaris_base::{ServiceKey, SourceService};
use polaris_logger::tracing;
use polaris_utils::yaml_util::yaml_file_parser;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub mod consumer;
pub mod global;
pub mod logging;

/// Everything under the `polaris` key of `polaris.yaml`.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct RootConfig {
    #[serde(skip)]
    pub location: PathBuf,

    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub consumer: ConsumerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RootConfig {
    pub fn load() -> Result<RootConfig, Error> {
        Self::load_from(get_config_location())
    }

    pub fn load_from(path: PathBuf) -> Result<RootConfig, Error> {
        tracing::debug!("load polaris config from {:?}", path);
        let mut conf: HashMap<String, RootConfig> = yaml_file_parser(path.clone())?;
        let mut root_config = conf
            .remove(POLARIS_KEY)
            .ok_or_else(|| ConfigError::RootNotFound(POLARIS_KEY.to_string()))?;
        root_config.location = path;
        root_config.validate()?;
        Ok(root_config)
    }

    /// Identity of the local service, namespace defaulting to `global.namespace`.
    pub fn source_service(&self) -> Option<SourceService> {
        let source = self.consumer.source.as_ref()?;
        let namespace = source
            .namespace
            .clone()
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| self.global.namespace.clone());
        Some(
            SourceService::new(ServiceKey::new(namespace, source.service.clone()))
                .with_metadata(source.metadata.clone()),
        )
    }
}

impl ConfigValidator for RootConfig {
    fn validate(&self) -> Result<(), Error> {
        self.global.validate()?;
        self.consumer.validate()
    }
}

#[derive(Clone)]
pub struct ConfigWrapper {
    pub inner: Arc<Mutex<RootConfig>>,
}

impl ConfigWrapper {
    pub fn new(root: RootConfig) -> Self {
        ConfigWrapper {
            inner: Arc::new(Mutex::new(root)),
        }
    }

    pub fn snapshot(&self) -> RootConfig {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

pub trait ConfigValidator {
    fn validate(&self) -> Result<(), Error>;
}
