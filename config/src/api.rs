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

use std::collections::HashMap;
use std::sync::MutexGuard;

use crate::error::ConfigError;
use crate::types::consumer::SourceConfig;
use crate::types::RootConfig;
use crate::ConfigWrapper;
use anyhow::{anyhow, Error, Result};
use polaris_base::SourceService;

// overrides values loaded from yaml at runtime

pub trait ConfigApi {
    fn polaris_source_get(&self) -> Result<SourceService, Error>;
    fn polaris_source_set(&self, namespace: Option<&str>, service: &str) -> Result<(), Error>;
    fn polaris_label_set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn polaris_labels_get(&self) -> Result<HashMap<String, String>, Error>;
}

impl ConfigWrapper {
    fn guard(&self) -> Result<MutexGuard<'_, RootConfig>, Error> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("polaris config lock poisoned"))
    }
}

impl ConfigApi for ConfigWrapper {
    fn polaris_source_get(&self) -> Result<SourceService, Error> {
        self.guard()?
            .source_service()
            .ok_or_else(|| anyhow!(ConfigError::SourceNotConfigured))
    }

    fn polaris_source_set(&self, namespace: Option<&str>, service: &str) -> Result<(), Error> {
        if service.trim().is_empty() {
            return Err(anyhow!(ConfigError::Invalid(
                "source service is empty".to_string()
            )));
        }
        let mut guard = self.guard()?;
        let metadata = guard
            .consumer
            .source
            .take()
            .map(|s| s.metadata)
            .unwrap_or_default();
        guard.consumer.source = Some(SourceConfig {
            namespace: namespace.map(str::to_string),
            service: service.to_string(),
            metadata,
        });
        Ok(())
    }

    fn polaris_label_set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.guard()?
            .consumer
            .labels
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn polaris_labels_get(&self) -> Result<HashMap<String, String>, Error> {
        Ok(self.guard()?.consumer.labels.clone())
    }
}
