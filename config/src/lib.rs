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

use once_cell::sync::OnceCell;

pub use crate::types::{ConfigValidator, ConfigWrapper, RootConfig};
pub use location::get_config_location;

pub mod api;
pub mod error;
pub mod location;
pub mod types;

static POLARIS_CONFIG: OnceCell<ConfigWrapper> = OnceCell::new();

/// Loads `polaris.yaml` on first use. A missing or broken file falls back to the defaults.
pub fn get_root_config() -> ConfigWrapper {
    POLARIS_CONFIG
        .get_or_init(|| {
            let root = RootConfig::load().unwrap_or_else(|err| {
                polaris_logger::tracing::warn!("load polaris config failed, use default: {}", err);
                RootConfig::default()
            });
            ConfigWrapper::new(root)
        })
        .clone()
}
