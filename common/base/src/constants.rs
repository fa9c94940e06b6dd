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

pub const POLARIS_SCHEME: &str = "polaris";

pub const DEFAULT_NAMESPACE: &str = "default";

pub const NAMESPACE_KEY: &str = "namespace";

/// Wildcard used by routing rule source matches.
pub const MATCH_ALL: &str = "*";

pub const POLARIS_KEY: &str = "polaris";

pub const DEFAULT_CONFIG_FILE: &str = "polaris.yaml";

pub const ENV_POLARIS_CONFIG_PATH: &str = "POLARIS_CONFIG_PATH";

pub const ENV_POLARIS_CONFIG_FILE: &str = "POLARIS_CONFIG_FILE";

pub const ENV_POLARIS_LOG_LEVEL: &str = "POLARIS_LOG_LEVEL";
