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

#[cfg(test)]
mod tests_config {
    use anyhow::Error;
    use std::collections::HashMap;
    use std::path::PathBuf;

    use polaris_base::ServiceKey;
    use polaris_config::api::ConfigApi;
    use polaris_config::{ConfigWrapper, RootConfig};

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join(name)
    }

    #[test]
    fn test_load_root_config() -> Result<(), Error> {
        let config = RootConfig::load_from(fixture("polaris.yaml"))?;
        assert_eq!(config.global.namespace, "Test");
        assert_eq!(config.global.server_addresses, vec!["127.0.0.1:8091"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.location, fixture("polaris.yaml"));

        let source = config.source_service().expect("source configured");
        assert_eq!(source.key, ServiceKey::new("Test", "gateway"));
        assert_eq!(source.metadata.get("env"), Some(&"gray".to_string()));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(RootConfig::load_from(fixture("broken.yaml")).is_err());
        assert!(RootConfig::load_from(fixture("missing.yaml")).is_err());
    }

    #[test]
    fn test_defaults_without_source() {
        let config = RootConfig::default();
        assert_eq!(config.global.namespace, "default");
        assert_eq!(config.logging.level, "info");
        assert!(config.source_service().is_none());
    }

    #[test]
    fn test_overwrite_yaml_by_api() -> Result<(), Error> {
        let wrapper = ConfigWrapper::new(RootConfig::load_from(fixture("polaris.yaml"))?);
        wrapper.polaris_label_set("lane", "green")?;
        wrapper.polaris_label_set("region", "sz")?;
        let labels = wrapper.polaris_labels_get()?;
        assert_eq!(
            labels,
            HashMap::from([
                ("lane".to_string(), "green".to_string()),
                ("region".to_string(), "sz".to_string()),
            ])
        );

        wrapper.polaris_source_set(Some("Prod"), "gateway-v2")?;
        let source = wrapper.polaris_source_get()?;
        assert_eq!(source.key, ServiceKey::new("Prod", "gateway-v2"));
        // metadata survives a source override
        assert_eq!(source.metadata.get("env"), Some(&"gray".to_string()));

        assert!(wrapper.polaris_source_set(None, " ").is_err());
        Ok(())
    }
}
