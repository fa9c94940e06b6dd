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

use polaris_base::constants::{
    DEFAULT_CONFIG_FILE, ENV_POLARIS_CONFIG_FILE, ENV_POLARIS_CONFIG_PATH, ENV_POLARIS_LOG_LEVEL,
};
use polaris_utils::{env_util::get_env_value, path_util::config_location, yaml_util::yaml_key_reader};

use crate::{level::LevelWrapper, Level};

const LEVEL_KEY: &str = "polaris.logging.level";

pub(crate) fn default() {
    let level = configured().unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_thread_names(false)
        .with_line_number(true)
        // sets this to be the default, global collector for this application.
        .try_init();
}

// env var wins over `polaris.logging.level` in the config file
pub(crate) fn configured() -> Option<Level> {
    if let Some(level) = get_env_value(ENV_POLARIS_LOG_LEVEL) {
        return Some(LevelWrapper::from(level).inner);
    }
    let path = config_location(
        ENV_POLARIS_CONFIG_PATH,
        ENV_POLARIS_CONFIG_FILE,
        DEFAULT_CONFIG_FILE,
    );
    yaml_key_reader(path, LEVEL_KEY)
        .ok()
        .flatten()
        .map(|level| LevelWrapper::from(level).inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_env() {
        std::env::set_var(ENV_POLARIS_LOG_LEVEL, "debug");
        assert_eq!(configured(), Some(Level::DEBUG));
        std::env::set_var(ENV_POLARIS_LOG_LEVEL, "error");
        assert_eq!(configured(), Some(Level::ERROR));
    }
}
