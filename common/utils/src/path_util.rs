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

use std::{env, path::PathBuf};

use crate::env_util::get_env_value;

pub fn app_root_dir() -> PathBuf {
    match project_root::get_project_root() {
        // Cargo.lock file as app root dir
        Ok(p) => p,
        Err(_) => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

// resolve a yaml config file: `$dir_env/$file_env`, falling back to the app root and `default_file`
pub fn config_location(dir_env: &str, file_env: &str, default_file: &str) -> PathBuf {
    let dir = get_env_value(dir_env)
        .map(PathBuf::from)
        .unwrap_or_else(app_root_dir);
    let file = get_env_value(file_env).unwrap_or_else(|| default_file.to_string());
    dir.join(file)
}
