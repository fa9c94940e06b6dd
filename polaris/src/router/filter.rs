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

use polaris_base::{constants::MATCH_ALL, ServiceKey};

use crate::router::{Route, SourceMatch};

/// Keeps the routes with at least one source match accepting `subject`.
/// Input order is preserved.
pub fn filter_routes(rules: &[Route], subject: &ServiceKey) -> Vec<Route> {
    rules
        .iter()
        .filter(|route| route.sources.iter().any(|source| accepts(source, subject)))
        .cloned()
        .collect()
}

pub(crate) fn accepts(source: &SourceMatch, subject: &ServiceKey) -> bool {
    let any_namespace = source.namespace == MATCH_ALL;
    let any_service = source.service == MATCH_ALL;

    if any_namespace && any_service {
        return true;
    }
    if any_namespace && source.service == subject.service {
        return true;
    }
    source.namespace == subject.namespace && source.service == subject.service
}
