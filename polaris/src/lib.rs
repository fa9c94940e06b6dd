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

pub mod discovery;
pub mod error;
pub mod loadbalance;
pub mod metadata;
pub mod resolver;
pub mod router;
pub mod status;
pub mod tracer;

pub use discovery::{ConsumerApi, SharedConsumerApi};
pub use error::PolarisError;
pub use loadbalance::{PickArgs, PickResult, Picker, PolarisLoadBalancer, PolarisService};
pub use metadata::Metadata;
pub use resolver::{Attributes, PolarisNameResolver, ResolverListener};
pub use tracer::CallResultReporter;

pub use polaris_base::{Endpoint, ServiceKey, SourceService, StdError};
