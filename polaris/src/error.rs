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

use polaris_base::{Endpoint, TargetUriError};
use thiserror::Error;

use crate::{
    discovery::DiscoveryError,
    status::{Code, Status},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolarisError {
    #[error("no connection for instance {endpoint}")]
    NoConnectionForInstance { endpoint: Endpoint },
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("no available endpoint")]
    NoAvailableEndpoint,
    #[error("{0}")]
    Status(Status),
    #[error("invalid polaris target: {0}")]
    InvalidTarget(String),
}

impl PolarisError {
    /// The grpc status a failed pick surfaces as.
    pub fn code(&self) -> Code {
        match self {
            PolarisError::NoConnectionForInstance { .. } => Code::NotFound,
            PolarisError::Discovery(_) => Code::Unknown,
            PolarisError::NoAvailableEndpoint => Code::Unavailable,
            PolarisError::Status(status) => status.code(),
            PolarisError::InvalidTarget(_) => Code::InvalidArgument,
        }
    }

    pub fn to_status(&self) -> Status {
        match self {
            PolarisError::Status(status) => status.clone(),
            other => Status::new(other.code(), other.to_string()),
        }
    }
}

impl From<TargetUriError> for PolarisError {
    fn from(err: TargetUriError) -> Self {
        PolarisError::InvalidTarget(err.to_string())
    }
}

impl From<Status> for PolarisError {
    fn from(status: Status) -> Self {
        PolarisError::Status(status)
    }
}
