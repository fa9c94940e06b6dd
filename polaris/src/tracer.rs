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

//! Call-result reporting. Each outbound call gets one [`CallResultReporter`]
//! which forwards the call outcome to the discovery client exactly once.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use polaris_base::{Endpoint, ServiceKey};
use polaris_logger::tracing::{debug, warn};

use crate::{
    discovery::{CallOutcome, ServiceCallResult, SharedConsumerApi},
    status::Code,
};

pub struct CallResultReporter {
    reported: AtomicBool,
    start: Instant,
    endpoint: Endpoint,
    method: String,
    target: ServiceKey,
    consumer: SharedConsumerApi,
}

impl CallResultReporter {
    pub fn new(
        endpoint: Endpoint,
        method: impl Into<String>,
        target: ServiceKey,
        consumer: SharedConsumerApi,
    ) -> Self {
        CallResultReporter {
            reported: AtomicBool::new(false),
            start: Instant::now(),
            endpoint,
            method: method.into(),
            target,
            consumer,
        }
    }

    /// The call finished with a final status.
    pub fn stream_closed(&self, code: Code) {
        self.report(code.is_ok(), code);
    }

    /// The first response message arrived, counted as success.
    pub fn inbound_message_read(&self) {
        self.report(true, Code::Ok);
    }

    pub fn is_reported(&self) -> bool {
        self.reported.load(Ordering::Acquire)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    fn report(&self, success: bool, code: Code) {
        if self
            .reported
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let result = ServiceCallResult {
            endpoint: self.endpoint.clone(),
            method: self.method.clone(),
            target: self.target.clone(),
            outcome: CallOutcome {
                success,
                code,
                elapsed: self.start.elapsed(),
            },
        };
        debug!(
            "report {} {} on {}: {} in {}ms",
            self.target,
            self.method,
            self.endpoint,
            code,
            result.outcome.elapsed_millis()
        );
        if let Err(err) = self.consumer.report_call_result(result) {
            // the call already completed, a lost statistic is not its failure
            warn!("report call result of {} failed: {}", self.target, err);
        }
    }
}

impl fmt::Debug for CallResultReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallResultReporter")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("target", &self.target)
            .field("reported", &self.is_reported())
            .finish()
    }
}
