use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    IdentifyPayload, IdentifyTransport, TransportError, UpstreamResult, UpstreamTarget,
};
use crate::use_cases::{IdentifySettings, RetryPolicy};

// Settings with the availability check on and no retry delay.
pub(crate) fn settings_for(target: UpstreamTarget) -> IdentifySettings {
    IdentifySettings {
        target,
        retry: RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        },
        availability_check: true,
        api_key: None,
        auth_token: None,
    }
}

#[derive(Default)]
struct CallLog {
    availability: usize,
    download: usize,
    submit: usize,
    last_payload: Option<IdentifyPayload>,
}

// Transport fake with scripted answers; records every call for assertions.
pub(crate) struct ScriptedTransport {
    availability: Result<u16, TransportError>,
    download: Result<Bytes, TransportError>,
    submissions: Mutex<VecDeque<Result<UpstreamResult, TransportError>>>,
    calls: Mutex<CallLog>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            availability: Ok(200),
            download: Ok(Bytes::from_static(b"\xff\xd8\xff\xe0fake-jpeg")),
            submissions: Mutex::new(VecDeque::new()),
            calls: Mutex::new(CallLog::default()),
        }
    }

    pub(crate) fn with_availability(mut self, answer: Result<u16, TransportError>) -> Self {
        self.availability = answer;
        self
    }

    pub(crate) fn with_download(mut self, answer: Result<Bytes, TransportError>) -> Self {
        self.download = answer;
        self
    }

    pub(crate) fn with_submissions(
        self,
        answers: Vec<Result<UpstreamResult, TransportError>>,
    ) -> Self {
        *self.submissions.lock().expect("submissions mutex poisoned") = answers.into();
        self
    }

    pub(crate) fn availability_calls(&self) -> usize {
        self.calls.lock().expect("calls mutex poisoned").availability
    }

    pub(crate) fn download_calls(&self) -> usize {
        self.calls.lock().expect("calls mutex poisoned").download
    }

    pub(crate) fn submit_calls(&self) -> usize {
        self.calls.lock().expect("calls mutex poisoned").submit
    }

    pub(crate) fn total_calls(&self) -> usize {
        let calls = self.calls.lock().expect("calls mutex poisoned");
        calls.availability + calls.download + calls.submit
    }

    pub(crate) fn last_payload(&self) -> Option<IdentifyPayload> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .last_payload
            .clone()
    }
}

#[async_trait]
impl IdentifyTransport for ScriptedTransport {
    async fn check_availability(&self, _url: &str) -> Result<u16, TransportError> {
        self.calls.lock().expect("calls mutex poisoned").availability += 1;
        self.availability.clone()
    }

    async fn download_image(&self, _url: &str) -> Result<Bytes, TransportError> {
        self.calls.lock().expect("calls mutex poisoned").download += 1;
        self.download.clone()
    }

    async fn submit(
        &self,
        _endpoint: &str,
        payload: &IdentifyPayload,
    ) -> Result<UpstreamResult, TransportError> {
        {
            let mut calls = self.calls.lock().expect("calls mutex poisoned");
            calls.submit += 1;
            calls.last_payload = Some(payload.clone());
        }
        // An exhausted script behaves like a dead upstream.
        self.submissions
            .lock()
            .expect("submissions mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }
}
