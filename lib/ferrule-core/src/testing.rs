use std::sync::{Arc, Mutex};

use crate::{BoxFuture, Reply, Result, Transport, TransportCall};

/// Answers every call with JSON `null`.
#[derive(Debug, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn request(&self, _call: TransportCall) -> BoxFuture<'_, Result<Reply>> {
        Box::pin(async { Ok(Reply::Value(serde_json::Value::Null)) })
    }
}

/// Records every call and answers with JSON `null`.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl RecordingTransport {
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Transport for RecordingTransport {
    fn request(&self, call: TransportCall) -> BoxFuture<'_, Result<Reply>> {
        self.calls.lock().expect("calls lock").push(call);
        Box::pin(async { Ok(Reply::Value(serde_json::Value::Null)) })
    }
}
