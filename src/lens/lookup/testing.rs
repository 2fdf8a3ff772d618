//! Scripted transport for offline lens tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;

use super::{HttpReply, LookupClient, Pacer, SourceRequest, Transport, TransportError};

/// Replays queued replies in order and records every request it receives
pub(crate) struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<HttpReply, TransportError>>>,
    requests: Rc<RefCell<Vec<SourceRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            replies: RefCell::new(VecDeque::new()),
            requests: Rc::new(RefCell::new(vec![])),
        }
    }

    pub(crate) fn reply(self, status: u16, body: impl Into<String>) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpReply::new(status, body)));
        self
    }

    pub(crate) fn json(self, status: u16, body: Value) -> Self {
        self.reply(status, body.to_string())
    }

    pub(crate) fn fail(self, error: TransportError) -> Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }

    /// Handle to the request log that stays valid after the transport is boxed
    pub(crate) fn request_log(&self) -> Rc<RefCell<Vec<SourceRequest>>> {
        Rc::clone(&self.requests)
    }

    pub(crate) fn into_client(self) -> LookupClient {
        LookupClient::new(Box::new(self), Pacer::disabled())
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, request: &SourceRequest) -> Result<HttpReply, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted reply".to_string())))
    }
}
