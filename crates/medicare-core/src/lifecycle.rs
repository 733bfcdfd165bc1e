//! Request lifecycle shared by every workflow
//!
//! At most one request is outstanding per lifecycle: `begin` refuses while
//! the status is `Pending`.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestLifecycle<R> {
    name: &'static str,
    status: Status,
    result: Option<R>,
}

impl<R> RequestLifecycle<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            status: Status::Idle,
            result: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    /// Move to `Pending`, dropping any previous result.
    /// Returns false (and changes nothing) if a request is already outstanding.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            debug!("{}: submission ignored, request in flight", self.name);
            return false;
        }
        self.result = None;
        self.transition(Status::Pending);
        true
    }

    pub fn succeed(&mut self, result: R) {
        self.result = Some(result);
        self.transition(Status::Succeeded);
    }

    pub fn fail(&mut self) {
        self.transition(Status::Failed);
    }

    /// Back to `Idle`, keeping whatever result is stored
    pub fn settle(&mut self) {
        self.transition(Status::Idle);
    }

    /// Back to `Idle` with no result
    pub fn reset(&mut self) {
        self.result = None;
        self.transition(Status::Idle);
    }

    fn transition(&mut self, to: Status) {
        debug!("{}: {:?} -> {:?}", self.name, self.status, to);
        self.status = to;
    }
}
