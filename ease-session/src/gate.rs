//! Latest-request-wins gating for asynchronous results.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    latest: u64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    /// True only for the most recently issued id.
    pub fn accept(&self, id: RequestId) -> bool {
        id.0 == self.latest
    }
}
