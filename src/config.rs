use std::time::Duration;

/// Receive buffer large enough for any UDP datagram a server will send.
const PACKET_SIZE: usize = 64_000 + 32_000;
const CHALLENGE_COUNTER_MAX: usize = 10;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct QueryConfig {
    /// How long to wait for each datagram.
    pub timeout: Duration,
    pub max_packet_size: usize,
    /// How many times a request may be re-issued with a fresh challenge.
    pub max_challenge_hops: usize,
    /// Split replies omit the per-fragment size field and pack the fragment
    /// count and index into a single byte.
    pub pre_orange_box: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(4),
            max_packet_size: PACKET_SIZE,
            max_challenge_hops: CHALLENGE_COUNTER_MAX,
            pre_orange_box: false,
        }
    }
}

impl QueryConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_challenge_hops(mut self, hops: usize) -> Self {
        self.max_challenge_hops = hops;
        self
    }

    pub fn with_pre_orange_box(mut self, pre_orange_box: bool) -> Self {
        self.pre_orange_box = pre_orange_box;
        self
    }
}
