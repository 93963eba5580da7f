use std::io::BufRead;

/// Progress indicator
pub trait Progress {
    /// Advance by the given amount
    fn inc(&self, i: u64);

    /// Mark as finished
    fn finish(&self);
}

/// Line-oriented parser for generator event records
pub trait ParseEvents {
    type Output;
    type Error;

    /// Parse all events from the reader
    fn parse_events<B: BufRead>(
        &self,
        reader: B,
    ) -> Result<Self::Output, Self::Error>;
}
