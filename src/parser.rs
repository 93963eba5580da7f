use std::io::BufRead;

use log::{debug, info, trace, warn};

use crate::{event::EventBuffer, parsing::RecordError, store::EventStore};

const PROGRESS_INTERVAL: usize = 1000;

/// Outcome of reading an event file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvents {
    pub events: EventStore,
    pub stats: ParseStats,
}

/// Statistics collected while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines read
    pub lines: usize,
    /// Particle records stored
    pub particles: usize,
    /// Records that could not be parsed and were skipped
    pub malformed: usize,
    /// Whether the event limit was reached
    pub truncated: bool,
}

/// Whether to continue parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Accumulates parsed particles into complete events
///
/// At most one event is open at any time. Its buffer is moved into the
/// store when the event is closed, so an event limit never cuts an
/// event in half.
#[derive(Debug, Default)]
pub(crate) struct EventCollector {
    store: EventStore,
    current: Option<EventBuffer>,
    max_events: Option<usize>,
    stats: ParseStats,
}

impl EventCollector {
    pub(crate) fn new(max_events: Option<usize>) -> Self {
        Self {
            max_events,
            ..Default::default()
        }
    }

    fn limit_reached(&self) -> bool {
        self.max_events
            .map(|max| self.store.len() >= max)
            .unwrap_or(false)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Close the current event, if any, and open a new one
    pub(crate) fn open(&mut self) -> Flow {
        if self.close() == Flow::Stop {
            return Flow::Stop;
        }
        self.current = Some(EventBuffer::new());
        Flow::Continue
    }

    /// Close the current event, if any, and move it into the store
    pub(crate) fn close(&mut self) -> Flow {
        if let Some(event) = self.current.take() {
            self.stats.particles += event.len();
            self.store.push_event(event);
            let nevents = self.store.len();
            if nevents % PROGRESS_INTERVAL == 0 {
                info!("Processed {nevents} events");
            }
        }
        if self.limit_reached() {
            self.stats.truncated = true;
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    /// Throw away the particles of the current event
    pub(crate) fn discard(&mut self) {
        if let Some(event) = self.current.as_mut() {
            *event = EventBuffer::new();
        }
    }

    pub(crate) fn add(
        &mut self,
        pdg_id: i32,
        status: i32,
        p: [f64; 4],
    ) -> Result<(), RecordError> {
        let Some(event) = self.current.as_mut() else {
            return Err(RecordError::OutsideEvent);
        };
        trace!("particle {pdg_id} status {status} momentum {p:?}");
        event.add(pdg_id, status, p);
        Ok(())
    }

    pub(crate) fn malformed(&mut self, line: &str, err: RecordError) {
        self.stats.malformed += 1;
        debug!("Skipping line {}: {err}: {line}", self.stats.lines);
    }

    /// Read the next line into `buf`, returning `false` at the end of input
    pub(crate) fn next_line<B: BufRead>(
        &mut self,
        reader: &mut B,
        buf: &mut String,
    ) -> Result<bool, std::io::Error> {
        let mut bytes = Vec::new();
        if reader.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(false);
        }
        self.stats.lines += 1;
        buf.clear();
        buf.push_str(&String::from_utf8_lossy(&bytes));
        Ok(true)
    }

    /// Flush the open event and hand out the store
    ///
    /// With `flush_open` unset, an unfinished event is dropped instead.
    pub(crate) fn finish(mut self, flush_open: bool) -> ParsedEvents {
        if flush_open && !self.stats.truncated {
            self.close();
        } else if let Some(event) = self.current.take() {
            debug!("Dropping unfinished event with {} particles", event.len());
        }
        let stats = self.stats;
        if stats.malformed > 0 {
            warn!("Skipped {} malformed records", stats.malformed);
        }
        if self.store.is_empty() {
            warn!("No events found in input");
        } else {
            info!(
                "Read {} events with {} particles",
                self.store.len(),
                stats.particles
            );
        }
        ParsedEvents {
            events: self.store,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_on_boundary() {
        let mut collector = EventCollector::new(Some(2));
        assert_eq!(collector.open(), Flow::Continue);
        collector.add(11, 1, [1., 0., 0., 1.]).unwrap();
        assert_eq!(collector.open(), Flow::Continue);
        assert_eq!(collector.open(), Flow::Stop);
        let parsed = collector.finish(true);
        assert_eq!(parsed.events.len(), 2);
        assert!(parsed.stats.truncated);
        assert_eq!(parsed.stats.particles, 1);
    }

    #[test]
    fn outside_event() {
        let mut collector = EventCollector::new(None);
        assert_eq!(
            collector.add(11, 1, [1., 0., 0., 1.]),
            Err(RecordError::OutsideEvent)
        );
        assert!(!collector.is_open());
        let parsed = collector.finish(true);
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn zero_limit() {
        let mut collector = EventCollector::new(Some(0));
        assert_eq!(collector.open(), Flow::Stop);
        assert!(collector.finish(true).events.is_empty());
    }
}
