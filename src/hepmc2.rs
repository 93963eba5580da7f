use std::io::BufRead;

use log::debug;
use nom::IResult;

use crate::{
    parser::{EventCollector, Flow, ParsedEvents},
    parsing::{
        any_entry, check_momentum, i32_entry, i64_entry, momentum_entries,
        non_space, RecordError,
    },
    traits::ParseEvents,
};

/// Parser for HepMC2 event files, also known as `IO_GenEvent`
///
/// Each `E` line starts a new event and each `P` line adds a particle to
/// it. All other lines are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HepMC2Parser {
    /// Stop after this many complete events
    pub max_events: Option<usize>,
}

impl HepMC2Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_events(max_events: Option<usize>) -> Self {
        Self { max_events }
    }
}

impl ParseEvents for HepMC2Parser {
    type Output = ParsedEvents;
    type Error = std::io::Error;

    fn parse_events<B: BufRead>(
        &self,
        mut reader: B,
    ) -> Result<ParsedEvents, Self::Error> {
        let mut collector = EventCollector::new(self.max_events);
        let mut line = String::new();
        while collector.next_line(&mut reader, &mut line)? {
            let Ok((rest, tag)) = non_space(line.trim_start()) else {
                continue;
            };
            match tag {
                "E" => {
                    if collector.open() == Flow::Stop {
                        break;
                    }
                    match i64_entry(rest) {
                        Ok((_, num)) => debug!("Reading event {num}"),
                        Err(_) => debug!("Reading event without number"),
                    }
                }
                "P" => {
                    let res = parse_particle_line(rest)
                        .map_err(RecordError::from)
                        .and_then(|(_, (id, status, p))| {
                            collector.add(id, status, check_momentum(p)?)
                        });
                    if let Err(err) = res {
                        collector.malformed(line.trim_end(), err);
                    }
                }
                _ => {}
            }
        }
        Ok(collector.finish(true))
    }
}

/// Parse the entries after the `P` tag
///
/// The layout is `barcode pdg_id px py pz E m status ...`.
fn parse_particle_line(line: &str) -> IResult<&str, (i32, i32, [f64; 4])> {
    let (rest, _barcode) = any_entry(line)?;
    let (rest, id) = i32_entry(rest)?;
    let (rest, p) = momentum_entries(rest)?;
    let (rest, _m) = any_entry(rest)?;
    let (rest, status) = i32_entry(rest)?;
    Ok((rest, (id, status, p)))
}
