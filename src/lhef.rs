use std::io::BufRead;

use log::{debug, warn};
use nom::{multi::count, IResult};

use crate::{
    parser::{EventCollector, Flow, ParsedEvents},
    parsing::{
        any_entry, check_momentum, first_i32, i32_entry, momentum_entries,
        RecordError,
    },
    traits::ParseEvents,
};

/// Minimum number of fields in a particle line
const MIN_PARTICLE_FIELDS: usize = 10;

/// Parser for Les Houches Event Files
///
/// Only lines between `<event>` and `</event>` with at least ten fields
/// are read as particles. Everything else, including the event header
/// line and any XML content inside the event block, is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LHEFParser {
    /// Stop after this many complete events
    pub max_events: Option<usize>,
}

impl LHEFParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_events(max_events: Option<usize>) -> Self {
        Self { max_events }
    }
}

fn is_event_start(line: &str) -> bool {
    line.strip_prefix("<event").is_some_and(|rest| {
        rest.starts_with('>') || rest.starts_with(|c: char| c.is_ascii_whitespace())
    })
}

fn is_event_end(line: &str) -> bool {
    line.starts_with("</event>")
}

impl ParseEvents for LHEFParser {
    type Output = ParsedEvents;
    type Error = std::io::Error;

    fn parse_events<B: BufRead>(
        &self,
        mut reader: B,
    ) -> Result<ParsedEvents, Self::Error> {
        let mut collector = EventCollector::new(self.max_events);
        let mut line = String::new();
        let mut nevent = 0;
        while collector.next_line(&mut reader, &mut line)? {
            let record = line.trim();
            if is_event_start(record) {
                if collector.is_open() {
                    warn!("New event starts before end of event {nevent}, discarding its particles");
                    collector.discard();
                    continue;
                }
                if collector.open() == Flow::Stop {
                    break;
                }
                debug!("Reading event {nevent}");
                nevent += 1;
            } else if is_event_end(record) {
                if !collector.is_open() {
                    debug!("Ignoring unmatched </event>");
                    continue;
                }
                if collector.close() == Flow::Stop {
                    break;
                }
            } else if collector.is_open() {
                if record.is_empty() || record.starts_with('#') {
                    continue;
                }
                if record.split_ascii_whitespace().count() < MIN_PARTICLE_FIELDS {
                    continue;
                }
                let res = parse_particle_line(record)
                    .map_err(RecordError::from)
                    .and_then(|(_, (id, status, p))| {
                        collector.add(id, status, check_momentum(p)?)
                    });
                if let Err(err) = res {
                    collector.malformed(record, err);
                }
            }
        }
        Ok(collector.finish(false))
    }
}

/// Parse a particle line
///
/// The layout is
/// `pdg_id status mother1 mother2 colour1 colour2 px py pz E m lifetime spin`.
fn parse_particle_line(line: &str) -> IResult<&str, (i32, i32, [f64; 4])> {
    let (rest, id) = first_i32(line)?;
    let (rest, status) = i32_entry(rest)?;
    // ignore decay parents & colour
    let (rest, _) = count(any_entry, 4)(rest)?;
    let (rest, p) = momentum_entries(rest)?;
    Ok((rest, (id, status, p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Field, Values};

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const INPUT: &str = r#"<LesHouchesEvents version="3.0">
<header>
<!-- 1 2 3 4 5 6 7 8 9 10 11 -->
</header>
<init>
2212 2212 6.5e3 6.5e3 0 0 247000 247000 -4 1
1.0 0.0 1.0 1
</init>
<event>
 4 1 +1.0e+00 9.1e+01 7.8e-03 1.1e-01
       -1 -1    0    0    0  501 +0.0e+00 +0.0e+00 +1.0e+02 1.0e+02 0.0e+00 0.0e+00 1.0e+00
        1 -1    0    0  501    0 -0.0e+00 -0.0e+00 -5.0e+01 5.0e+01 0.0e+00 0.0e+00 -1.0e+00

# a comment 1 2 3 4 5 6 7 8 9 10
       11  1    1    2    0    0 +3.0e+01 +4.0e+01 +5.0e+01 7.0710678118654755e+01 0.0e+00 0.0e+00 1.0e+00
      -12  1    1    2    0    0 -3.0e+01 -4.0e+01 +0.0e+00 5.0e+01 0.0e+00 0.0e+00 -1.0e+00
<mgrwt>
<rscale>  0 0.91e+02 </rscale>
</mgrwt>
</event>
<event npLO=" -1 " npNLO=" 1 ">
 0 1 +1.0e+00 9.1e+01 7.8e-03 1.1e-01
</event>
<event>
 1 1 +1.0e+00 9.1e+01 7.8e-03 1.1e-01
       22  1    1    2    0    0 1 2 3 4 0 0 9
</event>
</LesHouchesEvents>
"#;

    #[test]
    fn read_events() {
        log_init();

        let parsed = LHEFParser::new().parse_events(INPUT.as_bytes()).unwrap();
        let store = parsed.events;
        assert_eq!(store.len(), 3);
        assert_eq!(store.n_particles(0).unwrap(), 4);
        assert_eq!(store.n_particles(1).unwrap(), 0);
        assert_eq!(store.n_particles(2).unwrap(), 1);
        assert_eq!(
            store.values(0, Field::PdgId).unwrap(),
            Values::Int(&[-1, 1, 11, -12])
        );
        assert_eq!(
            store.values(0, Field::Status).unwrap(),
            Values::Int(&[-1, -1, 1, 1])
        );
        assert_eq!(
            store.values(0, Field::Py).unwrap(),
            Values::Float(&[0., -0., 40., -40.])
        );
        assert_eq!(
            store.values(2, Field::E).unwrap(),
            Values::Float(&[4.])
        );
        assert_eq!(parsed.stats.malformed, 0);
    }

    #[test]
    fn max_events() {
        log_init();

        for (max, expected) in [(0, 0), (1, 1), (2, 2), (3, 3), (4, 3)] {
            let parser = LHEFParser::with_max_events(Some(max));
            let parsed = parser.parse_events(INPUT.as_bytes()).unwrap();
            assert_eq!(parsed.events.len(), expected);
        }
    }

    #[test]
    fn broken_blocks() {
        log_init();

        let input = "</event>
<event>
 11 1 0 0 0 0 1 2 3 4 0 0 0
<event>
 13 1 0 0 0 0 1 2 3 4 0 0 0
 13 1 0 0 0 0 1 2 x 4 0 0 0
</event>
<event>
 -13 1 0 0 0 0 1 2 3 4 0 0 0
";
        let parsed = LHEFParser::new().parse_events(input.as_bytes()).unwrap();
        assert_eq!(parsed.stats.malformed, 1);
        let store = parsed.events;
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.values(0, Field::PdgId).unwrap(),
            Values::Int(&[13])
        );
    }

    #[test]
    fn event_tags() {
        assert!(is_event_start("<event>"));
        assert!(is_event_start("<event id=\"3\">"));
        assert!(!is_event_start("<eventgroup>"));
        assert!(!is_event_start("</event>"));
        assert!(is_event_end("</event>"));
    }
}
