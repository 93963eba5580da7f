use nom::{
    bytes::complete::take_while1,
    character::complete::{i32, i64, space0, space1},
    number::complete::double,
    sequence::preceded,
    IResult,
};

use crate::four_vector::{is_valid_component, MAX_COMPONENT};

pub(crate) fn double_entry(line: &str) -> IResult<&str, f64> {
    preceded(space1, double)(line)
}

pub(crate) fn any_entry(line: &str) -> IResult<&str, &str> {
    preceded(space1, non_space)(line)
}

pub(crate) fn i64_entry(line: &str) -> IResult<&str, i64> {
    preceded(space1, i64)(line)
}

pub(crate) fn i32_entry(line: &str) -> IResult<&str, i32> {
    preceded(space1, i32)(line)
}

/// Leading integer, possibly after whitespace
pub(crate) fn first_i32(line: &str) -> IResult<&str, i32> {
    preceded(space0, i32)(line)
}

pub(crate) fn non_space(line: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(line)
}

/// Four-momentum entries in the order px, py, pz, E
pub(crate) fn momentum_entries(line: &str) -> IResult<&str, [f64; 4]> {
    let (rest, px) = double_entry(line)?;
    let (rest, py) = double_entry(rest)?;
    let (rest, pz) = double_entry(rest)?;
    let (rest, e) = double_entry(rest)?;
    Ok((rest, [px, py, pz, e]))
}

/// Error in a single record line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Failed to parse record: {0}")]
    ParseError(String),
    #[error("Momentum component not finite or larger than {:e}", MAX_COMPONENT)]
    InvalidMomentum,
    #[error("Particle record outside of any event")]
    OutsideEvent,
}

impl From<nom::Err<nom::error::Error<&str>>> for RecordError {
    fn from(source: nom::Err<nom::error::Error<&str>>) -> Self {
        RecordError::ParseError(source.to_string())
    }
}

pub(crate) fn check_momentum(p: [f64; 4]) -> Result<[f64; 4], RecordError> {
    if p.iter().all(|&p| is_valid_component(p)) {
        Ok(p)
    } else {
        Err(RecordError::InvalidMomentum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries() {
        let (rest, id) = first_i32("  -11 1 0").unwrap();
        assert_eq!(id, -11);
        let (rest, status) = i32_entry(rest).unwrap();
        assert_eq!(status, 1);
        let (rest, skipped) = any_entry(rest).unwrap();
        assert_eq!(skipped, "0");
        assert!(rest.is_empty());

        let (_, p) = momentum_entries(" 1.5 -2e1 0 3.25E+01 0.0").unwrap();
        assert_eq!(p, [1.5, -20., 0., 32.5]);
        assert!(momentum_entries(" 1.5 -2e1 0").is_err());
        assert_eq!(
            check_momentum([1., f64::NAN, 0., 0.]),
            Err(RecordError::InvalidMomentum)
        );
        assert_eq!(
            check_momentum([1e200, 1e200, 1e200, 1e200]),
            Err(RecordError::InvalidMomentum)
        );
        assert_eq!(
            check_momentum([-MAX_COMPONENT, 0., 0., MAX_COMPONENT]),
            Ok([-MAX_COMPONENT, 0., 0., MAX_COMPONENT])
        );
    }
}
