//! Single-line text projection of the two record kinds.
//!
//! Instance lines carry 9 whitespace-separated fields
//! (`obj_id posx posy posz rotx roty rotz rotw flags`); vehicle lines carry
//! 12 (`veh_id posx posy posz angle f1..f7`).  Floats render with six
//! fractional digits.  The instance `interior` field has no text form: it
//! parses back as 0, which is the defined manual-edit behaviour.

use thiserror::Error;

use crate::records::{InstanceRecord, VehicleSpawnRecord};

pub const INSTANCE_LINE_FIELDS: usize = 9;
pub const CAR_LINE_FIELDS: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextParseError {
    #[error("line {line}: expected {expected} fields, got {actual}")]
    WrongFieldCount {
        line: usize,
        expected: usize,
        actual: usize,
    },
    #[error("line {0}: invalid number")]
    InvalidNumber(usize),
}

pub fn instance_to_line(record: &InstanceRecord) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {}",
        record.obj_id,
        record.pos[0],
        record.pos[1],
        record.pos[2],
        record.rot[0],
        record.rot[1],
        record.rot[2],
        record.rot[3],
        record.flags,
    )
}

pub fn car_to_line(record: &VehicleSpawnRecord) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6} {} {} {} {} {} {} {}",
        record.vehicle_id,
        record.pos[0],
        record.pos[1],
        record.pos[2],
        record.angle,
        record.aux[0],
        record.aux[1],
        record.aux[2],
        record.aux[3],
        record.aux[4],
        record.aux[5],
        record.aux[6],
    )
}

/// Parse one instance line.  `line_no` is 1-based and only used in errors.
pub fn parse_instance_line(line: &str, line_no: usize) -> Result<InstanceRecord, TextParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != INSTANCE_LINE_FIELDS {
        return Err(TextParseError::WrongFieldCount {
            line: line_no,
            expected: INSTANCE_LINE_FIELDS,
            actual: tokens.len(),
        });
    }
    Ok(InstanceRecord {
        obj_id: parse_int(tokens[0], line_no)?,
        pos: [
            parse_float(tokens[1], line_no)?,
            parse_float(tokens[2], line_no)?,
            parse_float(tokens[3], line_no)?,
        ],
        rot: [
            parse_float(tokens[4], line_no)?,
            parse_float(tokens[5], line_no)?,
            parse_float(tokens[6], line_no)?,
            parse_float(tokens[7], line_no)?,
        ],
        flags: parse_flags(tokens[8], line_no)?,
        // Not representable in text; manual edits always reset it.
        interior: 0,
    })
}

/// Parse one vehicle line.  `line_no` is 1-based and only used in errors.
pub fn parse_car_line(line: &str, line_no: usize) -> Result<VehicleSpawnRecord, TextParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != CAR_LINE_FIELDS {
        return Err(TextParseError::WrongFieldCount {
            line: line_no,
            expected: CAR_LINE_FIELDS,
            actual: tokens.len(),
        });
    }
    let mut aux = [0i32; 7];
    for (slot, token) in aux.iter_mut().zip(&tokens[5..]) {
        *slot = parse_int(token, line_no)?;
    }
    Ok(VehicleSpawnRecord {
        vehicle_id: parse_int(tokens[0], line_no)?,
        pos: [
            parse_float(tokens[1], line_no)?,
            parse_float(tokens[2], line_no)?,
            parse_float(tokens[3], line_no)?,
        ],
        angle: parse_float(tokens[4], line_no)?,
        aux,
    })
}

fn parse_int(token: &str, line_no: usize) -> Result<i32, TextParseError> {
    token
        .parse()
        .map_err(|_| TextParseError::InvalidNumber(line_no))
}

fn parse_float(token: &str, line_no: usize) -> Result<f32, TextParseError> {
    token
        .parse()
        .map_err(|_| TextParseError::InvalidNumber(line_no))
}

fn parse_flags(token: &str, line_no: usize) -> Result<u32, TextParseError> {
    token
        .parse()
        .map_err(|_| TextParseError::InvalidNumber(line_no))
}
