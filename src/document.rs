//! Whole-file decode and canonical re-encode.
//!
//! # Decode
//! [`IplFile::decode`] parses the magic tag, the 18-field header and both
//! record arrays from a byte slice.  Array offsets are honoured exactly as
//! stored; nothing is recomputed or repaired on the way in, so a decoded
//! file still carries whatever reserved-field values the original had
//! (which is what `classify` inspects).
//!
//! # Encode
//! [`IplFile::encode_compact`] is the single encoding path.  It always emits
//! the canonical compact layout: header first, instance array immediately
//! after it, car array immediately after that, zero offsets for empty
//! arrays, every reserved field zero.  Running a compact file through
//! decode + encode_compact a second time is a byte-for-byte no-op.
//!
//! # Endianness
//! All binary I/O is strictly little-endian; see `header.rs` and
//! `records.rs` for field-level layout.

use std::io::{self, Cursor, Write};
use thiserror::Error;

use crate::classify::{classify, Classification};
use crate::header::Header;
use crate::records::{InstanceRecord, VehicleSpawnRecord, CAR_RECORD_SIZE, INSTANCE_RECORD_SIZE};

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("bad magic tag")]
    BadMagic,
    #[error("header truncated")]
    HeaderTruncated,
    #[error("section offset outside the file")]
    OffsetOutOfBounds,
    #[error("entry {0} truncated")]
    EntryTruncated(usize),
    #[error("extended layout with unmodelled sections")]
    ExtendedFormat,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A fully decoded placement file.
///
/// The header is kept exactly as read so classification sees the original
/// reserved fields; the canonical header for writing is derived from the
/// record vectors, never from `header`.
#[derive(Debug, Clone, PartialEq)]
pub struct IplFile {
    pub header: Header,
    pub instances: Vec<InstanceRecord>,
    pub cars: Vec<VehicleSpawnRecord>,
}

impl IplFile {
    /// Build a file from records alone, with a canonical compact header.
    pub fn from_records(instances: Vec<InstanceRecord>, cars: Vec<VehicleSpawnRecord>) -> Self {
        let header = Header::compact_for(instances.len(), cars.len());
        Self { header, instances, cars }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let header = Header::read(Cursor::new(bytes))?;

        let instances = read_array(bytes, header.instance_count(), header.instance_offset(), INSTANCE_RECORD_SIZE, |slice| {
            InstanceRecord::read(Cursor::new(slice))
        })?;
        let cars = read_array(bytes, header.car_count(), header.car_offset(), CAR_RECORD_SIZE, |slice| {
            VehicleSpawnRecord::read(Cursor::new(slice))
        })?;

        Ok(Self { header, instances, cars })
    }

    pub fn classification(&self) -> Classification {
        classify(&self.header)
    }

    pub fn encode_compact(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(Header::compact_len(self.instances.len(), self.cars.len()));
        self.write_compact(&mut out)?;
        Ok(out)
    }

    pub fn write_compact<W: Write>(&self, mut writer: W) -> io::Result<()> {
        Header::compact_for(self.instances.len(), self.cars.len()).write(&mut writer)?;
        for inst in &self.instances {
            inst.write(&mut writer)?;
        }
        for car in &self.cars {
            car.write(&mut writer)?;
        }
        Ok(())
    }
}

/// Read `count` fixed-size records starting at `offset`, as stored.
///
/// An offset pointing past end-of-file is `OffsetOutOfBounds`; an array that
/// starts inside the file but runs past the end reports the first
/// overrunning entry as `EntryTruncated`.
fn read_array<T>(
    bytes: &[u8],
    count: u32,
    offset: u32,
    record_size: usize,
    read_one: impl Fn(&[u8]) -> io::Result<T>,
) -> Result<Vec<T>, FormatError> {
    let count = count as usize;
    if count == 0 {
        return Ok(Vec::new());
    }
    let offset = offset as usize;
    if offset > bytes.len() {
        return Err(FormatError::OffsetOutOfBounds);
    }

    // A hostile count must not drive the allocation; the buffer bounds it.
    let available = (bytes.len() - offset) / record_size;
    let mut records = Vec::with_capacity(count.min(available));
    for index in 0..count {
        let start = offset
            .checked_add(index.checked_mul(record_size).ok_or(FormatError::OffsetOutOfBounds)?)
            .ok_or(FormatError::OffsetOutOfBounds)?;
        let end = start.checked_add(record_size).ok_or(FormatError::OffsetOutOfBounds)?;
        if end > bytes.len() {
            return Err(FormatError::EntryTruncated(index));
        }
        records.push(read_one(&bytes[start..end])?);
    }
    Ok(records)
}
