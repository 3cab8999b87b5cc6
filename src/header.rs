use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::document::FormatError;
use crate::records::{CAR_RECORD_SIZE, INSTANCE_RECORD_SIZE};

pub const MAGIC: &[u8; 4] = b"bnry";
pub const HEADER_FIELD_COUNT: usize = 18;
/// Magic tag plus the 18 u32 fields.
pub const HEADER_SIZE: usize = 4 + HEADER_FIELD_COUNT * 4;

pub const FIELD_INSTANCE_COUNT: usize = 0;
pub const FIELD_CAR_COUNT: usize = 4;
pub const FIELD_INSTANCE_OFFSET: usize = 6;
pub const FIELD_CAR_OFFSET: usize = 14;

/// The 18-field section table following the magic tag.
///
/// Only four slots carry meaning for the compact layout; everything else is
/// reserved and must stay zero for a file to be rewritable (see `classify`).
/// Fields are kept as the raw array so a decoded header round-trips exactly
/// what was on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub fields: [u32; HEADER_FIELD_COUNT],
}

impl Header {
    /// Canonical compact header: instances directly after the header, cars
    /// directly after the instances, zero offsets for zero counts, every
    /// reserved field zero.
    pub fn compact_for(instance_count: usize, car_count: usize) -> Self {
        let mut fields = [0u32; HEADER_FIELD_COUNT];
        fields[FIELD_INSTANCE_COUNT] = instance_count as u32;
        fields[FIELD_CAR_COUNT] = car_count as u32;
        if instance_count > 0 {
            fields[FIELD_INSTANCE_OFFSET] = HEADER_SIZE as u32;
        }
        if car_count > 0 {
            fields[FIELD_CAR_OFFSET] = (HEADER_SIZE + instance_count * INSTANCE_RECORD_SIZE) as u32;
        }
        Self { fields }
    }

    pub fn instance_count(&self) -> u32 {
        self.fields[FIELD_INSTANCE_COUNT]
    }

    pub fn car_count(&self) -> u32 {
        self.fields[FIELD_CAR_COUNT]
    }

    pub fn instance_offset(&self) -> u32 {
        self.fields[FIELD_INSTANCE_OFFSET]
    }

    pub fn car_offset(&self) -> u32 {
        self.fields[FIELD_CAR_OFFSET]
    }

    /// Field by index; out-of-range reads as zero.
    pub fn field(&self, index: usize) -> u32 {
        self.fields.get(index).copied().unwrap_or(0)
    }

    pub fn read<R: Read>(mut reader: R) -> Result<Self, FormatError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(eof_is_truncation)?;
        if &magic != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let mut fields = [0u32; HEADER_FIELD_COUNT];
        for field in &mut fields {
            *field = reader
                .read_u32::<LittleEndian>()
                .map_err(eof_is_truncation)?;
        }
        Ok(Self { fields })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(MAGIC)?;
        for field in &self.fields {
            writer.write_u32::<LittleEndian>(*field)?;
        }
        Ok(())
    }

    /// Encoded byte length of a compact file with these counts.
    pub fn compact_len(instance_count: usize, car_count: usize) -> usize {
        HEADER_SIZE + instance_count * INSTANCE_RECORD_SIZE + car_count * CAR_RECORD_SIZE
    }
}

fn eof_is_truncation(e: io::Error) -> FormatError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::HeaderTruncated
    } else {
        FormatError::Io(e)
    }
}
