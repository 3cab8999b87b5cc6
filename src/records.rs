use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

pub const INSTANCE_RECORD_SIZE: usize = 40;
pub const CAR_RECORD_SIZE: usize = 48;

/// One placed-object entry: 7 floats, two signed ints, one flag word.
///
/// `interior` is carried in the binary form only; the text projection drops
/// it and manual rebuilds reset it to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceRecord {
    pub pos: [f32; 3],
    pub rot: [f32; 4],
    pub obj_id: i32,
    pub interior: i32,
    pub flags: u32,
}

impl InstanceRecord {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            pos: [
                reader.read_f32::<LittleEndian>()?,
                reader.read_f32::<LittleEndian>()?,
                reader.read_f32::<LittleEndian>()?,
            ],
            rot: [
                reader.read_f32::<LittleEndian>()?,
                reader.read_f32::<LittleEndian>()?,
                reader.read_f32::<LittleEndian>()?,
                reader.read_f32::<LittleEndian>()?,
            ],
            obj_id: reader.read_i32::<LittleEndian>()?,
            interior: reader.read_i32::<LittleEndian>()?,
            flags: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for p in &self.pos {
            writer.write_f32::<LittleEndian>(*p)?;
        }
        for r in &self.rot {
            writer.write_f32::<LittleEndian>(*r)?;
        }
        writer.write_i32::<LittleEndian>(self.obj_id)?;
        writer.write_i32::<LittleEndian>(self.interior)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        Ok(())
    }
}

/// One vehicle spawn point: position, heading angle, vehicle id and seven
/// auxiliary slots (colours and spawn rules, opaque to this tool).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSpawnRecord {
    pub pos: [f32; 3],
    pub angle: f32,
    pub vehicle_id: i32,
    pub aux: [i32; 7],
}

impl VehicleSpawnRecord {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            pos: [
                reader.read_f32::<LittleEndian>()?,
                reader.read_f32::<LittleEndian>()?,
                reader.read_f32::<LittleEndian>()?,
            ],
            angle: reader.read_f32::<LittleEndian>()?,
            vehicle_id: reader.read_i32::<LittleEndian>()?,
            aux: {
                let mut aux = [0i32; 7];
                for a in &mut aux {
                    *a = reader.read_i32::<LittleEndian>()?;
                }
                aux
            },
        })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for p in &self.pos {
            writer.write_f32::<LittleEndian>(*p)?;
        }
        writer.write_f32::<LittleEndian>(self.angle)?;
        writer.write_i32::<LittleEndian>(self.vehicle_id)?;
        for a in &self.aux {
            writer.write_i32::<LittleEndian>(*a)?;
        }
        Ok(())
    }
}
