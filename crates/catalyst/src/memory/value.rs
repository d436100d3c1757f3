//! Dynamically typed values for command line reads and writes.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{Error, Result};
use crate::game::Vec3;
use crate::memory::{ModuleLookup, PointerChain, ReadMemory, WriteMemory, write_at_chain};

/// Value types that can be read from or written to a chain
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ValueKind {
    U8,
    #[default]
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Vec3,
}

impl ValueKind {
    /// Size in bytes of the remote representation
    pub fn size(self) -> usize {
        match self {
            ValueKind::U8 => 1,
            ValueKind::I32 | ValueKind::U32 | ValueKind::F32 => 4,
            ValueKind::I64 | ValueKind::U64 | ValueKind::F64 => 8,
            ValueKind::Vec3 => std::mem::size_of::<Vec3>(),
        }
    }

    pub fn read_at<M: ReadMemory>(self, memory: &M, address: u64) -> Result<Value> {
        Ok(match self {
            ValueKind::U8 => Value::U8(memory.read_value(address)?),
            ValueKind::I32 => Value::I32(memory.read_value(address)?),
            ValueKind::U32 => Value::U32(memory.read_value(address)?),
            ValueKind::I64 => Value::I64(memory.read_value(address)?),
            ValueKind::U64 => Value::U64(memory.read_value(address)?),
            ValueKind::F32 => Value::F32(memory.read_value(address)?),
            ValueKind::F64 => Value::F64(memory.read_value(address)?),
            ValueKind::Vec3 => Value::Vec3(memory.read_value(address)?),
        })
    }

    pub fn read_chain<M: ReadMemory + ModuleLookup>(
        self,
        memory: &M,
        chain: &PointerChain,
    ) -> Result<Value> {
        let address = chain.resolve(memory)?;
        self.read_at(memory, address)
    }

    /// Parse user text into a value of this kind.
    ///
    /// Integers accept a `0x` prefix; `vec3` takes three comma separated floats.
    pub fn parse(self, text: &str) -> Result<Value> {
        let text = text.trim();
        let invalid = |e: &dyn fmt::Display| {
            Error::InvalidValue(format!("'{}' is not a valid {}: {}", text, self, e))
        };

        Ok(match self {
            ValueKind::U8 => Value::U8(parse_int(text).map_err(|e| invalid(&e))?),
            ValueKind::I32 => Value::I32(parse_int(text).map_err(|e| invalid(&e))?),
            ValueKind::U32 => Value::U32(parse_int(text).map_err(|e| invalid(&e))?),
            ValueKind::I64 => Value::I64(parse_int(text).map_err(|e| invalid(&e))?),
            ValueKind::U64 => Value::U64(parse_int(text).map_err(|e| invalid(&e))?),
            ValueKind::F32 => Value::F32(text.parse().map_err(|e| invalid(&e))?),
            ValueKind::F64 => Value::F64(text.parse().map_err(|e| invalid(&e))?),
            ValueKind::Vec3 => {
                let parts = text
                    .split(',')
                    .map(|p| p.trim().parse::<f32>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| invalid(&e))?;
                match parts.as_slice() {
                    [x, y, z] => Value::Vec3(Vec3::new(*x, *y, *z)),
                    _ => return Err(invalid(&"expected x,y,z")),
                }
            }
        })
    }
}

fn parse_int<T>(text: &str) -> std::result::Result<T, String>
where
    T: TryFrom<i128>,
{
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => body.parse::<i128>(),
    }
    .map_err(|e| e.to_string())?;

    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| "out of range".to_string())
}

/// A value read from or destined for the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    U8(u8),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Vec3(Vec3),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::U8(_) => ValueKind::U8,
            Value::I32(_) => ValueKind::I32,
            Value::U32(_) => ValueKind::U32,
            Value::I64(_) => ValueKind::I64,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Vec3(_) => ValueKind::Vec3,
        }
    }

    pub fn write_at<M: WriteMemory>(&self, memory: &M, address: u64) -> Result<()> {
        match *self {
            Value::U8(v) => memory.write_value(address, v),
            Value::I32(v) => memory.write_value(address, v),
            Value::U32(v) => memory.write_value(address, v),
            Value::I64(v) => memory.write_value(address, v),
            Value::U64(v) => memory.write_value(address, v),
            Value::F32(v) => memory.write_value(address, v),
            Value::F64(v) => memory.write_value(address, v),
            Value::Vec3(v) => memory.write_value(address, v),
        }
    }

    pub fn write_chain<M: ReadMemory + WriteMemory + ModuleLookup>(
        &self,
        memory: &M,
        chain: &PointerChain,
    ) -> Result<()> {
        match *self {
            Value::U8(v) => write_at_chain(memory, chain, v),
            Value::I32(v) => write_at_chain(memory, chain, v),
            Value::U32(v) => write_at_chain(memory, chain, v),
            Value::I64(v) => write_at_chain(memory, chain, v),
            Value::U64(v) => write_at_chain(memory, chain, v),
            Value::F32(v) => write_at_chain(memory, chain, v),
            Value::F64(v) => write_at_chain(memory, chain, v),
            Value::Vec3(v) => write_at_chain(memory, chain, v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{} (0x{:02X})", v, v),
            Value::I32(v) => write!(f, "{} (0x{:08X})", v, *v as u32),
            Value::U32(v) => write!(f, "{} (0x{:08X})", v, v),
            Value::I64(v) => write!(f, "{} (0x{:016X})", v, *v as u64),
            Value::U64(v) => write!(f, "{} (0x{:016X})", v, v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Vec3(v) => write!(f, "{}", v),
        }
    }
}
