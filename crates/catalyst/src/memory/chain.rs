//! Multi-level pointer chains ("deep pointers").
//!
//! A chain starts at a base (a module's load address or an absolute address),
//! adds the first offset, and then for every following offset dereferences the
//! current address as a pointer before adding the offset:
//!
//! ```text
//! module+0x2578A68, [0x70, 0x98, 0x22D0]
//!   => *(*(module + 0x2578A68) + 0x70) + 0x98 ... + 0x22D0
//! ```
//!
//! The last offset is never dereferenced. Chains are resolved fresh on every
//! access because the intermediate objects move as the game allocates and
//! frees them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::memory::{ModuleLookup, ReadMemory};

/// Where a chain starts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseAddress {
    /// Load address of a module, looked up at resolve time
    Module(String),
    /// Fixed address in the target
    Absolute(u64),
}

impl BaseAddress {
    fn resolve<M: ModuleLookup>(&self, memory: &M) -> Result<u64> {
        match self {
            BaseAddress::Module(name) => memory.module_base(name),
            BaseAddress::Absolute(address) => Ok(*address),
        }
    }
}

/// One step of a traced resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveStep {
    /// Address the pointer was read from (`None` for the first step)
    pub read_from: Option<u64>,
    /// Pointer value read (`None` for the first step)
    pub pointer: Option<u64>,
    pub offset: i64,
    /// Address after applying the offset
    pub address: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PointerChain {
    base: BaseAddress,
    offsets: Vec<i64>,
}

impl PointerChain {
    pub fn new(base: BaseAddress, offsets: impl Into<Vec<i64>>) -> Self {
        Self {
            base,
            offsets: offsets.into(),
        }
    }

    /// Chain rooted at a module's load address
    pub fn module(name: impl Into<String>, offsets: impl Into<Vec<i64>>) -> Self {
        Self::new(BaseAddress::Module(name.into()), offsets)
    }

    /// Chain rooted at an absolute address
    pub fn absolute(address: u64, offsets: impl Into<Vec<i64>>) -> Self {
        Self::new(BaseAddress::Absolute(address), offsets)
    }

    pub fn base(&self) -> &BaseAddress {
        &self.base
    }

    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    /// Number of pointer reads a resolution performs
    pub fn depth(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Same chain with one more field offset applied to the final address
    /// (the current last offset becomes a dereference step)
    pub fn then(&self, offset: i64) -> Self {
        let mut offsets = self.offsets.clone();
        offsets.push(offset);
        Self::new(self.base.clone(), offsets)
    }

    /// Same chain with its last offset replaced
    pub fn with_field(&self, offset: i64) -> Self {
        let mut offsets = self.offsets.clone();
        match offsets.last_mut() {
            Some(last) => *last = offset,
            None => offsets.push(offset),
        }
        Self::new(self.base.clone(), offsets)
    }

    /// Walk the chain and return the final (dynamic) address.
    ///
    /// Resolution is optimistic: a null intermediate pointer is not an error
    /// here, the walk just continues from 0 and the fault shows up when the
    /// final address is read or written.
    pub fn resolve<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<u64> {
        let base = self.base.resolve(memory)?;

        let Some((first, rest)) = self.offsets.split_first() else {
            return Ok(base);
        };

        let mut address = base.wrapping_add_signed(*first);
        for offset in rest {
            let pointer = memory.read_pointer(address)?;
            if pointer == 0 {
                trace!("Null pointer at {:#x} while resolving {}", address, self);
            }
            address = pointer.wrapping_add_signed(*offset);
        }

        Ok(address)
    }

    /// Like [`resolve`](Self::resolve), recording every intermediate address
    pub fn trace<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<Vec<ResolveStep>> {
        let base = self.base.resolve(memory)?;
        let mut steps = Vec::with_capacity(self.offsets.len());

        let Some((first, rest)) = self.offsets.split_first() else {
            return Ok(steps);
        };

        let mut address = base.wrapping_add_signed(*first);
        steps.push(ResolveStep {
            read_from: None,
            pointer: None,
            offset: *first,
            address,
        });

        for offset in rest {
            let pointer = memory.read_pointer(address)?;
            let next = pointer.wrapping_add_signed(*offset);
            steps.push(ResolveStep {
                read_from: Some(address),
                pointer: Some(pointer),
                offset: *offset,
                address: next,
            });
            address = next;
        }

        Ok(steps)
    }
}

fn format_offset(offset: i64) -> String {
    if offset < 0 {
        format!("-0x{:X}", offset.unsigned_abs())
    } else {
        format!("0x{:X}", offset)
    }
}

fn parse_offset(text: &str) -> Result<i64> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, text.strip_prefix('+').unwrap_or(text).trim()),
    };

    let magnitude = match body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => body.parse::<i64>(),
    }
    .map_err(|e| Error::InvalidChain(format!("bad offset '{}': {}", text, e)))?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// `<module>:<offset>,<offset>,...` or `0x<address>:<offset>,...`
impl fmt::Display for PointerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseAddress::Module(name) => write!(f, "{}", name)?,
            BaseAddress::Absolute(address) => write!(f, "0x{:X}", address)?,
        }
        f.write_str(":")?;
        let offsets: Vec<String> = self.offsets.iter().map(|o| format_offset(*o)).collect();
        f.write_str(&offsets.join(","))
    }
}

impl FromStr for PointerChain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (base, offsets) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidChain(format!("missing ':' in '{}'", s)))?;

        let base = base.trim();
        if base.is_empty() {
            return Err(Error::InvalidChain(format!("missing base in '{}'", s)));
        }

        let base = match base.strip_prefix("0x").or_else(|| base.strip_prefix("0X")) {
            Some(hex) => BaseAddress::Absolute(
                u64::from_str_radix(hex, 16)
                    .map_err(|e| Error::InvalidChain(format!("bad base '{}': {}", base, e)))?,
            ),
            None => BaseAddress::Module(base.to_string()),
        };

        let offsets = if offsets.trim().is_empty() {
            Vec::new()
        } else {
            offsets
                .split(',')
                .map(parse_offset)
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self::new(base, offsets))
    }
}

impl TryFrom<String> for PointerChain {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PointerChain> for String {
    fn from(chain: PointerChain) -> Self {
        chain.to_string()
    }
}
