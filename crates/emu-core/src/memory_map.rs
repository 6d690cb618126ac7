//! Address decoding for a flat 16-bit address space.
//!
//! A `MemoryMap` owns a set of devices, each claiming an inclusive address
//! range. The builder refuses to produce a map with gaps or overlaps, so once
//! a map exists every address has exactly one owner and the CPU never sees an
//! unmapped access.

use std::fmt;
use std::ops::RangeInclusive;

use crate::Bus;

/// Highest number of devices a single map can hold (owner indices are `u8`).
pub const MAX_DEVICES: usize = 256;

/// A configuration error found while building a `MemoryMap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMappingFault {
    /// No device claims `start..=end`.
    Unmapped { start: u16, end: u16 },
    /// Two devices claim `address`.
    Overlap {
        address: u16,
        first: usize,
        second: usize,
    },
    /// A mapping was given a range whose start is above its end.
    EmptyRange { start: u16, end: u16 },
    /// More than `MAX_DEVICES` devices were mapped.
    TooManyDevices(usize),
}

impl fmt::Display for BusMappingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmapped { start, end } => {
                write!(f, "no device mapped at ${start:04X}-${end:04X}")
            }
            Self::Overlap {
                address,
                first,
                second,
            } => write!(
                f,
                "devices {first} and {second} both claim ${address:04X}"
            ),
            Self::EmptyRange { start, end } => {
                write!(f, "empty mapping range ${start:04X}-${end:04X}")
            }
            Self::TooManyDevices(count) => {
                write!(f, "{count} devices mapped (at most {MAX_DEVICES} allowed)")
            }
        }
    }
}

impl std::error::Error for BusMappingFault {}

struct Mapping {
    range: RangeInclusive<u16>,
    device: Box<dyn Bus>,
}

/// Collects device mappings; see [`MemoryMap::builder`].
#[derive(Default)]
pub struct MemoryMapBuilder {
    mappings: Vec<Mapping>,
}

impl MemoryMapBuilder {
    /// Give `device` ownership of `range`.
    ///
    /// Devices receive the full CPU address, not an offset into their range.
    #[must_use]
    pub fn map(mut self, range: RangeInclusive<u16>, device: impl Bus + 'static) -> Self {
        self.mappings.push(Mapping {
            range,
            device: Box::new(device),
        });
        self
    }

    /// Check coverage and produce the map.
    pub fn build(self) -> Result<MemoryMap, BusMappingFault> {
        if self.mappings.len() > MAX_DEVICES {
            return Err(BusMappingFault::TooManyDevices(self.mappings.len()));
        }

        let mut owners: Vec<Option<u8>> = vec![None; 0x10000];
        for (index, mapping) in self.mappings.iter().enumerate() {
            let (start, end) = (*mapping.range.start(), *mapping.range.end());
            if start > end {
                return Err(BusMappingFault::EmptyRange { start, end });
            }
            for address in mapping.range.clone() {
                let slot = &mut owners[address as usize];
                if let Some(first) = *slot {
                    return Err(BusMappingFault::Overlap {
                        address,
                        first: first as usize,
                        second: index,
                    });
                }
                *slot = Some(index as u8);
            }
        }

        if let Some(start) = owners.iter().position(Option::is_none) {
            let gap_len = owners[start..]
                .iter()
                .take_while(|owner| owner.is_none())
                .count();
            let end = start + gap_len - 1;
            return Err(BusMappingFault::Unmapped {
                start: start as u16,
                end: end as u16,
            });
        }

        let owners = owners.into_iter().flatten().collect();
        log::debug!("memory map built with {} devices", self.mappings.len());
        Ok(MemoryMap {
            owners,
            mappings: self.mappings,
        })
    }
}

/// A fully-decoded 64 KiB address space.
pub struct MemoryMap {
    /// Owning mapping index for each address.
    owners: Vec<u8>,
    mappings: Vec<Mapping>,
}

impl MemoryMap {
    #[must_use]
    pub fn builder() -> MemoryMapBuilder {
        MemoryMapBuilder::default()
    }

    /// Mapping index of the device that owns `address`.
    #[must_use]
    pub fn owner(&self, address: u16) -> usize {
        self.owners[address as usize] as usize
    }

    /// Address range claimed by the mapping at `index`.
    #[must_use]
    pub fn range(&self, index: usize) -> Option<RangeInclusive<u16>> {
        self.mappings.get(index).map(|m| m.range.clone())
    }

    /// Borrow the device at `index` (mapping order).
    pub fn device_mut(&mut self, index: usize) -> Option<&mut dyn Bus> {
        match self.mappings.get_mut(index) {
            Some(mapping) => Some(mapping.device.as_mut()),
            None => None,
        }
    }

    /// Number of mapped devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Bus for MemoryMap {
    fn read(&mut self, address: u16) -> u8 {
        let index = self.owner(address);
        self.mappings[index].device.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        let index = self.owner(address);
        self.mappings[index].device.write(address, value);
    }
}

/// RAM mirrored across its mapped window.
///
/// A 2 KiB block mapped at $0000-$1FFF answers $0800, $1000 and $1800 with
/// the same cell as $0000.
pub struct Ram {
    data: Vec<u8>,
    mask: usize,
}

impl Ram {
    /// Create zeroed RAM of `size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not a power of two.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size.is_power_of_two(), "RAM size must be a power of two");
        Self {
            data: vec![0; size],
            mask: size - 1,
        }
    }
}

impl Bus for Ram {
    fn read(&mut self, address: u16) -> u8 {
        self.data[address as usize & self.mask]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.data[address as usize & self.mask] = value;
    }
}

/// Read-only memory mirrored across its mapped window.
///
/// A 16 KiB PRG image based at $8000 and mapped to $8000-$FFFF appears twice,
/// so its last bytes answer the vectors at $FFFA-$FFFF. Writes are dropped.
pub struct Rom {
    base: u16,
    data: Vec<u8>,
}

impl Rom {
    /// Wrap `data`, with offset 0 appearing at `base`.
    #[must_use]
    pub fn new(base: u16, data: Vec<u8>) -> Self {
        Self { base, data }
    }
}

impl Bus for Rom {
    fn read(&mut self, address: u16) -> u8 {
        if self.data.is_empty() {
            return 0;
        }
        let offset = address.wrapping_sub(self.base) as usize;
        self.data[offset % self.data.len()]
    }

    fn write(&mut self, address: u16, value: u8) {
        log::trace!("write ${value:02X} to ROM at ${address:04X} ignored");
    }
}
