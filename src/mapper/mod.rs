//! Mapping strategies with compile-time known variants
//!
//! All strategies are stored in an enum to avoid heap allocations.
//! Each strategy implements the `Mapper` trait.

mod ring;
mod segments;
mod top;

pub use ring::RingMapper;
pub use segments::SegmentsMapper;
pub use top::TopMapper;

use crate::LedStrip;
use crate::border::BorderSet;

const MAPPER_NAME_TOP: &str = "top";
const MAPPER_NAME_SEGMENTS: &str = "segments";
const MAPPER_NAME_RING: &str = "ring";

const MAPPER_ID_TOP: u8 = 0;
const MAPPER_ID_SEGMENTS: u8 = 1;
const MAPPER_ID_RING: u8 = 2;

pub trait Mapper {
    /// Sets if the strategy commits each pass with one explicit flush
    ///
    /// Strategies without it assume a strip that commits on write.
    const EXPLICIT_FLUSH: bool = false;

    /// Write one border set onto the strip
    fn apply<S: LedStrip>(&mut self, borders: &BorderSet, strip: &mut S);
}

/// Mapper slot - enum containing all mapping strategies
#[derive(Debug, Clone)]
pub enum MapperSlot {
    /// Top border only, one LED per pixel
    Top(TopMapper),
    /// All four borders at fixed consecutive offsets
    Segments(SegmentsMapper),
    /// All four borders behind a persistent wrap-around cursor
    Ring(RingMapper),
}

/// Known mapper ids that can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MapperId {
    Top = MAPPER_ID_TOP,
    Segments = MAPPER_ID_SEGMENTS,
    Ring = MAPPER_ID_RING,
}

impl Default for MapperSlot {
    fn default() -> Self {
        Self::Ring(RingMapper::new())
    }
}

impl MapperId {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            MAPPER_ID_TOP => Self::Top,
            MAPPER_ID_SEGMENTS => Self::Segments,
            MAPPER_ID_RING => Self::Ring,
            _ => return None,
        })
    }

    pub fn to_slot(self) -> MapperSlot {
        match self {
            Self::Top => MapperSlot::Top(TopMapper::new()),
            Self::Segments => MapperSlot::Segments(SegmentsMapper::new()),
            Self::Ring => MapperSlot::Ring(RingMapper::new()),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => MAPPER_NAME_TOP,
            Self::Segments => MAPPER_NAME_SEGMENTS,
            Self::Ring => MAPPER_NAME_RING,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            MAPPER_NAME_TOP => Some(Self::Top),
            MAPPER_NAME_SEGMENTS => Some(Self::Segments),
            MAPPER_NAME_RING => Some(Self::Ring),
            _ => None,
        }
    }
}

impl MapperSlot {
    /// Returns if the strategy ends each pass with an explicit flush
    ///
    /// Derived from each strategy's `Mapper::EXPLICIT_FLUSH` constant.
    /// The sampling loop flushes the strip after `apply` when set.
    pub fn flushes_strip(&self) -> bool {
        match self {
            Self::Top(_) => TopMapper::EXPLICIT_FLUSH,
            Self::Segments(_) => SegmentsMapper::EXPLICIT_FLUSH,
            Self::Ring(_) => RingMapper::EXPLICIT_FLUSH,
        }
    }

    /// Write the current border set through the strategy
    pub fn apply<S: LedStrip>(&mut self, borders: &BorderSet, strip: &mut S) {
        match self {
            Self::Top(mapper) => mapper.apply(borders, strip),
            Self::Segments(mapper) => mapper.apply(borders, strip),
            Self::Ring(mapper) => mapper.apply(borders, strip),
        }
    }

    /// Get the mapper ID for external observation
    pub fn id(&self) -> MapperId {
        match self {
            Self::Top(_) => MapperId::Top,
            Self::Segments(_) => MapperId::Segments,
            Self::Ring(_) => MapperId::Ring,
        }
    }
}
