use std::env;

use crate::error::{GcError, Result};
use crate::header::HEADER_SIZE;
use crate::{ceil_to, WORD_SIZE};

/// Bytes per semi-space, unless configured otherwise. The process uses
/// twice this much.
pub const DEFAULT_HEAP_SIZE: usize = 1 << 20;

/// A space has to hold at least a handful of headers to be useful.
pub const MIN_HEAP_SIZE: usize = 16 * HEADER_SIZE;

pub const HEAP_SIZE_VAR: &str = "TWOSPACE_HEAP_SIZE";


#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GcConfig {
    /// capacity of each semi-space, in bytes
    pub heap_size: usize,
}

impl Default for GcConfig {
    fn default() -> GcConfig {
        GcConfig { heap_size: DEFAULT_HEAP_SIZE }
    }
}

impl GcConfig {
    pub fn with_heap_size(heap_size: usize) -> Result<GcConfig> {
        if heap_size < MIN_HEAP_SIZE {
            return Err(GcError::InvalidHeapSize(format!("{} is below the minimum of {}", heap_size, MIN_HEAP_SIZE)));
        }
        Ok(GcConfig { heap_size: ceil_to(heap_size, WORD_SIZE) })
    }

    /// Read the heap size from `TWOSPACE_HEAP_SIZE`, falling back to the
    /// default when it isn't set.
    pub fn from_env() -> Result<GcConfig> {
        match env::var(HEAP_SIZE_VAR) {
            Ok(s) => GcConfig::with_heap_size(parse_size(&s)?),
            Err(env::VarError::NotPresent) => Ok(GcConfig::default()),
            Err(e) => Err(GcError::InvalidHeapSize(e.to_string())),
        }
    }
}

/// "65536", "64k", "1m"
pub fn parse_size(s: &str) -> Result<usize> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    let (digits, scale) = if let Some(d) = lower.strip_suffix('k') {
        (d, 1 << 10)
    } else if let Some(d) = lower.strip_suffix('m') {
        (d, 1 << 20)
    } else {
        (lower.as_str(), 1)
    };
    digits.trim().parse::<usize>().ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(|| GcError::InvalidHeapSize(format!("{:?}", s)))
}
