//! A semi-space copying garbage collector for a small JS-like runtime.
//!
//! Two equal-sized [`Space`](struct.Space.html)s take turns: objects are
//! bump-allocated in the active space, and when it fills up, everything
//! reachable from the roots is copied into the standby space (Cheney's
//! breadth-first algorithm), and the two swap roles.

#[macro_use]
extern crate static_assertions;

pub mod collector;
pub mod config;
pub mod error;
pub mod function;
pub mod header;
pub mod kind;
pub mod memory;
pub mod object;
pub mod property;
pub mod record;
pub mod roots;
pub mod space;
pub mod string;
pub mod trace;
pub mod value;

pub use self::collector::{CollectionReport, Collector, GcStats};
pub use self::config::GcConfig;
pub use self::error::{GcError, Result};
pub use self::header::{GcHeader, GcRef, HEADER_SIZE};
pub use self::kind::Kind;
pub use self::memory::Memory;
pub use self::roots::RootRegistry;
pub use self::space::{Space, SpaceIterator};
pub use self::trace::{Relocate, Trace, TraceTable};
pub use self::value::Value;


/// Every allocation is rounded up to a multiple of the word size, so
/// headers (and the values in payloads) are always aligned.
pub const WORD_SIZE: usize = core::mem::size_of::<usize>();

const_assert!(WORD_SIZE >= 4);
const_assert!(HEADER_SIZE % WORD_SIZE == 0);


// odd that this isn't in the stdlib, but apparently neither is divmod!
fn div_ceil(numerator: usize, denominator: usize) -> usize {
    let floor = numerator / denominator;
    let rem = numerator % denominator;
    if rem == 0 { floor } else { floor + 1 }
}

fn floor_to(n: usize, chunk: usize) -> usize {
    n / chunk * chunk
}

fn ceil_to(n: usize, chunk: usize) -> usize {
    div_ceil(n, chunk) * chunk
}

fn checked_ceil_to(n: usize, chunk: usize) -> Option<usize> {
    n.checked_add(chunk - 1).map(|n| floor_to(n, chunk))
}

// a fixed prefix followed by `count` items, or `None` if that can't be
// addressed at all.
fn array_size(prefix: usize, count: usize, item: usize) -> Option<usize> {
    count.checked_mul(item)?.checked_add(prefix)
}


#[cfg(test)]
mod tests {
    use crate::{array_size, ceil_to, checked_ceil_to, floor_to, WORD_SIZE};

    #[test]
    fn rounding() {
        assert_eq!(ceil_to(0, WORD_SIZE), 0);
        assert_eq!(ceil_to(1, WORD_SIZE), WORD_SIZE);
        assert_eq!(ceil_to(WORD_SIZE, WORD_SIZE), WORD_SIZE);
        assert_eq!(floor_to(WORD_SIZE * 3 - 1, WORD_SIZE), WORD_SIZE * 2);
        assert_eq!(checked_ceil_to(1, WORD_SIZE), Some(WORD_SIZE));
        assert_eq!(checked_ceil_to(usize::MAX, WORD_SIZE), None);
    }

    #[test]
    fn array_sizes() {
        assert_eq!(array_size(8, 3, 16), Some(56));
        assert_eq!(array_size(8, 0, 16), Some(8));
        assert_eq!(array_size(8, usize::MAX / 8, 16), None);
        assert_eq!(array_size(16, usize::MAX / 16, 16), None);
    }
}
