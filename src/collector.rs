use core::{fmt, mem};

use log::{debug, info, warn};

use crate::config::GcConfig;
use crate::error::{GcError, Result};
use crate::header::{GcRef, HEADER_SIZE};
use crate::kind::Kind;
use crate::memory::Memory;
use crate::roots::RootRegistry;
use crate::space::Space;
use crate::trace::{Trace, TraceTable};
use crate::value::Value;
use crate::{checked_ceil_to, WORD_SIZE};


/// Stats returned from [`Collector::stats`](struct.Collector.html#method.stats).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GcStats {
    /// bytes allocated in the active space right now
    pub used_bytes: usize,

    /// bytes left in the active space before the next collection
    pub remaining_bytes: usize,

    /// capacity of one space
    pub total_bytes: usize,

    /// completed collections, ever
    pub collections: usize,

    /// bytes freed by all collections so far
    pub bytes_reclaimed: usize,
}


/// What one collection did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionReport {
    /// root entries relocated (registered roots plus scratch)
    pub roots: usize,

    /// objects copied into the new active space
    pub objects_moved: usize,

    pub bytes_before: usize,
    pub bytes_after: usize,
}

impl CollectionReport {
    pub fn bytes_reclaimed(&self) -> usize {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}


/// A two-space copying collector.
///
/// Objects are bump-allocated in the active space. When a request doesn't
/// fit, everything reachable from the roots is copied into the standby
/// space, breadth-first (Cheney's algorithm): the standby space itself is
/// the work queue, with a scan cursor chasing the allocation cursor. Then
/// the spaces trade places, and the old active space is emptied.
///
/// A copied object's old header gets a forwarding address, so an object
/// referenced from many places (or from itself) is copied exactly once,
/// and every reference to it ends up pointing at the same copy.
///
/// Collection is stop-the-world: it happens inside `allocate` (or an
/// explicit `collect`), both of which borrow the collector mutably, so
/// nothing else can touch the heap until it's finished.
pub struct Collector<'heap> {
    active: Space<'heap>,
    standby: Space<'heap>,
    roots: RootRegistry,
    tracers: TraceTable,

    collections: usize,
    bytes_reclaimed: usize,
}

impl<'heap> Collector<'heap> {
    /// Create a collector out of two regions of memory, which must be the
    /// same size (after trimming to word alignment).
    pub fn new(active: Memory<'heap>, standby: Memory<'heap>) -> Result<Collector<'heap>> {
        let active = Space::new(active);
        let standby = Space::new(standby);
        if active.capacity() != standby.capacity() {
            return Err(GcError::CapacityMismatch { active: active.capacity(), standby: standby.capacity() });
        }
        Ok(Collector::from_spaces(active, standby))
    }

    /// Create a collector out of two mutable byte-slices.
    pub fn from_bytes(active: &'heap mut [u8], standby: &'heap mut [u8]) -> Result<Collector<'heap>> {
        Collector::new(Memory::new(active), Memory::new(standby))
    }

    fn from_spaces(active: Space<'heap>, standby: Space<'heap>) -> Collector<'heap> {
        Collector {
            active,
            standby,
            roots: RootRegistry::new(),
            tracers: TraceTable::builtin(),
            collections: 0,
            bytes_reclaimed: 0,
        }
    }

    /// Replace the trace table, for runtimes that register their own
    /// routines. Fails if an object already in the heap has a kind the new
    /// table can't trace.
    pub fn with_trace_table(mut self, tracers: TraceTable) -> Result<Collector<'heap>> {
        if let Some(object) = self.active.iter().find(|o| !tracers.is_registered(o.kind())) {
            return Err(GcError::UnregisteredKind(object.kind()));
        }
        self.tracers = tracers;
        Ok(self)
    }

    pub fn register<T: Trace>(&mut self) -> Result<()> {
        self.tracers.register::<T>()
    }

    /// Reserve an object of `kind` with `payload` bytes after the header.
    /// The payload is zeroed; the kind's module is responsible for filling
    /// it in.
    ///
    /// If the active space is full, this runs one collection and tries
    /// again. Any `GcRef` not reachable from the roots is invalid after
    /// this call.
    pub fn allocate(&mut self, kind: Kind, payload: usize) -> Result<GcRef> {
        if !kind.is_heap() { return Err(GcError::NotHeapKind(kind)) }
        if !self.tracers.is_registered(kind) { return Err(GcError::UnregisteredKind(kind)) }

        // a request that can't fit in an empty space isn't worth collecting for.
        let size = HEADER_SIZE.checked_add(payload).and_then(|n| checked_ceil_to(n, WORD_SIZE));
        let size = match size {
            Some(size) if size <= self.active.capacity() => size,
            _ => {
                let requested = size.unwrap_or(usize::MAX);
                return Err(GcError::OutOfMemory { requested, remaining: self.active.remaining_bytes() });
            }
        };

        let object = match self.active.allocate(size) {
            Some(object) => object,
            None => {
                debug!("allocation of {} bytes for {} failed, collecting", size, kind);
                self.collect();
                match self.active.allocate(size) {
                    Some(object) => object,
                    None => {
                        let remaining = self.active.remaining_bytes();
                        warn!("out of memory: {} bytes requested, {} remaining after collection", size, remaining);
                        return Err(GcError::OutOfMemory { requested: size, remaining });
                    }
                }
            }
        };
        object.set_kind(kind);
        Ok(object)
    }

    /// Run `f` with every heap reference in `keep` pushed on the scratch
    /// stack, then write their (possibly new) addresses back into `keep`.
    /// This is how a constructor holds on to its arguments while it
    /// allocates.
    pub fn keeping<T, F>(&mut self, keep: &mut [Value], f: F) -> Result<T>
        where F: FnOnce(&mut Collector<'heap>) -> Result<T>
    {
        let depth = self.roots.scratch_depth();
        keep.iter().filter_map(|v| v.pointer()).for_each(|r| self.roots.push_scratch(r));
        let result = f(self);
        for v in keep.iter_mut().rev() {
            if let Value::Heap(r) = v {
                if let Some(moved) = self.roots.pop_scratch() { *r = moved }
            }
        }
        debug_assert_eq!(depth, self.roots.scratch_depth());
        result
    }

    /// `allocate`, holding on to `keep` across a possible collection.
    pub fn allocate_keeping(&mut self, kind: Kind, payload: usize, keep: &mut [Value]) -> Result<GcRef> {
        self.keeping(keep, |gc| gc.allocate(kind, payload))
    }

    /// Run a full collection, relocating the registered roots (and the
    /// scratch stack) in place.
    pub fn collect(&mut self) -> CollectionReport {
        let mut roots = mem::take(&mut self.roots);
        let report = self.run(roots.iter_mut());
        self.roots = roots;
        report
    }

    /// Run a full collection using `roots` in place of the registered root
    /// set. The scratch stack is still honored. Registered roots that aren't
    /// also in `roots` are left dangling, so only use this when the
    /// registry is empty or stale on purpose.
    pub fn collect_from(&mut self, roots: &mut [GcRef]) -> CollectionReport {
        let mut registry = mem::take(&mut self.roots);
        let report = self.run(roots.iter_mut().chain(registry.scratch_mut().iter_mut()));
        self.roots = registry;
        report
    }

    fn run<'r, I: Iterator<Item = &'r mut GcRef>>(&mut self, roots: I) -> CollectionReport {
        let bytes_before = self.active.used_bytes();
        let mut root_count = 0;
        let mut objects_moved = 0;

        {
            let Collector { active, standby, tracers, .. } = self;
            debug_assert_eq!(standby.used_bytes(), 0);

            for root in roots {
                *root = evacuate(active, standby, *root);
                root_count += 1;
            }
            info!("gc moved {} roots", root_count);

            // everything between `scan` and `standby.top()` has been copied
            // but its fields still point into the old space.
            let mut scan = standby.bottom();
            while scan < standby.top() {
                let object = match unsafe { GcRef::from_ptr(scan) } {
                    Some(object) => object,
                    None => break,
                };
                let traced = tracers.trace(object, &mut |r: GcRef| evacuate(active, standby, r));
                debug_assert!(traced, "no trace routine for {:?}", object);
                scan = object.end();
                objects_moved += 1;
            }

            mem::swap(active, standby);
            standby.reset();
        }

        let report = CollectionReport { roots: root_count, objects_moved, bytes_before, bytes_after: self.active.used_bytes() };
        self.collections += 1;
        self.bytes_reclaimed += report.bytes_reclaimed();
        info!("gc complete, {} bytes collected ({} objects live)", report.bytes_reclaimed(), objects_moved);
        report
    }

    pub fn set_roots(&mut self, roots: Vec<GcRef>) {
        self.roots.set(roots);
    }

    /// The current root set. Entries are rewritten by every collection.
    pub fn roots(&self) -> &[GcRef] {
        self.roots.get()
    }

    pub fn root(&self, n: usize) -> Option<GcRef> {
        self.roots.root(n)
    }

    pub fn registry(&self) -> &RootRegistry {
        &self.roots
    }

    pub fn push_scratch(&mut self, r: GcRef) {
        self.roots.push_scratch(r);
    }

    pub fn pop_scratch(&mut self) -> Option<GcRef> {
        self.roots.pop_scratch()
    }

    pub fn active(&self) -> &Space<'heap> {
        &self.active
    }

    pub fn capacity(&self) -> usize {
        self.active.capacity()
    }

    pub fn stats(&self) -> GcStats {
        GcStats {
            used_bytes: self.active.used_bytes(),
            remaining_bytes: self.active.remaining_bytes(),
            total_bytes: self.active.capacity(),
            collections: self.collections,
            bytes_reclaimed: self.bytes_reclaimed,
        }
    }

    /// For debugging: list the kind and size of each object in the active
    /// space.
    pub fn dump(&self) -> String {
        self.active.dump()
    }
}

impl Collector<'static> {
    /// Create a collector with two owned spaces of `bytes` each.
    pub fn with_capacity(bytes: usize) -> Collector<'static> {
        let active = Space::new(Memory::with_capacity(bytes));
        let standby = Space::new(Memory::with_capacity(bytes));
        Collector::from_spaces(active, standby)
    }

    pub fn from_config(config: &GcConfig) -> Collector<'static> {
        Collector::with_capacity(config.heap_size)
    }
}

impl<'heap> fmt::Debug for Collector<'heap> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Collector(active={:?}, standby={:?}, roots={}, collections={})",
            self.active, self.standby, self.roots.len(), self.collections)
    }
}


/// Copy `object` into `to` unless it's already been copied, and return
/// its new address.
fn evacuate(from: &Space, to: &mut Space, object: GcRef) -> GcRef {
    if let Some(moved) = object.forwarding() { return moved }
    debug_assert!(from.contains(object.as_ptr()), "{:?} isn't in the active space", object);

    // both spaces have the same capacity, and the live set came out of
    // `from`, so it always fits.
    let copy = match to.copy_of(object) {
        Some(copy) => copy,
        None => panic!("standby space overflowed copying {:?}", object),
    };
    object.set_forwarding(Some(copy));
    copy
}


#[cfg(test)]
mod tests {
    use super::Collector;
    use crate::{ceil_to, record, GcError, Kind, TraceTable, Value, HEADER_SIZE, WORD_SIZE};
    use crate::record::RecordData;

    #[repr(align(8))]
    struct Blob {
        data: [u8; 512]
    }

    #[test]
    fn unequal_spaces() {
        let mut a = Blob { data: [0; 512] };
        let mut b = Blob { data: [0; 512] };
        match Collector::from_bytes(&mut a.data, &mut b.data[..256]) {
            Err(e) => assert_eq!(e, GcError::CapacityMismatch { active: 512, standby: 256 }),
            Ok(_) => panic!("expected a capacity mismatch"),
        };
    }

    #[test]
    fn allocate_tags_and_rounds() {
        let mut gc = Collector::with_capacity(512);
        let r = gc.allocate(Kind::Record, 3).unwrap();
        assert_eq!(r.kind(), Kind::Record);
        assert_eq!(r.size(), HEADER_SIZE + 8);
        assert_eq!(gc.stats().used_bytes, HEADER_SIZE + 8);
        assert_eq!(gc.stats().remaining_bytes, 512 - HEADER_SIZE - 8);
        assert_eq!(gc.allocate(Kind::Number, 8), Err(GcError::NotHeapKind(Kind::Number)));
    }

    #[test]
    fn unregistered_kinds_are_refused() {
        let mut gc = Collector::with_capacity(512).with_trace_table(TraceTable::new()).unwrap();
        assert_eq!(gc.allocate(Kind::Record, 8), Err(GcError::UnregisteredKind(Kind::Record)));
        gc.register::<RecordData>().unwrap();
        assert!(gc.allocate(Kind::Record, 8).is_ok());
        assert_eq!(gc.register::<RecordData>(), Err(GcError::DuplicateTrace(Kind::Record)));
    }

    #[test]
    fn collect_empty_heap() {
        let mut gc = Collector::with_capacity(256);
        let report = gc.collect();
        assert_eq!(report.roots, 0);
        assert_eq!(report.objects_moved, 0);
        assert_eq!(gc.stats().used_bytes, 0);
        assert_eq!(gc.stats().collections, 1);
    }

    #[test]
    fn scratch_roots_survive() {
        let mut gc = Collector::with_capacity(512);
        let garbage = record::create(&mut gc, 2).unwrap();
        let kept = record::create(&mut gc, 1).unwrap();
        record::set(kept, 0, Value::ONE);
        let _ = garbage;
        gc.push_scratch(kept);
        let report = gc.collect();
        assert_eq!(report.roots, 1);
        assert_eq!(report.objects_moved, 1);
        assert_eq!(report.bytes_reclaimed(), record::size_of(2));
        let kept = gc.pop_scratch().unwrap();
        assert_eq!(record::get(kept, 0), Some(Value::ONE));
        assert_eq!(gc.dump(), format!("Record[{}], FREE[{}]", record::size_of(1), 512 - record::size_of(1)));
    }

    #[test]
    fn explicit_roots() {
        let mut gc = Collector::with_capacity(512);
        let a = record::create(&mut gc, 1).unwrap();
        let _garbage = record::create(&mut gc, 1).unwrap();
        let b = record::create(&mut gc, 1).unwrap();
        record::set(b, 0, Value::Heap(a));

        let mut roots = [ b ];
        let report = gc.collect_from(&mut roots);
        assert_eq!(report.roots, 1);
        assert_eq!(report.objects_moved, 2);
        assert_ne!(roots[0], b);
        assert_eq!(record::get(roots[0], 0), Some(Value::Heap(a.forwarding().unwrap())));
        assert_eq!(gc.stats().used_bytes, 2 * record::size_of(1));
    }

    #[test]
    fn trace_table_must_cover_live_objects() {
        let mut gc = Collector::with_capacity(512);
        record::create(&mut gc, 1).unwrap();
        match gc.with_trace_table(TraceTable::new()) {
            Err(e) => assert_eq!(e, GcError::UnregisteredKind(Kind::Record)),
            Ok(_) => panic!("expected the record to need a routine"),
        };

        let mut gc = Collector::with_capacity(512);
        record::create(&mut gc, 1).unwrap();
        let mut tracers = TraceTable::new();
        tracers.register::<RecordData>().unwrap();
        let gc = gc.with_trace_table(tracers).unwrap();
        assert_eq!(gc.active().dump_kinds(), "Record");
    }

    #[test]
    fn too_big_fails_without_collecting() {
        let mut gc = Collector::with_capacity(256);
        match gc.allocate(Kind::Record, 1024) {
            Err(GcError::OutOfMemory { requested, remaining: 256 }) => {
                assert_eq!(requested, ceil_to(HEADER_SIZE + 1024, WORD_SIZE));
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(gc.stats().collections, 0);

        // the header counts against the capacity too.
        let payload = 256 - HEADER_SIZE + 1;
        match gc.allocate(Kind::Record, payload) {
            Err(GcError::OutOfMemory { requested, remaining: 256 }) => {
                assert_eq!(requested, ceil_to(256 + 1, WORD_SIZE));
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(gc.stats().collections, 0);

        assert!(gc.allocate(Kind::Record, 256 - HEADER_SIZE).is_ok());
        assert_eq!(gc.stats().remaining_bytes, 0);
        assert_eq!(gc.stats().collections, 0);
    }

    #[test]
    fn unaddressable_sizes_are_out_of_memory() {
        let mut gc = Collector::with_capacity(256);
        match gc.allocate(Kind::Record, usize::MAX - 4) {
            Err(GcError::OutOfMemory { requested: usize::MAX, remaining: 256 }) => (),
            other => panic!("unexpected {:?}", other),
        }
        match record::create(&mut gc, usize::MAX / 8) {
            Err(GcError::OutOfMemory { requested: usize::MAX, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
        match record::create(&mut gc, usize::MAX / 16) {
            Err(GcError::OutOfMemory { .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(gc.stats().collections, 0);
        assert_eq!(gc.stats().used_bytes, 0);
    }
}
