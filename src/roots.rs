use crate::header::GcRef;

/// The references held from outside the heap: the global scope, pending
/// task queues, and anything else the runtime keeps natively.
///
/// A collection rewrites every entry in place, so after any allocation the
/// caller has to read its roots back from here instead of keeping copies.
///
/// The scratch stack is for short-lived native references: a constructor
/// that needs to hold on to its arguments across an allocation pushes them,
/// allocates, and pops them back (possibly at new addresses).
#[derive(Debug, Default)]
pub struct RootRegistry {
    roots: Vec<GcRef>,
    scratch: Vec<GcRef>,
}

impl RootRegistry {
    pub fn new() -> RootRegistry {
        RootRegistry::default()
    }

    /// Replace the whole root set.
    pub fn set(&mut self, roots: Vec<GcRef>) {
        self.roots = roots;
    }

    pub fn get(&self) -> &[GcRef] {
        &self.roots
    }

    pub fn root(&self, n: usize) -> Option<GcRef> {
        self.roots.get(n).copied()
    }

    pub fn len(&self) -> usize {
        self.roots.len() + self.scratch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push_scratch(&mut self, r: GcRef) {
        self.scratch.push(r);
    }

    pub fn pop_scratch(&mut self) -> Option<GcRef> {
        self.scratch.pop()
    }

    pub fn scratch_depth(&self) -> usize {
        self.scratch.len()
    }

    /// Every entry, for the collector to rewrite.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut GcRef> {
        self.roots.iter_mut().chain(self.scratch.iter_mut())
    }

    pub(crate) fn scratch_mut(&mut self) -> &mut [GcRef] {
        &mut self.scratch
    }
}
