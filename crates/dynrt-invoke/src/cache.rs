//! Call descriptor cache
//!
//! Maps slot shapes to prepared descriptors. Each distinct shape is prepared
//! at most once, even under concurrent callers, and every later request for
//! an equal shape gets the same `Arc`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::descriptor::{CallDescriptor, CallingConvention, DescriptorFactory, FfiFactory};
use crate::error::DescriptorBuildError;
use crate::shape::SlotShape;

/// Thread-safe cache of call descriptors keyed by slot shape
pub struct DescriptorCache<F = FfiFactory> {
    /// Shape → prepared descriptor
    entries: RwLock<FxHashMap<SlotShape, Arc<CallDescriptor>>>,
    factory: F,
    /// Descriptors constructed
    builds: AtomicUsize,
    /// Requests served from the map
    hits: AtomicUsize,
}

impl DescriptorCache<FfiFactory> {
    /// Cache preparing descriptors with the system calling convention
    pub fn new() -> Self {
        Self::with_convention(CallingConvention::default())
    }

    /// Cache preparing descriptors with `convention`
    pub fn with_convention(convention: CallingConvention) -> Self {
        Self::with_factory(FfiFactory::new(convention))
    }
}

impl Default for DescriptorCache<FfiFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: DescriptorFactory> DescriptorCache<F> {
    /// Cache delegating construction to `factory`
    pub fn with_factory(factory: F) -> Self {
        DescriptorCache {
            entries: RwLock::new(FxHashMap::default()),
            factory,
            builds: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }

    /// Descriptor for `shape`, constructing it on first use.
    ///
    /// A construction failure is returned and nothing is cached.
    pub fn get_or_build(
        &self,
        shape: &SlotShape,
    ) -> Result<Arc<CallDescriptor>, DescriptorBuildError> {
        if let Some(descriptor) = self.entries.read().get(shape) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(target: "dynrt::cache", %shape, "descriptor cache hit");
            return Ok(Arc::clone(descriptor));
        }

        let mut entries = self.entries.write();
        // Another caller may have built it between the two locks
        if let Some(descriptor) = entries.get(shape) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(descriptor));
        }

        let descriptor = Arc::new(self.factory.build(shape)?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            target: "dynrt::cache",
            %shape,
            arity = descriptor.arity(),
            convention = ?descriptor.convention(),
            "call descriptor built"
        );

        entries.insert(shape.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Cached descriptor for `shape`, without building
    pub fn get(&self, shape: &SlotShape) -> Option<Arc<CallDescriptor>> {
        self.entries.read().get(shape).cloned()
    }

    /// Number of cached descriptors
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Number of descriptors constructed so far
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of requests answered from the cache
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// The factory used for construction
    pub fn factory(&self) -> &F {
        &self.factory
    }
}
