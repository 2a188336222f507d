// crates/conduit-engine/src/resource.rs
// ============================================================================
// Module: Resource Allocator
// Description: Bounds how many task attempts may run concurrently.
// Purpose: Enforce global, per-capability, and per-resource-class concurrency
//          limits, and the four selectable parallel-blocking strategies.
// Dependencies: tokio, conduit-core
// ============================================================================

//! ## Overview
//! Every grant acquires two permits: a global one (always) and a
//! strategy-scoped one. Under [`ParallelStrategy::Max`] the scoped permit
//! comes from the capability's own declared `max_concurrency` pool; under
//! [`ParallelStrategy::ByCapability`] that pool is forced to a single permit
//! regardless of the declared limit; under [`ParallelStrategy::ByResource`]
//! an additional permit is drawn from the task's resource-class pool (tasks
//! with no declared resource class skip this third gate); under
//! [`ParallelStrategy::Conservative`] a single process-wide permit is drawn
//! on top of the others, so only one task in the whole Run ever runs at once.
//! Dropping a [`ResourceGrant`] releases every permit it holds.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use conduit_core::ids::CapabilityId;
use conduit_core::Capability;
use conduit_core::ParallelStrategy;
use tokio::sync::OwnedSemaphorePermit;
use tokio::sync::Semaphore;

/// Errors raised while acquiring a resource grant.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The allocator was dropped while an acquisition was pending.
    #[error("resource allocator closed while awaiting a grant")]
    Closed,
}

/// Held concurrency permits for one in-flight task attempt.
///
/// Dropping this releases every permit it holds back to its pool.
pub struct ResourceGrant {
    _global: OwnedSemaphorePermit,
    _capability: OwnedSemaphorePermit,
    _resource_class: Option<OwnedSemaphorePermit>,
    _conservative: Option<OwnedSemaphorePermit>,
}

/// Bounds concurrent task attempts per the selected [`ParallelStrategy`].
pub struct ResourceAllocator {
    strategy: ParallelStrategy,
    global: Arc<Semaphore>,
    capability_pools: Mutex<BTreeMap<CapabilityId, Arc<Semaphore>>>,
    resource_class_pools: Mutex<BTreeMap<String, Arc<Semaphore>>>,
    resource_class_limits: BTreeMap<String, u32>,
    conservative: Arc<Semaphore>,
}

impl ResourceAllocator {
    /// Builds an allocator bounded by `global_concurrency` overall, with
    /// per-resource-class limits from `resource_class_limits` (classes absent
    /// from the map default to a single slot).
    #[must_use]
    pub fn new(
        strategy: ParallelStrategy,
        global_concurrency: u32,
        resource_class_limits: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            strategy,
            global: Arc::new(Semaphore::new(global_concurrency.max(1) as usize)),
            capability_pools: Mutex::new(BTreeMap::new()),
            resource_class_pools: Mutex::new(BTreeMap::new()),
            resource_class_limits,
            conservative: Arc::new(Semaphore::new(1)),
        }
    }

    /// Awaits a grant to run one attempt of `capability`, blocking until a
    /// slot is available under every gate the current strategy applies.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Closed`] if a semaphore was closed while this
    /// call was waiting, which only happens if the allocator itself is being
    /// torn down.
    pub async fn acquire(&self, capability: &Capability) -> Result<ResourceGrant, ResourceError> {
        let global = Arc::clone(&self.global).acquire_owned().await.map_err(|_| ResourceError::Closed)?;

        let capability_limit = match self.strategy {
            ParallelStrategy::ByCapability => 1,
            _ => capability.max_concurrency.max(1),
        };
        let capability_pool = self.pool_for_capability(&capability.id, capability_limit);
        let capability_permit =
            capability_pool.acquire_owned().await.map_err(|_| ResourceError::Closed)?;

        let resource_class_permit = if matches!(self.strategy, ParallelStrategy::ByResource) {
            match &capability.resource_class {
                Some(class) => {
                    let pool = self.pool_for_resource_class(class);
                    Some(pool.acquire_owned().await.map_err(|_| ResourceError::Closed)?)
                }
                None => None,
            }
        } else {
            None
        };

        let conservative_permit = if matches!(self.strategy, ParallelStrategy::Conservative) {
            Some(Arc::clone(&self.conservative).acquire_owned().await.map_err(|_| ResourceError::Closed)?)
        } else {
            None
        };

        Ok(ResourceGrant {
            _global: global,
            _capability: capability_permit,
            _resource_class: resource_class_permit,
            _conservative: conservative_permit,
        })
    }

    fn pool_for_capability(&self, id: &CapabilityId, limit: u32) -> Arc<Semaphore> {
        let mut pools = self.capability_pools.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(pools.entry(id.clone()).or_insert_with(|| Arc::new(Semaphore::new(limit.max(1) as usize))))
    }

    fn pool_for_resource_class(&self, class: &str) -> Arc<Semaphore> {
        let mut pools = self.resource_class_pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = pools.get(class) {
            return Arc::clone(existing);
        }
        let limit = self.resource_class_limits.get(class).copied().unwrap_or(1).max(1) as usize;
        let pool = Arc::new(Semaphore::new(limit));
        pools.insert(class.to_string(), Arc::clone(&pool));
        pool
    }
}
