//! Type descriptor cache: one fully built [`TypeBinding`] per parameter struct.

use crate::descriptor::ParamDescriptor;
use crate::error::{ParamError, ParamResult};
use crate::field::{ParamStruct, TypeBinding};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

type Entry = Arc<dyn Any + Send + Sync>;

/// Registry of built type bindings keyed by `TypeId`.
///
/// Entries are inserted complete and never evicted.
pub struct DescriptorCache {
    entries: DashMap<TypeId, Entry>,
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("types_count", &self.entries.len())
            .finish()
    }
}

static GLOBAL_CACHE: OnceLock<DescriptorCache> = OnceLock::new();

impl DescriptorCache {
    /// Creates an empty, private cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide cache.
    pub fn global() -> &'static DescriptorCache {
        GLOBAL_CACHE.get_or_init(DescriptorCache::new)
    }

    /// Returns the binding for `T`, building and storing it on first use.
    ///
    /// Racing first uses may each build; exactly one result is stored and
    /// every caller receives that one.
    pub fn get_or_build<T: ParamStruct>(&self) -> ParamResult<Arc<TypeBinding<T>>> {
        let id = TypeId::of::<T>();
        if let Some(entry) = self.entries.get(&id) {
            return downcast::<T>(Arc::clone(entry.value()));
        }

        let built: Entry = Arc::new(TypeBinding::<T>::build()?);
        let mut inserted = false;
        let stored = Arc::clone(
            self.entries
                .entry(id)
                .or_insert_with(|| {
                    inserted = true;
                    built
                })
                .value(),
        );
        let binding = downcast::<T>(stored)?;
        if inserted {
            tracing::debug!(
                type_name = std::any::type_name::<T>(),
                params = binding.descriptors().len(),
                "registered parameter descriptors"
            );
        }
        Ok(binding)
    }

    /// Descriptors of `T` in declaration order.
    pub fn descriptors<T: ParamStruct>(&self) -> ParamResult<Arc<[ParamDescriptor]>> {
        Ok(Arc::clone(self.get_or_build::<T>()?.descriptors()))
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry, so the next lookup rebuilds.
    #[doc(hidden)]
    pub fn reset(&self) {
        self.entries.clear();
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<T: ParamStruct>(entry: Entry) -> ParamResult<Arc<TypeBinding<T>>> {
    entry.downcast::<TypeBinding<T>>().map_err(|_| {
        ParamError::configuration(format!(
            "descriptor cache entry for {} has the wrong type",
            std::any::type_name::<T>()
        ))
    })
}

/// Builds and caches the descriptors of `T` in the global cache.
///
/// Call this while registering routes so metadata defects fail at startup.
pub fn register<T: ParamStruct>() -> ParamResult<()> {
    DescriptorCache::global().get_or_build::<T>().map(|_| ())
}

/// Descriptors of `T` from the global cache.
pub fn descriptors<T: ParamStruct>() -> ParamResult<Arc<[ParamDescriptor]>> {
    DescriptorCache::global().descriptors::<T>()
}
