use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::dict::{ScopeTypes, StructRef, TypeDesc};

/// Default number of entries kept per memo table.
const DEFAULT_CAPACITY: usize = 100;

/// Cache settings loadable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
	/// Memoize field maps and forward references.
	pub enabled: bool,
	/// Maximum entries per memo table.
	pub capacity: usize,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			capacity: DEFAULT_CAPACITY,
		}
	}
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
	/// Lookups answered from the cache.
	pub hits: u64,
	/// Lookups that had to compute.
	pub misses: u64,
	/// Entries currently stored across both tables.
	pub size: usize,
	/// Per-table capacity; `None` while disabled.
	pub capacity: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FieldsKey {
	pub(crate) ty: TypeDesc,
	pub(crate) scope: Arc<ScopeTypes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RefKey {
	pub(crate) name: Box<str>,
	pub(crate) owner: Option<StructRef>,
	pub(crate) scope: Arc<ScopeTypes>,
}

pub(crate) type FieldEntries = Arc<[(Box<str>, TypeDesc)]>;

/// Bounded least-recently-used memo for field maps and forward references.
///
/// Racing misses may both compute; the last insert wins. Enabling, disabling
/// and clearing are administrative operations with no ordering guarantee
/// against in-flight decodes.
#[derive(Debug)]
pub struct ResolutionCache {
	state: Mutex<CacheState>,
}

#[derive(Debug)]
struct CacheState {
	capacity: Option<usize>,
	tick: u64,
	hits: u64,
	misses: u64,
	fields: Lru<FieldsKey, FieldEntries>,
	refs: Lru<RefKey, TypeDesc>,
}

#[derive(Debug)]
struct Lru<K, V> {
	entries: HashMap<K, (V, u64)>,
}

impl<K: Hash + Eq + Clone, V: Clone> Lru<K, V> {
	fn new() -> Self {
		Self { entries: HashMap::new() }
	}

	fn get(&mut self, key: &K, tick: u64) -> Option<V> {
		let (value, used) = self.entries.get_mut(key)?;
		*used = tick;
		Some(value.clone())
	}

	fn insert(&mut self, key: K, value: V, tick: u64, capacity: usize) {
		if capacity == 0 {
			return;
		}
		if !self.entries.contains_key(&key) && self.entries.len() >= capacity {
			self.evict_oldest();
		}
		self.entries.insert(key, (value, tick));
	}

	fn evict_oldest(&mut self) {
		let oldest = self.entries.iter().min_by_key(|(_, (_, used))| *used).map(|(key, _)| key.clone());
		if let Some(key) = oldest {
			self.entries.remove(&key);
			tracing::trace!(size = self.entries.len(), "resolution cache evicted least recently used entry");
		}
	}

	fn shrink_to(&mut self, capacity: usize) {
		while self.entries.len() > capacity {
			self.evict_oldest();
		}
	}

	fn len(&self) -> usize {
		self.entries.len()
	}

	fn clear(&mut self) {
		self.entries.clear();
	}
}

impl ResolutionCache {
	/// Enabled cache holding at most `capacity` entries per table.
	pub fn new(capacity: usize) -> Self {
		Self::with_capacity(Some(capacity))
	}

	/// Cache that never stores anything.
	pub fn disabled() -> Self {
		Self::with_capacity(None)
	}

	/// Build from configuration.
	pub fn from_config(config: &CacheConfig) -> Self {
		Self::with_capacity(config.enabled.then_some(config.capacity))
	}

	/// Process-wide instance used by the free decode functions.
	pub fn shared() -> &'static ResolutionCache {
		static SHARED: OnceLock<ResolutionCache> = OnceLock::new();
		SHARED.get_or_init(|| Self::new(DEFAULT_CAPACITY))
	}

	fn with_capacity(capacity: Option<usize>) -> Self {
		Self {
			state: Mutex::new(CacheState {
				capacity,
				tick: 0,
				hits: 0,
				misses: 0,
				fields: Lru::new(),
				refs: Lru::new(),
			}),
		}
	}

	/// Enable with `capacity`; a no-op when already enabled at that capacity.
	pub fn enable(&self, capacity: usize) {
		let mut state = self.state.lock();
		if state.capacity == Some(capacity) {
			return;
		}
		state.fields.clear();
		state.refs.clear();
		state.capacity = Some(capacity);
		tracing::debug!(capacity, "resolution cache enabled");
	}

	/// Disable and drop all entries.
	pub fn disable(&self) {
		let mut state = self.state.lock();
		state.fields.clear();
		state.refs.clear();
		state.capacity = None;
		tracing::debug!("resolution cache disabled");
	}

	/// Whether lookups are memoized.
	pub fn is_enabled(&self) -> bool {
		self.state.lock().capacity.is_some()
	}

	/// Drop all entries and reset counters.
	pub fn clear(&self) {
		let mut state = self.state.lock();
		state.fields.clear();
		state.refs.clear();
		state.hits = 0;
		state.misses = 0;
	}

	/// Change capacity, evicting least recently used entries as needed.
	pub fn resize(&self, capacity: usize) {
		let mut state = self.state.lock();
		if state.capacity.is_none() {
			return;
		}
		state.fields.shrink_to(capacity);
		state.refs.shrink_to(capacity);
		state.capacity = Some(capacity);
	}

	/// Current counters.
	pub fn stats(&self) -> CacheStats {
		let state = self.state.lock();
		CacheStats {
			hits: state.hits,
			misses: state.misses,
			size: state.fields.len() + state.refs.len(),
			capacity: state.capacity,
		}
	}

	pub(crate) fn fields_or_insert_with<E>(&self, key: FieldsKey, compute: impl FnOnce() -> Result<FieldEntries, E>) -> Result<FieldEntries, E> {
		self.memoize(key, |state| &mut state.fields, compute)
	}

	pub(crate) fn ref_or_insert_with<E>(&self, key: RefKey, compute: impl FnOnce() -> Result<TypeDesc, E>) -> Result<TypeDesc, E> {
		self.memoize(key, |state| &mut state.refs, compute)
	}

	fn memoize<K, V, E>(&self, key: K, table: impl Fn(&mut CacheState) -> &mut Lru<K, V>, compute: impl FnOnce() -> Result<V, E>) -> Result<V, E>
	where
		K: Hash + Eq + Clone + std::fmt::Debug,
		V: Clone,
	{
		{
			let mut state = self.state.lock();
			if state.capacity.is_none() {
				drop(state);
				return compute();
			}
			state.tick += 1;
			let tick = state.tick;
			if let Some(value) = table(&mut *state).get(&key, tick) {
				state.hits += 1;
				tracing::trace!(?key, "resolution cache hit");
				return Ok(value);
			}
			state.misses += 1;
		}

		tracing::trace!(?key, "resolution cache miss");
		let value = compute()?;

		let mut state = self.state.lock();
		if let Some(capacity) = state.capacity {
			state.tick += 1;
			let tick = state.tick;
			table(&mut *state).insert(key, value.clone(), tick, capacity);
		}
		Ok(value)
	}
}
