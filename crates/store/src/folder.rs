//! Folders: named, runtime-mutable containers of dynamic entries.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::accessor::{Accessors, CleanupFn, Cookie};
use crate::entry::{DynamicEntry, EntryRef};
use crate::error::{Result, StoreError};
use crate::library::LibraryId;
use crate::sync::SpinMutex;

pub(crate) type EntryMap = IndexMap<Box<str>, Arc<DynamicEntry>, FxBuildHasher>;

/// Everything needed to create one dynamic entry.
pub struct DynamicEntryDef<'a> {
	pub name: &'a str,
	pub accessors: Accessors,
	pub cookie: Cookie,
	pub cleanup: Option<CleanupFn>,
}

impl<'a> DynamicEntryDef<'a> {
	pub fn new(name: &'a str, accessors: Accessors) -> Self {
		Self {
			name,
			accessors,
			cookie: Cookie::NONE,
			cleanup: None,
		}
	}

	pub fn with_cookie(mut self, cookie: Cookie) -> Self {
		self.cookie = cookie;
		self
	}

	pub fn with_cleanup(mut self, cleanup: CleanupFn) -> Self {
		self.cleanup = Some(cleanup);
		self
	}
}

pub(crate) struct FolderState {
	/// Owning library while linked.
	pub(crate) library: Option<LibraryId>,
	pub(crate) freed: bool,
	pub(crate) entries: EntryMap,
}

pub(crate) struct FolderInner {
	name: Box<str>,
	pub(crate) state: SpinMutex<FolderState>,
}

impl FolderInner {
	/// Removes `entry` from the table if it is still the one stored under its name.
	pub(crate) fn unlink_entry(&self, entry: &Arc<DynamicEntry>) {
		let mut state = self.state.lock();
		let same = state
			.entries
			.get(entry.name())
			.is_some_and(|stored| Arc::ptr_eq(stored, entry));
		if same {
			state.entries.shift_remove(entry.name());
		}
	}
}

/// Shared handle to a folder.
///
/// Clones refer to the same folder. A folder becomes discoverable once
/// linked into a library with `add_folder`.
///
/// `free_folder` consumes the handle it is given, but clones made earlier
/// stay usable as values. Misuse through them is caught at runtime instead:
/// a freed folder refuses new entries and relinking with
/// [`StoreError::FolderFreed`], and freeing it again destroys nothing.
#[derive(Clone)]
pub struct Folder {
	pub(crate) inner: Arc<FolderInner>,
}

impl Folder {
	/// Allocates a new, empty, unlinked folder.
	pub fn allocate(name: &str) -> Result<Self> {
		let name = dup_name(name)?;
		Ok(Self {
			inner: Arc::new(FolderInner {
				name,
				state: SpinMutex::new(FolderState {
					library: None,
					freed: false,
					entries: EntryMap::default(),
				}),
			}),
		})
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Library the folder is linked into, if any.
	pub fn library(&self) -> Option<LibraryId> {
		self.inner.state.lock().library
	}

	pub fn is_freed(&self) -> bool {
		self.inner.state.lock().freed
	}

	pub fn len(&self) -> usize {
		self.inner.state.lock().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Entry names in creation order.
	pub fn entry_names(&self) -> Vec<String> {
		let state = self.inner.state.lock();
		state.entries.keys().map(|k| k.to_string()).collect()
	}

	/// Returns true if both handles refer to the same folder.
	pub fn ptr_eq(&self, other: &Folder) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Creates a dynamic entry and appends it to this folder.
	///
	/// The folder keeps one reference; the returned handle is a second one.
	pub fn create_entry(&self, def: DynamicEntryDef<'_>) -> Result<EntryRef> {
		let key = dup_name(def.name)?;
		let name = dup_name(def.name)?;

		let mut state = self.inner.state.lock();
		if state.freed {
			return Err(StoreError::FolderFreed(self.name().to_owned()));
		}
		if state.entries.contains_key(def.name) {
			return Err(StoreError::DuplicateName(format!("{}/{}", self.name(), def.name)));
		}
		state.entries.try_reserve(1)?;

		let entry = Arc::new(DynamicEntry::new(
			name,
			def.accessors,
			def.cookie,
			def.cleanup,
			Arc::downgrade(&self.inner),
		));
		state.entries.insert(key, Arc::clone(&entry));
		drop(state);

		debug!(
			folder = %self.name(),
			entry = def.name,
			ty = %def.accessors.scalar_type(),
			"dynamic entry created"
		);
		Ok(EntryRef::Dynamic(entry))
	}

	/// Looks up an entry without going through a library.
	pub fn entry(&self, name: &str) -> Result<EntryRef> {
		let state = self.inner.state.lock();
		state
			.entries
			.get(name)
			.map(|e| EntryRef::Dynamic(Arc::clone(e)))
			.ok_or_else(|| StoreError::EntryNotFound(format!("{}/{name}", self.name())))
	}

	/// Marks the folder freed and takes its entries. Caller holds the state lock.
	pub(crate) fn take_entries(state: &mut FolderState) -> Option<EntryMap> {
		if state.freed {
			return None;
		}
		state.freed = true;
		Some(std::mem::take(&mut state.entries))
	}

	/// Retires every entry taken out of a freed folder and builds the tombstone.
	pub(crate) fn finish_free(self, entries: Option<EntryMap>) -> FreedFolder {
		let destroyed = entries.map_or(0, |entries| {
			entries.values().filter(|entry| entry.retire()).count()
		});
		debug!(folder = %self.name(), destroyed, "folder freed");
		FreedFolder {
			name: self.inner.name.clone(),
			destroyed,
		}
	}
}

impl fmt::Debug for Folder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Folder")
			.field("name", &self.inner.name)
			.field("library", &state.library)
			.field("freed", &state.freed)
			.field("entries", &state.entries.len())
			.finish()
	}
}

/// What is left of a folder after `free_folder`.
///
/// Distinct from [`Folder`] so a destroyed folder cannot be linked or
/// populated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreedFolder {
	name: Box<str>,
	destroyed: usize,
}

impl FreedFolder {
	pub(crate) fn untouched(folder: &Folder) -> Self {
		Self {
			name: folder.inner.name.clone(),
			destroyed: 0,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Number of entries destroyed by this free.
	pub fn destroyed_entries(&self) -> usize {
		self.destroyed
	}
}

/// Copies a name into a fallibly reserved allocation.
pub(crate) fn dup_name(name: &str) -> Result<Box<str>> {
	let mut owned = String::new();
	owned.try_reserve_exact(name.len())?;
	owned.push_str(name);
	Ok(owned.into_boxed_str())
}

#[cfg(test)]
mod tests;
