//! The registry: library table, folder linking and path lookup.
//!
//! # Locking
//!
//! Each library's folder set and each folder's entry set has its own spin
//! lock. When both are needed the library lock is taken first. A dynamic
//! entry's reference is only ever acquired while its folder's lock is held
//! and the folder still owns it, so an acquisition can never observe an
//! entry that is being destroyed.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::builder::Collision;
use crate::entry::EntryRef;
use crate::error::{Result, StoreError};
use crate::folder::{Folder, FolderState, FreedFolder, dup_name};
use crate::library::{FolderMap, Library, LibraryId};

/// Process-wide table of libraries, their static entries and their folders.
#[derive(Debug)]
pub struct Registry {
	pub(crate) libraries: Vec<Library>,
	pub(crate) by_name: FxHashMap<&'static str, LibraryId>,
	pub(crate) collisions: Vec<Collision>,
}

impl Registry {
	/// A registry with no libraries.
	pub fn empty() -> Self {
		Self {
			libraries: Vec::new(),
			by_name: FxHashMap::default(),
			collisions: Vec::new(),
		}
	}

	pub fn len(&self) -> usize {
		self.libraries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.libraries.is_empty()
	}

	/// Resolves a library name to its id.
	pub fn library_id(&self, name: &str) -> Result<LibraryId> {
		self.by_name
			.get(name)
			.copied()
			.ok_or_else(|| StoreError::InvalidLibraryId(name.to_owned()))
	}

	pub fn library_name(&self, id: LibraryId) -> Result<&'static str> {
		self.library(id).map(|lib| lib.name)
	}

	/// All libraries in id order.
	pub fn libraries(&self) -> impl Iterator<Item = (LibraryId, &'static str)> + '_ {
		self.libraries.iter().map(|lib| (lib.id, lib.name))
	}

	/// Static entry names of a library, in registration order.
	pub fn static_entry_names(&self, id: LibraryId) -> Result<Vec<&'static str>> {
		Ok(self.library(id)?.statics.keys().copied().collect())
	}

	/// Folder names currently linked into a library.
	pub fn folder_names(&self, id: LibraryId) -> Result<Vec<String>> {
		let library = self.library(id)?;
		let folders = library.folders.lock();
		Ok(folders.keys().map(|k| k.to_string()).collect())
	}

	/// Static entry name collisions seen while building.
	pub fn collisions(&self) -> &[Collision] {
		&self.collisions
	}

	pub(crate) fn library(&self, id: LibraryId) -> Result<&Library> {
		self.libraries
			.get(id.index())
			.ok_or_else(|| StoreError::InvalidLibraryId(id.to_string()))
	}

	/// Links `folder` into a library, making it discoverable.
	pub fn add_folder(&self, id: LibraryId, folder: &Folder) -> Result<()> {
		let library = self.library(id)?;
		let key = dup_name(folder.name())?;

		let mut folders = library.folders.lock();
		let mut state = folder.inner.state.lock();
		if state.freed {
			return Err(StoreError::FolderFreed(folder.name().to_owned()));
		}
		if let Some(owner) = state.library {
			return Err(StoreError::FolderAlreadyLinked {
				folder: folder.name().to_owned(),
				library: owner,
			});
		}
		if folders.contains_key(folder.name()) {
			return Err(StoreError::DuplicateName(format!(
				"{}/{}",
				library.name,
				folder.name()
			)));
		}
		folders.try_reserve(1)?;
		folders.insert(key, folder.clone());
		state.library = Some(id);
		drop(state);
		drop(folders);

		debug!(library = %id, folder = %folder.name(), "folder linked");
		Ok(())
	}

	/// Finds a linked folder by name.
	pub fn get_folder(&self, id: LibraryId, name: &str) -> Result<Folder> {
		let library = self.library(id)?;
		let folders = library.folders.lock();
		folders
			.get(name)
			.cloned()
			.ok_or_else(|| StoreError::FolderNotFound {
				library: id,
				folder: name.to_owned(),
			})
	}

	/// Unlinks `folder` from its library without touching its entries.
	///
	/// The caller becomes responsible for eventually freeing it. Fails with
	/// [`StoreError::FolderNotLinked`] if the folder is not linked into this
	/// registry.
	pub fn remove_folder(&self, folder: &Folder) -> Result<()> {
		self.with_owner_locked(folder, |folders, state| {
			let id = state
				.library
				.ok_or_else(|| StoreError::FolderNotLinked(folder.name().to_owned()))?;
			if let Some(folders) = folders {
				folders.shift_remove(folder.name());
			}
			state.library = None;
			debug!(library = %id, folder = %folder.name(), "folder unlinked");
			Ok(())
		})?
	}

	/// Destroys `folder` and every entry in it.
	///
	/// Each entry's cleanup runs once. Freeing a folder that another handle
	/// already freed does nothing, and so does freeing a folder linked into a
	/// different registry.
	pub fn free_folder(&self, folder: Folder) -> FreedFolder {
		let taken = self.with_owner_locked(&folder, |folders, state| {
			if let Some(folders) = folders {
				folders.shift_remove(folder.name());
			}
			state.library = None;
			Folder::take_entries(state)
		});
		match taken {
			Ok(entries) => folder.finish_free(entries),
			Err(err) => {
				warn!(folder = %folder.name(), %err, "free_folder ignored");
				FreedFolder::untouched(&folder)
			}
		}
	}

	/// Resolves `library / folder / entry`.
	///
	/// With no folder the library's static entries are searched and no
	/// reference is taken. Otherwise the dynamic entry's reference count is
	/// incremented before the handle is returned.
	pub fn resolve(&self, id: LibraryId, folder: Option<&str>, entry: &str) -> Result<EntryRef> {
		let library = self.library(id)?;
		let Some(folder_name) = folder else {
			return library
				.statics
				.get(entry)
				.copied()
				.map(EntryRef::Static)
				.ok_or_else(|| StoreError::EntryNotFound(format!("{}::{entry}", library.name)));
		};

		let folders = library.folders.lock();
		let folder = folders
			.get(folder_name)
			.ok_or_else(|| StoreError::FolderNotFound {
				library: id,
				folder: folder_name.to_owned(),
			})?;
		let state = folder.inner.state.lock();
		let found = state.entries.get(entry).ok_or_else(|| {
			StoreError::EntryNotFound(format!("{}/{folder_name}/{entry}", library.name))
		})?;
		let handle = Arc::clone(found);
		drop(state);
		drop(folders);

		trace!(library = %id, folder = folder_name, entry, refs = Arc::strong_count(&handle), "resolve");
		Ok(EntryRef::Dynamic(handle))
	}

	/// Runs `f` with the folder's owning library table and the folder state
	/// both locked, library first.
	///
	/// The owner is read before the library lock is taken, so a concurrent
	/// link or unlink can move the folder in between; that case is detected
	/// under the locks and retried. A folder whose owning id does not hold it
	/// in this registry belongs to another one and is left alone.
	fn with_owner_locked<R>(
		&self,
		folder: &Folder,
		f: impl FnOnce(Option<&mut FolderMap>, &mut FolderState) -> R,
	) -> Result<R> {
		let not_linked = || StoreError::FolderNotLinked(folder.name().to_owned());
		loop {
			let owner = folder.library();
			let library = match owner {
				Some(id) => Some(self.library(id).map_err(|_| not_linked())?),
				None => None,
			};
			let mut folders = library.map(|lib| lib.folders.lock());
			let mut state = folder.inner.state.lock();
			if state.library != owner {
				continue;
			}
			if folders.as_deref().is_some_and(|folders| !holds(folders, folder)) {
				return Err(not_linked());
			}
			return Ok(f(folders.as_deref_mut(), &mut state));
		}
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::empty()
	}
}

fn holds(folders: &FolderMap, folder: &Folder) -> bool {
	folders
		.get(folder.name())
		.is_some_and(|linked| linked.ptr_eq(folder))
}
