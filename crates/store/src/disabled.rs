//! Inert stand-in used when the store is compiled out of an image.
//!
//! Every operation reports [`StoreError::Disabled`] and has no side effects,
//! so publishers and consumers compile unchanged and can tell at runtime
//! that nothing was published.

use tracing::trace;

use crate::entry::EntryRef;
use crate::error::{Result, StoreError};
use crate::folder::{DynamicEntryDef, Folder, FreedFolder};
use crate::library::LibraryId;
use crate::store::Store;

/// The disabled store.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

impl Store for DisabledStore {
	fn library_id(&self, _name: &str) -> Result<LibraryId> {
		Err(StoreError::Disabled)
	}

	fn allocate_folder(&self, _name: &str) -> Result<Folder> {
		Err(StoreError::Disabled)
	}

	fn add_folder(&self, _library: LibraryId, _folder: &Folder) -> Result<()> {
		Err(StoreError::Disabled)
	}

	fn get_folder(&self, _library: LibraryId, _name: &str) -> Result<Folder> {
		Err(StoreError::Disabled)
	}

	fn remove_folder(&self, _folder: &Folder) -> Result<()> {
		Err(StoreError::Disabled)
	}

	fn free_folder(&self, folder: Folder) -> FreedFolder {
		trace!(folder = %folder.name(), "store disabled; free_folder ignored");
		FreedFolder::untouched(&folder)
	}

	fn create_dynamic_entry(&self, _folder: &Folder, _def: DynamicEntryDef<'_>) -> Result<EntryRef> {
		Err(StoreError::Disabled)
	}

	fn resolve(&self, _library: LibraryId, _folder: Option<&str>, _entry: &str) -> Result<EntryRef> {
		Err(StoreError::Disabled)
	}
}
