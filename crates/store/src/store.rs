//! The operation surface shared by the live registry and the inert stub.

use crate::entry::EntryRef;
use crate::error::Result;
use crate::folder::{DynamicEntryDef, Folder, FreedFolder};
use crate::library::LibraryId;
use crate::registry::Registry;

/// Registry operations, as seen by publishers and consumers.
pub trait Store: Send + Sync {
	/// Resolves a library name to its id.
	fn library_id(&self, name: &str) -> Result<LibraryId>;

	/// Allocates a new, unlinked folder.
	fn allocate_folder(&self, name: &str) -> Result<Folder>;

	/// Links a folder into a library.
	fn add_folder(&self, library: LibraryId, folder: &Folder) -> Result<()>;

	/// Finds a linked folder by name.
	fn get_folder(&self, library: LibraryId, name: &str) -> Result<Folder>;

	/// Unlinks a folder without destroying it.
	fn remove_folder(&self, folder: &Folder) -> Result<()>;

	/// Destroys a folder and all of its entries.
	fn free_folder(&self, folder: Folder) -> FreedFolder;

	/// Creates a dynamic entry in a folder.
	fn create_dynamic_entry(&self, folder: &Folder, def: DynamicEntryDef<'_>) -> Result<EntryRef>;

	/// Resolves `library / folder / entry`; `folder = None` selects static entries.
	fn resolve(&self, library: LibraryId, folder: Option<&str>, entry: &str) -> Result<EntryRef>;
}

impl Store for Registry {
	fn library_id(&self, name: &str) -> Result<LibraryId> {
		Registry::library_id(self, name)
	}

	fn allocate_folder(&self, name: &str) -> Result<Folder> {
		Folder::allocate(name)
	}

	fn add_folder(&self, library: LibraryId, folder: &Folder) -> Result<()> {
		Registry::add_folder(self, library, folder)
	}

	fn get_folder(&self, library: LibraryId, name: &str) -> Result<Folder> {
		Registry::get_folder(self, library, name)
	}

	fn remove_folder(&self, folder: &Folder) -> Result<()> {
		Registry::remove_folder(self, folder)
	}

	fn free_folder(&self, folder: Folder) -> FreedFolder {
		Registry::free_folder(self, folder)
	}

	fn create_dynamic_entry(&self, folder: &Folder, def: DynamicEntryDef<'_>) -> Result<EntryRef> {
		folder.create_entry(def)
	}

	fn resolve(&self, library: LibraryId, folder: Option<&str>, entry: &str) -> Result<EntryRef> {
		Registry::resolve(self, library, folder, entry)
	}
}
