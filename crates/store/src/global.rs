//! Process-wide registry instance and free-function facade.
//!
//! Every facade function goes through [`store()`]. With the `disabled`
//! feature the live registry is not compiled in at all, so nothing here can
//! reach it.

#[cfg(not(feature = "disabled"))]
use std::sync::OnceLock;

#[cfg(not(feature = "disabled"))]
use tracing::{debug, error};

use crate::accessor::{Accessors, CleanupFn, Cookie};
#[cfg(not(feature = "disabled"))]
use crate::builder::{DuplicatePolicy, RegistryBuilder};
use crate::entry::EntryRef;
use crate::error::Result;
use crate::folder::{DynamicEntryDef, Folder, FreedFolder};
use crate::library::LibraryId;
#[cfg(not(feature = "disabled"))]
use crate::registry::Registry;
use crate::store::Store;

#[cfg(not(feature = "disabled"))]
static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Runs the initialization phase if it has not run yet.
///
/// Every accessor below goes through here, so no lookup can observe a
/// partially populated static table. Calling it early from startup code
/// just moves the cost out of the first lookup.
#[cfg(not(feature = "disabled"))]
pub fn init() -> &'static Registry {
	REGISTRY.get_or_init(build)
}

/// The global registry.
#[cfg(not(feature = "disabled"))]
pub fn registry() -> &'static Registry {
	init()
}

#[cfg(not(feature = "disabled"))]
fn build() -> Registry {
	#[cfg(feature = "inventory")]
	let mut builder = RegistryBuilder::from_inventory();
	#[cfg(not(feature = "inventory"))]
	let mut builder = RegistryBuilder::new();

	match builder.build() {
		Ok(registry) => {
			debug!(libraries = registry.len(), "store registry initialized");
			registry
		}
		Err(err) => {
			error!(%err, "static entry registration failed; keeping first declarations");
			builder
				.policy(DuplicatePolicy::FirstWins)
				.build()
				.unwrap_or_else(|_| Registry::empty())
		}
	}
}

/// The store the rest of the image talks to.
///
/// With the `disabled` feature this is the inert stub.
pub fn store() -> &'static dyn Store {
	#[cfg(not(feature = "disabled"))]
	{
		registry()
	}
	#[cfg(feature = "disabled")]
	{
		&crate::disabled::DisabledStore
	}
}

/// Resolves a library name to its id.
pub fn library_id(name: &str) -> Result<LibraryId> {
	store().library_id(name)
}

pub fn allocate_folder(name: &str) -> Result<Folder> {
	store().allocate_folder(name)
}

pub fn add_folder(library: LibraryId, folder: &Folder) -> Result<()> {
	store().add_folder(library, folder)
}

pub fn get_folder(library: LibraryId, name: &str) -> Result<Folder> {
	store().get_folder(library, name)
}

pub fn remove_folder(folder: &Folder) -> Result<()> {
	store().remove_folder(folder)
}

pub fn free_folder(folder: Folder) -> FreedFolder {
	store().free_folder(folder)
}

/// Creates a dynamic entry in `folder`.
pub fn create_dynamic_entry(
	folder: &Folder,
	name: &str,
	accessors: Accessors,
	cookie: Cookie,
	cleanup: Option<CleanupFn>,
) -> Result<EntryRef> {
	store().create_dynamic_entry(
		folder,
		DynamicEntryDef {
			name,
			accessors,
			cookie,
			cleanup,
		},
	)
}

/// Resolves `library / folder / entry` in the global store.
pub fn resolve(library: LibraryId, folder: Option<&str>, entry: &str) -> Result<EntryRef> {
	store().resolve(library, folder, entry)
}
