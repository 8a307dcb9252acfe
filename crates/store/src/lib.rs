//! Hierarchical introspection and configuration registry.
//!
//! Modules ("libraries") publish named, typed scalar values without knowing
//! who will read or write them. Consumers resolve a value by
//! `library / folder / entry`, get a handle, and call typed get/set through
//! it.
//!
//! # Entries
//!
//! - **Static** entries are declared at build time with [`static_entry!`],
//!   collected by the initialization phase ([`RegistryBuilder`]) and live for
//!   the whole process. They are resolved with no folder.
//! - **Dynamic** entries are created at runtime inside a [`Folder`], are
//!   reference counted, and run their cleanup once when destroyed.
//!
//! Every entry is specialized to one [`ScalarType`]; get/set with any other
//! kind fails with [`StoreError::TypeMismatch`] before module code runs.
//!
//! # Example
//!
//! ```
//! use kstore::{Accessors, Cookie, DynamicEntryDef, Folder, RegistryBuilder, ScalarType, Status};
//!
//! fn rx_packets(_: &Cookie) -> Result<u32, Status> {
//! 	Ok(42)
//! }
//!
//! let registry = RegistryBuilder::new().library("libnet").build()?;
//! let libnet = registry.library_id("libnet")?;
//!
//! let folder = Folder::allocate("eth0")?;
//! registry.add_folder(libnet, &folder)?;
//! folder
//! 	.create_entry(DynamicEntryDef::new("rx_packets", Accessors::read_only::<u32>(rx_packets)))?
//! 	.release();
//!
//! let entry = registry.resolve(libnet, Some("eth0"), "rx_packets")?;
//! assert_eq!(entry.get::<u32>()?, 42);
//! assert!(entry.get_value(ScalarType::U64).is_err());
//! entry.release();
//!
//! registry.free_folder(folder);
//! # Ok::<(), kstore::StoreError>(())
//! ```
//!
//! # Features
//!
//! - `inventory` (default): link-time collection of [`static_entry!`] and
//!   [`store_library!`] declarations into the global registry.
//! - `disabled`: [`store()`] returns the inert [`DisabledStore`] and the
//!   live global registry (`init`, `registry`) is not compiled in. Every
//!   free function then reports [`StoreError::Disabled`].

pub mod accessor;
pub mod builder;
pub mod disabled;
pub mod entry;
pub mod error;
pub mod folder;
pub mod global;
pub mod library;
#[cfg(feature = "inventory")]
pub mod registration;
pub mod registry;
pub mod scalar;
pub mod store;
mod sync;

#[cfg(test)]
pub(crate) mod test_fixtures;

#[cfg(test)]
mod invariants;

pub use accessor::{Accessors, CleanupFn, Cookie, GetFn, SetFn};
pub use builder::{Collision, DuplicatePolicy, RegistryBuilder};
pub use disabled::DisabledStore;
pub use entry::{DynamicEntry, EntryRef, StaticEntry};
pub use error::{Result, Status, StoreError};
pub use folder::{DynamicEntryDef, Folder, FreedFolder};
pub use global::{
	add_folder, allocate_folder, create_dynamic_entry, free_folder, get_folder, library_id,
	remove_folder, resolve, store,
};
#[cfg(not(feature = "disabled"))]
pub use global::{init, registry};
pub use library::LibraryId;
#[cfg(feature = "inventory")]
pub use registration::{LibraryReg, StaticEntryReg};
pub use registry::Registry;
pub use scalar::{Scalar, ScalarType, Value};
pub use store::Store;

#[doc(hidden)]
#[cfg(feature = "inventory")]
pub mod __private {
	pub use {inventory, paste};
}
