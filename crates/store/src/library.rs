//! Per-library tables: the frozen static-entry index and the folder set.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::entry::StaticEntry;
use crate::folder::Folder;
use crate::sync::SpinMutex;

/// Dense library identifier, stable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId(u16);

impl LibraryId {
	pub const fn new(raw: u16) -> Self {
		Self(raw)
	}

	pub const fn get(self) -> u16 {
		self.0
	}

	pub(crate) const fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for LibraryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

pub(crate) type StaticTable = IndexMap<&'static str, &'static StaticEntry, FxBuildHasher>;
pub(crate) type FolderMap = IndexMap<Box<str>, Folder, FxBuildHasher>;

pub(crate) struct Library {
	pub(crate) id: LibraryId,
	pub(crate) name: &'static str,
	/// Written once by the builder, read-only afterwards.
	pub(crate) statics: StaticTable,
	pub(crate) folders: SpinMutex<FolderMap>,
}

impl Library {
	pub(crate) fn new(id: LibraryId, name: &'static str, statics: StaticTable) -> Self {
		Self {
			id,
			name,
			statics,
			folders: SpinMutex::new(FolderMap::default()),
		}
	}
}

impl fmt::Debug for Library {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Library")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("statics", &self.statics.len())
			.field("folders", &self.folders.lock().len())
			.finish()
	}
}
