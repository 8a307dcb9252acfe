//! Static and dynamic entries and the handle consumers hold.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tracing::{trace, warn};

use crate::accessor::{Accessors, CleanupFn, Cookie};
use crate::error::{Result, StoreError};
use crate::folder::FolderInner;
use crate::scalar::{Scalar, ScalarType, Value};

/// Entry declared at build time; lives for the whole process.
///
/// Static entries have no cookie and no cleanup, and are never destroyed.
pub struct StaticEntry {
	library: &'static str,
	name: &'static str,
	accessors: Accessors,
}

impl StaticEntry {
	pub const fn new(library: &'static str, name: &'static str, accessors: Accessors) -> Self {
		Self {
			library,
			name,
			accessors,
		}
	}

	pub const fn library(&self) -> &'static str {
		self.library
	}

	pub const fn name(&self) -> &'static str {
		self.name
	}

	pub const fn accessors(&self) -> &Accessors {
		&self.accessors
	}
}

impl fmt::Debug for StaticEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StaticEntry")
			.field("library", &self.library)
			.field("name", &self.name)
			.field("type", &self.accessors.scalar_type())
			.finish()
	}
}

/// Runtime-allocated entry owned by a folder.
///
/// The folder's own reference is one strong count; every resolved handle is
/// another. Cleanup runs exactly once, either when the entry is retired by
/// its folder or when the last reference goes away, whichever comes first.
pub struct DynamicEntry {
	name: Box<str>,
	accessors: Accessors,
	cookie: Cookie,
	cleanup: Option<CleanupFn>,
	retired: AtomicBool,
	folder: Weak<FolderInner>,
}

impl DynamicEntry {
	pub(crate) fn new(
		name: Box<str>,
		accessors: Accessors,
		cookie: Cookie,
		cleanup: Option<CleanupFn>,
		folder: Weak<FolderInner>,
	) -> Self {
		Self {
			name,
			accessors,
			cookie,
			cleanup,
			retired: AtomicBool::new(false),
			folder,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn accessors(&self) -> &Accessors {
		&self.accessors
	}

	pub fn is_retired(&self) -> bool {
		self.retired.load(Ordering::Acquire)
	}

	/// Marks the entry destroyed and runs its cleanup.
	///
	/// Returns false if the entry was already retired.
	pub(crate) fn retire(&self) -> bool {
		if self.retired.swap(true, Ordering::AcqRel) {
			return false;
		}
		if let Some(cleanup) = self.cleanup {
			cleanup(&self.cookie);
		}
		trace!(entry = %self.name, "dynamic entry destroyed");
		true
	}

	fn ensure_live(&self) -> Result<()> {
		if self.is_retired() {
			Err(StoreError::EntryRetired(self.name.to_string()))
		} else {
			Ok(())
		}
	}
}

impl Drop for DynamicEntry {
	fn drop(&mut self) {
		self.retire();
	}
}

impl fmt::Debug for DynamicEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DynamicEntry")
			.field("name", &self.name)
			.field("type", &self.accessors.scalar_type())
			.field("retired", &self.is_retired())
			.finish()
	}
}

/// Handle to a resolved entry.
///
/// Not `Clone`: every handle to a dynamic entry corresponds to one
/// acquisition, and [`EntryRef::release`] consumes it.
pub enum EntryRef {
	/// Process-lifetime entry; holding it costs nothing.
	Static(&'static StaticEntry),
	/// Reference-counted entry owned by a folder.
	Dynamic(Arc<DynamicEntry>),
}

impl EntryRef {
	pub fn name(&self) -> &str {
		match self {
			EntryRef::Static(e) => e.name,
			EntryRef::Dynamic(e) => &e.name,
		}
	}

	pub fn scalar_type(&self) -> ScalarType {
		self.accessors().scalar_type()
	}

	pub fn is_static(&self) -> bool {
		matches!(self, EntryRef::Static(_))
	}

	/// Returns true once the entry has been destroyed under this handle.
	pub fn is_retired(&self) -> bool {
		match self {
			EntryRef::Static(_) => false,
			EntryRef::Dynamic(e) => e.is_retired(),
		}
	}

	/// Outstanding references, including the owning folder's.
	///
	/// `None` for static entries, which are not reference counted.
	pub fn refcount(&self) -> Option<usize> {
		match self {
			EntryRef::Static(_) => None,
			EntryRef::Dynamic(e) => Some(Arc::strong_count(e)),
		}
	}

	fn accessors(&self) -> &Accessors {
		match self {
			EntryRef::Static(e) => &e.accessors,
			EntryRef::Dynamic(e) => &e.accessors,
		}
	}

	/// Reads the entry as `requested`.
	///
	/// Fails with [`StoreError::TypeMismatch`] without calling the getter if
	/// `requested` is not the entry's kind.
	pub fn get_value(&self, requested: ScalarType) -> Result<Value> {
		match self {
			EntryRef::Static(e) => e.accessors.read(e.name, requested, &Cookie::NONE),
			EntryRef::Dynamic(e) => {
				e.ensure_live()?;
				e.accessors.read(&e.name, requested, &e.cookie)
			}
		}
	}

	/// Writes `value`, whose variant is the requested kind.
	pub fn set_value(&self, value: impl Into<Value>) -> Result<()> {
		let value = value.into();
		match self {
			EntryRef::Static(e) => e.accessors.write(e.name, value, &Cookie::NONE),
			EntryRef::Dynamic(e) => {
				e.ensure_live()?;
				e.accessors.write(&e.name, value, &e.cookie)
			}
		}
	}

	/// Typed read.
	pub fn get<T: Scalar>(&self) -> Result<T> {
		let value = self.get_value(T::TYPE)?;
		let got = value.scalar_type();
		T::from_value(value).ok_or_else(|| StoreError::TypeMismatch {
			entry: self.name().to_owned(),
			expected: T::TYPE,
			got,
		})
	}

	/// Typed write.
	pub fn set<T: Scalar>(&self, value: T) -> Result<()> {
		self.set_value(value.into_value())
	}

	/// Gives the reference back.
	///
	/// Dropping the handle is equivalent; this spelling makes the end of the
	/// acquisition explicit at call sites.
	pub fn release(self) {
		match self {
			EntryRef::Static(_) => {}
			EntryRef::Dynamic(entry) => {
				trace!(entry = %entry.name, refs = Arc::strong_count(&entry) - 1, "release");
				if let Some(last) = Arc::into_inner(entry) {
					trace!(entry = %last.name, "last reference released");
				}
			}
		}
	}

	/// Destroys the entry regardless of outstanding references.
	///
	/// The entry is unlinked from its folder and its cleanup runs now. Other
	/// handles stay memory-safe but report [`StoreError::EntryRetired`].
	/// Static entries cannot be freed.
	pub fn force_free(self) -> Result<()> {
		match self {
			EntryRef::Static(e) => {
				warn!(library = e.library, entry = e.name, "attempt to free a static entry");
				Err(StoreError::StaticEntry(e.name.to_owned()))
			}
			EntryRef::Dynamic(entry) => {
				if let Some(folder) = entry.folder.upgrade() {
					folder.unlink_entry(&entry);
				}
				entry.retire();
				Ok(())
			}
		}
	}
}

impl fmt::Debug for EntryRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntryRef::Static(e) => f.debug_tuple("EntryRef::Static").field(e).finish(),
			EntryRef::Dynamic(e) => f
				.debug_tuple("EntryRef::Dynamic")
				.field(e)
				.field(&Arc::strong_count(e))
				.finish(),
		}
	}
}
