//! Error types for registry operations.

use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

use crate::library::LibraryId;
use crate::scalar::ScalarType;

/// Opaque status reported by a module-supplied getter or setter.
///
/// The registry never interprets the code; it is handed back to the caller
/// unchanged inside [`StoreError::Underlying`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "status {}", self.0)
	}
}

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	/// No library is known under the given id or name.
	#[error("invalid library id: {0}")]
	InvalidLibraryId(String),

	/// The library has no folder with this name.
	#[error("folder not found: {folder} in library {library}")]
	FolderNotFound {
		/// Library that was searched.
		library: LibraryId,
		/// Requested folder name.
		folder: String,
	},

	/// The scope has no entry with this name.
	#[error("entry not found: {0}")]
	EntryNotFound(String),

	/// A folder or entry with this name already exists in the scope.
	#[error("duplicate name: {0}")]
	DuplicateName(String),

	/// The requested scalar kind differs from the one the entry was created with.
	#[error("type mismatch for entry '{entry}': declared {expected}, requested {got}")]
	TypeMismatch {
		/// Entry name.
		entry: String,
		/// Kind fixed at creation.
		expected: ScalarType,
		/// Kind the caller asked for.
		got: ScalarType,
	},

	/// Memory for a name or table slot could not be reserved.
	#[error("allocation failed")]
	AllocationFailure,

	/// The module-supplied getter or setter failed.
	#[error("entry '{entry}' reported {status}")]
	Underlying {
		/// Entry name.
		entry: String,
		/// Status returned by the module.
		status: Status,
	},

	/// The entry was published without a getter.
	#[error("entry '{0}' is not readable")]
	NotReadable(String),

	/// The entry was published without a setter.
	#[error("entry '{0}' is not writable")]
	NotWritable(String),

	/// The folder has already been destroyed.
	#[error("folder '{0}' has been freed")]
	FolderFreed(String),

	/// The folder is already linked into a library.
	#[error("folder '{folder}' is already linked into library {library}")]
	FolderAlreadyLinked {
		/// Folder name.
		folder: String,
		/// Library currently owning the folder.
		library: LibraryId,
	},

	/// The folder is not linked into a library of this registry.
	#[error("folder '{0}' is not linked into this registry")]
	FolderNotLinked(String),

	/// The entry was destroyed while this handle was still held.
	#[error("entry '{0}' has been destroyed")]
	EntryRetired(String),

	/// Static entries live for the whole process and cannot be freed.
	#[error("entry '{0}' is static and cannot be freed")]
	StaticEntry(String),

	/// The store is compiled as the inert stub.
	#[error("store subsystem is disabled")]
	Disabled,
}

impl From<TryReserveError> for StoreError {
	fn from(_: TryReserveError) -> Self {
		StoreError::AllocationFailure
	}
}

impl From<indexmap::TryReserveError> for StoreError {
	fn from(_: indexmap::TryReserveError) -> Self {
		StoreError::AllocationFailure
	}
}

impl StoreError {
	/// Returns true for the lookup-miss variants.
	pub fn is_not_found(&self) -> bool {
		matches!(
			self,
			StoreError::InvalidLibraryId(_)
				| StoreError::FolderNotFound { .. }
				| StoreError::EntryNotFound(_)
		)
	}
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, StoreError>;
