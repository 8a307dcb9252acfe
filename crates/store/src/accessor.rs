//! Typed getter/setter pairs and the opaque context they run against.
//!
//! An entry stores one [`Accessors`] variant, so its getter and setter are
//! always specialized to the same [`ScalarType`]. Dispatch checks the kind a
//! caller asks for against that variant before either function is touched.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, Status, StoreError};
use crate::scalar::{Scalar, ScalarType, Value, with_scalar_kinds};

/// Getter for a scalar of kind `T`.
pub type GetFn<T> = fn(&Cookie) -> std::result::Result<T, Status>;

/// Setter for a scalar of kind `T`.
pub type SetFn<T> = fn(&Cookie, T) -> std::result::Result<(), Status>;

/// Invoked once with the entry's cookie when a dynamic entry is destroyed.
pub type CleanupFn = fn(&Cookie);

/// Opaque context handed to an entry's getter, setter and cleanup.
///
/// The registry only keeps the cookie alive; what it points at and how it is
/// torn down is up to the publishing module.
#[derive(Clone, Default)]
pub struct Cookie(Option<Arc<dyn Any + Send + Sync>>);

impl Cookie {
	/// The empty cookie. Static entries always run against this.
	pub const NONE: Cookie = Cookie(None);

	/// Wraps a module-owned value.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self(Some(Arc::new(value)))
	}

	/// Shares an existing allocation with the entry.
	pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
		Self(Some(value))
	}

	pub fn is_none(&self) -> bool {
		self.0.is_none()
	}

	/// Borrows the context as `T`, if that is what it holds.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.as_deref()?.downcast_ref()
	}
}

impl fmt::Debug for Cookie {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			Some(_) => f.write_str("Cookie(..)"),
			None => f.write_str("Cookie::NONE"),
		}
	}
}

macro_rules! define_accessors {
	($( { variant: $variant:ident, ty: $ty:ty, label: $label:literal } )*) => {
		/// Getter/setter pair specialized to one scalar kind.
		///
		/// Either side may be absent for read-only or write-only entries.
		#[derive(Clone, Copy)]
		pub enum Accessors {
			$(
				#[doc = concat!("Accessors for `", $label, "` entries.")]
				$variant {
					get: Option<GetFn<$ty>>,
					set: Option<SetFn<$ty>>,
				},
			)*
		}

		impl Accessors {
			/// Returns the kind both accessors are specialized to.
			pub const fn scalar_type(&self) -> ScalarType {
				match self {
					$( Accessors::$variant { .. } => ScalarType::$variant, )*
				}
			}

			pub const fn is_readable(&self) -> bool {
				match self {
					$( Accessors::$variant { get, .. } => get.is_some(), )*
				}
			}

			pub const fn is_writable(&self) -> bool {
				match self {
					$( Accessors::$variant { set, .. } => set.is_some(), )*
				}
			}

			/// Calls the getter if `requested` matches the entry's kind.
			pub(crate) fn read(
				&self,
				entry: &str,
				requested: ScalarType,
				cookie: &Cookie,
			) -> Result<Value> {
				check_kind(entry, self.scalar_type(), requested)?;
				match self {
					$(
						Accessors::$variant { get, .. } => {
							let get = get.ok_or_else(|| StoreError::NotReadable(entry.to_owned()))?;
							get(cookie).map(Value::$variant).map_err(|status| underlying(entry, status))
						}
					)*
				}
			}

			/// Calls the setter if `value` is of the entry's kind.
			pub(crate) fn write(&self, entry: &str, value: Value, cookie: &Cookie) -> Result<()> {
				match (self, value) {
					$(
						(Accessors::$variant { set, .. }, Value::$variant(v)) => {
							let set = set.ok_or_else(|| StoreError::NotWritable(entry.to_owned()))?;
							set(cookie, v).map_err(|status| underlying(entry, status))
						}
					)*
					(this, value) => Err(mismatch(entry, this.scalar_type(), value.scalar_type())),
				}
			}
		}
	};
}

with_scalar_kinds!(define_accessors);

impl Accessors {
	/// Builds the accessor pair for `T`.
	pub fn of<T: Scalar>(get: Option<GetFn<T>>, set: Option<SetFn<T>>) -> Self {
		T::accessors(get, set)
	}

	/// Read-only accessors for `T`.
	pub fn read_only<T: Scalar>(get: GetFn<T>) -> Self {
		T::accessors(Some(get), None)
	}
}

impl fmt::Debug for Accessors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Accessors")
			.field("type", &self.scalar_type())
			.field("readable", &self.is_readable())
			.field("writable", &self.is_writable())
			.finish()
	}
}

fn check_kind(entry: &str, expected: ScalarType, got: ScalarType) -> Result<()> {
	if expected == got {
		Ok(())
	} else {
		Err(mismatch(entry, expected, got))
	}
}

fn mismatch(entry: &str, expected: ScalarType, got: ScalarType) -> StoreError {
	StoreError::TypeMismatch {
		entry: entry.to_owned(),
		expected,
		got,
	}
}

fn underlying(entry: &str, status: Status) -> StoreError {
	StoreError::Underlying {
		entry: entry.to_owned(),
		status,
	}
}
