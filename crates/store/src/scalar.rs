//! Scalar kinds an entry can be specialized to.
//!
//! The ten kinds are listed once in [`with_scalar_kinds!`]; every
//! per-kind enum and impl in the crate is generated from that table.

use std::fmt;
use std::sync::Arc;

use crate::accessor::{Accessors, GetFn, SetFn};

/// Invokes `$callback!` with the table of scalar kinds.
///
/// Each row names the enum variant, the Rust carrier type and the short
/// label used in diagnostics.
macro_rules! with_scalar_kinds {
	($callback:ident) => {
		$callback! {
			{ variant: S8, ty: i8, label: "s8" }
			{ variant: U8, ty: u8, label: "u8" }
			{ variant: S16, ty: i16, label: "s16" }
			{ variant: U16, ty: u16, label: "u16" }
			{ variant: S32, ty: i32, label: "s32" }
			{ variant: U32, ty: u32, label: "u32" }
			{ variant: S64, ty: i64, label: "s64" }
			{ variant: U64, ty: u64, label: "u64" }
			{ variant: Uptr, ty: usize, label: "uptr" }
			{ variant: Charp, ty: std::sync::Arc<str>, label: "charp" }
		}
	};
}

pub(crate) use with_scalar_kinds;

mod sealed {
	pub trait Sealed {}
}

/// Rust types that map onto exactly one [`ScalarType`].
///
/// Sealed: the set of kinds is closed.
pub trait Scalar: sealed::Sealed + Sized + 'static {
	/// The kind this type is carried as.
	const TYPE: ScalarType;

	/// Wraps the value in its [`Value`] variant.
	fn into_value(self) -> Value;

	/// Unwraps a [`Value`] of this kind, returning `None` for any other kind.
	fn from_value(value: Value) -> Option<Self>;

	/// Builds the accessor pair for this kind.
	fn accessors(get: Option<GetFn<Self>>, set: Option<SetFn<Self>>) -> Accessors;
}

macro_rules! define_scalars {
	($( { variant: $variant:ident, ty: $ty:ty, label: $label:literal } )*) => {
		/// Kind tag fixed on an entry at creation.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum ScalarType {
			$(
				#[doc = concat!("`", $label, "`")]
				$variant,
			)*
		}

		impl ScalarType {
			/// Every kind, in declaration order.
			pub const ALL: [ScalarType; 10] = [$( ScalarType::$variant, )*];

			/// Short diagnostic label (`"u32"`, `"charp"`, ...).
			pub const fn label(self) -> &'static str {
				match self {
					$( ScalarType::$variant => $label, )*
				}
			}

			/// Parses a diagnostic label back into a kind.
			pub fn from_label(label: &str) -> Option<Self> {
				match label {
					$( $label => Some(ScalarType::$variant), )*
					_ => None,
				}
			}
		}

		/// A scalar carried across a get or set call.
		///
		/// `Charp` shares the publisher's string; the registry never copies it.
		#[derive(Debug, Clone, PartialEq, Eq, Hash)]
		pub enum Value {
			$( $variant($ty), )*
		}

		impl Value {
			/// Returns the kind of this value.
			pub fn scalar_type(&self) -> ScalarType {
				match self {
					$( Value::$variant(_) => ScalarType::$variant, )*
				}
			}
		}

		impl fmt::Display for Value {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				match self {
					$( Value::$variant(v) => write!(f, "{v}"), )*
				}
			}
		}

		$(
			impl sealed::Sealed for $ty {}

			impl Scalar for $ty {
				const TYPE: ScalarType = ScalarType::$variant;

				fn into_value(self) -> Value {
					Value::$variant(self)
				}

				fn from_value(value: Value) -> Option<Self> {
					match value {
						Value::$variant(v) => Some(v),
						_ => None,
					}
				}

				fn accessors(get: Option<GetFn<Self>>, set: Option<SetFn<Self>>) -> Accessors {
					Accessors::$variant { get, set }
				}
			}

			impl From<$ty> for Value {
				fn from(v: $ty) -> Self {
					Value::$variant(v)
				}
			}
		)*
	};
}

with_scalar_kinds!(define_scalars);

impl fmt::Display for ScalarType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Charp(Arc::from(v))
	}
}
