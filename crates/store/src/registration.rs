//! Static entry and library registration via `inventory`.
//!
//! Each `static_entry!` invocation creates a `StaticEntry` and submits it via
//! `inventory::submit!`. [`RegistryBuilder::from_inventory`] collects all
//! submissions when the global registry is initialized, so every static
//! entry is in place before the first lookup can run.
//!
//! [`RegistryBuilder::from_inventory`]: crate::RegistryBuilder::from_inventory

use crate::entry::StaticEntry;

/// Static entry registration collected via `inventory`.
pub struct StaticEntryReg(pub &'static StaticEntry);

inventory::collect!(StaticEntryReg);

/// Library declaration collected via `inventory`.
pub struct LibraryReg(pub &'static str);

inventory::collect!(LibraryReg);

/// Declares a library so it receives an id.
///
/// ```ignore
/// kstore::store_library!(libvfscore);
/// ```
#[macro_export]
macro_rules! store_library {
	($library:ident) => {
		$crate::__private::inventory::submit! {
			$crate::LibraryReg(stringify!($library))
		}
	};
}

/// Declares a static entry of `library`.
///
/// The getter and setter are plain functions over [`Cookie`](crate::Cookie);
/// static entries always run against [`Cookie::NONE`](crate::Cookie::NONE).
///
/// ```ignore
/// fn open_files(_: &Cookie) -> Result<u32, Status> { Ok(3) }
///
/// kstore::static_entry!(libvfscore, open_files: u32, get = open_files);
/// ```
#[macro_export]
macro_rules! static_entry {
	($library:ident, $name:ident : $ty:ident, get = $get:expr, set = $set:expr $(,)?) => {
		$crate::static_entry!(@def $library, $name, $ty, Some($get), Some($set));
	};
	($library:ident, $name:ident : $ty:ident, get = $get:expr $(,)?) => {
		$crate::static_entry!(@def $library, $name, $ty, Some($get), None);
	};
	($library:ident, $name:ident : $ty:ident, set = $set:expr $(,)?) => {
		$crate::static_entry!(@def $library, $name, $ty, None, Some($set));
	};
	(@def $library:ident, $name:ident, $ty:ident, $get:expr, $set:expr) => {
		$crate::__private::paste::paste! {
			#[allow(non_upper_case_globals)]
			static [<STORE_ENTRY_ $library _ $name>]: $crate::StaticEntry = $crate::StaticEntry::new(
				stringify!($library),
				stringify!($name),
				$crate::Accessors::[<$ty:camel>] { get: $get, set: $set },
			);
			$crate::__private::inventory::submit! {
				$crate::StaticEntryReg(&[<STORE_ENTRY_ $library _ $name>])
			}
		}
	};
}
