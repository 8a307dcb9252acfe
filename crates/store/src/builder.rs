//! Initialization phase: collects libraries and static entries, assigns
//! library ids and freezes the static tables.

use indexmap::map::Entry as MapEntry;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::entry::StaticEntry;
use crate::error::{Result, StoreError};
use crate::library::{Library, LibraryId, StaticTable};
use crate::registry::Registry;

/// How two static entries with the same name in one library are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
	/// Fail the build with [`StoreError::DuplicateName`].
	Reject,
	/// Keep the first declaration seen.
	#[default]
	FirstWins,
	/// Replace with the last declaration seen.
	LastWins,
}

impl DuplicatePolicy {
	/// Returns the appropriate policy based on build configuration.
	#[inline]
	pub fn for_build() -> Self {
		if cfg!(debug_assertions) {
			DuplicatePolicy::Reject
		} else {
			DuplicatePolicy::FirstWins
		}
	}
}

/// A static entry name declared more than once within a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
	pub library: &'static str,
	pub name: &'static str,
	pub policy: DuplicatePolicy,
}

/// Collects declarations and builds a [`Registry`].
///
/// Library ids are dense and follow declaration order: explicitly declared
/// libraries first, then libraries first named by a static entry.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
	libraries: Vec<&'static str>,
	entries: Vec<&'static StaticEntry>,
	policy: DuplicatePolicy,
}

impl RegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder over every `store_library!` and `static_entry!` linked into
	/// the binary, sorted by name so ids do not depend on link order.
	#[cfg(feature = "inventory")]
	pub fn from_inventory() -> Self {
		let mut builder = Self::new();
		builder.policy(DuplicatePolicy::for_build());

		let mut libraries: Vec<&'static str> = inventory::iter::<crate::registration::LibraryReg>
			.into_iter()
			.map(|reg| reg.0)
			.chain(
				inventory::iter::<crate::registration::StaticEntryReg>
					.into_iter()
					.map(|reg| reg.0.library()),
			)
			.collect();
		libraries.sort_unstable();
		libraries.dedup();
		builder.libraries = libraries;

		let mut entries: Vec<&'static StaticEntry> =
			inventory::iter::<crate::registration::StaticEntryReg>
				.into_iter()
				.map(|reg| reg.0)
				.collect();
		entries.sort_by_key(|e| (e.library(), e.name()));
		builder.entries = entries;
		builder
	}

	pub fn policy(&mut self, policy: DuplicatePolicy) -> &mut Self {
		self.policy = policy;
		self
	}

	/// Declares a library so it gets an id even without static entries.
	pub fn library(&mut self, name: &'static str) -> &mut Self {
		self.libraries.push(name);
		self
	}

	pub fn libraries<I>(&mut self, names: I) -> &mut Self
	where
		I: IntoIterator<Item = &'static str>,
	{
		self.libraries.extend(names);
		self
	}

	/// Declares a static entry; its library is declared implicitly.
	pub fn entry(&mut self, def: &'static StaticEntry) -> &mut Self {
		self.entries.push(def);
		self
	}

	pub fn entries<I>(&mut self, defs: I) -> &mut Self
	where
		I: IntoIterator<Item = &'static StaticEntry>,
	{
		self.entries.extend(defs);
		self
	}

	/// Runs the initialization phase.
	pub fn build(&self) -> Result<Registry> {
		let mut by_name: FxHashMap<&'static str, LibraryId> = FxHashMap::default();
		let mut names: Vec<&'static str> = Vec::new();
		let declared = self
			.libraries
			.iter()
			.copied()
			.chain(self.entries.iter().map(|e| e.library()));
		for name in declared {
			if by_name.contains_key(name) {
				continue;
			}
			let raw = u16::try_from(names.len())
				.map_err(|_| StoreError::InvalidLibraryId(name.to_owned()))?;
			by_name.insert(name, LibraryId::new(raw));
			names.push(name);
		}

		let mut tables: Vec<StaticTable> = names.iter().map(|_| StaticTable::default()).collect();
		let mut collisions = Vec::new();
		for &def in &self.entries {
			let id = by_name[def.library()];
			match tables[id.index()].entry(def.name()) {
				MapEntry::Vacant(slot) => {
					slot.insert(def);
				}
				MapEntry::Occupied(mut slot) => {
					if std::ptr::eq(*slot.get(), def) {
						continue;
					}
					warn!(
						library = def.library(),
						entry = def.name(),
						policy = ?self.policy,
						"duplicate static entry"
					);
					collisions.push(Collision {
						library: def.library(),
						name: def.name(),
						policy: self.policy,
					});
					match self.policy {
						DuplicatePolicy::Reject => {
							return Err(StoreError::DuplicateName(format!(
								"{}::{}",
								def.library(),
								def.name()
							)));
						}
						DuplicatePolicy::FirstWins => {}
						DuplicatePolicy::LastWins => {
							slot.insert(def);
						}
					}
				}
			}
		}

		let libraries = names
			.into_iter()
			.zip(tables)
			.enumerate()
			.map(|(idx, (name, statics))| Library::new(LibraryId::new(idx as u16), name, statics))
			.collect();

		Ok(Registry {
			libraries,
			by_name,
			collisions,
		})
	}
}
