#![allow(dead_code)]

use std::sync::atomic::Ordering;

use crate::accessor::Accessors;
use crate::error::StoreError;
use crate::folder::{DynamicEntryDef, Folder};
use crate::library::LibraryId;
use crate::scalar::ScalarType;
use crate::test_fixtures::{const_u32, probe_entry, registry, sample_value};

const LIBNET: LibraryId = LibraryId::new(3);

/// Invariant: a dynamic entry MUST stay alive while any reference to it is held.
///
/// Unlinking the folder does not destroy entries; only the last release does.
pub(crate) fn inv_held_reference_pins_entry() {
	let registry = registry();
	let folder = Folder::allocate("net").unwrap();
	registry.add_folder(LIBNET, &folder).unwrap();
	let (created, probe) = probe_entry(&folder, "rx");
	created.release();

	let held = registry.resolve(LIBNET, Some("net"), "rx").unwrap();
	registry.remove_folder(&folder).unwrap();
	drop(folder);

	assert_eq!(probe.cleanups.load(Ordering::SeqCst), 0);
	held.set(9u32).unwrap();
	assert_eq!(held.get::<u32>(), Ok(9));
	assert_eq!(held.refcount(), Some(1));

	held.release();
	assert_eq!(
		probe.cleanups.load(Ordering::SeqCst),
		1,
		"last release should destroy the entry"
	);
}

#[cfg_attr(test, test)]
pub(crate) fn test_held_reference_pins_entry() {
	inv_held_reference_pins_entry()
}

/// Invariant: cleanup MUST run exactly once per dynamic entry.
///
/// Holds across every destruction path: free_folder, force_free, last release,
/// and combinations of them.
pub(crate) fn inv_cleanup_runs_once() {
	let registry = registry();
	let folder = Folder::allocate("net").unwrap();
	registry.add_folder(LIBNET, &folder).unwrap();

	let (forced, forced_probe) = probe_entry(&folder, "forced");
	let (held, held_probe) = probe_entry(&folder, "held");
	let (_, plain_probe) = probe_entry(&folder, "plain");

	let forced_again = registry.resolve(LIBNET, Some("net"), "forced").unwrap();
	forced.force_free().unwrap();
	assert_eq!(folder.entry_names(), vec!["held", "plain"]);

	let witness = folder.clone();
	let freed = registry.free_folder(folder);
	assert_eq!(freed.destroyed_entries(), 2);
	registry.free_folder(witness);

	forced_again.release();
	held.release();

	for probe in [&forced_probe, &held_probe, &plain_probe] {
		assert_eq!(probe.cleanups.load(Ordering::SeqCst), 1);
	}
}

#[cfg_attr(test, test)]
pub(crate) fn test_cleanup_runs_once() {
	inv_cleanup_runs_once()
}

/// Invariant: a kind mismatch MUST be reported before any module code runs.
pub(crate) fn inv_mismatch_never_dispatches() {
	let registry = registry();
	let folder = Folder::allocate("net").unwrap();
	registry.add_folder(LIBNET, &folder).unwrap();
	let (entry, probe) = probe_entry(&folder, "rx");

	for ty in ScalarType::ALL.into_iter().filter(|ty| *ty != ScalarType::U32) {
		let read = entry.get_value(ty).unwrap_err();
		assert_eq!(
			read,
			StoreError::TypeMismatch {
				entry: "rx".into(),
				expected: ScalarType::U32,
				got: ty,
			}
		);
		let write = entry.set_value(sample_value(ty)).unwrap_err();
		assert!(matches!(write, StoreError::TypeMismatch { .. }), "{ty}: {write}");
	}

	assert_eq!(probe.calls(), (0, 0, 0));
	entry.release();
}

#[cfg_attr(test, test)]
pub(crate) fn test_mismatch_never_dispatches() {
	inv_mismatch_never_dispatches()
}

/// Invariant: names MUST be unique within their scope.
///
/// Folder names are unique per library, entry names per folder, and the same
/// name may be reused across scopes.
pub(crate) fn inv_names_unique_per_scope() {
	let registry = registry();
	let eth0 = Folder::allocate("eth0").unwrap();
	let eth1 = Folder::allocate("eth1").unwrap();
	registry.add_folder(LIBNET, &eth0).unwrap();
	registry.add_folder(LIBNET, &eth1).unwrap();

	let def = || DynamicEntryDef::new("rx", Accessors::read_only::<u32>(const_u32));
	eth0.create_entry(def()).unwrap().release();
	eth1.create_entry(def()).unwrap().release();
	assert_eq!(
		eth0.create_entry(def()).unwrap_err(),
		StoreError::DuplicateName("eth0/rx".into())
	);

	let impostor = Folder::allocate("eth0").unwrap();
	assert!(matches!(
		registry.add_folder(LIBNET, &impostor),
		Err(StoreError::DuplicateName(_))
	));
	assert!(
		registry
			.get_folder(LIBNET, "eth0")
			.unwrap()
			.ptr_eq(&eth0)
	);
}

#[cfg_attr(test, test)]
pub(crate) fn test_names_unique_per_scope() {
	inv_names_unique_per_scope()
}

/// Invariant: static entries MUST NOT be reference counted or destroyed.
pub(crate) fn inv_static_entries_are_permanent() {
	let registry = registry();
	for _ in 0..3 {
		let uptime = registry.resolve(LIBNET, None, "uptime").unwrap();
		assert_eq!(uptime.refcount(), None);
		uptime.release();
	}
	let uptime = registry.resolve(LIBNET, None, "uptime").unwrap();
	assert!(uptime.force_free().is_err());
	assert_eq!(
		registry
			.resolve(LIBNET, None, "uptime")
			.unwrap()
			.get::<u64>(),
		Ok(1_000)
	);
}

#[cfg_attr(test, test)]
pub(crate) fn test_static_entries_are_permanent() {
	inv_static_entries_are_permanent()
}
