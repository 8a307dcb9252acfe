use std::sync::atomic::Ordering;
use std::thread;

use pretty_assertions::assert_eq;

use super::*;
use crate::test_fixtures::{const_u32, probe_entry};

fn answer() -> Accessors {
	Accessors::read_only::<u32>(const_u32)
}

#[test]
fn allocate_starts_empty_and_unlinked() {
	let folder = Folder::allocate("net").unwrap();
	assert_eq!(folder.name(), "net");
	assert!(folder.is_empty());
	assert_eq!(folder.library(), None);
	assert!(!folder.is_freed());
}

#[test]
fn duplicate_entry_name_is_rejected() {
	let folder = Folder::allocate("net").unwrap();
	folder
		.create_entry(DynamicEntryDef::new("rx", answer()))
		.unwrap()
		.release();

	let err = folder
		.create_entry(DynamicEntryDef::new("rx", answer()))
		.unwrap_err();
	assert_eq!(err, StoreError::DuplicateName("net/rx".into()));
	assert_eq!(folder.len(), 1);
}

#[test]
fn creation_returns_a_second_reference() {
	let folder = Folder::allocate("net").unwrap();
	let (entry, _probe) = probe_entry(&folder, "rx");
	assert_eq!(entry.refcount(), Some(2));
	assert!(!entry.is_static());
	assert_eq!(entry.scalar_type(), crate::ScalarType::U32);
}

#[test]
fn entries_keep_creation_order() {
	let folder = Folder::allocate("net").unwrap();
	for name in ["tx", "rx", "drops"] {
		folder
			.create_entry(DynamicEntryDef {
				name,
				accessors: answer(),
				cookie: Cookie::NONE,
				cleanup: None,
			})
			.unwrap()
			.release();
	}
	assert_eq!(folder.entry_names(), vec!["tx", "rx", "drops"]);
}

#[test]
fn force_free_unlinks_and_cleans_up_once() {
	let folder = Folder::allocate("net").unwrap();
	let (created, probe) = probe_entry(&folder, "rx");
	let other = folder.entry("rx").unwrap();

	created.force_free().unwrap();
	assert!(folder.is_empty());
	assert_eq!(probe.cleanups.load(Ordering::SeqCst), 1);

	assert!(other.is_retired());
	assert_eq!(
		other.get::<u32>().unwrap_err(),
		StoreError::EntryRetired("rx".into())
	);
	other.release();
	assert_eq!(probe.cleanups.load(Ordering::SeqCst), 1);
}

#[test]
fn freed_folder_refuses_new_entries() {
	let registry = crate::test_fixtures::registry();
	let folder = Folder::allocate("net").unwrap();
	let witness = folder.clone();
	registry.free_folder(folder);

	assert!(witness.is_freed());
	assert_eq!(
		witness
			.create_entry(DynamicEntryDef::new("rx", answer()))
			.unwrap_err(),
		StoreError::FolderFreed("net".into())
	);
}

#[test]
fn dropping_last_folder_handle_cleans_up_entries() {
	let folder = Folder::allocate("scratch").unwrap();
	let (entry, probe) = probe_entry(&folder, "rx");
	entry.release();
	assert_eq!(probe.cleanups.load(Ordering::SeqCst), 0);

	drop(folder);
	assert_eq!(probe.cleanups.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_creation_loses_nothing() {
	const THREADS: usize = 8;
	const PER_THREAD: usize = 64;

	let registry = crate::test_fixtures::registry();
	let libnet = LibraryId::new(3);
	let folder = Folder::allocate("stress").unwrap();
	registry.add_folder(libnet, &folder).unwrap();
	thread::scope(|s| {
		for t in 0..THREADS {
			let folder = folder.clone();
			s.spawn(move || {
				for i in 0..PER_THREAD {
					let name = format!("t{t}_e{i}");
					folder
						.create_entry(DynamicEntryDef::new(&name, answer()))
						.unwrap()
						.release();
				}
			});
		}
	});

	assert_eq!(folder.len(), THREADS * PER_THREAD);
	for t in 0..THREADS {
		for i in 0..PER_THREAD {
			let name = format!("t{t}_e{i}");
			let entry = registry.resolve(libnet, Some("stress"), &name).unwrap();
			assert_eq!(entry.name(), name);
			assert_eq!(entry.get::<u32>().unwrap(), 42);
			assert_eq!(entry.refcount(), Some(2));
			entry.release();
		}
	}
}
