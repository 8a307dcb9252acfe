//! Shared helpers for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::accessor::{Accessors, Cookie};
use crate::builder::RegistryBuilder;
use crate::entry::{EntryRef, StaticEntry};
use crate::error::Status;
use crate::folder::{DynamicEntryDef, Folder};
use crate::registry::Registry;
use crate::scalar::{ScalarType, Value};

/// Libraries in id order; `libnet` is id 3.
pub(crate) const LIBRARIES: [&str; 4] = ["libc", "libukalloc", "libvfscore", "libnet"];

/// Records every call an entry makes into module code.
#[derive(Debug, Default)]
pub(crate) struct Probe {
	pub gets: AtomicUsize,
	pub sets: AtomicUsize,
	pub cleanups: AtomicUsize,
	pub value: AtomicUsize,
}

impl Probe {
	pub fn calls(&self) -> (usize, usize, usize) {
		(
			self.gets.load(Ordering::SeqCst),
			self.sets.load(Ordering::SeqCst),
			self.cleanups.load(Ordering::SeqCst),
		)
	}
}

pub(crate) fn probe_get(cookie: &Cookie) -> Result<u32, Status> {
	let probe = cookie.downcast_ref::<Probe>().ok_or(Status(-22))?;
	probe.gets.fetch_add(1, Ordering::SeqCst);
	Ok(probe.value.load(Ordering::SeqCst) as u32)
}

pub(crate) fn probe_set(cookie: &Cookie, value: u32) -> Result<(), Status> {
	let probe = cookie.downcast_ref::<Probe>().ok_or(Status(-22))?;
	probe.sets.fetch_add(1, Ordering::SeqCst);
	probe.value.store(value as usize, Ordering::SeqCst);
	Ok(())
}

pub(crate) fn probe_cleanup(cookie: &Cookie) {
	if let Some(probe) = cookie.downcast_ref::<Probe>() {
		probe.cleanups.fetch_add(1, Ordering::SeqCst);
	}
}

pub(crate) fn const_u32(_: &Cookie) -> Result<u32, Status> {
	Ok(42)
}

fn uptime(_: &Cookie) -> Result<u64, Status> {
	Ok(1_000)
}

fn hostname(_: &Cookie) -> Result<Arc<str>, Status> {
	Ok(Arc::from("unikernel"))
}

pub(crate) static UPTIME: StaticEntry = StaticEntry::new(
	"libnet",
	"uptime",
	Accessors::U64 {
		get: Some(uptime),
		set: None,
	},
);

pub(crate) static HOSTNAME: StaticEntry = StaticEntry::new(
	"libc",
	"hostname",
	Accessors::Charp {
		get: Some(hostname),
		set: None,
	},
);

/// Registry with [`LIBRARIES`] and the fixture static entries.
pub(crate) fn registry() -> Registry {
	RegistryBuilder::new()
		.libraries(LIBRARIES)
		.entry(&UPTIME)
		.entry(&HOSTNAME)
		.build()
		.expect("fixture registry builds")
}

/// Creates a probed read/write `u32` entry and returns its probe.
pub(crate) fn probe_entry(folder: &Folder, name: &str) -> (EntryRef, Arc<Probe>) {
	let probe = Arc::new(Probe::default());
	let entry = folder
		.create_entry(
			DynamicEntryDef::new(name, Accessors::of::<u32>(Some(probe_get), Some(probe_set)))
				.with_cookie(Cookie::from_arc(Arc::clone(&probe)))
				.with_cleanup(probe_cleanup),
		)
		.expect("entry is created");
	(entry, probe)
}

/// An arbitrary value of the given kind.
pub(crate) fn sample_value(ty: ScalarType) -> Value {
	match ty {
		ScalarType::S8 => Value::S8(-8),
		ScalarType::U8 => Value::U8(8),
		ScalarType::S16 => Value::S16(-16),
		ScalarType::U16 => Value::U16(16),
		ScalarType::S32 => Value::S32(-32),
		ScalarType::U32 => Value::U32(32),
		ScalarType::S64 => Value::S64(-64),
		ScalarType::U64 => Value::U64(64),
		ScalarType::Uptr => Value::Uptr(0x1000),
		ScalarType::Charp => Value::from("sample"),
	}
}

/// Installs a trace-level test subscriber; output shows with `--nocapture`.
pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::TRACE)
		.try_init();
}
