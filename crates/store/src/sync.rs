//! Non-sleeping mutual exclusion for registry tables.
//!
//! Registry operations may run where the caller cannot be descheduled, so
//! every table lock spins instead of parking. The lock is a `lock_api` raw
//! mutex, which gives it the same guard API as the `parking_lot` locks used
//! elsewhere.

use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::lock_api::{self, GuardSend};

/// Test-and-test-and-set spin lock.
pub struct RawSpinLock {
	locked: AtomicBool,
}

// SAFETY: `locked` is only set by a successful acquire CAS and only cleared
// by `unlock`, which the lock_api contract restricts to the current owner.
unsafe impl lock_api::RawMutex for RawSpinLock {
	#[allow(clippy::declare_interior_mutable_const)]
	const INIT: Self = Self {
		locked: AtomicBool::new(false),
	};

	type GuardMarker = GuardSend;

	fn lock(&self) {
		while !self.try_lock() {
			while self.locked.load(Ordering::Relaxed) {
				hint::spin_loop();
			}
		}
	}

	fn try_lock(&self) -> bool {
		self.locked
			.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
			.is_ok()
	}

	unsafe fn unlock(&self) {
		self.locked.store(false, Ordering::Release);
	}

	fn is_locked(&self) -> bool {
		self.locked.load(Ordering::Relaxed)
	}
}

pub type SpinMutex<T> = lock_api::Mutex<RawSpinLock, T>;

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::thread;

	use super::*;

	#[test]
	fn try_lock_fails_while_held() {
		let lock = SpinMutex::new(0u32);
		let guard = lock.lock();
		assert!(lock.try_lock().is_none());
		drop(guard);
		assert!(lock.try_lock().is_some());
	}

	#[test]
	fn contended_increments_are_not_lost() {
		let counter = Arc::new(SpinMutex::new(0usize));
		thread::scope(|s| {
			for _ in 0..8 {
				let counter = Arc::clone(&counter);
				s.spawn(move || {
					for _ in 0..1_000 {
						*counter.lock() += 1;
					}
				});
			}
		});
		assert_eq!(*counter.lock(), 8_000);
	}
}
