use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::watcher::WatcherBody;

/// Per-property subscriber list. Order follows registration and duplicates
/// are kept; a watcher that read the same property twice in one pass is
/// updated twice per write.
pub(crate) struct Dep {
	watchers: RefCell<SmallVec<[Weak<WatcherBody>; 2]>>,
}

impl Dep {
	pub(crate) fn new() -> Dep {
		Dep {
			watchers: RefCell::new(SmallVec::new()),
		}
	}

	pub(crate) fn add(&self, watcher: Weak<WatcherBody>) {
		self.watchers.borrow_mut().push(watcher);
	}

	pub(crate) fn notify(&self) {
		// Collect strong handles and release the borrow before running
		// updates: a callback may read this property again or register
		// new watchers into this registry.
		let live: SmallVec<[Rc<WatcherBody>; 2]> = {
			let mut watchers = self.watchers.borrow_mut();
			watchers.retain(|watcher| watcher.strong_count() > 0);
			watchers.iter().filter_map(Weak::upgrade).collect()
		};
		tracing::trace!(watchers = live.len(), "notify");
		for watcher in live {
			watcher.update();
		}
	}
}
