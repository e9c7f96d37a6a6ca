use std::cell::RefCell;
use std::rc::Weak;

use crate::watcher::WatcherBody;

thread_local! {
	static STACK: RefCell<Vec<Weak<WatcherBody>>> = RefCell::new(Vec::new());
}

/// The watcher currently collecting dependencies, if any.
pub(crate) fn current() -> Option<Weak<WatcherBody>> {
	STACK.with(|stack| stack.borrow().last().cloned())
}

/// Scoped occupation of the collector stack. Pushes on construction, pops
/// on drop, so a failed collection pass cannot leave itself behind and
/// passes nested inside other passes keep their attribution separate.
pub(crate) struct Collect;

impl Collect {
	pub(crate) fn begin(watcher: Weak<WatcherBody>) -> Collect {
		STACK.with(|stack| stack.borrow_mut().push(watcher));
		Collect
	}
}

impl Drop for Collect {
	fn drop(&mut self) {
		STACK.with(|stack| {
			stack.borrow_mut().pop();
		});
	}
}
