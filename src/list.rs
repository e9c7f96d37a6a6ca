use std::cell::RefCell;
use std::rc::Rc;

use crate::dep::Dep;
use crate::observer::Slot;
use crate::path::Path;
use crate::{Data, Error};

/// Reactive sequence bound to the property that holds it. Mutating
/// operations notify the owning property's registry first, then apply;
/// plain reads and direct index assignment are not instrumented.
#[derive(Clone)]
pub struct ObservedList {
	body: Rc<ListBody>,
}

struct ListBody {
	items: RefCell<Vec<Slot>>,
	dep: Rc<Dep>,
}

impl ObservedList {
	pub(crate) fn new(items: Vec<Data>, dep: Rc<Dep>) -> ObservedList {
		let items = items
			.into_iter()
			.map(|item| Slot::build(item, &dep))
			.collect();
		ObservedList {
			body: Rc::new(ListBody {
				items: RefCell::new(items),
				dep,
			}),
		}
	}

	pub fn len(&self) -> usize {
		self.body.items.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.body.items.borrow().is_empty()
	}

	/// Plain element read, untracked.
	pub fn get(&self, index: usize) -> Option<Data> {
		self.body.items.borrow().get(index).map(Slot::snapshot)
	}

	pub fn push(&self, value: Data) {
		self.body.dep.notify();
		let slot = Slot::build(value, &self.body.dep);
		self.body.items.borrow_mut().push(slot);
	}

	pub fn pop(&self) -> Option<Data> {
		self.body.dep.notify();
		let removed = self.body.items.borrow_mut().pop();
		removed.map(|slot| slot.snapshot())
	}

	pub fn shift(&self) -> Option<Data> {
		self.body.dep.notify();
		let mut items = self.body.items.borrow_mut();
		if items.is_empty() {
			return None;
		}
		let removed = items.remove(0);
		Some(removed.snapshot())
	}

	pub fn unshift(&self, value: Data) {
		self.body.dep.notify();
		let slot = Slot::build(value, &self.body.dep);
		self.body.items.borrow_mut().insert(0, slot);
	}

	/// Remove `delete_count` elements at `start`, insert `insert` in
	/// their place and return the removed elements. Out-of-range
	/// arguments are clamped.
	pub fn splice(&self, start: usize, delete_count: usize, insert: Vec<Data>) -> Vec<Data> {
		self.body.dep.notify();
		let replacement: Vec<Slot> = insert
			.into_iter()
			.map(|item| Slot::build(item, &self.body.dep))
			.collect();
		let mut items = self.body.items.borrow_mut();
		let start = start.min(items.len());
		let end = (start + delete_count).min(items.len());
		items
			.splice(start..end, replacement)
			.map(|slot| slot.snapshot())
			.collect()
	}

	/// Direct index assignment. Not instrumented: no notification is
	/// sent. Writing past the end pads with nulls, as a raw index write
	/// would.
	pub fn set_index(&self, index: usize, value: Data) {
		let slot = Slot::build(value, &self.body.dep);
		let mut items = self.body.items.borrow_mut();
		while items.len() <= index {
			items.push(Slot::Plain(Data::Null));
		}
		items[index] = slot;
	}

	pub(crate) fn write_segment(
		&self,
		segment: &str,
		value: Data,
		path: &Path,
	) -> Result<(), Error> {
		match segment.parse::<usize>() {
			Ok(index) => {
				self.set_index(index, value);
				Ok(())
			}
			Err(_) => Err(Error::expression(path, segment)),
		}
	}

	/// Lookup for path resolution. Elements are not individually
	/// instrumented; the read that matters happened on the property
	/// holding this list.
	pub(crate) fn slot(&self, segment: &str) -> Slot {
		segment
			.parse::<usize>()
			.ok()
			.and_then(|index| self.body.items.borrow().get(index).cloned())
			.unwrap_or(Slot::Plain(Data::Null))
	}

	pub(crate) fn snapshot(&self) -> Data {
		Data::List(
			self.body
				.items
				.borrow()
				.iter()
				.map(Slot::snapshot)
				.collect(),
		)
	}
}
