use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use fxhash::FxHashMap;

use crate::collector;
use crate::data::same_value;
use crate::dep::Dep;
use crate::list::ObservedList;
use crate::path::Path;
use crate::{Access, Data, Error};

/// Eagerly instrument a plain data tree. Records become cell trees, built
/// bottom-up; any other root is left inert, reads passing through to the
/// plain value and nothing ever notifying.
pub fn observe(data: Data) -> Observed {
	let root = match data {
		Data::Record(map) => Slot::record(map),
		other => Slot::Plain(other),
	};
	Observed { root }
}

/// Handle over an eagerly observed tree, exposing the explicit get/set
/// interface that replaces in-place accessor rewriting.
#[derive(Clone)]
pub struct Observed {
	root: Slot,
}

/// Backing value of one instrumented property.
#[derive(Clone)]
pub(crate) enum Slot {
	/// An uninstrumented value: any primitive, or a composite the
	/// observer declined to instrument (non-record roots).
	Plain(Data),
	Record(Rc<RecordBody>),
	List(ObservedList),
}

pub(crate) struct RecordBody {
	/// The key set is frozen at observation time; keys added later are
	/// never observed.
	fields: FxHashMap<String, Cell>,
}

/// One instrumented property: a backing slot plus its own registry, never
/// shared with any other property.
pub(crate) struct Cell {
	dep: Rc<Dep>,
	value: RefCell<Slot>,
}

impl Cell {
	fn new(value: Data) -> Cell {
		let dep = Rc::new(Dep::new());
		let slot = Slot::build(value, &dep);
		Cell {
			dep,
			value: RefCell::new(slot),
		}
	}

	/// Read hook: a collection pass in flight registers its watcher here.
	fn get(&self) -> Slot {
		if let Some(watcher) = collector::current() {
			self.dep.add(watcher);
		}
		self.value.borrow().clone()
	}

	/// Untracked read.
	fn get_once(&self) -> Slot {
		self.value.borrow().clone()
	}

	/// Write hook: identity-equal writes are a silent no-op; anything
	/// else re-observes the value, swaps it in and notifies.
	fn set(&self, next: Data) {
		if self.value.borrow().same_value(&next) {
			return;
		}
		let slot = Slot::build(next, &self.dep);
		*self.value.borrow_mut() = slot;
		self.dep.notify();
	}
}

impl Slot {
	fn record(map: BTreeMap<String, Data>) -> Slot {
		let fields = map
			.into_iter()
			.map(|(key, value)| (key, Cell::new(value)))
			.collect();
		Slot::Record(Rc::new(RecordBody { fields }))
	}

	/// Build the slot for a property value, bottom-up. `dep` is the
	/// owning property's registry; list values bind their mutation
	/// notifications to it.
	pub(crate) fn build(value: Data, dep: &Rc<Dep>) -> Slot {
		match value {
			Data::Record(map) => Slot::record(map),
			Data::List(items) => Slot::List(ObservedList::new(items, dep.clone())),
			other => Slot::Plain(other),
		}
	}

	fn same_value(&self, next: &Data) -> bool {
		match self {
			Slot::Plain(current) => same_value(current, next),
			_ => false,
		}
	}

	/// One lookup step. Missing keys read as null and only reading out of
	/// an existing null fails, which makes a missing *intermediate* an
	/// error and a missing *final* key a null result.
	fn step(self, segment: &str, path: &Path) -> Result<Slot, Error> {
		match self {
			Slot::Record(record) => Ok(record
				.fields
				.get(segment)
				.map(Cell::get)
				.unwrap_or(Slot::Plain(Data::Null))),
			Slot::List(list) => Ok(list.slot(segment)),
			Slot::Plain(Data::Record(mut map)) => {
				Ok(Slot::Plain(map.remove(segment).unwrap_or(Data::Null)))
			}
			Slot::Plain(Data::List(items)) => Ok(Slot::Plain(index(&items, segment))),
			Slot::Plain(Data::Null) => Err(Error::expression(path, segment)),
			Slot::Plain(_) => Ok(Slot::Plain(Data::Null)),
		}
	}

	pub(crate) fn snapshot(&self) -> Data {
		match self {
			Slot::Plain(data) => data.clone(),
			Slot::Record(record) => Data::Record(
				record
					.fields
					.iter()
					.map(|(key, cell)| (key.clone(), cell.get_once().snapshot()))
					.collect(),
			),
			Slot::List(list) => list.snapshot(),
		}
	}
}

fn index(items: &[Data], segment: &str) -> Data {
	segment
		.parse::<usize>()
		.ok()
		.and_then(|i| items.get(i))
		.cloned()
		.unwrap_or(Data::Null)
}

impl Observed {
	/// Plain read of the value a path names.
	pub fn get(&self, expr: &str) -> Result<Data, Error> {
		self.resolve(&Path::parse(expr)?)
	}

	/// Write through the cell a path names. The final segment must name a
	/// key that existed at observation time; a final list index is
	/// written raw, without notifying (index writes are not
	/// instrumented).
	pub fn set(&self, expr: &str, value: Data) -> Result<(), Error> {
		let path = Path::parse(expr)?;
		let (parent, last) = self.walk_to_parent(&path)?;
		match parent {
			Slot::Record(record) => match record.fields.get(last) {
				Some(cell) => {
					cell.set(value);
					Ok(())
				}
				None => Err(Error::expression(&path, last)),
			},
			Slot::List(list) => list.write_segment(last, value, &path),
			_ => Err(Error::expression(&path, last)),
		}
	}

	/// Mutation handle for a list-valued property.
	pub fn list(&self, expr: &str) -> Result<ObservedList, Error> {
		let path = Path::parse(expr)?;
		match self.walk(&path, path.segments().len())? {
			Slot::List(list) => Ok(list),
			_ => Err(Error::NotAList {
				path: path.to_string(),
			}),
		}
	}

	fn walk(&self, path: &Path, count: usize) -> Result<Slot, Error> {
		let mut current = self.root.clone();
		for segment in &path.segments()[..count] {
			current = current.step(segment, path)?;
		}
		Ok(current)
	}

	fn walk_to_parent<'a>(&self, path: &'a Path) -> Result<(Slot, &'a str), Error> {
		let segments = path.segments();
		let parent = self.walk(path, segments.len() - 1)?;
		Ok((parent, segments[segments.len() - 1].as_str()))
	}
}

impl Access for Observed {
	fn resolve(&self, path: &Path) -> Result<Data, Error> {
		Ok(self.walk(path, path.segments().len())?.snapshot())
	}
}
