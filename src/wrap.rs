use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashMap;

use crate::collector;
use crate::data::same_value;
use crate::dep::Dep;
use crate::path::Path;
use crate::{Access, Data, Error};

/// Lazily wrap a data tree. Primitives pass through unchanged,
/// terminating recursion; records and lists come back behind an
/// intercepting handle.
pub fn wrap(data: Data) -> Lazy {
	match data {
		Data::Record(_) | Data::List(_) => Lazy::Wrapped(Wrapped::root(data)),
		other => Lazy::Plain(other),
	}
}

/// Result of a lazy read: either a plain value or a handle to keep
/// descending through.
#[derive(Clone)]
pub enum Lazy {
	Plain(Data),
	Wrapped(Wrapped),
}

impl Lazy {
	pub fn plain(self) -> Option<Data> {
		match self {
			Lazy::Plain(data) => Some(data),
			Lazy::Wrapped(_) => None,
		}
	}

	pub fn wrapped(self) -> Option<Wrapped> {
		match self {
			Lazy::Wrapped(wrapped) => Some(wrapped),
			Lazy::Plain(_) => None,
		}
	}
}

/// Intercepting handle over one node of a wrapped tree. The underlying
/// tree keeps its plain structure; registries appear per path, on the
/// first tracked read.
#[derive(Clone)]
pub struct Wrapped {
	shared: Rc<WrapShared>,
	path: Vec<String>,
}

struct WrapShared {
	target: RefCell<Data>,
	deps: RefCell<FxHashMap<String, Rc<Dep>>>,
}

impl Wrapped {
	fn root(data: Data) -> Wrapped {
		Wrapped {
			shared: Rc::new(WrapShared {
				target: RefCell::new(data),
				deps: RefCell::new(FxHashMap::default()),
			}),
			path: Vec::new(),
		}
	}

	fn dep_key(&self, key: &str) -> String {
		if self.path.is_empty() {
			key.to_string()
		} else {
			format!("{}.{}", self.path.join("."), key)
		}
	}

	/// Intercepted read. Own keys are reactive reads: the active
	/// collector (if any) is registered under this node's path, and
	/// composites are wrapped on the way out, so nested structures are
	/// instrumented on first touch rather than up front.
	pub fn get(&self, key: &str) -> Lazy {
		let composite;
		let value;
		{
			let target = self.shared.target.borrow();
			let found = locate(&target, &self.path).and_then(|node| fetch(node, key));
			if found.is_some() {
				tracing::trace!(key, "get");
				self.track(key);
			}
			composite = matches!(found, Some(Data::Record(_)) | Some(Data::List(_)));
			value = if composite {
				Data::Null
			} else {
				found.cloned().unwrap_or(Data::Null)
			};
		}
		if composite {
			let mut path = self.path.clone();
			path.push(key.to_string());
			return Lazy::Wrapped(Wrapped {
				shared: self.shared.clone(),
				path,
			});
		}
		Lazy::Plain(value)
	}

	/// Intercepted write. Identity-equal values are a silent no-op; a
	/// brand-new key is created and becomes observable to later readers.
	pub fn set(&self, key: &str, value: Data) {
		{
			let mut target = self.shared.target.borrow_mut();
			let Some(node) = locate_mut(&mut target, &self.path) else {
				return;
			};
			match node {
				Data::Record(map) => {
					if let Some(current) = map.get(key) {
						if same_value(current, &value) {
							return;
						}
					}
					map.insert(key.to_string(), value);
				}
				Data::List(items) => {
					let Ok(index) = key.parse::<usize>() else {
						return;
					};
					if let Some(current) = items.get(index) {
						if same_value(current, &value) {
							return;
						}
					}
					while items.len() <= index {
						items.push(Data::Null);
					}
					items[index] = value;
				}
				_ => return,
			}
		}
		tracing::trace!(key, "set");
		self.notify(key);
	}

	/// Intercepted delete. Key removal is observable here, unlike the
	/// eager observer, which has no delete operation at all.
	pub fn delete(&self, key: &str) -> Option<Data> {
		let removed = {
			let mut target = self.shared.target.borrow_mut();
			let node = locate_mut(&mut target, &self.path)?;
			match node {
				Data::Record(map) => map.remove(key),
				Data::List(items) => match key.parse::<usize>() {
					Ok(index) if index < items.len() => Some(items.remove(index)),
					_ => None,
				},
				_ => None,
			}
		};
		if removed.is_some() {
			tracing::trace!(key, "delete");
			self.notify(key);
		}
		removed
	}

	/// Plain snapshot of this node.
	pub fn snapshot(&self) -> Data {
		let target = self.shared.target.borrow();
		locate(&target, &self.path).cloned().unwrap_or(Data::Null)
	}

	fn track(&self, key: &str) {
		if let Some(watcher) = collector::current() {
			let mut deps = self.shared.deps.borrow_mut();
			let dep = deps
				.entry(self.dep_key(key))
				.or_insert_with(|| Rc::new(Dep::new()));
			dep.add(watcher);
		}
	}

	fn notify(&self, key: &str) {
		let dep = self.shared.deps.borrow().get(&self.dep_key(key)).cloned();
		if let Some(dep) = dep {
			dep.notify();
		}
	}
}

fn locate<'a>(target: &'a Data, path: &[String]) -> Option<&'a Data> {
	let mut node = target;
	for segment in path {
		node = fetch(node, segment)?;
	}
	Some(node)
}

fn locate_mut<'a>(target: &'a mut Data, path: &[String]) -> Option<&'a mut Data> {
	let mut node = target;
	for segment in path {
		node = match node {
			Data::Record(map) => map.get_mut(segment)?,
			Data::List(items) => {
				let index = segment.parse::<usize>().ok()?;
				items.get_mut(index)?
			}
			_ => return None,
		};
	}
	Some(node)
}

fn fetch<'a>(node: &'a Data, key: &str) -> Option<&'a Data> {
	match node {
		Data::Record(map) => map.get(key),
		Data::List(items) => {
			let index = key.parse::<usize>().ok()?;
			items.get(index)
		}
		_ => None,
	}
}

impl Access for Wrapped {
	fn resolve(&self, path: &Path) -> Result<Data, Error> {
		let mut node = Lazy::Wrapped(self.clone());
		for segment in path.segments() {
			node = match node {
				Lazy::Wrapped(wrapped) => wrapped.get(segment),
				Lazy::Plain(Data::Null) => return Err(Error::expression(path, segment)),
				Lazy::Plain(_) => Lazy::Plain(Data::Null),
			};
		}
		Ok(match node {
			Lazy::Plain(data) => data,
			Lazy::Wrapped(wrapped) => wrapped.snapshot(),
		})
	}
}

impl Access for Lazy {
	fn resolve(&self, path: &Path) -> Result<Data, Error> {
		match self {
			Lazy::Wrapped(wrapped) => wrapped.resolve(path),
			// A passed-through root: each step reads as null, and a step
			// out of an existing null is an error.
			Lazy::Plain(data) => {
				let mut current = data.clone();
				for segment in path.segments() {
					if current == Data::Null {
						return Err(Error::expression(path, segment));
					}
					current = Data::Null;
				}
				Ok(current)
			}
		}
	}
}
