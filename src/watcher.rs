use std::rc::Rc;

use crate::collector::Collect;
use crate::path::Path;
use crate::{Access, Data, Error};

/// One computation: a data root, a path expression and a callback, re-run
/// whenever a property the path read is written. Registries hold the
/// watcher weakly; dropping the handle unsubscribes it.
pub struct Watcher {
	body: Rc<WatcherBody>,
}

pub(crate) struct WatcherBody {
	source: Box<dyn Access>,
	path: Path,
	callback: Box<dyn Fn(&Data)>,
}

impl Watcher {
	pub fn new(
		source: impl Access + 'static,
		expr: &str,
		callback: impl Fn(&Data) + 'static,
	) -> Result<Watcher, Error> {
		let path = Path::parse(expr)?;
		let body = Rc::new(WatcherBody {
			source: Box::new(source),
			path,
			callback: Box::new(callback),
		});

		// The one collection pass: every read below is attributed to this
		// watcher. The guard pops the stack even when resolution fails.
		{
			let _collect = Collect::begin(Rc::downgrade(&body));
			body.source.resolve(&body.path)?;
		}

		Ok(Watcher { body })
	}

	/// Current value of the watched expression, untracked.
	pub fn value(&self) -> Data {
		self.body
			.source
			.resolve(&self.body.path)
			.unwrap_or(Data::Null)
	}
}

impl WatcherBody {
	/// Re-evaluate and fire. Runs with no collection pass active: this
	/// read must not be attributed to anyone, and a path torn down since
	/// registration reads as null instead of failing the fan-out.
	pub(crate) fn update(&self) {
		let value = self.source.resolve(&self.path).unwrap_or(Data::Null);
		(self.callback)(&value);
	}
}
