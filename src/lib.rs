pub mod macros;

mod collector;
mod data;
mod dep;
mod list;
mod observer;
mod path;
mod watcher;
mod wrap;

pub use data::Data;
pub use list::ObservedList;
pub use observer::{observe, Observed};
pub use path::Path;
pub use watcher::Watcher;
pub use wrap::{wrap, Lazy, Wrapped};

/// A data root that watchers can resolve path expressions against.
pub trait Access {
	/// Walk `path` and return a plain snapshot of the value it names.
	///
	/// Every record-field lookup along the way is a reactive read: while a
	/// collection pass is active, the reading watcher is registered into
	/// that field's dependency registry. A missing final key reads as
	/// [`Data::Null`]; traversing *through* a missing value is an
	/// [`Error::Expression`].
	fn resolve(&self, path: &Path) -> Result<Data, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The expression itself is malformed: empty, or an empty segment as
	/// in `"a..b"`.
	#[error("invalid path expression `{0}`")]
	Path(String),
	/// Resolution tried to read `segment` out of a missing value.
	#[error("cannot resolve `{path}`: nothing to read `{segment}` from")]
	Expression { path: String, segment: String },
	#[error("`{path}` does not hold a list")]
	NotAList { path: String },
}

impl Error {
	pub(crate) fn expression(path: &Path, segment: &str) -> Error {
		Error::Expression {
			path: path.to_string(),
			segment: segment.to_string(),
		}
	}
}
