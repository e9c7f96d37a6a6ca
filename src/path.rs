use std::fmt;

use crate::Error;

/// A dot-separated sequence of keys naming a nested value, `"address.city"`.
/// Numeric segments index into lists.
#[derive(Clone, Debug)]
pub struct Path {
	raw: String,
	segments: Vec<String>,
}

impl Path {
	pub fn parse(expr: &str) -> Result<Path, Error> {
		if expr.is_empty() || expr.split('.').any(str::is_empty) {
			return Err(Error::Path(expr.to_string()));
		}
		Ok(Path {
			raw: expr.to_string(),
			segments: expr.split('.').map(str::to_string).collect(),
		})
	}

	pub fn segments(&self) -> &[String] {
		&self.segments
	}
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}
