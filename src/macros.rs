pub use enclose::*;

/// Build a [`Data::Record`](crate::Data) literal.
#[macro_export]
macro_rules! record {
	() => {
		$crate::Data::Record(::std::collections::BTreeMap::new())
	};
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut map = ::std::collections::BTreeMap::new();
		$(
			map.insert(::std::string::String::from($key), $crate::Data::from($value));
		)+
		$crate::Data::Record(map)
	}};
}

/// Build a [`Data::List`](crate::Data) literal.
#[macro_export]
macro_rules! list {
	($($value:expr),* $(,)?) => {
		$crate::Data::List(::std::vec![$($crate::Data::from($value)),*])
	};
}

/// Register a watcher, with `enclose`-style clone capture for the callback.
#[macro_export]
macro_rules! watch {
	($src:expr, $path:expr, ( $($d_tt:tt)* ) $v:ident => $($b:tt)*) => {
		$crate::Watcher::new($src, $path, $crate::macros::enclose!(($( $d_tt )*) move |$v: &$crate::Data| { $($b)* }))
	};
	($src:expr, $path:expr, $v:ident => $($b:tt)*) => {
		$crate::Watcher::new($src, $path, move |$v: &$crate::Data| { $($b)* })
	};
}
