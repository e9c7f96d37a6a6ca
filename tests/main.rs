use std::cell::RefCell;
use std::rc::Rc;

use retree::{list, observe, record, watch, wrap, Data, Error, Lazy, Watcher};


use mock::Spy;

fn sample() -> Data {
	record! {
		"name" => "Ming",
		"address" => record! {
			"province" => "South",
			"city" => "A",
		},
		"nums" => list![1, 2, 3],
	}
}

#[test]
fn write_fires_watcher_once_with_new_value() {
	let tree = observe(sample());
	let mock = mock::SharedMock::new();

	mock.get()
		.expect_trigger()
		.withf(|value| *value == Data::from("B"))
		.times(1)
		.return_const(());

	let _watcher = Watcher::new(tree.clone(), "address.city", {
		let mock = mock.clone();
		move |value| mock.get().trigger(value.clone())
	})
	.unwrap();

	tree.set("address.city", Data::from("B")).unwrap();
	mock.get().checkpoint();

	// Writing the same primitive again is a silent no-op.
	mock.get().expect_trigger().times(0).return_const(());
	tree.set("address.city", Data::from("B")).unwrap();
	mock.get().checkpoint();
}

#[test]
fn sibling_branches_do_not_cross_trigger() {
	let tree = observe(record! {
		"a" => record! { "x" => 1 },
		"b" => record! { "y" => 2 },
	});
	let log = Rc::new(RefCell::new(Vec::new()));

	let _ax = watch!(tree.clone(), "a.x", (log) _value => {
		log.borrow_mut().push("a.x");
	})
	.unwrap();
	let _by = watch!(tree.clone(), "b.y", (log) _value => {
		log.borrow_mut().push("b.y");
	})
	.unwrap();

	tree.set("a.x", Data::from(10)).unwrap();
	assert_eq!(*log.borrow(), vec!["a.x"]);
}

#[test]
fn replacing_intermediate_record_refires_and_detaches() {
	let tree = observe(sample());
	let calls = Rc::new(RefCell::new(Vec::new()));

	let _watcher = watch!(tree.clone(), "address.city", (calls) value => {
		calls.borrow_mut().push(value.clone());
	})
	.unwrap();

	tree.set("address", record! { "province" => "North", "city" => "C" })
		.unwrap();
	assert_eq!(*calls.borrow(), vec![Data::from("C")]);

	// The update pass does not re-collect, so the watcher stayed
	// subscribed to the replaced record's cells and the new city is not
	// watched by it.
	tree.set("address.city", Data::from("D")).unwrap();
	assert_eq!(calls.borrow().len(), 1);

	// A watcher registered after the write sees the new cells.
	let _late = watch!(tree.clone(), "address.city", (calls) value => {
		calls.borrow_mut().push(value.clone());
	})
	.unwrap();
	tree.set("address.city", Data::from("E")).unwrap();
	assert_eq!(*calls.borrow(), vec![Data::from("C"), Data::from("E")]);
}

#[test]
fn list_mutations_notify_owner_exactly_once() {
	let tree = observe(sample());
	let count = Rc::new(RefCell::new(0));

	let _watcher = watch!(tree.clone(), "nums", (count) _value => {
		*count.borrow_mut() += 1;
	})
	.unwrap();

	let nums = tree.list("nums").unwrap();

	nums.push(Data::from(4));
	assert_eq!(*count.borrow(), 1);
	assert_eq!(nums.pop(), Some(Data::from(4)));
	assert_eq!(*count.borrow(), 2);
	assert_eq!(nums.shift(), Some(Data::from(1)));
	assert_eq!(*count.borrow(), 3);
	nums.unshift(Data::from(0));
	assert_eq!(*count.borrow(), 4);
	assert_eq!(
		nums.splice(0, 2, vec![Data::from(9)]),
		vec![Data::from(0), Data::from(2)]
	);
	assert_eq!(*count.borrow(), 5);

	// Direct index assignment is not instrumented.
	nums.set_index(0, Data::from(7));
	assert_eq!(*count.borrow(), 5);
	assert_eq!(nums.get(0), Some(Data::from(7)));
}

#[test]
fn list_notification_precedes_the_mutation() {
	let tree = observe(record! { "nums" => list![1, 2, 3] });
	let seen = Rc::new(RefCell::new(Vec::new()));

	let _watcher = watch!(tree.clone(), "nums", (seen) value => {
		seen.borrow_mut().push(value.clone());
	})
	.unwrap();

	tree.list("nums").unwrap().push(Data::from(4));
	assert_eq!(*seen.borrow(), vec![list![1, 2, 3]]);
}

#[test]
fn index_writes_through_paths_are_silent() {
	let tree = observe(sample());
	let count = Rc::new(RefCell::new(0));

	let _watcher = watch!(tree.clone(), "nums", (count) _value => {
		*count.borrow_mut() += 1;
	})
	.unwrap();

	tree.set("nums.0", Data::from(9)).unwrap();
	assert_eq!(*count.borrow(), 0);
	assert_eq!(tree.get("nums.0").unwrap(), Data::from(9));
}

#[test]
fn missing_intermediate_fails_construction() {
	let tree = observe(sample());
	let result = Watcher::new(tree.clone(), "missing.key", |_value: &Data| {});
	assert!(matches!(result, Err(Error::Expression { .. })));

	// A missing final key is not an error; it reads as null and the
	// watcher simply never fires.
	let watcher = Watcher::new(tree.clone(), "address.zip", |_value: &Data| {}).unwrap();
	assert_eq!(watcher.value(), Data::Null);
}

#[test]
fn malformed_expressions_are_rejected() {
	let tree = observe(sample());
	let empty = Watcher::new(tree.clone(), "", |_value: &Data| {});
	assert!(matches!(empty, Err(Error::Path(_))));
	assert!(matches!(tree.get("a..b"), Err(Error::Path(_))));
}

#[test]
fn torn_down_path_reads_as_null() {
	let tree = observe(sample());
	let calls = Rc::new(RefCell::new(Vec::new()));

	let _watcher = watch!(tree.clone(), "address.city", (calls) value => {
		calls.borrow_mut().push(value.clone());
	})
	.unwrap();

	tree.set("address", Data::Null).unwrap();
	assert_eq!(*calls.borrow(), vec![Data::Null]);
}

#[test]
fn fan_out_follows_registration_order() {
	let tree = observe(record! { "x" => 1 });
	let log = Rc::new(RefCell::new(Vec::new()));

	let _first = watch!(tree.clone(), "x", (log) _value => {
		log.borrow_mut().push("first");
	})
	.unwrap();
	let _second = watch!(tree.clone(), "x", (log) _value => {
		log.borrow_mut().push("second");
	})
	.unwrap();

	tree.set("x", Data::from(2)).unwrap();
	assert_eq!(*log.borrow(), vec!["first", "second"]);
}

#[test]
fn dropping_the_handle_unsubscribes() {
	let tree = observe(record! { "x" => 1 });
	let count = Rc::new(RefCell::new(0));

	let watcher = watch!(tree.clone(), "x", (count) _value => {
		*count.borrow_mut() += 1;
	})
	.unwrap();

	tree.set("x", Data::from(2)).unwrap();
	assert_eq!(*count.borrow(), 1);

	drop(watcher);
	tree.set("x", Data::from(3)).unwrap();
	assert_eq!(*count.borrow(), 1);
}

#[test]
fn eager_key_set_is_frozen_at_observation() {
	let tree = observe(sample());
	assert!(matches!(
		tree.set("address.zip", Data::from("70000")),
		Err(Error::Expression { .. })
	));
}

#[test]
fn non_record_roots_are_inert() {
	let tree = observe(list![1, 2, 3]);
	assert_eq!(tree.get("1").unwrap(), Data::from(2));
	assert!(matches!(tree.list("1"), Err(Error::NotAList { .. })));

	let scalar = observe(Data::from(5));
	assert_eq!(scalar.get("x").unwrap(), Data::Null);
}

#[test]
fn wrap_passes_primitives_through() {
	assert!(matches!(wrap(Data::from(1)), Lazy::Plain(Data::Int(1))));
	assert!(matches!(wrap(Data::Null), Lazy::Plain(Data::Null)));
	assert!(matches!(wrap(record! { "x" => 1 }), Lazy::Wrapped(_)));
	assert!(matches!(wrap(list![1]), Lazy::Wrapped(_)));
}

#[test]
fn lazy_write_fires_watcher() {
	let tree = wrap(sample());
	let mock = mock::SharedMock::new();

	mock.get()
		.expect_trigger()
		.withf(|value| *value == Data::from("B"))
		.times(1)
		.return_const(());

	let _watcher = Watcher::new(tree.clone(), "address.city", {
		let mock = mock.clone();
		move |value| mock.get().trigger(value.clone())
	})
	.unwrap();

	let address = tree.wrapped().unwrap().get("address").wrapped().unwrap();
	address.set("city", Data::from("B"));
	mock.get().checkpoint();

	// Identity-equal write through the wrapper is a no-op too.
	mock.get().expect_trigger().times(0).return_const(());
	address.set("city", Data::from("B"));
	mock.get().checkpoint();
}

#[test]
fn lazy_delete_notifies_with_null() {
	let tree = wrap(sample());
	let calls = Rc::new(RefCell::new(Vec::new()));

	let _watcher = watch!(tree.clone(), "address.city", (calls) value => {
		calls.borrow_mut().push(value.clone());
	})
	.unwrap();

	let address = tree.wrapped().unwrap().get("address").wrapped().unwrap();
	assert_eq!(address.delete("city"), Some(Data::from("A")));
	assert_eq!(*calls.borrow(), vec![Data::Null]);

	// The key is gone now; deleting again touches nothing.
	assert_eq!(address.delete("city"), None);
	assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn lazy_new_keys_become_observable_to_later_readers() {
	let tree = wrap(record! { "address" => record! { "city" => "A" } });
	let count = Rc::new(RefCell::new(0));

	let _early = watch!(tree.clone(), "address.zip", (count) _value => {
		*count.borrow_mut() += 1;
	})
	.unwrap();

	let address = tree.clone().wrapped().unwrap().get("address").wrapped().unwrap();
	address.set("zip", Data::from("70000"));
	// The early watcher never read an own `zip` key, so it was not
	// registered there and does not re-fire.
	assert_eq!(*count.borrow(), 0);

	// A watcher that reads the key once it exists is registered.
	let _late = watch!(tree.clone(), "address.zip", (count) _value => {
		*count.borrow_mut() += 1;
	})
	.unwrap();
	address.set("zip", Data::from("70001"));
	assert_eq!(*count.borrow(), 1);
}

#[test]
fn callbacks_may_register_new_watchers_mid_fanout() {
	let tree = observe(record! { "x" => 1 });
	let spawned = Rc::new(RefCell::new(Vec::new()));

	let _watcher = watch!(tree.clone(), "x", (spawned, tree) _value => {
		let inner = watch!(tree.clone(), "x", _v => {}).unwrap();
		spawned.borrow_mut().push(inner);
	})
	.unwrap();

	tree.set("x", Data::from(2)).unwrap();
	assert_eq!(spawned.borrow().len(), 1);

	// The new subscriber joins the next fan-out, not the one in flight.
	tree.set("x", Data::from(3)).unwrap();
	assert_eq!(spawned.borrow().len(), 2);
}

#[test]
fn writes_from_callbacks_chain_synchronously() {
	let tree = observe(record! { "a" => 1, "b" => 2 });
	let log = Rc::new(RefCell::new(Vec::new()));

	let _wa = watch!(tree.clone(), "a", (log, tree) _value => {
		log.borrow_mut().push("a");
		tree.set("b", Data::from(10)).unwrap();
	})
	.unwrap();
	let _wb = watch!(tree.clone(), "b", (log) _value => {
		log.borrow_mut().push("b");
	})
	.unwrap();

	tree.set("a", Data::from(5)).unwrap();
	assert_eq!(*log.borrow(), vec!["a", "b"]);
}
