//! Global session slot.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).
//! The slot stays empty until contract binding succeeds; handlers that fire
//! earlier find `None` and back off.

use std::cell::RefCell;
use std::rc::Rc;

use bb_session::Session;

thread_local! {
    static SESSION: RefCell<Option<Rc<Session>>> = RefCell::new(None);
}

pub fn set_session(session: Rc<Session>) {
    SESSION.with(|slot| *slot.borrow_mut() = Some(session));
}

pub fn session() -> Option<Rc<Session>> {
    SESSION.with(|slot| slot.borrow().clone())
}
