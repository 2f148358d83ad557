//! Event binding.
//!
//! Wires the three form submissions. Follows the page's boot order: the
//! candidate and vote forms accept submissions from page load, the topic
//! form is only wired once the contract handle exists.

use gloo_console::{debug, error};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use bb_session::ActionOutcome;

use crate::dom::{self, Elements};
use crate::state;
use crate::view::DomView;

/// Helper: attach an async submit handler to a form element.
macro_rules! on_submit {
    ($form:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $form
            .add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Wired at page load, before any connection exists.
pub fn bind_vote_forms(els: &Elements) {
    on_submit!(els.add_candidate_form, els, on_add_candidate);
    on_submit!(els.vote_form, els, on_cast_vote);
}

/// Wired only after contract binding succeeds.
pub fn bind_topic_form(els: &Elements) {
    on_submit!(els.vote_topic_form, els, on_submit_topic);
}

async fn on_submit_topic(els: &Elements) {
    let Some(session) = state::session() else {
        error!("vote contract is not ready yet");
        return;
    };
    let topic = dom::get_input_value(&els.vote_topic_input);
    let view = DomView::new(els.clone());
    match session.submit_topic(&topic, &view).await {
        Ok(ActionOutcome::Rejected(status)) => {
            error!(format!(
                "failed to set the vote topic, receipt status {}",
                status.0
            ));
        }
        Ok(_) => {}
        Err(err) => error!(format!("set vote topic failed: {err:#}")),
    }
}

async fn on_add_candidate(els: &Elements) {
    let Some(session) = state::session() else {
        error!("vote contract is not ready yet");
        return;
    };
    let name = dom::get_input_value(&els.new_candidate_name);
    let view = DomView::new(els.clone());
    match session.add_candidate(&name, &view).await {
        Ok(ActionOutcome::Rejected(status)) => {
            error!(format!(
                "candidate was not accepted, receipt status {}",
                status.0
            ));
        }
        Ok(_) => {}
        Err(err) => error!(format!("add candidate failed: {err:#}")),
    }
}

async fn on_cast_vote(els: &Elements) {
    let Some(session) = state::session() else {
        error!("vote contract is not ready yet");
        return;
    };
    let picked = dom::get_select_value(&els.candidates_select);
    let candidate_id: u64 = picked.parse().unwrap_or_else(|_| {
        debug!(format!("candidate selection {picked:?} is not an id, sending 0"));
        0
    });
    let view = DomView::new(els.clone());
    match session.cast_vote(candidate_id, &view).await {
        Ok(ActionOutcome::Rejected(status)) => {
            error!(format!("vote was not accepted, receipt status {}", status.0));
        }
        Ok(_) => {}
        Err(err) => error!(format!("cast vote failed: {err:#}")),
    }
}
