//! BallotBeam browser front end.
//!
//! Pure Rust + WASM rendition of the ballot page. Each concern lives in its
//! own module: DOM bindings, transports, the view, and event wiring.

// Everything here drives a live page; off the wasm target the crate is empty.
#![cfg(target_arch = "wasm32")]

pub mod dom;
pub mod eth;
pub mod events;
pub mod state;
pub mod view;

use std::rc::Rc;

use gloo_console::error;
use wasm_bindgen::prelude::*;

use bb_contract::ContractArtifact;
use bb_session::Session;
use bb_types::NetworkId;

/// Where the contract build artifact is served from.
const ARTIFACT_URL: &str = "Vote.json";

/// Network id the local dev chain registers deployments under.
const DEV_NETWORK_ID: &str = "5777";

/// WASM entry point, called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

/// Main initialisation sequence.
///
/// Any failure up to contract binding leaves the page on the loading
/// indicator; the error surfaces in the browser console.
async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    // Candidate and vote forms take submissions from page load onward.
    events::bind_vote_forms(&els);

    let connection = eth::bootstrap().await.map_err(to_js)?;

    let raw = eth::fetch_text(ARTIFACT_URL).await.map_err(JsValue::from)?;
    let artifact = ContractArtifact::from_json(&raw).map_err(to_js)?;

    let session = Rc::new(
        Session::bind(connection, &artifact, &NetworkId(DEV_NETWORK_ID.to_owned()))
            .map_err(to_js)?,
    );
    state::set_session(session.clone());

    // The topic form only works against a bound handle.
    events::bind_topic_form(&els);

    let view = view::DomView::new(els.clone());
    if let Err(err) = session.render(&view).await {
        error!(format!("initial render failed: {err:#}"));
    }

    Ok(())
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
