//! DOM-backed implementation of the session's view port.
//!
//! Mirrors the page layout: candidate rows land in the results table and the
//! ballot selector in the same pass.

use bb_session::View;
use bb_types::{Address, Candidate};

use crate::dom::{self, Elements};

pub struct DomView {
    els: Elements,
}

impl DomView {
    pub fn new(els: Elements) -> Self {
        Self { els }
    }
}

impl View for DomView {
    fn show_loading(&self) {
        dom::show(&self.els.loader);
        dom::hide(&self.els.content);
    }

    fn show_content(&self) {
        dom::hide(&self.els.loader);
        dom::show(&self.els.content);
    }

    fn set_account(&self, account: &Address) {
        dom::set_inner_html(
            &self.els.account_address,
            &format!(
                "<span id='accountTag'>Account:</span> <span id='myAccount'>{}</span>",
                account.0
            ),
        );
    }

    fn set_topic(&self, topic: &str) {
        dom::set_text(&self.els.topic_tag, topic);
    }

    fn append_candidate(&self, candidate: &Candidate) {
        let row = dom::create_element("tr");
        dom::set_inner_html(
            &row,
            &format!(
                "<td>{}</td><td>{}</td><td>{}</td>",
                candidate.id, candidate.name, candidate.vote_count
            ),
        );
        let _ = self.els.candidates_results.append_child(&row);

        let option = dom::create_option(&candidate.id.to_string(), &candidate.name);
        let _ = self.els.candidates_select.append_child(&option);
    }

    fn show_voted_notice(&self) {
        // The page hides every form on the ballot, not just the vote form.
        for form in dom::query_all("form") {
            dom::hide(&form);
        }
        dom::show(&self.els.vote_status);
    }
}
