use bb_types::{Address, Candidate};

/// Output port the session renders through. The browser build backs this with
/// the live DOM, tests record the calls instead.
pub trait View {
    /// Swap the page over to the loading indicator.
    fn show_loading(&self);
    /// Swap the loading indicator out for the rendered page.
    fn show_content(&self);
    fn set_account(&self, account: &Address);
    fn set_topic(&self, topic: &str);
    /// Append one candidate to the results table and the ballot selector.
    fn append_candidate(&self, candidate: &Candidate);
    /// Hide the submission forms and surface the already-voted notice.
    fn show_voted_notice(&self);
}
