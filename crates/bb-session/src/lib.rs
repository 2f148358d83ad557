use anyhow::{Context, Result};
use bb_contract::{ContractArtifact, ContractError, VotingContract};
use bb_provider::Provider;
use bb_types::{Address, Candidate, NetworkId, ReceiptStatus};
use futures::future::try_join_all;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, error};

mod view;

pub use view::View;

/// Provider transport plus the account it resolved at bootstrap, if any.
pub struct Connection {
    pub provider: Arc<dyn Provider>,
    pub account: Option<Address>,
}

/// How transaction receipts gate the follow-up page refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Historical behavior, one quirk per action: topic updates check the
    /// receipt, candidate additions refresh unconditionally, and casting a
    /// vote only parks the page on the loading indicator.
    #[default]
    Faithful,
    /// Every write checks the receipt and refreshes only once confirmed.
    Unified,
}

/// What an action did to the page once its transaction resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The page was re-rendered from chain state.
    Refreshed,
    /// The receipt carried a non-success status and the page was left as-is.
    Rejected(ReceiptStatus),
    /// The transaction went out and the page is parked on the loading
    /// indicator until something else triggers a refresh.
    Pending,
}

#[derive(Debug)]
struct SessionState {
    account: Address,
    has_voted: bool,
    candidates: Vec<Candidate>,
}

/// One page's standing against the voting contract: the bound handle, the
/// resolved account, and what has already been rendered.
///
/// Methods take `&self` so overlapping renders interleave instead of
/// fighting over a mutable borrow. State is only touched between reads,
/// never across an await.
pub struct Session {
    provider: Arc<dyn Provider>,
    contract: VotingContract,
    policy: WritePolicy,
    state: RefCell<SessionState>,
}

impl Session {
    /// Binds the deployed contract for `network` and seeds the account label
    /// with whatever the bootstrap handed over. Everything else waits for the
    /// first render.
    pub fn bind(
        connection: Connection,
        artifact: &ContractArtifact,
        network: &NetworkId,
    ) -> Result<Self, ContractError> {
        let Connection { provider, account } = connection;
        let contract = VotingContract::bind(artifact, provider.clone(), network)?;
        Ok(Self {
            provider,
            contract,
            policy: WritePolicy::default(),
            state: RefCell::new(SessionState {
                account: account.unwrap_or_else(Address::zero),
                has_voted: false,
                candidates: Vec::new(),
            }),
        })
    }

    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    pub fn contract(&self) -> &VotingContract {
        &self.contract
    }

    pub fn account(&self) -> Address {
        self.state.borrow().account.clone()
    }

    pub fn has_voted(&self) -> bool {
        self.state.borrow().has_voted
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.state.borrow().candidates.clone()
    }

    /// Pulls the page back in sync with chain state.
    ///
    /// Reads run in a fixed order: active account, topic, candidate count,
    /// the candidate entries, then the caller's voter flag. Candidate reads
    /// fan out concurrently but land in id order. A failed read aborts the
    /// chain and leaves the loading indicator up.
    pub async fn render(&self, view: &dyn View) -> Result<()> {
        view.show_loading();

        let account = self.provider.coinbase().await.context("resolve account")?;
        self.state.borrow_mut().account = account.clone();
        view.set_account(&account);

        let topic = self.contract.vote_topic().await.context("read vote topic")?;
        view.set_topic(&topic);

        let count = self
            .contract
            .candidates_count()
            .await
            .context("read candidate count")?;

        // Candidates are only fetched into an empty page; rows already on
        // screen are kept as-is, even if the tally moved on-chain.
        if self.state.borrow().candidates.is_empty() {
            let fetched = try_join_all((1..=count).map(|id| self.contract.candidate(id)))
                .await
                .context("read candidates")?;
            for candidate in &fetched {
                view.append_candidate(candidate);
            }
            self.state.borrow_mut().candidates = fetched;
        } else {
            debug!("candidate rows already on screen, skipping {count} reads");
        }

        let voted = self
            .contract
            .has_voted(&account)
            .await
            .context("read voter flag")?;
        let has_voted = {
            let mut state = self.state.borrow_mut();
            // Once seen, the flag never clears for the life of the page.
            state.has_voted |= voted;
            state.has_voted
        };
        if has_voted {
            view.show_voted_notice();
        }

        view.show_content();
        Ok(())
    }

    /// Replaces the vote topic. Refreshes the page only when the receipt
    /// confirms the write.
    pub async fn submit_topic(&self, topic: &str, view: &dyn View) -> Result<ActionOutcome> {
        let from = self.account();
        let receipt = self
            .contract
            .set_vote_topic(topic, &from)
            .await
            .context("set vote topic")?;
        if receipt.status.is_success() {
            self.render(view).await?;
            Ok(ActionOutcome::Refreshed)
        } else {
            error!(
                "vote topic update rejected with receipt status {}",
                receipt.status.0
            );
            Ok(ActionOutcome::Rejected(receipt.status))
        }
    }

    /// Registers a new candidate and refreshes the page.
    pub async fn add_candidate(&self, name: &str, view: &dyn View) -> Result<ActionOutcome> {
        let from = self.account();
        let receipt = self
            .contract
            .add_new_candidate(name, &from)
            .await
            .context("add candidate")?;
        match self.policy {
            WritePolicy::Faithful => {
                // Refresh runs whether or not the write was confirmed.
                self.render(view).await?;
                Ok(ActionOutcome::Refreshed)
            }
            WritePolicy::Unified => {
                if receipt.status.is_success() {
                    self.render(view).await?;
                    Ok(ActionOutcome::Refreshed)
                } else {
                    error!(
                        "candidate addition rejected with receipt status {}",
                        receipt.status.0
                    );
                    Ok(ActionOutcome::Rejected(receipt.status))
                }
            }
        }
    }

    /// Casts the caller's vote for `candidate_id`.
    pub async fn cast_vote(&self, candidate_id: u64, view: &dyn View) -> Result<ActionOutcome> {
        let from = self.account();
        let receipt = self
            .contract
            .vote(candidate_id, &from)
            .await
            .context("cast vote")?;
        match self.policy {
            WritePolicy::Faithful => {
                // No refresh here. The page sits on the loading indicator
                // until an external reload lands.
                view.show_loading();
                Ok(ActionOutcome::Pending)
            }
            WritePolicy::Unified => {
                if receipt.status.is_success() {
                    self.render(view).await?;
                    Ok(ActionOutcome::Refreshed)
                } else {
                    error!("vote rejected with receipt status {}", receipt.status.0);
                    Ok(ActionOutcome::Rejected(receipt.status))
                }
            }
        }
    }
}
