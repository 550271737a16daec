use gp_api_types::{GifEntry, ListState, WalletAddress};
use gp_chain_client::{AccountGateway, GifProgram};
use gp_wallet_session::{ConnectOutcome, SessionState, WalletProvider, WalletSession};
use tracing::{info, warn};

pub const PORTAL_TITLE: &str = "GIF Portal";
pub const PORTAL_TAGLINE: &str = "View your GIF collection in the metaverse";
pub const SOCIAL_HANDLE: &str = "_buildspace";

pub fn social_link() -> String {
    format!("https://twitter.com/{SOCIAL_HANDLE}")
}

/// User-visible outcome of a failed or rejected action. Every notice is
/// recoverable by re-triggering the corresponding action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No provider injected; the user needs to install one.
    WalletMissing,
    /// The user dismissed the wallet approval prompt.
    ConnectionCancelled,
    ConnectFailed(String),
    /// The list could not be fetched or initialized; retry from the prompt.
    ListUnavailable(String),
    /// Empty or whitespace-only draft.
    EmptyDraft,
    /// The append did not go through; the draft is preserved.
    SubmitFailed(String),
}

/// Pure projection of the portal state. Exactly one of three presentations.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    ConnectPrompt {
        notice: Option<Notice>,
    },
    InitializePrompt {
        address: WalletAddress,
        notice: Option<Notice>,
    },
    Gallery {
        address: WalletAddress,
        entries: Vec<GifEntry>,
        draft: String,
        submitting: bool,
        notice: Option<Notice>,
    },
}

/// The portal application: a wallet session, an account gateway, and the
/// state the view is projected from. All mutation happens through the
/// operation methods; front-ends only call operations and render.
pub struct PortalApp<W, P> {
    session: WalletSession<W>,
    gateway: AccountGateway<P>,
    list: ListState,
    draft: String,
    submitting: bool,
    notice: Option<Notice>,
}

impl<W: WalletProvider, P: GifProgram> PortalApp<W, P> {
    pub fn new(provider: W, program: P) -> Self {
        Self {
            session: WalletSession::new(provider),
            gateway: AccountGateway::new(program),
            list: ListState::default(),
            draft: String::new(),
            submitting: false,
            notice: None,
        }
    }

    pub fn session_state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        self.session.address()
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Page-load sequence: silent reconnect, then list refresh on success.
    /// Infallible; a missing provider just leaves the connect prompt up.
    pub async fn on_load(&mut self) {
        if let ConnectOutcome::Connected(_) = self.session.try_reconnect_silently().await {
            self.refresh_list().await;
        }
    }

    pub async fn connect_wallet(&mut self) {
        self.notice = None;

        match self.session.connect().await {
            Ok(ConnectOutcome::Connected(_)) => self.refresh_list().await,
            Ok(ConnectOutcome::Declined) => {
                info!("wallet connect declined by the user");
                self.notice = Some(Notice::ConnectionCancelled);
            }
            Ok(ConnectOutcome::Unavailable) => {
                self.notice = Some(Notice::WalletMissing);
            }
            Ok(ConnectOutcome::NotTrusted) | Ok(ConnectOutcome::InFlight) => {}
            Err(err) => {
                warn!("wallet connect failed: {err:#}");
                self.notice = Some(Notice::ConnectFailed(err.to_string()));
            }
        }
    }

    pub fn disconnect_wallet(&mut self) {
        self.session.disconnect();
        self.list = ListState::default();
        self.notice = None;
    }

    pub async fn initialize_account(&mut self) {
        let Some(owner) = self.session.address().cloned() else {
            warn!("initialize requested without a connected wallet");
            return;
        };

        self.notice = None;
        match self.gateway.initialize_account(&owner).await {
            Ok(state) => self.list = state,
            Err(err) => {
                warn!("gif account initialization failed: {err}");
                self.notice = Some(Notice::ListUnavailable(err.to_string()));
            }
        }
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    /// Submits the current draft. An empty or whitespace-only draft is
    /// rejected with inline feedback and no state change; on any failure the
    /// draft is preserved so the user can retry.
    pub async fn submit_gif(&mut self) {
        let link = self.draft.trim().to_string();
        if link.is_empty() {
            info!("empty gif link given, try again");
            self.notice = Some(Notice::EmptyDraft);
            return;
        }

        let Some(owner) = self.session.address().cloned() else {
            warn!("gif submitted without a connected wallet");
            return;
        };

        self.notice = None;
        self.submitting = true;

        let signature = match self.session.sign_message(link.as_bytes()).await {
            Ok(signature) => signature,
            Err(err) => {
                warn!("gif submission not approved: {err:#}");
                self.notice = Some(Notice::SubmitFailed(err.to_string()));
                self.submitting = false;
                return;
            }
        };

        let entry = GifEntry::submitted_by(link.clone(), owner.clone());
        match self.gateway.append_entry(&owner, entry, &signature).await {
            Ok(state) => {
                info!("gif successfully sent to the program: {link}");
                self.list = state;
                self.draft.clear();
            }
            Err(err) => {
                warn!("gif submission failed: {err}");
                self.notice = Some(Notice::SubmitFailed(err.to_string()));
            }
        }

        self.submitting = false;
    }

    pub async fn refresh_list(&mut self) {
        let Some(owner) = self.session.address().cloned() else {
            return;
        };

        match self.gateway.fetch_list(&owner).await {
            Ok(state) => {
                self.list = state;
                if matches!(self.notice, Some(Notice::ListUnavailable(_))) {
                    self.notice = None;
                }
            }
            Err(err) => {
                warn!("could not fetch the gif list: {err}");
                self.notice = Some(Notice::ListUnavailable(err.to_string()));
            }
        }
    }

    /// Projects the current state to exactly one of the three presentations.
    pub fn render(&self) -> View {
        match self.session.address() {
            None => View::ConnectPrompt {
                notice: self.notice.clone(),
            },
            Some(address) => match &self.list {
                ListState::Uninitialized => View::InitializePrompt {
                    address: address.clone(),
                    notice: self.notice.clone(),
                },
                state => View::Gallery {
                    address: address.clone(),
                    entries: state.entries().to_vec(),
                    draft: self.draft.clone(),
                    submitting: self.submitting,
                    notice: self.notice.clone(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use gp_chain_client::{InMemoryGifProgram, ProgramError, ProgramResult};
    use gp_wallet_session::{AbsentProvider, ConnectMode, LocalKeyProvider};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedProvider {
        outcomes: Mutex<VecDeque<ConnectOutcome>>,
    }

    impl ScriptedProvider {
        fn new(outcomes: impl IntoIterator<Item = ConnectOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for ScriptedProvider {
        fn is_available(&self) -> bool {
            true
        }

        async fn connect(&self, _mode: ConnectMode) -> Result<ConnectOutcome> {
            let next = self.outcomes.lock().unwrap().pop_front();
            Ok(next.unwrap_or(ConnectOutcome::Declined))
        }

        async fn sign_message(&self, _payload: &[u8]) -> Result<Vec<u8>> {
            Ok(vec![0; 64])
        }
    }

    /// Account reads work, appends fail — a half-broken devnet.
    struct FailingAppends {
        inner: InMemoryGifProgram,
    }

    #[async_trait]
    impl GifProgram for FailingAppends {
        async fn fetch_account(
            &self,
            owner: &WalletAddress,
        ) -> ProgramResult<Option<Vec<GifEntry>>> {
            self.inner.fetch_account(owner).await
        }

        async fn initialize(&self, owner: &WalletAddress) -> ProgramResult<()> {
            self.inner.initialize(owner).await
        }

        async fn append_gif(
            &self,
            _owner: &WalletAddress,
            _entry: GifEntry,
            _signature: &[u8],
        ) -> ProgramResult<Vec<GifEntry>> {
            Err(ProgramError::Transport("devnet unreachable".to_string()))
        }
    }

    /// Nothing works.
    struct FailingProgram;

    #[async_trait]
    impl GifProgram for FailingProgram {
        async fn fetch_account(
            &self,
            _owner: &WalletAddress,
        ) -> ProgramResult<Option<Vec<GifEntry>>> {
            Err(ProgramError::Transport("devnet unreachable".to_string()))
        }

        async fn initialize(&self, _owner: &WalletAddress) -> ProgramResult<()> {
            Err(ProgramError::Transport("devnet unreachable".to_string()))
        }

        async fn append_gif(
            &self,
            _owner: &WalletAddress,
            _entry: GifEntry,
            _signature: &[u8],
        ) -> ProgramResult<Vec<GifEntry>> {
            Err(ProgramError::Transport("devnet unreachable".to_string()))
        }
    }

    async fn connected_app() -> PortalApp<LocalKeyProvider, InMemoryGifProgram> {
        let mut app = PortalApp::new(LocalKeyProvider::generate(true), InMemoryGifProgram::new());
        app.on_load().await;
        app.initialize_account().await;
        app
    }

    #[tokio::test]
    async fn without_a_provider_the_initial_view_is_the_connect_prompt() {
        let mut app = PortalApp::new(AbsentProvider, InMemoryGifProgram::new());

        app.on_load().await;

        assert_eq!(app.render(), View::ConnectPrompt { notice: None });
    }

    #[tokio::test]
    async fn trusted_reconnect_is_silent_and_lands_connected() {
        let provider = LocalKeyProvider::generate(true);
        let address = provider.wallet_address();
        let mut app = PortalApp::new(provider, InMemoryGifProgram::new());

        app.on_load().await;

        assert_eq!(
            app.render(),
            View::InitializePrompt {
                address,
                notice: None
            }
        );
    }

    #[tokio::test]
    async fn declined_connect_is_cancelled_and_recoverable() {
        let address = WalletAddress::new("wallet-1");
        let provider = ScriptedProvider::new([
            ConnectOutcome::Declined,
            ConnectOutcome::Connected(address.clone()),
        ]);
        let mut app = PortalApp::new(provider, InMemoryGifProgram::new());

        app.connect_wallet().await;
        assert_eq!(
            app.render(),
            View::ConnectPrompt {
                notice: Some(Notice::ConnectionCancelled)
            }
        );

        app.connect_wallet().await;
        assert_eq!(app.address(), Some(&address));
    }

    #[tokio::test]
    async fn uninitialized_and_empty_accounts_render_different_views() {
        let provider = LocalKeyProvider::generate(true);
        let mut app = PortalApp::new(provider, InMemoryGifProgram::new());
        app.on_load().await;

        assert!(matches!(app.render(), View::InitializePrompt { .. }));

        app.initialize_account().await;

        match app.render() {
            View::Gallery { entries, .. } => assert!(entries.is_empty()),
            other => panic!("expected an empty gallery, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_draft_submission_changes_nothing() {
        let mut app = connected_app().await;
        app.set_draft("   ");

        app.submit_gif().await;

        assert_eq!(app.list(), &ListState::Empty);
        assert_eq!(app.draft(), "   ");
        assert_eq!(app.notice(), Some(&Notice::EmptyDraft));
    }

    #[tokio::test]
    async fn submissions_append_in_order_and_clear_the_draft() {
        let mut app = connected_app().await;
        let address = app.address().cloned().expect("connected");

        app.set_draft("https://x/y.gif");
        app.submit_gif().await;
        assert_eq!(app.draft(), "");

        app.set_draft("https://x/y.gif");
        app.submit_gif().await;

        let entries = app.list().entries().to_vec();
        let links: Vec<&str> = entries.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(links, vec!["https://x/y.gif", "https://x/y.gif"]);
        assert!(entries.iter().all(|e| e.submitter.as_ref() == Some(&address)));
        assert_eq!(app.notice(), None);
    }

    #[tokio::test]
    async fn append_failure_preserves_the_draft() {
        let provider = LocalKeyProvider::generate(true);
        let mut app = PortalApp::new(
            provider,
            FailingAppends {
                inner: InMemoryGifProgram::new(),
            },
        );
        app.on_load().await;
        app.initialize_account().await;

        app.set_draft("https://x/y.gif");
        app.submit_gif().await;

        assert_eq!(app.draft(), "https://x/y.gif");
        assert_eq!(app.list(), &ListState::Empty);
        assert!(matches!(app.notice(), Some(Notice::SubmitFailed(_))));
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_a_retry_notice() {
        let provider = LocalKeyProvider::generate(true);
        let mut app = PortalApp::new(provider, FailingProgram);

        app.on_load().await;

        match app.render() {
            View::InitializePrompt { notice, .. } => {
                assert!(matches!(notice, Some(Notice::ListUnavailable(_))));
            }
            other => panic!("expected the initialize prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fixture_account_renders_a_populated_gallery() {
        let provider = LocalKeyProvider::generate(true);
        let program = InMemoryGifProgram::with_fixture(&provider.wallet_address());
        let mut app = PortalApp::new(provider, program);

        app.on_load().await;

        match app.render() {
            View::Gallery { entries, .. } => {
                assert_eq!(entries.len(), gp_chain_client::FIXTURE_GIFS.len());
            }
            other => panic!("expected a populated gallery, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn disconnect_returns_to_the_connect_prompt() {
        let mut app = connected_app().await;

        app.disconnect_wallet();

        assert_eq!(app.render(), View::ConnectPrompt { notice: None });
        assert_eq!(app.session_state(), &SessionState::Disconnected);
    }
}
