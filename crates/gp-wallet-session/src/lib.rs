use anyhow::{Result, anyhow};
use async_trait::async_trait;
use gp_api_types::WalletAddress;
use gp_crypto::LocalKeypair;
use tracing::{info, warn};

/// How a connect request may interact with the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// Succeed only if this origin was previously approved; never prompt.
    OnlyIfTrusted,
    /// May raise an approval prompt.
    Interactive,
}

/// Terminal state of a connect request. Cancellation is a result variant,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(WalletAddress),
    /// The user dismissed the approval prompt.
    Declined,
    /// Silent mode on an origin the provider does not yet trust.
    NotTrusted,
    /// No provider is injected into the environment.
    Unavailable,
    /// Another connect request is already awaiting the provider.
    InFlight,
}

/// External wallet capability, injected rather than read from global scope
/// so front-ends and tests can substitute their own.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn is_available(&self) -> bool;

    async fn connect(&self, mode: ConnectMode) -> Result<ConnectOutcome>;

    /// Produces the opaque approval artifact attached to list appends.
    async fn sign_message(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected(WalletAddress),
}

/// Holds the provider handle and the resulting session address.
pub struct WalletSession<W> {
    provider: W,
    state: SessionState,
}

impl<W: WalletProvider> WalletSession<W> {
    pub fn new(provider: W) -> Self {
        Self {
            provider,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        match &self.state {
            SessionState::Connected(address) => Some(address),
            _ => None,
        }
    }

    /// Attempts to restore a prior approval on load. Never propagates an
    /// error: a missing provider is a normal, logged outcome.
    pub async fn try_reconnect_silently(&mut self) -> ConnectOutcome {
        if !self.provider.is_available() {
            info!("no wallet provider present; waiting for an explicit connect");
            return ConnectOutcome::Unavailable;
        }

        match self.attempt(ConnectMode::OnlyIfTrusted).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("silent reconnect failed: {err:#}");
                ConnectOutcome::NotTrusted
            }
        }
    }

    /// User-initiated connect. A decline leaves the session disconnected and
    /// recoverable; a request while one is pending raises no second prompt.
    pub async fn connect(&mut self) -> Result<ConnectOutcome> {
        if matches!(self.state, SessionState::Connecting) {
            warn!("wallet connect already in flight");
            return Ok(ConnectOutcome::InFlight);
        }

        if !self.provider.is_available() {
            info!("wallet connect requested without a provider present");
            return Ok(ConnectOutcome::Unavailable);
        }

        self.attempt(ConnectMode::Interactive).await
    }

    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
    }

    pub async fn sign_message(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if self.address().is_none() {
            return Err(anyhow!("no wallet connected"));
        }

        self.provider.sign_message(payload).await
    }

    async fn attempt(&mut self, mode: ConnectMode) -> Result<ConnectOutcome> {
        self.state = SessionState::Connecting;

        let outcome = match self.provider.connect(mode).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state = SessionState::Disconnected;
                return Err(err);
            }
        };

        match &outcome {
            ConnectOutcome::Connected(address) => {
                info!("connected with public key {}", address.0);
                self.state = SessionState::Connected(address.clone());
            }
            _ => {
                self.state = SessionState::Disconnected;
            }
        }

        Ok(outcome)
    }
}

/// Environment without any injected provider.
#[derive(Default)]
pub struct AbsentProvider;

#[async_trait]
impl WalletProvider for AbsentProvider {
    fn is_available(&self) -> bool {
        false
    }

    async fn connect(&self, _mode: ConnectMode) -> Result<ConnectOutcome> {
        Ok(ConnectOutcome::Unavailable)
    }

    async fn sign_message(&self, _payload: &[u8]) -> Result<Vec<u8>> {
        Err(anyhow!("no wallet provider available"))
    }
}

/// In-process provider backed by a locally held keypair. Approves every
/// interactive request; the `trusted` flag controls whether silent
/// reconnects succeed, mirroring a previously approved origin.
pub struct LocalKeyProvider {
    keypair: LocalKeypair,
    trusted: bool,
}

impl LocalKeyProvider {
    pub fn new(keypair: LocalKeypair, trusted: bool) -> Self {
        Self { keypair, trusted }
    }

    pub fn generate(trusted: bool) -> Self {
        Self::new(LocalKeypair::generate(), trusted)
    }

    pub fn wallet_address(&self) -> WalletAddress {
        WalletAddress(self.keypair.wallet_address())
    }
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    fn is_available(&self) -> bool {
        true
    }

    async fn connect(&self, mode: ConnectMode) -> Result<ConnectOutcome> {
        if mode == ConnectMode::OnlyIfTrusted && !self.trusted {
            return Ok(ConnectOutcome::NotTrusted);
        }

        Ok(ConnectOutcome::Connected(self.wallet_address()))
    }

    async fn sign_message(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.keypair.sign_message(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed script of connect outcomes.
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

    #[tokio::test]
    async fn absent_provider_leaves_session_disconnected() {
        let mut session = WalletSession::new(AbsentProvider);

        let outcome = session.try_reconnect_silently().await;

        assert_eq!(outcome, ConnectOutcome::Unavailable);
        assert_eq!(session.state(), &SessionState::Disconnected);
        assert!(session.address().is_none());
    }

    #[tokio::test]
    async fn trusted_provider_reconnects_without_interaction() {
        let provider = LocalKeyProvider::generate(true);
        let expected = provider.wallet_address();
        let mut session = WalletSession::new(provider);

        let outcome = session.try_reconnect_silently().await;

        assert_eq!(outcome, ConnectOutcome::Connected(expected.clone()));
        assert_eq!(session.address(), Some(&expected));
    }

    #[tokio::test]
    async fn untrusted_provider_needs_an_explicit_connect() {
        let provider = LocalKeyProvider::generate(false);
        let expected = provider.wallet_address();
        let mut session = WalletSession::new(provider);

        assert_eq!(
            session.try_reconnect_silently().await,
            ConnectOutcome::NotTrusted
        );
        assert_eq!(session.state(), &SessionState::Disconnected);

        let outcome = session.connect().await.expect("connect");
        assert_eq!(outcome, ConnectOutcome::Connected(expected));
    }

    #[tokio::test]
    async fn decline_is_recoverable() {
        let address = WalletAddress::new("wallet-1");
        let provider = ScriptedProvider::new([
            ConnectOutcome::Declined,
            ConnectOutcome::Connected(address.clone()),
        ]);
        let mut session = WalletSession::new(provider);

        assert_eq!(
            session.connect().await.expect("first connect"),
            ConnectOutcome::Declined
        );
        assert_eq!(session.state(), &SessionState::Disconnected);

        assert_eq!(
            session.connect().await.expect("second connect"),
            ConnectOutcome::Connected(address.clone())
        );
        assert_eq!(session.address(), Some(&address));
    }

    #[tokio::test]
    async fn signing_requires_a_connected_session() {
        let mut session = WalletSession::new(LocalKeyProvider::generate(true));

        assert!(session.sign_message(b"https://x/y.gif").await.is_err());

        session.try_reconnect_silently().await;
        let signature = session
            .sign_message(b"https://x/y.gif")
            .await
            .expect("signable once connected");
        assert!(!signature.is_empty());
    }

    #[tokio::test]
    async fn disconnect_clears_the_session() {
        let mut session = WalletSession::new(LocalKeyProvider::generate(true));
        session.try_reconnect_silently().await;
        assert!(session.address().is_some());

        session.disconnect();
        assert_eq!(session.state(), &SessionState::Disconnected);
    }
}
