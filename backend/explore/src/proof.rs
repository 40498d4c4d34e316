//! # Credential Proofs
//!
//! Verifying an external account (GitHub through Reclaim) goes like this:
//! 1. Ask the provider for a request URL, shown to the user as a scannable code
//! 2. The provider opens a session and later calls back with either a signed proof or an error
//!
//! The callbacks are folded into a single future, [`ProofSession::outcome`], that
//! resolves exactly once.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::ExploreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub identifier: String,
    pub provider: String,
    pub claim_data: String,
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOutcome {
    Proof(Proof),
    VerificationFailed(String),
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn request_url(&self) -> Result<String, ExploreError>;

    /// Must eventually call one of the callbacks, or drop them all.
    async fn start_session(&self, callbacks: SessionCallbacks) -> Result<(), ExploreError>;
}

/// Handed to the provider. The first callback wins, later ones are ignored.
#[derive(Clone)]
pub struct SessionCallbacks {
    resolve: Arc<Mutex<Option<oneshot::Sender<ProofOutcome>>>>,
}

impl SessionCallbacks {
    fn new(sender: oneshot::Sender<ProofOutcome>) -> Self {
        Self {
            resolve: Arc::new(Mutex::new(Some(sender))),
        }
    }

    pub fn on_success(&self, proof: Proof) {
        info!("Proof received for {}", proof.provider);
        self.finish(ProofOutcome::Proof(proof));
    }

    pub fn on_error(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Verification failed: {reason}");
        self.finish(ProofOutcome::VerificationFailed(reason));
    }

    fn finish(&self, outcome: ProofOutcome) {
        let sender = match self.resolve.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match sender {
            Some(sender) => {
                if sender.send(outcome).is_err() {
                    debug!("Proof session dropped before it resolved");
                }
            }
            None => debug!("Proof session already resolved, ignoring {outcome:?}"),
        }
    }
}

pub struct ProofSession {
    request_url: String,
    outcome: oneshot::Receiver<ProofOutcome>,
}

impl ProofSession {
    pub async fn start(provider: &dyn CredentialProvider) -> Result<Self, ExploreError> {
        let request_url = provider.request_url().await?;
        let (sender, outcome) = oneshot::channel();

        provider.start_session(SessionCallbacks::new(sender)).await?;

        Ok(Self {
            request_url,
            outcome,
        })
    }

    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    pub async fn outcome(self) -> ProofOutcome {
        self.outcome
            .await
            .unwrap_or_else(|_| ProofOutcome::VerificationFailed("session closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;

    enum Script {
        Succeed,
        FailThenSucceed,
        Abandon,
        Refuse,
    }

    struct FakeProvider {
        script: Script,
    }

    fn github_proof() -> Proof {
        Proof {
            identifier: "0xabc".to_string(),
            provider: "github".to_string(),
            claim_data: r#"{"username":"alexdev"}"#.to_string(),
            signatures: vec!["0xsig".to_string()],
        }
    }

    #[async_trait]
    impl CredentialProvider for FakeProvider {
        async fn request_url(&self) -> Result<String, ExploreError> {
            Ok("https://share.reclaimprotocol.org/verify/?template=abc".to_string())
        }

        async fn start_session(&self, callbacks: SessionCallbacks) -> Result<(), ExploreError> {
            match self.script {
                Script::Succeed => {
                    tokio::spawn(async move {
                        sleep(Duration::from_millis(50)).await;
                        callbacks.on_success(github_proof());
                    });
                }
                Script::FailThenSucceed => {
                    callbacks.on_error("user rejected");
                    callbacks.on_success(github_proof());
                }
                Script::Abandon => drop(callbacks),
                Script::Refuse => return Err(ExploreError::Provider("bad app secret".to_string())),
            }

            Ok(())
        }
    }

    #[tokio::test]
    async fn test_success_resolves_with_proof() {
        let provider = FakeProvider {
            script: Script::Succeed,
        };

        let session = ProofSession::start(&provider).await.unwrap();
        assert!(session.request_url().starts_with("https://"));

        assert_eq!(session.outcome().await, ProofOutcome::Proof(github_proof()));
    }

    #[tokio::test]
    async fn test_first_callback_wins() {
        let provider = FakeProvider {
            script: Script::FailThenSucceed,
        };

        let session = ProofSession::start(&provider).await.unwrap();

        assert_eq!(
            session.outcome().await,
            ProofOutcome::VerificationFailed("user rejected".to_string())
        );
    }

    #[tokio::test]
    async fn test_abandoned_session_fails() {
        let provider = FakeProvider {
            script: Script::Abandon,
        };

        let session = ProofSession::start(&provider).await.unwrap();

        assert_eq!(
            session.outcome().await,
            ProofOutcome::VerificationFailed("session closed".to_string())
        );
    }

    #[tokio::test]
    async fn test_provider_refusal_propagates() {
        let provider = FakeProvider {
            script: Script::Refuse,
        };

        assert!(matches!(
            ProofSession::start(&provider).await,
            Err(ExploreError::Provider(_))
        ));
    }
}
