use std::{fmt, future::Future, sync::Arc, time::Duration};

use graph::{
    Gateway, UserSummary,
    GatewayError::{self, UpstreamUnavailable},
};
use tokio::{sync::mpsc::UnboundedSender, time::timeout};
use tracing::debug;

use crate::reducer::Reducer;

/// Logical clock for searches. Only the live generation may touch the result state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct Completion {
    pub generation: Generation,
    pub query: String,
    pub outcome: Result<Vec<UserSummary>, GatewayError>,
}

pub struct Dispatcher {
    gateway: Arc<dyn Gateway>,
    request_timeout: Duration,
    live: Generation,
    completions: UnboundedSender<Completion>,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        request_timeout: Duration,
        completions: UnboundedSender<Completion>,
    ) -> Self {
        Self {
            gateway,
            request_timeout,
            live: Generation::default(),
            completions,
        }
    }

    pub fn live(&self) -> Generation {
        self.live
    }

    /// A blank query still advances the clock so whatever is in flight goes stale,
    /// but it clears the reducer instead of hitting the network.
    pub fn dispatch(&mut self, query: &str, reducer: &mut Reducer) -> Generation {
        self.live = self.live.next();
        let generation = self.live;

        let query = query.trim();
        if query.is_empty() {
            debug!("{generation}: blank query, clearing");
            reducer.clear();
            return generation;
        }

        debug!("{generation}: searching for {query:?}");
        reducer.begin(query);

        let gateway = self.gateway.clone();
        let completions = self.completions.clone();
        let request_timeout = self.request_timeout;
        let query = query.to_string();

        tokio::spawn(async move {
            let outcome = bounded(request_timeout, gateway.search(&query)).await;

            if completions
                .send(Completion {
                    generation,
                    query,
                    outcome,
                })
                .is_err()
            {
                debug!("{generation}: session gone, dropping result");
            }
        });

        generation
    }
}

/// Turns an expired request into `UpstreamUnavailable` for that request only.
pub async fn bounded<T>(
    request_timeout: Duration,
    request: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    timeout(request_timeout, request).await.unwrap_or_else(|_| {
        Err(UpstreamUnavailable(format!(
            "timed out after {request_timeout:?}"
        )))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use graph::{User, UserLookup};
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;
    use crate::reducer::ResultState;

    #[derive(Default)]
    struct RecordingGateway {
        searched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Gateway for RecordingGateway {
        async fn search(&self, term: &str) -> Result<Vec<UserSummary>, GatewayError> {
            self.searched.lock().unwrap().push(term.to_string());
            Ok(vec![])
        }

        async fn followers(&self, _fid: &str) -> Result<Vec<UserSummary>, GatewayError> {
            unreachable!()
        }

        async fn following(&self, _fid: &str) -> Result<Vec<UserSummary>, GatewayError> {
            unreachable!()
        }

        async fn user(&self, _lookup: &UserLookup) -> Result<User, GatewayError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_blank_query_is_idle_without_network() {
        let gateway = Arc::new(RecordingGateway::default());
        let (tx, mut rx) = unbounded_channel();
        let mut dispatcher = Dispatcher::new(gateway.clone(), Duration::from_secs(10), tx);
        let mut reducer = Reducer::new();

        for blank in ["", "   "] {
            dispatcher.dispatch(blank, &mut reducer);
            assert_eq!(reducer.state(), ResultState::Idle);
        }

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert!(gateway.searched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generations_strictly_increase() {
        let gateway = Arc::new(RecordingGateway::default());
        let (tx, mut rx) = unbounded_channel();
        let mut dispatcher = Dispatcher::new(gateway.clone(), Duration::from_secs(10), tx);
        let mut reducer = Reducer::new();

        let first = dispatcher.dispatch("a", &mut reducer);
        let cleared = dispatcher.dispatch("", &mut reducer);
        let second = dispatcher.dispatch(" ab ", &mut reducer);

        assert!(first < cleared && cleared < second);
        assert_eq!(dispatcher.live(), second);
        assert_eq!(
            reducer.state(),
            ResultState::Loading {
                query: "ab".to_string()
            }
        );

        let mut seen = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        seen.sort_by_key(|c| c.generation);

        assert_eq!(seen[0].generation, first);
        assert_eq!(seen[1].generation, second);
        assert_eq!(seen[1].query, "ab");
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, GatewayError>(())
        };

        assert!(matches!(
            bounded(Duration::from_secs(10), slow).await,
            Err(UpstreamUnavailable(_))
        ));
    }
}
