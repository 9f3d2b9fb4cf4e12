//! Remote score submission
//!
//! Submissions are fire-and-forget: the caller never waits for the request
//! and never sees its result. Outcomes are only logged.

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, warn};

/// Receiver of finished-session scores
pub trait ScoreSubmitter: Send {
    /// Queues the score of `player_id` for submission
    fn submit(&self, player_id: &str, score: i64);
}

/// JSON body of a score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePayload {
    /// Player the score belongs to
    pub player_id: String,
    /// Session score
    pub score: i64,
}

/// Submitter posting scores to an HTTP endpoint
///
/// Submissions are sent one at a time by a background task, in the order
/// they were queued.
#[derive(Debug, Clone)]
pub struct HttpScoreSubmitter {
    queue: mpsc::UnboundedSender<ScorePayload>,
}

impl HttpScoreSubmitter {
    /// Starts the background task posting to `endpoint`
    ///
    /// The task drains every queued submission before it ends, which
    /// happens once all clones of the returned submitter are dropped. Await
    /// the handle before shutting the runtime down so no score is lost.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(client: reqwest::Client, endpoint: impl Into<String>) -> (Self, JoinHandle<()>) {
        let endpoint = endpoint.into();
        let (queue, mut pending) = mpsc::unbounded_channel::<ScorePayload>();

        let worker = tokio::spawn(async move {
            while let Some(payload) = pending.recv().await {
                post_score(&client, &endpoint, &payload).await;
            }
            debug!("score submission queue drained");
        });

        (Self { queue }, worker)
    }
}

impl ScoreSubmitter for HttpScoreSubmitter {
    fn submit(&self, player_id: &str, score: i64) {
        let payload = ScorePayload {
            player_id: player_id.to_owned(),
            score,
        };
        if self.queue.send(payload).is_err() {
            warn!(player_id, score, "score submitter stopped, submission dropped");
        }
    }
}

async fn post_score(client: &reqwest::Client, endpoint: &str, payload: &ScorePayload) {
    match client.post(endpoint).json(payload).send().await {
        Ok(response) if response.status().is_success() => {
            info!(player_id = %payload.player_id, score = payload.score, "score submitted");
        }
        Ok(response) => {
            error!(
                status = %response.status(),
                player_id = %payload.player_id,
                "score submission rejected"
            );
        }
        Err(e) => {
            error!(error = %e, player_id = %payload.player_id, "failed to submit score");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Submitter that records every submission
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSubmitter {
        submissions: Arc<Mutex<Vec<(String, i64)>>>,
    }

    impl RecordingSubmitter {
        pub(crate) fn submissions(&self) -> Vec<(String, i64)> {
            self.submissions.lock().unwrap().clone()
        }
    }

    impl ScoreSubmitter for RecordingSubmitter {
        fn submit(&self, player_id: &str, score: i64) {
            self.submissions
                .lock()
                .unwrap()
                .push((player_id.to_owned(), score));
        }
    }
}
