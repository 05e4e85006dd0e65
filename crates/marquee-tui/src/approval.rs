// TMDB token approval from inside the TUI: open the browser, then wait for
// the user to confirm (Enter) or give up (Esc) on the Account tab
use async_trait::async_trait;
use marquee_api::approval_url;
use marquee_core::TokenApprover;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{info, warn};

pub struct TuiApprover {
    pending: watch::Sender<Option<String>>,
    answers: Mutex<mpsc::UnboundedReceiver<bool>>,
}

/// The UI's end: see which URL awaits approval, send the answer back
pub struct ApprovalHandle {
    pub pending: watch::Receiver<Option<String>>,
    answers: mpsc::UnboundedSender<bool>,
}

impl ApprovalHandle {
    pub fn answer(&self, approved: bool) {
        if self.answers.send(approved).is_err() {
            warn!("Approval answer dropped, nobody is waiting");
        }
    }

    pub fn waiting_url(&self) -> Option<String> {
        self.pending.borrow().clone()
    }
}

pub fn approval_channel() -> (TuiApprover, ApprovalHandle) {
    let (pending_tx, pending_rx) = watch::channel(None);
    let (answer_tx, answer_rx) = mpsc::unbounded_channel();

    (
        TuiApprover {
            pending: pending_tx,
            answers: Mutex::new(answer_rx),
        },
        ApprovalHandle {
            pending: pending_rx,
            answers: answer_tx,
        },
    )
}

#[async_trait]
impl TokenApprover for TuiApprover {
    async fn approve(&self, request_token: &str) -> bool {
        let url = approval_url(request_token);
        let mut answers = self.answers.lock().await;

        // Stale answers from an earlier prompt don't count
        while answers.try_recv().is_ok() {}

        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
        }
        info!("Waiting for request token approval");
        self.pending.send_replace(Some(url));

        let approved = answers.recv().await.unwrap_or(false);
        self.pending.send_replace(None);
        approved
    }
}
