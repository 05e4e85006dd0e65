// Request token approval at the prompt
use async_trait::async_trait;
use marquee_api::approval_url;
use marquee_core::TokenApprover;
use std::io::{self, BufRead, Write};
use tracing::warn;

pub struct PromptApprover;

#[async_trait]
impl TokenApprover for PromptApprover {
    async fn approve(&self, request_token: &str) -> bool {
        let url = approval_url(request_token);
        println!("Approve Marquee in your browser:\n\n  {}\n", url);
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
        }

        let answer = tokio::task::spawn_blocking(|| {
            print!("Press Enter once approved (n to cancel): ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok::<_, io::Error>(line)
        })
        .await;

        match answer {
            // EOF, nobody there to approve
            Ok(Ok(line)) if line.is_empty() => false,
            Ok(Ok(line)) => approved(&line),
            Ok(Err(e)) => {
                warn!("Could not read answer: {}", e);
                false
            }
            Err(e) => {
                warn!("Prompt task failed: {}", e);
                false
            }
        }
    }
}

fn approved(answer: &str) -> bool {
    !matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}
