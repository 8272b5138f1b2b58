//! Terminal questions asked before an action is sent.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Asks the admin on a terminal.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl<R, W> TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Prompt on `input` and `output`. With `assume_yes`, confirmations are
    /// answered without asking.
    pub const fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self {
            input,
            output,
            assume_yes,
        }
    }

    async fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask a yes/no question. Anything but `y` or `yes` declines.
    pub async fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let answer = self.ask(&format!("{question} [y/N] ")).await?;
        Ok(answer.is_some_and(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes")))
    }

    /// Ask for a reason. End of input cancels.
    pub async fn reason(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        self.ask(&format!("{question} ")).await
    }
}
