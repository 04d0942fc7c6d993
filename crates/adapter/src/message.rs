//! Closing message collaborator
//!
//! After a victory the session asks a [`ClosingMessageSource`] for a short
//! congratulation. The request runs in the background with a timeout; an
//! error, a timeout or a blank answer all end up as `None`, which the game
//! state replaces with its fallback text.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Produces the text shown when a board is cleared
pub trait ClosingMessageSource: Send + Sync + 'static {
    fn closing_message(
        &self,
        score: u32,
        level: u32,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Built-in source: picks one of a few fixed lines
#[derive(Debug, Clone)]
pub struct CannedMessages {
    lines: Vec<String>,
}

impl Default for CannedMessages {
    fn default() -> Self {
        Self::new(vec![
            "Board cleared with {score} points. On to level {next}!".to_string(),
            "Sharp eyes! Level {level} done, {score} points banked.".to_string(),
            "Every pair found. {score} points and counting.".to_string(),
        ])
    }
}

impl CannedMessages {
    /// Lines may use `{score}`, `{level}` and `{next}` placeholders
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    fn render(&self, score: u32, level: u32) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let idx = (score as usize).wrapping_add(level as usize) % self.lines.len();
        Some(
            self.lines[idx]
                .replace("{score}", &score.to_string())
                .replace("{level}", &level.to_string())
                .replace("{next}", &level.saturating_add(1).to_string()),
        )
    }
}

impl ClosingMessageSource for CannedMessages {
    async fn closing_message(&self, score: u32, level: u32) -> anyhow::Result<String> {
        self.render(score, level)
            .ok_or_else(|| anyhow::anyhow!("no canned messages configured"))
    }
}

/// Ask `source` for a message, giving up after `timeout`.
///
/// Returns `None` on error, timeout or blank text.
pub async fn resolve_with_fallback<S: ClosingMessageSource>(
    source: &S,
    score: u32,
    level: u32,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, source.closing_message(score, level)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
        Ok(Ok(_)) => {
            warn!(score, level, "closing message source returned blank text");
            None
        }
        Ok(Err(err)) => {
            warn!(score, level, error = %err, "closing message source failed");
            None
        }
        Err(_) => {
            warn!(
                score,
                level,
                timeout_ms = timeout.as_millis() as u64,
                "closing message timed out"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl ClosingMessageSource for Failing {
        async fn closing_message(&self, _score: u32, _level: u32) -> anyhow::Result<String> {
            anyhow::bail!("service unavailable")
        }
    }

    struct Slow;

    impl ClosingMessageSource for Slow {
        async fn closing_message(&self, _score: u32, _level: u32) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    #[test]
    fn test_canned_fills_placeholders() {
        let source = CannedMessages::new(vec!["{score} at {level}, next {next}".to_string()]);
        let text = tokio_test::block_on(source.closing_message(300, 2)).unwrap();
        assert_eq!(text, "300 at 2, next 3");
    }

    #[test]
    fn test_canned_without_lines_fails() {
        let source = CannedMessages::new(Vec::new());
        assert!(tokio_test::block_on(source.closing_message(1, 1)).is_err());
    }

    #[test]
    fn test_failure_resolves_to_none() {
        let text = tokio_test::block_on(resolve_with_fallback(
            &Failing,
            10,
            1,
            Duration::from_secs(1),
        ));
        assert!(text.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_to_none() {
        let text = resolve_with_fallback(&Slow, 10, 1, Duration::from_secs(5)).await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_default_source_answers() {
        let text = resolve_with_fallback(&CannedMessages::default(), 460, 1, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(text.contains("460"));
    }
}
