//! Console delivery for dry runs.

use async_trait::async_trait;

use crate::alert::AlertSink;
use crate::error::Result;

/// Sink printing messages to stdout instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

#[async_trait]
impl AlertSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, category: &str, message: &str) -> Result<()> {
        log::info!("Alert delivery disabled; printing {} alert", category);
        println!("--- Message to be sent ({category}) ---");
        println!("{message}");
        println!("--------------------------");
        Ok(())
    }
}
