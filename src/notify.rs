//! Notification seam. Message formatting and delivery (Telegram etc.) live
//! outside this crate; the default sink just logs the alert.

use async_trait::async_trait;

use crate::models::TradeSignal;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, signal: &TradeSignal) -> crate::Result<()>;
}

/// Writes each alert to the log stream
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, signal: &TradeSignal) -> crate::Result<()> {
        tracing::info!(
            symbol = %signal.symbol,
            name = %signal.name,
            direction = signal.direction.as_str(),
            pattern = signal.pattern.label(),
            score = signal.score,
            entry = signal.entry,
            stop = signal.stop_loss,
            tp1 = signal.tp1,
            tp2 = signal.tp2,
            lot = signal.lot_size,
            capped = signal.was_capped,
            "signal alert"
        );
        Ok(())
    }
}
