use super::*;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tpg_core::CHANCE_DELAY_MS;

/// Configuration for the chance-draw delay.
/// Production uses the fixed default; tests shrink it.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    pub chance: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            chance: Duration::from_millis(CHANCE_DELAY_MS),
        }
    }
}

/// Schedules the delayed chance draw back onto the room channel.
///
/// Firings are tagged with the session epoch current at schedule time and
/// the room discards stale ones, so a reset or restart during the pending
/// window can never have its successor resolved against the old round.
#[derive(Debug)]
pub struct Timer {
    config: TimerConfig,
}

impl Timer {
    pub fn new(config: TimerConfig) -> Self {
        Self { config }
    }
    pub fn with_defaults() -> Self {
        Self::new(TimerConfig::default())
    }
    pub fn chance_delay(&self) -> Duration {
        self.config.chance
    }
    /// Fires one `ChanceDue` after the configured delay.
    /// Send failures are fine: the room shut down before the draw.
    pub fn schedule_chance(&self, epoch: u64, tx: UnboundedSender<Event>) {
        let delay = self.config.chance;
        log::debug!("[timer] chance draw in {:?} (epoch {})", delay, epoch);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Event::ChanceDue { epoch });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn default_delay_matches_animation() {
        let config = TimerConfig::default();
        assert_eq!(config.chance, Duration::from_millis(4000));
    }
    #[tokio::test]
    async fn schedule_fires_with_epoch() {
        let timer = Timer::new(TimerConfig {
            chance: Duration::from_millis(5),
        });
        let (tx, mut rx) = unbounded_channel();
        timer.schedule_chance(7, tx);
        match rx.recv().await {
            Some(Event::ChanceDue { epoch }) => assert_eq!(epoch, 7),
            other => panic!("expected ChanceDue, got {:?}", other),
        }
    }
}
