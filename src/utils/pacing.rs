use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Elapsed,
    Interrupted,
}

/// Every timed wait in the monitor goes through a sleeper so that
/// shutdown can cut it short.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration) -> SleepOutcome;
}

/// Sleeps on the tokio timer and wakes early once `true` is published on
/// the shutdown channel.
#[derive(Clone)]
pub struct TokioSleeper {
    shutdown: watch::Receiver<bool>,
}

impl TokioSleeper {
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }

    /// A sleeper that can never be interrupted.
    pub fn uninterruptible() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { shutdown: rx }
    }
}

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) -> SleepOutcome {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return SleepOutcome::Interrupted;
        }

        let timer = tokio::time::sleep(duration);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => return SleepOutcome::Elapsed,
                changed = shutdown.changed() => match changed {
                    Ok(()) if *shutdown.borrow() => return SleepOutcome::Interrupted,
                    Ok(()) => continue,
                    // Sender gone, nobody can ask us to stop any more
                    Err(_) => {
                        timer.await;
                        return SleepOutcome::Elapsed;
                    }
                },
            }
        }
    }
}
