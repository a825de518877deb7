//! Background clock that advances the game at a fixed period.

use crate::SharedGame;
use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

/// Ticks the shared game every `period`, passing the real time elapsed since
/// the previous tick rather than the nominal period.
pub struct Ticker {
    game: SharedGame,
    period: Duration,
}

impl Ticker {
    /// `period` must be non-zero.
    pub fn new(game: SharedGame, period: Duration) -> Self {
        Self { game, period }
    }

    /// Runs the ticker on the runtime until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first tick completes immediately
        timer.tick().await;
        let mut last_tick = Instant::now();
        let mut ticks: u64 = 0;

        info!("Ticker started with a period of {}ms", self.period.as_millis());

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let now = Instant::now();
                    let elapsed = now.duration_since(last_tick);
                    last_tick = now;

                    self.game.write().await.tick(elapsed);
                    ticks += 1;

                    if ticks % 600 == 0 {
                        debug!("Ticker: {} ticks, last {}ms", ticks, elapsed.as_millis());
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Ticker stopped after {} ticks", ticks);
    }
}
