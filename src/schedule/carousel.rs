use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::schedule::rotation::{Rotation, RotationError, RotationState};

struct Slides<T> {
    items: Vec<T>,
    rotation: Rotation,
    changes: watch::Sender<RotationState>,
}

/// Timer-driven slide show over a list of items.
///
/// A background task advances the rotation once per `period` while there is
/// something to show. The task is aborted when the list empties, on
/// [`Carousel::stop`], and when the carousel is dropped. Loading items
/// spawns onto the current tokio runtime.
pub struct Carousel<T> {
    slides: Arc<Mutex<Slides<T>>>,
    period: Duration,
    ticker: Option<JoinHandle<()>>,
}

fn lock<T>(slides: &Mutex<Slides<T>>) -> MutexGuard<'_, Slides<T>> {
    slides.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Carousel<T>
where
    T: Clone + Send + 'static,
{
    /// Fails with [`RotationError::ZeroPeriod`] for a zero `period`, which
    /// the timer cannot run on.
    pub fn new(period: Duration) -> Result<Self, RotationError> {
        if period.is_zero() {
            return Err(RotationError::ZeroPeriod);
        }

        let (changes, _) = watch::channel(RotationState::Idle);
        Ok(Self {
            slides: Arc::new(Mutex::new(Slides {
                items: Vec::new(),
                rotation: Rotation::new(),
                changes,
            })),
            period,
            ticker: None,
        })
    }

    /// Replaces the slides and starts from the first one with a fresh timer
    /// period. An empty list parks the carousel in `Idle` with no timer.
    pub fn load(&mut self, items: Vec<T>) -> RotationState {
        self.stop();

        let state = {
            let mut slides = lock(&self.slides);
            let state = slides.rotation.reset(items.len());
            slides.items = items;
            slides.changes.send_replace(state);
            state
        };

        if state != RotationState::Idle {
            self.ticker = Some(self.spawn_ticker());
        }
        tracing::debug!("Carousel loaded, state {:?}", state);
        state
    }

    /// Shows slide `index` right away. The timer keeps its schedule, so the
    /// next automatic advance happens when it would have anyway.
    pub fn select(&self, index: usize) -> Result<RotationState, RotationError> {
        let mut slides = lock(&self.slides);
        let state = slides.rotation.select(index)?;
        slides.changes.send_replace(state);
        Ok(state)
    }

    /// Cancels the timer. The current slide stays on screen.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|ticker| !ticker.is_finished())
    }

    pub fn state(&self) -> RotationState {
        lock(&self.slides).rotation.state()
    }

    pub fn current(&self) -> Option<T> {
        let slides = lock(&self.slides);
        slides
            .rotation
            .current()
            .and_then(|index| slides.items.get(index).cloned())
    }

    /// Receiver notified on every index change, automatic or manual.
    pub fn changes(&self) -> watch::Receiver<RotationState> {
        lock(&self.slides).changes.subscribe()
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let slides = Arc::clone(&self.slides);
        let period = self.period;
        let first_tick = Instant::now() + period;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let state = {
                    let mut guard = lock(&slides);
                    let state = guard.rotation.tick();
                    guard.changes.send_replace(state);
                    state
                };
                if state == RotationState::Idle {
                    break;
                }
            }
        })
    }
}

impl<T> Drop for Carousel<T> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
