use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::models::CatalogItem;

pub const DEFAULT_WINDOW_SIZE: usize = 2;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// Source of carousel ticks
///
/// Production code uses [`IntervalTicks`]; tests can drive the scheduler from any clock.
#[async_trait::async_trait]
pub trait TickSource: Send {
    /// Waits for the next tick. Returns `false` once the source is exhausted.
    async fn tick(&mut self) -> bool;
}

/// Fixed-period ticks; the first one fires a full period after creation
pub struct IntervalTicks(Interval);

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self(interval)
    }
}

#[async_trait::async_trait]
impl TickSource for IntervalTicks {
    async fn tick(&mut self) -> bool {
        self.0.tick().await;
        true
    }
}

/// Creates a fresh tick source for every timer the scheduler starts
pub type TickFactory = Arc<dyn Fn() -> Box<dyn TickSource> + Send + Sync>;

/// Running rotation timer
struct CarouselTimer {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Rotates the featured window over the first `window_size` items of a list
///
/// Each `start` owns a fresh index cell, so a timer that is still winding down after
/// `stop` can never touch the index of the list that replaced it.
pub struct CarouselScheduler {
    ticks: TickFactory,
    window_size: usize,
    items: Arc<[CatalogItem]>,
    active_index: Arc<AtomicUsize>,
    timer: Option<CarouselTimer>,
}

impl CarouselScheduler {
    pub fn new(period: Duration, window_size: usize) -> Self {
        Self::with_ticks(
            Arc::new(move || Box::new(IntervalTicks::new(period)) as Box<dyn TickSource>),
            window_size,
        )
    }

    pub fn with_ticks(ticks: TickFactory, window_size: usize) -> Self {
        Self {
            ticks,
            window_size: window_size.max(1),
            items: Arc::from(Vec::new()),
            active_index: Arc::new(AtomicUsize::new(0)),
            timer: None,
        }
    }

    /// Stops any running rotation and starts over on `items` at index 0
    ///
    /// An empty list leaves the carousel idle with no timer.
    pub fn start(&mut self, items: Arc<[CatalogItem]>) {
        self.stop();

        self.items = items;
        self.active_index = Arc::new(AtomicUsize::new(0));

        let span = self.span();
        if span == 0 {
            tracing::debug!("Carousel idle: no items");
            return;
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let ticks = (self.ticks)();
        let index = self.active_index.clone();

        let task = tokio::spawn(async move {
            Self::rotation_task(ticks, index, span, shutdown_rx).await;
        });

        tracing::debug!(window = span, "Carousel started");
        self.timer = Some(CarouselTimer { shutdown_tx, task });
    }

    /// Cancels the running timer, if any
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            // The task may already have exited on its own
            let _ = timer.shutdown_tx.send(());
            timer.task.abort();
            tracing::debug!("Carousel stopped");
        }
    }

    /// Stops the timer and forgets the current list
    pub fn clear(&mut self) {
        self.stop();
        self.items = Arc::from(Vec::new());
        self.active_index = Arc::new(AtomicUsize::new(0));
    }

    /// Restarts on `items` unless it is the list already being rotated
    ///
    /// Returns `true` when a restart happened.
    pub fn restart_if_changed(&mut self, items: &Arc<[CatalogItem]>) -> bool {
        if Arc::ptr_eq(&self.items, items) && (self.timer.is_some() || self.span() == 0) {
            return false;
        }
        self.start(items.clone());
        true
    }

    /// Advances the rotation by one step, as a timer tick would
    pub fn tick(&self) -> usize {
        advance(&self.active_index, self.span())
    }

    pub fn active_index(&self) -> usize {
        self.active_index.load(Ordering::SeqCst)
    }

    /// The items the carousel rotates over
    pub fn featured(&self) -> &[CatalogItem] {
        &self.items[..self.span()]
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    fn span(&self) -> usize {
        self.window_size.min(self.items.len())
    }

    async fn rotation_task(
        mut ticks: Box<dyn TickSource>,
        index: Arc<AtomicUsize>,
        span: usize,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                more = ticks.tick() => {
                    if !more {
                        break;
                    }
                    let next = advance(&index, span);
                    tracing::trace!(index = next, "Carousel rotated");
                }
            }
        }
    }
}

impl Drop for CarouselScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CarouselScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselScheduler")
            .field("window_size", &self.window_size)
            .field("items", &self.items.len())
            .field("active_index", &self.active_index())
            .field("running", &self.is_running())
            .finish()
    }
}

/// `index = (index + 1) mod span`; a zero span leaves it untouched
fn advance(index: &AtomicUsize, span: usize) -> usize {
    if span == 0 {
        return index.load(Ordering::SeqCst);
    }
    let previous = index
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| Some((i + 1) % span))
        .unwrap_or_else(|i| i);
    (previous + 1) % span
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiMovie;

    fn items(count: usize) -> Arc<[CatalogItem]> {
        (0..count)
            .map(|i| {
                CatalogItem::from(ApiMovie {
                    id: i.to_string(),
                    title: format!("Feature {}", i),
                    poster_path: String::new(),
                    imdb_id: String::new(),
                    genre: Vec::new(),
                    ranking: None,
                })
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn counting_ticks(period: Duration) -> (TickFactory, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let factory: TickFactory = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(IntervalTicks::new(period)) as Box<dyn TickSource>
        });
        (factory, created)
    }

    #[tokio::test]
    async fn test_five_items_window_two_alternates() {
        let mut carousel = CarouselScheduler::new(DEFAULT_INTERVAL, 2);
        carousel.start(items(5));

        let mut seen = vec![carousel.active_index()];
        for _ in 0..3 {
            seen.push(carousel.tick());
        }

        assert_eq!(seen, vec![0, 1, 0, 1]);
        assert_eq!(carousel.featured().len(), 2);
    }

    #[tokio::test]
    async fn test_single_item_stays_at_zero() {
        let mut carousel = CarouselScheduler::new(DEFAULT_INTERVAL, 2);
        carousel.start(items(1));

        for _ in 0..10 {
            assert_eq!(carousel.tick(), 0);
        }
        assert!(carousel.is_running());
    }

    #[tokio::test]
    async fn test_empty_items_never_create_timer() {
        let (factory, created) = counting_ticks(DEFAULT_INTERVAL);
        let mut carousel = CarouselScheduler::with_ticks(factory, 2);

        carousel.start(items(0));
        carousel.tick();

        assert!(!carousel.is_running());
        assert_eq!(carousel.active_index(), 0);
        assert!(carousel.featured().is_empty());
        assert_eq!(created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_rotates_every_interval() {
        let mut carousel = CarouselScheduler::new(Duration::from_millis(5000), 2);
        carousel.start(items(5));

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert_eq!(carousel.active_index(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(carousel.active_index(), 1);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(carousel.active_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_index() {
        let mut carousel = CarouselScheduler::new(Duration::from_millis(5000), 2);
        carousel.start(items(3));

        tokio::time::sleep(Duration::from_millis(5001)).await;
        assert_eq!(carousel.active_index(), 1);

        carousel.stop();
        assert!(!carousel.is_running());

        tokio::time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(carousel.active_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_index_and_replaces_timer() {
        let (factory, created) = counting_ticks(Duration::from_millis(5000));
        let mut carousel = CarouselScheduler::with_ticks(factory, 2);

        let first = items(4);
        carousel.start(first.clone());
        tokio::time::sleep(Duration::from_millis(5001)).await;
        assert_eq!(carousel.active_index(), 1);

        assert!(!carousel.restart_if_changed(&first));
        assert_eq!(created.load(Ordering::SeqCst), 1);

        let second = items(4);
        assert!(carousel.restart_if_changed(&second));
        assert_eq!(carousel.active_index(), 0);
        assert_eq!(created.load(Ordering::SeqCst), 2);

        // Only the new timer drives the index: one step per period
        tokio::time::sleep(Duration::from_millis(5001)).await;
        assert_eq!(carousel.active_index(), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_previous_list() {
        let mut carousel = CarouselScheduler::new(DEFAULT_INTERVAL, 2);
        carousel.start(items(3));
        carousel.tick();

        carousel.clear();

        assert!(!carousel.is_running());
        assert!(carousel.featured().is_empty());
        assert_eq!(carousel.active_index(), 0);
        assert_eq!(carousel.tick(), 0);
    }

    #[tokio::test]
    async fn test_window_larger_than_list() {
        let mut carousel = CarouselScheduler::new(DEFAULT_INTERVAL, 5);
        carousel.start(items(3));

        assert_eq!(carousel.featured().len(), 3);
        assert_eq!(carousel.tick(), 1);
        assert_eq!(carousel.tick(), 2);
        assert_eq!(carousel.tick(), 0);
    }
}
