//! Data producers: delayed computations that publish one section value.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use edge_core::LatencyRange;
use tokio::task::JoinHandle;

use crate::future::{section_future, SectionFuture, SectionWriter};

type BoxedWork<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// How long a simulated producer waits before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Publish right away.
    None,
    /// Always wait this long.
    Fixed(Duration),
    /// Wait a random time drawn from the range.
    Random(LatencyRange),
}

impl Delay {
    /// Pick the concrete delay for one run.
    pub fn resolve(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Random(range) => range.sample(&mut rand::thread_rng()),
        }
    }
}

impl From<LatencyRange> for Delay {
    fn from(range: LatencyRange) -> Self {
        Self::Random(range)
    }
}

/// A unit of work that computes one section's value and writes it exactly once.
pub struct Producer<T> {
    name: String,
    work: BoxedWork<T>,
}

impl<T: Send + 'static> Producer<T> {
    /// Producer that sleeps for `delay` and then calls `generate`.
    pub fn new<F>(name: impl Into<String>, delay: Delay, generate: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let work = async move {
            let wait = delay.resolve();
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            generate()
        };
        Self {
            name: name.into(),
            work: Box::pin(work),
        }
    }

    /// Producer backed by an arbitrary future, e.g. a real fetch.
    pub fn from_future<Fut>(name: impl Into<String>, work: Fut) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        Self {
            name: name.into(),
            work: Box::pin(work),
        }
    }

    /// Producer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run to completion and publish into `writer`.
    pub async fn run(self, writer: SectionWriter<T>) {
        let written = writer.write(self.work.await);
        debug_assert!(written.is_ok());
    }
}

/// The producers spawned for one request.
///
/// Producers run concurrently and unordered. Dropping the group aborts any
/// that are still running, so work does not outlive the request that
/// asked for it.
#[derive(Default)]
pub struct ProducerGroup {
    tasks: Vec<JoinHandle<()>>,
}

impl ProducerGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a producer and return the future its value will arrive on.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<T>(&mut self, producer: Producer<T>) -> SectionFuture<T>
    where
        T: Send + Sync + 'static,
    {
        let (writer, future) = section_future();
        self.tasks.push(tokio::spawn(producer.run(writer)));
        future
    }

    /// Number of producers spawned.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no producer was spawned.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Abort every producer that is still running.
    pub fn abort_all(&self) {
        for handle in &self.tasks {
            handle.abort();
        }
    }
}

impl Drop for ProducerGroup {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::future::FutureError;

    #[tokio::test(start_paused = true)]
    async fn test_producer_publishes_after_delay() {
        let mut group = ProducerGroup::new();
        let mut future = group.spawn(Producer::new(
            "profile",
            Delay::Fixed(Duration::from_millis(100)),
            || true,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!future.is_ready());

        let start = tokio::time::Instant::now();
        assert!(*future.read().await.unwrap());
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(50));
        assert!(waited < Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_producers_run_concurrently() {
        let mut group = ProducerGroup::new();
        let mut futures: Vec<_> = [300u64, 200, 100]
            .into_iter()
            .map(|ms| {
                let delay = Delay::Fixed(Duration::from_millis(ms));
                group.spawn(Producer::new("p", delay, move || ms))
            })
            .collect();
        assert_eq!(group.len(), 3);

        let start = tokio::time::Instant::now();
        for f in futures.iter_mut() {
            f.read().await.unwrap();
        }
        // Total is the slowest producer, not the sum.
        assert!(start.elapsed() < Duration::from_millis(310));
    }

    #[tokio::test]
    async fn test_from_future() {
        let mut group = ProducerGroup::new();
        let mut future = group.spawn(Producer::from_future("products", async { vec![1, 2, 3] }));
        assert_eq!(*future.read().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_running_producers() {
        let mut group = ProducerGroup::new();
        let mut future = group.spawn(Producer::new(
            "slow",
            Delay::Fixed(Duration::from_secs(60)),
            || 1u8,
        ));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!future.is_ready());

        drop(group);
        assert_eq!(future.read().await, Err(FutureError::Abandoned));
    }

    #[test]
    fn test_delay_resolve() {
        assert_eq!(Delay::None.resolve(), Duration::ZERO);
        assert_eq!(
            Delay::from(LatencyRange::fixed(25)).resolve(),
            Duration::from_millis(25)
        );
    }
}
