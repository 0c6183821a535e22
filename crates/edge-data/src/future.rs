//! Single-assignment handoff between a producer and the page writer.

use std::sync::Arc;

use tokio::sync::watch;

/// Error type for section future operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FutureError {
    #[error("Section value already written")]
    AlreadyWritten,

    #[error("Writer dropped without a value")]
    Abandoned,
}

/// Create a connected writer/future pair.
pub fn section_future<T>() -> (SectionWriter<T>, SectionFuture<T>) {
    let (tx, rx) = watch::channel(None);
    (SectionWriter { tx }, SectionFuture { rx })
}

/// Write half. Accepts exactly one value.
#[derive(Debug)]
pub struct SectionWriter<T> {
    tx: watch::Sender<Option<Arc<T>>>,
}

impl<T> SectionWriter<T> {
    /// Publish the value. A second call fails with [`FutureError::AlreadyWritten`]
    /// and leaves the first value in place.
    pub fn write(&self, value: T) -> Result<(), FutureError> {
        let mut value = Some(Arc::new(value));
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = value.take();
            true
        });

        match value {
            None => Ok(()),
            Some(_) => Err(FutureError::AlreadyWritten),
        }
    }

    /// Whether a value has been written.
    pub fn is_written(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

/// Read half. Suspends until the value exists.
#[derive(Debug)]
pub struct SectionFuture<T> {
    rx: watch::Receiver<Option<Arc<T>>>,
}

impl<T> SectionFuture<T> {
    /// Wait for the value.
    ///
    /// Once written, every call returns the same value without waiting.
    /// Fails with [`FutureError::Abandoned`] if the writer is dropped first.
    /// There is no timeout: a producer that never writes blocks this forever.
    pub async fn read(&mut self) -> Result<Arc<T>, FutureError> {
        let slot = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| FutureError::Abandoned)?
            .clone();
        slot.ok_or(FutureError::Abandoned)
    }

    /// The value if it is already there.
    pub fn try_read(&self) -> Option<Arc<T>> {
        self.rx.borrow().clone()
    }

    /// Whether the value has been written.
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_read_waits_for_write() {
        let (writer, mut future) = section_future::<u32>();
        assert!(!future.is_ready());

        let task = tokio::spawn(async move { future.read().await });
        tokio::task::yield_now().await;
        writer.write(7).unwrap();

        let value = timeout(Duration::from_millis(100), task)
            .await
            .expect("read should finish after write")
            .unwrap()
            .unwrap();
        assert_eq!(*value, 7);
    }

    #[tokio::test]
    async fn test_second_read_returns_same_value_immediately() {
        let (writer, mut future) = section_future::<Vec<String>>();
        writer.write(vec!["Category 1".into()]).unwrap();

        let first = future.read().await.unwrap();
        let second = timeout(Duration::from_millis(10), future.read())
            .await
            .expect("second read must not block")
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_second_write_rejected() {
        let (writer, mut future) = section_future::<bool>();
        writer.write(true).unwrap();
        assert_eq!(writer.write(false), Err(FutureError::AlreadyWritten));
        assert!(writer.is_written());
        assert!(*future.read().await.unwrap());
    }

    #[tokio::test]
    async fn test_value_survives_writer_drop() {
        let (writer, mut future) = section_future::<u8>();
        writer.write(1).unwrap();
        drop(writer);
        assert_eq!(*future.read().await.unwrap(), 1);
        assert_eq!(future.try_read().map(|v| *v), Some(1));
    }

    #[tokio::test]
    async fn test_dropped_writer_abandons_reader() {
        let (writer, mut future) = section_future::<u8>();
        drop(writer);
        assert_eq!(future.read().await, Err(FutureError::Abandoned));
    }

    #[tokio::test]
    async fn test_unwritten_read_blocks() {
        let (_writer, mut future) = section_future::<u8>();
        assert!(timeout(Duration::from_millis(20), future.read())
            .await
            .is_err());
    }
}
