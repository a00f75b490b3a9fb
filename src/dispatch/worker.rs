// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-listener execution context.
//!
//! Each registered listener owns one worker: a FIFO queue drained by a
//! tokio task. The task runs one callback at a time on the blocking pool
//! and waits for it to return before taking the next delivery, so a
//! listener never sees two deliveries at once while distinct listeners run
//! in parallel. Handing work to the queue never waits on listener code.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::listener::{Delivery, Listener, ListenerHandle};

pub(crate) struct ListenerWorker {
    queue: mpsc::UnboundedSender<Delivery>,
    /// Deliveries queued or running.
    pending: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl ListenerWorker {
    /// Spawns the worker task for a listener on the given runtime.
    pub(crate) fn spawn(runtime: &Handle, handle: ListenerHandle, listener: Listener) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let task = runtime.spawn(run(handle, listener, rx, Arc::clone(&pending)));
        Self {
            queue,
            pending,
            task,
        }
    }

    /// Queues a delivery behind any deliveries still pending.
    ///
    /// Returns `false` if the worker has stopped.
    pub(crate) fn hand_off(&self, delivery: Delivery) -> bool {
        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.queue.send(delivery).is_ok() {
            true
        } else {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            false
        }
    }

    /// Number of deliveries queued or running.
    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Closes the queue. Deliveries already queued still run; the returned
    /// task finishes once they have.
    pub(crate) fn close(self) -> JoinHandle<()> {
        drop(self.queue);
        self.task
    }
}

async fn run(
    handle: ListenerHandle,
    listener: Listener,
    mut rx: mpsc::UnboundedReceiver<Delivery>,
    pending: Arc<AtomicUsize>,
) {
    tracing::debug!(%handle, kind = ?listener.kind(), "Listener worker started");

    while let Some(delivery) = rx.recv().await {
        let listener = listener.clone();
        let outcome = tokio::task::spawn_blocking(move || listener.invoke(&delivery)).await;
        pending.fetch_sub(1, Ordering::AcqRel);

        // A panicking callback only loses its own delivery.
        if let Err(e) = outcome
            && e.is_cancelled()
        {
            break;
        }
    }

    tracing::debug!(%handle, "Listener worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Notification, TopicId};
    use std::time::Duration;

    fn delivery(id: u64) -> Delivery {
        Delivery::Notification {
            topic_id: TopicId::new(id),
            notification: Arc::new(Notification::new()),
        }
    }

    #[tokio::test]
    async fn runs_deliveries_in_queue_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = Listener::notification(move |id: TopicId, _: &Notification| {
            let _ = tx.send(id.value());
        });
        let worker = ListenerWorker::spawn(&Handle::current(), ListenerHandle::new(1), listener);

        for id in 0..10 {
            assert!(worker.hand_off(delivery(id)));
        }

        let mut seen = Vec::new();
        for _ in 0..10 {
            seen.push(rx.recv().await.unwrap());
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn close_drains_queued_deliveries() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = Listener::notification(move |id: TopicId, _: &Notification| {
            std::thread::sleep(Duration::from_millis(2));
            let _ = tx.send(id.value());
        });
        let worker = ListenerWorker::spawn(&Handle::current(), ListenerHandle::new(1), listener);

        for id in 0..5 {
            worker.hand_off(delivery(id));
        }
        worker.close().await.unwrap();

        let mut seen = Vec::new();
        while let Ok(id) = rx.try_recv() {
            seen.push(id);
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn panicking_callback_does_not_stop_worker() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = Listener::notification(move |id: TopicId, _: &Notification| {
            assert_ne!(id.value(), 1, "boom");
            let _ = tx.send(id.value());
        });
        let worker = ListenerWorker::spawn(&Handle::current(), ListenerHandle::new(1), listener);

        worker.hand_off(delivery(1));
        worker.hand_off(delivery(2));

        assert_eq!(rx.recv().await, Some(2));
        worker.close().await.unwrap();
    }

    #[tokio::test]
    async fn pending_tracks_unfinished_deliveries() {
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = parking_lot::Mutex::new(release_rx);
        let listener = Listener::notification(move |_: TopicId, _: &Notification| {
            let _ = release_rx.lock().recv();
        });
        let worker = ListenerWorker::spawn(&Handle::current(), ListenerHandle::new(1), listener);

        worker.hand_off(delivery(1));
        worker.hand_off(delivery(2));
        assert_eq!(worker.pending(), 2);

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        let task = worker.close();
        task.await.unwrap();
    }
}
