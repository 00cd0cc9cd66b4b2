// THEORY:
// The `session` module is the asynchronous front door for hosts that receive
// frames from a camera callback, a socket, or several producers at once. It wraps
// the synchronous `GesturePipeline` in a single tokio worker task.
//
// Key architectural principles:
// 1.  **Single Writer**: Exactly one task owns the pipeline. Producers never touch
//     the stabilizer; they enqueue frames on an mpsc channel, which serialises them
//     in arrival order. The read-modify-write of the run-length state therefore
//     happens in one place, one frame at a time.
// 2.  **Fan-Out Events**: Confirmed gestures are published on a broadcast bus so any
//     number of consumers (speech, transcript, UI) can subscribe independently.
// 3.  **Live State**: The latest confirmed gesture and a few counters are kept in a
//     `watch` channel, always readable without waiting for the next event.
// 4.  **Cancellation by Epoch**: Stopping bumps a control epoch. Every queued frame
//     carries the epoch it was submitted under, and frames from an older epoch are
//     dropped without being classified. The stabilizer is reset on the epoch change,
//     so a restart always begins unconfirmed.

use crate::core_modules::landmark::Landmark;
use crate::pipeline::{
    CurrentGesture, GesturePipeline, PipelineConfig, Report, StabilizedGestureEvent,
};
use std::fmt;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const FRAME_QUEUE_SIZE: usize = 64;
const EVENT_BUS_CAPACITY: usize = 32;

/// One frame's landmarks as delivered by a tracker; `None` when no hand is visible.
pub type FrameInput = Option<Vec<Landmark>>;

/// A point-in-time view of the session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackingSnapshot {
    pub current: CurrentGesture,
    pub frames_processed: u64,
    pub frames_discarded: u64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ControlState {
    active: bool,
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The worker task is no longer accepting frames.
    Closed,
    /// The worker task panicked.
    WorkerFailed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Closed => f.write_str("tracking session is closed"),
            SessionError::WorkerFailed => f.write_str("tracking session worker failed"),
        }
    }
}

impl std::error::Error for SessionError {}

pub struct TrackingSession {
    frames_tx: mpsc::Sender<(u64, FrameInput)>,
    events_tx: broadcast::Sender<StabilizedGestureEvent>,
    snapshot_rx: watch::Receiver<TrackingSnapshot>,
    control_tx: watch::Sender<ControlState>,
    worker: JoinHandle<()>,
}

impl TrackingSession {
    /// Spawns the worker on the current tokio runtime. The session starts active.
    pub fn spawn(config: PipelineConfig) -> Self {
        let (frames_tx, frames_rx) = mpsc::channel(FRAME_QUEUE_SIZE);
        let (events_tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        let initial = ControlState {
            active: true,
            epoch: 0,
        };
        let (control_tx, control_rx) = watch::channel(initial);
        let (snapshot_tx, snapshot_rx) = watch::channel(TrackingSnapshot {
            active: true,
            ..TrackingSnapshot::default()
        });

        let worker = Worker {
            pipeline: GesturePipeline::new(config),
            control: initial,
            control_rx,
            events_tx: events_tx.clone(),
            snapshot_tx,
            frames_discarded: 0,
        };
        let worker = tokio::spawn(worker.run(frames_rx));

        Self {
            frames_tx,
            events_tx,
            snapshot_rx,
            control_tx,
            worker,
        }
    }

    /// Queues a frame for classification. Waits if the queue is full.
    pub async fn submit(&self, frame: FrameInput) -> Result<(), SessionError> {
        let epoch = self.control_tx.borrow().epoch;
        self.frames_tx
            .send((epoch, frame))
            .await
            .map_err(|_| SessionError::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StabilizedGestureEvent> {
        self.events_tx.subscribe()
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        *self.snapshot_rx.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<TrackingSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stops tracking. Frames already queued are discarded and the current run is
    /// dropped; nothing is emitted for them.
    pub fn stop(&self) {
        self.control_tx.send_modify(|control| {
            control.active = false;
            control.epoch += 1;
        });
    }

    /// Resumes tracking after `stop`.
    pub fn start(&self) {
        self.control_tx.send_modify(|control| control.active = true);
    }

    /// Closes the frame queue, lets the worker finish what it has, and joins it.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        let Self {
            frames_tx, worker, ..
        } = self;
        drop(frames_tx);
        worker.await.map_err(|_| SessionError::WorkerFailed)
    }
}

struct Worker {
    pipeline: GesturePipeline,
    control: ControlState,
    control_rx: watch::Receiver<ControlState>,
    events_tx: broadcast::Sender<StabilizedGestureEvent>,
    snapshot_tx: watch::Sender<TrackingSnapshot>,
    frames_discarded: u64,
}

impl Worker {
    async fn run(mut self, mut frames_rx: mpsc::Receiver<(u64, FrameInput)>) {
        loop {
            tokio::select! {
                biased;
                changed = self.control_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.sync_control();
                }
                frame = frames_rx.recv() => {
                    let Some((epoch, frame)) = frame else {
                        break;
                    };
                    self.handle_frame(epoch, frame);
                }
            }
        }
        debug!(
            frames = self.pipeline.frames_processed(),
            discarded = self.frames_discarded,
            "tracking session worker exiting"
        );
    }

    fn sync_control(&mut self) {
        let next = *self.control_rx.borrow_and_update();
        if next.epoch != self.control.epoch {
            self.pipeline.reset();
            info!(epoch = next.epoch, "gesture tracking stopped; stabilizer reset");
        }
        if next.active && !self.control.active {
            info!(epoch = next.epoch, "gesture tracking started");
        }
        self.control = next;
        self.publish();
    }

    fn handle_frame(&mut self, epoch: u64, frame: FrameInput) {
        if epoch != self.control.epoch {
            // The stop that made this frame stale may not have been observed yet.
            self.sync_control();
        }
        if !self.control.active || epoch != self.control.epoch {
            self.frames_discarded += 1;
            debug!(epoch, "discarding frame from a stopped session");
            self.publish();
            return;
        }

        let analysis = self.pipeline.analyze(frame.as_deref());
        if let Report::GestureConfirmed(event) = analysis.report {
            // No subscribers is fine; the snapshot still carries the state.
            let _ = self.events_tx.send(event);
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = TrackingSnapshot {
            current: self.pipeline.current_state(),
            frames_processed: self.pipeline.frames_processed(),
            frames_discarded: self.frames_discarded,
            active: self.control.active,
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}
