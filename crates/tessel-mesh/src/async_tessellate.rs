//! Background tessellation: runs mesh-building jobs on a thread pool and
//! delivers finished meshes over a channel.
//!
//! Every worker owns one scratch [`MeshData`] that it clears and refills per
//! job; the main thread only ever receives independent copies. No mesh is
//! shared mutably between threads.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crate::mesh_data::{MeshData, MeshLayout};

/// A mesh-building job that fills the worker's scratch mesh.
pub type TessellationJob = Box<dyn FnOnce(&mut MeshData) + Send>;

/// A self-contained tessellation task that can run on any worker.
pub struct TessellationTask {
    /// Caller-chosen key used to match the result to its source.
    pub key: u64,
    /// Fills the (already cleared) scratch mesh.
    pub job: TessellationJob,
}

impl TessellationTask {
    pub fn new(key: u64, job: impl FnOnce(&mut MeshData) + Send + 'static) -> Self {
        Self {
            key,
            job: Box::new(job),
        }
    }
}

/// Why a task delivered no mesh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TessellationError {
    #[error("tessellation job panicked: {0}")]
    Panicked(String),
}

/// The result of a completed tessellation task.
pub struct TessellationResult {
    /// The key of the task that produced this mesh.
    pub key: u64,
    /// The finished mesh, owned by the receiver, or why the job failed.
    pub mesh: Result<MeshData, TessellationError>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Tessellation pipeline backed by a thread pool.
///
/// The main thread submits [`TessellationTask`]s via [`submit`](Self::submit)
/// and collects [`TessellationResult`]s via
/// [`drain_results`](Self::drain_results) without blocking.
pub struct TessellationPipeline {
    task_sender: Option<crossbeam_channel::Sender<TessellationTask>>,
    result_receiver: crossbeam_channel::Receiver<TessellationResult>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks queued or running at once.
    budget: usize,
    in_flight: Arc<AtomicUsize>,
}

impl TessellationPipeline {
    /// Spawns `worker_count` workers, each with a scratch mesh pre-sized to
    /// `vertices`/`indices` with the channels in `layout`.
    ///
    /// With `compact` set, results are compacted to exact size before they
    /// are sent; otherwise they keep the scratch mesh's capacity.
    pub fn new(
        worker_count: usize,
        budget: usize,
        layout: MeshLayout,
        vertices: usize,
        indices: usize,
        compact: bool,
    ) -> Self {
        let (task_tx, task_rx) = crossbeam_channel::bounded(budget.max(1));
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let rx: crossbeam_channel::Receiver<TessellationTask> = task_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            handles.push(std::thread::spawn(move || {
                let mut scratch = MeshData::with_capacity(vertices, indices, layout);
                while let Ok(TessellationTask { key, job }) = rx.recv() {
                    scratch.clear();
                    // The scratch mesh is cleared before every job, so a
                    // half-written mesh left by a panic is never observed.
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(&mut scratch)));

                    let mesh = match outcome {
                        Ok(()) => {
                            let mut mesh = scratch.clone();
                            if compact {
                                mesh.compact_buffers();
                            }
                            tracing::trace!(
                                worker,
                                key,
                                vertices = mesh.vertices_count(),
                                "tessellated"
                            );
                            Ok(mesh)
                        }
                        Err(payload) => {
                            let message = panic_message(&*payload);
                            tracing::error!(worker, key, %message, "tessellation job panicked");
                            Err(TessellationError::Panicked(message))
                        }
                    };

                    // Release the slot first: a received result implies a free slot.
                    flight.fetch_sub(1, Ordering::Relaxed);
                    let _ = tx.send(TessellationResult { key, mesh });
                }
            }));
        }

        Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
        }
    }

    /// Submit a task. Returns `false` if the budget is exhausted or the
    /// pipeline has been shut down.
    pub fn submit(&self, task: TessellationTask) -> bool {
        let Some(sender) = &self.task_sender else {
            return false;
        };
        if self.in_flight.load(Ordering::Relaxed) >= self.budget {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.send(task).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Drain all completed results without blocking.
    pub fn drain_results(&self) -> Vec<TessellationResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_receiver.try_recv() {
            results.push(result);
        }
        results
    }

    /// Number of tasks currently queued or being processed.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Shut down all workers: close the task channel, then join every thread.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for TessellationPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use glam::Vec3;

    use super::*;

    fn quad_job(z: f32) -> impl FnOnce(&mut MeshData) + Send + 'static {
        move |mesh: &mut MeshData| {
            for p in [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y] {
                mesh.add_vertex(p + Vec3::new(0.0, 0.0, z), [255; 4]);
            }
            mesh.add_quad_indices([0, 1, 2, 0, 2, 3]);
        }
    }

    fn wait_for(pipeline: &TessellationPipeline, n: usize) -> Vec<TessellationResult> {
        let mut received = Vec::new();
        let start = Instant::now();
        while received.len() < n {
            received.extend(pipeline.drain_results());
            assert!(start.elapsed().as_secs() < 10, "Timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
        received
    }

    /// A submitted task should produce the mesh its job builds.
    #[test]
    fn test_task_produces_mesh() {
        let pipeline = TessellationPipeline::new(2, 8, MeshLayout::default(), 16, 24, false);
        assert!(pipeline.submit(TessellationTask::new(7, quad_job(3.0))));

        let results = wait_for(&pipeline, 1);
        assert_eq!(results[0].key, 7);
        let mesh = results[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.vertices_count(), 4);
        assert_eq!(mesh.position(0), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(mesh.vertex_capacity(), 16);
    }

    /// Reusing a worker's scratch mesh must not leak data between jobs.
    #[test]
    fn test_scratch_mesh_is_cleared_between_jobs() {
        let pipeline = TessellationPipeline::new(1, 8, MeshLayout::default(), 4, 6, true);
        for key in 0..4 {
            assert!(pipeline.submit(TessellationTask::new(key, quad_job(key as f32))));
        }

        let mut results = wait_for(&pipeline, 4);
        results.sort_by_key(|r| r.key);
        for r in &results {
            let mesh = r.mesh.as_ref().unwrap();
            assert_eq!(mesh.vertices_count(), 4);
            assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
            assert_eq!(mesh.vertex_capacity(), 4, "compacted");
            assert_eq!(mesh.position(3).z, r.key as f32);
        }
    }

    /// Multiple concurrent tasks should not interfere with each other.
    #[test]
    fn test_concurrent_tasks_do_not_interfere() {
        let pipeline = TessellationPipeline::new(4, 16, MeshLayout::POSITIONS_ONLY, 4, 6, false);
        for key in 0..8 {
            assert!(pipeline.submit(TessellationTask::new(key, quad_job(key as f32))));
        }

        let mut keys: Vec<_> = wait_for(&pipeline, 8).iter().map(|r| r.key).collect();
        keys.sort();
        assert_eq!(keys, (0..8).collect::<Vec<_>>());
    }

    /// The budget should prevent submitting more tasks than allowed.
    #[test]
    fn test_budget_limits_active_tasks() {
        let pipeline = TessellationPipeline::new(1, 2, MeshLayout::POSITIONS_ONLY, 4, 6, false);
        let mut submitted = 0;
        for key in 0..10 {
            let job = move |mesh: &mut MeshData| {
                std::thread::sleep(Duration::from_millis(20));
                quad_job(key as f32)(mesh);
            };
            if pipeline.submit(TessellationTask::new(key, job)) {
                submitted += 1;
            }
        }
        assert!(
            submitted <= 4,
            "Budget should limit submissions, got {submitted}"
        );
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let mut pipeline = TessellationPipeline::new(1, 4, MeshLayout::POSITIONS_ONLY, 4, 6, false);
        pipeline.shutdown();
        assert!(!pipeline.submit(TessellationTask::new(0, quad_job(0.0))));
        assert_eq!(pipeline.in_flight_count(), 0);
    }

    /// A panicking job reports its key and frees its budget slot; the worker
    /// keeps serving later tasks.
    #[test]
    fn test_panicking_job_releases_budget() {
        let pipeline = TessellationPipeline::new(1, 1, MeshLayout::POSITIONS_ONLY, 4, 6, false);
        assert!(pipeline.submit(TessellationTask::new(1, |mesh: &mut MeshData| {
            mesh.add_normal(Vec3::Z);
        })));

        let failed = wait_for(&pipeline, 1);
        assert_eq!(failed[0].key, 1);
        match &failed[0].mesh {
            Err(TessellationError::Panicked(message)) => {
                assert!(message.contains("without a normal channel"), "{message}");
            }
            Ok(_) => panic!("job should have failed"),
        }
        assert_eq!(pipeline.in_flight_count(), 0);

        assert!(pipeline.submit(TessellationTask::new(2, quad_job(0.0))));
        let next = wait_for(&pipeline, 1);
        assert_eq!(next[0].key, 2);
        assert_eq!(next[0].mesh.as_ref().map(|m| m.vertices_count()), Ok(4));
    }
}
