//! Asynchronous chunk generation on a worker thread pool.
//!
//! Workers only compute [`GeneratedSurface`] values from a shared
//! [`ChunkGenerator`]; tiles are written on the main thread when results are
//! drained. Each job carries a ticket so a result that arrives after its tile
//! was released or reassigned can be recognised and dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use dashmap::DashMap;
use verdant_terrain::ChunkCoord;

use crate::generator::{ChunkGenerator, GeneratedSurface};

/// A request to generate a single chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationJob {
    /// Chunk to generate.
    pub coord: ChunkCoord,
    /// Identifies this request; matched against the tile's pending ticket.
    pub ticket: u64,
}

/// A completed job.
#[derive(Debug)]
pub struct FinishedJob {
    /// The job that produced this result.
    pub job: GenerationJob,
    /// The generated surface.
    pub surface: GeneratedSurface,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

/// Internal wrapper that carries the job and its cancellation flag.
struct QueuedJob {
    job: GenerationJob,
    cancelled: Arc<AtomicBool>,
}

/// Runs chunk generation across a thread pool.
pub struct AsyncChunkGenerator {
    /// Sender for submitting jobs.
    job_sender: Sender<QueuedJob>,
    /// Receiver for collecting results on the main thread.
    result_receiver: Receiver<FinishedJob>,
    /// Cancellation flag per job, keyed by ticket.
    active_jobs: Arc<DashMap<u64, Arc<AtomicBool>>>,
    /// Jobs queued or executing.
    in_flight: Arc<AtomicU64>,
    capacity: usize,
}

impl AsyncChunkGenerator {
    /// Starts `thread_count` workers sharing `generator`.
    ///
    /// At most `max_in_flight` jobs are accepted at once; further submissions
    /// are handed back.
    pub fn new(
        generator: Arc<ChunkGenerator>,
        thread_count: usize,
        max_in_flight: usize,
    ) -> std::io::Result<Self> {
        let capacity = max_in_flight.max(1);
        let (job_sender, job_receiver) = bounded::<QueuedJob>(capacity);
        let (result_sender, result_receiver) = unbounded::<FinishedJob>();
        let in_flight = Arc::new(AtomicU64::new(0));

        for i in 0..thread_count.max(1) {
            let receiver = job_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let generator = Arc::clone(&generator);

            std::thread::Builder::new()
                .name(format!("chunk-gen-worker-{i}"))
                .spawn(move || {
                    let mut scratch = GeneratedSurface::default();
                    while let Ok(queued) = receiver.recv() {
                        // Check cancellation before starting work.
                        if queued.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        generator.generate(queued.job.coord, &mut scratch);
                        let elapsed = start.elapsed().as_micros() as u64;

                        // Check cancellation after generation.
                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(FinishedJob {
                                job: queued.job,
                                surface: std::mem::take(&mut scratch),
                                generation_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }

        Ok(Self {
            job_sender,
            result_receiver,
            active_jobs: Arc::new(DashMap::new()),
            in_flight,
            capacity,
        })
    }

    /// Most workers worth starting on this machine: one per core.
    pub fn max_useful_threads() -> usize {
        num_cpus::get().max(1)
    }

    /// Submit a job for background generation.
    ///
    /// Returns `Err(job)` if `max_in_flight` jobs are already pending.
    pub fn submit(&self, job: GenerationJob) -> Result<(), GenerationJob> {
        if self.in_flight.load(Ordering::Relaxed) >= self.capacity as u64 {
            return Err(job);
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active_jobs.insert(job.ticket, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.job_sender
            .try_send(QueuedJob { job, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let job = e.into_inner().job;
                self.active_jobs.remove(&job.ticket);
                job
            })
    }

    /// Cancel a pending or running job. No-op if it already completed.
    pub fn cancel(&self, ticket: u64) {
        if let Some((_, cancelled)) = self.active_jobs.remove(&ticket) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drain all completed jobs. Call once per tick on the main thread.
    pub fn drain_results(&self) -> Vec<FinishedJob> {
        let mut results = Vec::new();
        while let Ok(done) = self.result_receiver.try_recv() {
            self.active_jobs.remove(&done.job.ticket);
            results.push(done);
        }
        results
    }

    /// Blocks until one result is available or `timeout` elapses.
    pub fn wait_result(&self, timeout: std::time::Duration) -> Option<FinishedJob> {
        let done = self.result_receiver.recv_timeout(timeout).ok()?;
        self.active_jobs.remove(&done.job.ticket);
        Some(done)
    }

    /// Number of jobs currently in flight (queued or executing).
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a job with `ticket` is still pending.
    pub fn is_pending(&self, ticket: u64) -> bool {
        self.active_jobs.contains_key(&ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use verdant_config::Config;

    fn generator() -> Arc<ChunkGenerator> {
        generator_with(8)
    }

    fn generator_with(chunk_resolution: u32) -> Arc<ChunkGenerator> {
        let mut config = Config::with_default_biomes();
        config.world.chunk_resolution = chunk_resolution;
        Arc::new(ChunkGenerator::from_config(&config).unwrap())
    }

    fn wait_all(workers: &AsyncChunkGenerator, n: usize) -> Vec<FinishedJob> {
        let mut out = Vec::new();
        while out.len() < n {
            match workers.wait_result(Duration::from_secs(10)) {
                Some(done) => out.push(done),
                None => break,
            }
        }
        out
    }

    #[test]
    fn test_results_match_sync_generation() {
        let generator = generator();
        let workers = AsyncChunkGenerator::new(Arc::clone(&generator), 2, 8).unwrap();
        let coord = ChunkCoord::new(3, 4);
        workers.submit(GenerationJob { coord, ticket: 1 }).unwrap();

        let results = wait_all(&workers, 1);
        assert_eq!(results.len(), 1);
        let mut expected = GeneratedSurface::default();
        generator.generate(coord, &mut expected);
        assert_eq!(results[0].job.ticket, 1);
        assert_eq!(results[0].surface.surface.heights, expected.surface.heights);
        assert_eq!(results[0].surface.placements, expected.placements);
    }

    #[test]
    fn test_submit_rejects_over_capacity() {
        // Large chunks keep the single worker busy while the loop submits.
        let workers = AsyncChunkGenerator::new(generator_with(128), 1, 2).unwrap();
        let mut accepted = 0;
        let mut rejected = 0;
        for ticket in 0..50 {
            let job = GenerationJob {
                coord: ChunkCoord::new(ticket as i32, 0),
                ticket,
            };
            match workers.submit(job) {
                Ok(()) => accepted += 1,
                Err(back) => {
                    assert_eq!(back, job);
                    rejected += 1;
                }
            }
        }
        assert!(accepted >= 2);
        assert!(rejected > 0);
        assert!(workers.in_flight_count() <= 2);
    }

    #[test]
    fn test_many_jobs_complete() {
        let workers = AsyncChunkGenerator::new(generator(), 3, 32).unwrap();
        for ticket in 0..16u64 {
            workers
                .submit(GenerationJob {
                    coord: ChunkCoord::new(ticket as i32 % 4, ticket as i32 / 4),
                    ticket,
                })
                .unwrap();
        }
        let results = wait_all(&workers, 16);
        assert_eq!(results.len(), 16);
        let mut tickets: Vec<u64> = results.iter().map(|r| r.job.ticket).collect();
        tickets.sort_unstable();
        assert_eq!(tickets, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel_clears_pending_flag() {
        let workers = AsyncChunkGenerator::new(generator(), 1, 4).unwrap();
        workers
            .submit(GenerationJob {
                coord: ChunkCoord::new(0, 0),
                ticket: 7,
            })
            .unwrap();
        workers.cancel(7);
        assert!(!workers.is_pending(7));
        // Cancelling an unknown ticket is harmless.
        workers.cancel(999);
    }
}
