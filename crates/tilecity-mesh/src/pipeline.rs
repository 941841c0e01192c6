//! Region meshing pipeline: builds the map's N×N column regions on a thread
//! pool and delivers the meshes over a channel.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};
use tilecity_map::Map;

use crate::builder::{MeshBuilder, Region, TileUvSource};
use crate::region_mesh::RegionMesh;

/// Meshing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Columns per region side.
    pub region_size: u32,
    /// Edge length of one block in world units.
    pub block_size: f32,
    /// Worker threads; 0 means one per logical CPU.
    pub worker_count: usize,
    /// Maximum regions queued or in progress at once.
    pub budget: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            region_size: 16,
            block_size: 1.0,
            worker_count: 0,
            budget: 64,
        }
    }
}

/// Index of a region in the region grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub y: u32,
    pub x: u32,
}

impl RegionCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The column window covered by this region.
    pub fn region(&self, region_size: u32) -> Region {
        Region::new(
            self.x * region_size,
            self.y * region_size,
            region_size,
            region_size,
        )
    }
}

/// A finished region. Empty regions carry empty buffers.
#[derive(Debug)]
pub struct RegionResult {
    pub coord: RegionCoord,
    pub mesh: RegionMesh,
}

/// Thread-pool mesher over one shared map and tile source.
///
/// Regions are submitted with [`submit`](Self::submit) and collected with
/// [`drain_results`](Self::drain_results), or all at once with
/// [`build_all`](Self::build_all).
pub struct RegionPipeline {
    task_sender: Option<crossbeam_channel::Sender<RegionCoord>>,
    result_receiver: crossbeam_channel::Receiver<RegionResult>,
    worker_handles: Vec<JoinHandle<()>>,
    budget: usize,
    in_flight: Arc<AtomicUsize>,
    grid: (u32, u32),
}

impl RegionPipeline {
    pub fn new<S>(map: Arc<Map>, tiles: Arc<S>, settings: &MeshSettings) -> Self
    where
        S: TileUvSource + Send + Sync + ?Sized + 'static,
    {
        let region_size = settings.region_size.max(1);
        let worker_count = match settings.worker_count {
            0 => num_cpus::get(),
            n => n,
        };
        let budget = settings.budget.max(1);

        let (task_tx, task_rx) = crossbeam_channel::bounded(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let grid = (
            (map.width() as u32).div_ceil(region_size),
            (map.height() as u32).div_ceil(region_size),
        );

        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let rx: crossbeam_channel::Receiver<RegionCoord> = task_rx.clone();
            let tx = result_tx.clone();
            let map = Arc::clone(&map);
            let tiles = Arc::clone(&tiles);
            let flight = Arc::clone(&in_flight);
            let block_size = settings.block_size;

            handles.push(std::thread::spawn(move || {
                let builder = MeshBuilder::new(&map, &*tiles).with_block_size(block_size);
                while let Ok(coord) = rx.recv() {
                    let mesh = builder.build(coord.region(region_size));
                    // released before sending so a receiver never sees a stale count
                    flight.fetch_sub(1, Ordering::AcqRel);
                    let _ = tx.send(RegionResult { coord, mesh });
                }
            }));
        }

        tracing::debug!(
            workers = worker_count,
            budget,
            region_size,
            "region pipeline started"
        );

        Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
            grid,
        }
    }

    /// Regions per axis as `(columns, rows)`.
    pub fn grid(&self) -> (u32, u32) {
        self.grid
    }

    /// Every region coordinate, row by row.
    pub fn coords(&self) -> impl Iterator<Item = RegionCoord> + use<> {
        let (columns, rows) = self.grid;
        (0..rows).flat_map(move |y| (0..columns).map(move |x| RegionCoord::new(x, y)))
    }

    /// Queues a region. Returns `false` if the budget is exhausted or the
    /// pipeline has been shut down.
    pub fn submit(&self, coord: RegionCoord) -> bool {
        let Some(sender) = &self.task_sender else {
            return false;
        };
        let reserved = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.budget).then_some(n + 1)
            });
        if reserved.is_err() {
            return false;
        }
        if sender.send(coord).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        true
    }

    /// Collects every finished region without blocking.
    pub fn drain_results(&self) -> Vec<RegionResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Regions queued or being built.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Meshes every region of the map and returns the results ordered by
    /// coordinate.
    pub fn build_all(&self) -> Vec<RegionResult> {
        let mut pending: VecDeque<RegionCoord> = self.coords().collect();
        let total = pending.len();
        let mut results = Vec::with_capacity(total);

        while results.len() < total {
            while let Some(&coord) = pending.front() {
                if !self.submit(coord) {
                    break;
                }
                pending.pop_front();
            }
            if self.task_sender.is_none() && self.in_flight_count() == 0 {
                break;
            }
            match self.result_receiver.recv() {
                Ok(result) => results.push(result),
                Err(_) => break,
            }
        }

        results.sort_by_key(|r| r.coord);
        let non_empty = results.iter().filter(|r| !r.mesh.is_empty()).count();
        let triangles: usize = results.iter().map(|r| r.mesh.triangle_count()).sum();
        tracing::info!(regions = results.len(), non_empty, triangles, "map meshed");
        results
    }

    /// Stops the workers and joins them.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for RegionPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
