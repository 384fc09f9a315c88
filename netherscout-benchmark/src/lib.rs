use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct BenchmarkMetrics {
    // Obsidian queries
    pub total_obsidian_requests: AtomicUsize,
    pub total_obsidian_time_us: AtomicU64,
    pub max_obsidian_time_us: AtomicU64,
    pub total_missing_structures: AtomicUsize,

    // Terrain queries
    pub total_terrain_requests: AtomicUsize,
    pub total_terrain_time_us: AtomicU64,
    pub max_terrain_time_us: AtomicU64,
    pub total_viable_routes: AtomicUsize,

    // Oracle breakdown
    pub total_structure_oracle_us: AtomicU64,
    pub total_terrain_oracle_us: AtomicU64,
    pub total_chunks_generated: AtomicUsize,
    pub total_chunk_generation_us: AtomicU64,

    // Session
    pub start_time: Option<Instant>,
}

impl BenchmarkMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_obsidian_request(&self, duration: Duration, found: bool) {
        self.total_obsidian_requests.fetch_add(1, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_obsidian_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_obsidian_time_us.fetch_max(us, Ordering::Relaxed);
        if !found {
            self.total_missing_structures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_terrain_request(&self, duration: Duration, viable: bool) {
        self.total_terrain_requests.fetch_add(1, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_terrain_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_terrain_time_us.fetch_max(us, Ordering::Relaxed);
        if viable {
            self.total_viable_routes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_structure_oracle(&self, duration: Duration) {
        self.total_structure_oracle_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_terrain_oracle(&self, duration: Duration) {
        self.total_terrain_oracle_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_chunk_generation(&self, duration: Duration) {
        self.total_chunks_generated.fetch_add(1, Ordering::Relaxed);
        self.total_chunk_generation_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();

        let obsidian = self.total_obsidian_requests.load(Ordering::Relaxed);
        let obsidian_total = self.total_obsidian_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let obsidian_max = self.max_obsidian_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let obsidian_avg = average(obsidian_total, obsidian);
        let missing = self.total_missing_structures.load(Ordering::Relaxed);
        let structure_oracle = self.total_structure_oracle_us.load(Ordering::Relaxed) as f64 / 1000.0;

        let terrain = self.total_terrain_requests.load(Ordering::Relaxed);
        let terrain_total = self.total_terrain_time_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let terrain_max = self.max_terrain_time_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let terrain_avg = average(terrain_total, terrain);
        let viable = self.total_viable_routes.load(Ordering::Relaxed);
        let terrain_oracle = self.total_terrain_oracle_us.load(Ordering::Relaxed) as f64 / 1000.0;

        let chunks = self.total_chunks_generated.load(Ordering::Relaxed);
        let chunk_time = self.total_chunk_generation_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let chunk_avg = average(chunk_time, chunks);

        format!(
            "Netherscout Benchmark Report\n\
             ============================\n\
             Session Duration: {:.2?}\n\n\
             [Obsidian Queries]\n\
             Requests: {}\n\
             No Structure: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.2} ms/request\n\
             Max Time: {:.2} ms\n\
               - Structure Oracle: {:.2} ms/request\n\n\
             [Terrain Queries]\n\
             Requests: {}\n\
             Viable: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.2} ms/request\n\
             Max Time: {:.2} ms\n\
               - Terrain Oracle: {:.2} ms/request\n\n\
             [Chunk Generation]\n\
             Chunks Generated: {}\n\
             Avg Time: {:.2} ms/chunk\n",
            uptime,
            obsidian, missing, obsidian_total, obsidian_avg, obsidian_max,
            average(structure_oracle, obsidian),
            terrain, viable, terrain_total, terrain_avg, terrain_max,
            average(terrain_oracle, terrain),
            chunks, chunk_avg
        )
    }
}

fn average(total_ms: f64, count: usize) -> f64 {
    if count > 0 { total_ms / count as f64 } else { 0.0 }
}
