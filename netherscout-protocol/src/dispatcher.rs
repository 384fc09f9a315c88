use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Instant;

use netherscout_benchmark::BenchmarkMetrics;
use netherscout_core::loot::obsidian_score;
use netherscout_core::terrain::is_terrain_path_viable;
use netherscout_core::{ChestClassifier, ChunkPos, Column};
use netherscout_gen::{StructureGenerator, TerrainGenerator};

use crate::error::ProtocolError;
use crate::wire::{self, Command, ObsidianQuery, Request, Response, TerrainQuery};

/// Counts of the requests answered before the host closed the pipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub obsidian_requests: usize,
    pub terrain_requests: usize,
}

/// Answers host queries one at a time until the input stream ends.
pub struct Dispatcher<'a> {
    structures: &'a dyn StructureGenerator,
    terrain: &'a dyn TerrainGenerator,
    classifier: ChestClassifier,
    benchmark: Option<Arc<BenchmarkMetrics>>,
    // Only the first `payload_len()` bytes of the current command are read
    // and decoded, all of them overwritten by that request.
    payload: [u8; wire::MAX_PAYLOAD_LEN],
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        structures: &'a dyn StructureGenerator,
        terrain: &'a dyn TerrainGenerator,
        classifier: ChestClassifier,
    ) -> Self {
        Self {
            structures,
            terrain,
            classifier,
            benchmark: None,
            payload: [0; wire::MAX_PAYLOAD_LEN],
        }
    }

    pub fn with_benchmark(mut self, benchmark: Option<Arc<BenchmarkMetrics>>) -> Self {
        self.benchmark = benchmark;
        self
    }

    /// Writes the handshake, then serves requests until end of input.
    ///
    /// End of input, even in the middle of a payload, is a normal shutdown.
    /// Every response is flushed before the next command is read.
    pub fn serve<R: Read, W: Write>(&mut self, mut input: R, mut output: W) -> Result<SessionSummary, ProtocolError> {
        output.write_all(&wire::HANDSHAKE)?;
        output.flush()?;
        log::info!("Handshake sent, awaiting commands");

        let mut summary = SessionSummary::default();
        while let Some(request) = self.next_request(&mut input)? {
            let response = self.handle(&request)?;
            output.write_all(&[response.to_byte()])?;
            output.flush()?;
            log::debug!("{:?} -> {:?}", request, response);

            match request.command() {
                Command::Obsidian => summary.obsidian_requests += 1,
                Command::Terrain => summary.terrain_requests += 1,
            }
        }

        log::info!(
            "Input closed after {} obsidian and {} terrain requests",
            summary.obsidian_requests,
            summary.terrain_requests
        );
        Ok(summary)
    }

    /// Reads one command and its payload. `None` once the stream is closed.
    pub fn next_request<R: Read + ?Sized>(&mut self, input: &mut R) -> Result<Option<Request>, ProtocolError> {
        let mut command = [0u8; 1];
        if !wire::read_frame(input, &mut command)? {
            return Ok(None);
        }

        let command = Command::from_byte(command[0]).ok_or(ProtocolError::UnknownCommand(command[0]))?;
        let payload = &mut self.payload[..command.payload_len()];
        if !wire::read_frame(input, payload)? {
            log::debug!("Input closed inside a {:?} payload", command);
            return Ok(None);
        }

        Ok(Some(Request::decode(command, payload)))
    }

    pub fn handle(&self, request: &Request) -> Result<Response, ProtocolError> {
        match request {
            Request::Obsidian(query) => self.handle_obsidian(query),
            Request::Terrain(query) => self.handle_terrain(query),
        }
    }

    fn handle_obsidian(&self, query: &ObsidianQuery) -> Result<Response, ProtocolError> {
        let start = Instant::now();
        let chunk = ChunkPos::new(i32::from(query.chunk_x), i32::from(query.chunk_z));

        let bastion = self
            .structures
            .generate_bastion(query.seed, chunk)
            .map_err(ProtocolError::Oracle)?;
        if let Some(bench) = &self.benchmark {
            bench.record_structure_oracle(start.elapsed());
        }

        let response = match bastion {
            Some(bastion) => Response::Obsidian(obsidian_score(&bastion, &self.classifier)),
            None => Response::NoStructure,
        };

        if let Some(bench) = &self.benchmark {
            bench.record_obsidian_request(start.elapsed(), response != Response::NoStructure);
        }
        Ok(response)
    }

    fn handle_terrain(&self, query: &TerrainQuery) -> Result<Response, ProtocolError> {
        let start = Instant::now();
        let bastion = Column::bastion_anchor(query.bastion_chunk_x, query.bastion_chunk_z);
        let fortress = Column::fortress_anchor(query.fortress_chunk_x, query.fortress_chunk_z);

        let terrain = self.terrain.terrain(query.seed).map_err(ProtocolError::Oracle)?;
        if let Some(bench) = &self.benchmark {
            bench.record_terrain_oracle(start.elapsed());
        }

        let verdict = is_terrain_path_viable(bastion, fortress, &*terrain);
        if let Some(bench) = &self.benchmark {
            bench.record_terrain_request(start.elapsed(), verdict.viable);
        }

        Ok(Response::Terrain(verdict.viable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::HANDSHAKE;
    use netherscout_core::{Bastion, BlockKind, TerrainSample};
    use netherscout_gen::NoStructures;
    use netherscout_gen::fixture::FixtureStructures;
    use netherscout_gen::flat::FlatGenerator;
    use std::io::Cursor;

    const FIXTURE: &str = r#"{
        "bastions": [
            { "seed": 7, "chunk_x": 0, "chunk_z": 0, "variant": "bridge",
              "chests": [ { "pos": [3, 40, 3], "items": [ { "item": "obsidian", "count": 9 } ] } ] },
            { "seed": 7, "chunk_x": -2, "chunk_z": 1, "variant": "treasure",
              "chests": [
                { "pos": [-20, 82, 20], "items": [ { "item": "obsidian", "count": 120 } ] },
                { "pos": [-20, 82, 21], "items": [ { "item": "obsidian", "count": 20 } ] } ] }
        ]
    }"#;

    fn obsidian(seed: i64, chunk_x: i8, chunk_z: i8) -> Vec<u8> {
        Request::Obsidian(ObsidianQuery { seed, chunk_x, chunk_z }).encode()
    }

    fn terrain(seed: i64, bastion: (i8, i8), fortress: (i8, i8)) -> Vec<u8> {
        Request::Terrain(TerrainQuery {
            seed,
            bastion_chunk_x: bastion.0,
            bastion_chunk_z: bastion.1,
            fortress_chunk_x: fortress.0,
            fortress_chunk_z: fortress.1,
        })
        .encode()
    }

    fn run(
        structures: &dyn StructureGenerator,
        terrain: &dyn TerrainGenerator,
        input: Vec<u8>,
    ) -> (Result<SessionSummary, ProtocolError>, Vec<u8>) {
        let mut output = Vec::new();
        let result = Dispatcher::new(structures, terrain, ChestClassifier::default())
            .serve(Cursor::new(input), &mut output);
        (result, output)
    }

    fn responses(output: &[u8]) -> &[u8] {
        assert_eq!(&output[..HANDSHAKE.len()], &HANDSHAKE);
        &output[HANDSHAKE.len()..]
    }

    /// Records how many bytes had been written at each flush.
    #[derive(Default)]
    struct FlushLog {
        data: Vec<u8>,
        flushed_at: Vec<usize>,
    }

    impl Write for FlushLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed_at.push(self.data.len());
            Ok(())
        }
    }

    struct FailingTerrain;

    impl TerrainGenerator for FailingTerrain {
        fn terrain(&self, _seed: i64) -> anyhow::Result<Box<dyn TerrainSample + '_>> {
            anyhow::bail!("Terrain backend unavailable")
        }
    }

    /// Terrain open only at y=95, so every route needs the shaft check.
    struct HighOnly;

    impl TerrainGenerator for HighOnly {
        fn terrain(&self, _seed: i64) -> anyhow::Result<Box<dyn TerrainSample + '_>> {
            Ok(Box::new(|_x: i32, y: i32, _z: i32| {
                Some(if y == 95 { BlockKind::Air } else { BlockKind::Solid })
            }))
        }
    }

    #[test]
    fn test_empty_input_only_handshake() {
        let (result, output) = run(&NoStructures, &FlatGenerator::new(31, 101), Vec::new());
        assert_eq!(result.unwrap(), SessionSummary::default());
        assert_eq!(output, HANDSHAKE.to_vec());
    }

    #[test]
    fn test_no_structure_sentinel() {
        let input = obsidian(42, 3, -5);
        assert_eq!(input, vec![0, 0, 0, 0, 0, 0, 0, 0, 42, 3, 0xFB]);

        let (result, output) = run(&NoStructures, &FlatGenerator::new(31, 101), input);
        assert_eq!(result.unwrap().obsidian_requests, 1);
        assert_eq!(responses(&output), &[0xFF]);
    }

    #[test]
    fn test_truncated_payload_exits_quietly() {
        let (result, output) = run(&NoStructures, &FlatGenerator::new(31, 101), vec![0, 1, 2, 3]);
        assert_eq!(result.unwrap(), SessionSummary::default());
        assert!(responses(&output).is_empty());

        let (result, output) = run(&NoStructures, &FlatGenerator::new(31, 101), vec![1, 0, 0, 0, 0, 0, 0, 0, 9, 1, 1]);
        assert!(result.is_ok());
        assert!(responses(&output).is_empty());
    }

    #[test]
    fn test_obsidian_scores_from_fixture() {
        let fixture = FixtureStructures::from_json(FIXTURE).unwrap();
        let mut input = obsidian(7, 0, 0);
        input.extend(obsidian(7, -2, 1));
        input.extend(obsidian(8, 0, 0));

        let (result, output) = run(&fixture, &FlatGenerator::new(31, 101), input);
        assert_eq!(result.unwrap().obsidian_requests, 3);
        // 9 + 7 bridge trades; 120 + 20 + 4 saturates; nothing at seed 8
        assert_eq!(responses(&output), &[16, 127, 0xFF]);
    }

    #[test]
    fn test_terrain_queries() {
        let open = FlatGenerator::new(31, 101);
        let (_, output) = run(&NoStructures, &open, terrain(1, (3, -5), (-10, 12)));
        assert_eq!(responses(&output), &[1]);

        // Open band misses both y=60 and y=95
        let closed = FlatGenerator::new(61, 94);
        let (_, output) = run(&NoStructures, &closed, terrain(1, (3, -5), (-10, 12)));
        assert_eq!(responses(&output), &[0]);
    }

    #[test]
    fn test_high_route_needs_shaft() {
        // Only one of ten shaft samples is open
        let (result, output) = run(&NoStructures, &HighOnly, terrain(5, (2, 2), (6, 6)));
        assert_eq!(result.unwrap().terrain_requests, 1);
        assert_eq!(responses(&output), &[0]);
    }

    #[test]
    fn test_mixed_requests_answered_in_order() {
        let fixture = FixtureStructures::from_json(FIXTURE).unwrap();
        let mut input = terrain(7, (0, 0), (1, 1));
        input.extend(obsidian(7, 0, 0));
        input.extend(terrain(7, (0, 0), (1, 1)));
        // A truncated obsidian payload right after a full terrain payload
        input.extend(&[0, 0, 0, 0]);

        let (result, output) = run(&fixture, &FlatGenerator::new(31, 101), input);
        assert_eq!(
            result.unwrap(),
            SessionSummary { obsidian_requests: 1, terrain_requests: 2 }
        );
        assert_eq!(responses(&output), &[1, 16, 1]);
    }

    #[test]
    fn test_each_response_flushed() {
        let mut input = obsidian(1, 0, 0);
        input.extend(obsidian(2, 0, 0));

        let mut output = FlushLog::default();
        let flat = FlatGenerator::new(31, 101);
        Dispatcher::new(&NoStructures, &flat, ChestClassifier::default())
            .serve(Cursor::new(input), &mut output)
            .unwrap();
        assert_eq!(output.flushed_at, vec![16, 17, 18]);
    }

    #[test]
    fn test_unknown_command_is_fatal() {
        let mut input = obsidian(42, 0, 0);
        input.push(7);
        input.extend(obsidian(42, 0, 0));

        let (result, output) = run(&NoStructures, &FlatGenerator::new(31, 101), input);
        let err = result.unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownCommand(7)));
        assert_eq!(err.exit_code(), 2);
        // The request before the bad byte was still answered
        assert_eq!(responses(&output), &[0xFF]);
    }

    #[test]
    fn test_oracle_failure_is_fatal() {
        let (result, output) = run(&NoStructures, &FailingTerrain, terrain(1, (0, 0), (0, 0)));
        let err = result.unwrap_err();
        assert!(matches!(err, ProtocolError::Oracle(_)));
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Terrain backend unavailable"));
        assert!(responses(&output).is_empty());
    }

    #[test]
    fn test_strict_stables_classifier() {
        let json = r#"{ "bastions": [ { "seed": 3, "chunk_x": 1, "chunk_z": 1, "variant": "stables",
            "chests": [ { "pos": [20, 58, 20], "items": [ { "item": "obsidian", "count": 10 } ] } ] } ] }"#;
        let fixture = FixtureStructures::from_json(json).unwrap();
        let flat = FlatGenerator::new(31, 101);
        let bastion: Bastion = fixture.generate_bastion(3, ChunkPos::new(1, 1)).unwrap().unwrap();
        assert_eq!(bastion.chests.len(), 1);

        let standard = Dispatcher::new(&fixture, &flat, ChestClassifier::default());
        let strict = Dispatcher::new(&fixture, &flat, ChestClassifier::new(netherscout_core::StablesRule::Strict));
        let request = Request::Obsidian(ObsidianQuery { seed: 3, chunk_x: 1, chunk_z: 1 });
        assert_eq!(standard.handle(&request).unwrap(), Response::Obsidian(14));
        assert_eq!(strict.handle(&request).unwrap(), Response::Obsidian(4));
    }

    #[test]
    fn test_benchmark_counts_requests() {
        let metrics = Arc::new(BenchmarkMetrics::new());
        let flat = FlatGenerator::new(31, 101);
        let mut input = obsidian(1, 0, 0);
        input.extend(terrain(1, (0, 0), (1, 0)));

        Dispatcher::new(&NoStructures, &flat, ChestClassifier::default())
            .with_benchmark(Some(metrics.clone()))
            .serve(Cursor::new(input), Vec::new())
            .unwrap();

        use std::sync::atomic::Ordering;
        assert_eq!(metrics.total_obsidian_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.total_missing_structures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.total_terrain_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.total_viable_routes.load(Ordering::Relaxed), 1);
    }
}
