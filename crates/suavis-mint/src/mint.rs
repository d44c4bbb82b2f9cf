use std::{
    io::{self, BufWriter, Write},
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use serde::Serialize;
use suavis::{
    AtomicAllocator, IdAllocator, LockAllocator, MonotonicClock, SnowflakeId, SystemClock,
    TimeSource,
};
use tracing::{debug, info};

use crate::config::{AllocatorKind, ClockKind, MintConfig, OutputFormat};

pub type DynAllocator = Box<dyn IdAllocator + Send + Sync>;
type DynClock = Box<dyn TimeSource + Send + Sync>;

/// Builds the allocator described by `config`.
pub fn build_allocator(config: &MintConfig) -> DynAllocator {
    let clock: DynClock = match config.clock {
        ClockKind::System => Box::new(SystemClock::with_epoch(config.epoch)),
        ClockKind::Monotonic => Box::new(MonotonicClock::with_epoch(config.epoch)),
    };
    debug!(
        worker_id = %config.worker_id,
        clock = ?config.clock,
        allocator = ?config.allocator,
        policy = ?config.policy,
        "building allocator"
    );
    match config.allocator {
        AllocatorKind::Atomic => Box::new(AtomicAllocator::with_policy(
            config.worker_id,
            clock,
            config.policy,
        )),
        AllocatorKind::Lock => Box::new(LockAllocator::with_policy(
            config.worker_id,
            clock,
            config.policy,
        )),
    }
}

/// Mints `count` IDs from `threads` threads sharing `allocator`, returned in
/// ascending order.
///
/// Every ID is held in memory; callers bound `count` (see
/// [`MAX_COUNT`](crate::config::MAX_COUNT)).
pub fn mint(
    allocator: &(dyn IdAllocator + Send + Sync),
    count: u64,
    threads: usize,
) -> anyhow::Result<Vec<SnowflakeId>> {
    let start = Instant::now();
    let threads = threads.min(usize::try_from(count).unwrap_or(usize::MAX)).max(1);
    let per_thread = count / threads as u64;
    let remainder = count % threads as u64;

    let batches = thread::scope(|s| {
        let handles: Vec<_> = (0..threads as u64)
            .map(|i| {
                let n = per_thread + u64::from(i < remainder);
                s.spawn(move || {
                    (0..n)
                        .map(|_| allocator.next_id())
                        .collect::<suavis::Result<Vec<_>>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow::anyhow!("minting thread panicked")))
            .collect::<anyhow::Result<Vec<_>>>()
    })?;

    let mut ids = Vec::new();
    for batch in batches {
        ids.extend(batch.context("failed to mint identifier")?);
    }
    ids.sort_unstable();

    info!(
        count = ids.len(),
        threads,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "minted identifiers"
    );
    Ok(ids)
}

/// Decoded view of one ID.
#[derive(Debug, Serialize)]
struct IdRecord {
    #[serde(with = "suavis::as_decimal_string")]
    id: SnowflakeId,
    timestamp: u64,
    unix_ms: u64,
    worker_id: u64,
    sequence: u64,
}

impl IdRecord {
    fn new(id: SnowflakeId, epoch: Duration) -> Self {
        Self {
            id,
            timestamp: id.timestamp(),
            unix_ms: id.unix_millis(epoch),
            worker_id: id.worker_id(),
            sequence: id.sequence(),
        }
    }
}

pub fn render(id: SnowflakeId, format: OutputFormat, epoch: Duration) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Decimal => id.to_string(),
        OutputFormat::Padded => id.to_padded_string(),
        OutputFormat::Json => serde_json::to_string(&IdRecord::new(id, epoch))?,
    })
}

pub fn write_ids(ids: &[SnowflakeId], format: OutputFormat, epoch: Duration) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for id in ids {
        writeln!(out, "{}", render(*id, format, epoch)?).context("writing to stdout")?;
    }
    out.flush().context("writing to stdout")
}

pub fn inspect(id: SnowflakeId, json: bool, epoch: Duration) -> anyhow::Result<()> {
    let record = IdRecord::new(id, epoch);
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out).context("writing to stdout")?;
    } else {
        writeln!(
            out,
            "id:        {}\ntimestamp: {}\nunix_ms:   {}\nworker_id: {}\nsequence:  {}",
            record.id, record.timestamp, record.unix_ms, record.worker_id, record.sequence
        )
        .context("writing to stdout")?;
    }
    Ok(())
}
