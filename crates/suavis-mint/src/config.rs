use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use suavis::{
    AllocatorPolicy, ClockRegressionPolicy, DEFAULT_EPOCH, ExhaustionPolicy, SnowflakeId, WorkerId,
};

/// Runtime configuration for the `suavis-mint` binary.
///
/// Every allocator setting can come from a flag or from a `SUAVIS_*`
/// environment variable (a `.env` file in the working directory is loaded
/// first). Flags win over the environment.
/// Upper bound for `mint --count`. Minted IDs are collected and sorted in
/// memory before printing.
pub const MAX_COUNT: u64 = 100_000_000;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "suavis-mint",
    version,
    about = "Mint and inspect Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Worker (shard) id embedded in every minted ID, in `[0, 1023]`.
    ///
    /// Two processes minting concurrently must use different worker ids.
    ///
    /// Environment variable: `SUAVIS_WORKER_ID`
    #[arg(
        long,
        env = "SUAVIS_WORKER_ID",
        default_value_t = 0,
        allow_negative_numbers = true,
        global = true
    )]
    pub worker_id: i64,

    /// Custom epoch, in milliseconds since 1970-01-01T00:00:00Z.
    ///
    /// Every process sharing an ID namespace must agree on this value.
    ///
    /// Environment variable: `SUAVIS_EPOCH_MS`
    #[arg(long, env = "SUAVIS_EPOCH_MS", default_value_t = DEFAULT_EPOCH.as_millis() as u64, global = true)]
    pub epoch_ms: u64,

    /// Time source used for the timestamp field.
    ///
    /// Environment variable: `SUAVIS_CLOCK`
    #[arg(long, env = "SUAVIS_CLOCK", value_enum, default_value_t = ClockKind::Monotonic, global = true)]
    pub clock: ClockKind,

    /// Allocator implementation.
    ///
    /// Environment variable: `SUAVIS_ALLOCATOR`
    #[arg(long, env = "SUAVIS_ALLOCATOR", value_enum, default_value_t = AllocatorKind::Atomic, global = true)]
    pub allocator: AllocatorKind,

    /// What to do once 4096 IDs were minted within one millisecond.
    ///
    /// Environment variable: `SUAVIS_ON_EXHAUSTION`
    #[arg(long, env = "SUAVIS_ON_EXHAUSTION", value_enum, default_value_t = ExhaustionMode::Block, global = true)]
    pub on_exhaustion: ExhaustionMode,

    /// Wait for a backward clock jump of at most this many milliseconds to
    /// catch up instead of failing. Unset means fail on any regression.
    ///
    /// Environment variable: `SUAVIS_REGRESSION_WAIT_MS`
    #[arg(long, env = "SUAVIS_REGRESSION_WAIT_MS", global = true)]
    pub regression_wait_ms: Option<u64>,

    /// Log output format. Logs go to stderr; stdout only carries IDs.
    ///
    /// Environment variable: `SUAVIS_LOG_FORMAT`
    #[arg(long, env = "SUAVIS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Mint new IDs and print one per line.
    Mint {
        /// Number of IDs to mint, at most 100 million.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,

        /// Threads sharing the allocator.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Decimal)]
        format: OutputFormat,
    },
    /// Decode an existing ID into its fields.
    Inspect {
        /// The ID in decimal form.
        id: SnowflakeId,

        /// Print a JSON object instead of `key: value` lines.
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Wall clock; may jump backward when the OS clock is adjusted.
    System,
    /// Wall time sampled once, then advanced by a monotonic ticker.
    Monotonic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorKind {
    /// Lock-free compare-and-swap.
    Atomic,
    /// Mutex-guarded critical section.
    Lock,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionMode {
    /// Wait for the next millisecond.
    Block,
    /// Exit with an error.
    Fail,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Canonical decimal string.
    Decimal,
    /// 19-digit zero-padded decimal that sorts lexicographically.
    Padded,
    /// One JSON object per line with the decoded fields.
    Json,
}

#[derive(Debug, Clone)]
pub struct MintConfig {
    pub worker_id: WorkerId,
    pub epoch: Duration,
    pub clock: ClockKind,
    pub allocator: AllocatorKind,
    pub policy: AllocatorPolicy,
    pub log_format: LogFormat,
    pub command: Command,
}

impl TryFrom<CliArgs> for MintConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let worker_id = WorkerId::new(args.worker_id).context("invalid SUAVIS_WORKER_ID")?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before 1970")?;
        let epoch = Duration::from_millis(args.epoch_ms);
        if epoch > now {
            bail!(
                "SUAVIS_EPOCH_MS ({}) is in the future; timestamps would all be zero",
                args.epoch_ms
            );
        }

        if let Command::Mint { count, threads, .. } = args.command {
            if count == 0 {
                bail!("--count must be greater than 0");
            }
            if count > MAX_COUNT {
                bail!("--count ({count}) exceeds the maximum of {MAX_COUNT}");
            }
            if threads == 0 {
                bail!("--threads must be greater than 0");
            }
        }

        let exhaustion = match args.on_exhaustion {
            ExhaustionMode::Block => ExhaustionPolicy::Block,
            ExhaustionMode::Fail => ExhaustionPolicy::Fail,
        };
        let clock_regression = match args.regression_wait_ms {
            Some(ms) => ClockRegressionPolicy::WaitUpTo(ms),
            None => ClockRegressionPolicy::Fail,
        };

        Ok(Self {
            worker_id,
            epoch,
            clock: args.clock,
            allocator: args.allocator,
            policy: AllocatorPolicy::default()
                .with_exhaustion(exhaustion)
                .with_clock_regression(clock_regression),
            log_format: args.log_format,
            command: args.command,
        })
    }
}
