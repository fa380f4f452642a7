//! `ecpool` — erasure-code files into chunk directories.
//!
//! Binary entrypoint around the `ecpool-erasure` codec. `encode` splits a
//! file into `k + m` chunk files plus a manifest; `decode` rebuilds the file
//! from any `k` intact chunks.
//!
//! # Usage
//!
//! ```text
//! ecpool encode photo.jpg -o ./chunks              # k=7, m=3, w=8
//! ecpool -k 4 -m 2 -w 16 encode photo.jpg -o ./chunks
//! ecpool -c ecpool.toml encode photo.jpg -o ./chunks
//! ecpool decode ./chunks -o photo.jpg              # tolerates m lost chunks
//! ecpool decode ./chunks -o photo.jpg --want 1,5   # also rewrite chunk.1 and chunk.5
//! ecpool minimum --available 0,2,3,5 --want 1      # which chunks to fetch
//! ecpool profile                                   # effective codec parameters
//! ecpool benchmark -n 50 -s 1048576                # encode/decode throughput
//! ```

mod config;
mod manifest;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use ecpool_erasure::{ErasureCode, Profile};
use tracing::{debug, info, warn};

use config::CliConfig;
use manifest::{MANIFEST_VERSION, Manifest, chunk_path};

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "ecpool", version, about = "Reed-Solomon erasure coding tool")]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "ECPOOL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the number of data chunks.
    #[arg(short, global = true)]
    k: Option<u32>,

    /// Override the number of coding chunks.
    #[arg(short, global = true)]
    m: Option<u32>,

    /// Override the Galois field word size (8, 16 or 32).
    #[arg(short, global = true)]
    w: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file into data and coding chunks.
    Encode {
        /// File to encode.
        input: PathBuf,

        /// Directory that receives the chunk files and the manifest.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rebuild a file from a chunk directory.
    ///
    /// Codec parameters come from the manifest, not from the config.
    Decode {
        /// Directory written by `encode`.
        dir: PathBuf,

        /// Where to write the reconstructed file.
        #[arg(short, long)]
        output: PathBuf,

        /// Chunk indices to rebuild and write back into the directory.
        #[arg(long, value_delimiter = ',')]
        want: Vec<usize>,
    },

    /// Print the chunks to read in order to decode.
    Minimum {
        /// Indices of the chunks that can be read.
        #[arg(long, value_delimiter = ',', required = true)]
        available: Vec<usize>,

        /// Indices wanted. Defaults to every data chunk.
        #[arg(long, value_delimiter = ',')]
        want: Vec<usize>,
    },

    /// Print the effective codec profile.
    Profile,

    /// Run a quick in-memory encode/decode benchmark.
    Benchmark {
        /// Number of buffers to encode and decode.
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,

        /// Size of each buffer in bytes.
        #[arg(short, long, default_value = "1048576")]
        size: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    // CLI flags override config file values.
    if let Some(k) = cli.k {
        config.erasure.k = Some(k);
    }
    if let Some(m) = cli.m {
        config.erasure.m = Some(m);
    }
    if let Some(w) = cli.w {
        config.erasure.w = Some(w);
    }

    setup_tracing(&config.log.level);

    match cli.command {
        Commands::Encode { input, output } => cmd_encode(&config, &input, &output),
        Commands::Decode { dir, output, want } => cmd_decode(&dir, &output, &want),
        Commands::Minimum { available, want } => cmd_minimum(&config, &available, &want),
        Commands::Profile => cmd_profile(&config),
        Commands::Benchmark { count, size } => cmd_benchmark(&config, count, size),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so command output on stdout stays scriptable.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse the profile and build the codec it names.
fn build_codec(parameters: &HashMap<String, String>) -> Result<(Profile, Arc<dyn ErasureCode>)> {
    let profile = Profile::parse(parameters);
    let codec =
        ecpool_erasure::from_profile(&profile).context("failed to initialize erasure code")?;
    Ok((profile, codec))
}

fn all_chunks(n: usize) -> BTreeSet<usize> {
    (0..n).collect()
}

fn join_indices<'a>(indices: impl IntoIterator<Item = &'a usize>) -> String {
    indices
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// -----------------------------------------------------------------------
// ecpool encode
// -----------------------------------------------------------------------

fn cmd_encode(config: &CliConfig, input: &Path, dir: &Path) -> Result<()> {
    let data =
        std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let manifest = encode_to_dir(config, &data, dir)?;

    println!(
        "encoded {} bytes into {} chunks of {} bytes (k={}, m={}, w={})",
        manifest.original_size,
        manifest.digests.len(),
        manifest.chunk_size,
        manifest.k,
        manifest.m,
        manifest.w
    );
    Ok(())
}

/// Encode `data` and write every chunk plus the manifest into `dir`.
fn encode_to_dir(config: &CliConfig, data: &[u8], dir: &Path) -> Result<Manifest> {
    let (profile, codec) = build_codec(&config.erasure_parameters())?;
    let chunks = codec
        .encode(&all_chunks(codec.chunk_count()), data)
        .context("failed to encode input")?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut digests: Vec<[u8; 32]> = Vec::with_capacity(chunks.len());
    for (&index, chunk) in &chunks {
        let path = chunk_path(dir, index);
        std::fs::write(&path, chunk)
            .with_context(|| format!("failed to write {}", path.display()))?;
        digests.push(blake3::hash(chunk).into());
    }

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        technique: profile.technique.clone(),
        k: u32::try_from(profile.k).context("k does not fit the manifest")?,
        m: u32::try_from(profile.m).context("m does not fit the manifest")?,
        w: profile.w.bits(),
        original_size: data.len() as u64,
        chunk_size: codec.chunk_size(data.len()) as u64,
        digests,
    };
    manifest.write_to(dir)?;

    info!(
        dir = %dir.display(),
        size = data.len(),
        chunk_size = manifest.chunk_size,
        k = profile.k,
        m = profile.m,
        w = %profile.w,
        "encoded object"
    );
    Ok(manifest)
}

// -----------------------------------------------------------------------
// ecpool decode
// -----------------------------------------------------------------------

fn cmd_decode(dir: &Path, output: &Path, want: &[usize]) -> Result<()> {
    let (data, rebuilt) = decode_from_dir(dir, want)?;
    std::fs::write(output, &data)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("decoded {} bytes to {}", data.len(), output.display());
    if !rebuilt.is_empty() {
        println!("rebuilt chunks: {}", join_indices(&rebuilt));
    }
    Ok(())
}

/// Rebuild the original bytes from `dir`.
///
/// Chunks listed in `want` that were missing or corrupt are written back
/// into `dir`; their indices are returned alongside the data.
fn decode_from_dir(dir: &Path, want: &[usize]) -> Result<(Vec<u8>, Vec<usize>)> {
    let manifest = Manifest::read_from(dir)?;
    let (profile, codec) = build_codec(&manifest.parameters())?;
    if profile.k != manifest.k as usize
        || profile.m != manifest.m as usize
        || profile.w.bits() != manifest.w
        || profile.technique != manifest.technique
    {
        bail!(
            "manifest parameters (technique={}, k={}, m={}, w={}) cannot be reproduced",
            manifest.technique,
            manifest.k,
            manifest.m,
            manifest.w
        );
    }
    let k = codec.data_chunk_count();

    let available = load_chunks(dir, &manifest, codec.chunk_count())?;
    let mut want_to_read = all_chunks(k);
    want_to_read.extend(want.iter().copied());

    let decoded = codec
        .decode(&want_to_read, &available)
        .with_context(|| format!("failed to decode {}", dir.display()))?;

    let original_size =
        usize::try_from(manifest.original_size).context("object too large for this platform")?;
    let mut data = Vec::with_capacity(original_size);
    for index in 0..k {
        let chunk = decoded
            .get(&index)
            .with_context(|| format!("data chunk {index} missing from decode output"))?;
        data.extend_from_slice(chunk);
    }
    if data.len() < original_size {
        bail!(
            "decoded {} bytes but the manifest records {original_size}",
            data.len()
        );
    }
    data.truncate(original_size);

    let mut rebuilt = Vec::new();
    for &index in want {
        if available.contains_key(&index) || rebuilt.contains(&index) {
            continue;
        }
        let chunk = decoded
            .get(&index)
            .with_context(|| format!("chunk {index} missing from decode output"))?;
        let path = chunk_path(dir, index);
        std::fs::write(&path, chunk)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(index, path = %path.display(), "rebuilt chunk");
        rebuilt.push(index);
    }

    Ok((data, rebuilt))
}

/// Read every intact chunk file in `dir`.
///
/// Missing files and files whose digest disagrees with the manifest are
/// left out, so the codec treats them as erasures.
fn load_chunks(dir: &Path, manifest: &Manifest, total: usize) -> Result<BTreeMap<usize, Bytes>> {
    let mut chunks = BTreeMap::new();
    for index in 0..total {
        let path = chunk_path(dir, index);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(index, path = %path.display(), "chunk file missing");
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        if !manifest.verify(index, &data) {
            warn!(index, path = %path.display(), "chunk digest mismatch, treating as erased");
            continue;
        }
        chunks.insert(index, Bytes::from(data));
    }
    debug!(available = chunks.len(), total, "loaded chunk files");
    Ok(chunks)
}

// -----------------------------------------------------------------------
// ecpool minimum
// -----------------------------------------------------------------------

fn cmd_minimum(config: &CliConfig, available: &[usize], want: &[usize]) -> Result<()> {
    let (_, codec) = build_codec(&config.erasure_parameters())?;
    let minimum = select_minimum(codec.as_ref(), available, want)?;
    println!("{}", join_indices(&minimum));
    Ok(())
}

fn select_minimum(
    codec: &dyn ErasureCode,
    available: &[usize],
    want: &[usize],
) -> Result<BTreeSet<usize>> {
    let want_to_read: BTreeSet<usize> = if want.is_empty() {
        all_chunks(codec.data_chunk_count())
    } else {
        want.iter().copied().collect()
    };
    let available: BTreeSet<usize> = available.iter().copied().collect();
    codec
        .minimum_to_decode(&want_to_read, &available)
        .context("cannot decode from the available chunks")
}

// -----------------------------------------------------------------------
// ecpool profile
// -----------------------------------------------------------------------

fn cmd_profile(config: &CliConfig) -> Result<()> {
    let (profile, codec) = build_codec(&config.erasure_parameters())?;
    let alignment = ecpool_erasure::pad_length(1, profile.k, profile.w.bits());

    println!("technique:  {}", profile.technique);
    println!("k:          {}", profile.k);
    println!("m:          {}", profile.m);
    println!("w:          {}", profile.w);
    println!("chunks:     {}", codec.chunk_count());
    println!("tolerates:  {} lost chunks", profile.m);
    println!("alignment:  {alignment} bytes");
    Ok(())
}

// -----------------------------------------------------------------------
// ecpool benchmark
// -----------------------------------------------------------------------

fn cmd_benchmark(config: &CliConfig, count: usize, size: usize) -> Result<()> {
    if count == 0 {
        bail!("benchmark needs at least one buffer");
    }
    let (profile, codec) = build_codec(&config.erasure_parameters())?;
    let k = codec.data_chunk_count();
    let total = codec.chunk_count();

    println!("ecpool Benchmark");
    println!("  buffers:    {count}");
    println!("  size:       {size} bytes each");
    println!("  chunk_size: {}", codec.chunk_size(size));
    println!("  erasure:    k={}, m={}, w={}", profile.k, profile.m, profile.w);
    println!();

    let data = generate_bench_data(size);
    let total_bytes = count as u64 * size as u64;
    let want = all_chunks(total);

    // --- Encode ---
    print!("Encoding {count} buffers... ");
    let start = Instant::now();
    let mut encoded = BTreeMap::new();
    for _ in 0..count {
        encoded = codec.encode(&want, &data)?;
    }
    let encode_dur = start.elapsed();
    let encode_mbs = total_bytes as f64 / encode_dur.as_secs_f64() / 1_048_576.0;
    println!("{:.2}s ({encode_mbs:.1} MB/s)", encode_dur.as_secs_f64());

    // --- Decode with the first m data chunks lost ---
    let lost = profile.m.min(k);
    let survivors: BTreeMap<usize, Bytes> = encoded
        .iter()
        .filter(|&(&i, _)| i >= lost)
        .map(|(&i, c)| (i, c.clone()))
        .collect();
    let data_chunks = all_chunks(k);

    print!("Decoding {count} buffers ({lost} data chunks lost)... ");
    let start = Instant::now();
    for _ in 0..count {
        let _ = codec.decode(&data_chunks, &survivors)?;
    }
    let decode_dur = start.elapsed();
    let decode_mbs = total_bytes as f64 / decode_dur.as_secs_f64() / 1_048_576.0;
    println!("{:.2}s ({decode_mbs:.1} MB/s)", decode_dur.as_secs_f64());

    println!();
    println!("Summary:");
    println!("  Encode throughput: {encode_mbs:.1} MB/s");
    println!("  Decode throughput: {decode_mbs:.1} MB/s");
    println!(
        "  Total data:        {:.1} MB",
        total_bytes as f64 / 1_048_576.0
    );

    Ok(())
}

/// Generate deterministic test data for benchmarking.
fn generate_bench_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
