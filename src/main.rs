//! pipecrypt - command-line file encryption tool.
//!
//! Encrypts, decrypts, or hashes a file. Encryption and decryption run
//! through the concurrent chunk pipeline; hashing streams the file through
//! SHA-256 directly.

use clap::{ArgAction, Parser};
use pipecrypt::config::{
    DEFAULT_CHUNK_MB, DEFAULT_READERS, DEFAULT_TRANSFORMERS, KEY_LEN, MAX_READERS,
    MAX_TRANSFORMERS, MAX_WRITERS,
};
use pipecrypt::{
    hash_file, key_from_hex, key_from_password, run_pipeline, validation, Operation,
    PipecryptError, PipelineJob, Result,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use zeroize::Zeroizing;

/// Command-line interface definition.
///
/// The default `-h` help short is disabled so `-h` can mean `--hash`;
/// help stays reachable as `--help` or `-?`.
#[derive(Parser, Debug)]
#[command(
    name = "pipecrypt",
    version,
    about = "Concurrent chunked file encryption with AES-256-GCM",
    disable_help_flag = true
)]
struct Cli {
    /// Decrypt the source file instead of encrypting it
    #[arg(short, long)]
    decrypt: bool,

    /// Print the SHA-256 digest of the source file and exit
    #[arg(short = 'h', long)]
    hash: bool,

    /// Hexadecimal string holding the 256-bit key material
    #[arg(short, long, value_name = "HEX64")]
    keyhex: Option<String>,

    /// Password from which key material should be derived
    #[arg(short, long)]
    password: Option<String>,

    /// Maximum size, in MB, of a plaintext chunk
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_MB, value_name = "MB")]
    chunksize: u64,

    /// Number of read workers
    #[arg(short, long, default_value_t = DEFAULT_READERS)]
    readers: usize,

    /// Number of transform workers
    #[arg(short, long, default_value_t = DEFAULT_TRANSFORMERS)]
    executors: usize,

    /// Number of write workers (currently restricted to 1)
    #[arg(short, long, default_value_t = 1)]
    writers: usize,

    /// Force optional operations such as overwriting an existing target
    #[arg(short, long)]
    force: bool,

    /// Print help
    #[arg(long, short = '?', action = ArgAction::Help)]
    help: Option<bool>,

    /// Source file
    #[arg(value_name = "SOURCE")]
    source: Option<String>,

    /// Target file (omitted when hashing)
    #[arg(value_name = "TARGET")]
    target: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.decrypt && cli.hash {
        return Err(PipecryptError::InvalidInput(
            "hashing and decryption cannot be specified simultaneously".to_string(),
        ));
    }

    let source = operand(cli.source.as_deref(), "source")?;

    if cli.hash {
        let digest = hash_file(Path::new(&source))?;
        // The digest on stdout is a contract; everything else goes to stderr.
        print!("{}", digest);
        return Ok(());
    }

    let target = operand(cli.target.as_deref(), "target")?;
    let operation = if cli.decrypt {
        Operation::Decrypt
    } else {
        Operation::Encrypt
    };

    let key = resolve_key(&cli, operation)?;

    let job = PipelineJob {
        readers: validation::clamp_count("read", cli.readers, MAX_READERS),
        transformers: validation::clamp_count("transform", cli.executors, MAX_TRANSFORMERS),
        writers: validation::clamp_count("write", cli.writers, MAX_WRITERS),
        source: PathBuf::from(source),
        target: PathBuf::from(target),
        force: cli.force,
        chunk_size_mb: validation::clamp_chunk_mb(cli.chunksize),
        operation,
        key,
    };

    run_pipeline(job)
}

/// Trims a positional operand and requires it to be present and non-blank.
fn operand(value: Option<&str>, name: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(PipecryptError::InvalidInput(format!(
            "{} filename is required",
            name
        ))),
    }
}

/// Resolves 32 bytes of key material: explicit hex beats a password flag,
/// and with neither the user is prompted interactively.
fn resolve_key(cli: &Cli, operation: Operation) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if let Some(keyhex) = cli.keyhex.as_deref() {
        let trimmed = keyhex.trim();
        if !trimmed.is_empty() {
            return key_from_hex(trimmed);
        }
    }

    if let Some(password) = cli.password.as_deref() {
        let trimmed = password.trim();
        if !trimmed.is_empty() {
            return Ok(key_from_password(trimmed));
        }
    }

    let prompted = validation::prompt_password(operation == Operation::Encrypt)?;
    Ok(key_from_password(&prompted))
}
