use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use es3_codec::{BackendKind, Codec, Container, Input, Passphrase, TextEncoding};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "es3-cli")]
#[command(about = "es3 save container (de|en)crypt – CLI tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Passphrase the containers are keyed from
    #[arg(long, env = "ES3_PASSPHRASE", hide_env_values = true, global = true)]
    passphrase: Option<String>,

    /// Primitive provider: native or restricted
    #[arg(long, default_value = "native", global = true)]
    backend: BackendKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt a container to its text payload
    Decrypt {
        /// Path to the encrypted save file
        input: PathBuf,

        /// Path to write the decrypted text
        output: PathBuf,

        /// Treat the input as base64 text (data URIs accepted)
        #[arg(long)]
        base64: bool,

        /// Text encoding of the payload: utf8, utf16le, latin1, ascii
        #[arg(long, default_value = "utf8")]
        encoding: TextEncoding,
    },

    /// Encrypt a text file into a container
    Encrypt {
        /// Path to the plaintext file
        input: PathBuf,

        /// Path to write the encrypted container
        output: PathBuf,

        /// Gzip the payload before encrypting
        #[arg(long)]
        gzip: bool,

        /// Write base64 text instead of raw container bytes
        #[arg(long)]
        base64: bool,
    },

    /// Print container length, IV and whether the payload is gzip-compressed
    Inspect {
        /// Path to the encrypted save file
        input: PathBuf,

        /// Treat the input as base64 text (data URIs accepted)
        #[arg(long)]
        base64: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let passphrase = cli
        .passphrase
        .context("a passphrase is required (--passphrase or ES3_PASSPHRASE)")?;
    let codec = Codec::with_kind(Passphrase::new(passphrase)?, cli.backend);
    tracing::debug!(backend = %cli.backend, "codec ready");

    match cli.command {
        Commands::Decrypt {
            input,
            output,
            base64,
            encoding,
        } => cmd_decrypt(&codec, &input, &output, base64, encoding),
        Commands::Encrypt {
            input,
            output,
            gzip,
            base64,
        } => cmd_encrypt(&codec, &input, &output, gzip, base64),
        Commands::Inspect { input, base64 } => cmd_inspect(&codec, &input, base64),
    }
}

/// Raw file bytes, or the file read as base64 text.
enum Source {
    Raw(Vec<u8>),
    Text(String),
}

impl Source {
    fn read(path: &Path, base64: bool) -> Result<Self> {
        if base64 {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read base64 file: {}", path.display()))?;
            Ok(Source::Text(text))
        } else {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read container file: {}", path.display()))?;
            Ok(Source::Raw(bytes))
        }
    }

    fn input(&self) -> Input<'_> {
        match self {
            Source::Raw(bytes) => Input::from(bytes),
            Source::Text(text) => Input::from(text),
        }
    }
}

fn cmd_decrypt(
    codec: &Codec,
    input: &Path,
    output: &Path,
    base64: bool,
    encoding: TextEncoding,
) -> Result<()> {
    let source = Source::read(input, base64)?;
    let text = codec
        .decode(source.input(), encoding)
        .context("Failed to decrypt file")?;

    fs::write(output, text.as_bytes())
        .with_context(|| format!("Failed to write plaintext file: {}", output.display()))?;

    println!("[ok] wrote {} chars -> {}", text.chars().count(), output.display());
    Ok(())
}

fn cmd_encrypt(
    codec: &Codec,
    input: &Path,
    output: &Path,
    gzip: bool,
    base64: bool,
) -> Result<()> {
    let plain = fs::read(input)
        .with_context(|| format!("Failed to read plaintext file: {}", input.display()))?;

    let container = codec
        .encode_bytes(&plain, gzip)
        .context("Failed to encrypt file")?;

    let written = if base64 {
        container.to_base64().into_bytes()
    } else {
        container.into_bytes()
    };
    fs::write(output, &written)
        .with_context(|| format!("Failed to write container file: {}", output.display()))?;

    println!("[ok] wrote {} bytes -> {}", written.len(), output.display());
    Ok(())
}

fn cmd_inspect(codec: &Codec, input: &Path, base64: bool) -> Result<()> {
    let source = Source::read(input, base64)?;
    let container = match &source {
        Source::Raw(bytes) => Container::from_bytes(bytes.clone()),
        Source::Text(text) => Container::from_base64(text),
    }
    .context("Not an es3 container")?;

    println!("[info] len={}", container.len());
    println!("[info] iv={}", hex::encode(container.iv()));

    let opened = codec.open(&container).context("Failed to decrypt file")?;
    println!(
        "[info] compressed={}  payload_len={}",
        opened.was_compressed,
        opened.payload.len()
    );
    Ok(())
}
