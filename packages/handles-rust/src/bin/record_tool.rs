//! `record-tool`: exercise records from the command line.
//!
//! `stream` attaches a file to a record field and reads it back in chunks.
//! `parse` shows how text fields coerce to integers.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use msirecord_core::NULL_INTEGER;
use msirecord_handles::{logging, RecordApi};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "record-tool", version, about = "Inspect installer-database records")]
struct Cli {
    /// Default log filter when RUST_LOG is unset.
    #[arg(long, env = "RECORD_TOOL_LOG", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Attach a file as a stream field and read it in chunks.
    Stream {
        /// File to attach.
        path: PathBuf,
        /// Bytes requested per read.
        #[arg(long, default_value_t = 10)]
        chunk: usize,
        /// Field the stream is attached to (1-based).
        #[arg(long, default_value_t = 1)]
        field: i32,
        /// Number of data fields in the record.
        #[arg(long, default_value_t = 1)]
        fields: i32,
    },
    /// Store each text in a record and print its integer coercion.
    Parse {
        /// Texts to coerce.
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let api = RecordApi::default();
    match cli.command {
        Command::Stream {
            path,
            chunk,
            field,
            fields,
        } => stream(&api, &path, chunk, field, fields),
        Command::Parse { texts } => parse(&api, &texts),
    }
}

fn stream(
    api: &RecordApi,
    path: &Path,
    chunk: usize,
    field: i32,
    fields: i32,
) -> anyhow::Result<()> {
    if chunk == 0 {
        bail!("--chunk must be at least 1");
    }
    let Some(handle) = api.create_record(fields) else {
        bail!("cannot create a record with {fields} fields");
    };
    api.set_stream(handle, field, Some(path))
        .with_context(|| format!("attaching {} to field {field}", path.display()))?;

    let mut remaining = 0;
    api.read_stream(handle, field, None, Some(&mut remaining))?;
    info!(%handle, remaining, "attached stream");
    println!("remaining: {remaining}");

    let mut buf = vec![0u8; chunk];
    let mut total = 0;
    loop {
        let mut size = chunk;
        api.read_stream(handle, field, Some(&mut buf[..]), Some(&mut size))?;
        if size == 0 {
            break;
        }
        total += size;
        println!("read {size} bytes: {}", String::from_utf8_lossy(&buf[..size]));
    }
    println!("total: {total}");

    println!("{}", api.snapshot(handle)?.to_json()?);
    api.close_handle(handle)?;
    Ok(())
}

fn parse(api: &RecordApi, texts: &[String]) -> anyhow::Result<()> {
    let count = i32::try_from(texts.len()).context("too many texts")?;
    let Some(handle) = api.create_record(count) else {
        bail!("cannot create a record with {count} fields");
    };
    for (index, text) in (1..).zip(texts) {
        api.set_string(handle, index, Some(text))?;
        let value = api.get_integer(handle, index);
        if value == NULL_INTEGER {
            println!("{text:?} -> null");
        } else {
            println!("{text:?} -> {value}");
        }
    }
    api.close_handle(handle)?;
    Ok(())
}
