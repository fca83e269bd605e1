use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser as ClapParser;
use flatjson::{Parser, ParserOptions, Style};
use rand::Rng;

/// Node arena sized for large documents; the parser reports `Capacity`
/// instead of growing past it.
const NODE_CAPACITY: usize = 1 << 24;
const MAX_DEPTH: usize = 1 << 16;

const MIN_CHUNK: usize = 8;
const MAX_CHUNK: usize = 4096;

#[derive(ClapParser, Debug)]
#[command(name = "fjson", version, about = "Incremental zero-copy JSON parser")]
struct Args {
    /// Input files to parse.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Pretty-print each parsed document to stdout.
    #[arg(short = 'd', long)]
    dump: bool,

    /// Network emulation: feed in random chunks of 8..=4096 bytes.
    #[arg(short = 'n', long = "network", alias = "nw")]
    network: bool,

    /// Per-file statistics on stderr.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(failures) if failures == 0 => {}
        Ok(_) => std::process::exit(1),
        Err(err) => {
            eprintln!("ERROR  {err}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<usize, Box<dyn Error>> {
    let options = ParserOptions::new()
        .with_node_capacity(NODE_CAPACITY)
        .with_max_depth(MAX_DEPTH);
    let mut parser = Parser::with_options(options);
    let mut failures = 0usize;

    for path in &args.files {
        let input = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
                continue;
            }
        };

        parser.reset();
        let started = Instant::now();
        let fed = if args.network {
            feed_network(&mut parser, &input)
        } else {
            parser.feed(&input).is_ok()
        };
        let ok = fed && parser.finish().is_ok();

        if !ok {
            report_failure(path, &parser, &input);
            failures += 1;
            continue;
        }

        if args.verbose {
            let elapsed = started.elapsed().as_secs_f64();
            let mib = input.len() as f64 / (1024.0 * 1024.0);
            eprintln!(
                "{}: {} nodes | {:.2} MiB/s ({:.3}s) [{}]",
                path.display(),
                parser.arena().len(),
                if elapsed > 0.0 { mib / elapsed } else { 0.0 },
                elapsed,
                if args.network { "network emulation" } else { "full speed" },
            );
        }

        if args.dump {
            let doc = parser.document(&input);
            let out = doc.to_vec(Style::Pretty);
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&out)?;
            handle.write_all(b"\n")?;
        }
    }

    Ok(failures)
}

/// Feed the file in random small chunks, the way a socket would hand the
/// bytes over.
fn feed_network(parser: &mut Parser, input: &[u8]) -> bool {
    let mut rng = rand::rng();
    let mut offset = 0usize;
    while offset < input.len() {
        let size = rng
            .random_range(MIN_CHUNK..=MAX_CHUNK)
            .min(input.len() - offset);
        if parser.feed(&input[offset..offset + size]).is_err() {
            return false;
        }
        offset += size;
    }
    true
}

fn report_failure(path: &std::path::Path, parser: &Parser, input: &[u8]) {
    match parser.error() {
        Some(err) => {
            eprintln!("{}: {}", path.display(), err);
            eprintln!("{}", err.snippet(input));
        }
        None => eprintln!("{}: empty document", path.display()),
    }
}
