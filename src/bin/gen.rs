use std::fs::File;
use std::io::{BufWriter, Write};
use std::process;

use rand::{Rng, SeedableRng};

const DEFAULT_BLOCK_ELEMS: usize = 1 << 20;

struct Args {
    count: u64,
    output: String,
    seed: Option<u64>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut count = None;
    let mut output = "input.bin".to_string();
    let mut seed = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                output = args.get(i).cloned().unwrap_or(output);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|s| s.parse().ok());
            }
            _ if count.is_none() => {
                count = args[i].parse().ok();
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Usage: gen <count> [--output FILE] [--seed N]");
                process::exit(1);
            }
        }
        i += 1;
    }
    let count = count.unwrap_or_else(|| {
        eprintln!("Usage: gen <count> [--output FILE] [--seed N]");
        process::exit(1);
    });
    Args { count, output, seed }
}

fn main() {
    let args = parse_args();

    let file = File::create(&args.output).unwrap_or_else(|e| {
        eprintln!("failed to create {}: {e}", args.output);
        process::exit(1);
    });
    let mut w = BufWriter::new(file);

    w.write_all(&args.count.to_le_bytes()).unwrap_or_else(|e| {
        eprintln!("write failed: {e}");
        process::exit(1);
    });

    let mut rng: Box<dyn rand::RngCore> = match args.seed {
        Some(seed) => Box::new(rand::rngs::StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    let mut remaining = args.count;
    let mut block = vec![0u64; DEFAULT_BLOCK_ELEMS];
    while remaining > 0 {
        let take = (DEFAULT_BLOCK_ELEMS as u64).min(remaining) as usize;
        for slot in block[..take].iter_mut() {
            *slot = rng.gen();
        }
        let bytes: Vec<u8> = block[..take].iter().flat_map(|v| v.to_le_bytes()).collect();
        w.write_all(&bytes).unwrap_or_else(|e| {
            eprintln!("write failed: {e}");
            process::exit(1);
        });
        remaining -= take as u64;
    }

    w.flush().unwrap_or_else(|e| {
        eprintln!("flush failed: {e}");
        process::exit(1);
    });
}
