use std::fs::File;
use std::io::{BufReader, Read};
use std::process;

const DEFAULT_BLOCK_ELEMS: usize = 1 << 18;

struct Args {
    file: String,
    expect_count_from: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut file = None;
    let mut expect_count_from = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--expect-count-from" => {
                i += 1;
                expect_count_from = args.get(i).cloned();
            }
            _ if file.is_none() => {
                file = Some(args[i].clone());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Usage: validate <file> [--expect-count-from FILE]");
                process::exit(1);
            }
        }
        i += 1;
    }
    let file = file.unwrap_or_else(|| {
        eprintln!("Usage: validate <file> [--expect-count-from FILE]");
        process::exit(1);
    });
    Args { file, expect_count_from }
}

fn read_header(path: &str) -> std::io::Result<u64> {
    let mut f = File::open(path)?;
    let mut buf = [0u8; 8];
    f.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn main() {
    let args = parse_args();

    if let Some(expect_from) = &args.expect_count_from {
        let expected = read_header(expect_from).unwrap_or_else(|e| {
            eprintln!("failed to read header from {expect_from}: {e}");
            process::exit(1);
        });
        let actual = read_header(&args.file).unwrap_or_else(|e| {
            eprintln!("failed to read header from {}: {e}", args.file);
            process::exit(1);
        });
        if actual != expected {
            eprintln!(
                "count mismatch: {} declares {actual} elements, {expect_from} declares {expected}",
                args.file
            );
            process::exit(1);
        }
    }

    let file = File::open(&args.file).unwrap_or_else(|e| {
        eprintln!("failed to open {}: {e}", args.file);
        process::exit(1);
    });
    let mut r = BufReader::new(file);

    let mut header = [0u8; 8];
    r.read_exact(&mut header).unwrap_or_else(|e| {
        eprintln!("failed to read header: {e}");
        process::exit(1);
    });
    let size = u64::from_le_bytes(header);

    let mut block = vec![0u64; DEFAULT_BLOCK_ELEMS];
    let mut prev: Option<u64> = None;
    let mut seen = 0u64;
    while seen < size {
        let want = (DEFAULT_BLOCK_ELEMS as u64).min(size - seen) as usize;
        let mut raw = vec![0u8; want * 8];
        if let Err(e) = r.read_exact(&mut raw) {
            eprintln!("short read at element {seen}: {e}");
            process::exit(1);
        }
        for (slot, chunk) in block[..want].iter_mut().zip(raw.chunks_exact(8)) {
            *slot = u64::from_le_bytes(chunk.try_into().unwrap());
        }
        for &v in &block[..want] {
            if let Some(p) = prev {
                if p > v {
                    eprintln!("out of order at element {seen}: {p} > {v}");
                    process::exit(1);
                }
            }
            prev = Some(v);
        }
        seen += want as u64;
    }

    println!("{}: {size} elements, sorted", args.file);
}
