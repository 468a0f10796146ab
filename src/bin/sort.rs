use std::fs::OpenOptions;
use std::process;
use std::sync::Arc;

use ext_sort::tempdir::PatternTempPolicy;
use ext_sort::{sort_with_config, SortConfig};

struct Args {
    input: String,
    output: String,
    memory_elems: usize,
    fan_in: usize,
    temp_dir: String,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut input = "input.bin".to_string();
    let mut output = "output.bin".to_string();
    let mut memory_elems = ext_sort::config::DEFAULT_MEMORY_ELEMS;
    let mut fan_in = ext_sort::config::DEFAULT_FAN_IN;
    let mut temp_dir = ".".to_string();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = args.get(i).cloned().unwrap_or(input);
            }
            "--output" => {
                i += 1;
                output = args.get(i).cloned().unwrap_or(output);
            }
            "--memory" => {
                i += 1;
                memory_elems = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(memory_elems);
            }
            "--fan-in" => {
                i += 1;
                fan_in = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(fan_in);
            }
            "--temp-dir" => {
                i += 1;
                temp_dir = args.get(i).cloned().unwrap_or(temp_dir);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!(
                    "Usage: sort [--input FILE] [--output FILE] [--memory N] [--fan-in N] [--temp-dir DIR]"
                );
                process::exit(1);
            }
        }
        i += 1;
    }
    Args { input, output, memory_elems, fan_in, temp_dir }
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = parse_args();

    let config = SortConfig::new(args.memory_elems, args.fan_in)
        .with_temp_policy(Arc::new(PatternTempPolicy::new(&args.temp_dir)))
        .from_env();

    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {e}");
        process::exit(1);
    }

    let mut input = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&args.input)
        .unwrap_or_else(|e| {
            eprintln!("failed to open {}: {e}", args.input);
            process::exit(1);
        });

    let mut output = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&args.output)
        .unwrap_or_else(|e| {
            eprintln!("failed to open {}: {e}", args.output);
            process::exit(1);
        });

    if let Err(e) = sort_with_config(&mut input, &mut output, &config) {
        eprintln!("sort failed: {e}");
        process::exit(1);
    }
}
