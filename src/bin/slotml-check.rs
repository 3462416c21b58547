use slotml::{parse, NoComponents, ParseError};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: slotml-check <file.html>...");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  slotml-check hud.html");
        eprintln!("  slotml-check *.html");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in &args[1..] {
        match check_file(file_path) {
            Ok(()) => {
                println!("✓ {} is valid", file_path);
            }
            Err(message) => {
                eprintln!("✗ {} has errors:", file_path);
                eprintln!("    {}", message);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn check_file(path: &str) -> Result<(), String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    // Component resolution is a runtime concern; syntax checking parses
    // every tag as a plain element.
    parse(&NoComponents, &content)
        .map(|_| ())
        .map_err(|e: ParseError| e.to_string())
}
