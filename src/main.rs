use dbf_reader::{DbfReader, DecodeOptions, TimestampFormat};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-dbf-file> [--timestamps date|datetime] [--limit N]", args[0]);
        std::process::exit(1);
    }

    let dbf_path = &args[1];
    let mut options = DecodeOptions::default();
    let mut limit: Option<usize> = None;

    // Parse --timestamps argument
    if let Some(idx) = args.iter().position(|arg| arg == "--timestamps") {
        options.timestamps = match args.get(idx + 1).map(String::as_str) {
            Some("date") => TimestampFormat::Date,
            Some("datetime") => TimestampFormat::DateTime,
            Some(other) => {
                eprintln!("ERROR: Unknown timestamp format '{}'. Expected 'date' or 'datetime'.", other);
                std::process::exit(1);
            }
            None => {
                eprintln!("ERROR: --timestamps flag requires an argument.");
                std::process::exit(1);
            }
        };
    }

    // Parse --limit argument
    if let Some(idx) = args.iter().position(|arg| arg == "--limit") {
        match args.get(idx + 1).and_then(|s| s.parse().ok()) {
            Some(n) => limit = Some(n),
            None => {
                eprintln!("ERROR: --limit flag requires a non-negative number.");
                std::process::exit(1);
            }
        }
    }

    let reader = match DbfReader::open(dbf_path, options) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to read DBF file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let header = reader.header();
    eprintln!("Table Information:");
    eprintln!("  File type: {:#04x}", header.type_tag);
    eprintln!("  Last updated: {}", header.last_updated);
    eprintln!("  Codepage: {:#04x}", header.codepage_tag);
    eprintln!("  Declared records: {}", header.record_count);
    eprintln!("  Record length: {} bytes", header.record_length);
    eprintln!("\nFields:");
    for field in &header.fields {
        eprintln!(
            "  {:<11} {} ({:?}) length={} decimals={}",
            field.name, field.type_tag, field.kind, field.length, field.decimal_places
        );
    }
    eprintln!("{}", "=".repeat(60));

    let mut count = 0usize;
    for result in reader.records().take(limit.unwrap_or(usize::MAX)) {
        match result {
            Ok(record) => match serde_json::to_string(&record) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("ERROR: Failed to serialize record {}: {}", record.sequence_number, e),
            },
            Err(e) => {
                eprintln!("\nERROR: Failed while reading records");
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        }
        count += 1;
    }

    eprintln!("{}", "=".repeat(60));
    eprintln!("Records printed: {}", count);
}
