//! This tool converts a traffic graph JSON dump into the Cytoscape elements
//! document served to the visualization layer, and prints it to stdout.  It
//! exists so the transformation can be exercised and inspected outside the
//! serving path; the output is byte-for-byte what a caller embedding the
//! library would produce for the same graph and options.

use std::fs;
use std::io::Read;
use std::process::exit;

use clap::Parser;
use serde_json::to_string_pretty;

use meshmap::cytoscape;
use meshmap::graph::TrafficMap;
use meshmap::logging::init_logging;
use meshmap::options::GraphOptions;

#[derive(Parser)]
#[command(about = "Convert a traffic graph JSON dump into a Cytoscape document")]
struct ToolArgs {
    /// Path of the traffic graph JSON dump; stdin when omitted.
    input: Option<String>,

    #[command(flatten)]
    options: GraphOptions,
}

fn main() {
    init_logging();

    let args = ToolArgs::parse();

    let raw = match &args.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                eprintln!("Unable to read '{}': {}", path, err);
                exit(1);
            }
        },
        None => {
            let mut buf = String::new();
            if let Err(err) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("Unable to read stdin: {}", err);
                exit(1);
            }
            buf
        }
    };

    let traffic: TrafficMap = match serde_json::from_str(&raw) {
        Ok(traffic) => traffic,
        Err(err) => {
            eprintln!("Traffic graph JSON did not parse: {}", err);
            exit(1);
        }
    };

    match cytoscape::transform(&traffic, &args.options) {
        Ok(doc) => match to_string_pretty(&doc) {
            Ok(pretty) => println!("{}", pretty),
            Err(err) => {
                eprintln!("Unable to serialize document: {}", err);
                exit(1);
            }
        },
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    }
}
