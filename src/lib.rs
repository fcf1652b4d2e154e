extern crate serde;
extern crate serde_json;

extern crate blake3;
extern crate clap;
extern crate itertools;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

pub mod cytoscape;
pub mod errors;
pub mod graph;
pub mod ident;
pub mod logging;
pub mod options;
