//! binary font building tool
//!
//! Takes an SVG file with one drawn shape per character and an output
//! directory, and produces a TTF/OTF pair plus a JSON coverage summary.

use clap::Parser;
use smida::{build_font, dom::Document, BuildOptions};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The input SVG file.
    svg: std::path::PathBuf,

    /// Font family name
    #[arg(short, long, default_value = "CustomFont")]
    name: String,

    /// Output directory
    #[arg(short, long, default_value = "./output")]
    output: std::path::PathBuf,

    /// Characters to assign to the discovered shapes, in reading order
    /// (defaults to a Latin + Turkish + punctuation set)
    #[arg(short, long)]
    chars: Option<String>,

    /// Bold variant
    #[arg(long)]
    bold: bool,

    /// Italic variant
    #[arg(long)]
    italic: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let xml = match std::fs::read_to_string(&args.svg) {
        Ok(xml) => xml,
        Err(e) => {
            eprintln!("could not read {}: {e}", args.svg.display());
            std::process::exit(1);
        }
    };
    let document = match Document::parse(&xml) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut options = BuildOptions::new(&args.name);
    options.bold = args.bold;
    options.italic = args.italic;
    options.characters = args.chars.map(|chars| chars.chars().collect());

    match build_font(&document, &options, &args.output) {
        Ok(artifacts) => {
            let summary = &artifacts.summary;
            println!("TTF: {}", artifacts.ttf_path.display());
            println!("OTF: {}", artifacts.otf_path.display());
            println!(
                "{}/{} glyphs drawn ({} substituted)",
                summary.success, summary.total, summary.failed
            );
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
