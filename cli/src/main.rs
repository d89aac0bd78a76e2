//! Command-line driver (component K): parses an input document in either
//! syntax, resolves every CURIE and relative IRI it contains against a
//! [`PrefixTable`](turtlo_core::env::PrefixTable), and re-serialises the
//! fully-resolved triples in either syntax.

mod args;

use args::{Args, Syntax};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use turtlo_api::flags::StatementFlags;
use turtlo_api::model::Triple;
use turtlo_api::sink::{RdfSink, TripleParser};
use turtlo_core::env::{PrefixTable, Resolving};
use turtlo_core::writer::{NTriplesWriter, TurtleWriter};
use turtlo_core::{NTriplesParser, TurtleParser};

fn main() {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    if let Err(message) = run(&args) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let format = resolve_input_format(args)?;
    let name = source_name(args);
    let mut table = match default_base_uri(args) {
        Some(base) => PrefixTable::with_base(base),
        None => PrefixTable::new(),
    };

    let stdout = io::stdout();
    let out = io::BufWriter::new(stdout.lock());
    let writer = match args.output_format {
        Syntax::Turtle => OutputWriter::Turtle(TurtleWriter::new(out)),
        Syntax::Ntriples => OutputWriter::NTriples(NTriplesWriter::new(out)),
    };
    let mut sink = WriterSink { writer };

    let input = open_input(args).map_err(|e| format!("error: {}: {}", name, e))?;

    match format {
        Syntax::Turtle => {
            let mut parser =
                TurtleParser::new(input, name.clone()).map_err(|e| e.to_string())?;
            if let Some(prefix) = &args.blank_prefix {
                parser.set_blank_prefix(prefix.clone());
            }
            let mut resolving = Resolving::new(&mut table, &mut sink);
            parser.parse_all(&mut resolving).map_err(|e| e.to_string())?;
        }
        Syntax::Ntriples => {
            let mut parser = NTriplesParser::new(input, name.clone()).map_err(|e| e.to_string())?;
            let mut resolving = Resolving::new(&mut table, &mut sink);
            parser.parse_all(&mut resolving).map_err(|e| e.to_string())?;
        }
    }

    match sink.writer {
        OutputWriter::Turtle(w) => {
            w.finish().map_err(|e| e.to_string())?;
        }
        OutputWriter::NTriples(w) => {
            w.finish();
        }
    }
    Ok(())
}

fn resolve_input_format(args: &Args) -> Result<Syntax, String> {
    if let Some(format) = args.input_format {
        return Ok(format);
    }
    if !args.as_string {
        if let Some(format) = Syntax::guess_from_path(&args.input) {
            return Ok(format);
        }
    }
    Err(format!(
        "cannot guess the input syntax of `{}'; pass -i turtle|ntriples",
        args.input
    ))
}

fn source_name(args: &Args) -> String {
    if args.as_string {
        "(string)".to_string()
    } else if args.input == "-" {
        "(stdin)".to_string()
    } else {
        args.input.clone()
    }
}

/// A `file:` URI built from INPUT, the same default the original driver
/// falls back to when no base is given on the command line.
fn default_base_uri(args: &Args) -> Option<String> {
    if let Some(base) = &args.base_uri {
        return Some(base.clone());
    }
    if args.as_string || args.input == "-" {
        return None;
    }
    let path = std::fs::canonicalize(&args.input).ok()?;
    Some(format!("file://{}", path.to_string_lossy()))
}

fn open_input(args: &Args) -> io::Result<Box<dyn BufRead>> {
    if args.as_string {
        return Ok(Box::new(io::Cursor::new(args.input.clone().into_bytes())));
    }
    if args.input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    Ok(Box::new(BufReader::new(File::open(&args.input)?)))
}

enum OutputWriter<W: Write> {
    Turtle(TurtleWriter<W>),
    NTriples(NTriplesWriter<W>),
}

/// The innermost sink: writes already-resolved triples out in the chosen
/// syntax. Sits behind a [`Resolving`] layer, which is what actually
/// expands CURIEs and relative IRIs before they ever reach here.
struct WriterSink<W: Write> {
    writer: OutputWriter<W>,
}

impl<W: Write> RdfSink for WriterSink<W> {
    fn statement(&mut self, triple: Triple<'_>, _flags: StatementFlags) -> bool {
        let result = match &mut self.writer {
            OutputWriter::Turtle(w) => w.write_triple(&triple),
            OutputWriter::NTriples(w) => w.write_triple(&triple),
        };
        result.is_ok()
    }
}
