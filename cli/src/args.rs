//! Command-line flags (component K), modelled on the original driver's
//! flag set: pick a syntax for input and output, optionally override the
//! base URI or blank-node prefix, and either read a file (or `-` for
//! stdin) or parse a literal string given on the command line.

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "turtlo",
    version,
    disable_version_flag = true,
    about = "Reads RDF Turtle or N-Triples and re-serialises it",
    long_about = None
)]
pub struct Args {
    /// Prints version information and exits, matching `serdi -v`.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    pub version: (),

    /// Syntax of the input. Guessed from INPUT's extension (`.ttl`/`.nt`)
    /// when omitted; required when reading from stdin or --string.
    #[arg(short = 'i', long = "input-format", value_enum)]
    pub input_format: Option<Syntax>,

    /// Syntax to serialise the output as.
    #[arg(short = 'o', long = "output-format", value_enum, default_value_t = Syntax::Turtle)]
    pub output_format: Syntax,

    /// Overrides the `genid` prefix used to mint blank-node labels that
    /// the input didn't name explicitly.
    #[arg(short = 'p', long = "blank-prefix")]
    pub blank_prefix: Option<String>,

    /// Treats INPUT as a literal document to parse rather than a file path.
    #[arg(short = 's', long = "string")]
    pub as_string: bool,

    /// Enables verbose diagnostic logging on stderr.
    #[arg(long)]
    pub debug: bool,

    /// Input file, `-` for standard input, or (with --string) the
    /// document itself.
    pub input: String,

    /// Base URI relative references in the input are resolved against.
    /// Defaults to a `file:` URI built from INPUT when reading a file, and
    /// to no base at all for stdin or --string.
    pub base_uri: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Syntax {
    Turtle,
    Ntriples,
}

impl Syntax {
    pub fn guess_from_path(path: &str) -> Option<Self> {
        if path.ends_with(".nt") {
            Some(Syntax::Ntriples)
        } else if path.ends_with(".ttl") {
            Some(Syntax::Turtle)
        } else {
            None
        }
    }
}
