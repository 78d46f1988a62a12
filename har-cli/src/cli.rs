use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "har", about = "GEMPACK header array toolkit", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print set-validation messages while reading
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the arrays of a file: header, type, dimensions, description
    Read {
        /// Input file (.har, .sl4, or .harx)
        file: PathBuf,
    },

    /// Convert between the binary (.har/.sl4) and archive (.harx) forms
    ///
    /// Examples:
    ///   har convert data.har data.harx
    ///   har convert data.harx data.har
    ///   har convert model.sl4 variables.harx --solution
    Convert {
        /// Input file (.har, .sl4, or .harx)
        input: PathBuf,

        /// Output file (.har, .sl4, or .harx)
        output: PathBuf,

        /// Assemble the back-solved and condensed variables of a
        /// solution input and convert those instead of the raw arrays
        #[arg(long)]
        solution: bool,
    },
}
