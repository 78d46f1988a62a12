use crate::error::CliResult;
use crate::input;
use colored::Colorize;
use har_core::validate_sets;
use std::io;
use std::path::Path;

/// List the arrays of a file; with `verbose`, run the set validator and
/// print its messages.
pub fn run(path: &Path, verbose: bool, quiet: bool) -> CliResult<()> {
    let file = input::load(path)?;

    if !quiet {
        for array in file.iter() {
            let rank = array.rank();
            let dims: Vec<String> = array.dimensions()[..rank]
                .iter()
                .map(|d| d.to_string())
                .collect();
            println!(
                "{:<6} {}  [{}]  {}",
                array.header().bold(),
                array.kind(),
                dims.join(", "),
                array.description()
            );
        }
        println!("{} arrays", file.len());
    }

    if verbose {
        let mut stdout = io::stdout();
        let consistent = validate_sets(file.iter(), Some(&mut stdout));
        if consistent {
            println!("sets consistent");
        } else {
            println!("{} set definitions disagree", "warning:".yellow().bold());
        }
    }
    Ok(())
}
