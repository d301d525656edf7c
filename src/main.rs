use clap::Parser;
use injection_water::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Injection Water - California injection report analysis");
    println!("=======================================================");
    println!();
    println!("Summarize the water injected into California oil and gas wells");
    println!("from the 2018-2021 quarterly and monthly injection reports.");
    println!();
    println!("USAGE:");
    println!("    injection_water <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    build         Read the extracts and write the typed snapshot");
    println!("    report        Print one named report, or all of them");
    println!("    list          List the available reports");
    println!("    crosscheck    Compare flagged quarterly records with the monthly report");
    println!();
    println!("EXAMPLES:");
    println!("    # Build the snapshot from ./data:");
    println!("    injection_water build");
    println!();
    println!("    # Print a report and export it as CSV:");
    println!("    injection_water report suitable_by_county --export out/");
    println!();
    println!("For detailed help on any command, use:");
    println!("    injection_water <COMMAND> --help");
}
