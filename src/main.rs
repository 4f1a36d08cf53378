use clap::Parser;
use pns_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(commands::run(args)) {
        Ok(_stats) => {
            // Success - the command has already reported its summary
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("PNS Processor - NWS Public Information Statement Converter");
    println!("==========================================================");
    println!();
    println!("Parse raw PNS bulletin text into structured observation archives and");
    println!("accumulate all per-station archives into one master table.");
    println!();
    println!("USAGE:");
    println!("    pns-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Parse raw bulletins into per-station archives (main command)");
    println!("    accumulate  Union all per-station archives into the master table");
    println!("    stations    Report the configured field offices");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Process every station with raw bulletins under the archive root:");
    println!("    pns-processor process --data-dir ./data");
    println!();
    println!("    # Process specific stations:");
    println!("    pns-processor process --data-dir ./data --stations OKX,ALY,BOX");
    println!();
    println!("    # Rebuild the all-stations master table:");
    println!("    pns-processor accumulate --data-dir ./data");
    println!();
    println!("For detailed help on any command, use:");
    println!("    pns-processor <COMMAND> --help");
}
