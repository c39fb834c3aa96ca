//! `bootci` binary entry point.

fn main() {
    if let Err(e) = bootci_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
