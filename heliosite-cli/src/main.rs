//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::init();
    if let Err(err) = heliosite_cli::run() {
        eprintln!("heliosite: {err}");
        std::process::exit(1);
    }
}
