//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = toponym_cli::run() {
        eprintln!("toponym: {err}");
        std::process::exit(1);
    }
}
