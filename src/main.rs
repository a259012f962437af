fn main() {
    if let Err(err) = websum::cli::main() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
