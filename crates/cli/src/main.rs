fn main() {
    if let Err(e) = texscope_cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
