fn main() {
    fiberbundle_diagram::cli::init_tracing();
    if let Err(err) = fiberbundle_diagram::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
