fn main() {
    lab_pipeline::cli::run();
}
