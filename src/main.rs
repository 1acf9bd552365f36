// Sonosift command-line entry point
fn main() -> std::process::ExitCode {
    sonosift_lib::run()
}
