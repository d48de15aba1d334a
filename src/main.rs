fn main() -> std::process::ExitCode {
    breed_finder_lib::run()
}
