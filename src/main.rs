fn main() -> std::process::ExitCode {
    flightsort_lib::run()
}
