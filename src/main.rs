use std::process::ExitCode;

fn main() -> ExitCode {
    testlist::cli::run()
}
