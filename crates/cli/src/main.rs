use std::process::ExitCode;

fn main() -> ExitCode {
    tiffinsight_cli::run()
}
