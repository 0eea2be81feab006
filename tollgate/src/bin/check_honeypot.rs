use std::process::ExitCode;
use tollgate_core::cli::honeypot::{HoneypotArgs, run};
use tollgate_core::cli::parse_args;

fn main() -> ExitCode {
    match parse_args::<HoneypotArgs, _, _>(std::env::args_os()) {
        Ok(args) => run(args).emit(),
        Err(output) => output.emit(),
    }
}
