use std::process::ExitCode;
use tollgate_core::cli::filesystem::{FsArgs, run};
use tollgate_core::cli::parse_args;

fn main() -> ExitCode {
    match parse_args::<FsArgs, _, _>(std::env::args_os()) {
        Ok(args) => run(args).emit(),
        Err(output) => output.emit(),
    }
}
