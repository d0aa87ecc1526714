//! pyexe_bundler - package Python scripts into Windows executables and installers.
//!
//! Exit code 0 means every requested stage succeeded and its artifacts exist.

use std::process;

#[tokio::main]
async fn main() {
    // RUST_LOG overrides; tool output is printed by the CLI, not the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let exit_code = match pyexe_bundler::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };

    process::exit(exit_code);
}
