//! Binary entrypoint; all work happens in [`tyrone_cli::run`].

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = tyrone_cli::run().await;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
