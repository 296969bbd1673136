// softkill entry point

use clap::error::ErrorKind;
use clap::Parser;
use softkill_cli::Cli;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let code = softkill_cli::run(cli).await;
    std::process::exit(code);
}
