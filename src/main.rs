use clap::Parser;
use conduit::cli::{providers, route, serve, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => serve::run_serve(args).await,
        Commands::Route(args) => match route::handle_route(&args) {
            Ok(report) => {
                println!("{}", report.output);
                if !report.resolved {
                    std::process::exit(1);
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Providers(args) => match providers::handle_providers(&args) {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
