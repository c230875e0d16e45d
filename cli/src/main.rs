mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, probe, quick, ranges};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let quiet: u8 = commands.quiet;

    logging::init_logging(commands.verbose, quiet)?;
    print::banner(quiet);

    let result = match commands.command {
        Commands::Discover(args) => {
            print::header("getting ready for discovery", quiet);
            discover::discover(&args, quiet).await
        }
        Commands::Quick(args) => {
            print::header("checking this machine", quiet);
            quick::quick(&args, quiet).await
        }
        Commands::Probe {
            addr,
            port,
            timeout,
            path,
        } => probe::probe(addr, port, timeout, &path, quiet).await,
        Commands::Ranges { local_addr } => {
            ranges::ranges(local_addr, quiet);
            Ok(())
        }
    };

    print::rule();
    result
}
