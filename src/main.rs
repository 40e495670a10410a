use clap::{Parser, Subcommand};
use personal_portal::auth;
use personal_portal::config::PortalConfig;
use personal_portal::serve::serve;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Password-gated personal web portal")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the portal HTTP server
    Serve {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the SHA3-512 digest of a password for `[auth] password_sha3_512`
    HashPassword {
        password: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    match args.command {
        Command::Serve { config, port } => {
            let mut config = PortalConfig::load(config.as_deref())?;
            if let Some(port) = port {
                config.port = port;
            }
            serve(config)
        }
        Command::HashPassword { password } => {
            println!("{}", auth::digest_password(&password));
            Ok(())
        }
    }
}
