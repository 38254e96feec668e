use std::io::{Read, Write};

use anyhow::Context;
use clap::Parser;
use pdfvault::cli::{Cli, Commands};
use pdfvault::commands;
use pdfvault::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::parse_from(["pdfvault", "--help"]);
        return Ok(());
    };

    // One-shot commands only report problems; the server narrates.
    #[cfg(feature = "server")]
    let default_filter = if matches!(command, Commands::Serve { .. }) {
        "info"
    } else {
        "warn"
    };
    #[cfg(not(feature = "server"))]
    let default_filter = "warn";
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::load()?;
    let root = commands::storage_root(cli.root.as_deref(), &config);
    let store = commands::open_store(root)?;

    match command {
        #[cfg(feature = "server")]
        Commands::Serve { listen, static_dir } => {
            let listen = listen.unwrap_or(config.server.listen);
            let static_dir = static_dir.or_else(|| config.server.static_dir.map(Into::into));
            tokio::runtime::Runtime::new()?.block_on(pdfvault::server::serve(
                store,
                &listen,
                static_dir.as_deref(),
            ))
        }
        Commands::Write { name, content } => {
            let content = content_or_stdin(content)?;
            println!("{}", commands::write(&store, &name, &content)?);
            Ok(())
        }
        Commands::Append { name, content } => {
            let content = content_or_stdin(content)?;
            println!("{}", commands::append(&store, &name, &content)?);
            Ok(())
        }
        Commands::Read { name, raw, output } => {
            let bytes = if raw {
                commands::read_raw(&store, &name)?
            } else {
                commands::read_text(&store, &name)?.into_bytes()
            };

            match output {
                Some(path) => std::fs::write(&path, &bytes)
                    .with_context(|| format!("Cannot write {}", path.display())),
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    stdout.flush()?;
                    Ok(())
                }
            }
        }
        Commands::Rename { old_name, new_name } => {
            println!("{}", commands::rename(&store, &old_name, &new_name)?);
            Ok(())
        }
        Commands::Delete { name } => {
            println!("{}", commands::delete(&store, &name)?);
            Ok(())
        }
        Commands::Mkdir { name } => {
            println!("{}", commands::create_dir(&store, &name)?);
            Ok(())
        }
        Commands::Rmdir { name } => {
            println!("{}", commands::delete_dir(&store, &name)?);
            Ok(())
        }
    }
}

fn content_or_stdin(content: Option<String>) -> anyhow::Result<String> {
    if let Some(content) = content {
        return Ok(content);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read content from stdin")?;
    Ok(buffer)
}
