//! quillpad-cli: terminal client for the blog backend.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod io;
mod print;

use std::process;

use clap::Parser;
use quillpad::infra::telemetry;

use args::{Cli, Commands};
use client::{CliError, Ctx, load_settings};
use handlers::{auth, images, posts};

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;
    telemetry::init(&settings.logging)?;
    let ctx = Ctx::new(settings)?;

    match cli.command {
        Commands::Register {
            username,
            email,
            password,
        } => auth::register(&ctx, &username, &email, password).await?,
        Commands::Login { username, password } => auth::login(&ctx, &username, password).await?,
        Commands::Logout => auth::logout(&ctx),
        Commands::Whoami => auth::whoami(&ctx),
        Commands::Posts(cmd) => posts::handle(&ctx, cmd.action).await?,
        Commands::Images(cmd) => images::handle(&ctx, cmd.action).await?,
    }

    Ok(())
}
