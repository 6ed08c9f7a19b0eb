#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use quillpad::application::posts::{PostViewError, WRITE_REQUIRES_LOGIN, load_image};
use quillpad::application::repos::BlogApi;

use crate::args::ImagesCmd;
use crate::client::{CliError, Ctx};

pub async fn handle(ctx: &Ctx, cmd: ImagesCmd) -> Result<(), CliError> {
    match cmd {
        ImagesCmd::Upload { file } => upload(ctx, file).await,
    }
}

async fn upload(ctx: &Ctx, file: PathBuf) -> Result<(), CliError> {
    let session = ctx
        .auth()
        .ok_or(PostViewError::NotSignedIn(WRITE_REQUIRES_LOGIN))?;
    let image = load_image(&file).await?;
    let url = ctx.api.upload_image(session.token(), image).await?;
    println!("{url}");
    Ok(())
}
