#![deny(clippy::all, clippy::pedantic)]

use quillpad::presentation::views::render_user;

use crate::args::PasswordArgs;
use crate::client::{CliError, Ctx};
use crate::io::read_password;

pub async fn register(
    ctx: &Ctx,
    username: &str,
    email: &str,
    password: PasswordArgs,
) -> Result<(), CliError> {
    let password = read_password(password)?;
    let user = ctx.session.register(username, email, &password).await?;
    println!("Registered and signed in as {}", render_user(&user));
    Ok(())
}

pub async fn login(ctx: &Ctx, username: &str, password: PasswordArgs) -> Result<(), CliError> {
    let password = read_password(password)?;
    let user = ctx.session.login(username, &password).await?;
    println!("Signed in as {}", render_user(&user));
    Ok(())
}

pub fn logout(ctx: &Ctx) {
    ctx.session.logout();
    println!("Signed out");
}

pub fn whoami(ctx: &Ctx) {
    match ctx.session.user() {
        Some(user) => println!("{}", render_user(&user)),
        None => println!("Not signed in"),
    }
}
