//! Command-line surface for `quillpad-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quillpad::config::ConfigArgs;

#[derive(Parser, Debug)]
#[command(name = "quillpad-cli", version, about = "Quillpad blog terminal client", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign into it
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        username: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse and manage posts
    Posts(PostsArgs),
    /// Image uploads
    Images(ImagesArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct PasswordArgs {
    /// Path to a file containing the password (takes precedence over env)
    #[arg(long, env = "QUILLPAD_PASSWORD_FILE")]
    pub password_file: Option<PathBuf>,

    /// Password from env (no plain flag, to keep it out of shell history)
    #[arg(long = "password-from-env", hide = true, env = "QUILLPAD_PASSWORD")]
    pub password_env: Option<String>,
}

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Subcommand, Debug)]
pub enum PostsCmd {
    /// List one page of posts
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        /// Print the raw backend response
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show a single post
    Get {
        id: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Create a post
    Create {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        content: ContentArgs,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Update fields of a post you wrote
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        content: ContentArgs,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Delete a post
    Delete { id: String },
    /// Interactive listing with debounced search
    Browse {
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ContentArgs {
    #[arg(long)]
    pub content: Option<String>,
    /// Read the content from a file (takes precedence over --content)
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ImageArgs {
    /// Upload this image and attach it
    #[arg(long, conflicts_with = "image_url")]
    pub image: Option<PathBuf>,
    /// Attach an already hosted image
    #[arg(long)]
    pub image_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ImagesArgs {
    #[command(subcommand)]
    pub action: ImagesCmd,
}

#[derive(Subcommand, Debug)]
pub enum ImagesCmd {
    /// Upload an image and print its absolute URL
    Upload { file: PathBuf },
}
