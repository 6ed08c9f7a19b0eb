#![deny(clippy::all, clippy::pedantic)]

use quillpad::application::location::Location;
use quillpad::application::posts::{
    PostChanges, PostDraft, PostListView, create_post, delete_post, load_for_edit, load_image,
    parse_post_id, update_post,
};
use quillpad::application::repos::{BlogApi, ImageFile, ListPostsQuery};
use quillpad::presentation::views::{render_detail, render_list};
use tokio::io::BufReader;

use crate::args::{ContentArgs, ImageArgs, PostsCmd};
use crate::client::{CliError, Ctx};
use crate::handlers::browse;
use crate::io::read_content;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List { page, search, json } => list(ctx, page, search, json).await,
        PostsCmd::Get { id, json } => get(ctx, &id, json).await,
        PostsCmd::Create {
            title,
            content,
            image,
        } => create(ctx, title, content, image).await,
        PostsCmd::Update {
            id,
            title,
            content,
            image,
        } => update(ctx, &id, title, content, image).await,
        PostsCmd::Delete { id } => delete(ctx, &id).await,
        PostsCmd::Browse { search } => {
            let input = BufReader::new(tokio::io::stdin());
            browse::run(ctx, search, input, &mut std::io::stdout()).await
        }
    }
}

/// `/posts?search=..&page=..` for the requested listing page.
pub fn listing_location(ctx: &Ctx, page: u32, search: Option<String>) -> Location {
    let mut location = Location::new(ctx.settings.listing.base_path.clone());
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        location.set("search", search);
    }
    if page > 1 {
        location.set("page", page.to_string());
    }
    location
}

async fn list(ctx: &Ctx, page: u32, search: Option<String>, json: bool) -> Result<(), CliError> {
    let page_size = ctx.settings.listing.page_size;
    if json {
        let query = ListPostsQuery::new(page, page_size, search);
        let res = ctx.api.list_posts(&query).await?;
        return print_json(&res);
    }

    let location = listing_location(ctx, page, search);
    let mut view = PostListView::new(
        ctx.api.clone(),
        page_size,
        ctx.settings.listing.base_path.clone(),
    );
    view.load(&location).await?;
    print!("{}", render_list(&view, ctx.auth().as_ref()));
    Ok(())
}

async fn get(ctx: &Ctx, id: &str, json: bool) -> Result<(), CliError> {
    let id = parse_post_id(id)?;
    let post = ctx.api.get_post(id).await?;
    if json {
        return print_json(&post);
    }
    print!("{}", render_detail(&post, ctx.auth().as_ref()));
    Ok(())
}

async fn attach(image: &ImageArgs) -> Result<Option<ImageFile>, CliError> {
    match image.image.as_deref() {
        Some(path) => Ok(Some(load_image(path).await?)),
        None => Ok(None),
    }
}

async fn create(
    ctx: &Ctx,
    title: String,
    content: ContentArgs,
    image: ImageArgs,
) -> Result<(), CliError> {
    let draft = PostDraft {
        title,
        content: read_content(content)?.unwrap_or_default(),
        image: attach(&image).await?,
        image_url: image.image_url,
    };
    let auth = ctx.auth();
    let post = create_post(&*ctx.api, auth.as_ref(), draft).await?;
    print!("{}", render_detail(&post, auth.as_ref()));
    Ok(())
}

async fn update(
    ctx: &Ctx,
    id: &str,
    title: Option<String>,
    content: ContentArgs,
    image: ImageArgs,
) -> Result<(), CliError> {
    let id = parse_post_id(id)?;
    let auth = ctx.auth();
    load_for_edit(&*ctx.api, auth.as_ref(), id).await?;

    let changes = PostChanges {
        title,
        content: read_content(content)?,
        image: attach(&image).await?,
        image_url: image.image_url,
    };
    let post = update_post(&*ctx.api, auth.as_ref(), id, changes).await?;
    print!("{}", render_detail(&post, auth.as_ref()));
    Ok(())
}

async fn delete(ctx: &Ctx, id: &str) -> Result<(), CliError> {
    let id = parse_post_id(id)?;
    delete_post(&*ctx.api, ctx.auth().as_ref(), id).await?;
    println!("deleted");
    Ok(())
}
