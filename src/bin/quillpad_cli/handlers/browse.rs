//! Interactive listing: stdin lines drive the debounced search.

#![deny(clippy::all, clippy::pedantic)]

use std::io::Write;
use std::sync::Arc;

use quillpad::application::location::{Location, Navigator};
use quillpad::application::pagination::build_page_url;
use quillpad::application::posts::PostListView;
use quillpad::application::search::{SearchController, SearchEvent, run_search};
use quillpad::presentation::views::render_list;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::client::{CliError, Ctx};
use crate::print::write_text;

const HELP: &str =
    "Type to search (settles after a pause). :go submit, :clear reset, :next/:prev/:page N, :quit\n";

#[derive(Debug, PartialEq, Eq)]
enum BrowseCommand {
    Input(String),
    Submit,
    Next,
    Prev,
    Page(u32),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> BrowseCommand {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return BrowseCommand::Input(line.to_string());
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("quit" | "q"), None, None) => BrowseCommand::Quit,
        (Some("go"), None, None) => BrowseCommand::Submit,
        (Some("clear"), None, None) => BrowseCommand::Input(String::new()),
        (Some("next"), None, None) => BrowseCommand::Next,
        (Some("prev"), None, None) => BrowseCommand::Prev,
        (Some("page"), Some(page), None) => page
            .parse()
            .map_or_else(|_| BrowseCommand::Unknown(trimmed.to_string()), BrowseCommand::Page),
        _ => BrowseCommand::Unknown(trimmed.to_string()),
    }
}

/// History shared between the search task and the command loop.
struct WatchNavigator(Arc<watch::Sender<Location>>);

impl Navigator for WatchNavigator {
    fn location(&self) -> Location {
        self.0.borrow().clone()
    }

    fn push(&mut self, target: &str) {
        self.0.send_replace(Location::parse(target));
    }
}

async fn refresh<W: Write>(
    ctx: &Ctx,
    view: &mut PostListView,
    location: &Location,
    out: &mut W,
) -> Result<(), CliError> {
    write_text(out, &format!("\n== {location} ==\n"))?;
    if let Err(err) = view.load(location).await {
        debug!(error = %err, %location, "listing failed");
    }
    write_text(out, &render_list(view, ctx.auth().as_ref()))
}

pub async fn run<R, W>(
    ctx: &Ctx,
    search: Option<String>,
    input: R,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let listing = &ctx.settings.listing;
    let initial = search.unwrap_or_default();
    let mut start = Location::new(listing.base_path.clone());
    if !initial.is_empty() {
        start.set("search", initial.clone());
    }

    let (nav_tx, mut nav_rx) = watch::channel(start);
    let nav_tx = Arc::new(nav_tx);
    let (events_tx, events_rx) = mpsc::channel(16);
    let controller = SearchController::new(
        listing.base_path.clone(),
        initial,
        ctx.settings.search.debounce,
    );
    let search_task = tokio::spawn(run_search(
        controller,
        events_rx,
        WatchNavigator(nav_tx.clone()),
    ));

    let mut view = PostListView::new(
        ctx.api.clone(),
        listing.page_size,
        listing.base_path.clone(),
    );
    let location = nav_rx.borrow_and_update().clone();
    refresh(ctx, &mut view, &location, out).await?;
    write_text(out, HELP)?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|e| CliError::InvalidInput(e.to_string()))?;
                let Some(line) = line else { break };
                let event = match parse_command(&line) {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Submit => Some(SearchEvent::Submit),
                    BrowseCommand::Input(term) => Some(SearchEvent::Input(term)),
                    BrowseCommand::Next => {
                        match view.pagination().and_then(|p| p.next) {
                            Some(href) => { nav_tx.send_replace(Location::parse(&href)); }
                            None => write_text(out, "No next page\n")?,
                        }
                        None
                    }
                    BrowseCommand::Prev => {
                        match view.pagination().and_then(|p| p.previous) {
                            Some(href) => { nav_tx.send_replace(Location::parse(&href)); }
                            None => write_text(out, "No previous page\n")?,
                        }
                        None
                    }
                    BrowseCommand::Page(page) if (1..=view.total_pages()).contains(&page) => {
                        let href = build_page_url(page, view.base_path(), &view.query().carried_params());
                        nav_tx.send_replace(Location::parse(&href));
                        None
                    }
                    BrowseCommand::Page(page) => {
                        write_text(out, &format!("No page {page}\n"))?;
                        None
                    }
                    BrowseCommand::Unknown(raw) => {
                        write_text(out, &format!("Unknown command {raw}\n"))?;
                        None
                    }
                };
                if let Some(event) = event {
                    if events_tx.send(event).await.is_err() {
                        break;
                    }
                }
            }
            changed = nav_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let location = nav_rx.borrow_and_update().clone();
                refresh(ctx, &mut view, &location, out).await?;
            }
        }
    }

    // Closing the channel cancels any pending debounce.
    drop(events_tx);
    search_task.await?;

    if nav_rx.has_changed().unwrap_or(false) {
        let location = nav_rx.borrow_and_update().clone();
        refresh(ctx, &mut view, &location, out).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_map_to_commands() {
        assert_eq!(parse_command("rust"), BrowseCommand::Input("rust".into()));
        assert_eq!(parse_command(" :go "), BrowseCommand::Submit);
        assert_eq!(parse_command(":clear"), BrowseCommand::Input(String::new()));
        assert_eq!(parse_command(":page 3"), BrowseCommand::Page(3));
        assert_eq!(parse_command(":q"), BrowseCommand::Quit);
        assert_eq!(
            parse_command(":page x"),
            BrowseCommand::Unknown(":page x".into())
        );
        assert_eq!(parse_command(":nope"), BrowseCommand::Unknown(":nope".into()));
    }
}
