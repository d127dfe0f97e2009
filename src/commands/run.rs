//! Command dispatch logic for page-insights

use super::init::{InitArgs, init_config};
use super::page::{PageArgs, process_page};
use super::posts::{PostsArgs, process_posts};
use super::token::{TokenArgs, process_token};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "page-insights", author, version, long_about = None)]
#[command(about = "Collect and normalize page and post insights")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: InsightsSubcommand,
}

#[derive(Subcommand, Debug)]
enum InsightsSubcommand {
    /// Report page insights, one row per period end
    Page(Box<PageArgs>),
    /// Report the insights of every post in a window
    Posts(Box<PostsArgs>),
    /// Resolve the page token for a page and print it masked
    Token(Box<TokenArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        InsightsSubcommand::Page(page_args) => process_page(host, page_args).await,
        InsightsSubcommand::Posts(posts_args) => process_posts(host, posts_args).await,
        InsightsSubcommand::Token(token_args) => process_token(host, token_args).await,
        InsightsSubcommand::Init(init_args) => init_config(host, init_args),
    }
}
