use super::Host;
use super::common::{Common, CommonArgs};
use crate::{Error, Result};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// Page to resolve a token for (default is the configured default page)
    #[arg(value_name = "PAGE_ID")]
    pub page_id: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Resolve and print the masked page token.
///
/// Exits with status 1 when no configured token grants access to the page.
pub async fn process_token<H: Host>(host: &mut H, args: &TokenArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;
    let page_id = common.client.page_id(args.page_id.as_deref())?.to_owned();

    match common.client.page_token(Some(&page_id)).await {
        Ok(token) => {
            let _ = writeln!(common.host().output(), "{page_id}: {token} ({})", token.kind());
            Ok(())
        }
        Err(Error::Credential(reason)) => {
            let _ = writeln!(common.host().error(), "Unable to resolve a page token for '{page_id}': {reason}");
            common.host().exit(1);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
