use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::insights::PostWebInsightQuery;
use chrono::NaiveDate;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct PostsArgs {
    /// Page whose posts are queried (default is the configured default page)
    #[arg(value_name = "PAGE_ID")]
    pub page_id: Option<String>,

    /// Only posts created on or after this day, as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub since: Option<NaiveDate>,

    /// Only posts created before this day, as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub until: Option<NaiveDate>,

    /// Length of the window when only one bound is given (default is 365)
    #[arg(long, value_name = "DAYS")]
    pub between_days: Option<u32>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn process_posts<H: Host>(host: &mut H, args: &PostsArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;

    let query = PostWebInsightQuery {
        since: args.since,
        until: args.until,
        between_days: args.between_days,
    };

    let insight = common.client.post_web_insight(args.page_id.as_deref(), &query).await?;
    common.report(&insight.rows, &insight)
}
