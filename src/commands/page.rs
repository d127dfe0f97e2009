use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::insights::{DatePreset, PageWebInsightQuery, Period};
use chrono::NaiveDate;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct PageArgs {
    /// Page to query (default is the configured default page)
    #[arg(value_name = "PAGE_ID")]
    pub page_id: Option<String>,

    /// First day of the window, as YYYY-MM-DD
    #[arg(long, value_name = "DATE", requires = "until")]
    pub since: Option<NaiveDate>,

    /// Last day of the window, as YYYY-MM-DD
    #[arg(long, value_name = "DATE", requires = "since")]
    pub until: Option<NaiveDate>,

    /// Aggregation period of each value
    #[arg(long, value_name = "PERIOD", default_value = "week")]
    pub period: Period,

    /// Relative window used when no dates are given
    #[arg(long, value_name = "PRESET", default_value = "yesterday")]
    pub date_preset: DatePreset,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn process_page<H: Host>(host: &mut H, args: &PageArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;

    let query = PageWebInsightQuery {
        since: args.since,
        until: args.until,
        date_preset: args.date_preset,
        period: args.period,
    };

    let rows = common.client.page_web_insight(args.page_id.as_deref(), &query).await?;
    common.report(&rows, &rows)
}
