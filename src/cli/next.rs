use super::plan::local_today;
use crate::core::calendar;
use crate::core::config::AppConfig;
use anyhow::Result;

/// Prints the next regular contribution day.
pub fn run(config: &AppConfig) -> Result<()> {
    let today = local_today(config)?;
    let next = calendar::next_trigger_date(today)?;
    if calendar::is_trigger_day(today) {
        println!("Today ({today}) is a regular contribution day.");
    }
    println!("Next regular contribution day: {next}");
    Ok(())
}
