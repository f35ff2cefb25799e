use crate::{
    db::snapshots::Snapshots,
    libs::{messages::Message, plan::Dataset},
    msg_error_anyhow, msg_success, msg_warning,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file with plans, task hours, companies and lookups
    path: PathBuf,
}

pub fn cmd(args: ImportArgs) -> Result<()> {
    let dataset = Dataset::from_json_file(&args.path).map_err(|e| {
        msg_error_anyhow!(Message::DatasetLoadFailed(args.path.display().to_string(), e.to_string()))
    })?;
    if dataset.plans.is_empty() {
        msg_warning!(Message::DatasetEmpty);
    }

    Snapshots::new()?.replace(&dataset)?;
    msg_success!(Message::DatasetImported {
        plans: dataset.plans.len(),
        task_hours: dataset.task_hours.len(),
        companies: dataset.companies.len(),
    });
    Ok(())
}
