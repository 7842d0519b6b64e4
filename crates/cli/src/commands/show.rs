// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mf show <build-id>` - Print a stored build

use super::state_dir;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use mf_adapters::JsonBuildStore;
use mf_core::BuildId;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ShowArgs {
    /// Build id printed by `mf run`
    pub id: String,

    /// Directory holding build snapshots (default: ./.mf/builds)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub async fn show(args: ShowArgs) -> Result<()> {
    let store = JsonBuildStore::open(state_dir(Path::new("."), args.state_dir))?;
    let record = store.load(&BuildId::from(args.id.as_str())).await?;
    match args.format {
        OutputFormat::Text => print!("{}", output::details(&record)),
        OutputFormat::Json => output::print_json(&record)?,
    }
    Ok(())
}
