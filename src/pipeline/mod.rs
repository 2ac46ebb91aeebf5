//! The fetch → enrich → cache → render pipeline.

pub mod cancel;
pub mod columns;
pub mod fetch;
pub mod target;

pub use cancel::*;
pub use columns::*;
pub use fetch::*;
pub use target::*;

use anyhow::Result;
use std::path::PathBuf;

use crate::cache::Caches;
use crate::download::JsonSource;
use crate::ui::{Phase, Ui};
use crate::writer::render;

/// Outcome of a full export run
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub pages_done: u32,
    pub cancelled: bool,
}

/// Collect the rows, render them, then clear the cache file if requested
pub fn export<S: JsonSource>(
    ctx: &mut Context<S>,
    ui: &mut impl Ui,
    cancel: &CancelToken,
) -> Result<ExportSummary> {
    let collected = collect(ctx, ui, cancel)?;

    ui.set_phase(Phase::Writing);
    let output = render(&collected, &ctx.settings)?;
    ui.log(format!("Create: {:?}", output));

    if ctx.settings.clear_cache {
        Caches::clear(&ctx.cache_path)?;
        ui.log("Cache cleared");
    }

    Ok(ExportSummary {
        output,
        rows: collected.rows.len(),
        pages_done: collected.pages_done,
        cancelled: collected.cancelled,
    })
}
