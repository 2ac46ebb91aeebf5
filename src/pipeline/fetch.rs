use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use super::cancel::CancelToken;
use super::columns::{derive_row, header, CellValue, ParticipantNames, RowInput};
use super::target::{Focus, Target};
use crate::cache::{Caches, EnrichedRecord, EntityKind, ListingItem};
use crate::download::JsonSource;
use crate::reference::ReferenceStore;
use crate::settings::Settings;
use crate::ui::{Phase, Ui};

/// Everything one run needs, built once at startup
pub struct Context<S> {
    pub settings: Settings,
    pub store: ReferenceStore,
    pub caches: Caches,
    pub source: S,
    /// Where the caches are persisted after each page
    pub cache_path: PathBuf,
}

impl<S: JsonSource> Context<S> {
    pub fn new(
        settings: Settings,
        store: ReferenceStore,
        caches: Caches,
        source: S,
        cache_path: PathBuf,
    ) -> Self {
        Self {
            settings,
            store,
            caches,
            source,
            cache_path,
        }
    }
}

/// One exported killmail
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub killmail_id: u64,
    pub cells: Vec<CellValue>,
    /// The focus entity took part in this killmail
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collected {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
    pub focus: Option<Focus>,
    /// Pages fully processed and persisted
    pub pages_done: u32,
    pub cancelled: bool,
}

/// Check the operator's stop request at a safe point
fn should_stop(cancel: &CancelToken, ui: &mut impl Ui) -> bool {
    if ui.poll_cancel() {
        cancel.cancel();
    }
    cancel.is_cancelled()
}

/// Look up every participant the record has; absent IDs are never resolved
fn resolve_participants<S: JsonSource>(
    ctx: &mut Context<S>,
    record: &EnrichedRecord,
    ui: &mut impl Ui,
) -> Result<ParticipantNames> {
    let mut names = ParticipantNames::default();
    for kind in EntityKind::ALL {
        if let Some(id) = record.participant(kind) {
            let name = ctx.caches.names.resolve(kind, id, &ctx.source, ui)?;
            names.set(kind, name);
        }
    }
    Ok(names)
}

/// Page through the listing and build the export rows.
///
/// Caches are written after every completed page. On cancellation the rows
/// gathered so far are returned; the partial page is not persisted.
pub fn collect<S: JsonSource>(
    ctx: &mut Context<S>,
    ui: &mut impl Ui,
    cancel: &CancelToken,
) -> Result<Collected> {
    let target = Target::parse(&ctx.settings.zkb_url)?;
    let lang = ctx.settings.lang;
    let with_links = ctx.settings.format.supports_links();
    let first_page = ctx.settings.page;
    let limit = ctx.settings.limit;
    first_page.checked_add(limit.saturating_sub(1)).with_context(|| {
        format!("Page range {} + {} runs past the last page number", first_page, limit)
    })?;

    ui.set_phase(Phase::Fetching);
    ui.set_info(format!("Listing: {}", target.listing_url));
    info!(listing = %target.listing_url, first_page, limit, "collecting killmails");

    let mut rows: Vec<Row> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut pages_done = 0;
    let mut cancelled = false;

    'pages: for offset in 0..limit {
        if should_stop(cancel, ui) {
            cancelled = true;
            break;
        }

        let page = first_page + offset;
        ui.set_progress(u64::from(offset), u64::from(limit), format!("Page {}", page));

        let url = target.page_url(page);
        let listing = ctx.source.fetch_json(&url, ui)?;
        let items: Vec<ListingItem> = serde_json::from_value(listing)
            .with_context(|| format!("Malformed listing page from {}", url))?;
        debug!(page, items = items.len(), "listing page");

        for item in &items {
            if !ctx.caches.records.contains(item.killmail_id) && should_stop(cancel, ui) {
                cancelled = true;
                break 'pages;
            }

            let record = ctx
                .caches
                .records
                .get_or_fetch(item, &ctx.store, &ctx.source, ui)?;
            let names = resolve_participants(ctx, &record, ui)?;
            let input = RowInput {
                record: &record,
                summary: &item.zkb,
                store: &ctx.store,
                lang,
                names: &names,
            };
            let row = Row {
                killmail_id: record.killmail_id,
                cells: derive_row(&input, with_links)
                    .with_context(|| format!("Failed to build row for killmail {}", record.killmail_id))?,
                focused: target.focus.is_some_and(|focus| focus.matches(&record)),
            };

            // A killmail listed twice keeps its first position
            match positions.get(&row.killmail_id) {
                Some(&index) => rows[index] = row,
                None => {
                    positions.insert(row.killmail_id, rows.len());
                    rows.push(row);
                }
            }
        }

        ctx.caches.save(&ctx.cache_path)?;
        pages_done += 1;
        ui.log(format!("Saved cache after page {} ({} killmails)", page, ctx.caches.records.len()));
    }

    ui.clear_progress();
    if cancelled {
        ui.log(format!("Stopped after {} of {} pages", pages_done, limit));
    }

    Ok(Collected {
        header: header(lang),
        rows,
        focus: target.focus,
        pages_done,
        cancelled,
    })
}
