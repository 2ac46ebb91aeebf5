use anyhow::Result;
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zkb_export::{
    cache::Caches,
    cli::{Cli, Commands, ExportArgs},
    download::{DataDir, HttpClient},
    pipeline::{columns::COLUMNS, export, CancelToken, Context, ExportSummary},
    reference::{update_catalogs, Language, ReferenceStore},
    settings::Settings,
    ui::{ConsoleUi, Phase, Ui, UiApp},
};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse_args();
    let data = DataDir::new(cli.data_dir)?;

    match cli.command {
        Commands::Export(args) => run_export(&data, args)?,

        Commands::UpdateSde { force } => {
            let client = HttpClient::new()?;
            let mut ui = ConsoleUi::new();
            if update_catalogs(&data, &client, &mut ui, force)? {
                println!("\nReference catalogs written to {:?}", data.root());
            }
        }

        Commands::ListColumns { lang } => {
            let lang: Language = lang.parse()?;
            println!("Export columns ({}):\n", lang);
            for column in &COLUMNS {
                println!("  {:<14} {}", column.name, column.label(lang));
            }
        }

        Commands::ClearCache => {
            Caches::clear(&data.cache_path())?;
            println!("Removed {:?}", data.cache_path());
        }
    }

    Ok(())
}

fn run_export(data: &DataDir, args: ExportArgs) -> Result<()> {
    let start = Instant::now();

    let mut settings = Settings::load(&data.settings_path())?;
    for message in settings.apply(args.overrides()) {
        eprintln!("{}", message);
    }
    settings.save(&data.settings_path())?;

    let client = HttpClient::new()?;
    let cancel = CancelToken::new();

    if args.tui {
        let mut ui = UiApp::new()?;
        match export_with(data, settings, client, &mut ui, &cancel) {
            Ok(summary) => ui.finish(&describe(&summary, start)),
            Err(err) => {
                ui.restore()?;
                Err(err)
            }
        }
    } else {
        let mut ui = ConsoleUi::new();
        let summary = export_with(data, settings, client, &mut ui, &cancel)?;
        println!("\n{}", describe(&summary, start));
        Ok(())
    }
}

fn export_with(
    data: &DataDir,
    settings: Settings,
    client: HttpClient,
    ui: &mut impl Ui,
    cancel: &CancelToken,
) -> Result<ExportSummary> {
    if settings.update_sde {
        update_catalogs(data, &client, ui, false)?;
    }

    ui.set_phase(Phase::Loading);
    let store = ReferenceStore::load(&data.types_path(), &data.universes_path())?;
    let problems = store.validate();
    if !problems.is_empty() {
        warn!(count = problems.len(), "reference catalogs contain dangling keys");
        for problem in &problems {
            debug!("{}", problem);
        }
    }

    let caches = Caches::load(&data.cache_path())?;
    ui.log(format!("Loaded {} cached killmails", caches.records.len()));

    let mut ctx = Context::new(settings, store, caches, client, data.cache_path());
    export(&mut ctx, ui, cancel)
}

fn describe(summary: &ExportSummary, start: Instant) -> String {
    let stopped = if summary.cancelled { " (stopped early)" } else { "" };
    format!(
        "Created {:?} ({} killmails, {} pages){} in {:.1}s",
        summary.output,
        summary.rows,
        summary.pages_done,
        stopped,
        start.elapsed().as_secs_f64()
    )
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
