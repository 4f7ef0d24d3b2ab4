//! Subcommand handlers. Each one works on an [`App`] and prints its result.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use carefind_contracts::{
    error::{CarefindError, CarefindResult},
    facility::{FacilityDraft, FacilityId},
    query::{FacilityFilter, SortKey, Visibility},
};
use carefind_core::{
    traits::{LiveInfoSource, UrlExtractor},
    FacilityStore,
};
use carefind_csv::{export_csv, export_file_name, import_csv_bytes, SkipReason};
use carefind_live::{
    parse_url_list, save_extracted, AutoRefresh, BulkRunner, LiveConfig, SimulatedExtractor, SimulatedLiveInfo,
};
use carefind_scoring::ScoredFacility;

use crate::{
    args::{ExportArgs, FacilityFields, ProfileCommand, SearchArgs},
    config::AppConfig,
    render, Command,
};

/// The store plus the web collaborators the commands talk to.
pub struct App {
    pub store: FacilityStore,
    pub live_config: LiveConfig,
    pub live: Box<dyn LiveInfoSource>,
    pub extractor: Box<dyn UrlExtractor>,
}

impl App {
    /// Wire the simulated web collaborators from `config`.
    pub fn new(store: FacilityStore, config: &AppConfig) -> Self {
        Self {
            store,
            live_config: config.live.clone(),
            live: Box::new(SimulatedLiveInfo::new(config.live.clone())),
            extractor: Box::new(SimulatedExtractor::new(config.live.clone())),
        }
    }
}

/// Find a facility by id, exact name, or a unique part of its name or id.
pub fn resolve(store: &FacilityStore, key: &str) -> CarefindResult<FacilityId> {
    if let Ok(id) = key.parse::<FacilityId>() {
        return store.get(id).map(|f| f.id);
    }
    let wanted = key.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(CarefindError::validation("facility", "a facility name or id is required"));
    }
    let facilities = store.facilities();
    if let Some(f) = facilities.iter().find(|f| f.name.to_lowercase() == wanted) {
        return Ok(f.id);
    }
    let candidates: Vec<_> = facilities
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&wanted) || f.id.to_string().starts_with(&wanted))
        .collect();
    match candidates.as_slice() {
        [one] => Ok(one.id),
        [] => Err(CarefindError::NotFound { id: key.to_string() }),
        many => Err(CarefindError::validation(
            "facility",
            format!("'{key}' matches {} facilities; use the id", many.len()),
        )),
    }
}

/// A token cancelled by Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current request");
            trigger.cancel();
        }
    });
    token
}

fn print_list(app: &App, items: &[ScoredFacility<'_>], now: DateTime<Utc>) {
    if items.is_empty() {
        println!("該当する施設はありません。");
        return;
    }
    for item in items {
        println!("{}", render::facility_line(item, app.store.classifier(), now));
    }
    println!("{} 件", items.len());
}

pub async fn execute(app: &mut App, command: Command, now: DateTime<Utc>) -> CarefindResult<()> {
    let today = now.date_naive();
    match command {
        Command::List { all } => {
            let filter = FacilityFilter {
                visibility: if all { Visibility::All } else { Visibility::VisibleOnly },
                ..FacilityFilter::default()
            };
            let items = app.store.search(&filter, Some(SortKey::Recommended), now);
            print_list(app, &items, now);
        }
        Command::Search(args) => search(app, &args, now),
        Command::Hidden => {
            let items = app.store.hidden_view(now);
            print_list(app, &items, now);
        }
        Command::Show { facility } => {
            let id = resolve(&app.store, &facility)?;
            print!("{}", render::facility_detail(app.store.get(id)?, now));
        }
        Command::Add { fields, from_web } => add(app, fields, from_web, now).await?,
        Command::Edit { facility, fields } => {
            let id = resolve(&app.store, &facility)?;
            let mut draft = FacilityDraft::from_facility(app.store.get(id)?);
            fields.apply(&mut draft);
            app.store.update(id, draft, now)?;
            println!("更新しました: {}", app.store.get(id)?.name);
        }
        Command::Delete { facility, all } => {
            if all {
                let removed = app.store.delete_all()?;
                println!("{removed} 件削除しました。");
            } else if let Some(key) = facility {
                let id = resolve(&app.store, &key)?;
                let removed = app.store.delete(id)?;
                println!("削除しました: {}", removed.name);
            } else {
                return Err(CarefindError::validation("facility", "name a facility or pass --all"));
            }
        }
        Command::Hide { facility } => {
            let id = resolve(&app.store, &facility)?;
            app.store.set_hidden(id, true)?;
            println!("非表示にしました: {}", app.store.get(id)?.name);
        }
        Command::Unhide { fragment, all } => {
            if all {
                let restored = app.store.unhide_all()?;
                println!("{restored} 件を再表示しました。");
            } else if let Some(fragment) = fragment {
                match app.store.unhide_by_name(&fragment)? {
                    Some(id) => println!("再表示しました: {}", app.store.get(id)?.name),
                    None => return Err(CarefindError::NotFound { id: fragment }),
                }
            } else {
                return Err(CarefindError::validation("facility", "name a facility or pass --all"));
            }
        }
        Command::Confirm { facility, method, date } => {
            let id = resolve(&app.store, &facility)?;
            app.store.mark_confirmed(id, method, date.unwrap_or(today))?;
            println!("確認済みにしました: {} ({})", app.store.get(id)?.name, method.label());
        }
        Command::AdoptWeb { facility } => {
            let id = resolve(&app.store, &facility)?;
            let availability = app.store.apply_web_availability(id, now)?;
            println!("WEB情報を反映しました: {} → {}", app.store.get(id)?.name, availability.label());
        }
        Command::Import { file } => import(app, &file, now)?,
        Command::Export(args) => export(app, args, now)?,
        Command::Profile(cmd) => profile(app, cmd, now)?,
        Command::Refresh { facility } => {
            let runner = BulkRunner::with_cancellation(app.live_config.clone(), cancel_on_ctrl_c());
            match facility {
                Some(key) => {
                    let id = resolve(&app.store, &key)?;
                    runner.refresh_one(&mut app.store, app.live.as_ref(), id).await?;
                    print!("{}", render::facility_detail(app.store.get(id)?, now));
                }
                None => {
                    let report = runner.refresh_all(&mut app.store, app.live.as_ref()).await?;
                    println!("{}", render::bulk_report("WEB情報の更新", &report));
                }
            }
        }
        Command::BulkUpdate => {
            let runner = BulkRunner::with_cancellation(app.live_config.clone(), cancel_on_ctrl_c());
            let report = runner.bulk_web_update(&mut app.store, app.live.as_ref()).await?;
            println!("{}", render::bulk_report("一括更新", &report));
        }
        Command::BulkUrls { file, save } => bulk_urls(app, &file, save, now).await?,
        Command::Watch { minutes } => {
            let mut config = app.live_config.clone();
            if let Some(minutes) = minutes {
                config.auto_refresh_minutes = minutes;
                config.validate()?;
            }
            let auto = AutoRefresh::new(config, cancel_on_ctrl_c());
            println!("{} 分ごとに自動更新します (Ctrl-C で終了)", auto.period().as_secs() / 60);
            let cycles = auto.run(&mut app.store, app.live.as_ref()).await?;
            println!("自動更新を終了しました ({cycles} 回実行)");
        }
    }
    Ok(())
}

fn search(app: &App, args: &SearchArgs, now: DateTime<Utc>) {
    let mut items = app.store.search(&args.filter(), args.sort_key(), now);
    if let Some(limit) = args.limit {
        items.truncate(limit);
    }
    print_list(app, &items, now);
}

async fn add(app: &mut App, fields: FacilityFields, from_web: bool, now: DateTime<Utc>) -> CarefindResult<()> {
    let mut draft = FacilityDraft::default();
    fields.apply(&mut draft);
    app.store.check_unique_name(&draft.name)?;

    if from_web {
        if draft.website_url.trim().is_empty() {
            return Err(CarefindError::validation("website_url", "--from-web needs --website"));
        }
        let probe = app.live.probe(&draft.website_url).await?;
        probe.prefill(&mut draft, now.date_naive());
        debug!(availability = %probe.availability, "draft pre-filled from website");
    }

    let id = app.store.add(draft, now)?;
    println!("追加しました: {} ({id})", app.store.get(id)?.name);
    Ok(())
}

fn import(app: &mut App, file: &Path, now: DateTime<Utc>) -> CarefindResult<()> {
    let bytes = std::fs::read(file).map_err(|e| CarefindError::MalformedInput {
        reason: format!("cannot read '{}': {e}", file.display()),
    })?;
    let (report, encoding) = import_csv_bytes(&bytes, now)?;
    for row in &report.skipped {
        let why = match row.reason {
            SkipReason::TooFewFields { found } => format!("列が不足しています ({found} 列)"),
            SkipReason::MissingName => "施設名がありません".to_string(),
        };
        warn!(line = row.line, "row skipped");
        println!("  {} 行目をスキップ: {why}", row.line);
    }
    let skipped = report.skipped.len();
    let summary = app.store.merge_import(report.records)?;
    println!(
        "{} 件を取り込みました ({encoding}); 重複 {} 件, スキップ {skipped} 件",
        summary.imported, summary.duplicates
    );
    Ok(())
}

fn export(app: &App, args: ExportArgs, now: DateTime<Utc>) -> CarefindResult<()> {
    let today = now.date_naive();
    let path = args.file.unwrap_or_else(|| PathBuf::from(export_file_name(today)));
    let mut items = app.store.search(&args.view.filter(), args.view.sort_key(), now);
    if let Some(limit) = args.view.limit {
        items.truncate(limit);
    }
    let csv = export_csv(items.iter().map(|item| item.facility));
    std::fs::write(&path, csv).map_err(|e| CarefindError::StorageFailure {
        reason: format!("cannot write '{}': {e}", path.display()),
    })?;
    println!("{} 件を書き出しました: {}", items.len(), path.display());
    Ok(())
}

fn profile(app: &mut App, cmd: ProfileCommand, now: DateTime<Utc>) -> CarefindResult<()> {
    match cmd {
        ProfileCommand::Set(args) => {
            app.store.save_profile(args.into(), now)?;
            println!("患者情報を保存しました。");
        }
        ProfileCommand::Clear => {
            app.store.clear_profile()?;
            println!("患者情報を削除しました。");
        }
        ProfileCommand::Show => match app.store.profile() {
            Some(p) => print!("{}", render::profile(p)),
            None => println!("患者情報は登録されていません。"),
        },
    }
    Ok(())
}

async fn bulk_urls(app: &mut App, file: &Path, save: bool, now: DateTime<Utc>) -> CarefindResult<()> {
    let text = std::fs::read_to_string(file).map_err(|e| CarefindError::MalformedInput {
        reason: format!("cannot read '{}': {e}", file.display()),
    })?;
    let urls = parse_url_list(&text);
    if urls.is_empty() {
        return Err(CarefindError::MalformedInput {
            reason: "no http(s) URLs in the list".to_string(),
        });
    }

    let runner = BulkRunner::with_cancellation(app.live_config.clone(), cancel_on_ctrl_c());
    let batch = runner.process_urls(app.extractor.as_ref(), &urls).await;
    print!("{}", render::url_batch(&batch));

    if save {
        let summary = save_extracted(&mut app.store, &batch.records, now)?;
        println!(
            "{} 件を保存しました; 重複 {} 件, 不備 {} 件",
            summary.saved, summary.duplicates, summary.invalid
        );
    } else if !batch.records.is_empty() {
        println!("保存するには --save を付けて再実行してください。");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use carefind_contracts::taxonomy::{Availability, ConfirmationMethod, ReliabilityLevel};
    use carefind_storage::InMemoryRepository;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()
    }

    fn app() -> App {
        let config = AppConfig {
            live: LiveConfig::instant(),
            ..AppConfig::default()
        };
        let store = FacilityStore::open(Box::new(InMemoryRepository::new()), &config.scoring).unwrap();
        App::new(store, &config)
    }

    fn fields(name: &str, address: &str) -> FacilityFields {
        FacilityFields {
            name: Some(name.into()),
            address: Some(address.into()),
            ..FacilityFields::default()
        }
    }

    async fn add(app: &mut App, name: &str) {
        let command = Command::Add { fields: fields(name, "札幌市中央区"), from_web: false };
        execute(app, command, now()).await.unwrap();
    }

    #[tokio::test]
    async fn resolve_by_name_fragment_and_id() {
        let mut app = app();
        add(&mut app, "さくら苑").await;
        add(&mut app, "さくらの杜").await;
        let id = app.store.facilities()[0].id;

        assert_eq!(resolve(&app.store, "さくら苑").unwrap(), id);
        assert_eq!(resolve(&app.store, &id.to_string()).unwrap(), id);
        assert!(matches!(resolve(&app.store, "さくら"), Err(CarefindError::ValidationFailure { .. })));
        assert!(matches!(resolve(&app.store, "もみじ"), Err(CarefindError::NotFound { .. })));
    }

    #[tokio::test]
    async fn add_rejects_duplicate_names() {
        let mut app = app();
        add(&mut app, "さくら苑").await;
        let again = Command::Add { fields: fields("サクラ苑", "x"), from_web: false };
        assert!(execute(&mut app, again, now()).await.is_ok());
        let dup = Command::Add { fields: fields("さくら苑", "x"), from_web: false };
        assert!(matches!(
            execute(&mut app, dup, now()).await,
            Err(CarefindError::DuplicateRecord { .. })
        ));
    }

    #[tokio::test]
    async fn add_from_web_prefills_medium_reliability() {
        let mut app = app();
        let mut f = fields("さくら苑", "札幌市中央区");
        f.website = Some("https://sakura.example.jp".into());
        execute(&mut app, Command::Add { fields: f, from_web: true }, now()).await.unwrap();

        let added = &app.store.facilities()[0];
        assert_eq!(added.reliability, Some(ReliabilityLevel::Medium));
        assert_eq!(added.confirmation_method, Some(ConfirmationMethod::Web));
        assert_eq!(added.last_confirmed, Some(now().date_naive()));
    }

    #[tokio::test]
    async fn edit_keeps_unset_fields() {
        let mut app = app();
        add(&mut app, "さくら苑").await;
        let edit = FacilityFields { availability: Some(Availability::Full), ..FacilityFields::default() };
        execute(&mut app, Command::Edit { facility: "さくら苑".into(), fields: edit }, now())
            .await
            .unwrap();

        let f = &app.store.facilities()[0];
        assert_eq!(f.availability, Availability::Full);
        assert_eq!(f.address, "札幌市中央区");
        assert_eq!(f.last_updated, Some(now()));
    }

    #[tokio::test]
    async fn hide_and_unhide_by_fragment() {
        let mut app = app();
        add(&mut app, "さくら苑").await;
        execute(&mut app, Command::Hide { facility: "さくら苑".into() }, now()).await.unwrap();
        assert_eq!(app.store.hidden().len(), 1);

        let unhide = Command::Unhide { fragment: Some("さくら".into()), all: false };
        execute(&mut app, unhide, now()).await.unwrap();
        assert!(app.store.hidden().is_empty());

        let missing = Command::Unhide { fragment: Some("もみじ".into()), all: false };
        assert!(execute(&mut app, missing, now()).await.is_err());
    }

    #[tokio::test]
    async fn export_then_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut source = app();
        add(&mut source, "さくら苑").await;
        add(&mut source, "もみじ荘").await;
        let export = ExportArgs { file: Some(path.clone()), view: SearchArgs::default() };
        execute(&mut source, Command::Export(export), now()).await.unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("施設名,"));

        let mut target = app();
        execute(&mut target, Command::Import { file: path.clone() }, now()).await.unwrap();
        assert_eq!(target.store.len(), 2);

        // A second import only finds duplicates.
        execute(&mut target, Command::Import { file: path }, now()).await.unwrap();
        assert_eq!(target.store.len(), 2);
    }

    #[tokio::test]
    async fn export_writes_the_filtered_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.csv");
        let mut app = app();
        add(&mut app, "さくら苑").await;
        add(&mut app, "もみじ荘").await;
        add(&mut app, "さくらの杜").await;
        let hidden = resolve(&app.store, "さくらの杜").unwrap();
        app.store.set_hidden(hidden, true).unwrap();

        let view = SearchArgs {
            name_query: Some("さくら".into()),
            sort: "name".into(),
            ..SearchArgs::default()
        };
        execute(&mut app, Command::Export(ExportArgs { file: Some(path.clone()), view }), now())
            .await
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("さくら苑"));
        assert!(!text.contains("もみじ荘"));
        assert!(!text.contains("さくらの杜"));
    }

    #[tokio::test]
    async fn profile_set_and_clear() {
        let mut app = app();
        let set = ProfileCommand::Set(crate::args::ProfileArgs {
            name: "田中".into(),
            age: Some(82),
            care_level: None,
            budget: String::new(),
            medical_needs: "胃ろう".into(),
            preferences: String::new(),
        });
        execute(&mut app, Command::Profile(set), now()).await.unwrap();
        assert_eq!(app.store.profile().unwrap().saved_at, Some(now()));

        execute(&mut app, Command::Profile(ProfileCommand::Clear), now()).await.unwrap();
        assert!(app.store.profile().is_none());
    }

    #[tokio::test]
    async fn bulk_urls_saves_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("urls.txt");
        fs::write(&list, "https://www.homes.co.jp/a\n# comment\n").unwrap();

        let mut app = app();
        execute(&mut app, Command::BulkUrls { file: list.clone(), save: false }, now())
            .await
            .unwrap();
        assert!(app.store.is_empty());

        execute(&mut app, Command::BulkUrls { file: list, save: true }, now())
            .await
            .unwrap();
        assert!(!app.store.is_empty());

        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "no urls here").unwrap();
        assert!(matches!(
            execute(&mut app, Command::BulkUrls { file: empty, save: true }, now()).await,
            Err(CarefindError::MalformedInput { .. })
        ));
    }

    #[tokio::test]
    async fn refresh_then_adopt_web() {
        let mut app = app();
        let mut f = fields("さくら苑", "札幌市中央区");
        f.website = Some("https://sakura.example.jp".into());
        execute(&mut app, Command::Add { fields: f, from_web: false }, now()).await.unwrap();

        execute(&mut app, Command::Refresh { facility: None }, now()).await.unwrap();
        assert!(app.store.facilities()[0].realtime_info.is_some());

        execute(&mut app, Command::AdoptWeb { facility: "さくら苑".into() }, now())
            .await
            .unwrap();
        assert_eq!(app.store.facilities()[0].reliability, Some(ReliabilityLevel::Medium));
    }
}
