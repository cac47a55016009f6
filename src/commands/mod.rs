//! Command implementations for the Sommelier CLI.
//!
//! This module contains the business logic for each CLI command. Commands
//! load the named collections, apply the pure state transitions from
//! [`crate::state`], persist whatever changed, and return a typed result
//! that renders as JSON or human-readable text.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analytics::{self, CellarStats, SCORE_AXIS_PAD};
use crate::config::{
    self, OutputFormat, SommelierState, resolve_config, resolve_state,
};
use crate::export;
use crate::gemini;
use crate::models::{CellarItem, Toast, WineMatch, WineReport, validate_id};
use crate::state::{
    AnalysisState, CellarMutation, ReconcileOutcome, add_to_cellar, adjust_quantity, reconcile,
    remember, remove_item,
};
use crate::storage::{CELLAR_KEY, HISTORY_KEY, Store};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.into())
}

fn open_store(data_dir: &Path) -> Result<Store> {
    Store::open(data_dir.to_path_buf())
}

/// Whether human output was requested: the -H flag wins, otherwise the
/// configured output-format preference.
pub fn human_output(data_dir: &Path, flag: bool) -> bool {
    flag || *resolve_config(data_dir).output_format() == OutputFormat::Human
}

// === Analysis ===

/// Result of a completed analysis.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub report: WineReport,
    pub toasts: Vec<Toast>,
}

impl Output for AnalyzeResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = render_report(&self.report);
        for toast in &self.toasts {
            out.push_str(&format!("\n{}", toast.text));
        }
        out
    }
}

/// Identify a wine by name and persist the report.
pub fn analyze_query(data_dir: &Path, query: &str) -> Result<AnalyzeResult> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::InvalidInput(
            "search query is empty; give a wine name like \"Barolo 2015\"".to_string(),
        ));
    }

    let config = resolve_config(data_dir);
    let key = require_api_key(data_dir)?;

    let analysis = AnalysisState::Idle.begin();
    match gemini::analyze_query(&key, config.model(), query) {
        Ok(report) => {
            let analysis = analysis.complete(report);
            finish_analysis(data_dir, analysis, config.history_limit())
        }
        Err(e) => {
            let _analysis = analysis.fail(e.to_string());
            Err(e.into())
        }
    }
}

/// Identify a wine from a label photo and persist the report.
pub fn analyze_label(data_dir: &Path, image_path: &Path) -> Result<AnalyzeResult> {
    let mime_type = mime_from_extension(image_path)?;
    let image = fs::read(image_path)?;

    let config = resolve_config(data_dir);
    let key = require_api_key(data_dir)?;

    let analysis = AnalysisState::Idle.begin();
    match gemini::analyze_label(&key, config.model(), &image, mime_type) {
        Ok(report) => {
            let analysis = analysis.complete(report);
            finish_analysis(data_dir, analysis, config.history_limit())
        }
        Err(e) => {
            let _analysis = analysis.fail(e.to_string());
            Err(e.into())
        }
    }
}

/// Persist a successful analysis: current slot + history (deduplicated,
/// bounded), and stamp the key as validated.
fn finish_analysis(
    data_dir: &Path,
    analysis: AnalysisState,
    history_limit: usize,
) -> Result<AnalyzeResult> {
    let AnalysisState::Success(report) = analysis else {
        return Err(Error::Other("analysis did not complete".to_string()));
    };

    let store = open_store(data_dir)?;
    store.save_current(&report)?;

    let history: Vec<WineReport> = store.load(HISTORY_KEY);
    let history = remember(history, report.clone(), history_limit);
    store.save(HISTORY_KEY, &history)?;

    mark_key_validated(data_dir);

    Ok(AnalyzeResult {
        toasts: vec![Toast::success(format!(
            "Saved {} ({}) to history",
            report.name, report.vintage
        ))],
        report,
    })
}

fn require_api_key(data_dir: &Path) -> Result<String> {
    resolve_state(data_dir)
        .api_key()
        .map(str::to_string)
        .ok_or(Error::Gemini(gemini::GeminiError::MissingApiKey))
}

/// Record that the stored key produced a successful response. Best-effort:
/// an env-sourced key or a failed write is not worth failing the command.
fn mark_key_validated(data_dir: &Path) {
    let state = config::load_state(data_dir);
    if state.api_key.is_some() {
        let updated = SommelierState {
            key_validated_at: Some(chrono::Utc::now()),
            ..state
        };
        let _ = config::save_state(data_dir, &updated);
    }
}

fn mime_from_extension(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        other => Err(Error::InvalidInput(format!(
            "unsupported image type '{}': use jpeg, png, or webp",
            other
        ))),
    }
}

/// Result of a match search.
#[derive(Debug, Serialize)]
pub struct MatchesResult {
    pub matches: Vec<WineMatch>,
}

impl Output for MatchesResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.matches.is_empty() {
            return "No matches found.".to_string();
        }
        let mut out = String::from("Likely matches:\n");
        for (i, m) in self.matches.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} ({}) - {}\n",
                i + 1,
                m.name,
                m.vintage,
                m.region
            ));
        }
        out.push_str("Run `som search <name> <vintage>` for a full report.");
        out
    }
}

/// List likely matches for an ambiguous query.
pub fn find_matches(data_dir: &Path, query: &str) -> Result<MatchesResult> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::InvalidInput(
            "search query is empty; give a wine name like \"Barolo\"".to_string(),
        ));
    }

    let config = resolve_config(data_dir);
    let key = require_api_key(data_dir)?;

    let matches = gemini::find_matches(&key, config.model(), query)?;
    mark_key_validated(data_dir);
    Ok(MatchesResult { matches })
}

// === Show / lookup ===

/// A single report, for display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResult {
    pub report: WineReport,
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        render_report(&self.report)
    }
}

/// Show a report by id, or the current slot when no id is given.
pub fn show(data_dir: &Path, id: Option<&str>) -> Result<ShowResult> {
    let store = open_store(data_dir)?;
    let report = match id {
        Some(id) => find_report(&store, id)?,
        None => store.load_current().ok_or_else(|| {
            Error::NotFound("no current report; run `som search <name>` first".to_string())
        })?,
    };

    store.save_current(&report)?;
    Ok(ShowResult { report })
}

/// Look a report up by id across the current slot, history, and cellar.
fn find_report(store: &Store, id: &str) -> Result<WineReport> {
    validate_id(id, "som")?;

    if let Some(current) = store.load_current() {
        if current.id == id {
            return Ok(current);
        }
    }

    let history: Vec<WineReport> = store.load(HISTORY_KEY);
    if let Some(report) = history.into_iter().find(|r| r.id == id) {
        return Ok(report);
    }

    let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);
    if let Some(item) = cellar.into_iter().find(|i| i.wine.id == id) {
        return Ok(item.wine);
    }

    Err(Error::NotFound(format!("no report with id {}", id)))
}

// === User overlay (rating / notes) ===

/// Result of an overlay edit plus its reconciliation fan-out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_notes: Option<String>,
    pub reconciled: ReconcileOutcome,
    pub toasts: Vec<Toast>,
}

impl Output for UpdateResult {
    fn to_human(&self) -> String {
        let mut out = String::new();
        for toast in &self.toasts {
            out.push_str(&toast.text);
            out.push('\n');
        }
        out.push_str(&format!(
            "Synced {} location(s): current={} history={} cellar={}",
            usize::from(self.reconciled.current) + self.reconciled.history + self.reconciled.cellar,
            self.reconciled.current,
            self.reconciled.history,
            self.reconciled.cellar,
        ));
        out
    }

    fn to_json(&self) -> String {
        json(self)
    }
}

/// Set the user star rating on a report and fan the change out.
pub fn rate(data_dir: &Path, id: &str, stars: u8) -> Result<UpdateResult> {
    if stars > 5 {
        return Err(Error::InvalidInput(format!(
            "rating must be 0-5, got {}",
            stars
        )));
    }

    let store = open_store(data_dir)?;
    let mut report = find_report(&store, id)?;
    report.user_rating = Some(stars);

    let reconciled = reconcile(&store, &report)?;
    Ok(UpdateResult {
        id: report.id.clone(),
        name: report.name.clone(),
        user_rating: Some(stars),
        user_notes: None,
        reconciled,
        toasts: vec![Toast::success(format!(
            "Rated {} {} star(s)",
            report.name, stars
        ))],
    })
}

/// Set the personal notes on a report and fan the change out.
pub fn note(data_dir: &Path, id: &str, text: &str) -> Result<UpdateResult> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::InvalidInput("note text is empty".to_string()));
    }

    let store = open_store(data_dir)?;
    let mut report = find_report(&store, id)?;
    report.user_notes = Some(text.to_string());

    let reconciled = reconcile(&store, &report)?;
    Ok(UpdateResult {
        id: report.id.clone(),
        name: report.name.clone(),
        user_rating: None,
        user_notes: Some(text.to_string()),
        reconciled,
        toasts: vec![Toast::success(format!("Noted on {}", report.name))],
    })
}

// === History ===

/// One history row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
    pub vintage: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

/// The recent-search history.
#[derive(Debug, Serialize)]
pub struct HistoryListResult {
    pub entries: Vec<HistoryEntry>,
}

impl Output for HistoryListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No recent searches.".to_string();
        }
        let mut out = String::from("Recent searches:\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "  {}  {} - {} ({})  [{}]\n",
                entry.id,
                entry.name,
                entry.region,
                entry.vintage,
                entry.score.as_deref().unwrap_or("-"),
            ));
        }
        out
    }
}

/// List recent searches, most recent first.
pub fn history_list(data_dir: &Path) -> Result<HistoryListResult> {
    let store = open_store(data_dir)?;
    let history: Vec<WineReport> = store.load(HISTORY_KEY);

    let entries = history
        .iter()
        .map(|r| HistoryEntry {
            id: r.id.clone(),
            name: r.name.clone(),
            vintage: r.vintage.clone(),
            region: r.region.clone(),
            score: r.headline_score().map(str::to_string),
        })
        .collect();

    Ok(HistoryListResult { entries })
}

/// Result of clearing a collection.
#[derive(Debug, Serialize)]
pub struct ClearedResult {
    pub cleared: usize,
}

impl Output for ClearedResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Cleared {} entr{}.", self.cleared, plural_y(self.cleared))
    }
}

/// Clear the history.
pub fn history_clear(data_dir: &Path) -> Result<ClearedResult> {
    let store = open_store(data_dir)?;
    let history: Vec<WineReport> = store.load(HISTORY_KEY);
    let cleared = history.len();
    store.save::<WineReport>(HISTORY_KEY, &[])?;
    Ok(ClearedResult { cleared })
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 { "y" } else { "ies" }
}

// === Cellar ===

/// Result of adding bottles to the cellar.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarAddResult {
    pub mutation: CellarMutation,
    pub quantity: u32,
    pub toasts: Vec<Toast>,
}

impl Output for CellarAddResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.toasts
            .iter()
            .map(|t| t.text.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Add bottles of a wine (by report id, default current) to the cellar.
pub fn cellar_add(
    data_dir: &Path,
    id: Option<&str>,
    quantity: u32,
    price: Option<f64>,
) -> Result<CellarAddResult> {
    if quantity == 0 {
        return Err(Error::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }

    let store = open_store(data_dir)?;
    let wine = match id {
        Some(id) => find_report(&store, id)?,
        None => store.load_current().ok_or_else(|| {
            Error::NotFound("no current report; run `som search <name>` first".to_string())
        })?,
    };
    let wine_name = wine.name.clone();

    let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);
    let (cellar, mutation) = add_to_cellar(cellar, wine, quantity, price);
    store.save(CELLAR_KEY, &cellar)?;

    let quantity_now = cellar
        .iter()
        .find(|i| i.id == mutation.item_id())
        .map(|i| i.quantity)
        .unwrap_or(quantity);

    Ok(CellarAddResult {
        toasts: vec![Toast::success(format!(
            "Added {} bottle(s) of {} to your cellar",
            quantity, wine_name
        ))],
        mutation,
        quantity: quantity_now,
    })
}

/// One cellar row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarEntry {
    pub item_id: String,
    pub wine_id: String,
    pub name: String,
    pub vintage: String,
    pub region: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_years: Option<String>,
}

/// The cellar inventory.
#[derive(Debug, Serialize)]
pub struct CellarListResult {
    pub items: Vec<CellarEntry>,
}

impl Output for CellarListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.items.is_empty() {
            return "Your cellar is empty. Analyze a wine and run `som cellar add`.".to_string();
        }
        let mut out = String::from("Your collection:\n");
        for item in &self.items {
            let paid = item
                .purchase_price
                .map(|p| format!("${}", p))
                .unwrap_or_else(|| "-".to_string());
            let peak = item.peak_years.as_deref().unwrap_or("-");
            out.push_str(&format!(
                "  {}  {}x {} ({}) - {}  paid: {}  peak: {}\n",
                item.item_id, item.quantity, item.name, item.vintage, item.region, paid, peak,
            ));
        }
        out
    }
}

/// List cellar items.
pub fn cellar_list(data_dir: &Path) -> Result<CellarListResult> {
    let store = open_store(data_dir)?;
    let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);

    let items = cellar
        .iter()
        .map(|item| CellarEntry {
            item_id: item.id.clone(),
            wine_id: item.wine.id.clone(),
            name: item.wine.name.clone(),
            vintage: item.wine.vintage.clone(),
            region: item.wine.region.clone(),
            quantity: item.quantity,
            purchase_price: item.purchase_price,
            peak_years: item
                .wine
                .aging
                .as_ref()
                .map(|a| a.peak_years.clone())
                .filter(|p| !p.is_empty()),
        })
        .collect();

    Ok(CellarListResult { items })
}

/// Result of a quantity change or removal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarQuantityResult {
    pub item_id: String,
    pub quantity: u32,
    pub removed: bool,
    pub toasts: Vec<Toast>,
}

impl Output for CellarQuantityResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.toasts
            .iter()
            .map(|t| t.text.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Adjust an item's bottle count by +1/-1. Items pruned at zero.
pub fn cellar_adjust(data_dir: &Path, item_id: &str, delta: i64) -> Result<CellarQuantityResult> {
    validate_id(item_id, "somc")?;

    let store = open_store(data_dir)?;
    let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);
    let (cellar, quantity) = adjust_quantity(cellar, item_id, delta);

    let Some(quantity) = quantity else {
        return Err(Error::NotFound(format!("no cellar item {}", item_id)));
    };
    store.save(CELLAR_KEY, &cellar)?;

    let removed = quantity == 0;
    let toast = if removed {
        Toast::info("Last bottle gone - item removed from the cellar")
    } else {
        Toast::success(format!("Now {} bottle(s)", quantity))
    };

    Ok(CellarQuantityResult {
        item_id: item_id.to_string(),
        quantity,
        removed,
        toasts: vec![toast],
    })
}

/// Remove a cellar item outright.
pub fn cellar_remove(data_dir: &Path, item_id: &str) -> Result<CellarQuantityResult> {
    validate_id(item_id, "somc")?;

    let store = open_store(data_dir)?;
    let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);
    let (cellar, removed) = remove_item(cellar, item_id);

    if !removed {
        return Err(Error::NotFound(format!("no cellar item {}", item_id)));
    }
    store.save(CELLAR_KEY, &cellar)?;

    Ok(CellarQuantityResult {
        item_id: item_id.to_string(),
        quantity: 0,
        removed: true,
        toasts: vec![Toast::info("Removed from the cellar")],
    })
}

/// Cellar analytics.
#[derive(Debug, Serialize)]
pub struct CellarStatsResult {
    pub stats: CellarStats,
}

impl Output for CellarStatsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let stats = &self.stats;
        let mut out = String::from("Cellar analytics\n");
        out.push_str(&format!("  Total value:    ${:.0}\n", stats.total_value));
        out.push_str(&format!("  Inventory:      {} bottle(s)\n", stats.total_bottles));
        out.push_str(&format!("  Ready to drink: {} bottle(s)\n", stats.ready_to_drink));

        if !stats.top_regions.is_empty() {
            out.push_str("  Top regions:\n");
            for region in &stats.top_regions {
                out.push_str(&format!(
                    "    {} ({} bottle(s))\n",
                    region.label, region.bottles
                ));
            }
        }
        if !stats.diversity.is_empty() {
            out.push_str("  Styles:\n");
            for style in &stats.diversity {
                out.push_str(&format!("    {} ({} bottle(s))\n", style.label, style.bottles));
            }
        }
        out
    }
}

/// Compute cellar analytics for the current calendar year.
pub fn cellar_stats(data_dir: &Path, top: usize) -> Result<CellarStatsResult> {
    use chrono::Datelike;

    let store = open_store(data_dir)?;
    let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);
    let current_year = chrono::Utc::now().year();

    Ok(CellarStatsResult {
        stats: CellarStats::compute(&cellar, current_year, top),
    })
}

// === Export / share ===

/// Result of an export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Output for ExportResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match (&self.written, &self.html) {
            (Some(path), _) => format!("Report written to {}", path.display()),
            (None, Some(html)) => html.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Write (or print) the HTML snapshot of one report.
pub fn export(data_dir: &Path, id: Option<&str>, output: Option<&Path>) -> Result<ExportResult> {
    let store = open_store(data_dir)?;
    let report = match id {
        Some(id) => find_report(&store, id)?,
        None => store.load_current().ok_or_else(|| {
            Error::NotFound("no current report; run `som search <name>` first".to_string())
        })?,
    };

    let html = export::report_html(&report);
    match output {
        Some(path) => {
            fs::write(path, &html)?;
            Ok(ExportResult {
                id: report.id,
                written: Some(path.to_path_buf()),
                html: None,
            })
        }
        None => Ok(ExportResult {
            id: report.id,
            written: None,
            html: Some(html),
        }),
    }
}

/// The share text for one report.
#[derive(Debug, Serialize)]
pub struct ShareResult {
    pub id: String,
    pub text: String,
}

impl Output for ShareResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.text.clone()
    }
}

/// Build the plain-text summary of one report.
pub fn share(data_dir: &Path, id: Option<&str>) -> Result<ShareResult> {
    let store = open_store(data_dir)?;
    let report = match id {
        Some(id) => find_report(&store, id)?,
        None => store.load_current().ok_or_else(|| {
            Error::NotFound("no current report; run `som search <name>` first".to_string())
        })?,
    };

    Ok(ShareResult {
        id: report.id.clone(),
        text: export::share_summary(&report),
    })
}

// === Config ===

/// One resolved setting.
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

/// The resolved configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigListResult {
    pub entries: Vec<ConfigEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Output for ConfigListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!(
                "{} = {}  ({})\n",
                entry.key, entry.value, entry.source
            ));
        }
        match &self.api_key {
            Some(masked) => out.push_str(&format!("api-key = {}\n", masked)),
            None => out.push_str("api-key = <not set>\n"),
        }
        out
    }
}

/// List resolved settings and where each came from.
pub fn config_list(data_dir: &Path) -> Result<ConfigListResult> {
    let config = resolve_config(data_dir);
    let state = resolve_state(data_dir);

    Ok(ConfigListResult {
        entries: vec![
            ConfigEntry {
                key: "output-format".to_string(),
                value: config.output_format().to_string(),
                source: config.output_format.source.to_string(),
            },
            ConfigEntry {
                key: "model".to_string(),
                value: config.model().to_string(),
                source: config.model.source.to_string(),
            },
            ConfigEntry {
                key: "history-limit".to_string(),
                value: config.history_limit().to_string(),
                source: config.history_limit.source.to_string(),
            },
        ],
        api_key: state.masked_key(),
    })
}

/// One setting's value.
#[derive(Debug, Serialize)]
pub struct ConfigValueResult {
    pub key: String,
    pub value: String,
}

impl Output for ConfigValueResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.value.clone()
    }
}

/// Get one setting.
pub fn config_get(data_dir: &Path, key: &str) -> Result<ConfigValueResult> {
    let config = resolve_config(data_dir);
    let value = match key {
        "output-format" => config.output_format().to_string(),
        "model" => config.model().to_string(),
        "history-limit" => config.history_limit().to_string(),
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown setting '{}': expected output-format, model, or history-limit",
                other
            )));
        }
    };
    Ok(ConfigValueResult {
        key: key.to_string(),
        value,
    })
}

/// Set one setting in the session config.
pub fn config_set(data_dir: &Path, key: &str, value: &str) -> Result<ConfigValueResult> {
    let mut config = config::load_session_config(data_dir);

    match key {
        "output-format" => {
            config.output_format = Some(OutputFormat::parse(value).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "invalid output-format '{}': expected json or human",
                    value
                ))
            })?);
        }
        "model" => {
            if value.is_empty() {
                return Err(Error::InvalidInput("model must not be empty".to_string()));
            }
            config.model = Some(value.to_string());
        }
        "history-limit" => {
            let limit: usize = value.parse().map_err(|_| {
                Error::InvalidInput(format!("invalid history-limit '{}'", value))
            })?;
            config.history_limit = Some(limit);
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown setting '{}': expected output-format, model, or history-limit",
                other
            )));
        }
    }

    config
        .validate()
        .map_err(Error::InvalidInput)?;
    config::save_session_config(data_dir, &config)?;

    Ok(ConfigValueResult {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Result of storing the API key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetKeyResult {
    pub api_key: String,
}

impl Output for SetKeyResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Stored API key {} (owner-only file)", self.api_key)
    }
}

/// Store the API key in state.kdl with owner-only permissions.
pub fn config_set_key(data_dir: &Path, key: &str) -> Result<SetKeyResult> {
    if key.trim().is_empty() {
        return Err(Error::InvalidInput("API key must not be empty".to_string()));
    }

    let state = SommelierState {
        api_key: Some(key.trim().to_string()),
        ..config::load_state(data_dir)
    };
    config::save_state(data_dir, &state)?;

    Ok(SetKeyResult {
        api_key: state.masked_key().unwrap_or_default(),
    })
}

/// Config and state file locations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPathResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_config: Option<PathBuf>,
    pub session_config: PathBuf,
    pub state: PathBuf,
}

impl Output for ConfigPathResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        if let Some(system) = &self.system_config {
            out.push_str(&format!("system config:  {}\n", system.display()));
        }
        out.push_str(&format!("session config: {}\n", self.session_config.display()));
        out.push_str(&format!("state:          {}\n", self.state.display()));
        out
    }
}

/// Print config and state file paths.
pub fn config_path(data_dir: &Path) -> Result<ConfigPathResult> {
    Ok(ConfigPathResult {
        system_config: config::system_config_path(),
        session_config: config::session_config_path(data_dir),
        state: config::state_path(data_dir),
    })
}

// === System ===

/// System status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub data_dir: PathBuf,
    pub history_entries: usize,
    pub cellar_items: usize,
    pub cellar_bottles: u32,
    pub has_current: bool,
    pub version: String,
    pub build_timestamp: String,
    pub git_commit: String,
}

impl Output for StatusResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "sommelier {} ({} @ {})\n  data dir: {}\n  history:  {} entr{}\n  cellar:   {} item(s), {} bottle(s)\n  current:  {}",
            self.version,
            self.git_commit,
            self.build_timestamp,
            self.data_dir.display(),
            self.history_entries,
            plural_y(self.history_entries),
            self.cellar_items,
            self.cellar_bottles,
            if self.has_current { "set" } else { "<none>" },
        )
    }
}

/// Show data directory, collection counts, and build info.
pub fn system_status(data_dir: &Path) -> Result<StatusResult> {
    let store = open_store(data_dir)?;
    let history: Vec<WineReport> = store.load(HISTORY_KEY);
    let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);

    Ok(StatusResult {
        data_dir: data_dir.to_path_buf(),
        history_entries: history.len(),
        cellar_items: cellar.len(),
        cellar_bottles: cellar.iter().map(|i| i.quantity).sum(),
        has_current: store.load_current().is_some(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_timestamp: env!("SOM_BUILD_TIMESTAMP").to_string(),
        git_commit: env!("SOM_GIT_COMMIT").to_string(),
    })
}

// === Report rendering ===

/// Render the full human-readable report, including the blend donut data
/// and the vintage trend bars.
fn render_report(report: &WineReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} ({})\n", report.name, report.vintage));
    out.push_str(&format!("  [{}]\n", report.id));

    let mut origin = report.region.clone();
    if let Some(sub) = &report.sub_region {
        origin.push_str(&format!(" / {}", sub));
    }
    if !report.country.is_empty() {
        origin.push_str(&format!(", {}", report.country));
    }
    if !origin.is_empty() {
        out.push_str(&format!("  {}\n", origin));
    }

    if !report.wine_type.is_empty() || !report.abv.is_empty() {
        out.push_str(&format!("  {} | {} | {}\n", report.wine_type, report.abv, report.size));
    }

    if !report.critic_scores.is_empty() {
        out.push_str("\nCritic scores\n");
        for score in &report.critic_scores {
            out.push_str(&format!("  {:<20} {}\n", score.critic, score.score));
        }
    }

    if !report.nose.is_empty() || !report.taste.is_empty() {
        out.push_str("\nSensory\n");
        if !report.color.is_empty() {
            out.push_str(&format!("  Color: {}\n", report.color));
        }
        if !report.nose.is_empty() {
            out.push_str(&format!("  Nose:  {}\n", report.nose));
        }
        if !report.taste.is_empty() {
            out.push_str(&format!("  Taste: {}\n", report.taste));
        }
    }

    if let Some(profile) = &report.style_profile {
        out.push_str(&format!(
            "  Style: {} body, {} acidity, {} tannins\n",
            profile.body, profile.acidity, profile.tannins
        ));
    }

    if let Some(shares) = &report.grape_composition {
        let slices = analytics::donut_slices(shares);
        if !slices.is_empty() {
            out.push_str("\nBlend\n");
            for slice in &slices {
                out.push_str(&format!(
                    "  {:<20} {:>5.1}%\n",
                    slice.label,
                    slice.fraction * 100.0
                ));
            }
        }
    }

    if !report.vintage_comparison.is_empty() {
        if let Some(axis) = analytics::score_axis(&report.vintage_comparison, SCORE_AXIS_PAD) {
            out.push_str("\nVintage trend\n");
            for score in &report.vintage_comparison {
                let width = (analytics::bar_height(score.score, axis) * 24.0).round() as usize;
                let marker = if score.year == report.vintage { "*" } else { " " };
                out.push_str(&format!(
                    " {}{}  {:<24} {}\n",
                    marker,
                    score.year,
                    "#".repeat(width.max(1)),
                    score.score
                ));
            }
        }
    }

    if !report.market_price.is_empty() {
        out.push_str(&format!("\nMarket price: {}\n", report.market_price));
    }

    if let Some(aging) = &report.aging {
        out.push_str("Aging\n");
        if !aging.drink_from.is_empty() || !aging.drink_until.is_empty() {
            out.push_str(&format!(
                "  Window: {} - {}\n",
                aging.drink_from, aging.drink_until
            ));
        }
        if !aging.peak_years.is_empty() {
            out.push_str(&format!("  Peak:   {}\n", aging.peak_years));
        }
        if !aging.investment_potential.is_empty() {
            out.push_str(&format!("  Investment: {}\n", aging.investment_potential));
        }
    }

    if let Some(pairing) = &report.pairing {
        if !pairing.foods.is_empty() {
            out.push_str(&format!("\nPair with: {}\n", pairing.foods.join(", ")));
        }
        if !pairing.temperature.is_empty() || !pairing.glassware.is_empty() {
            out.push_str(&format!(
                "  Serve at {} in a {}; decant {}\n",
                pairing.temperature, pairing.glassware, pairing.decanting
            ));
        }
    }

    if let Some(education) = &report.education {
        if !education.vibe.is_empty() {
            out.push_str(&format!("\n{}\n", education.vibe));
        }
        if !education.pronunciation.phonetic.is_empty() {
            out.push_str(&format!(
                "  Say it: {}\n",
                education.pronunciation.phonetic
            ));
        }
    }

    if let Some(rating) = report.user_rating {
        out.push_str(&format!("\nMy rating: {}/5\n", rating));
    }
    if let Some(notes) = &report.user_notes {
        out.push_str(&format!("My notes: {}\n", notes));
    }

    if !report.sources.is_empty() {
        out.push_str(&format!("\nSources: {}\n", report.sources.join(", ")));
    }

    out
}
