use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use egui::{vec2, Key, Modifiers, Rect};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use zmage_select::app::{ClickOutcome, EngineConfig, JsonFileStorage, SelectionSession, SettingsStorage};
use zmage_select::domain::grid_layout::GridLayout;
use zmage_select::input::KeyEvent;
use zmage_select::io::{load_range, CollectionFixture, VirtualCollection};
use zmage_select::notify::NotificationCenter;
use zmage_select::state::PointerPress;
use zmage_select::{
    BatchAction, BatchDispatcher, BatchReport, CollectionSource, ItemOutcome, ViewQuery,
};

/// Gesture script replayer
#[derive(Parser, Debug)]
#[command(name = "zmage-replay")]
#[command(about = "Replays a gesture script against an in-memory asset collection", long_about = None)]
struct Args {
    /// Gesture script (JSON)
    script: PathBuf,

    /// Collection fixture produced by zmage-collectiongen
    #[arg(short, long)]
    collection: Option<PathBuf>,

    /// Number of assets when no fixture is given
    #[arg(short = 'n', long, default_value = "200")]
    count: usize,

    /// Seed when no fixture is given
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Read engine settings from the user config directory
    #[arg(long)]
    use_settings: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum HeldModifier {
    #[default]
    None,
    Shift,
    Ctrl,
}

impl HeldModifier {
    fn modifiers(self) -> Modifiers {
        match self {
            Self::None => Modifiers::NONE,
            Self::Shift => Modifiers::SHIFT,
            Self::Ctrl => Modifiers::COMMAND,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScriptKey {
    SelectAll,
    Escape,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum Step {
    Click {
        position: usize,
        #[serde(default)]
        modifier: HeldModifier,
    },
    Drag {
        from: usize,
        to: usize,
    },
    LongPress {
        position: usize,
        #[serde(default = "default_hold_ms")]
        hold_ms: u64,
    },
    Key {
        key: ScriptKey,
        #[serde(default)]
        text_entry: bool,
    },
    Batch {
        action: BatchAction,
        #[serde(default)]
        confirm: bool,
    },
    Navigate {
        query: ViewQuery,
    },
    LoadMore,
    DetailNext,
    DetailPrev,
}

fn default_hold_ms() -> u64 {
    700
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    layout: Option<GridLayout>,
    #[serde(default)]
    config: Option<EngineConfig>,
    steps: Vec<Step>,
}

#[derive(Debug, Serialize)]
struct StepLog {
    step: usize,
    outcome: String,
}

#[derive(Debug, Serialize)]
struct FinalState {
    view: ViewQuery,
    loaded: usize,
    total: usize,
    selected: Vec<u64>,
    anchor_position: Option<usize>,
    batch_mode: bool,
    detail: Option<u64>,
    log: Vec<StepLog>,
    reports: Vec<BatchReport>,
    notifications: Vec<String>,
}

struct Replay {
    session: SelectionSession,
    collection: Arc<VirtualCollection>,
    dispatcher: BatchDispatcher<VirtualCollection>,
    notifications: Arc<NotificationCenter>,
    layout: GridLayout,
    container: Rect,
    reports: Vec<BatchReport>,
    next_contact: u64,
}

impl Replay {
    fn item_rects(&self) -> Vec<(usize, Rect)> {
        self.layout
            .visible_rects(self.session.index().len(), self.container, 0.0)
    }

    /// Re-queries every loaded page (just the first after navigation).
    async fn reload_loaded_pages(&mut self) -> Result<()> {
        let page = load_range(
            &*self.collection,
            self.session.view(),
            self.session.loaded_pages(),
            self.session.config().page_size,
        )
        .await?;
        self.session.apply_reload(page);
        Ok(())
    }

    async fn run_step(&mut self, step: Step) -> Result<String> {
        let outcome = match step {
            Step::Click { position, modifier } => {
                let point = self.layout.item_center(position, 0.0);
                let rects = self.item_rects();
                self.session.pointer_down(PointerPress::primary(point));
                let outcome = self.session.pointer_up(point, &rects, modifier.modifiers());
                describe_click(outcome)
            }
            Step::Drag { from, to } => {
                let start = self.layout.item_center(from, 0.0);
                let mut end = self.layout.item_center(to, 0.0);
                if from == to {
                    end += vec2(self.session.config().drag_threshold_px + 1.0, 0.0);
                }
                let rects = self.item_rects();
                self.session.pointer_down(PointerPress::primary(start));
                let count = self.session.pointer_move(end, &rects).unwrap_or(0);
                self.session.pointer_up(end, &rects, Modifiers::NONE);
                format!("drag selected {count} items")
            }
            Step::LongPress { position, hold_ms } => {
                let contact = self.next_contact;
                self.next_contact += 1;
                let t0 = Instant::now();
                self.session.touch_start(contact, position, t0);
                let response = self
                    .session
                    .touch_end(contact, t0 + Duration::from_millis(hold_ms));
                if response.haptic {
                    "long press activated".to_string()
                } else {
                    "long press cancelled".to_string()
                }
            }
            Step::Key { key, text_entry } => {
                let mut event = match key {
                    ScriptKey::SelectAll => KeyEvent::new(Key::A, Modifiers::COMMAND),
                    ScriptKey::Escape => KeyEvent::new(Key::Escape, Modifiers::NONE),
                };
                if text_entry {
                    event = event.in_text_entry();
                }
                format!("{:?}", self.session.handle_key(&event))
            }
            Step::Batch { action, confirm } => {
                let outcome = match self.session.prepare_batch(action) {
                    Ok(mut request) => {
                        if confirm {
                            request = request.confirm();
                        }
                        self.session.mark_in_flight(request.kind());
                        let result = self.dispatcher.execute(request).await;
                        self.session.finish_batch(result)
                    }
                    Err(e) => self.session.finish_batch(Err(e)),
                };
                if self.session.take_refresh_request() {
                    self.reload_loaded_pages().await?;
                }
                match outcome {
                    Some(report) => {
                        let summary = format!("{} {}", report.kind, report.summary());
                        self.reports.push(report);
                        summary
                    }
                    None => "batch rejected".to_string(),
                }
            }
            Step::Navigate { query } => {
                if self.session.navigate_to(query) {
                    self.reload_loaded_pages().await?;
                    format!("navigated, {} items", self.session.index().len())
                } else {
                    "already there".to_string()
                }
            }
            Step::LoadMore => {
                if !self.session.has_more() {
                    "no more pages".to_string()
                } else {
                    let page = self
                        .collection
                        .load_page(
                            self.session.view(),
                            self.session.next_page(),
                            self.session.config().page_size,
                        )
                        .await?;
                    self.session.apply_page(page);
                    format!("{} items loaded", self.session.index().len())
                }
            }
            Step::DetailNext => format!("{:?}", self.session.detail_step(true)),
            Step::DetailPrev => format!("{:?}", self.session.detail_step(false)),
        };
        Ok(outcome)
    }

    fn final_state(self, log: Vec<StepLog>) -> FinalState {
        let store = self.session.store();
        FinalState {
            view: self.session.view().clone(),
            loaded: self.session.index().len(),
            total: self.session.total(),
            selected: store.snapshot(),
            anchor_position: store.anchor_position(),
            batch_mode: store.batch_mode(),
            detail: self.session.detail(),
            log,
            reports: self.reports,
            notifications: self.notifications.messages(),
        }
    }
}

fn describe_click(outcome: ClickOutcome) -> String {
    match outcome {
        ClickOutcome::Ignored => "ignored".to_string(),
        ClickOutcome::Opened(id) => format!("opened {id}"),
        ClickOutcome::Toggled { id, selected: true } => format!("selected {id}"),
        ClickOutcome::Toggled { id, selected: false } => format!("deselected {id}"),
        ClickOutcome::RangeSelected { count } => format!("range of {count} items"),
        ClickOutcome::DragEnded => "drag ended".to_string(),
    }
}

fn load_config(script: &Script, use_settings: bool) -> EngineConfig {
    if let Some(config) = &script.config {
        return config.clone();
    }
    if use_settings {
        if let Some(storage) = JsonFileStorage::open_default() {
            let storage: &dyn SettingsStorage = &storage;
            return EngineConfig::load(Some(storage));
        }
    }
    EngineConfig::default()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let text = fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&text).context("parsing gesture script")?;

    let collection = match &args.collection {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let fixture: CollectionFixture =
                serde_json::from_str(&text).context("parsing collection fixture")?;
            VirtualCollection::from_fixture(fixture)
        }
        None => VirtualCollection::generate(args.count, args.seed),
    };
    let collection = Arc::new(collection);

    let config = load_config(&script, args.use_settings);
    let layout = script.layout.unwrap_or_default();
    let columns = layout.columns.max(1) as f32;
    let container = Rect::from_min_size(
        layout.origin,
        vec2(columns * (layout.cell.x + layout.gap), 8.0 * (layout.cell.y + layout.gap)),
    );
    let notifications = Arc::new(NotificationCenter::new(config.notification_ttl()));
    let session = SelectionSession::new(config, notifications.clone(), container);

    let mut replay = Replay {
        session,
        dispatcher: BatchDispatcher::new(Arc::clone(&collection)),
        collection,
        notifications,
        layout,
        container,
        reports: Vec::new(),
        next_contact: 1,
    };
    replay.reload_loaded_pages().await?;

    let mut log = Vec::new();
    for (i, step) in script.steps.into_iter().enumerate() {
        let outcome = replay.run_step(step).await?;
        tracing::debug!(step = i, %outcome, "replayed step");
        log.push(StepLog { step: i, outcome });
    }

    // Item statuses are reported per id; surface failures on stderr as well
    for report in &replay.reports {
        for (id, outcome) in &report.outcomes {
            if let ItemOutcome::Failed { reason } = outcome {
                tracing::warn!(id, reason = %reason, action = %report.kind, "item failed");
            }
        }
    }

    let state = replay.final_state(log);
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
