use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::Value;

use madness_terminal::bracket::Bracket;
use madness_terminal::config::{METRIC_REGISTRY, RANDOMNESS_ID, SimConfig};
use madness_terminal::data_files::{bracket_from_datasets, build_metrics, load_dataset_dir};
use madness_terminal::export::{
    REGION_ROUND_LABELS, default_export_path, export_bracket_json, export_bracket_xlsx,
};
use madness_terminal::persist::{self, CacheFile};
use madness_terminal::simulate::{Round, SimulationResult, TeamSlot, simulate_tournament};

const FINAL_FOUR_TAB: &str = "Final Four";
const SAVE_DEBOUNCE: Duration = Duration::from_millis(800);

struct App {
    datasets: HashMap<String, Value>,
    bracket: Option<Bracket>,
    config: SimConfig,
    result: Option<SimulationResult>,
    tabs: Vec<String>,
    active_tab: usize,
    slider_ids: Vec<&'static str>,
    selected_slider: usize,
    log: VecDeque<String>,
    saved_at: Option<String>,
    dirty_since: Option<Instant>,
    should_quit: bool,
}

impl App {
    fn new(data_dir: PathBuf) -> Self {
        let load = load_dataset_dir(&data_dir);
        let bracket = bracket_from_datasets(&load.datasets).ok();

        let mut tabs: Vec<String> = match &bracket {
            Some(bracket) => bracket.regions.iter().map(|r| r.name.clone()).collect(),
            None => ["South", "East", "West", "Midwest"]
                .map(str::to_string)
                .to_vec(),
        };
        tabs.push(FINAL_FOUR_TAB.to_string());

        let cached = persist::load();
        let config = cached
            .as_ref()
            .map(|cache| cache.config.clone())
            .unwrap_or_default();
        let result = cached.as_ref().and_then(|cache| cache.bracket.clone());
        let active_tab = cached
            .as_ref()
            .and_then(|cache| cache.last_tab.as_ref())
            .and_then(|tab| tabs.iter().position(|t| t == tab))
            .unwrap_or(0);

        let slider_ids: Vec<&'static str> = METRIC_REGISTRY
            .iter()
            .map(|spec| spec.id)
            .chain(std::iter::once(RANDOMNESS_ID))
            .collect();

        let mut app = Self {
            datasets: load.datasets,
            bracket,
            config,
            result,
            tabs,
            active_tab,
            slider_ids,
            selected_slider: 0,
            log: VecDeque::new(),
            saved_at: None,
            dirty_since: None,
            should_quit: false,
        };
        for error in load.errors {
            app.push_log(format!("[WARN] {error}"));
        }
        if app.bracket.is_none() {
            app.push_log("[WARN] No bracket dataset loaded; generation disabled".to_string());
        } else if app.result.is_some() {
            app.push_log("[INFO] Restored previous bracket".to_string());
        }
        app
    }

    fn push_log(&mut self, line: String) {
        self.log.push_back(line);
        while self.log.len() > 50 {
            self.log.pop_front();
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => {
                self.active_tab = (self.active_tab + 1) % self.tabs.len();
                self.schedule_save();
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.active_tab = (self.active_tab + self.tabs.len() - 1) % self.tabs.len();
                self.schedule_save();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_slider =
                    (self.selected_slider + self.slider_ids.len() - 1) % self.slider_ids.len();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_slider = (self.selected_slider + 1) % self.slider_ids.len();
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') => self.adjust_weight(5),
            KeyCode::Char('-') | KeyCode::Char('h') => self.adjust_weight(-5),
            KeyCode::Char('t') | KeyCode::Char(' ') => {
                let id = self.slider_ids[self.selected_slider];
                self.config.toggle(id);
                self.schedule_save();
            }
            KeyCode::Char('g') | KeyCode::Enter => self.generate(),
            KeyCode::Char('e') => self.export(ExportKind::Xlsx),
            KeyCode::Char('E') => self.export(ExportKind::Json),
            _ => {}
        }
    }

    fn adjust_weight(&mut self, delta: i32) {
        let id = self.slider_ids[self.selected_slider];
        let current = if id == RANDOMNESS_ID {
            self.config.weights.randomness
        } else {
            self.config.weights.metric_weight(id)
        };
        let next = (current as i32 + delta).clamp(0, 100) as u32;
        if id == RANDOMNESS_ID {
            self.config.weights.randomness = next;
        } else {
            self.config.weights.set_metric_weight(id, next);
        }
        self.schedule_save();
    }

    fn generate(&mut self) {
        let Some(bracket) = self.bracket.clone() else {
            self.push_log("[WARN] Cannot generate without a bracket dataset".to_string());
            return;
        };
        let metrics = build_metrics(&self.config, &self.datasets, &bracket);
        let weights = self.config.run_weights();
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let result = simulate_tournament(&bracket, &metrics, &weights, &mut rng);
        match result.champion.as_deref() {
            Some(champion) => self.push_log(format!("[INFO] Champion: {champion}")),
            None => self.push_log("[WARN] Simulation produced no champion".to_string()),
        }
        self.result = Some(result);
        self.save_now();
    }

    fn export(&mut self, kind: ExportKind) {
        let Some(result) = &self.result else {
            self.push_log("[INFO] Nothing to export; generate a bracket first".to_string());
            return;
        };
        let outcome = match kind {
            ExportKind::Xlsx => {
                let path = default_export_path("xlsx");
                export_bracket_xlsx(&path, result).map(|_| path)
            }
            ExportKind::Json => {
                let path = default_export_path("json");
                export_bracket_json(&path, result).map(|_| path)
            }
        };
        match outcome {
            Ok(path) => self.push_log(format!("[INFO] Exported {}", path.display())),
            Err(err) => self.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }

    fn schedule_save(&mut self) {
        self.dirty_since = Some(Instant::now());
    }

    fn maybe_save(&mut self) {
        if self
            .dirty_since
            .is_some_and(|since| since.elapsed() >= SAVE_DEBOUNCE)
        {
            self.save_now();
        }
    }

    fn save_now(&mut self) {
        self.dirty_since = None;
        let cache = CacheFile::new(
            self.config.clone(),
            self.tabs.get(self.active_tab).cloned(),
            self.result.clone(),
        );
        match persist::save(&cache) {
            Ok(()) => {
                self.saved_at = Some(format!("Saved {}", Local::now().format("%H:%M")));
            }
            Err(err) => self.push_log(format!("[WARN] Save failed: {err:#}")),
        }
    }
}

#[derive(Clone, Copy)]
enum ExportKind {
    Xlsx,
    Json,
}

fn main() -> io::Result<()> {
    let data_dir = std::env::var("MADNESS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(data_dir);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.maybe_save();
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            app.save_now();
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(1)])
        .split(chunks[1]);

    render_sliders(frame, body[0], app);
    render_tab(frame, body[1], app);

    let footer = Paragraph::new(footer_text(app)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);
}

fn header_text(app: &App) -> String {
    let champion = app
        .result
        .as_ref()
        .and_then(|result| result.champion.as_deref())
        .map(|name| format!("Champion: {name}"))
        .unwrap_or_else(|| "No bracket generated".to_string());
    let last_log = app.log.back().map(String::as_str).unwrap_or("");
    format!("MADNESS TERMINAL | {champion}\n{last_log}")
}

fn footer_text(app: &App) -> String {
    let saved = app
        .saved_at
        .as_deref()
        .map(|s| format!(" | {s}"))
        .unwrap_or_default();
    format!(
        "Tab/←/→ Region | j/k Slider | +/- Weight | t Toggle | g Generate | e/E Export | q Quit{saved}"
    )
}

fn render_sliders(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::with_capacity(app.slider_ids.len() + 1);
    lines.push(Line::from(Span::styled(
        "Metric weights",
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for (idx, id) in app.slider_ids.iter().enumerate() {
        let label = METRIC_REGISTRY
            .iter()
            .find(|spec| spec.id == *id)
            .map(|spec| spec.label)
            .unwrap_or("Randomness");
        let weight = if *id == RANDOMNESS_ID {
            app.config.weights.randomness
        } else {
            app.config.weights.metric_weight(id)
        };
        let toggle = if app.config.is_enabled(id) { "[x]" } else { "[ ]" };
        let text = format!("{toggle} {label:<24} {weight:>3}");
        let style = if idx == app.selected_slider {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if app.config.is_enabled(id) {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let panel =
        Paragraph::new(lines).block(Block::default().borders(Borders::RIGHT).title("Config"));
    frame.render_widget(panel, area);
}

fn render_tab(frame: &mut Frame, area: Rect, app: &App) {
    let tab_name = &app.tabs[app.active_tab];
    let Some(result) = &app.result else {
        let empty = Paragraph::new("Press g to generate a bracket")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    if tab_name == FINAL_FOUR_TAB {
        render_final_four(frame, area, app, result);
        return;
    }

    let Some(region) = result.region(tab_name) else {
        let empty =
            Paragraph::new("No results for this region").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);
    for ((round, label), column) in region
        .rounds
        .iter()
        .zip(REGION_ROUND_LABELS)
        .zip(columns.iter())
    {
        render_round_column(frame, *column, app, label, round);
    }
}

fn render_final_four(frame: &mut Frame, area: Rect, app: &App, result: &SimulationResult) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50); 2])
        .split(area);
    render_round_column(frame, columns[0], app, "Final Four", &result.final_four);
    render_round_column(frame, columns[1], app, "Championship", &result.championship);
}

fn render_round_column(frame: &mut Frame, area: Rect, app: &App, label: &str, round: &Round) {
    let mut lines: Vec<Line> = Vec::with_capacity(round.len() * 3 + 1);
    lines.push(Line::from(Span::styled(
        label.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for matchup in round {
        lines.push(team_line(app, &matchup.team_a, matchup.score_a, &matchup.winner));
        lines.push(team_line(app, &matchup.team_b, matchup.score_b, &matchup.winner));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn team_line(app: &App, slot: &TeamSlot, score: f64, winner: &TeamSlot) -> Line<'static> {
    let name = match slot {
        Some(team) => seed_label(app, team),
        None => "-".to_string(),
    };
    let is_winner = slot.is_some() && slot == winner;
    let style = if is_winner {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(format!("{name:<26} {score:.3}"), style))
}

fn seed_label(app: &App, team: &str) -> String {
    match app
        .bracket
        .as_ref()
        .and_then(|bracket| bracket.seed_for_team(team))
    {
        Some((_, seed)) => format!("({seed}) {team}"),
        None => team.to_string(),
    }
}
