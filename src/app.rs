use crate::config::Config;
use crate::export;
use crate::filter::{FilterCriteria, SortOrder};
use crate::models::{AircraftSummary, FlightRecord};
use crate::stats::{compute_aircraft_summaries, list_owners, Dashboard};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ViewMode {
    #[default]
    Overview,
    Analytics,
    Records,
    Map,
    Detail,
}

impl ViewMode {
    const TABS: [ViewMode; 4] = [
        ViewMode::Overview,
        ViewMode::Analytics,
        ViewMode::Records,
        ViewMode::Map,
    ];

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "analytics" => ViewMode::Analytics,
            "records" => ViewMode::Records,
            "map" => ViewMode::Map,
            _ => ViewMode::Overview,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Overview => "Overview",
            ViewMode::Analytics => "Analytics",
            ViewMode::Records => "Records",
            ViewMode::Map => "Map",
            ViewMode::Detail => "Flight",
        }
    }

    pub fn tabs() -> &'static [ViewMode] {
        &Self::TABS
    }

    fn next_tab(self) -> Self {
        let idx = Self::TABS.iter().position(|v| *v == self).unwrap_or(0);
        Self::TABS[(idx + 1) % Self::TABS.len()]
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ChartMode {
    #[default]
    Daily,
    Monthly,
}

impl ChartMode {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("monthly") {
            ChartMode::Monthly
        } else {
            ChartMode::Daily
        }
    }

    fn toggled(self) -> Self {
        match self {
            ChartMode::Daily => ChartMode::Monthly,
            ChartMode::Monthly => ChartMode::Daily,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

/// Playback state of the animated route in the flight view.
///
/// Progress runs from 0 to 100 and advances by `0.5 * speed` per tick.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Replay {
    pub progress: f64,
    pub speed: u8,
    pub playing: bool,
}

impl Default for Replay {
    fn default() -> Self {
        Self {
            progress: 0.0,
            speed: 1,
            playing: false,
        }
    }
}

impl Replay {
    const SPEEDS: [u8; 3] = [1, 2, 4];

    /// Starts or pauses; starting from the end rewinds first.
    pub fn toggle(&mut self) {
        if self.progress >= 100.0 {
            self.progress = 0.0;
        }
        self.playing = !self.playing;
    }

    pub fn reset(&mut self) {
        self.playing = false;
        self.progress = 0.0;
    }

    pub fn cycle_speed(&mut self) {
        let idx = Self::SPEEDS.iter().position(|s| *s == self.speed).unwrap_or(0);
        self.speed = Self::SPEEDS[(idx + 1) % Self::SPEEDS.len()];
    }

    pub fn advance(&mut self) {
        if !self.playing {
            return;
        }
        if self.progress >= 100.0 {
            self.playing = false;
            self.progress = 100.0;
            return;
        }
        self.progress = (self.progress + 0.5 * f64::from(self.speed)).min(100.0);
    }

    /// Progress as a fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        self.progress / 100.0
    }
}

/// Dashboard state: the loaded records, the current selection, and the
/// views derived from them.
///
/// Records are never modified. Every filter or sort change goes through
/// [`App::set_criteria`] / [`App::set_sort`], which rebuild `visible`,
/// `dashboard` and the filter option lists from scratch.
#[derive(Default)]
pub struct App {
    pub config: Config,
    pub view_mode: ViewMode,
    pub previous_view: ViewMode,
    pub chart_mode: ChartMode,
    pub load_state: LoadState,
    pub input_mode: InputMode,

    pub records: Vec<FlightRecord>,
    pub criteria: FilterCriteria,
    pub sort: SortOrder,
    pub visible: Vec<FlightRecord>,
    pub dashboard: Dashboard,
    pub owners: Vec<String>,
    pub aircraft: Vec<AircraftSummary>,

    pub selected_index: usize,
    pub replay: Replay,
    pub tick_count: usize,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let view_mode = ViewMode::from_name(&config.ui.default_view);
        let chart_mode = ChartMode::from_name(&config.ui.default_chart);
        Self {
            config,
            view_mode,
            previous_view: view_mode,
            chart_mode,
            ..Default::default()
        }
    }

    pub fn on_data_loaded(&mut self, records: Vec<FlightRecord>) {
        info!("Dashboard received {} flights", records.len());
        self.owners = list_owners(&records);
        self.records = records;
        self.load_state = LoadState::Ready;
        self.recompute();
    }

    pub fn on_load_failed(&mut self, message: String) {
        error!("Flight data failed to load: {}", message);
        self.load_state = LoadState::Failed(message);
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
        if self.view_mode == ViewMode::Detail {
            self.replay.advance();
        }
    }

    pub fn selected_flight(&self) -> Option<&FlightRecord> {
        self.visible.get(self.selected_index)
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.recompute();
        }
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.sort.sort(&mut self.visible);
    }

    fn recompute(&mut self) {
        self.visible = self.criteria.apply(&self.records);
        self.sort.sort(&mut self.visible);
        self.dashboard = Dashboard::compute(&self.visible, self.config.analytics.arrival_policy);
        self.aircraft = compute_aircraft_summaries(&self.records, self.criteria.owner.as_deref());
        if self.selected_index >= self.visible.len() {
            self.selected_index = self.visible.len().saturating_sub(1);
        }
    }

    /// Steps the owner filter: all -> each owner in turn -> all.
    pub fn cycle_owner(&mut self) {
        let next = next_option(&self.owners, self.criteria.owner.as_deref());

        // Drop an aircraft selection the new owner doesn't fly.
        let keep_registration = match (next.as_deref(), self.criteria.registration.as_deref()) {
            (Some(owner), Some(reg)) => self
                .records
                .iter()
                .any(|r| r.owner == owner && r.registration == reg),
            _ => true,
        };

        let mut criteria = self.criteria.with_owner(next);
        if !keep_registration {
            criteria = criteria.with_registration(None);
        }
        self.set_criteria(criteria);
    }

    /// Steps the aircraft filter through the registrations offered for the
    /// current owner.
    pub fn cycle_aircraft(&mut self) {
        let registrations: Vec<String> = self.aircraft.iter().map(|a| a.registration.clone()).collect();
        let next = next_option(&registrations, self.criteria.registration.as_deref());
        self.set_criteria(self.criteria.with_registration(next));
    }

    pub fn clear_filters(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    /// Writes the visible records to the configured export directory.
    pub fn export_visible(&mut self, date: chrono::NaiveDate) {
        let dir = Path::new(&self.config.export.directory).to_path_buf();
        self.status_message = Some(match export::export_to_dir(&dir, &self.visible, date) {
            Ok(path) => format!("Exported {} flights to {}", self.visible.len(), path.display()),
            Err(e) => {
                error!("Export failed: {}", e);
                format!("Export failed: {}", e)
            }
        });
    }

    fn open_detail(&mut self) {
        if self.selected_flight().is_some() {
            if self.view_mode != ViewMode::Detail {
                self.previous_view = self.view_mode;
            }
            self.view_mode = ViewMode::Detail;
            self.replay = Replay::default();
        }
    }

    fn select_next(&mut self) {
        if !self.visible.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.visible.len();
        }
    }

    fn select_previous(&mut self) {
        if !self.visible.is_empty() {
            self.selected_index = self
                .selected_index
                .checked_sub(1)
                .unwrap_or(self.visible.len() - 1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Nothing to navigate until the data is in.
        if self.load_state != LoadState::Ready {
            if let KeyCode::Char('q') | KeyCode::Esc = key.code {
                self.should_quit = true;
            }
            return;
        }

        if self.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return;
        }

        self.status_message = None;
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.view_mode = ViewMode::Overview,
            KeyCode::Char('2') => self.view_mode = ViewMode::Analytics,
            KeyCode::Char('3') => self.view_mode = ViewMode::Records,
            KeyCode::Char('4') => self.view_mode = ViewMode::Map,
            KeyCode::Tab => self.view_mode = self.view_mode.next_tab(),
            KeyCode::Char('o') => self.cycle_owner(),
            KeyCode::Char('a') => self.cycle_aircraft(),
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Char('m') => self.chart_mode = self.chart_mode.toggled(),
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Enter => self.open_detail(),
            _ => match self.view_mode {
                ViewMode::Records => self.handle_records_key(key),
                ViewMode::Detail => self.handle_detail_key(key),
                _ => {}
            },
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.set_criteria(self.criteria.with_search(""));
            }
            KeyCode::Backspace => {
                let mut search = self.criteria.search.clone();
                search.pop();
                self.set_criteria(self.criteria.with_search(search));
            }
            KeyCode::Char(c) => {
                let search = format!("{}{}", self.criteria.search, c);
                self.set_criteria(self.criteria.with_search(search));
            }
            _ => {}
        }
    }

    fn handle_records_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('s') => self.set_sort(self.sort.toggled(self.sort.key.next())),
            KeyCode::Char('r') => self.set_sort(self.sort.toggled(self.sort.key)),
            KeyCode::Char('e') => self.export_visible(chrono::Local::now().date_naive()),
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.replay.toggle(),
            KeyCode::Char('r') => self.replay.reset(),
            KeyCode::Char('f') => self.replay.cycle_speed(),
            KeyCode::Char('n') | KeyCode::Right => {
                if self.selected_index + 1 < self.visible.len() {
                    self.selected_index += 1;
                    self.replay = Replay::default();
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                    self.replay = Replay::default();
                }
            }
            KeyCode::Esc | KeyCode::Backspace => self.view_mode = self.previous_view,
            _ => {}
        }
    }
}

// None -> first -> ... -> last -> None
fn next_option(options: &[String], current: Option<&str>) -> Option<String> {
    match current {
        None => options.first().cloned(),
        Some(cur) => options
            .iter()
            .position(|o| o == cur)
            .and_then(|i| options.get(i + 1))
            .cloned(),
    }
}
