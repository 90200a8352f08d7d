use anyhow::Result;
use chrono::Local;
use crossterm::event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    Frame,
};

use crate::jobs::Job;
use crate::models::PrayerName;
use crate::platform::Services;
use crate::prayer_times::LocationStatus;
use crate::session::Session;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{clock, header, next_prayer, overlays, player, prayers, statusbar, verse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Location,
    Chapter,
}

pub struct App {
    session: Session,
    services: Services,
    events: EventHandler,
    pub should_quit: bool,
    pub show_help: bool,
    pub selected: usize,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
}

impl App {
    pub fn new(session: Session, services: Services, events: EventHandler) -> Self {
        App {
            session,
            services,
            events,
            should_quit: false,
            show_help: false,
            selected: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
        }
    }

    fn spawn(&self, jobs: Vec<Job>) {
        if !jobs.is_empty() {
            self.events.spawn_jobs(jobs, &self.services);
        }
    }

    fn spawn_one(&self, job: Option<Job>) {
        self.spawn(job.into_iter().collect());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Some terminals also report release and repeat events.
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Location | InputMode::Chapter => self.handle_input_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        // The azan modal and focus mode capture the keyboard.
        if self.session.tracker().modal().is_some() {
            match key.code {
                KeyCode::Char('s') | KeyCode::Esc => self.session.stop_azan(),
                KeyCode::Char('b') => self.session.take_break(),
                _ => {}
            }
            return;
        }
        if self.session.tracker().focus_mode() {
            match key.code {
                KeyCode::Char('e') => self.session.end_break(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        self.session.clear_status();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char(' ') => self.session.toggle_play(),
            KeyCode::Char('n') => {
                let job = self.session.next_chapter();
                self.spawn(vec![job]);
            }
            KeyCode::Char('p') => {
                let job = self.session.previous_chapter();
                self.spawn(vec![job]);
            }
            KeyCode::Char('a') => {
                self.session.toggle_auto_advance();
            }
            KeyCode::Char('[') => self.session.seek_back(),
            KeyCode::Char(']') => self.session.seek_forward(),
            KeyCode::Char('g') => self.open_input(InputMode::Chapter),
            KeyCode::Char('v') => {
                if self.session.manual_verse() {
                    let job = self.session.next_verse();
                    self.spawn(vec![job]);
                }
            }
            KeyCode::Char('w') => self.session.rotate_wallpaper(),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(PrayerName::ALL.len() - 1);
            }
            KeyCode::Char('t') => {
                let prayer = PrayerName::ALL[self.selected];
                if let Err(e) = self.session.toggle_notification(prayer) {
                    log::error!("Saving notification preference failed: {:#}", e);
                }
            }
            KeyCode::Char('r') => {
                let job = self.session.refresh_schedule();
                self.spawn_one(job);
            }
            KeyCode::Char('l') => {
                let job = self.session.detect_location();
                self.spawn_one(job);
            }
            KeyCode::Char('L') => self.open_input(InputMode::Location),
            KeyCode::Char('b') => self.session.take_break(),
            _ => {}
        }
    }

    fn open_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input_buffer.clear();
        self.input_error = None;
    }

    fn close_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.input_error = None;
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_input(),
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                if self.input_mode == InputMode::Chapter && !c.is_ascii_digit() {
                    return;
                }
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        match self.input_mode {
            InputMode::Location => match self.session.set_location(&self.input_buffer) {
                Ok(job) => {
                    self.spawn(vec![job]);
                    self.close_input();
                }
                Err(e) => self.input_error = Some(e.user_message().to_string()),
            },
            InputMode::Chapter => {
                let trimmed = self.input_buffer.trim();
                let Ok(n) = trimmed.parse::<i64>() else {
                    self.input_error = Some(format!("'{}' is not a chapter number", trimmed));
                    return;
                };
                match self.session.jump_to_chapter(n) {
                    Ok(job) => {
                        self.spawn(vec![job]);
                        self.close_input();
                    }
                    Err(e) => self.input_error = Some(e.to_string()),
                }
            }
            InputMode::Normal => {}
        }
    }

    pub fn tick(&mut self) {
        let jobs = self.session.tick(Local::now().naive_local());
        self.spawn(jobs);
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Focus(visible) => self.session.set_visible(visible),
            Event::Tick => self.tick(),
            Event::Job(output) => {
                let jobs = self.session.complete(output);
                self.spawn(jobs);
            }
        }
    }

    fn location_text(&self) -> String {
        let tracker = self.session.tracker();
        match tracker.status() {
            LocationStatus::NeedsManual { reason } => format!("{}  [L] enter location", reason),
            LocationStatus::Detecting => "Detecting location...".to_string(),
            LocationStatus::Ready => tracker
                .location()
                .map(|l| l.label.clone().unwrap_or_else(|| l.coordinates_label()))
                .unwrap_or_default(),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        if self.session.tracker().focus_mode() {
            overlays::focus(frame);
            return;
        }

        self.draw_dashboard(frame);

        if let Some(modal) = self.session.tracker().modal() {
            overlays::azan(
                frame,
                modal,
                self.session.settings().clock_format,
                self.session.tracker().cue_error(),
            );
        }

        match self.input_mode {
            InputMode::Location => overlays::input(
                frame,
                "Location",
                "City or address",
                &self.input_buffer,
                self.input_error.as_deref(),
            ),
            InputMode::Chapter => overlays::input(
                frame,
                "Go to chapter",
                "Chapter (1-114)",
                &self.input_buffer,
                self.input_error.as_deref(),
            ),
            InputMode::Normal => {}
        }

        if self.show_help {
            overlays::help(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        let settings = self.session.settings();
        let now = self.session.now();
        let now_minutes = self.session.now_minutes();

        frame.render_widget(
            Block::default().style(theme::backdrop(
                self.session.wallpaper().index(),
                settings.overlay_opacity,
            )),
            area,
        );

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Length(4), // clock
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let hijri = if settings.show_islamic_calendar {
            self.session.hijri()
        } else {
            None
        };
        header::render(frame, outer_chunks[0], now.date(), hijri, &self.location_text());
        clock::render(frame, outer_chunks[1], now.time(), settings.clock_format);
        statusbar::render(
            frame,
            outer_chunks[3],
            self.session.status(),
            self.session.wallpaper().current(),
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(outer_chunks[2]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // next prayer
                Constraint::Min(7),    // prayers
            ])
            .split(columns[0]);

        let tracker = self.session.tracker();
        next_prayer::render(
            frame,
            left_chunks[0],
            tracker.next_prayer(now_minutes),
            now_minutes,
            settings.clock_format,
        );
        prayers::render(
            frame,
            left_chunks[1],
            &tracker.rows(now_minutes),
            tracker.notifications(),
            self.selected,
            settings.clock_format,
        );

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // verse
                Constraint::Length(5), // player
            ])
            .split(columns[1]);

        verse::render(
            frame,
            right_chunks[0],
            self.session.verse(),
            self.session.verse_loading(),
            self.session.manual_verse(),
        );
        player::render(frame, right_chunks[1], self.session.player());
    }
}

pub fn run(mut session: Session, services: Services, tick_ms: u64) -> Result<()> {
    let events = EventHandler::new(tick_ms);
    events.spawn_jobs(session.start(), &services);
    let mut app = App::new(session, services, events);

    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableFocusChange)?;

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;
            let event = app.events.next()?;
            app.handle_event(event);
            if app.should_quit {
                return Ok(());
            }
        }
    })();

    let _ = crossterm::execute!(std::io::stdout(), DisableFocusChange);
    ratatui::restore();
    result
}
