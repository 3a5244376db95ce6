use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use keypass_ledger::{
    date_codec, Command, EntryKind, LedgerError, Outcome, ReceiverRow, Session, Snapshot,
    ValidationReport,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Users,
    Send,
    Report,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Users => Page::Send,
            Page::Send => Page::Report,
            Page::Report => Page::Users,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Users => Page::Report,
            Page::Send => Page::Users,
            Page::Report => Page::Send,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Users => "Users & Entries",
            Page::Send => "Send Key/Pass",
            Page::Report => "Validation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendField {
    Sender,
    Kind,
    Receiver,
    Value,
}

impl SendField {
    pub fn next(&self) -> Self {
        match self {
            SendField::Sender => SendField::Kind,
            SendField::Kind => SendField::Receiver,
            SendField::Receiver => SendField::Value,
            SendField::Value => SendField::Sender,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            SendField::Sender => SendField::Value,
            SendField::Kind => SendField::Sender,
            SendField::Receiver => SendField::Kind,
            SendField::Value => SendField::Receiver,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SendField::Sender => "From",
            SendField::Kind => "Key/Pass",
            SendField::Receiver => "To",
            SendField::Value => "Value",
        }
    }
}

/// What a text prompt is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPurpose {
    AddUser,
    RenameUser { old: String },
}

/// A pending request to the user. The answer becomes a `Command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Alert {
        message: String,
        is_error: bool,
        /// Overlay to return to once the alert is dismissed
        resume: Option<Box<Overlay>>,
    },
    Confirm {
        message: String,
        command: Command,
    },
    Prompt {
        title: String,
        message: String,
        input: String,
        purpose: PromptPurpose,
    },
}

impl Overlay {
    fn info(message: String) -> Self {
        Overlay::Alert {
            message,
            is_error: false,
            resume: None,
        }
    }

    fn error(message: String) -> Self {
        Overlay::Alert {
            message,
            is_error: true,
            resume: None,
        }
    }
}

enum OverlayAction {
    Keep,
    Close,
    Dismiss,
    Confirm,
    Submit,
}

pub struct App {
    pub session: Session,
    pub current_page: Page,
    pub users_state: ListState,
    pub send_field: SendField,
    pub overlay: Option<Overlay>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut app = Self {
            session,
            current_page: Page::Users,
            users_state: ListState::default(),
            send_field: SendField::Sender,
            overlay: None,
            should_quit: false,
        };
        app.clamp_selection();
        app
    }

    pub fn selected_user(&self) -> Option<&str> {
        self.users_state
            .selected()
            .and_then(|i| self.session.users().get(i))
            .map(String::as_str)
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.session.users().len();
        if len == 0 {
            return;
        }
        let i = match self.users_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.users_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.session.users().len();
        if len == 0 {
            return;
        }
        let i = match self.users_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.users_state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let len = self.session.users().len();
        let selected = match (len, self.users_state.selected()) {
            (0, _) => None,
            (len, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.users_state.select(selected);
    }

    /// Apply a command and queue the alert describing its result
    fn execute(&mut self, command: Command) -> std::result::Result<Outcome, LedgerError> {
        let result = self.session.apply(command);

        match &result {
            Ok(Outcome::Validated(_)) => self.current_page = Page::Report,
            Ok(outcome) => self.overlay = Some(Overlay::info(outcome.message())),
            Err(err) => self.overlay = Some(Overlay::error(err.to_string())),
        }

        self.clamp_selection();
        result
    }

    fn submit_send_form(&mut self) {
        let form = self.session.send_form().clone();

        match self.session.submit_send_form() {
            Ok(stored) => {
                let outcome = Outcome::EntryRecorded {
                    sender: form.sender,
                    kind: form.kind.unwrap_or(EntryKind::Key),
                    receiver: form.receiver,
                    stored,
                };
                self.send_field = SendField::Sender;
                self.overlay = Some(Overlay::info(outcome.message()));
            }
            Err(err) => self.overlay = Some(Overlay::error(err.to_string())),
        }
    }

    fn submit_prompt(&mut self, prompt: Overlay) {
        let command = match &prompt {
            Overlay::Prompt {
                input,
                purpose: PromptPurpose::AddUser,
                ..
            } => Command::AddUser {
                name: input.clone(),
            },
            Overlay::Prompt {
                input,
                purpose: PromptPurpose::RenameUser { old },
                ..
            } => Command::RenameUser {
                old: old.clone(),
                new: input.clone(),
            },
            _ => return,
        };

        // On failure the prompt comes back, input intact, after the alert
        if self.execute(command).is_err() {
            if let Some(Overlay::Alert { resume, .. }) = self.overlay.as_mut() {
                *resume = Some(Box::new(prompt));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            _ => match self.current_page {
                Page::Users => self.handle_users_key(key),
                Page::Send => self.handle_send_key(key),
                Page::Report => self.handle_report_key(key),
            },
        }
    }

    fn handle_users_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char('a') => {
                self.overlay = Some(Overlay::Prompt {
                    title: "Add user".to_string(),
                    message: "Name of the new user:".to_string(),
                    input: String::new(),
                    purpose: PromptPurpose::AddUser,
                });
            }
            KeyCode::Char('e') => {
                if let Some(old) = self.selected_user().map(str::to_string) {
                    self.overlay = Some(Overlay::Prompt {
                        title: "Rename user".to_string(),
                        message: format!("Rename \"{}\" to:", old),
                        input: old.clone(),
                        purpose: PromptPurpose::RenameUser { old },
                    });
                }
            }
            KeyCode::Char('d') => {
                if let Some(name) = self.selected_user().map(str::to_string) {
                    self.overlay = Some(Overlay::Confirm {
                        message: format!(
                            "Delete user \"{}\"? Every key and pass sent or received by this user is removed too.",
                            name
                        ),
                        command: Command::DeleteUser { name },
                    });
                }
            }
            KeyCode::Char('v') => {
                let _ = self.execute(Command::Validate);
            }
            KeyCode::Char('r') => self.confirm_reset(),
            _ => {}
        }
    }

    fn handle_send_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down => self.send_field = self.send_field.next(),
            KeyCode::Up => self.send_field = self.send_field.previous(),
            KeyCode::Left => self.cycle_send_field(false),
            KeyCode::Right => self.cycle_send_field(true),
            KeyCode::Enter => self.submit_send_form(),
            KeyCode::Backspace if self.send_field == SendField::Value => {
                self.session.send_form_mut().value.pop();
            }
            KeyCode::Char(c) if self.send_field == SendField::Value => {
                self.session.send_form_mut().value.push(c);
            }
            _ => {}
        }
    }

    fn handle_report_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('v') => {
                let _ = self.execute(Command::Validate);
            }
            KeyCode::Char('r') => self.confirm_reset(),
            _ => {}
        }
    }

    fn confirm_reset(&mut self) {
        self.overlay = Some(Overlay::Confirm {
            message: "Reset all users, entries and results?".to_string(),
            command: Command::Reset,
        });
    }

    fn cycle_send_field(&mut self, forward: bool) {
        let users: Vec<String> = self.session.users().to_vec();
        let form = self.session.send_form_mut();

        match self.send_field {
            SendField::Sender => form.sender = cycle(&users, &form.sender, forward),
            SendField::Receiver => form.receiver = cycle(&users, &form.receiver, forward),
            SendField::Kind => {
                form.kind = match (form.kind, forward) {
                    (None, true) => Some(EntryKind::Key),
                    (Some(EntryKind::Key), true) => Some(EntryKind::Pass),
                    (Some(EntryKind::Pass), true) => None,
                    (None, false) => Some(EntryKind::Pass),
                    (Some(EntryKind::Pass), false) => Some(EntryKind::Key),
                    (Some(EntryKind::Key), false) => None,
                };
            }
            SendField::Value => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let action = match self.overlay.as_mut() {
            None => return,
            Some(Overlay::Alert { .. }) => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => OverlayAction::Dismiss,
                _ => OverlayAction::Keep,
            },
            Some(Overlay::Confirm { .. }) => match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => OverlayAction::Confirm,
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => OverlayAction::Close,
                _ => OverlayAction::Keep,
            },
            Some(Overlay::Prompt { input, .. }) => match key.code {
                KeyCode::Enter => OverlayAction::Submit,
                KeyCode::Esc => OverlayAction::Close,
                KeyCode::Backspace => {
                    input.pop();
                    OverlayAction::Keep
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    OverlayAction::Keep
                }
                _ => OverlayAction::Keep,
            },
        };

        match action {
            OverlayAction::Keep => {}
            OverlayAction::Close => self.overlay = None,
            OverlayAction::Dismiss => {
                self.overlay = match self.overlay.take() {
                    Some(Overlay::Alert { resume, .. }) => resume.map(|o| *o),
                    _ => None,
                };
            }
            OverlayAction::Confirm => {
                if let Some(Overlay::Confirm { command, .. }) = self.overlay.take() {
                    let _ = self.execute(command);
                }
            }
            OverlayAction::Submit => {
                if let Some(prompt) = self.overlay.take() {
                    self.submit_prompt(prompt);
                }
            }
        }
    }
}

/// Step through "" followed by every user name
fn cycle(users: &[String], current: &str, forward: bool) -> String {
    let total = users.len() + 1;
    let index = users
        .iter()
        .position(|u| u == current)
        .map(|i| i + 1)
        .unwrap_or(0);
    let next = if forward {
        (index + 1) % total
    } else {
        (index + total - 1) % total
    };

    if next == 0 {
        String::new()
    } else {
        users[next - 1].clone()
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    let snapshot = app.session.snapshot();

    render_header(f, chunks[0], app, &snapshot);

    match app.current_page {
        Page::Users => render_users_page(f, chunks[1], app, &snapshot),
        Page::Send => render_send_page(f, chunks[1], app, &snapshot),
        Page::Report => render_report_page(f, chunks[1], app, &snapshot),
    }

    render_status_bar(f, chunks[2], app);

    if let Some(overlay) = &app.overlay {
        render_overlay(f, overlay);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App, snapshot: &Snapshot) {
    let pages = [Page::Users, Page::Send, Page::Report];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("   "));
    tab_spans.push(Span::styled(
        format!(
            "{} users · {} entries",
            snapshot.users.len(),
            snapshot.total_entries
        ),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(Line::from(tab_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Key/Pass Ledger "),
    );
    f.render_widget(header, area);
}

fn render_users_page(f: &mut Frame, area: Rect, app: &mut App, snapshot: &Snapshot) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(area);

    let items: Vec<ListItem> = snapshot
        .users
        .iter()
        .map(|name| ListItem::new(name.clone()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Users "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");
    f.render_stateful_widget(list, columns[0], &mut app.users_state);

    render_entry_table(f, columns[1], &snapshot.rows);
}

fn render_entry_table(f: &mut Frame, area: Rect, rows: &[ReceiverRow]) {
    let header_cells = ["Receiver", "Keys (sender: values)", "Passes (sender: values)"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let table_rows = rows.iter().map(|row| {
        let keys = grouped_lines(row, EntryKind::Key);
        let passes = grouped_lines(row, EntryKind::Pass);
        let height = keys.len().max(passes.len()).max(1) as u16;

        Row::new(vec![
            Cell::from(row.receiver.clone()),
            Cell::from(keys.join("\n")).style(Style::default().fg(Color::Green)),
            Cell::from(passes.join("\n")).style(Style::default().fg(Color::Magenta)),
        ])
        .height(height)
    });

    let table = Table::new(
        table_rows,
        [
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(40),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Entries "),
    );

    f.render_widget(table, area);
}

fn grouped_lines(row: &ReceiverRow, kind: EntryKind) -> Vec<String> {
    let groups = row.of_kind(kind);
    if groups.is_empty() {
        return vec!["-".to_string()];
    }
    groups
        .iter()
        .map(|g| format!("{}: {}", g.sender, g.values.join(", ")))
        .collect()
}

fn render_send_page(f: &mut Frame, area: Rect, app: &App, snapshot: &Snapshot) {
    let form = &snapshot.form;
    let kind = form.kind.map(|k| k.as_str()).unwrap_or("");

    let fields = [
        (SendField::Sender, form.sender.as_str()),
        (SendField::Kind, kind),
        (SendField::Receiver, form.receiver.as_str()),
        (SendField::Value, form.value.as_str()),
    ];

    let mut content = vec![Line::from("")];
    for (field, value) in fields {
        let focused = field == app.send_field;
        let marker = if focused { "→ " } else { "  " };
        let shown = if value.is_empty() { "(choose)" } else { value };
        let value_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        content.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(
                format!("{:<10}", field.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(shown.to_string(), value_style),
        ]));
        content.push(Line::from(""));
    }

    if date_codec::is_date_like(form.value.trim()) {
        let hint = match date_codec::to_canonical(form.value.trim()) {
            Some(canonical) => format!("  Date → {}", date_codec::to_display(&canonical)),
            None => "  Not a valid date".to_string(),
        };
        content.push(Line::from(Span::styled(hint, Style::default().fg(Color::Gray))));
    }

    content.push(Line::from(Span::styled(
        "  Values like DD/MM/YY or DD/MM/YYYY (Buddhist era) are stored as dates",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Send "),
    );
    f.render_widget(panel, area);
}

fn render_report_page(f: &mut Frame, area: Rect, app: &App, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(8),
        ])
        .split(area);

    match &snapshot.report {
        Some(report) => {
            render_report_summary(f, chunks[0], report);
            render_duplicates(f, chunks[1], report);
        }
        None => {
            let empty = Paragraph::new("Press v to validate all senders and receivers").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Result "),
            );
            f.render_widget(empty, chunks[0]);
        }
    }

    let events: Vec<ListItem> = app
        .session
        .journal()
        .events()
        .iter()
        .rev()
        .take(6)
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    e.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<15}", e.event_type.as_str()), Style::default().fg(Color::Cyan)),
                Span::raw(e.subject.clone()),
            ]))
        })
        .collect();
    let activity = List::new(events).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Activity "),
    );
    f.render_widget(activity, chunks[2]);
}

fn render_report_summary(f: &mut Frame, area: Rect, report: &ValidationReport) {
    let (headline, color) = if report.has_conflicts {
        ("✗ Mismatched data found!", Color::Red)
    } else {
        ("✓ All data is consistent", Color::Green)
    };

    let content = vec![
        Line::from(Span::styled(
            headline,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Checked {} item(s) · users {} · keys {} · passes {}",
            report.total_comparisons, report.total_users, report.total_keys, report.total_passes
        )),
    ];

    let summary = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(" Result "),
    );
    f.render_widget(summary, area);
}

fn render_duplicates(f: &mut Frame, area: Rect, report: &ValidationReport) {
    let header_cells = ["Kind", "Value", "Count", "Receivers", "Senders"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = report.duplicates.iter().map(|d| {
        let color = match d.kind {
            EntryKind::Key => Color::Green,
            EntryKind::Pass => Color::Magenta,
        };
        Row::new(vec![
            Cell::from(d.kind.as_str()).style(Style::default().fg(color)),
            Cell::from(d.value.clone()),
            Cell::from(d.occurrences.to_string()),
            Cell::from(d.receivers.join(", ")),
            Cell::from(d.senders.join(", ")),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(25),
            Constraint::Length(6),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Duplicates ({}) ", report.duplicates.len())),
    );
    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let hints: &[(&str, &str)] = match app.current_page {
        Page::Users => &[
            ("a", "Add"),
            ("e", "Rename"),
            ("d", "Delete"),
            ("v", "Validate"),
            ("r", "Reset"),
            ("↑/↓", "Nav"),
        ],
        Page::Send => &[
            ("↑/↓", "Field"),
            ("←/→", "Choose"),
            ("type", "Value"),
            ("Enter", "Send"),
        ],
        Page::Report => &[("v", "Validate"), ("r", "Reset")],
    };

    let mut status_spans = vec![Span::raw(" ")];
    for (key, label) in hints {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {} | ", label)));
    }
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn render_overlay(f: &mut Frame, overlay: &Overlay) {
    let area = centered_rect(60, 9, f.size());

    let (title, color, mut content, footer) = match overlay {
        Overlay::Alert {
            message, is_error, ..
        } => (
            if *is_error { " Error " } else { " Notice " },
            if *is_error { Color::Red } else { Color::Blue },
            vec![Line::from(message.clone())],
            "Enter OK",
        ),
        Overlay::Confirm { message, .. } => (
            " Confirm ",
            Color::Yellow,
            vec![Line::from(message.clone())],
            "y Confirm | n Cancel",
        ),
        Overlay::Prompt {
            title,
            message,
            input,
            ..
        } => (
            title.as_str(),
            Color::Green,
            vec![
                Line::from(message.clone()),
                Line::from(""),
                Line::from(Span::styled(
                    format!("> {}_", input),
                    Style::default().fg(Color::Yellow),
                )),
            ],
            "Enter OK | Esc Cancel",
        ),
    };

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        footer,
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title.to_string()),
        );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = r.width * percent_x / 100;
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_add_user_through_prompt() {
        let mut app = App::new(Session::new());

        app.handle_key(press(KeyCode::Char('a')));
        type_text(&mut app, "Alice");
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.session.users(), &["Alice"]);
        assert!(matches!(app.overlay, Some(Overlay::Alert { is_error: false, .. })));
        assert_eq!(app.selected_user(), Some("Alice"));

        app.handle_key(press(KeyCode::Enter));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_failed_rename_returns_to_prompt() {
        let mut session = Session::new();
        session.add_user("Alice").unwrap();
        session.add_user("Bob").unwrap();
        let mut app = App::new(session);

        app.handle_key(press(KeyCode::Char('e')));
        for _ in 0.."Alice".len() {
            app.handle_key(press(KeyCode::Backspace));
        }
        type_text(&mut app, "Bob");
        app.handle_key(press(KeyCode::Enter));
        assert!(matches!(app.overlay, Some(Overlay::Alert { is_error: true, .. })));

        // Dismissing the error brings the prompt back with the typed name
        app.handle_key(press(KeyCode::Enter));
        match &app.overlay {
            Some(Overlay::Prompt { input, .. }) => assert_eq!(input, "Bob"),
            other => panic!("expected prompt, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut session = Session::new();
        session.add_user("Alice").unwrap();
        let mut app = App::new(session);

        app.handle_key(press(KeyCode::Char('d')));
        app.handle_key(press(KeyCode::Char('n')));
        assert_eq!(app.session.users().len(), 1);

        app.handle_key(press(KeyCode::Char('d')));
        app.handle_key(press(KeyCode::Char('y')));
        assert!(app.session.users().is_empty());
        assert_eq!(app.users_state.selected(), None);
    }

    #[test]
    fn test_send_form_flow() {
        let mut session = Session::new();
        session.add_user("Alice").unwrap();
        session.add_user("Bob").unwrap();
        let mut app = App::new(session);

        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.current_page, Page::Send);

        app.handle_key(press(KeyCode::Right)); // From: Alice
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Right)); // Key
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Left)); // To: Bob (wraps backwards)
        app.handle_key(press(KeyCode::Down));
        type_text(&mut app, "05/07/68");
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.session.store().len(), 1);
        assert!(app.session.send_form().is_empty());
        match &app.overlay {
            Some(Overlay::Alert { message, .. }) => {
                assert_eq!(message, "Sent Key \"05/07/2568\" from Alice to Bob")
            }
            other => panic!("expected alert, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_switches_to_report() {
        let mut app = App::new(Session::new());

        app.handle_key(press(KeyCode::Char('v')));
        assert!(matches!(app.overlay, Some(Overlay::Alert { is_error: true, .. })));
        app.handle_key(press(KeyCode::Esc));

        app.session.add_user("X").unwrap();
        app.handle_key(press(KeyCode::Char('v')));
        assert_eq!(app.current_page, Page::Report);
        assert!(app.session.last_report().is_some());
    }

    #[test]
    fn test_cycle_options() {
        let users = vec!["A".to_string(), "B".to_string()];
        assert_eq!(cycle(&users, "", true), "A");
        assert_eq!(cycle(&users, "B", true), "");
        assert_eq!(cycle(&users, "", false), "B");
        assert_eq!(cycle(&users, "gone", true), "A");
    }
}
