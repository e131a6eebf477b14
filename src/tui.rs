use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::alert::{AlertLog, Alerter, Severity};
use crate::api::PostsApi;
use crate::auth::{greeting, AuthProvider};
use crate::controller::{NewPostAction, ResultController, Ticket};
use crate::models::{Field, PostRecord};
use crate::query::FilterState;
use crate::suggest::{AutosuggestField, SelectMethod, SuggestionIndex};

const MAX_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Company,
    Position,
    Results,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Company => Focus::Position,
            Focus::Position => Focus::Results,
            Focus::Results => Focus::Company,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Company => Focus::Results,
            Focus::Position => Focus::Company,
            Focus::Results => Focus::Position,
        }
    }

    fn field(self) -> Option<Field> {
        match self {
            Focus::Company => Some(Field::Company),
            Focus::Position => Some(Field::Position),
            Focus::Results => None,
        }
    }
}

/// One line of the search panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchRow {
    Greeting,
    Gap,
    Label(Focus),
    Input(Focus),
    Suggestion(usize),
}

struct Panes {
    search: Rect,
    posts: Rect,
    detail: Rect,
    footer: Rect,
}

fn panes(area: Rect) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    let results = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[1]);

    Panes {
        search: columns[0],
        posts: results[0],
        detail: results[1],
        footer: rows[1],
    }
}

fn search_block() -> Block<'static> {
    Block::default().borders(Borders::ALL).title(" Search ")
}

/// Work the event loop hands to the runtime.
#[derive(Debug)]
enum Command {
    Quit,
    Posts(Ticket),
    Candidates(Field, u64),
}

/// Completed fetches, delivered back to the view thread.
enum Msg {
    Posts(Ticket, Result<Vec<PostRecord>>),
    Candidates(Field, u64, Result<Vec<String>>),
}

struct Fetcher {
    api: Arc<dyn PostsApi>,
    handle: Handle,
    tx: UnboundedSender<Msg>,
}

impl Fetcher {
    fn dispatch(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        match command {
            Command::Quit => {}
            Command::Posts(ticket) => {
                self.handle.spawn(async move {
                    let result = ticket.fetch(api.as_ref()).await;
                    // The receiver is gone once the view closed.
                    let _ = tx.send(Msg::Posts(ticket, result));
                });
            }
            Command::Candidates(field, generation) => {
                self.handle.spawn(async move {
                    let result = api.candidates(field).await;
                    let _ = tx.send(Msg::Candidates(field, generation, result));
                });
            }
        }
    }
}

struct AppState {
    controller: ResultController,
    filter: FilterState,
    company: AutosuggestField,
    position: AutosuggestField,
    company_index: SuggestionIndex,
    position_index: SuggestionIndex,
    focus: Focus,
    selected: usize,
    scroll_offset: u16,
    alerts: AlertLog,
    auth: Box<dyn AuthProvider>,
}

impl AppState {
    fn new(auth: Box<dyn AuthProvider>) -> Self {
        Self {
            controller: ResultController::new(),
            filter: FilterState::default(),
            company: AutosuggestField::new(Field::Company),
            position: AutosuggestField::new(Field::Position),
            company_index: SuggestionIndex::new(Field::Company),
            position_index: SuggestionIndex::new(Field::Position),
            focus: Focus::Results,
            selected: 0,
            scroll_offset: 0,
            alerts: AlertLog::new(),
            auth,
        }
    }

    fn parts(&mut self, field: Field) -> (&mut AutosuggestField, &mut SuggestionIndex) {
        match field {
            Field::Company => (&mut self.company, &mut self.company_index),
            Field::Position => (&mut self.position, &mut self.position_index),
        }
    }

    fn input(&self, focus: Focus) -> Option<&AutosuggestField> {
        match focus {
            Focus::Company => Some(&self.company),
            Focus::Position => Some(&self.position),
            Focus::Results => None,
        }
    }

    fn search_rows(&self) -> Vec<SearchRow> {
        let mut rows = Vec::new();
        if greeting(self.auth.as_ref()).is_some() {
            rows.extend([SearchRow::Greeting, SearchRow::Gap]);
        }
        for focus in [Focus::Company, Focus::Position] {
            rows.extend([SearchRow::Label(focus), SearchRow::Input(focus)]);
            if self.focus == focus {
                let shown = self
                    .input(focus)
                    .map_or(0, |input| input.suggestions().len().min(MAX_SUGGESTIONS));
                rows.extend((0..shown).map(SearchRow::Suggestion));
            }
            rows.push(SearchRow::Gap);
        }
        rows
    }

    fn current_post(&self) -> Option<&PostRecord> {
        if !self.controller.has_posts() {
            return None;
        }
        self.controller.posts().get(self.selected)
    }

    fn set_focus(&mut self, focus: Focus) -> Option<Command> {
        if let Some(field) = self.focus.field() {
            self.parts(field).0.clear_suggestions();
        }
        self.focus = focus;

        let field = focus.field()?;
        let (input, index) = self.parts(field);
        let first = input.focus();
        // Refocusing retries a load that failed earlier.
        let generation = index.begin_load()?;
        tracing::debug!(%field, first, generation, "loading suggestions on focus");
        Some(Command::Candidates(field, generation))
    }

    fn sync_filter(&mut self, field: Field) {
        let value = self.parts(field).0.value().to_string();
        self.filter.set(field, &value);
    }

    fn search(&mut self) -> Option<Command> {
        self.selected = 0;
        self.scroll_offset = 0;
        self.controller.search(&self.filter).map(Command::Posts)
    }

    fn handle_key(&mut self, code: KeyCode) -> Option<Command> {
        match (self.focus.field(), code) {
            (_, KeyCode::Tab) => self.set_focus(self.focus.next()),
            (_, KeyCode::BackTab) => self.set_focus(self.focus.prev()),
            (Some(field), code) => self.handle_field_key(field, code),
            (None, code) => self.handle_results_key(code),
        }
    }

    fn handle_field_key(&mut self, field: Field, code: KeyCode) -> Option<Command> {
        let (input, index) = self.parts(field);
        match code {
            KeyCode::Char(c) => input.push_char(c, index),
            KeyCode::Backspace => input.pop_char(index),
            KeyCode::Down => input.highlight_next(),
            KeyCode::Up => input.highlight_prev(),
            KeyCode::Esc => {
                if input.suggestions().is_empty() {
                    return self.set_focus(Focus::Results);
                }
                input.clear_suggestions();
            }
            KeyCode::Enter => {
                let picked = input.confirm();
                self.sync_filter(field);
                return match picked {
                    Some(selection) if selection.suppress_submit => None,
                    _ => self.search(),
                };
            }
            _ => {}
        }
        self.sync_filter(field);
        None
    }

    /// Left click inside the search panel: focuses a field or picks a suggestion.
    fn handle_click(&mut self, column: u16, row: u16, screen: Rect) -> Option<Command> {
        let inner = search_block().inner(panes(screen).search);
        if column < inner.x
            || column >= inner.x + inner.width
            || row < inner.y
            || row >= inner.y + inner.height
        {
            return None;
        }

        match self.search_rows().get(usize::from(row - inner.y)).copied()? {
            SearchRow::Label(focus) | SearchRow::Input(focus) if focus != self.focus => {
                self.set_focus(focus)
            }
            SearchRow::Suggestion(idx) => {
                let field = self.focus.field()?;
                let picked = self.parts(field).0.select(idx, SelectMethod::Pointer);
                self.sync_filter(field);
                tracing::debug!(%field, picked = ?picked.map(|p| p.value), "suggestion clicked");
                None
            }
            _ => None,
        }
    }

    fn handle_results_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('/') => self.set_focus(Focus::Company),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.controller.posts().len() {
                    self.selected += 1;
                    self.scroll_offset = 0;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.scroll_offset = 0;
                }
                None
            }
            KeyCode::Char('J') | KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(3);
                None
            }
            KeyCode::Char('K') | KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(3);
                None
            }
            KeyCode::Char('s') => {
                self.selected = 0;
                let next = self.controller.sort_key().next();
                self.controller.set_sort_key(next).map(Command::Posts)
            }
            KeyCode::Enter => self.search(),
            KeyCode::Char('n') => {
                match self.controller.new_post_action(self.auth.as_ref()) {
                    NewPostAction::RedirectToLogin => self.alerts.alert(
                        Severity::Warning,
                        "Sign in required",
                        "set APPTRACK_TOKEN to create posts",
                        None,
                    ),
                    NewPostAction::OpenEditor => self.alerts.alert(
                        Severity::Info,
                        "New post",
                        "apptrack new --company <name> --position <title>",
                        None,
                    ),
                }
                None
            }
            KeyCode::Char('c') => {
                for field in [Field::Company, Field::Position] {
                    let (input, index) = self.parts(field);
                    input.set_text("", index);
                }
                self.filter.clear();
                None
            }
            KeyCode::Char('r') => {
                self.company_index.invalidate();
                self.position_index.invalidate();
                self.alerts.alert(Severity::Info, "Suggestions", "reloading on next focus", None);
                None
            }
            KeyCode::Char('d') => {
                self.alerts.dismiss();
                None
            }
            _ => None,
        }
    }

    fn on_message(&mut self, msg: Msg) {
        match msg {
            Msg::Posts(ticket, result) => {
                let outcome = self.controller.settle(&ticket, result, &self.alerts);
                tracing::debug!(generation = ticket.generation(), ?outcome, "posts settled");
                let len = self.controller.posts().len();
                if self.selected >= len {
                    self.selected = len.saturating_sub(1);
                }
            }
            Msg::Candidates(field, generation, result) => {
                let alerts = &self.alerts;
                let (input, index) = match field {
                    Field::Company => (&mut self.company, &mut self.company_index),
                    Field::Position => (&mut self.position, &mut self.position_index),
                };
                let applied = index.finish_load(generation, result, alerts);
                if applied && self.focus.field() == Some(field) {
                    input.refresh(index);
                }
            }
        }
    }
}

pub fn run_browse(api: Arc<dyn PostsApi>, handle: Handle, auth: Box<dyn AuthProvider>) -> Result<()> {
    let (tx, mut rx) = unbounded_channel();
    let fetcher = Fetcher { api, handle, tx };

    let mut state = AppState::new(auth);
    fetcher.dispatch(Command::Posts(state.controller.mount()));

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, &fetcher, &mut rx);
    state.controller.teardown();

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(DisableMouseCapture)?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    fetcher: &Fetcher,
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<Msg>,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        while let Ok(msg) = rx.try_recv() {
            state.on_message(msg);
        }

        list_state.select(state.current_post().map(|_| state.selected));
        let screen = terminal.draw(|frame| draw(frame, state, &mut list_state))?.area;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let command = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => state.handle_key(key.code),
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                state.handle_click(mouse.column, mouse.row, screen)
            }
            _ => None,
        };
        match command {
            Some(Command::Quit) => break,
            Some(command) => fetcher.dispatch(command),
            None => {}
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let panes = panes(frame.area());

    draw_search(frame, state, panes.search);
    draw_posts(frame, state, list_state, panes.posts);

    let detail = Paragraph::new(build_detail(state))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(detail, panes.detail);

    let help = match state.focus {
        Focus::Results => {
            " j/k:navigate  J/K:scroll  s:sort  /:search  Enter:run search  c:clear  r:reload  n:new  d:dismiss  q:quit"
        }
        _ => " type to filter  Up/Down or click:pick  Enter:select/search  Tab:next field  Esc:back",
    };
    let footer = match state.alerts.latest() {
        Some(alert) => {
            let color = match alert.severity {
                Severity::Error => Color::Red,
                Severity::Warning => Color::Yellow,
                Severity::Info | Severity::Success => Color::Green,
            };
            let count = state.alerts.all().len();
            let more = if count > 1 { format!(" (+{})", count - 1) } else { String::new() };
            Paragraph::new(format!(" {}: {}{}", alert.title, alert.detail, more))
                .style(Style::default().fg(color))
        }
        None => Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, panes.footer);
}

fn draw_search(frame: &mut Frame, state: &AppState, area: Rect) {
    // Not wrapped: clicks map one row to one line.
    let lines: Vec<Line> = state
        .search_rows()
        .into_iter()
        .map(|row| search_line(state, row))
        .collect();

    let panel = Paragraph::new(Text::from(lines)).block(search_block());
    frame.render_widget(panel, area);
}

fn search_line(state: &AppState, row: SearchRow) -> Line<'static> {
    match row {
        SearchRow::Greeting => Line::from(Span::styled(
            greeting(state.auth.as_ref()).unwrap_or_default(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        SearchRow::Gap => Line::from(""),
        SearchRow::Label(focus) => {
            let Some(input) = state.input(focus) else {
                return Line::from("");
            };
            let style = if state.focus == focus {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(
                format!("{} ", input.field().as_str().to_uppercase()),
                style,
            ))
        }
        SearchRow::Input(focus) => {
            let Some(input) = state.input(focus) else {
                return Line::from("");
            };
            let text = if input.value().is_empty() {
                Span::styled(input.placeholder(), Style::default().fg(Color::DarkGray))
            } else {
                Span::raw(input.value().to_string())
            };
            let cursor = if state.focus == focus { "_" } else { "" };
            Line::from(vec![Span::raw("> "), text, Span::raw(cursor)])
        }
        SearchRow::Suggestion(i) => {
            let Some(input) = state.input(state.focus) else {
                return Line::from("");
            };
            let style = if input.highlighted() == Some(i) {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let text = input.suggestions().get(i).cloned().unwrap_or_default();
            Line::from(Span::styled(format!("    {}", text), style))
        }
    }
}

fn draw_posts(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let title = format!(
        " Posts ({}) - sort: {} ",
        state.controller.posts().len(),
        state.controller.sort_key().label()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    if !state.controller.has_posts() {
        let text = if state.controller.is_loading() {
            "Loading..."
        } else {
            "No posts found."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let items: Vec<ListItem> = state
        .controller
        .posts()
        .iter()
        .map(|post| {
            let company = post.company.as_deref().unwrap_or("?");
            let position = post.position.as_deref().unwrap_or("?");
            ListItem::new(format!(
                "#{:<5} {:<24} {:<24} {:>10} {:>5}",
                post.id,
                crate::truncate(company, 22),
                crate::truncate(position, 22),
                post.created_label(),
                post.views.unwrap_or(0)
            ))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, list_state);
}

fn build_detail(state: &AppState) -> Text<'_> {
    let Some(post) = state.current_post() else {
        return Text::raw("No post selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        post.position.as_deref().unwrap_or("(untitled)"),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(company) = &post.company {
        lines.push(Line::from(format!("at {}", company)));
    }
    if let Some(status) = &post.status {
        lines.push(Line::from(format!("Status: {}", status)));
    }
    lines.push(Line::from(format!("Created: {}", post.created_label())));
    lines.push(Line::from(format!("Interview: {}", post.interview_label())));
    lines.push(Line::from(format!("Views: {}", post.views.unwrap_or(0))));
    lines.push(Line::from(""));

    if let Some(notes) = &post.notes {
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(notes, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuth;
    use crate::models::SortKey;
    use crate::query::{Page, Query, QueryComposer};
    use crate::testing::post;

    fn mounted_state() -> AppState {
        let mut state = AppState::new(Box::new(StaticAuth::anonymous()));
        let ticket = state.controller.mount();
        state.on_message(Msg::Posts(
            ticket,
            Ok(vec![post(1, "Acme", "Engineer"), post(2, "Globex", "Manager")]),
        ));
        state
    }

    /// Delivers the candidates a focus change asked for.
    fn deliver(state: &mut AppState, command: Option<Command>, result: Result<Vec<String>>) {
        match command {
            Some(Command::Candidates(field, generation)) => {
                state.on_message(Msg::Candidates(field, generation, result))
            }
            other => panic!("expected a candidates load, got {:?}", other),
        }
    }

    fn names(values: &[&str]) -> Result<Vec<String>> {
        Ok(values.iter().map(|s| s.to_string()).collect())
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            assert!(state.handle_key(KeyCode::Char(c)).is_none());
        }
    }

    #[test]
    fn test_first_focus_loads_candidates_once() {
        let mut state = mounted_state();
        assert!(matches!(
            state.handle_key(KeyCode::Char('/')),
            Some(Command::Candidates(Field::Company, _))
        ));
        assert!(matches!(
            state.handle_key(KeyCode::Tab),
            Some(Command::Candidates(Field::Position, _))
        ));
        state.handle_key(KeyCode::Tab);
        assert_eq!(state.focus, Focus::Results);
        assert!(state.handle_key(KeyCode::Char('/')).is_none());
    }

    #[test]
    fn test_typing_and_search_builds_filtered_query() {
        let mut state = mounted_state();
        let load = state.handle_key(KeyCode::Char('/'));
        deliver(&mut state, load, names(&["Acme"]));
        type_text(&mut state, "Acme");
        assert_eq!(state.filter.get(Field::Company), Some("Acme"));

        match state.handle_key(KeyCode::Enter) {
            Some(Command::Posts(ticket)) => assert_eq!(
                ticket.query,
                Query::ByCompany {
                    company: "Acme".to_string(),
                    page: Page::first(SortKey::CreateDate),
                }
            ),
            other => panic!("expected a search, got {:?}", other),
        }
    }

    #[test]
    fn test_confirming_a_suggestion_does_not_search() {
        let mut state = mounted_state();
        state.handle_key(KeyCode::Char('/'));
        let load = state.handle_key(KeyCode::Tab);
        deliver(&mut state, load, names(&["Engineer", "Senior Engineer"]));
        type_text(&mut state, "sen");
        assert_eq!(state.position.suggestions(), ["Senior Engineer"]);

        state.handle_key(KeyCode::Down);
        assert!(state.handle_key(KeyCode::Enter).is_none());
        assert_eq!(state.filter.get(Field::Position), Some("Senior Engineer"));

        assert!(matches!(state.handle_key(KeyCode::Enter), Some(Command::Posts(_))));
    }

    #[test]
    fn test_sort_cycle_issues_unfiltered_listing() {
        let mut state = mounted_state();
        state.filter.set(Field::Company, "Acme");

        match state.handle_key(KeyCode::Char('s')) {
            Some(Command::Posts(ticket)) => {
                assert_eq!(ticket.query, QueryComposer::unfiltered(SortKey::InterviewDate))
            }
            other => panic!("expected a listing, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_candidates_show_alert() {
        let mut state = mounted_state();
        let load = state.handle_key(KeyCode::Char('/'));
        deliver(&mut state, load, Err(anyhow::anyhow!("offline")));
        assert_eq!(state.alerts.latest().unwrap().title, "could not get companies");
        assert!(!state.company_index.is_loaded());

        state.handle_key(KeyCode::Esc);
        state.handle_key(KeyCode::Char('d'));
        assert!(state.alerts.latest().is_none());
    }

    #[test]
    fn test_new_post_without_token_asks_to_sign_in() {
        let mut state = mounted_state();
        state.handle_key(KeyCode::Char('n'));
        let alert = state.alerts.latest().unwrap();
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.title, "Sign in required");
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut state = mounted_state();
        state.handle_key(KeyCode::Char('j'));
        state.handle_key(KeyCode::Char('j'));
        assert_eq!(state.selected, 1);
        assert_eq!(state.current_post().unwrap().id, 2);
        state.handle_key(KeyCode::Char('k'));
        state.handle_key(KeyCode::Char('k'));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_clicking_a_suggestion_picks_it_without_searching() {
        let mut state = mounted_state();
        let load = state.handle_key(KeyCode::Char('/'));
        deliver(&mut state, load, names(&["Acme", "Acme Labs", "Globex"]));
        type_text(&mut state, "acme");

        let screen = Rect::new(0, 0, 120, 40);
        let inner = search_block().inner(panes(screen).search);
        let line = state
            .search_rows()
            .iter()
            .position(|row| *row == SearchRow::Suggestion(1))
            .unwrap() as u16;

        assert!(state.handle_click(inner.x + 2, inner.y + line, screen).is_none());
        assert_eq!(state.company.value(), "Acme Labs");
        assert!(state.company.suggestions().is_empty());
        assert_eq!(state.filter.get(Field::Company), Some("Acme Labs"));
        assert!(state.controller.has_posts());
    }

    #[test]
    fn test_clicking_a_field_label_focuses_it() {
        let mut state = mounted_state();
        let screen = Rect::new(0, 0, 120, 40);
        let inner = search_block().inner(panes(screen).search);
        let line = state
            .search_rows()
            .iter()
            .position(|row| *row == SearchRow::Input(Focus::Position))
            .unwrap() as u16;

        assert!(matches!(
            state.handle_click(inner.x, inner.y + line, screen),
            Some(Command::Candidates(Field::Position, _))
        ));
        assert_eq!(state.focus, Focus::Position);

        // Outside the search panel.
        assert!(state.handle_click(screen.width - 1, inner.y + line, screen).is_none());
        assert_eq!(state.focus, Focus::Position);
    }

    #[test]
    fn test_reload_ignores_candidates_requested_before_it() {
        let mut state = mounted_state();
        let stale = state.handle_key(KeyCode::Char('/'));
        state.handle_key(KeyCode::Esc);
        state.handle_key(KeyCode::Char('r'));

        deliver(&mut state, stale, names(&["Old Co"]));
        assert!(!state.company_index.is_loaded());

        let fresh = state.handle_key(KeyCode::Char('/'));
        deliver(&mut state, fresh, names(&["New Co"]));
        assert_eq!(state.company_index.candidates(), ["New Co"]);
    }
}
