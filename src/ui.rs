use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::task::{Category, TaskId};
use crate::todo_list::{Confirmation, TodoList};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use tracing::error;

const GREY: Color = Color::DarkGray;
const EDIT: Color = Color::LightBlue;
const DELETE: Color = Color::LightRed;

/// Where key presses go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Confirm,
}

pub struct App<S> {
    pub todos: TodoList<S>,
    pub mode: Mode,
    pub selected: usize,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(todos: TodoList<S>) -> Self {
        Self {
            todos,
            mode: Mode::Normal,
            selected: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.todos.visible().get(self.selected).map(|(id, _)| *id)
    }

    /// Applies one key press. Storage failures end up on the status line
    /// instead of tearing the terminal down.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.status = None;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        let result = match self.mode {
            Mode::Normal => self.normal_key(key.code),
            Mode::Insert => self.insert_key(key.code),
            Mode::Confirm => self.confirm_key(key.code),
        };
        if let Err(err) = result {
            error!("{err}");
            self.status = Some(err.to_string());
        }
        self.clamp_selection();
    }

    fn normal_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('w') => self.switch(Category::Work),
            KeyCode::Char('t') => self.switch(Category::Travel),
            KeyCode::Tab => self.switch(self.todos.category().other()),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.selected_id() {
                    self.todos.toggle_checked(id)?;
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    if self.todos.start_edit(id) {
                        self.mode = Mode::Insert;
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    if self.todos.request_remove(id) {
                        self.mode = Mode::Confirm;
                    }
                }
            }
            KeyCode::Char('i') | KeyCode::Char('a') => self.mode = Mode::Insert,
            _ => {}
        }
        Ok(())
    }

    fn insert_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Esc => {
                if self.todos.is_editing() {
                    self.todos.cancel_edit();
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let was_editing = self.todos.is_editing();
                if self.todos.submit()? {
                    if was_editing {
                        self.mode = Mode::Normal;
                    } else {
                        self.selected = self.todos.visible().len().saturating_sub(1);
                    }
                }
            }
            KeyCode::Backspace => {
                self.todos.input_mut().pop();
            }
            KeyCode::Char(c) => self.todos.input_mut().push(c),
            _ => {}
        }
        Ok(())
    }

    fn confirm_key(&mut self, code: KeyCode) -> Result<()> {
        let answer = match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Confirmation::Sure,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Confirmation::Cancel,
            _ => return Ok(()),
        };
        self.mode = Mode::Normal;
        self.todos.resolve_remove(answer)?;
        Ok(())
    }

    fn switch(&mut self, category: Category) {
        self.todos.switch_category(category);
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        let count = self.todos.visible().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    pub fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.draw_header(f, chunks[0]);
        self.draw_input(f, chunks[1]);
        self.draw_list(f, chunks[2]);
        self.draw_status(f, chunks[3]);

        if self.mode == Mode::Confirm {
            self.draw_confirm(f);
        }
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let active = self.todos.category();
        let mut spans = Vec::new();
        for category in Category::ALL {
            let style = if category == active {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(GREY)
            };
            spans.push(Span::styled(format!(" {} ", category.label()), style));
        }
        let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn draw_input(&self, f: &mut Frame, area: Rect) {
        let title = if self.todos.is_editing() { "Edit" } else { "New" };
        let text = self.todos.input();
        let line = if text.is_empty() {
            Line::from(Span::styled(self.todos.placeholder(), Style::default().fg(GREY)))
        } else {
            Line::from(text)
        };
        let border = if self.mode == Mode::Insert {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let input = Paragraph::new(line).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(input, area);
        if self.mode == Mode::Insert {
            let width = u16::try_from(Line::from(text).width()).unwrap_or(u16::MAX);
            let x = area.x.saturating_add(1).saturating_add(width);
            f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn draw_list(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .todos
            .visible()
            .into_iter()
            .map(|(_, task)| {
                let (mark, style) = if task.checked {
                    (
                        "[x] ",
                        Style::default().fg(GREY).add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    ("[ ] ", Style::default().fg(Color::White))
                };
                ListItem::new(Line::from(vec![
                    Span::raw(mark),
                    Span::styled(task.text.clone(), style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(self.todos.category().label())
                    .borders(Borders::ALL)
                    .border_style(if self.mode == Mode::Normal {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if self.selected_id().is_some() {
            state.select(Some(self.selected));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(message) => Line::from(Span::styled(message.as_str(), Style::default().fg(DELETE))),
            None => {
                let hints = match self.mode {
                    Mode::Normal => {
                        "w/t/Tab list  j/k move  space check  e edit  d delete  i type  q quit"
                    }
                    Mode::Insert => "Enter save  Esc back",
                    Mode::Confirm => "y I'm Sure  n Cancel",
                };
                Line::from(Span::styled(hints, Style::default().fg(GREY)))
            }
        };
        f.render_widget(Paragraph::new(line), area);
    }

    fn draw_confirm(&self, f: &mut Frame) {
        let area = centered(f.area(), 32, 6);
        let lines = vec![
            Line::from("Are you sure?"),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y] I'm Sure", Style::default().fg(DELETE)),
                Span::raw("   "),
                Span::styled("[n] Cancel", Style::default().fg(EDIT)),
            ]),
        ];
        let popup = Paragraph::new(lines).block(
            Block::default()
                .title("Delete ToDo")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(DELETE)),
        );
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

pub fn run_app<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;
        if app.should_quit {
            return Ok(());
        }
        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
}
