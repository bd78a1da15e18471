use crate::game::{Controller, Renderer};
use crate::snake::{Direction, Snake};
use crate::Position;
use std::{convert::TryFrom, io::{Stdout, Write, stdout}, time::Duration};

use anyhow::anyhow;

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, read, poll};

const GAME_TITLE: &str = "Snake";

/// Terminal columns used per grid cell, so cells look roughly square.
pub const CELL_WIDTH: u16 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Cell {
    Empty,
    Food,
    Obstacle,
    Body,
    Head(char),
    Dead,
}

impl Cell {
    fn glyph(self) -> String {
        match self {
            Cell::Empty => "  ".to_string(),
            Cell::Food => "()".to_string(),
            Cell::Obstacle => "▓▓".to_string(),
            Cell::Body => "██".to_string(),
            Cell::Head(ch) => format!("{}{}", ch, ch),
            Cell::Dead => "XX".to_string(),
        }
    }
}

/// Draws the grid inside a border, with a status line below it. Keeps what
/// is on screen so each frame only re-emits the cells that changed.
pub struct TermManager {
    grid_width: u16,
    grid_height: u16,
    stdout: Stdout,
    screen: Vec<Cell>,
    status: String,
}

impl TermManager {
    /// Fails when the grid plus border and status line would not fit in
    /// terminal coordinates.
    pub fn new(grid_width: usize, grid_height: usize) -> anyhow::Result<Self> {
        let (width, height) = u16::try_from(grid_width)
            .ok()
            .zip(u16::try_from(grid_height).ok())
            .filter(|(w, h)| {
                w.checked_mul(CELL_WIDTH).and_then(|w| w.checked_add(2)).is_some()
                    && h.checked_add(3).is_some()
            })
            .ok_or_else(|| anyhow!("grid {}x{} is too large for a terminal", grid_width, grid_height))?;

        let screen = vec![Cell::Empty; grid_width * grid_height];
        Ok(TermManager {
            grid_width: width,
            grid_height: height,
            stdout: stdout(),
            screen,
            status: String::new(),
        })
    }

    /// Terminal size needed to show the whole grid, border and status line.
    pub fn required_size(&self) -> (u16, u16) {
        (self.grid_width * CELL_WIDTH + 2, self.grid_height + 3)
    }

    pub fn get_terminal_size(&self) -> crossterm::Result<(u16, u16)> {
        terminal::size()
    }

    pub fn setup(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, SetTitle(GAME_TITLE))?;
        self.clear()?;
        self.draw_borders()
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn draw_borders(&mut self) -> crossterm::Result<()> {
        let width = self.grid_width * CELL_WIDTH + 2;
        let height = self.grid_height + 2;
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            queue!(self.stdout, cursor::MoveTo(x, 0), style::Print(ch))?;
            queue!(self.stdout, cursor::MoveTo(x, end_y), style::Print(ch))?;
        }

        for y in 1..end_y {
            queue!(self.stdout, cursor::MoveTo(0, y), style::Print('|'))?;
            queue!(self.stdout, cursor::MoveTo(end_x, y), style::Print('|'))?;
        }

        self.flush()
    }

    pub fn print_status(&mut self, text: &str) -> crossterm::Result<()> {
        if self.status == text {
            return Ok(());
        }

        let y = self.grid_height + 2;
        queue!(
            self.stdout,
            cursor::MoveTo(0, y),
            terminal::Clear(ClearType::CurrentLine),
            style::Print(text)
        )?;
        self.status = text.to_string();
        self.flush()
    }

    pub fn clear(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![Cell::Empty; self.screen.len()];
        self.status.clear();
        Ok(())
    }

    pub fn flush(&mut self) -> crossterm::Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Position) -> Option<usize> {
        let (w, h) = (self.grid_width as i32, self.grid_height as i32);
        if pos.x < 0 || pos.y < 0 || pos.x >= w || pos.y >= h {
            return None;
        }
        Some((pos.y * w + pos.x) as usize)
    }

    fn print_cell(&mut self, idx: usize, cell: Cell) -> crossterm::Result<()> {
        let x = (idx % self.grid_width as usize) as u16 * CELL_WIDTH + 1;
        let y = (idx / self.grid_width as usize) as u16 + 1;
        queue!(self.stdout, cursor::MoveTo(x, y), style::Print(cell.glyph()))?;
        self.screen[idx] = cell;
        Ok(())
    }

    fn compose(&self, snake: &Snake, food: Position, obstacles: &[Position]) -> Vec<Cell> {
        let mut frame = vec![Cell::Empty; self.screen.len()];
        let mut put = |pos: Position, cell: Cell| {
            if let Some(i) = self.index(pos) {
                frame[i] = cell;
            }
        };

        for pos in obstacles {
            put(*pos, Cell::Obstacle);
        }
        put(food, Cell::Food);
        for pos in snake.body() {
            put(*pos, Cell::Body);
        }
        let head = if snake.is_alive() { Cell::Head(snake.head_char()) } else { Cell::Dead };
        put(snake.head(), head);

        frame
    }
}

impl Renderer for TermManager {
    fn render(&mut self, snake: &Snake, food: Position, obstacles: &[Position]) -> anyhow::Result<()> {
        let frame = self.compose(snake, food, obstacles);

        for (idx, cell) in frame.into_iter().enumerate() {
            if self.screen[idx] != cell {
                self.print_cell(idx, cell)?;
            }
        }
        self.flush()?;

        if !snake.is_alive() {
            self.print_status("Game over! Press q or Esc to quit.")?;
        }
        Ok(())
    }

    fn update_window_title(&mut self, score: u32, fps: u32) -> anyhow::Result<()> {
        let title = format!("{} Score: {} FPS: {}", GAME_TITLE, score, fps);
        execute!(self.stdout, SetTitle(title.as_str()))?;
        if self.status.starts_with("Game over") {
            return Ok(());
        }
        self.print_status(&format!("Score: {}  FPS: {}", score, fps))?;
        Ok(())
    }
}

/// Non-blocking keyboard input: arrows or WASD steer, q, Esc or Ctrl+C quit.
#[derive(Debug, Default)]
pub struct TermInput;

impl TermInput {
    pub fn read_key_events_queue(&self) -> crossterm::Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }
}

impl Controller for TermInput {
    fn handle_input(&mut self, running: &mut bool, snake: &mut Snake) -> anyhow::Result<()> {
        for key_ev in self.read_key_events_queue()? {
            apply_key(&key_ev, running, snake);
        }
        Ok(())
    }
}

/// Applies one key press to the running flag and the snake's heading.
pub fn apply_key(key_ev: &KeyEvent, running: &mut bool, snake: &mut Snake) {
    match key_ev {
        ev if is_ctrl_c(ev) => *running = false,
        KeyEvent { code, modifiers: _ } => match code {
            KeyCode::Char('w') | KeyCode::Up => snake.set_direction(Direction::Up),
            KeyCode::Char('a') | KeyCode::Left => snake.set_direction(Direction::Left),
            KeyCode::Char('s') | KeyCode::Down => snake.set_direction(Direction::Down),
            KeyCode::Char('d') | KeyCode::Right => snake.set_direction(Direction::Right),
            KeyCode::Char('q') | KeyCode::Esc => *running = false,
            _ => {}
        }
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
