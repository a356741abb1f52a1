use std::io::{Stdout, Write, stdout};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, read, poll};

use serpent::game::{Frame, Input, RenderSink};
use serpent::snake::Direction;
use serpent::Grid;

type TermCoords = (u16, u16);

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

/// What a key press asks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Game(Input),
    Quit,
}

pub fn key_command(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    let cmd = match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Command::Game(Input::Direction(Direction::Up)),
        KeyCode::Char('a') | KeyCode::Left => Command::Game(Input::Direction(Direction::Left)),
        KeyCode::Char('s') | KeyCode::Down => Command::Game(Input::Direction(Direction::Down)),
        KeyCode::Char('d') | KeyCode::Right => Command::Game(Input::Direction(Direction::Right)),
        KeyCode::Char(' ') => Command::Game(Input::Restart),
        KeyCode::Char('q') => Command::Quit,
        _ => return None,
    };

    Some(cmd)
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: TermCoords,
    width: u16,
    height: u16,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error disabling raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking).context("Error showing cursor")?;
        execute!(self.stdout, LeaveAlternateScreen).context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn size(&self) -> TermCoords {
        (self.width, self.height)
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("Error reading key")? {
                return Ok(ev);
            }
        }
    }

    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1)).context("Error polling events")? {
            if let Event::Key(ev) = read().context("Error reading key")? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Frame of `width × height` terminal cells anchored at the top left.
    pub fn draw_borders(&mut self, width: u16, height: u16) -> Result<()> {
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    /// Centers the message on `center`.
    pub fn show_message(&mut self, lines: &[&str], center: TermCoords) -> Result<()> {
        self.hide_message()?;

        let msg_height = (lines.len() + 2) as u16;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as u16;
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as u16, y), ch)?;
            }
        }

        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Put back whatever the message was covering
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(ch) = self.screen_at((x, y)) {
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn print_at(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("Error printing")?;
        if let Some(idx) = self.index(pos) {
            self.screen[idx] = ch;
        }
        Ok(())
    }

    /// Like `print_at`, but skips the write when the cell already shows `ch`.
    pub fn put(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        if self.screen_at(pos) == Some(ch) {
            return Ok(());
        }
        self.print_at(pos, ch)
    }

    pub fn print_str_at(&mut self, pos: TermCoords, text: &str) -> Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.put((pos.0 + i as u16, pos.1), ch)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: TermCoords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn screen_at(&self, pos: TermCoords) -> Option<char> {
        self.index(pos).map(|idx| self.screen[idx])
    }

    fn print_at_no_save(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        // Messages don't go into the buffer so hiding them can restore it
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("Error printing")?;
        Ok(())
    }
}

/// Draws frames of one grid inside a border, score line underneath.
pub struct TermRenderer {
    term: TermManager,
    grid: Grid,
    canvas: Vec<char>,
}

impl TermRenderer {
    pub fn new(term: TermManager, grid: Grid) -> Result<Self> {
        let (need_w, need_h) = board_size(grid);
        let (w, h) = term.size();
        if w < need_w || h < need_h + 1 {
            bail!("Terminal is {}x{}, the game needs at least {}x{}", w, h, need_w, need_h + 1);
        }

        let canvas = vec![' '; grid.cells()];
        Ok(TermRenderer { term, grid, canvas })
    }

    pub fn term(&mut self) -> &mut TermManager {
        &mut self.term
    }

    pub fn setup(&mut self) -> Result<()> {
        self.term.setup()?;
        self.reset_board()
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()
    }

    pub fn reset_board(&mut self) -> Result<()> {
        let (w, h) = board_size(self.grid);
        self.term.clear()?;
        self.term.draw_borders(w, h)
    }

    /// Returns false if the player asked to quit instead of starting.
    pub fn show_intro(&mut self) -> Result<bool> {
        self.message(&[
            "Arrow keys or WASD to move",
            "Space to restart",
            "q or CTRL+C to quit",
            "",
            "Press any key to begin"
        ])?;

        let key = self.term.read_key_blocking()?;
        self.term.hide_message()?;

        Ok(!matches!(key_command(&key), Some(Command::Quit)))
    }

    fn message(&mut self, lines: &[&str]) -> Result<()> {
        let (w, h) = board_size(self.grid);
        self.term.show_message(lines, (w / 2, h / 2))
    }

    fn paint(&mut self, frame: &Frame<'_>) {
        let width = self.grid.width as usize;
        for cell in self.canvas.iter_mut() {
            *cell = ' ';
        }

        if self.grid.contains(frame.food) {
            self.canvas[frame.food.1 as usize * width + frame.food.0 as usize] = APPLE_CHAR;
        }

        let head_char = head_char(frame.direction);

        // Tail first so the head wins when it overlaps the body
        for (i, pos) in frame.body.iter().enumerate().rev() {
            if !self.grid.contains(*pos) {
                continue;
            }

            let ch = if frame.over {
                DEAD_SNAKE_CHAR
            } else if i == 0 {
                head_char
            } else {
                SNAKE_BODY_CHAR
            };
            self.canvas[pos.1 as usize * width + pos.0 as usize] = ch;
        }
    }
}

impl RenderSink for TermRenderer {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        if self.term.has_message() {
            self.term.hide_message()?;
        }

        self.paint(frame);

        let width = self.grid.width as usize;
        for idx in 0..self.canvas.len() {
            let pos = ((idx % width) as u16 + 1, (idx / width) as u16 + 1);
            self.term.put(pos, self.canvas[idx])?;
        }

        let (_, h) = board_size(self.grid);
        self.term.print_str_at((0, h), &format!("Score: {:<6}", frame.score))?;
        self.term.flush()?;

        if frame.over {
            self.message(&[
                "Game Over",
                &*format!("Score: {}", frame.score),
                "",
                "Press SPACE to restart,",
                "or CTRL+C to quit."
            ])?;
        }

        Ok(())
    }
}

fn head_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

/// Terminal cells taken by the grid plus its border.
fn board_size(grid: Grid) -> TermCoords {
    (grid.width as u16 + 2, grid.height as u16 + 2)
}
