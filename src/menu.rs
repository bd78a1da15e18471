//! Line-oriented text menu shown before a game: pick a level, look at the
//! score history or read the guide.

use std::io::{BufRead, Write};

use anyhow::Result;
use crossterm::{cursor, queue, terminal};
use tracing::debug;

use crate::store::ScoreStore;
use crate::Level;

const INVALID_CHOICE: &str = "Your choice invalid. Please enter again!";

const GUIDE: &[&str] = &[
    "*** Instructions ***",
    "1. Controls: Use the arrow keys or WASD to steer the snake, q or Esc to quit.",
    "2. Objective: Eat the food to grow longer. Each piece adds one segment.",
    "3. Avoidance: Don't run into yourself or an obstacle, or the game ends.",
    "4. Scoring: Every piece of food is one point and makes the snake faster.",
    "5. Levels: Easy has no obstacles, Medium walls off the border,",
    "   Hard moves obstacles around every few seconds.",
    "******",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Play(Level),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuState {
    Start,
    Play,
    Score,
    Guide,
    Exit,
}

enum Reply {
    Number(i64),
    Invalid,
    Closed,
}

pub struct Menu<'a, R, W> {
    input: R,
    output: W,
    store: &'a ScoreStore,
    level: Level,
    state: MenuState,
    clear_screen: bool,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(input: R, output: W, store: &'a ScoreStore) -> Self {
        Menu { input, output, store, level: Level::default(), state: MenuState::Start, clear_screen: true }
    }

    /// Leave the screen alone between prompts.
    pub fn without_clearing(mut self) -> Self {
        self.clear_screen = false;
        self
    }

    /// Runs until the player starts a game or exits. Closing the input
    /// counts as exiting.
    pub fn run(mut self) -> Result<MenuOutcome> {
        loop {
            debug!(state = ?self.state, "menu");
            match self.state {
                MenuState::Start => self.main_menu()?,
                MenuState::Play => {
                    if let Some(level) = self.play_menu()? {
                        return Ok(MenuOutcome::Play(level));
                    }
                }
                MenuState::Score => self.score_menu()?,
                MenuState::Guide => self.guide()?,
                MenuState::Exit => {
                    writeln!(self.output, "Game exit!")?;
                    return Ok(MenuOutcome::Exit);
                }
            }
        }
    }

    fn main_menu(&mut self) -> Result<()> {
        writeln!(self.output, "*** Menu game ***")?;
        writeln!(self.output, "1. Play new game")?;
        writeln!(self.output, "2. View Score")?;
        writeln!(self.output, "3. Guide play game")?;
        writeln!(self.output, "4. Exit game")?;

        self.state = match self.prompt_choice()? {
            Reply::Number(1) => MenuState::Play,
            Reply::Number(2) => MenuState::Score,
            Reply::Number(3) => MenuState::Guide,
            Reply::Number(4) | Reply::Closed => MenuState::Exit,
            _ => {
                writeln!(self.output, "{}", INVALID_CHOICE)?;
                MenuState::Start
            }
        };
        Ok(())
    }

    fn play_menu(&mut self) -> Result<Option<Level>> {
        writeln!(self.output, "*** Menu play game ***")?;
        writeln!(self.output, "1. Play game ({})", self.level)?;
        writeln!(self.output, "2. Play the game with the selected difficulty")?;
        writeln!(self.output, "3. Back to menu")?;

        match self.prompt_choice()? {
            Reply::Number(1) => {
                writeln!(self.output, "Game start now ---------------->")?;
                Ok(Some(self.level))
            }
            Reply::Number(2) => match self.choose_level()? {
                Some(level) => {
                    self.level = level;
                    writeln!(self.output, "Game start ---------------->")?;
                    Ok(Some(level))
                }
                None => {
                    self.state = MenuState::Exit;
                    Ok(None)
                }
            },
            Reply::Number(3) => {
                self.state = MenuState::Start;
                Ok(None)
            }
            Reply::Closed => {
                self.state = MenuState::Exit;
                Ok(None)
            }
            _ => {
                writeln!(self.output, "{}", INVALID_CHOICE)?;
                Ok(None)
            }
        }
    }

    /// Asks until a level number is entered; `None` if the input closes.
    fn choose_level(&mut self) -> Result<Option<Level>> {
        writeln!(self.output, "There are 3 difficulty levels: Easy, Medium, Hard.")?;
        write!(self.output, "Enter a number from 1 to 3 corresponding to the 3 levels: ")?;
        self.output.flush()?;

        loop {
            match self.read_reply()? {
                Reply::Number(n) => {
                    if let Some(level) = Level::from_number(n) {
                        writeln!(self.output, "You choice level: {}", level)?;
                        return Ok(Some(level));
                    }
                }
                Reply::Invalid => {}
                Reply::Closed => return Ok(None),
            }
            write!(self.output, "You enter level invalid. Please enter again: ")?;
            self.output.flush()?;
        }
    }

    fn score_menu(&mut self) -> Result<()> {
        writeln!(self.output, "*** Menu score ***")?;
        writeln!(self.output, "1. View all score")?;
        writeln!(self.output, "2. View maximum score")?;
        writeln!(self.output, "3. Back to menu")?;

        match self.prompt_choice()? {
            Reply::Number(1) => {
                self.print_all_scores()?;
                self.wait_for_enter()?;
            }
            Reply::Number(2) => {
                self.print_best_scores()?;
                self.wait_for_enter()?;
            }
            Reply::Number(3) => self.state = MenuState::Start,
            Reply::Closed => self.state = MenuState::Exit,
            _ => writeln!(self.output, "{}", INVALID_CHOICE)?,
        }
        Ok(())
    }

    fn print_all_scores(&mut self) -> Result<()> {
        writeln!(self.output, "*** Score ***")?;
        for (index, (name, record)) in self.store.read_all().iter().enumerate() {
            writeln!(self.output, "{}. {}", index, name)?;
            for level in Level::ALL.iter() {
                let history = record.get(level.name()).cloned().unwrap_or_default();
                writeln!(self.output, "- {}:", level)?;
                writeln!(self.output, "\tScore:{}", serde_json::to_string(&history.score)?)?;
                writeln!(self.output, "\tSize:{}", serde_json::to_string(&history.size)?)?;
            }
        }
        writeln!(self.output, "******")?;
        Ok(())
    }

    fn print_best_scores(&mut self) -> Result<()> {
        writeln!(self.output, "*** Maximum Score ***")?;
        for level in Level::ALL.iter() {
            writeln!(self.output, "- {}: {}", level, self.store.best_score(*level))?;
        }
        writeln!(self.output, "******")?;
        Ok(())
    }

    fn guide(&mut self) -> Result<()> {
        for line in GUIDE {
            writeln!(self.output, "{}", line)?;
        }
        self.wait_for_enter()
    }

    /// Returns to the main menu once a line (or end of input) is read.
    fn wait_for_enter(&mut self) -> Result<()> {
        writeln!(self.output, "Press Enter to go back to the menu ...")?;
        self.output.flush()?;
        let state = match self.read_reply()? {
            Reply::Closed => MenuState::Exit,
            _ => MenuState::Start,
        };
        self.clear()?;
        self.state = state;
        Ok(())
    }

    fn prompt_choice(&mut self) -> Result<Reply> {
        write!(self.output, "Enter your choice: ")?;
        self.output.flush()?;
        let reply = self.read_reply()?;
        self.clear()?;
        Ok(reply)
    }

    fn read_reply(&mut self) -> Result<Reply> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Reply::Closed);
        }
        Ok(match line.trim().parse() {
            Ok(n) => Reply::Number(n),
            Err(_) => Reply::Invalid,
        })
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            queue!(self.output, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
            self.output.flush()?;
        }
        Ok(())
    }
}
