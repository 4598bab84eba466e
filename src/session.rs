//! Menu state machine for the interactive inspector.
//!
//! The session only turns lines of input into [`Command`]s; performing them
//! is left to the caller, so the menu can be driven without a terminal.

use crate::error::RomError;
use crate::inspect::parse_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    AwaitingChoice,
    AwaitingAddress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowDump,
    ExportDump,
    PromptAddress,
    LaunchEmulator,
    Quit,
    Lookup(i64),
    LeaveAddressMode,
    InvalidChoice(String),
    InvalidAddress(String),
    Ignored,
}

pub const MENU: [&str; 5] = [
    "[1] Show complete ROM contents",
    "[2] Create HEX file",
    "[3] Show specific address",
    "[4] Start game in emulator",
    "[5] Exit",
];

#[derive(Debug)]
pub struct Session {
    state: MenuState,
}

impl Default for Session {
    fn default() -> Session {
        Session {
            state: MenuState::Idle,
        }
    }
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == MenuState::Done
    }

    pub fn start(&mut self) {
        if self.state == MenuState::Idle {
            self.state = MenuState::AwaitingChoice;
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self.state {
            MenuState::AwaitingChoice => "Please enter selection (1/2/3/4/5): ",
            MenuState::AwaitingAddress => {
                "Enter an address (hex, e.g. 0x00001000) or 'exit' to cancel: "
            }
            MenuState::Idle | MenuState::Done => "",
        }
    }

    pub fn handle(&mut self, input: &str) -> Command {
        let input = input.trim();
        match self.state {
            MenuState::AwaitingChoice => match input {
                "1" => Command::ShowDump,
                "2" => Command::ExportDump,
                "3" => {
                    self.state = MenuState::AwaitingAddress;
                    Command::PromptAddress
                }
                "4" => Command::LaunchEmulator,
                "5" => {
                    self.state = MenuState::Done;
                    Command::Quit
                }
                other => Command::InvalidChoice(other.to_string()),
            },
            MenuState::AwaitingAddress => {
                if input.eq_ignore_ascii_case("exit") {
                    self.state = MenuState::AwaitingChoice;
                    return Command::LeaveAddressMode;
                }
                match parse_address(input) {
                    Ok(address) => Command::Lookup(address),
                    Err(RomError::InvalidInput(text)) => Command::InvalidAddress(text),
                    Err(_) => Command::InvalidAddress(input.to_string()),
                }
            }
            MenuState::Idle | MenuState::Done => Command::Ignored,
        }
    }

    /// Input ran out.
    pub fn end_of_input(&mut self) -> Command {
        match self.state {
            MenuState::Done => Command::Ignored,
            _ => {
                self.state = MenuState::Done;
                Command::Quit
            }
        }
    }
}
