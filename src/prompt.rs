use dialoguer::Input;
use std::io;

/// Blocking line prompt, injectable so tests can script the answer.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    /// Shows `message` and returns the line typed by the user.
    fn read_line(&mut self, message: &str) -> io::Result<String>;
}

/// Terminal prompt on stderr.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, message: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(map_dialoguer_err)
    }
}

fn map_dialoguer_err(err: dialoguer::Error) -> io::Error {
    match err {
        dialoguer::Error::IO(e) => e,
    }
}
