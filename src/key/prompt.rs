use std::collections::VecDeque;
use std::io;
use zeroize::Zeroizing;

/// Source of interactively entered passphrases
pub trait PassphrasePrompt {
    /// Show `message` and read one line without echoing it
    fn read_passphrase(&mut self, message: &str) -> io::Result<Zeroizing<String>>;
}

/// Reads from the controlling terminal with echo disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PassphrasePrompt for TerminalPrompt {
    fn read_passphrase(&mut self, message: &str) -> io::Result<Zeroizing<String>> {
        rpassword::prompt_password(message).map(Zeroizing::new)
    }
}

/// Replays a fixed list of answers, for tests and non-interactive callers
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Zeroizing<String>>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers
                .into_iter()
                .map(|a| Zeroizing::new(a.into()))
                .collect(),
            asked: Vec::new(),
        }
    }

    /// Prompt messages shown so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl PassphrasePrompt for ScriptedPrompt {
    fn read_passphrase(&mut self, message: &str) -> io::Result<Zeroizing<String>> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted passphrase left"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompt_replays_in_order() {
        let mut prompt = ScriptedPrompt::new(["one", "two"]);
        assert_eq!(prompt.read_passphrase("first: ").unwrap().as_str(), "one");
        assert_eq!(prompt.read_passphrase("second: ").unwrap().as_str(), "two");
        assert!(prompt.read_passphrase("third: ").is_err());
        assert_eq!(prompt.asked(), &["first: ", "second: ", "third: "]);
    }
}
