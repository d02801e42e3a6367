pub mod ai_helper;
pub mod catalog;
pub mod flags;
pub mod game;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}
impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// One round of the quiz: the country whose flag is shown and the four
/// options offered for it. The target is always one of the options.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub target: Country,
    pub options: Vec<Country>,
}
impl Question {
    pub fn is_correct(&self, guess: &Country) -> bool {
        guess.code == self.target.code
    }

    pub fn find_option(&self, text: &str) -> Option<&Country> {
        let text = text.trim();
        self.options.iter().find(|c| c.name.eq_ignore_ascii_case(text))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameStats {
    pub correct: u32,
    pub wrong: u32,
    pub streak: u32,
    pub best_streak: u32,
}
impl GameStats {
    pub fn record_guess(&mut self, is_correct: bool) {
        if is_correct {
            self.correct += 1;
            self.streak += 1;
        } else {
            self.wrong += 1;
            self.streak = 0;
        }
        self.best_streak = self.best_streak.max(self.streak);
    }

    pub fn total(&self) -> u32 {
        self.correct + self.wrong
    }

    /// Share of correct guesses in percent, `None` before the first guess.
    pub fn accuracy(&self) -> Option<u32> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.correct * 100 / total)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Result,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_resets_on_wrong_guess() {
        let mut stats = GameStats::default();
        stats.record_guess(true);
        stats.record_guess(true);
        stats.record_guess(false);
        stats.record_guess(true);

        assert_eq!(stats.correct, 3);
        assert_eq!(stats.wrong, 1);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn accuracy_is_none_before_first_guess() {
        let mut stats = GameStats::default();
        assert_eq!(stats.accuracy(), None);

        stats.record_guess(true);
        stats.record_guess(false);
        stats.record_guess(false);
        assert_eq!(stats.accuracy(), Some(33));
    }

    #[test]
    fn find_option_ignores_case_and_whitespace() {
        let question = Question {
            target: Country::new("fr", "France"),
            options: vec![
                Country::new("de", "Germany"),
                Country::new("fr", "France"),
                Country::new("it", "Italy"),
                Country::new("es", "Spain"),
            ],
        };

        assert_eq!(question.find_option("  france ").map(|c| c.code.as_str()), Some("fr"));
        assert!(question.find_option("Portugal").is_none());
    }
}
