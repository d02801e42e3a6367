use log::{debug, warn};
use rand::Rng;

use crate::quiz::catalog::CountryCatalog;
use crate::quiz::flags::generate_question;
use crate::quiz::{Country, GameState, GameStats, Question};

/// Issued by a successful guess. A fact can only be stored through the
/// request it belongs to, and only while its round is still current.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FactRequest {
    pub round: u64,
    pub country_name: String,
    pub was_correct: bool,
}

/// Owned copy of everything the presentation layer needs to draw the game.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameSnapshot {
    pub state: GameState,
    pub round: u64,
    pub question: Option<Question>,
    pub selected: Option<Country>,
    pub stats: GameStats,
    pub fact: Option<String>,
    pub fact_loading: bool,
}

impl GameSnapshot {
    /// Whether the last guess hit the target. `None` outside of `Result`.
    pub fn last_guess_correct(&self) -> Option<bool> {
        if self.state != GameState::Result {
            return None;
        }
        let question = self.question.as_ref()?;
        self.selected.as_ref().map(|guess| question.is_correct(guess))
    }
}

/// Single-player game flow: `Loading -> Playing -> Result -> Playing -> ...`
///
/// Transitions that don't apply to the current state are ignored rather than
/// reported, since they are just stray input from the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Game {
    state: GameState,
    round: u64,
    question: Option<Question>,
    selected: Option<Country>,
    stats: GameStats,
    fact: Option<String>,
    fact_loading: bool,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh game with zeroed stats that keeps counting rounds from
    /// `previous`, so requests issued by the old game never match a new round.
    pub fn after(previous: &Game) -> Self {
        Self {
            round: previous.round,
            ..Self::default()
        }
    }

    pub fn start<R: Rng + ?Sized>(&mut self, catalog: &CountryCatalog, rng: &mut R) {
        if self.state != GameState::Loading {
            return;
        }
        self.next_question(catalog, rng);
    }

    /// Scores `guess` against the current target. Returns the fact request to
    /// run for this round, or `None` if the guess was not accepted.
    pub fn submit_guess(&mut self, guess: &Country) -> Option<FactRequest> {
        if self.state != GameState::Playing {
            return None;
        }
        let question = self.question.as_ref()?;

        let was_correct = question.is_correct(guess);
        let country_name = question.target.name.clone();
        self.stats.record_guess(was_correct);
        self.selected = Some(guess.clone());
        self.state = GameState::Result;
        self.fact = None;
        self.fact_loading = true;

        debug!(
            "Round {}: guessed {} for {}, correct: {}",
            self.round, guess.code, question.target.code, was_correct
        );

        Some(FactRequest {
            round: self.round,
            country_name,
            was_correct,
        })
    }

    /// Like [`Game::submit_guess`], for a reply that should name one of the
    /// current options. Text matching no option is ignored.
    pub fn submit_guess_by_name(&mut self, text: &str) -> Option<FactRequest> {
        let guess = self.question.as_ref()?.find_option(text)?.clone();
        self.submit_guess(&guess)
    }

    /// Stores the outcome of `request`. Returns `false` when the request is
    /// stale (the player has moved on) or was already resolved.
    pub fn resolve_fact<E: std::fmt::Display>(
        &mut self,
        request: &FactRequest,
        outcome: Result<String, E>,
    ) -> bool {
        if request.round != self.round || !self.fact_loading {
            warn!(
                "Dropping fact for round {} (current round {})",
                request.round, self.round
            );
            return false;
        }

        let fact = match outcome {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback_fact(&request.country_name, request.was_correct),
            Err(err) => {
                warn!("Fact about {} unavailable: {}", request.country_name, err);
                fallback_fact(&request.country_name, request.was_correct)
            }
        };
        self.fact = Some(fact);
        self.fact_loading = false;
        true
    }

    pub fn advance_to_next<R: Rng + ?Sized>(&mut self, catalog: &CountryCatalog, rng: &mut R) {
        if self.state != GameState::Result {
            return;
        }
        self.next_question(catalog, rng);
    }

    fn next_question<R: Rng + ?Sized>(&mut self, catalog: &CountryCatalog, rng: &mut R) {
        self.question = Some(generate_question(catalog, rng));
        self.round += 1;
        self.selected = None;
        self.fact = None;
        self.fact_loading = false;
        self.state = GameState::Playing;
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn fact(&self) -> Option<&str> {
        self.fact.as_deref()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state,
            round: self.round,
            question: self.question.clone(),
            selected: self.selected.clone(),
            stats: self.stats,
            fact: self.fact.clone(),
            fact_loading: self.fact_loading,
        }
    }
}

pub fn fallback_fact(country_name: &str, was_correct: bool) -> String {
    if was_correct {
        format!("Well done! No fun fact about {} this time, but the next flag is waiting.", country_name)
    } else {
        format!("That flag belongs to {}. No fun fact this time, keep going!", country_name)
    }
}
