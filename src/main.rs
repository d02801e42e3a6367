mod config;
mod quiz;

use std::sync::Arc;

use chatgpt::{client::ChatGPT, config::ChatGPTEngine};
use config::Config;
use dotenv::dotenv;
use log::{debug, info, warn};
use quiz::{
    ai_helper::{fetch_fact_for, FactError, FactHelper},
    catalog::CountryCatalog,
    flags::{flag_emoji, flag_image_url},
    game::{Game, GameSnapshot},
    GameState, GameStats,
};
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{ChatAction, InputFile, KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    InGame {
        game: Game,
    },
}

type QuizStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine, everything can come from the real environment
    dotenv().ok();

    pretty_env_logger::init();
    info!("Starting flag quiz bot...");

    let config = Config::from_env()?;

    let catalog = match &config.countries_file {
        Some(path) => {
            info!("Loading countries from {}", path.display());
            CountryCatalog::from_json_file(path)?
        }
        None => CountryCatalog::builtin()?,
    };
    info!("Catalog ready with {} countries", catalog.countries().len());

    let bot = Bot::from_env();

    info!("Opening dialogue storage at {}", config.database_path);
    let storage: QuizStorage = SqliteStorage::open(&config.database_path, Json)
        .await?
        .erase();

    let gpt = {
        let mut gpt = ChatGPT::new(&config.chatgpt_api_key)?;

        gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        gpt.config.timeout = config.fact_timeout;

        gpt
    };

    let facts = Arc::new(FactHelper::new(gpt));
    let catalog = Arc::new(catalog);
    let config = Arc::new(config);

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::InGame { game }].endpoint(in_game)),
    )
    .dependencies(dptree::deps![storage, catalog, facts, config])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

const GREETING_TEXT: &str = "Hi! Let's play \"Guess the Flag\". I'll show you a flag and four countries, you pick the right one. Send /stats at any time to see how you're doing.";
const NEXT_FLAG: &str = "Next flag ➡️";
const STATS_COMMAND: &str = "/stats";
const RESTART_COMMAND: &str = "/start";

async fn start(
    bot: Bot,
    dialogue: QuizDialogue,
    catalog: Arc<CountryCatalog>,
    config: Arc<Config>,
    msg: Message,
) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    new_game(Game::new(), &bot, &dialogue, &catalog, &config, msg.chat.id).await
}

async fn new_game(
    mut game: Game,
    bot: &Bot,
    dialogue: &QuizDialogue,
    catalog: &CountryCatalog,
    config: &Config,
    chat_id: ChatId,
) -> HandlerResult {
    game.start(catalog, &mut rand::thread_rng());

    send_question(bot, chat_id, &game, config).await?;
    dialogue.update(State::InGame { game }).await?;
    Ok(())
}

async fn in_game(
    bot: Bot,
    dialogue: QuizDialogue,
    mut game: Game,
    catalog: Arc<CountryCatalog>,
    facts: Arc<FactHelper>,
    config: Arc<Config>,
    msg: Message,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text.trim(),
        None => {
            bot.send_message(msg.chat.id, "Please answer with one of the buttons")
                .await?;
            return Ok(());
        }
    };

    match text {
        RESTART_COMMAND => {
            let fresh = Game::after(&game);
            return new_game(fresh, &bot, &dialogue, &catalog, &config, msg.chat.id).await;
        }
        STATS_COMMAND => {
            bot.send_message(msg.chat.id, stats_text(game.stats())).await?;
            return Ok(());
        }
        _ => {}
    }

    match game.state() {
        // A game saved before its first question was drawn
        GameState::Loading => {
            game.start(&catalog, &mut rand::thread_rng());
            send_question(&bot, msg.chat.id, &game, &config).await?;
            dialogue.update(State::InGame { game }).await?;
        }
        GameState::Playing => {
            let request = match game.submit_guess_by_name(text) {
                Some(request) => request,
                None => {
                    bot.send_message(msg.chat.id, "Pick one of the four countries below")
                        .await?;
                    return Ok(());
                }
            };
            dialogue.update(State::InGame { game: game.clone() }).await?;

            bot.send_message(msg.chat.id, result_text(&game.snapshot()))
                .reply_markup(KeyboardMarkup::new(vec![vec![KeyboardButton::new(NEXT_FLAG)]]))
                .await?;

            // Nice to have, the fact is sent either way
            let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

            let fact = fetch_fact_for(facts.as_ref(), &request).await;
            if game.resolve_fact(&request, Ok::<_, FactError>(fact)) {
                if let Some(fact) = game.fact() {
                    bot.send_message(msg.chat.id, format!("💡 {}", fact)).await?;
                }
                dialogue.update(State::InGame { game }).await?;
            }
        }
        GameState::Result => {
            if text != NEXT_FLAG {
                bot.send_message(msg.chat.id, format!("Press \"{}\" to continue", NEXT_FLAG))
                    .reply_markup(KeyboardMarkup::new(vec![vec![KeyboardButton::new(NEXT_FLAG)]]))
                    .await?;
                return Ok(());
            }
            game.advance_to_next(&catalog, &mut rand::thread_rng());
            send_question(&bot, msg.chat.id, &game, &config).await?;
            dialogue.update(State::InGame { game }).await?;
        }
    }
    Ok(())
}

async fn send_question(bot: &Bot, chat_id: ChatId, game: &Game, config: &Config) -> HandlerResult {
    let question = match game.question() {
        Some(question) => question,
        None => return Ok(()),
    };
    debug!("Round {} for chat {}: {}", game.round(), chat_id, question.target.code);

    let keyboard = KeyboardMarkup::new(
        question
            .options
            .chunks(2)
            .map(|row| {
                row.iter()
                    .map(|country| KeyboardButton::new(country.name.clone()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>(),
    );
    let caption = format!("Flag #{}: which country is this?", game.round());

    let url = flag_image_url(&config.flag_image_url, &question.target.code);
    let sent_photo = match url.parse() {
        Ok(parsed) => match bot
            .send_photo(chat_id, InputFile::url(parsed))
            .caption(caption.clone())
            .reply_markup(keyboard.clone())
            .await
        {
            Ok(_) => true,
            Err(err) => {
                warn!("Could not send flag image {}: {}", url, err);
                false
            }
        },
        Err(err) => {
            warn!("Bad flag image url {:?}: {}", url, err);
            false
        }
    };

    if !sent_photo {
        let flag = flag_emoji(&question.target.code).unwrap_or_else(|| "🏳️".to_string());
        bot.send_message(chat_id, format!("{}\n\n{}", flag, caption))
            .reply_markup(keyboard)
            .await?;
    }
    Ok(())
}

fn result_text(game: &GameSnapshot) -> String {
    let question = match &game.question {
        Some(question) => question,
        None => return String::new(),
    };
    let verdict = match (game.last_guess_correct(), &game.selected) {
        (Some(true), _) => format!("✅ Correct! That's the flag of {}.", question.target.name),
        (_, Some(picked)) => format!(
            "❌ Not quite. You picked {}, but that's the flag of {}.",
            picked.name, question.target.name
        ),
        _ => format!("That's the flag of {}.", question.target.name),
    };
    format!("{}\n\n{}", verdict, stats_text(&game.stats))
}

fn stats_text(stats: &GameStats) -> String {
    let accuracy = match stats.accuracy() {
        Some(percent) => format!("{}%", percent),
        None => "-".to_string(),
    };
    format!(
        "Correct: {} | Wrong: {} | Accuracy: {}\nStreak: {} | Best streak: {}",
        stats.correct, stats.wrong, accuracy, stats.streak, stats.best_streak
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Country;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn stats_text_before_first_guess() {
        let text = stats_text(&GameStats::default());
        assert!(text.contains("Correct: 0 | Wrong: 0 | Accuracy: -"));
    }

    #[test]
    fn result_text_names_both_countries_on_a_miss() {
        let catalog = CountryCatalog::builtin().unwrap();
        let mut game = Game::new();
        game.start(&catalog, &mut StdRng::seed_from_u64(3));

        let question = game.question().unwrap().clone();
        let miss: Country = question
            .options
            .iter()
            .find(|c| c.code != question.target.code)
            .unwrap()
            .clone();
        game.submit_guess(&miss);

        let text = result_text(&game.snapshot());
        assert!(text.starts_with("❌"));
        assert!(text.contains(&miss.name));
        assert!(text.contains(&question.target.name));
        assert!(text.contains("Streak: 0"));
    }

    #[test]
    fn result_text_on_a_hit() {
        let catalog = CountryCatalog::builtin().unwrap();
        let mut game = Game::new();
        game.start(&catalog, &mut StdRng::seed_from_u64(4));

        let target = game.question().unwrap().target.clone();
        game.submit_guess(&target);

        assert!(result_text(&game.snapshot()).starts_with("✅ Correct!"));
    }
}
