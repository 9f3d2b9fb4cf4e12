//! Headless trivia game
//!
//! Reads commands from stdin, one per line, and prints every round event as
//! a JSON line on stdout:
//!
//! ```text
//! pick <answer>   pick or toggle an answer
//! accept          lock in the picks
//! hint            hide two wrong answers
//! restart         start the session over
//! quit            leave
//! ```
//!
//! An optional first argument names a TOML config file. `TRIVIA_*`
//! environment variables override it.

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{info, warn};
use trivia_round::{
    bank::JsonQuestionBank,
    config::GameConfig,
    engine::{Collaborators, Input, RoundEngine},
    logging,
    runtime::GameRuntime,
    score::JsonFileStore,
    submit::HttpScoreSubmitter,
};

fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let input = match words.next()? {
        "pick" => Input::PickAnswer(words.next()?.parse().ok()?),
        "accept" => Input::Accept,
        "hint" => Input::Hint,
        "restart" => Input::Restart,
        "quit" => Input::Quit,
        _ => return None,
    };
    words.next().is_none().then_some(input)
}

fn load_config() -> Result<GameConfig> {
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => GameConfig::default(),
    };
    config
        .with_env_overrides()
        .context("invalid environment override")
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let config = load_config()?;

    let runtime = GameRuntime::new();
    let (submitter, submissions) =
        HttpScoreSubmitter::spawn(reqwest::Client::new(), config.submit_endpoint.clone());
    let mut engine = RoundEngine::new(
        config.clone(),
        Collaborators {
            bank: Box::new(JsonQuestionBank::new(&config.questions_dir)),
            store: Box::new(JsonFileStore::new(&config.highscore_file)),
            submitter: Box::new(submitter),
            scheduler: Box::new(runtime.scheduler()),
        },
    );

    let (events_tx, mut events) = mpsc::unbounded_channel();
    engine.subscribe(events_tx);
    info!(
        highscore = engine.startup_highscore(),
        questions = %config.questions_dir.display(),
        "starting game"
    );

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", event.to_message());
        }
    });

    let handle = runtime.handle();
    let game = runtime.spawn(engine, 1);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_input(&line) else {
            warn!(line, "unknown command");
            continue;
        };
        if !handle.send(input) || input == Input::Quit {
            break;
        }
    }
    drop(handle);

    let engine = game.await.context("game task failed")?;
    let state = serde_json::to_string(&engine.state())?;
    drop(engine);
    printer.await.context("event printer failed")?;
    // the engine held the last submitter, so the queue is closed now
    submissions.await.context("score submitter failed")?;
    println!("{state}");

    Ok(())
}
