// src/main.rs
//
// Research-harness CLI for the adaptive difficulty controller.
//
// Drives the controller with a seeded simulated learner:
// - --sessions N practice sessions per category, --game-length questions each
// - Deterministic runs via --seed (controller and learner RNGs derive from it)
// - Optional durable store (--store) and JSONL telemetry (--log-jsonl)
// - Prints a run header and one line per session

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};

use adaptive_difficulty::{
    AdaptiveDifficultyAgent, ControllerConfig, EventSink, FileSink, LearningProfile, NoopSink,
    PracticeSession, SessionLevels, SimLearnerConfig, SimulatedLearner, StoreEvent,
    DEFAULT_GAME_LENGTH,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProfileArg {
    Conservative,
    Balanced,
    Exploratory,
}

#[derive(Debug, Parser)]
#[command(
    name = "adaptive_difficulty",
    about = "Adaptive exercise difficulty controller (simulation harness)",
    version
)]
struct Args {
    /// Practice sessions to run per category.
    #[arg(long, default_value_t = 10)]
    sessions: usize,

    /// Questions per session.
    #[arg(long, default_value_t = DEFAULT_GAME_LENGTH)]
    game_length: usize,

    /// Exercise categories (repeatable).
    #[arg(long = "category", default_values_t = [String::from("math"), String::from("memory")])]
    categories: Vec<String>,

    /// Latent skill of the simulated learner on the 1-5 scale.
    #[arg(long, default_value_t = 3.0)]
    skill: f64,

    /// Exploration preset (default Balanced).
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// Override epsilon from the profile.
    #[arg(long)]
    epsilon: Option<f64>,

    /// Deterministic seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Durable Q-table store. Without it the table lives in memory only.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Optional JSONL path for attempt / store / session telemetry.
    #[arg(long)]
    log_jsonl: Option<PathBuf>,

    /// Verbosity: -v prints every attempt.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn build_sink(log_jsonl: Option<&PathBuf>) -> Result<Box<dyn EventSink>> {
    match log_jsonl {
        Some(path) => {
            let sink = FileSink::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(NoopSink)),
    }
}

fn build_config(args: &Args) -> Result<ControllerConfig> {
    let profile = match args.profile {
        Some(ProfileArg::Conservative) => LearningProfile::Conservative,
        Some(ProfileArg::Balanced) | None => LearningProfile::Balanced,
        Some(ProfileArg::Exploratory) => LearningProfile::Exploratory,
    };

    let mut cfg = ControllerConfig::for_profile(profile);
    if let Some(epsilon) = args.epsilon {
        cfg.epsilon = epsilon;
    }
    if let Some(path) = &args.store {
        cfg.store_path = path.clone();
    }
    cfg.validate().context("Invalid controller configuration")?;

    eprintln!(
        "effective_learning_profile={} epsilon={}",
        profile.as_str(),
        cfg.epsilon
    );
    Ok(cfg)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = build_config(&args)?;
    let mut sink = build_sink(args.log_jsonl.as_ref())?;

    // Controller: durable when --store is given, in-memory otherwise.
    let mut agent = if args.store.is_some() {
        let (agent, status) = AdaptiveDifficultyAgent::open(&cfg, args.seed);
        sink.log_store_event(&StoreEvent::from_load_status(&cfg.store_path, &status));
        eprintln!("store={} status={:?}", cfg.store_path.display(), status);
        agent
    } else {
        AdaptiveDifficultyAgent::new(&cfg, args.seed)
    };

    let learner_cfg = SimLearnerConfig {
        default_skill: args.skill,
        ..SimLearnerConfig::default()
    };
    let mut learner = SimulatedLearner::new(learner_cfg, args.seed.wrapping_add(1));
    let mut levels = SessionLevels::new();

    println!(
        "adaptive_difficulty | cfg={} | policy={} | alpha={} gamma={} epsilon={} | sessions={} x {} | game_length={} | seed={}",
        cfg.version,
        agent.policy().version(),
        cfg.alpha,
        cfg.gamma,
        agent.policy().epsilon(),
        args.sessions,
        args.categories.len(),
        args.game_length,
        args.seed,
    );

    let mut persist_failures = 0usize;
    for round in 0..args.sessions {
        for category in &args.categories {
            let mut session = PracticeSession::start(category, &levels, args.game_length);

            while !session.is_complete() {
                let answer = learner.answer(category, session.current_difficulty());
                let step = session.record_attempt(
                    &mut agent,
                    answer.correct,
                    answer.elapsed_secs,
                    answer.hint_used,
                    sink.as_mut(),
                )?;

                if step.persist_error.is_some() {
                    persist_failures += 1;
                }
                if args.verbose > 0 {
                    println!(
                        "  {} d={} correct={} t={:.1}s hint={} tier={} reward={} action={:?}{} -> d={}",
                        category,
                        step.state.difficulty,
                        answer.correct,
                        answer.elapsed_secs,
                        answer.hint_used,
                        step.tier,
                        step.reward,
                        step.action(),
                        if step.selection.explored { " (explore)" } else { "" },
                        step.next_difficulty,
                    );
                }
            }

            let report = session.finish(&mut levels, sink.as_mut())?;
            println!(
                "session {:>3} | {:<8} | acc={:>5.1}% ({}) | avg_t={:>5.1}s | level={} | score={} | trace={:?}",
                round,
                report.category,
                report.accuracy_percent,
                report.grade,
                report.average_time_secs,
                report.difficulty,
                report.total_score,
                report.difficulty_trace,
            );
        }
    }

    println!(
        "done | q_table_states={} | persist_failures={}",
        agent.table().len(),
        persist_failures
    );
    for (category, level) in levels.iter() {
        println!("  level[{}]={} skill={:.2}", category, level, learner.skill(category));
    }

    Ok(())
}
