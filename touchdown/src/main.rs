use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::path::Path;
use touchdown::{EpisodeLogRecorder, LogRenderer};
use touchdown_core::{
    Agent, CancelToken, Env as _, EpisodeLoop, EpisodeLoopConfig, RandomAgent, StatsSink,
};
use touchdown_py_gym_env::{GymEnv, GymEnvConfig, Sb3Dqn, Sb3DqnConfig};

/// Trains a DQN lander and counts its successful and failed landings.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file of the loop configuration
    #[arg(short, long)]
    config: Option<String>,

    /// YAML file of the DQN hyperparameters
    #[arg(long)]
    dqn_config: Option<String>,

    /// Name of the simulation
    #[arg(long)]
    env_id: Option<String>,

    /// Title of the window
    #[arg(long)]
    title: Option<String>,

    /// Log the counters instead of opening a window
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Number of simulated steps
    #[arg(long)]
    total_steps: Option<usize>,

    /// Where the trained model is saved
    #[arg(long)]
    model_path: Option<String>,

    /// Model to continue training from
    #[arg(long)]
    load_model: Option<String>,

    /// CSV file receiving one row per episode
    #[arg(long)]
    episode_log: Option<String>,

    /// Act uniformly at random instead of training DQN
    #[arg(long, default_value_t = false)]
    random: bool,

    /// Seed of the simulation and the agent
    #[arg(long, default_value_t = 42)]
    seed: i64,
}

fn loop_config(args: &Args) -> Result<EpisodeLoopConfig> {
    let mut config = match &args.config {
        Some(path) => EpisodeLoopConfig::load(path)?,
        None => EpisodeLoopConfig::default(),
    };
    if let Some(v) = &args.env_id {
        config = config.env_id(v.as_str());
    }
    if let Some(v) = &args.title {
        config = config.window_title(v.as_str());
    }
    if let Some(v) = args.total_steps {
        config = config.total_step_budget(v);
    }
    if let Some(v) = &args.model_path {
        config = config.model_path(v.as_str());
    }
    Ok(config)
}

fn dqn_config(args: &Args, config: &EpisodeLoopConfig) -> Result<Sb3DqnConfig> {
    let dqn_config = match &args.dqn_config {
        Some(path) => Sb3DqnConfig::load(path)?,
        None => Sb3DqnConfig::default(),
    };
    Ok(dqn_config
        .env_id(config.env_id.as_str())
        .seed(Some(args.seed)))
}

fn create_agent(
    args: &Args,
    config: &EpisodeLoopConfig,
    env: &GymEnv,
) -> Result<Box<dyn Agent<GymEnv>>> {
    let mut agent: Box<dyn Agent<GymEnv>> = if args.random {
        Box::new(RandomAgent::new(env.n_actions() as u32))
    } else {
        Box::new(Sb3Dqn::build(&dqn_config(args, config)?)?)
    };
    if let Some(path) = &args.load_model {
        agent.load_params(Path::new(path))?;
    }
    Ok(agent)
}

#[cfg(feature = "window")]
fn create_sink(
    args: &Args,
    config: &EpisodeLoopConfig,
    cancel: &CancelToken,
) -> Box<dyn StatsSink> {
    if args.headless {
        Box::new(LogRenderer::new())
    } else {
        Box::new(touchdown::WindowRenderer::new(
            config.window_title.as_str(),
            cancel.clone(),
        ))
    }
}

#[cfg(not(feature = "window"))]
fn create_sink(
    args: &Args,
    _config: &EpisodeLoopConfig,
    _cancel: &CancelToken,
) -> Box<dyn StatsSink> {
    if !args.headless {
        warn!("Built without the window feature, running headless");
    }
    Box::new(LogRenderer::new())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    fastrand::seed(args.seed as u64);

    let config = loop_config(&args)?;
    let mut episode_loop = EpisodeLoop::<GymEnv>::build(config.clone())?;

    let render_mode = if args.headless {
        None
    } else {
        Some("rgb_array".to_string())
    };
    let env_config = GymEnvConfig::default()
        .name(config.env_id.as_str())
        .render_mode(render_mode);
    let mut env = GymEnv::build(&env_config, args.seed)?;
    let mut agent = create_agent(&args, &config, &env)?;

    let cancel = CancelToken::new();
    let mut sink = create_sink(&args, &config, &cancel);
    let mut recorder = match &args.episode_log {
        Some(path) => EpisodeLogRecorder::with_csv(path)?,
        None => EpisodeLogRecorder::new(),
    };

    let summary = episode_loop.run(
        &mut env,
        agent.as_mut(),
        sink.as_mut(),
        &mut recorder,
        &cancel,
    )?;

    if summary.cancelled {
        warn!("Run cancelled after {} steps", summary.env_steps);
    }
    info!(
        "Successful landings: {}, landing failures: {}, episodes: {}",
        summary.success_count, summary.failure_count, summary.episodes
    );

    Ok(())
}
