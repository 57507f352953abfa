use anyhow::Result;
use touchdown_core::{
    record::BufferedRecorder, Env as _, EpisodeLoop, EpisodeLoopConfig, NullSink, RandomAgent,
};
use touchdown_py_gym_env::{GymEnv, GymEnvConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    fastrand::seed(42);

    let env_config = GymEnvConfig::default()
        .name("LunarLander-v3")
        .render_mode(Some("rgb_array".to_string()));
    let mut env = GymEnv::build(&env_config, 0)?;
    let mut policy = RandomAgent::new(env.n_actions() as u32);
    let mut recorder = BufferedRecorder::new();
    let mut episode_loop =
        EpisodeLoop::<GymEnv>::build(EpisodeLoopConfig::default().target_frame_rate(0))?;

    for _ in 0..2_000 {
        episode_loop.tick(&mut env, &mut policy, &mut NullSink::default(), &mut recorder)?;
    }
    println!("{:?}", episode_loop.counters());

    Ok(())
}
