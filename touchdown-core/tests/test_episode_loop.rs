use anyhow::Result;
use touchdown_core::{
    dummy::{ScriptedAgent, ScriptedEnv, ScriptedEnvConfig, ScriptedStep},
    record::{BufferedRecorder, NullRecorder},
    CancelToken, DebounceEvent, DiscreteAct, Env, EpisodeLoop, EpisodeLoopConfig, EpisodeOutcome,
    FuelConfig, LanderObs, LoopPhase, StatsSink, SuccessThresholds, TickPayload,
};

/// Counts touchdowns up to 0.1 above the ground as landed.
fn loop_config() -> EpisodeLoopConfig {
    EpisodeLoopConfig::default()
        .target_frame_rate(0)
        .model_path("dqn_test")
        .success_thresholds(SuccessThresholds {
            height: 0.1,
            ..Default::default()
        })
}

fn touchdown() -> LanderObs {
    LanderObs {
        y: 0.05,
        vx: 0.05,
        vy: 0.1,
        angle: 0.05,
        left_leg_contact: true,
        ..Default::default()
    }
}

fn crash() -> LanderObs {
    LanderObs {
        y: 0.0,
        vy: -3.0,
        ..Default::default()
    }
}

fn hover() -> LanderObs {
    LanderObs {
        y: 1.0,
        ..Default::default()
    }
}

/// Remembers every payload and cancels the run after a number of ticks.
#[derive(Default)]
struct SpySink {
    labels: Vec<[String; 3]>,
    frames: Vec<Option<(u32, u32)>>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl StatsSink for SpySink {
    fn publish(&mut self, payload: &TickPayload) -> Result<()> {
        self.labels.push(payload.overlay_labels());
        self.frames.push(payload.frame.map(|f| f.dimensions()));
        if let Some((n, token)) = &self.cancel_after {
            if self.labels.len() >= *n {
                token.cancel();
            }
        }
        Ok(())
    }
}

#[test]
fn test_fuel_exhaustion_forces_neutral_action() -> Result<()> {
    let config = loop_config().fuel(FuelConfig::default().capacity(3.0).depletion_rate(1.0));
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
    let mut agent = ScriptedAgent::new(2);
    let mut sink = SpySink::default();
    let mut lp = EpisodeLoop::build(config)?;

    let mut forced = vec![];
    for _ in 0..5 {
        let report = lp.tick(&mut env, &mut agent, &mut sink, &mut NullRecorder {})?;
        forced.push(report.forced_neutral);
    }

    assert_eq!(forced, vec![false, false, false, true, true]);
    assert_eq!(
        env.acts(),
        &[
            DiscreteAct(2),
            DiscreteAct(2),
            DiscreteAct(2),
            DiscreteAct(0),
            DiscreteAct(0)
        ]
    );
    assert_eq!(agent.n_predicts(), 3);
    assert_eq!(lp.fuel().remaining(), 0.0);
    assert_eq!(sink.labels[4][2], "Fuel: 0.00 s");
    Ok(())
}

#[test]
fn test_fuel_refilled_at_episode_boundary() -> Result<()> {
    let config = loop_config().fuel(FuelConfig::default().capacity(2.0).depletion_rate(1.0));
    let steps = vec![
        ScriptedStep::flying(hover()),
        ScriptedStep::flying(hover()),
        ScriptedStep::truncated(hover()),
        ScriptedStep::flying(hover()),
    ];
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().steps(steps), 0)?;
    let mut agent = ScriptedAgent::new(1);
    let mut recorder = BufferedRecorder::new();
    let mut lp = EpisodeLoop::build(config)?;

    let mut reports = vec![];
    for _ in 0..4 {
        reports.push(lp.tick(&mut env, &mut agent, &mut SpySink::default(), &mut recorder)?);
    }

    // Exhausted on the third step of the first episode, full again after the reset
    assert!(reports[2].forced_neutral);
    assert!(reports[2].is_done);
    assert_eq!(reports[2].fuel_after_step, 0.0);
    assert!(!reports[3].forced_neutral);
    assert_eq!(reports[3].fuel_after_step, 1.0);

    assert_eq!(env.n_resets(), 2);
    assert_eq!(lp.episodes(), 1);
    assert_eq!(lp.phase(), LoopPhase::Running);

    let episodes: Vec<_> = recorder.with_key("episode_length").collect();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].get_scalar("episode_length")?, 3.0);
    assert_eq!(episodes[0].get_scalar("forced_neutral_steps")?, 1.0);
    assert_eq!(episodes[0].get_string("outcome")?, "ongoing");
    Ok(())
}

#[test]
fn test_success_committed_after_window() -> Result<()> {
    let config = loop_config().debounce_window(3);
    let steps = vec![
        ScriptedStep::terminal(touchdown()),
        ScriptedStep::flying(hover()),
        ScriptedStep::flying(hover()),
        ScriptedStep::terminal(touchdown()),
    ];
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().steps(steps), 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut sink = SpySink::default();
    let mut lp = EpisodeLoop::build(config)?;

    let mut events = vec![];
    for _ in 0..4 {
        let report = lp.tick(&mut env, &mut agent, &mut sink, &mut NullRecorder {})?;
        events.push(report.debounce);
    }

    assert_eq!(
        events,
        vec![
            DebounceEvent::Started,
            DebounceEvent::Counting,
            DebounceEvent::Counting,
            DebounceEvent::Committed
        ]
    );
    // The count changes on the fourth tick only
    assert_eq!(sink.labels[2][0], "Successful landings: 0");
    assert_eq!(sink.labels[3][0], "Successful landings: 1");
    assert_eq!(lp.counters().success_count, 1);
    assert_eq!(lp.counters().failure_count, 0);
    assert!(!lp.debouncer().is_pending());
    Ok(())
}

#[test]
fn test_failure_counted_and_cancels_pending_success() -> Result<()> {
    let config = loop_config().debounce_window(5);
    let steps = vec![
        ScriptedStep::terminal(touchdown()),
        ScriptedStep::terminal(crash()),
    ];
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().steps(steps), 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut sink = SpySink::default();
    let mut lp = EpisodeLoop::build(config)?;

    let first = lp.tick(&mut env, &mut agent, &mut sink, &mut NullRecorder {})?;
    assert_eq!(first.outcome, EpisodeOutcome::Success);
    assert!(lp.debouncer().is_pending());

    let second = lp.tick(&mut env, &mut agent, &mut sink, &mut NullRecorder {})?;
    assert_eq!(second.outcome, EpisodeOutcome::Failure);
    assert_eq!(second.debounce, DebounceEvent::Cancelled);
    assert!(!lp.debouncer().is_pending());
    assert_eq!(lp.counters().failure_count, 1);
    assert_eq!(lp.counters().success_count, 0);
    assert_eq!(sink.labels[1][1], "Landing failures: 1");
    Ok(())
}

#[test]
fn test_non_terminal_touchdown_is_not_classified() -> Result<()> {
    let steps = vec![ScriptedStep::flying(touchdown()), ScriptedStep::flying(crash())];
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().steps(steps), 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut lp = EpisodeLoop::build(loop_config())?;

    for _ in 0..2 {
        let report = lp.tick(&mut env, &mut agent, &mut SpySink::default(), &mut NullRecorder {})?;
        assert_eq!(report.outcome, EpisodeOutcome::Ongoing);
        assert_eq!(report.debounce, DebounceEvent::Idle);
    }
    assert_eq!(lp.counters().failure_count, 0);
    Ok(())
}

#[test]
fn test_hovering_touchdown_is_not_a_success_by_default() -> Result<()> {
    let config = EpisodeLoopConfig::default().target_frame_rate(0);
    let steps = vec![ScriptedStep::terminal(touchdown())];
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().steps(steps), 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut lp = EpisodeLoop::build(config)?;

    let report = lp.tick(&mut env, &mut agent, &mut SpySink::default(), &mut NullRecorder {})?;
    assert_eq!(report.outcome, EpisodeOutcome::Ongoing);
    assert_eq!(report.debounce, DebounceEvent::Idle);
    assert!(!lp.debouncer().is_pending());
    Ok(())
}

#[test]
fn test_truncated_crash_is_counted() -> Result<()> {
    let steps = vec![ScriptedStep::truncated(crash()), ScriptedStep::flying(hover())];
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().steps(steps), 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut sink = SpySink::default();
    let mut lp = EpisodeLoop::build(loop_config())?;

    let report = lp.tick(&mut env, &mut agent, &mut sink, &mut NullRecorder {})?;
    assert!(report.is_done);
    assert_eq!(report.outcome, EpisodeOutcome::Failure);
    assert_eq!(lp.counters().failure_count, 1);
    assert_eq!(lp.episodes(), 1);
    assert_eq!(env.n_resets(), 2);
    assert_eq!(sink.labels[0][1], "Landing failures: 1");
    Ok(())
}

#[test]
fn test_failed_reset_is_retried_on_next_tick() -> Result<()> {
    let steps = vec![ScriptedStep::terminal(crash()), ScriptedStep::flying(hover())];
    let env_config = ScriptedEnvConfig::default().steps(steps).fail_at_reset(1);
    let mut env = ScriptedEnv::build(&env_config, 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut lp = EpisodeLoop::build(loop_config())?;

    let first = lp.tick(&mut env, &mut agent, &mut SpySink::default(), &mut NullRecorder {});
    assert!(first.is_err());
    assert_eq!(lp.phase(), LoopPhase::Resetting);
    assert_eq!(lp.counters().failure_count, 1);

    let second = lp.tick(&mut env, &mut agent, &mut SpySink::default(), &mut NullRecorder {})?;
    assert_eq!(second.outcome, EpisodeOutcome::Ongoing);
    assert_eq!(lp.phase(), LoopPhase::Running);
    assert_eq!(env.n_resets(), 3);
    assert_eq!(lp.env_steps(), 2);
    Ok(())
}

#[test]
fn test_frameless_env_publishes_no_frame() -> Result<()> {
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut sink = SpySink::default();
    let mut lp = EpisodeLoop::build(loop_config())?;

    lp.tick(&mut env, &mut agent, &mut sink, &mut NullRecorder {})?;
    assert_eq!(sink.frames, vec![None]);
    assert_eq!(sink.labels.len(), 1);
    Ok(())
}

#[test]
fn test_frames_are_published() -> Result<()> {
    let env_config = ScriptedEnvConfig::default().frame_size(60, 40);
    let mut env = ScriptedEnv::build(&env_config, 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut sink = SpySink::default();
    let mut lp = EpisodeLoop::build(loop_config())?;

    lp.tick(&mut env, &mut agent, &mut sink, &mut NullRecorder {})?;
    assert_eq!(sink.frames, vec![Some((60, 40))]);
    Ok(())
}

#[test]
fn test_run_learns_in_blocks_and_saves() -> Result<()> {
    let config = loop_config()
        .total_step_budget(2_500)
        .steps_per_training_block(1_000);
    let steps = vec![
        ScriptedStep::flying(hover()),
        ScriptedStep::terminal(crash()),
    ];
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().steps(steps), 0)?;
    let mut agent = ScriptedAgent::new(3);
    let mut recorder = BufferedRecorder::new();
    let mut lp = EpisodeLoop::build(config)?;

    let summary = lp.run(
        &mut env,
        &mut agent,
        &mut SpySink::default(),
        &mut recorder,
        &CancelToken::new(),
    )?;

    assert!(!summary.cancelled);
    assert_eq!(summary.env_steps, 2_500);
    assert_eq!(summary.episodes, 1_250);
    assert_eq!(summary.failure_count, 1_250);
    assert_eq!(summary.success_count, 0);
    assert_eq!(agent.learn_budgets(), &[1_000, 1_000, 500]);
    assert_eq!(agent.saved(), vec![std::path::PathBuf::from("dqn_test")]);
    assert_eq!(recorder.flushed_at(), &[1_000, 2_000, 2_500]);
    assert_eq!(recorder.with_key("learn_steps").count(), 3);
    assert_eq!(recorder.with_key("episode_return").count(), 1_250);
    Ok(())
}

#[test]
fn test_cancelled_run_is_not_saved() -> Result<()> {
    let config = loop_config()
        .total_step_budget(100)
        .steps_per_training_block(10);
    let cancel = CancelToken::new();
    let mut sink = SpySink {
        cancel_after: Some((15, cancel.clone())),
        ..Default::default()
    };
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut lp = EpisodeLoop::build(config)?;

    let summary = lp.run(&mut env, &mut agent, &mut sink, &mut NullRecorder {}, &cancel)?;

    assert!(summary.cancelled);
    assert_eq!(summary.env_steps, 15);
    assert_eq!(agent.learn_budgets(), &[10, 10]);
    assert!(agent.saved().is_empty());
    Ok(())
}

#[test]
fn test_env_error_ends_run() -> Result<()> {
    let config = loop_config().total_step_budget(20).steps_per_training_block(5);
    let env_config = ScriptedEnvConfig::default().fail_at_step(7);
    let mut env = ScriptedEnv::build(&env_config, 0)?;
    let mut agent = ScriptedAgent::new(0);
    let mut lp = EpisodeLoop::build(config)?;

    let result = lp.run(
        &mut env,
        &mut agent,
        &mut SpySink::default(),
        &mut NullRecorder {},
        &CancelToken::new(),
    );

    assert!(result.is_err());
    assert_eq!(lp.env_steps(), 7);
    assert!(agent.saved().is_empty());
    Ok(())
}

#[test]
fn test_learn_error_ends_run() -> Result<()> {
    let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
    let mut agent = ScriptedAgent::new(0).failing_learn();
    let mut lp = EpisodeLoop::build(loop_config().total_step_budget(10))?;

    let result = lp.run(
        &mut env,
        &mut agent,
        &mut SpySink::default(),
        &mut NullRecorder {},
        &CancelToken::new(),
    );

    assert!(result.is_err());
    assert_eq!(lp.env_steps(), 0);
    assert!(agent.saved().is_empty());
    Ok(())
}

#[test]
fn test_invalid_config_rejected_at_build() {
    let config = loop_config().fuel(FuelConfig::default().capacity(0.0));
    assert!(EpisodeLoop::<ScriptedEnv>::build(config).is_err());

    let mut config = loop_config();
    config.success_thresholds.x_min = 1.0;
    assert!(EpisodeLoop::<ScriptedEnv>::build(config).is_err());
}
