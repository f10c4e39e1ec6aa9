use anyhow::Result;
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use log::{debug, info, warn};
use rand::Rng;
use std::time::{Duration, Instant};
use storywall::app::{App, Simulator, UiEvent};
use storywall::config::Config;
use storywall::features::sequencer::SequencerDriver;

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting storywall...");

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Using default config: {e:#}");
        Config::default()
    });
    let frame_interval = config.frame_interval();
    let run_for = config.run_length()?;
    let status_refresh = Duration::from_secs(config.status_refresh_secs);
    let walk_sequence = config.walk_sequence()?;
    let story_wall_sequence = config.story_wall_sequence()?;
    let breathe_sequence = config.breathe_sequence()?;

    let mut app = App::new(config)?;
    let mut event_loop: EventLoop<App> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    // Device mockups
    let mut drivers = vec![
        SequencerDriver::start(&handle, "walk", walk_sequence, |change, app| {
            info!("Walk simulator: {}", change.name);
            app.on_phase(Simulator::Walk, &change);
        })?,
        SequencerDriver::start(&handle, "story-wall", story_wall_sequence, |change, app| {
            info!("StoryWall simulator: {}", change.name);
            app.on_phase(Simulator::StoryWall, &change);
        })?,
        SequencerDriver::start(&handle, "breathe", breathe_sequence, |change, app| {
            app.on_phase(Simulator::Breathe, &change);
        })?,
    ];

    // Frame tick
    let mut last_frame = Instant::now();
    handle
        .insert_source(Timer::from_duration(frame_interval), move |_, _, app| {
            let now = Instant::now();
            let dt = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;
            app.update(dt);
            debug!("{}", app.describe());
            TimeoutAction::ToDuration(frame_interval)
        })
        .map_err(|e| e.error)?;

    // Synthetic visitor: mostly scrolls down, sometimes back up, waves the
    // pointer around.
    let mut rng = rand::thread_rng();
    handle
        .insert_source(Timer::from_duration(Duration::from_millis(250)), move |_, _, app| {
            let delta: f32 = rng.gen_range(-1.0..3.0);
            app.handle_event(UiEvent::Wheel { delta });
            if rng.gen_bool(0.3) {
                let (width, height) = (app.config.viewport_width, app.page.viewport());
                let pos = [rng.gen_range(0.0..width), rng.gen_range(0.0..height)];
                app.handle_event(UiEvent::PointerMove { pos });
            }
            TimeoutAction::ToDuration(Duration::from_millis(rng.gen_range(150..600)))
        })
        .map_err(|e| e.error)?;

    // Status bar clock
    app.status.refresh();
    handle
        .insert_source(Timer::from_duration(status_refresh), move |_, _, app| {
            if app.status.refresh() {
                info!("Status clock: {}", app.status.text());
            }
            TimeoutAction::ToDuration(status_refresh)
        })
        .map_err(|e| e.error)?;

    let signal = event_loop.get_signal();
    handle
        .insert_source(Timer::from_duration(run_for), move |_, _, _| {
            info!("Run finished, shutting down");
            signal.stop();
            TimeoutAction::Drop
        })
        .map_err(|e| e.error)?;

    info!("Running for {:?} at {:?} per frame", run_for, frame_interval);
    event_loop.run(None, &mut app, |_| {})?;

    for driver in &mut drivers {
        driver.stop();
    }
    info!("{}", app.describe());
    Ok(())
}
