//! Tiny RPG entry point
//!
//! Runs the scene flow headless: a scripted input drives the title card, the
//! village level and the game over card on a fixed simulation step, and every
//! frame is recorded into a draw queue.

use std::process::ExitCode;

use glam::Vec2;

use tiny_rpg::audio::{AudioManager, LogSink};
use tiny_rpg::consts::*;
use tiny_rpg::persistence::FileStore;
use tiny_rpg::platform::{
    ACTION_ACCEPT, ACTION_ATTACK, ACTION_DOWN, ACTION_RIGHT, ACTION_USE, BuiltinContent, InputState, Resources,
};
use tiny_rpg::renderer::DrawQueue;
use tiny_rpg::scene::{FadeInOut, LevelScene, SceneContext, SceneFlow, ScreenScene};
use tiny_rpg::{Result, Settings};

const SETTINGS_PATH: &str = "tiny-rpg-settings.json";
const TITLE_TIMEOUT: f32 = 3.0;
const GAME_OVER_TIMEOUT: f32 = 4.0;

/// Game instance holding the flow and the loop state
struct Game {
    flow: SceneFlow,
    audio: AudioManager,
    input: InputState,
    frame: DrawQueue,
    accumulator: f32,
    clock: f32,
    frames: u64,
}

impl Game {
    fn new(settings: &Settings) -> Self {
        let screen = Vec2::new(settings.window_width as f32, settings.window_height as f32);
        let mut flow = SceneFlow::new(Resources::new(Box::new(BuiltinContent::demo())));

        flow.register(Box::new(
            ScreenScene::new("title", "title", "start", screen).with_timeout(TITLE_TIMEOUT),
        ));
        flow.register(Box::new(FadeInOut::new(Box::new(LevelScene::new(
            "level", "village", settings,
        )))));
        flow.register(Box::new(
            ScreenScene::new("game_over", "game_over", "restart", screen).with_timeout(GAME_OVER_TIMEOUT),
        ));
        flow.add_transition("title", "start", "level");
        flow.add_transition("level", "game_over", "game_over");
        flow.add_transition("game_over", "restart", "title");
        flow.persist("level");

        Self {
            flow,
            audio: AudioManager::from_settings(Box::new(LogSink), settings),
            input: InputState::new(),
            frame: DrawQueue::new(),
            accumulator: 0.0,
            clock: 0.0,
            frames: 0,
        }
    }

    /// Scripted player: wander right and down, swing now and then, drink a potion
    fn script_input(&mut self) {
        let t = self.clock;
        self.input.release_all();
        match (t % 8.0) as u32 {
            0..=2 => self.input.press(ACTION_RIGHT),
            3..=4 => self.input.press(ACTION_DOWN),
            _ => {}
        }
        if self.frames % 45 == 0 {
            self.input.press(ACTION_ATTACK);
        }
        if self.frames % 300 == 150 {
            self.input.press(ACTION_ACCEPT);
        }
        if self.frames % 600 == 420 {
            self.input.press(ACTION_USE);
        }
    }

    /// Run simulation ticks for one frame, then draw it
    fn update(&mut self, dt: f32) -> Result<()> {
        let dt = dt.min(MAX_FRAME_TIME);
        self.accumulator += dt;
        self.clock += dt;
        self.script_input();

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut ctx = SceneContext {
                input: &self.input,
                audio: &mut self.audio,
            };
            for event in self.flow.update(SIM_DT, &mut ctx)? {
                log::debug!("Unhandled scene event {event:?}");
            }
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot presses only count for the first substep
            self.input.end_frame();
        }

        self.frame.clear();
        self.flow.draw(&mut self.frame);
        self.frames += 1;
        Ok(())
    }
}

fn run(settings: &Settings) -> Result<()> {
    let mut store = FileStore::new(".");
    let mut game = Game::new(settings);

    if game.flow.restore(&store, &settings.save_path)? {
        log::info!("Continuing saved game");
    }
    game.flow.start("title")?;

    let frame_time = settings.frame_time();
    let total_frames = (settings.demo_seconds / frame_time).ceil() as u64;
    for _ in 0..total_frames {
        game.update(frame_time)?;
        if game.frames % 60 == 0 {
            log::debug!(
                "t={:.1}s scene={:?} draws={}",
                game.clock,
                game.flow.current_name(),
                game.frame.len()
            );
        }
    }

    game.flow.save(&mut store, &settings.save_path)?;
    log::info!("Game saved to {}", settings.save_path);
    game.audio.stop_music();
    game.flow.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Tiny RPG starting...");

    let settings = Settings::load(SETTINGS_PATH);
    log::info!("Running {}s at {} fps, seed {}", settings.demo_seconds, settings.frame_rate, settings.seed);

    match run(&settings) {
        Ok(()) => {
            log::info!("Tiny RPG finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
