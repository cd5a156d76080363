//! Core engine implementation
//!
//! The engine owns the asset stores, the renderer-side lights and the render
//! back end, and runs the frame loop: every frame feeds measured time into a
//! [`FixedTimestep`], runs the ticks that became due, then renders once with
//! the leftover fraction.

use std::time::Duration;

use thiserror::Error;

use crate::application::{AppError, Application};
use crate::assets::{MaterialStore, ModelStore, TextureStore};
use crate::core::config::EngineConfig;
use crate::foundation::time::{FixedTimestep, Timer};
use crate::render::{BackendResult, FrameData, Lights, RenderBackend};

/// Main engine struct
pub struct Engine {
    /// Meshes by name
    pub models: ModelStore,

    /// Materials by name
    pub materials: MaterialStore,

    /// Texture and cubemap ids by name
    pub textures: TextureStore,

    /// Lights the back end shades with
    pub lights: Lights,

    backend: Box<dyn RenderBackend>,
    timer: Timer,
    timestep: FixedTimestep,
    config: EngineConfig,
    running: bool,
    frame_count: u64,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig, backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        if config.tick_rate == 0 {
            return Err(EngineError::InitializationFailed(
                "tick_rate must be at least 1".to_string(),
            ));
        }
        log::info!(
            "Initializing engine ({} ticks/s, frame clamp {} ms)",
            config.tick_rate,
            config.max_frame_time_ms
        );

        Ok(Self {
            models: ModelStore::new(),
            materials: MaterialStore::new(),
            textures: TextureStore::new(),
            lights: Lights::new(),
            backend,
            timer: Timer::new(),
            timestep: FixedTimestep::new(config.tick_rate, config.max_frame_time()),
            config,
            running: true,
            frame_count: 0,
        })
    }

    /// Run the main loop with wall-clock frame times until quit or `max_frames`
    pub fn run<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        self.initialize(app)?;

        log::info!("Starting main loop...");
        let result = loop {
            if !self.running {
                break Ok(());
            }
            self.timer.update();
            let frame_time = Duration::from_secs_f32(self.timer.delta_time());
            if let Err(e) = self.frame(app, frame_time) {
                break Err(e);
            }
        };

        log::info!(
            "Main loop ended after {:.1} s (average {:.1} fps)",
            self.timer.total_time(),
            self.timer.average_fps()
        );
        self.finish(app);
        result
    }

    /// Run `frames` frames of exactly `frame_time` each
    ///
    /// Deterministic counterpart of [`Engine::run`] for headless runs and
    /// tests. `max_frames` still applies.
    pub fn run_fixed<T: Application>(
        &mut self,
        app: &mut T,
        frames: u64,
        frame_time: Duration,
    ) -> Result<(), EngineError> {
        self.initialize(app)?;

        let mut result = Ok(());
        for _ in 0..frames {
            if !self.running {
                break;
            }
            if let Err(e) = self.frame(app, frame_time) {
                result = Err(e);
                break;
            }
        }

        self.finish(app);
        result
    }

    fn initialize<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        self.running = true;
        app.initialize(self)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))
    }

    fn frame<T: Application>(&mut self, app: &mut T, frame_time: Duration) -> Result<(), EngineError> {
        let ticks = self.timestep.advance(frame_time);
        let dt = self.timestep.tick_seconds();
        for _ in 0..ticks {
            app.update(self, dt)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;
        }

        let interpolation = self.timestep.interpolation();
        app.render(self, interpolation)
            .map_err(|e| EngineError::ApplicationError(format!("App render: {}", e)))?;

        self.frame_count += 1;
        log::trace!(
            "Frame {}: {} ticks, interpolation {:.3}",
            self.frame_count,
            ticks,
            interpolation
        );
        if self.config.max_frames.is_some_and(|max| self.frame_count >= max) {
            log::info!("Reached frame limit ({})", self.frame_count);
            self.running = false;
        }
        Ok(())
    }

    fn finish<T: Application>(&mut self, app: &mut T) {
        app.cleanup(self);
        self.backend.shutdown();
        log::info!(
            "Engine shutdown complete ({} frames, {} ticks)",
            self.frame_count,
            self.timestep.tick_count()
        );
    }

    /// Hand a frame to the render back end
    pub fn submit(&mut self, frame: &FrameData<'_>) -> BackendResult<()> {
        self.backend.submit(frame)
    }

    /// Request shutdown after the current frame
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Whether the loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.timestep.tick_count()
    }

    /// Length of one tick in seconds
    pub fn tick_seconds(&self) -> f32 {
        self.timestep.tick_seconds()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clear every store and light, e.g. when leaving a screen
    pub fn clear_assets(&mut self) {
        self.models.clear();
        self.materials.clear();
        self.textures.clear();
        self.lights.clear();
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}

impl From<AppError> for EngineError {
    fn from(error: AppError) -> Self {
        Self::ApplicationError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;

    #[derive(Default)]
    struct Counter {
        initialized: bool,
        ticks: u32,
        fractions: Vec<f32>,
        cleaned_up: bool,
        fail_on_frame: Option<usize>,
    }

    impl Application for Counter {
        fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
            self.initialized = true;
            Ok(())
        }

        fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.ticks += 1;
            Ok(())
        }

        fn render(&mut self, _engine: &mut Engine, interpolation: f32) -> Result<(), AppError> {
            if self.fail_on_frame == Some(self.fractions.len()) {
                return Err(AppError::Custom("boom".to_string()));
            }
            self.fractions.push(interpolation);
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned_up = true;
        }
    }

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config, Box::new(RecordingBackend::new())).unwrap()
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let result = Engine::new(EngineConfig::new().with_tick_rate(0), Box::new(RecordingBackend::new()));
        assert!(matches!(result, Err(EngineError::InitializationFailed(_))));
    }

    #[test]
    fn test_fixed_run_ticks_and_interpolates() {
        let mut engine = engine(EngineConfig::new().with_tick_rate(10));
        let mut app = Counter::default();

        engine.run_fixed(&mut app, 4, Duration::from_millis(25)).unwrap();

        assert!(app.initialized && app.cleaned_up);
        assert_eq!(app.ticks, 1);
        assert_eq!(engine.frame_count(), 4);
        assert_eq!(engine.tick_count(), 1);
        assert_eq!(app.fractions.len(), 4);
        approx::assert_relative_eq!(app.fractions[1], 0.5, epsilon = 1e-4);
        approx::assert_relative_eq!(app.fractions[3], 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_max_frames_stops_loop() {
        let mut engine = engine(EngineConfig::new().with_max_frames(3));
        let mut app = Counter::default();

        engine.run(&mut app).unwrap();
        assert_eq!(engine.frame_count(), 3);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_render_error_aborts_and_cleans_up() {
        let mut engine = engine(EngineConfig::new());
        let mut app = Counter {
            fail_on_frame: Some(2),
            ..Counter::default()
        };

        let result = engine.run_fixed(&mut app, 10, Duration::from_millis(16));
        assert!(matches!(result, Err(EngineError::ApplicationError(_))));
        assert_eq!(app.fractions.len(), 2);
        assert!(app.cleaned_up);
    }
}
