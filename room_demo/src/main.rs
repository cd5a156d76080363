//! Room demo application
//!
//! Headless run of the main room: ten spinning crates, a teapot that gets
//! pushed out of whatever it drives into, and two lamps. Input is replaced by
//! a fixed script so runs are repeatable; frames go to a back end that logs
//! what it would draw.
//!
//! Usage: `room_demo [config.toml]`. Without an argument the bundled
//! `resources/config.toml` is used. Relative asset paths resolve against the
//! directory of the configuration file.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use room_engine::assets::FileDataCache;
use room_engine::config::ConfigFormat;
use room_engine::foundation::logging;
use room_engine::prelude::*;
use room_engine::render::{BackendResult, DirectionalLight, MoveDirection, PointLight};
use room_engine::scene::intersects;

const ASPECT_RATIO: f32 = 800.0 / 600.0;

/// Crate placements, applied on top of the scene file
const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [4.0, 10.0, -20.0],
    [-3.0, -4.4, -5.0],
    [-7.6, -4.0, -14.0],
    [4.4, -3.5, -4.0],
    [-3.4, 6.0, -15.0],
    [2.6, -4.0, -17.0],
    [4.0, 3.0, -5.0],
    [3.0, 0.4, -12.0],
    [-3.5, 2.0, -3.0],
];

/// Light nudge per key press
const LIGHT_STEP: f32 = 0.3;

/// Teapot drive speed per tick
const TEAPOT_STEP: f32 = 0.05;

/// Scripted stand-ins for key presses, by tick
#[derive(Debug, Clone, Copy, PartialEq)]
enum DemoAction {
    ToggleRotation,
    ToggleAabbs,
    ToggleFollow,
    ToggleDebugInfo,
    CycleLight,
    MoveLight(Vec3),
    NudgeSun(Vec3),
    DriveTeapot(Vec3),
    MoveCamera(MoveDirection),
    Look(f32, f32),
}

/// Actions due on `tick`, counted from the end of loading
fn script(tick: u64) -> Vec<DemoAction> {
    let mut actions = Vec::new();
    if (60..300).contains(&tick) && tick % 20 == 0 {
        let delta = if tick < 180 {
            Vec3::new(0.0, LIGHT_STEP, 0.0)
        } else {
            Vec3::new(LIGHT_STEP, 0.0, 0.0)
        };
        actions.push(DemoAction::MoveLight(delta));
    }
    match tick {
        180 => actions.push(DemoAction::CycleLight),
        240 => actions.push(DemoAction::NudgeSun(Vec3::new(0.1, 0.0, 0.0))),
        400 => actions.push(DemoAction::ToggleAabbs),
        300 | 420 => actions.push(DemoAction::ToggleFollow),
        540 => actions.push(DemoAction::ToggleRotation),
        560 => actions.push(DemoAction::ToggleDebugInfo),
        _ => {}
    }
    if (300..500).contains(&tick) {
        actions.push(DemoAction::DriveTeapot(Vec3::new(-TEAPOT_STEP, 0.0, 0.0)));
    }
    if (420..480).contains(&tick) {
        actions.push(DemoAction::MoveCamera(MoveDirection::Forward));
    }
    if (480..540).contains(&tick) {
        actions.push(DemoAction::Look(2.0, 0.0));
    }
    actions
}

/// Back end that logs frame contents and paces itself like a vsynced swap
struct LogBackend {
    frame_interval: Duration,
    last_present: Option<Instant>,
    frames: u64,
}

impl LogBackend {
    fn new(refresh_rate: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs(1) / refresh_rate.max(1),
            last_present: None,
            frames: 0,
        }
    }
}

impl RenderBackend for LogBackend {
    fn submit(&mut self, frame: &FrameData<'_>) -> BackendResult<()> {
        if let Some(last) = self.last_present {
            let elapsed = last.elapsed();
            if elapsed < self.frame_interval {
                std::thread::sleep(self.frame_interval - elapsed);
            }
        }
        self.last_present = Some(Instant::now());
        self.frames += 1;

        log::debug!(
            "Frame {}: {} entries, {} point lights, {} boxes, t = {:.3}",
            self.frames,
            frame.form.len(),
            frame.lights.point.len(),
            frame.debug_boxes.len(),
            frame.form.fraction()
        );
        Ok(())
    }

    fn shutdown(&mut self) {
        log::info!("Log back end presented {} frames", self.frames);
    }
}

/// Log and drop errors that concern a single node or light
///
/// The frame loop keeps running when a command names a node or light that is
/// not there; anything else still ends the run.
fn skip_node_error(result: Result<(), AppError>, what: &str) -> Result<(), AppError> {
    match result {
        Err(AppError::Scene(
            e @ (SceneError::NodeNotFound(_) | SceneError::LightIndexOutOfRange { .. }),
        )) => {
            log::warn!("Skipping {}: {}", what, e);
            Ok(())
        }
        other => other,
    }
}

enum Phase {
    Loading(BackgroundLoader),
    Ready,
}

struct RoomDemo {
    phase: Phase,
    view: ViewConfig,
    scene_config: SceneConfig,
    scene_path: PathBuf,
    scene: Scene,
    creator: RenderformCreator,
    camera: Camera,
    ticks: u64,
}

impl RoomDemo {
    fn new(config: &ApplicationConfig, base_dir: &Path) -> Self {
        let assets_dir = base_dir.join(&config.assets.assets_dir);
        let scene_path = assets_dir.join(&config.assets.scene_file);
        let mut preload = vec![scene_path.clone()];
        preload.extend(config.assets.preload.iter().map(|file| assets_dir.join(file)));

        Self {
            phase: Phase::Loading(BackgroundLoader::spawn(preload)),
            view: config.view.clone(),
            scene_config: config.scene.clone(),
            scene_path,
            scene: Scene::new(config.scene.clone()),
            creator: RenderformCreator::new(),
            camera: Camera::new(Vec3::new(0.0, 0.0, 8.0)).with_view_config(&config.view),
            ticks: 0,
        }
    }

    /// Register assets, build the scene and place everything
    fn setup_world(&mut self, engine: &mut Engine, cache: &FileDataCache) -> Result<(), AppError> {
        log::info!("Loaded {} files ({} bytes)", cache.len(), cache.total_bytes());

        engine.models.load("cube", MeshData::cube())?;
        engine.models.load("teapot", MeshData::uv_sphere(1.0, 32, 32))?;
        engine.models.load("sphere", MeshData::uv_sphere(1.0, 16, 16))?;

        let wood = engine.textures.load("mahogany_wood");
        let wood_spec = engine.textures.load("mahogany_wood_spec");
        for name in ["house_diff", "house_spec", "well_diff", "well_spec"] {
            engine.textures.load(name);
        }

        let mahogany = engine.materials.insert(
            "mahogany",
            Material::default()
                .with_diffuse_texture(wood)
                .with_specular_texture(wood_spec),
        )?;
        let white = engine.materials.insert(
            "white",
            Material::default().with_diffuse_color(Vec3::new(1.0, 1.0, 1.0)),
        )?;
        engine.models.set_material("cube", mahogany)?;
        engine.models.set_material("teapot", white)?;

        self.creator.set_environment(
            EnvironmentMaps::default()
                .with_skybox(engine.textures.load_cubemap("skybox"))
                .with_irradiance(engine.textures.load_cubemap("irradiance"))
                .with_radiance(engine.textures.load_cubemap("radiance")),
        );

        let key = self.scene_path.to_string_lossy();
        let bytes = cache
            .get(&key)
            .ok_or_else(|| AppError::Custom(format!("scene file not loaded: {key}")))?;
        let source = std::str::from_utf8(bytes)
            .map_err(|e| AppError::Custom(format!("scene file {key}: {e}")))?;
        let format = ConfigFormat::from_path(&self.scene_path)?;
        let description = SceneDescription::from_str_with_format(source, format)?;
        self.creator.clear();
        self.scene = SceneFactory::build(&description, &engine.models, &self.scene_config)?;

        for (i, position) in CUBE_POSITIONS.iter().enumerate() {
            let placed = self.place_cube(i, Vec3::from(*position));
            skip_node_error(placed, &format!("cube{i} placement"))?;
        }
        self.scene.update();

        let mut lights = Lights::new().with_directional(DirectionalLight::default());
        for _ in self.scene.lights() {
            lights = lights.with_point(PointLight::default());
        }
        engine.lights = lights;
        let synced = engine.lights.sync_point_lights(&self.scene);
        log::info!("World ready: {} nodes, {} point lights", self.scene.len(), synced);
        Ok(())
    }

    fn place_cube(&mut self, i: usize, position: Vec3) -> Result<(), AppError> {
        let id = format!("cube{i}");
        let step = i as f32;
        self.scene.move_node(id.as_str(), position)?;
        self.scene.scale(id.as_str(), Vec3::new(2.0, 2.0, 2.0))?;
        self.scene.rotate(id.as_str(), RotationAxis::X, 20.0 * step)?;
        self.scene.rotate(id.as_str(), RotationAxis::Y, 7.0 * step)?;
        self.scene.rotate(id.as_str(), RotationAxis::Z, 10.0 * step)?;
        Ok(())
    }

    fn apply(&mut self, engine: &mut Engine, action: DemoAction) -> Result<(), AppError> {
        match action {
            DemoAction::ToggleRotation => self.view.toggle_rotation(),
            DemoAction::ToggleAabbs => self.view.toggle_aabbs(),
            DemoAction::ToggleFollow => self.view.toggle_follow(),
            DemoAction::ToggleDebugInfo => self.view.toggle_debug_info(),
            DemoAction::CycleLight => {
                self.view.cycle_moving_light(self.scene.lights().len());
                log::info!("Moving light {}", self.view.moving_light_index);
            }
            DemoAction::MoveLight(delta) => {
                let command = LightCommand::MovePoint {
                    index: self.view.moving_light_index,
                    delta,
                };
                engine.lights.apply(&mut self.scene, command)?;
            }
            DemoAction::NudgeSun(delta) => {
                engine
                    .lights
                    .apply(&mut self.scene, LightCommand::NudgeDirectional { index: 0, delta })?;
            }
            DemoAction::DriveTeapot(delta) => {
                if self.scene.find_node_by_uuid("teapot").is_ok() {
                    self.scene.move_node("teapot", delta)?;
                }
            }
            DemoAction::MoveCamera(direction) => {
                if !self.view.follow_character {
                    self.camera.move_in(&[direction]);
                }
            }
            DemoAction::Look(dx, dy) => self.camera.look(dx, dy),
        }
        Ok(())
    }

    fn spin_cubes(&mut self) -> Result<(), AppError> {
        let cubes: Vec<NodeKey> = self
            .scene
            .keys()
            .iter()
            .copied()
            .filter(|key| {
                self.scene
                    .node(*key)
                    .is_some_and(|node| node.uuid().starts_with("cube"))
            })
            .collect();
        for key in cubes {
            self.scene
                .rotate(key, RotationAxis::Y, self.view.rotation_increment)?;
        }
        Ok(())
    }

    /// Keep the camera above and behind the teapot's pending position
    fn follow_teapot(&mut self) {
        if let Some(teapot) = self
            .scene
            .find_node_by_uuid("teapot")
            .ok()
            .and_then(|key| self.scene.node(key))
        {
            let target = teapot.transform().interpolated(1.0).position;
            self.camera.move_to(target + Vec3::new(0.0, 4.0, 4.0));
        }
    }

    fn push_out_teapot(&mut self) -> Result<(), AppError> {
        let Ok(teapot) = self.scene.find_node_by_uuid("teapot") else {
            return Ok(());
        };
        let contacts = resolve_penetrations(&mut self.scene, teapot)?;
        if contacts > 0 {
            log::debug!("Teapot pushed out of {} nodes", contacts);
        }
        Ok(())
    }
}

impl Application for RoomDemo {
    fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Loading {}", self.scene_path.display());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        if let Phase::Loading(loader) = &mut self.phase {
            match loader.poll() {
                None => return Ok(()),
                Some(result) => {
                    let cache = result?;
                    self.setup_world(engine, &cache)?;
                    self.phase = Phase::Ready;
                }
            }
        }

        for action in script(self.ticks) {
            let result = self.apply(engine, action);
            skip_node_error(result, &format!("{action:?}"))?;
        }
        self.ticks += 1;

        if self.view.rotating {
            self.spin_cubes()?;
        }
        if self.view.follow_character {
            self.follow_teapot();
        }
        self.camera.update();
        let pushed = self.push_out_teapot();
        skip_node_error(pushed, "teapot push-out")?;
        self.scene.update();
        Ok(())
    }

    fn render(&mut self, engine: &mut Engine, interpolation: f32) -> Result<(), AppError> {
        let dirty = self.scene.pull_updates();
        if let Err(e) = self
            .creator
            .update(&self.scene, &dirty, &engine.models, &engine.materials)
        {
            log::warn!("Skipping frame: {}", e);
            return Ok(());
        }
        let form = match self.creator.bake(&self.scene, interpolation) {
            Ok(form) => form,
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                return Ok(());
            }
        };

        let debug_boxes: Vec<AABB> = if self.view.show_aabbs {
            self.scene.aabbs().map(|(_, aabb)| *aabb).collect()
        } else {
            Vec::new()
        };

        if self.view.show_debug_info && engine.frame_count() % 120 == 0 {
            let overlapping = debug_boxes
                .iter()
                .enumerate()
                .flat_map(|(i, a)| debug_boxes[i + 1..].iter().map(move |b| (a, b)))
                .filter(|(a, b)| intersects(a, b))
                .count();
            log::info!(
                "Frame {} / tick {}: {} entries, camera at {:?}, {} overlapping boxes",
                engine.frame_count(),
                engine.tick_count(),
                form.len(),
                self.camera.position(),
                overlapping
            );
        }

        let lights = engine.lights.clone();
        engine.submit(&FrameData {
            form: &form,
            view: self.camera.interpolated_view(interpolation),
            projection: self.camera.projection(ASPECT_RATIO),
            lights: &lights,
            debug_boxes: &debug_boxes,
        })?;
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        self.creator.clear();
        engine.clear_assets();
        log::info!("Room demo finished after {} ticks", self.ticks);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map_or_else(
        || Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/config.toml"),
        PathBuf::from,
    );
    let config = if config_path.exists() {
        ApplicationConfig::load_from_file(&config_path)?
    } else {
        ApplicationConfig::default()
    };
    config.validate()?;

    logging::init_with_level(&config.engine.log_level);
    log::info!("Starting room demo with {}", config_path.display());

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let mut app = RoomDemo::new(&config, base_dir);
    let backend = LogBackend::new(config.view.refresh_rate);
    let mut engine = Engine::new(config.engine.clone(), Box::new(backend))?;

    engine.run(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ready_demo(scene: Scene) -> RoomDemo {
        let config = ApplicationConfig::default();
        RoomDemo {
            phase: Phase::Ready,
            view: config.view.clone(),
            scene_config: config.scene.clone(),
            scene_path: PathBuf::new(),
            scene,
            creator: RenderformCreator::new(),
            camera: Camera::new(Vec3::new(0.0, 0.0, 8.0)),
            ticks: 0,
        }
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), Box::new(RecordingBackend::new())).unwrap()
    }

    #[test]
    fn test_light_commands_without_lights_keep_running() {
        let mut scene = Scene::new(SceneConfig::default());
        scene.insert_node(SceneNode::new("cube0"), None).unwrap();
        let mut demo = ready_demo(scene);
        let mut engine = engine();

        demo.ticks = 60;
        assert_eq!(script(60), vec![DemoAction::MoveLight(Vec3::new(0.0, LIGHT_STEP, 0.0))]);
        assert!(demo.update(&mut engine, 0.05).is_ok());
        assert_eq!(demo.ticks, 61);

        demo.ticks = 240;
        assert!(script(240).contains(&DemoAction::NudgeSun(Vec3::new(0.1, 0.0, 0.0))));
        assert!(demo.update(&mut engine, 0.05).is_ok());
        assert_eq!(demo.ticks, 241);
    }

    #[test]
    fn test_missing_cubes_are_skipped_during_placement() {
        let mut scene = Scene::new(SceneConfig::default());
        scene.insert_node(SceneNode::new("cube0"), None).unwrap();
        let mut demo = ready_demo(scene);

        let placed = demo.place_cube(3, Vec3::new(1.0, 0.0, 0.0));
        assert!(skip_node_error(placed, "cube3 placement").is_ok());

        demo.place_cube(0, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        demo.scene.update();
        let cube = demo.scene.get("cube0").unwrap();
        assert_relative_eq!(cube.transform().current().position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_skip_node_error_keeps_other_failures() {
        let missing = Err(AppError::Scene(SceneError::NodeNotFound("lamp".to_string())));
        assert!(skip_node_error(missing, "lamp").is_ok());

        let out_of_range = Err(AppError::Scene(SceneError::LightIndexOutOfRange { index: 2, count: 1 }));
        assert!(skip_node_error(out_of_range, "light 2").is_ok());

        let duplicate = Err(AppError::Scene(SceneError::DuplicateIdentifier("cube0".to_string())));
        assert!(matches!(
            skip_node_error(duplicate, "cube0"),
            Err(AppError::Scene(SceneError::DuplicateIdentifier(_)))
        ));

        let fatal = Err(AppError::Custom("scene file not loaded".to_string()));
        assert!(matches!(skip_node_error(fatal, "setup"), Err(AppError::Custom(_))));
    }
}
