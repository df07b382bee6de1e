//! Viewport session
//!
//! Owns everything the preview shows: surface, camera, controller, the two spheres, the
//! optional environment and the parameter panel. A session is mounted once, stepped
//! every frame while live, and torn down once.

use crate::config::ViewerConfig;
use crate::environment::{AssetLoader, EnvironmentMap, EnvironmentSource, PendingLoad};
use crate::error::LoadError;
use crate::panel::{PanelValues, ParameterChange, ParameterPanel};
use crate::scene::{Material, Scene, Side};
use crate::viewport::{Camera3D, OrbitControls, RenderSurface, ToneMapping};
use glam::{Mat4, Vec3};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Live,
    TornDown,
}

/// What a teardown released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub environment_released: bool,
    pub objects_released: usize,
    /// A load was still in flight; its result will be dropped
    pub pending_load_abandoned: bool,
}

/// Per-object draw data
#[derive(Debug, Clone, Copy)]
pub struct ObjectDraw {
    pub model: Mat4,
    pub material: Material,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameState {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub objects: [ObjectDraw; 2],
    pub environment: Option<Arc<EnvironmentMap>>,
    pub background_rotation: f32,
    pub environment_rotation: f32,
    pub exposure: f32,
    pub tone_mapping: ToneMapping,
    pub physical_size: [u32; 2],
}

pub struct ViewportSession {
    config: ViewerConfig,
    state: SessionState,
    started: Instant,
    scene: Scene,
    camera: Camera3D,
    controls: OrbitControls,
    surface: RenderSurface,
    panel: ParameterPanel,
    rotation_degrees: f32,
    pending_load: Option<PendingLoad>,
    loading: bool,
}

impl ViewportSession {
    /// Builds the scene for a viewport of `width` x `height` points and attaches the
    /// render surface to it
    pub fn mount(config: ViewerConfig, width: f32, height: f32, pixel_ratio: f32) -> Self {
        let mut surface = RenderSurface::new(
            width,
            height,
            pixel_ratio,
            config.max_pixel_ratio,
            config.exposure,
        );
        let camera = Camera3D::new(config.camera_position, config.fov_degrees, surface.aspect());
        let controls = OrbitControls::new(camera.target);
        let scene = Scene::new(&config);

        surface.attach();
        let [physical_width, physical_height] = surface.physical_size();
        info!(
            "Mounted viewport session at {:.0}x{:.0} points ({}x{} px, ratio {:.2})",
            width,
            height,
            physical_width,
            physical_height,
            surface.pixel_ratio()
        );

        Self {
            config,
            state: SessionState::Live,
            started: Instant::now(),
            scene,
            camera,
            controls,
            surface,
            panel: ParameterPanel::new(),
            rotation_degrees: 0.0,
            pending_load: None,
            loading: false,
        }
    }

    /// Starts loading the environment in the background.
    ///
    /// Ignored when a load is already running or finished: a session loads at most one
    /// environment.
    pub fn request_environment<S: EnvironmentSource>(&mut self, source: S) {
        if !self.is_live() {
            return;
        }
        if self.loading || self.scene.has_environment() {
            warn!("Environment already requested; ignoring {}", source.describe());
            return;
        }
        self.loading = true;
        self.pending_load = Some(AssetLoader::spawn(source));
    }

    /// Delivers a finished load if there is one. Called on the UI thread every frame.
    pub fn poll_environment(&mut self) {
        let result = match self.pending_load.as_ref().and_then(PendingLoad::poll) {
            Some(result) => result,
            None => return,
        };
        self.pending_load = None;
        self.on_environment_loaded(result);
    }

    /// Load completion handler. A result arriving after teardown is ignored.
    ///
    /// Returns whether the result was applied.
    pub fn on_environment_loaded(&mut self, result: Result<EnvironmentMap, LoadError>) -> bool {
        if !self.is_live() {
            debug!("Dropping environment load result for a torn down session");
            return false;
        }

        self.loading = false;
        match result {
            Ok(environment) => {
                let (width, height) = (environment.width(), environment.height());
                if self.scene.set_environment(Arc::new(environment)) {
                    info!("Environment loaded ({}x{})", width, height);
                    true
                } else {
                    warn!("Environment already present; discarding second load");
                    false
                }
            }
            Err(e) => {
                error!("Failed to load environment: {}", e);
                true
            }
        }
    }

    /// Applies one panel edit to the live scene
    pub fn apply(&mut self, change: ParameterChange) {
        if !self.is_live() {
            return;
        }
        match change {
            ParameterChange::Metalness { side, value } => {
                self.scene.object_mut(side).material.metalness = value;
            }
            ParameterChange::Roughness { side, value } => {
                self.scene.object_mut(side).material.roughness = value;
            }
            ParameterChange::Color { side, rgb } => {
                self.scene.object_mut(side).material.color = rgb;
            }
            ParameterChange::Exposure(value) => {
                self.surface.exposure = value;
            }
            ParameterChange::EnvironmentRotation { degrees } => {
                self.rotation_degrees = degrees;
                self.scene.set_rotation_degrees(degrees);
            }
        }
    }

    /// Shows the parameter panel and applies whatever it changed
    pub fn show_panel(&mut self, ctx: &egui::Context) {
        let values = self.panel_values();
        for change in self.panel.show(ctx, &values) {
            self.apply(change);
        }
    }

    pub fn panel_values(&self) -> PanelValues {
        PanelValues {
            materials: [
                self.scene.object(Side::Left).material,
                self.scene.object(Side::Right).material,
            ],
            exposure: self.surface.exposure,
            rotation_degrees: self.rotation_degrees,
            loading: self.loading,
        }
    }

    /// Viewport dimension change. Returns whether anything changed.
    pub fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) -> bool {
        if !self.is_live() {
            return false;
        }
        let changed = self.surface.set_size(width, height, pixel_ratio);
        self.camera.set_aspect(self.surface.aspect());
        if changed {
            let [w, h] = self.surface.physical_size();
            debug!("Viewport resized to {:.0}x{:.0} points ({}x{} px)", width, height, w, h);
        }
        changed
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let height = self.surface.logical_size()[1];
        self.controls.rotate_pixels(dx, dy, height);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let height = self.surface.logical_size()[1];
        self.controls.pan_pixels(dx, dy, &self.camera, height);
    }

    pub fn zoom(&mut self, notches: f32) {
        self.controls.zoom(notches);
    }

    /// One render loop step using the session clock
    pub fn step(&mut self) -> Option<FrameState> {
        let elapsed = self.started.elapsed().as_secs_f32();
        self.step_at(elapsed)
    }

    /// One render loop step at `elapsed` seconds since mount: animate, advance the
    /// controller, and produce the frame to draw. `None` once torn down.
    pub fn step_at(&mut self, elapsed: f32) -> Option<FrameState> {
        if !self.is_live() {
            return None;
        }
        self.scene
            .animate(elapsed, self.config.bob_amplitude, self.config.bob_phase);
        self.controls.update(&mut self.camera);
        Some(self.frame_state())
    }

    fn frame_state(&self) -> FrameState {
        let objects = Side::ALL.map(|side| {
            let object = self.scene.object(side);
            ObjectDraw {
                model: object.model_matrix(),
                material: object.material,
            }
        });

        FrameState {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            camera_position: self.camera.position,
            objects,
            environment: self.scene.environment().cloned(),
            background_rotation: self.scene.background_rotation,
            environment_rotation: self.scene.environment_rotation,
            exposure: self.surface.exposure,
            tone_mapping: self.surface.tone_mapping,
            physical_size: self.surface.physical_size(),
        }
    }

    /// Ends the session. Only the first call does anything.
    pub fn teardown(&mut self) -> Option<TeardownReport> {
        if !self.is_live() {
            return None;
        }
        self.state = SessionState::TornDown;

        let pending_load_abandoned = self.pending_load.take().is_some();
        let environment_released = self.scene.take_environment().is_some();
        self.loading = false;
        self.surface.detach();
        self.panel.dismantle();

        let report = TeardownReport {
            environment_released,
            objects_released: self.scene.objects().len(),
            pending_load_abandoned,
        };
        info!(
            "Viewport session torn down: {:?} (camera {:.2} from target, settling: {})",
            report,
            self.camera.distance_to_target(),
            self.controls.is_settling()
        );
        Some(report)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state() == SessionState::Live
    }

    /// Whether the camera is still easing toward its last input
    pub fn is_settling(&self) -> bool {
        self.controls.is_settling()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::time::Duration;

    fn session() -> ViewportSession {
        ViewportSession::mount(ViewerConfig::default(), 800.0, 600.0, 1.0)
    }

    fn environment() -> EnvironmentMap {
        EnvironmentMap::solid(8, 4, [1.0, 0.9, 0.8])
    }

    struct MemorySource(Option<[f32; 3]>);

    impl EnvironmentSource for MemorySource {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        fn fetch(&self) -> Result<EnvironmentMap, LoadError> {
            match self.0 {
                Some(rgb) => Ok(EnvironmentMap::solid(8, 4, rgb)),
                None => Err(LoadError::Http("connection refused".to_string())),
            }
        }
    }

    fn poll_until_settled(session: &mut ViewportSession) {
        for _ in 0..1000 {
            session.poll_environment();
            if !session.is_loading() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("environment load never settled");
    }

    #[test]
    fn test_mount_attaches_surface() {
        let session = session();
        assert!(session.is_live());
        assert!(session.surface().is_attached());
        assert!(!session.scene().has_environment());
        assert!((session.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_bob_offsets_follow_elapsed_time() {
        let mut session = session();
        let config = ViewerConfig::default();
        for step in 0..500 {
            let t = step as f32 * 0.13;
            session.step_at(t).expect("live session steps");
            let left = session.scene().object(Side::Left).vertical_offset;
            let right = session.scene().object(Side::Right).vertical_offset;
            assert!((left - config.bob_amplitude * t.sin()).abs() < 1e-5);
            assert!((right - config.bob_amplitude * (t + config.bob_phase).sin()).abs() < 1e-5);
            assert!(left.abs() <= config.bob_amplitude + 1e-6);
            assert!(right.abs() <= config.bob_amplitude + 1e-6);
        }
    }

    #[test]
    fn test_exposure_maps_one_to_one() {
        let mut session = session();
        for value in [0.0, 0.25, 1.0, 1.7, 2.0] {
            session.apply(ParameterChange::Exposure(value));
            assert_eq!(session.surface().exposure, value);
            assert_eq!(session.step_at(0.0).unwrap().exposure, value);
        }
    }

    #[test]
    fn test_rotation_converted_to_radians() {
        let mut session = session();
        for degrees in [0.0f32, 45.0, 180.0, 270.0, 360.0] {
            session.apply(ParameterChange::EnvironmentRotation { degrees });
            let expected = degrees * PI / 180.0;
            assert!((session.scene().background_rotation - expected).abs() < 1e-5);
            assert!((session.scene().environment_rotation - expected).abs() < 1e-5);
            assert_eq!(session.rotation_degrees(), degrees);
        }
    }

    #[test]
    fn test_teardown_after_load_releases_environment_once() {
        let mut session = session();
        session.loading = true;
        assert!(session.on_environment_loaded(Ok(environment())));
        assert!(session.scene().has_environment());
        assert!(!session.is_loading());

        let report = session.teardown().expect("first teardown reports");
        assert!(report.environment_released);
        assert_eq!(report.objects_released, 2);
        assert!(!session.scene().has_environment());
        assert!(session.teardown().is_none());
    }

    #[test]
    fn test_teardown_before_load_then_late_callback() {
        let mut session = session();
        session.loading = true;

        let report = session.teardown().expect("first teardown reports");
        assert!(!report.environment_released);
        assert!(!session.surface().is_attached());

        assert!(!session.on_environment_loaded(Ok(environment())));
        assert!(!session.scene().has_environment());
        assert!(session.teardown().is_none());
    }

    #[test]
    fn test_failed_load_clears_loading_flag() {
        let mut session = session();
        session.loading = true;
        session.on_environment_loaded(Err(LoadError::Http("404".to_string())));
        assert!(!session.is_loading());
        assert!(!session.scene().has_environment());
        assert!(session.step_at(1.0).unwrap().environment.is_none());
    }

    #[test]
    fn test_second_environment_is_ignored() {
        let mut session = session();
        assert!(session.on_environment_loaded(Ok(environment())));
        assert!(!session.on_environment_loaded(Ok(EnvironmentMap::solid(2, 1, [0.0; 3]))));
        assert_eq!(session.scene().environment().unwrap().width(), 8);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut session = session();
        assert!(session.resize(1024.0, 512.0, 3.0));
        let once = (session.camera().aspect, session.surface().physical_size());
        assert!(!session.resize(1024.0, 512.0, 3.0));
        let twice = (session.camera().aspect, session.surface().physical_size());
        assert_eq!(once, twice);
        assert_eq!(once.0, 2.0);
        assert_eq!(once.1, [2048, 1024]);
    }

    #[test]
    fn test_set_left_metalness_after_load() {
        let mut session = session();
        session.on_environment_loaded(Ok(environment()));
        let right_before = session.scene().object(Side::Right).material;

        session.apply(ParameterChange::Metalness { side: Side::Left, value: 0.3 });

        assert_eq!(session.scene().object(Side::Left).material.metalness, 0.3);
        assert_eq!(session.scene().object(Side::Right).material, right_before);
        let frame = session.step_at(0.5).unwrap();
        assert_eq!(frame.objects[Side::Left.index()].material.metalness, 0.3);
        assert!(frame.environment.is_some());
    }

    #[test]
    fn test_color_and_roughness_changes() {
        let mut session = session();
        session.apply(ParameterChange::Roughness { side: Side::Right, value: 0.8 });
        session.apply(ParameterChange::Color { side: Side::Right, rgb: [0.1, 0.2, 0.3] });
        let right = session.scene().object(Side::Right).material;
        assert_eq!(right.roughness, 0.8);
        assert_eq!(right.color, [0.1, 0.2, 0.3]);
        assert_eq!(session.panel_values().materials[Side::Right.index()], right);
    }

    #[test]
    fn test_loop_stops_after_teardown() {
        let mut session = session();
        assert!(session.step_at(0.1).is_some());
        session.teardown();
        assert!(session.step_at(0.2).is_none());
        assert!(session.step().is_none());

        let metalness = session.scene().object(Side::Left).material.metalness;
        session.apply(ParameterChange::Metalness { side: Side::Left, value: 0.0 });
        assert_eq!(session.scene().object(Side::Left).material.metalness, metalness);
        assert!(!session.resize(10.0, 10.0, 1.0));
    }

    #[test]
    fn test_orbit_settles_and_teardown_is_terminal() {
        let mut session = session();
        assert_eq!(session.state(), SessionState::Live);
        assert!(!session.is_settling());

        session.orbit(40.0, 10.0);
        assert!(session.is_settling());
        let distance = session.camera().distance_to_target();
        for step in 0..1000 {
            session.step_at(step as f32 / 60.0);
        }
        assert!(!session.is_settling());
        assert!((session.camera().distance_to_target() - distance).abs() < 1e-3);

        session.teardown();
        assert_eq!(session.state(), SessionState::TornDown);
        assert!(session.teardown().is_none());
        assert_eq!(session.state(), SessionState::TornDown);
    }

    #[test]
    fn test_threaded_load_is_delivered_on_poll() {
        let mut session = session();
        session.request_environment(MemorySource(Some([0.5, 0.5, 0.5])));
        assert!(session.is_loading());
        assert!(session.panel_values().loading);

        poll_until_settled(&mut session);
        assert!(session.scene().has_environment());

        // Only one environment per session
        session.request_environment(MemorySource(Some([1.0, 0.0, 0.0])));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_threaded_load_failure_leaves_session_usable() {
        let mut session = session();
        session.request_environment(MemorySource(None));
        poll_until_settled(&mut session);
        assert!(!session.scene().has_environment());
        assert!(session.step_at(0.0).is_some());
    }

    #[test]
    fn test_teardown_abandons_pending_load() {
        let mut session = session();
        session.request_environment(MemorySource(Some([0.5, 0.5, 0.5])));
        let report = session.teardown().unwrap();
        assert!(report.pending_load_abandoned);
        assert!(!report.environment_released);
        session.poll_environment();
        assert!(!session.scene().has_environment());
    }
}
