use std::time::Instant;

use glam::{Mat3, Mat4};
use glium::{backend::Facade, DrawParameters, Surface};

use crate::{
    buffer::GeometryBuffer,
    camera::FpsCamera,
    config::Config,
    error::RenderError,
    shader::{Pipeline, UniformSlot},
    texture::{CubeMapTexture, Texture2D},
    transform::Transform3D,
};

pub const CLEAR_COLOR: (f32, f32, f32, f32) = (0.0, 0.0, 0.0, 1.0);
/// Depth the buffer is cleared to, which is also where skybox fragments end up
pub const FAR_DEPTH: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Exiting,
}

impl RunState {
    /// Escape or a close request. `Exiting` is terminal.
    pub fn exit(&mut self) {
        *self = RunState::Exiting;
    }

    pub fn is_running(self) -> bool {
        self == RunState::Running
    }

    /// Whether a redraw should render and present a frame. Nothing is drawn once the
    /// loop is on its way out.
    pub fn should_draw(self) -> bool {
        self.is_running()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimised window can report zero for either side.
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// Right handed, OpenGL clip depth (-1..1).
    pub fn matrix(&self, viewport: &Viewport) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, viewport.aspect(), self.near, self.far)
    }
}

/// All matrices one frame needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMatrices {
    pub view_projection: Mat4,
    /// `projection * view` with the view translation dropped, so the skybox turns with
    /// the camera but never moves
    pub skybox_view_projection: Mat4,
}

impl FrameMatrices {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view_projection: projection * view,
            skybox_view_projection: projection * Mat4::from_mat3(Mat3::from_mat4(view)),
        }
    }
}

/// Depth comparison used by a draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthPolicy {
    #[default]
    Less,
    /// Lets fragments sitting exactly on the cleared depth through
    LessOrEqual,
}

impl From<DepthPolicy> for glium::DepthTest {
    fn from(policy: DepthPolicy) -> Self {
        match policy {
            DepthPolicy::Less => glium::DepthTest::IfLess,
            DepthPolicy::LessOrEqual => glium::DepthTest::IfLessOrEqual,
        }
    }
}

/// The depth comparison currently in force. Changes are only made through `scoped`,
/// which always puts the previous policy back.
#[derive(Debug, Default)]
pub struct DepthState {
    policy: DepthPolicy,
}

impl DepthState {
    pub fn current(&self) -> DepthPolicy {
        self.policy
    }

    pub fn params(&self) -> DrawParameters<'static> {
        DrawParameters {
            depth: glium::Depth {
                test: self.policy.into(),
                write: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Run `draw` with `policy` in force, restoring the previous policy afterwards
    /// whether or not `draw` succeeded.
    pub fn scoped<T, E>(
        &mut self,
        policy: DepthPolicy,
        draw: impl FnOnce(&DrawParameters<'static>) -> Result<T, E>,
    ) -> Result<T, E> {
        let previous = std::mem::replace(&mut self.policy, policy);
        let result = draw(&self.params());
        self.policy = previous;
        result
    }
}

/// Delta time between frames.
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick; resets the timer.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

/// Slots of the object program
struct ObjectSlots {
    world: UniformSlot,
    view_projection: UniformSlot,
    texture: UniformSlot,
}

/// Slots of the skybox program
struct SkyboxSlots {
    view_projection: UniformSlot,
    cube_map: UniformSlot,
}

pub const WORLD_MATRIX: &str = "worldMatrix";
pub const CAMERA_VIEW: &str = "cameraView";
pub const TEXTURE: &str = "tex";
pub const CUBE_MAP: &str = "cubeMap";

pub const OBJECT_UNIFORMS: [&str; 3] = [WORLD_MATRIX, CAMERA_VIEW, TEXTURE];
pub const SKYBOX_UNIFORMS: [&str; 2] = [CAMERA_VIEW, CUBE_MAP];

/// Everything the render loop owns: GPU resources, the two pipelines, the moving parts
/// of the scene, and the state the loop itself runs on.
pub struct RenderState {
    cube: GeometryBuffer,
    texture: Texture2D,
    cube_map: CubeMapTexture,
    object_pipeline: Pipeline,
    object_slots: ObjectSlots,
    skybox_pipeline: Pipeline,
    skybox_slots: SkyboxSlots,

    pub object: Transform3D,
    pub camera: FpsCamera,
    pub viewport: Viewport,
    projection: Projection,
    rotation_rate: f32,
    depth: DepthState,
    run_state: RunState,
}

impl RenderState {
    /// Loads and uploads every asset. Any failure here is fatal.
    pub fn new<F: Facade + ?Sized>(facade: &F, config: &Config) -> Result<Self, RenderError> {
        let paths = config.asset_paths();

        let cube = GeometryBuffer::cube(facade)?;
        let texture = Texture2D::load(facade, &paths.texture)?;
        let cube_map = CubeMapTexture::load(facade, &paths.skybox_faces)?;

        let object_pipeline = Pipeline::from_files(
            facade,
            &paths.vertex_shader,
            &paths.fragment_shader,
            &OBJECT_UNIFORMS,
        )?;
        let object_slots = ObjectSlots {
            world: object_pipeline.slot(WORLD_MATRIX),
            view_projection: object_pipeline.slot(CAMERA_VIEW),
            texture: object_pipeline.slot(TEXTURE),
        };

        let skybox_pipeline = Pipeline::from_files(
            facade,
            &paths.skybox_vertex_shader,
            &paths.skybox_fragment_shader,
            &SKYBOX_UNIFORMS,
        )?;
        let skybox_slots = SkyboxSlots {
            view_projection: skybox_pipeline.slot(CAMERA_VIEW),
            cube_map: skybox_pipeline.slot(CUBE_MAP),
        };

        let (width, height) = config.window_size;
        Ok(Self {
            cube,
            texture,
            cube_map,
            object_pipeline,
            object_slots,
            skybox_pipeline,
            skybox_slots,
            object: Transform3D::at(config.object_position),
            camera: FpsCamera::new(config.move_speed, config.mouse_sensitivity),
            viewport: Viewport::new(width, height),
            projection: Projection {
                fov_y: config.fov_y,
                near: config.near,
                far: config.far,
            },
            rotation_rate: config.rotation_rate,
            depth: DepthState::default(),
            run_state: RunState::Running,
        })
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn request_exit(&mut self) {
        self.run_state.exit();
    }

    /// Advances the camera and the spinning cube by `dt` seconds and returns the
    /// matrices to draw them with.
    pub fn advance(&mut self, dt: f32) -> FrameMatrices {
        self.camera.update(dt);
        self.object.rotate_y(self.rotation_rate * dt);

        FrameMatrices::new(
            self.camera.view_matrix(),
            self.projection.matrix(&self.viewport),
        )
    }

    /// One iteration of the render loop: the cube first, then the skybox behind it.
    /// Does nothing once an exit was requested.
    pub fn draw_frame<S: Surface + ?Sized>(
        &mut self,
        target: &mut S,
        dt: f32,
    ) -> Result<(), RenderError> {
        if !self.run_state.should_draw() {
            return Ok(());
        }
        debug_assert_eq!(self.depth.current(), DepthPolicy::Less);
        let matrices = self.advance(dt);

        target.clear_color_and_depth(CLEAR_COLOR, FAR_DEPTH);

        let mut uniforms = self.object_pipeline.uniforms();
        uniforms.set_matrix4(self.object_slots.view_projection, matrices.view_projection);
        uniforms.set_texture_2d(self.object_slots.texture, &self.texture);
        uniforms.set_matrix4(self.object_slots.world, self.object.matrix());
        self.cube.draw(
            target,
            &self.object_pipeline,
            &uniforms,
            &self.depth.params(),
        )?;

        // the skybox sits exactly on the far plane, so it only survives where the
        // cleared depth was never overwritten
        let mut uniforms = self.skybox_pipeline.uniforms();
        uniforms.set_matrix4(
            self.skybox_slots.view_projection,
            matrices.skybox_view_projection,
        );
        uniforms.set_cube_map(self.skybox_slots.cube_map, &self.cube_map);
        let cube = &self.cube;
        let skybox_pipeline = &self.skybox_pipeline;
        self.depth.scoped(DepthPolicy::LessOrEqual, |params| {
            cube.draw(target, skybox_pipeline, &uniforms, params)
        })
    }
}
