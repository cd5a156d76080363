//! Rendering front end
//!
//! Everything between the scene and a graphics API: baking the scene into a
//! render form, the lights and camera that go with it, and the back-end trait
//! frames are submitted through.

pub mod backend;
pub mod camera;
pub mod lighting;
pub mod renderform;

pub use backend::{BackendResult, FrameData, RecordedFrame, RecordingBackend, RenderBackend};
pub use camera::{Camera, CameraState, MoveDirection};
pub use lighting::{Attenuation, DirectionalLight, LightCommand, Lights, PointLight};
pub use renderform::{
    EnvironmentMaps, InstanceData, RenderEntry, RenderError, RenderForm, RenderformCreator,
};
