//! Render back end seam
//!
//! The engine never talks to a graphics API directly. Each frame it hands a
//! [`FrameData`] to whatever [`RenderBackend`] the application installed.

use super::lighting::Lights;
use super::renderform::{RenderError, RenderForm};
use crate::foundation::math::Mat4;
use crate::scene::aabb::AABB;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Everything needed to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    /// Baked scene
    pub form: &'a RenderForm,
    /// Camera view matrix
    pub view: Mat4,
    /// Projection matrix
    pub projection: Mat4,
    /// Lights to shade with
    pub lights: &'a Lights,
    /// World boxes to outline, empty unless box display is on
    pub debug_boxes: &'a [AABB],
}

/// Consumer of baked frames
pub trait RenderBackend {
    /// Draw a frame
    fn submit(&mut self, frame: &FrameData<'_>) -> BackendResult<()>;

    /// Called once when the engine shuts down
    fn shutdown(&mut self) {}
}

/// Owned copy of a submitted frame
#[derive(Debug, Clone)]
pub struct RecordedFrame {
    /// Baked scene
    pub form: RenderForm,
    /// Camera view matrix
    pub view: Mat4,
    /// Projection matrix
    pub projection: Mat4,
    /// Lights at submission
    pub lights: Lights,
    /// Outlined boxes
    pub debug_boxes: Vec<AABB>,
}

/// Back end that keeps every frame it is given
///
/// For headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    frames: Vec<RecordedFrame>,
    limit: Option<usize>,
    shut_down: bool,
}

impl RecordingBackend {
    /// Keep every frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `limit` frames
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Recorded frames, oldest first
    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// Most recent frame
    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    /// Whether [`RenderBackend::shutdown`] was called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl RenderBackend for RecordingBackend {
    fn submit(&mut self, frame: &FrameData<'_>) -> BackendResult<()> {
        if self.shut_down {
            return Err(RenderError::Backend("submit after shutdown".to_string()));
        }
        match self.limit {
            Some(0) => return Ok(()),
            Some(limit) if self.frames.len() >= limit => {
                self.frames.remove(0);
            }
            _ => {}
        }
        self.frames.push(RecordedFrame {
            form: frame.form.clone(),
            view: frame.view,
            projection: frame.projection,
            lights: frame.lights.clone(),
            debug_boxes: frame.debug_boxes.to_vec(),
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::renderform::RenderformCreator;
    use crate::scene::graph::Scene;

    fn empty_frame_parts() -> (RenderForm, Lights) {
        let form = RenderformCreator::new().bake(&Scene::default(), 0.0).unwrap();
        (form, Lights::new())
    }

    #[test]
    fn test_recording_backend_keeps_frames() {
        let (form, lights) = empty_frame_parts();
        let mut backend = RecordingBackend::new();
        let frame = FrameData {
            form: &form,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            lights: &lights,
            debug_boxes: &[AABB::default()],
        };

        backend.submit(&frame).unwrap();
        backend.submit(&frame).unwrap();
        assert_eq!(backend.frames().len(), 2);
        assert_eq!(backend.last_frame().unwrap().debug_boxes.len(), 1);
    }

    #[test]
    fn test_recording_limit_drops_oldest() {
        let (form, lights) = empty_frame_parts();
        let mut backend = RecordingBackend::new().with_limit(2);
        for i in 0..3 {
            let frame = FrameData {
                form: &form,
                view: Mat4::new_scaling(i as f32 + 1.0),
                projection: Mat4::identity(),
                lights: &lights,
                debug_boxes: &[],
            };
            backend.submit(&frame).unwrap();
        }
        assert_eq!(backend.frames().len(), 2);
        assert_eq!(backend.frames()[0].view, Mat4::new_scaling(2.0));
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let (form, lights) = empty_frame_parts();
        let mut backend = RecordingBackend::new();
        backend.shutdown();
        let frame = FrameData {
            form: &form,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            lights: &lights,
            debug_boxes: &[],
        };
        assert!(matches!(backend.submit(&frame), Err(RenderError::Backend(_))));
        assert!(backend.is_shut_down());
    }
}
