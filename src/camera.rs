//! Initial camera pose for an interactive navigation component.

use glam::Vec3;
use serde::Serialize;

use crate::types::{Camera, FovAxis};

/// Eye, orientation and field of view derived from the sensor.
///
/// The sensor transform is camera-to-world: column 3 is the eye, column 2
/// the view direction and column 1 the up vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub eye: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    pub up: Vec3,
    /// One unit along `forward` from the eye.
    pub target: Vec3,
    /// Rotation about +Y, radians; 0 looks down +Z.
    pub yaw: f32,
    /// Elevation, radians; positive looks down.
    pub pitch: f32,
    pub fov_degrees: f32,
    pub fov_axis: FovAxis,
}

impl CameraPose {
    pub fn from_camera(camera: &Camera) -> Self {
        let m = camera.transform;
        let eye = m.col(3).truncate();
        let forward = m.col(2).truncate().normalize_or(Vec3::Z);
        let up = m.col(1).truncate().normalize_or(Vec3::Y);

        Self {
            eye,
            forward,
            up,
            target: eye + forward,
            pitch: (-forward.y).clamp(-1.0, 1.0).asin(),
            yaw: forward.x.atan2(forward.z),
            fov_degrees: camera.fov_degrees,
            fov_axis: camera.fov_axis,
        }
    }

    /// Vertical field of view for a viewport of the given aspect ratio.
    ///
    /// A horizontal FOV is converted with `2·atan(tan(h/2) / aspect)`; a
    /// vertical one is returned unchanged.
    pub fn vertical_fov_degrees(&self, aspect: f32) -> f32 {
        match self.fov_axis {
            FovAxis::Y => self.fov_degrees,
            FovAxis::X if aspect > 0.0 => {
                let half = (self.fov_degrees.to_radians() * 0.5).tan() / aspect;
                (2.0 * half.atan()).to_degrees()
            }
            FovAxis::X => self.fov_degrees,
        }
    }
}

impl From<&Camera> for CameraPose {
    fn from(camera: &Camera) -> Self {
        Self::from_camera(camera)
    }
}
