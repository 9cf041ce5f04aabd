//! Viewer path for the fly-by: down toward the surface, then back out.

use glam::DVec3;

/// Altitude schedule over a fixed number of frames.
///
/// Altitude falls geometrically from `start_altitude` to `end_altitude` over
/// the first half of the frames and climbs back over the second half.
#[derive(Clone, Copy, Debug)]
pub struct Flight {
    pub frames: u32,
    pub start_altitude: f64,
    pub end_altitude: f64,
    pub direction: DVec3,
}

impl Flight {
    pub fn altitude(&self, frame: u32) -> f64 {
        if self.frames < 2 {
            return self.start_altitude;
        }
        let last = f64::from(self.frames - 1);
        let t = f64::from(frame.min(self.frames - 1)) / last;
        // Triangle wave: 0 -> 1 -> 0.
        let depth = 1.0 - (2.0 * t - 1.0).abs();
        let (start, end) = (self.start_altitude.max(1e-9), self.end_altitude.max(1e-9));
        start * (end / start).powf(depth)
    }

    /// Viewer position at `frame` above a sphere of `radius` centred at `centre`.
    pub fn viewer(&self, frame: u32, centre: DVec3, radius: f64) -> DVec3 {
        let direction = self.direction.try_normalize().unwrap_or(DVec3::Y);
        centre + direction * (radius + self.altitude(frame))
    }
}
