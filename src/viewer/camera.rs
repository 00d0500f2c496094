use nalgebra as na;

const ROTATE_SENSITIVITY: f32 = 0.005;
const PAN_SENSITIVITY_FACTOR: f32 = 0.0005;
/// Exponential smoothing rate for orbit damping, per second
const DAMPING_RATE: f32 = 10.0;
/// Fixed framing diagonal; normalized before use
const FRAME_DIAGONAL: [f32; 3] = [1.0, 0.6, 1.0];
/// Eye distance as a multiple of the framed model's largest dimension
const FRAME_DISTANCE_FACTOR: f32 = 2.0;

/// Arc-ball camera for orbital rotation around a target point.
///
/// Input events move the goal state; the rendered state eases toward it
/// each frame (`update`), giving damped orbit/pan/zoom motion.
pub struct ArcBallCamera {
    /// Target point (look-at)
    target: na::Point3<f32>,
    /// Distance from target
    distance: f32,
    /// Vertical angle (pitch)
    theta: f32,
    /// Horizontal angle (yaw)
    phi: f32,
    goal_target: na::Point3<f32>,
    goal_distance: f32,
    goal_theta: f32,
    goal_phi: f32,
    /// Up vector
    up: na::Vector3<f32>,
    /// Viewport size
    width: u32,
    height: u32,
}

impl ArcBallCamera {
    /// Create a camera framed for a model of the given largest dimension
    pub fn new(max_dimension: f32, width: u32, height: u32) -> Self {
        let mut camera = Self {
            target: na::Point3::origin(),
            distance: 1.0,
            theta: 0.0,
            phi: 0.0,
            goal_target: na::Point3::origin(),
            goal_distance: 1.0,
            goal_theta: 0.0,
            goal_phi: 0.0,
            up: na::Vector3::y(),
            width,
            height,
        };
        camera.frame(max_dimension);
        camera
    }

    /// Reposition to frame a model centered at the origin: eye offset along
    /// the fixed diagonal at twice the largest dimension. Snaps (no damping).
    pub fn frame(&mut self, max_dimension: f32) {
        let diagonal = na::Vector3::from(FRAME_DIAGONAL).normalize();
        let distance = (max_dimension * FRAME_DISTANCE_FACTOR).max(0.1);
        let to_eye = diagonal * distance;

        let horizontal = (to_eye.x * to_eye.x + to_eye.z * to_eye.z).sqrt();
        self.theta = (-to_eye.y).atan2(horizontal);
        self.phi = to_eye.x.atan2(to_eye.z);
        self.distance = distance;
        self.target = na::Point3::origin();

        self.goal_target = self.target;
        self.goal_distance = self.distance;
        self.goal_theta = self.theta;
        self.goal_phi = self.phi;
    }

    /// Ease the damped state toward the input goals
    pub fn update(&mut self, dt: f32) {
        let t = 1.0 - (-DAMPING_RATE * dt.max(0.0)).exp();
        self.distance += (self.goal_distance - self.distance) * t;
        self.theta += (self.goal_theta - self.theta) * t;
        self.phi += (self.goal_phi - self.phi) * t;
        self.target += (self.goal_target - self.target) * t;
    }

    /// Current eye position in world space
    pub fn position(&self) -> na::Point3<f32> {
        na::Point3::new(
            self.target.x + self.distance * self.theta.cos() * self.phi.sin(),
            self.target.y - self.distance * self.theta.sin(),
            self.target.z + self.distance * self.theta.cos() * self.phi.cos(),
        )
    }

    pub fn target(&self) -> na::Point3<f32> {
        self.target
    }

    pub fn view_matrix(&self) -> na::Matrix4<f32> {
        na::Matrix4::look_at_rh(&self.position(), &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> na::Matrix4<f32> {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        na::Matrix4::new_perspective(aspect, 45.0_f32.to_radians(), 0.1, 1000.0)
    }

    pub fn view_projection_matrix(&self) -> na::Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Handle mouse drag for rotation
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        // Negative so dragging right rotates the model right
        self.goal_phi -= delta_x * ROTATE_SENSITIVITY;
        self.goal_theta = (self.goal_theta - delta_y * ROTATE_SENSITIVITY).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
    }

    /// Handle mouse drag for panning
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let sensitivity = PAN_SENSITIVITY_FACTOR * self.distance;

        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);

        self.goal_target += right * (-delta_x * sensitivity) + up * (delta_y * sensitivity);
    }

    /// Handle scroll for zoom
    pub fn zoom(&mut self, delta: f32) {
        self.goal_distance = (self.goal_distance * (1.0 - delta * 0.1)).max(0.1);
    }

    /// Update viewport size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_distance_is_twice_the_largest_dimension() {
        let camera = ArcBallCamera::new(1.5, 800, 600);
        let to_eye = camera.position() - camera.target();
        assert!((to_eye.norm() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_framing_targets_the_origin() {
        let mut camera = ArcBallCamera::new(1.0, 800, 600);
        camera.pan(50.0, -30.0);
        camera.update(10.0);
        assert!((camera.target() - na::Point3::origin()).norm() > 0.0);

        camera.frame(3.0);
        assert_eq!(camera.target(), na::Point3::origin());
    }

    #[test]
    fn test_damping_converges_to_goal() {
        let mut camera = ArcBallCamera::new(1.0, 800, 600);
        let before = camera.position();

        camera.rotate(100.0, 0.0);
        // One long step is enough for the exponential ease to settle
        camera.update(10.0);
        let settled = camera.position();
        camera.update(1.0);

        assert!((camera.position() - settled).norm() < 1e-3);
        assert!((settled - before).norm() > 1e-3);
    }

    #[test]
    fn test_pitch_is_clamped_short_of_the_poles() {
        let mut camera = ArcBallCamera::new(1.0, 800, 600);
        camera.rotate(0.0, 1.0e6);
        camera.update(10.0);

        let to_eye = camera.position() - camera.target();
        let horizontal = (to_eye.x * to_eye.x + to_eye.z * to_eye.z).sqrt();
        assert!(horizontal > 1e-4, "camera reached the pole");
    }

    #[test]
    fn test_zoom_never_reaches_the_target() {
        let mut camera = ArcBallCamera::new(1.0, 800, 600);
        for _ in 0..1000 {
            camera.zoom(10.0);
        }
        camera.update(10.0);
        assert!((camera.position() - camera.target()).norm() >= 0.1 - 1e-4);
    }
}
