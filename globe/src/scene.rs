/// What the view knows about the renderer's scene. Empty until the renderer
/// reports that it is ready.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct SceneMetrics {
    radius: Option<f64>,
}

impl SceneMetrics {
    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    pub fn is_ready(&self) -> bool {
        self.radius.is_some()
    }

    /// Returns true if this changed the radius
    pub fn set_ready(&mut self, radius: f64) -> bool {
        self.radius.replace(radius) != Some(radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness() {
        let mut scene = SceneMetrics::default();
        assert!(!scene.is_ready());
        assert!(scene.set_ready(100.0));
        assert!(!scene.set_ready(100.0));
        assert!(scene.set_ready(50.0));
        assert_eq!(scene.radius(), Some(50.0));
    }
}
