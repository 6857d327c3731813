//! Per-node animations stepped once per frame.
//!
//! An [`Animator`] keeps a list of assignments; a node may carry several. Each
//! step advances every assignment whose node is visible and animated, assuming a
//! time step of one frame.

use crate::math::Vec3;
use crate::scene::{NodeId, Scene};
use crate::transform::TransformOp;

/// Depth of the box moving nodes bounce in, on either side of `z = 0`.
pub const BOUNDS_DEPTH: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Add `speed` (radians per frame) to the rotation.
    Rotate { speed: Vec3 },
    /// Add `velocity` to the translation, reflecting each component that leaves
    /// the bounds.
    Move { velocity: Vec3 },
}

impl Animation {
    pub fn name(&self) -> &'static str {
        match self {
            Animation::Rotate { .. } => "rotate",
            Animation::Move { .. } => "move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Assignment {
    node: NodeId,
    animation: Animation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    assignments: Vec<Assignment>,
    min: Vec3,
    max: Vec3,
}

impl Animator {
    /// Bounds derived from the canvas: `±width/2`, `±height/2`, `±BOUNDS_DEPTH`.
    /// Create a new animator after a resize.
    pub fn new(width: usize, height: usize) -> Self {
        let half = Vec3::new(width as f32 / 2.0, height as f32 / 2.0, BOUNDS_DEPTH);
        Self {
            assignments: Vec::new(),
            min: -half,
            max: half,
        }
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    /// Attach `animation` to `node` and mark the node animated.
    pub fn assign(&mut self, scene: &mut Scene, node: NodeId, animation: Animation) {
        self.assignments.push(Assignment { node, animation });
        scene.graph_mut().set_animated(node, true);
    }

    /// Comma separated animation names of `node`, in assignment order.
    pub fn animations_of(&self, node: NodeId) -> String {
        self.assignments
            .iter()
            .filter(|a| a.node == node)
            .map(|a| a.animation.name())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Advance every active assignment by one frame. Returns whether anything
    /// changed; the scene is then marked for redraw.
    pub fn step(&mut self, scene: &mut Scene) -> bool {
        let mut changed = false;
        for assignment in &mut self.assignments {
            let node = scene.graph().node(assignment.node);
            if !(node.is_visible() && node.is_animated()) {
                continue;
            }
            match &mut assignment.animation {
                Animation::Rotate { speed } => {
                    scene.rotate(assignment.node, *speed, TransformOp::By);
                }
                Animation::Move { velocity } => {
                    let position = node.transform().translation();
                    *velocity = bounce(position, *velocity, self.min, self.max);
                    scene.translate(assignment.node, *velocity, TransformOp::By);
                }
            }
            changed = true;
        }
        if changed {
            scene.set_up_to_date(false);
        }
        changed
    }
}

/// Reverse each velocity component that would carry `position` past a bound.
fn bounce(position: Vec3, mut velocity: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    for axis in 0..3 {
        let next = position[axis] + velocity[axis];
        if next > max[axis] || next < min[axis] {
            velocity[axis] = -velocity[axis];
        }
    }
    velocity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;
    use approx::assert_relative_eq;

    fn scene_with_cube() -> (Scene, NodeId) {
        let mut scene = Scene::init_pipeline(RenderSettings::new(200, 100)).expect("valid canvas");
        let cube = scene
            .create_node_with_builtin("cube", "cube", 10.0, None, None)
            .expect("built in");
        (scene, cube)
    }

    #[test]
    fn rotate_accumulates_per_step() {
        let (mut scene, cube) = scene_with_cube();
        let mut animator = Animator::new(200, 100);
        animator.assign(
            &mut scene,
            cube,
            Animation::Rotate {
                speed: Vec3::new(0.1, 0.0, 0.2),
            },
        );
        assert!(scene.graph().node(cube).is_animated());

        scene.set_up_to_date(true);
        assert!(animator.step(&mut scene));
        assert!(animator.step(&mut scene));
        assert!(!scene.is_up_to_date());
        assert_relative_eq!(
            scene.graph().node(cube).transform().rotation(),
            Vec3::new(0.2, 0.0, 0.4)
        );
    }

    #[test]
    fn move_bounces_off_the_bounds() {
        let (mut scene, cube) = scene_with_cube();
        let mut animator = Animator::new(200, 100);
        animator.assign(
            &mut scene,
            cube,
            Animation::Move {
                velocity: Vec3::new(60.0, 0.0, 0.0),
            },
        );
        // 0 -> 60, then 120 > 100 reverses: 60 -> 0.
        animator.step(&mut scene);
        animator.step(&mut scene);
        assert_relative_eq!(
            scene.graph().node(cube).transform().translation(),
            Vec3::ZERO
        );
    }

    #[test]
    fn hidden_or_paused_nodes_do_not_move() {
        let (mut scene, cube) = scene_with_cube();
        let mut animator = Animator::new(200, 100);
        animator.assign(
            &mut scene,
            cube,
            Animation::Rotate {
                speed: Vec3::splat(0.1),
            },
        );
        scene.set_visible(cube, false);
        scene.set_up_to_date(true);
        assert!(!animator.step(&mut scene));
        assert!(scene.is_up_to_date());

        scene.set_visible(cube, true);
        scene.graph_mut().set_animated(cube, false);
        assert!(!animator.step(&mut scene));
    }

    #[test]
    fn lists_animations_per_node() {
        let (mut scene, cube) = scene_with_cube();
        let mut animator = Animator::new(200, 100);
        animator.assign(&mut scene, cube, Animation::Rotate { speed: Vec3::ONE });
        animator.assign(&mut scene, cube, Animation::Move { velocity: Vec3::ONE });
        assert_eq!(animator.animations_of(cube), "rotate,move");
    }
}
