//! Keyboard state and the action/axis layer input capabilities read through.
//!
//! The host forwards key transitions with [`InputState::press_key`] and
//! [`InputState::release_key`] and calls [`InputState::begin_frame`] once the
//! frame's input has been consumed.

use std::collections::{HashMap, HashSet};

use winit::keyboard::KeyCode;

pub const MOVE_X: &str = "move_x";
pub const MOVE_Y: &str = "move_y";
pub const JUMP: &str = "jump";

/// Held keys plus the edges seen since the last [`begin_frame`](Self::begin_frame).
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    went_down: HashSet<KeyCode>,
    went_up: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets this frame's edges; held keys stay held.
    pub fn begin_frame(&mut self) {
        self.went_down.clear();
        self.went_up.clear();
    }

    /// Repeats while held are ignored.
    pub fn press_key(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            self.went_down.insert(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        if self.held.remove(&key) {
            self.went_up.insert(key);
        }
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.went_down.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.went_up.contains(&key)
    }
}

/// Name of a logical action or axis, e.g. `"move_x"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new(name: impl Into<String>) -> Self {
        ActionId(name.into())
    }
}

impl From<&str> for ActionId {
    fn from(name: &str) -> Self {
        ActionId::new(name)
    }
}

/// A -1..1 axis driven by two key sets.
#[derive(Clone, Debug, Default)]
pub struct AxisBinding {
    pub negative: Vec<KeyCode>,
    pub positive: Vec<KeyCode>,
}

impl AxisBinding {
    pub fn keys(negative: &[KeyCode], positive: &[KeyCode]) -> Self {
        Self {
            negative: negative.to_vec(),
            positive: positive.to_vec(),
        }
    }

    fn value(&self, input: &InputState) -> f32 {
        let side = |keys: &[KeyCode]| keys.iter().any(|&k| input.is_key_down(k));
        match (side(&self.negative), side(&self.positive)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Bindings from logical actions and axes to keys.
#[derive(Clone, Debug, Default)]
pub struct InputMap {
    actions: HashMap<ActionId, Vec<KeyCode>>,
    axes: HashMap<ActionId, AxisBinding>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `move_x`/`move_y` on arrows and WASD, `jump` on space. Y grows downward.
    pub fn with_default_bindings() -> Self {
        let mut map = Self::new();
        map.set_axis(
            ActionId::new(MOVE_X),
            AxisBinding::keys(&[KeyCode::ArrowLeft, KeyCode::KeyA], &[KeyCode::ArrowRight, KeyCode::KeyD]),
        );
        map.set_axis(
            ActionId::new(MOVE_Y),
            AxisBinding::keys(&[KeyCode::ArrowUp, KeyCode::KeyW], &[KeyCode::ArrowDown, KeyCode::KeyS]),
        );
        map.bind_key(ActionId::new(JUMP), KeyCode::Space);
        map
    }

    pub fn bind_key(&mut self, action: ActionId, key: KeyCode) {
        self.actions.entry(action).or_default().push(key);
    }

    pub fn set_axis(&mut self, axis: ActionId, binding: AxisBinding) {
        self.axes.insert(axis, binding);
    }

    pub fn action_down(&self, input: &InputState, action: &ActionId) -> bool {
        self.actions
            .get(action)
            .is_some_and(|keys| keys.iter().any(|&k| input.is_key_down(k)))
    }

    pub fn action_pressed(&self, input: &InputState, action: &ActionId) -> bool {
        self.actions
            .get(action)
            .is_some_and(|keys| keys.iter().any(|&k| input.is_key_pressed(k)))
    }

    /// Axis value in [-1, 1]; opposing keys cancel out. Unbound axes read 0.
    pub fn axis(&self, input: &InputState, axis: &ActionId) -> f32 {
        self.axes.get(axis).map_or(0.0, |binding| binding.value(input))
    }
}

/// What an input capability sees for one frame: raw state plus bindings.
#[derive(Clone, Copy)]
pub struct Controls<'a> {
    pub state: &'a InputState,
    pub map: &'a InputMap,
}

impl<'a> Controls<'a> {
    pub fn new(state: &'a InputState, map: &'a InputMap) -> Self {
        Self { state, map }
    }

    pub fn axis(&self, name: &str) -> f32 {
        self.map.axis(self.state, &ActionId::new(name))
    }

    pub fn down(&self, name: &str) -> bool {
        self.map.action_down(self.state, &ActionId::new(name))
    }

    pub fn pressed(&self, name: &str) -> bool {
        self.map.action_pressed(self.state, &ActionId::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sets_pressed_once() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyA);
        input.press_key(KeyCode::KeyA);
        assert!(input.is_key_down(KeyCode::KeyA));
        assert!(input.is_key_pressed(KeyCode::KeyA));
        input.begin_frame();
        assert!(input.is_key_down(KeyCode::KeyA));
        assert!(!input.is_key_pressed(KeyCode::KeyA));
        input.release_key(KeyCode::KeyA);
        assert!(input.is_key_released(KeyCode::KeyA));
        assert!(!input.is_key_down(KeyCode::KeyA));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut input = InputState::new();
        input.release_key(KeyCode::KeyQ);
        assert!(!input.is_key_released(KeyCode::KeyQ));
    }

    #[test]
    fn test_axes_cancel() {
        let map = InputMap::with_default_bindings();
        let mut input = InputState::new();
        assert_eq!(Controls::new(&input, &map).axis(MOVE_X), 0.0);

        input.press_key(KeyCode::ArrowRight);
        assert_eq!(Controls::new(&input, &map).axis(MOVE_X), 1.0);
        input.press_key(KeyCode::KeyA);
        assert_eq!(Controls::new(&input, &map).axis(MOVE_X), 0.0);
        assert_eq!(Controls::new(&input, &map).axis("unbound"), 0.0);
    }

    #[test]
    fn test_actions_follow_bindings() {
        let mut map = InputMap::with_default_bindings();
        map.bind_key(ActionId::from("fire"), KeyCode::KeyF);
        let mut input = InputState::new();
        input.press_key(KeyCode::Space);
        let controls = Controls::new(&input, &map);
        assert!(controls.down(JUMP));
        assert!(controls.pressed(JUMP));
        assert!(!controls.down("fire"));
        assert!(!controls.down("missing"));
    }
}
