use crate::actor::ActorState;

use super::{BehaviorComponent, BehaviorView, HookContext};

/// Health that drains over time and is topped up by touching food.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerBehavior {
    health: f32,
    /// Health lost per second.
    pub drain: f32,
    /// Health gained per trigger entered.
    pub bonus: f32,
}

impl Default for PlayerBehavior {
    fn default() -> Self {
        Self {
            health: 20.0,
            drain: 0.5,
            bonus: 20.0,
        }
    }
}

impl PlayerBehavior {
    pub fn with_health(health: f32) -> Self {
        Self {
            health,
            ..Self::default()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

impl BehaviorComponent for PlayerBehavior {
    fn update(&mut self, actor: &mut BehaviorView<'_>, _ctx: &mut HookContext<'_>) {
        self.health -= self.drain * actor.dt();
        if self.health <= 0.0 && actor.state().active {
            log::info!("{} ran out of health", actor.state().name);
            actor.set_active(false);
        }
    }

    fn begin_overlap(
        &mut self,
        actor: &mut BehaviorView<'_>,
        trigger: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) {
        self.health += self.bonus;
        log::debug!(
            "{} reached {} (health {:.1})",
            actor.state().name,
            trigger.id(),
            self.health
        );
    }

    fn health(&self) -> Option<f32> {
        Some(self.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::components::test_support::Harness;
    use crate::world::TileMap;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_health_drains_and_deactivates() {
        let mut h = Harness::new(TileMap::new(8, 8).unwrap());
        let mut a = Actor::new("p");
        a.state.dt = 1.0;
        let mut player = PlayerBehavior::with_health(1.0);

        player.update(&mut BehaviorView::new(&mut a.state), &mut h.ctx(1.0));
        assert_abs_diff_eq!(player.health().unwrap(), 0.5);
        assert!(a.state.active);

        player.update(&mut BehaviorView::new(&mut a.state), &mut h.ctx(1.0));
        assert!(!player.is_alive());
        assert!(!a.state.active);
    }

    #[test]
    fn test_overlap_grants_bonus() {
        let mut h = Harness::new(TileMap::new(8, 8).unwrap());
        let mut a = Actor::new("p");
        let food = Actor::new("food");
        let mut player = PlayerBehavior::default();
        player.begin_overlap(&mut BehaviorView::new(&mut a.state), &food.state, &mut h.ctx(0.0));
        assert_eq!(player.health(), Some(40.0));
    }
}
