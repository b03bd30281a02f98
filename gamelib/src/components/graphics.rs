use glam::IVec2;

use crate::actor::{ActorKind, ActorState};
use crate::math::Vec2;
use crate::render::{Color, Renderer};

use super::GraphicsComponent;

/// Draws the current animation frame at the actor's upper-left pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteGraphics;

impl GraphicsComponent for SpriteGraphics {
    fn draw(&self, actor: &ActorState, renderer: &mut dyn Renderer) {
        draw_frame(actor, renderer);
    }
}

/// Sprite plus outlines of the collision box and the 3D bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugGraphics {
    pub show_bbox3d: bool,
}

const BBOX3D_COLOR: Color = [0, 160, 255, 255];

fn kind_color(kind: ActorKind) -> Color {
    match kind {
        ActorKind::Dynamic => [0, 255, 0, 255],
        ActorKind::Static => [255, 255, 255, 255],
        ActorKind::Trigger => [255, 200, 0, 255],
        ActorKind::None => [255, 0, 255, 255],
    }
}

impl GraphicsComponent for DebugGraphics {
    fn draw(&self, actor: &ActorState, renderer: &mut dyn Renderer) {
        draw_frame(actor, renderer);
        let t = renderer.transform();
        renderer.draw_rect(
            actor.pixel_position(&t),
            actor.pixel_size(&t),
            kind_color(actor.kind()),
        );

        if self.show_bbox3d {
            let xf = &actor.transform3d;
            let (min, max) = (xf.world_bbox_min(), xf.world_bbox_max());
            let corner = t.world_to_pixel(Vec2::from_xy(min));
            let size = t.scale(Vec2::from_xy(max - min));
            renderer.draw_rect(corner, size, BBOX3D_COLOR);
        }
    }
}

fn draw_frame(actor: &ActorState, renderer: &mut dyn Renderer) {
    let t = renderer.transform();
    let frame = actor.anim.current_frame().max(0) as u32;
    let pixel: IVec2 = actor.pixel_position(&t);
    renderer.draw_sprite(actor.sprite.tileset, frame, pixel, actor.sprite.flip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::math::PixelTransform;
    use crate::render::{CommandBuffer, DrawCommand, Flip};

    #[test]
    fn test_sprite_uses_animation_frame() {
        let mut a = Actor::new("a").at(2.5, 1.5).with_size(1.0, 1.0).with_sprite(3, 12);
        a.state.sprite.flip = Flip { x: true, y: false };
        let mut buf = CommandBuffer::new(PixelTransform::new(16, 16));
        SpriteGraphics.draw(&a.state, &mut buf);
        assert_eq!(
            buf.commands(),
            &[DrawCommand::Sprite {
                tileset: 3,
                sprite: 12,
                pixel: IVec2::new(32, 16),
                flip: Flip { x: true, y: false },
            }]
        );
    }

    #[test]
    fn test_debug_outlines_collision_box() {
        let a = Actor::new("a").at(0.5, 0.5).with_size(1.0, 1.0);
        let mut buf = CommandBuffer::new(PixelTransform::new(16, 16));
        DebugGraphics { show_bbox3d: true }.draw(&a.state, &mut buf);
        assert_eq!(buf.sprite_count(), 1);
        assert_eq!(buf.commands().len(), 3);
        assert!(matches!(
            buf.commands()[1],
            DrawCommand::Rect { pixel, size, .. } if pixel == IVec2::ZERO && size == IVec2::new(16, 16)
        ));
    }
}
