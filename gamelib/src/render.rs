//! Drawing boundary. The core never talks to a GPU; graphics capabilities
//! issue calls on a [`Renderer`] supplied by the host.

use glam::IVec2;

use crate::math::PixelTransform;

/// Sprite mirroring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

impl Flip {
    pub const NONE: Self = Self { x: false, y: false };

    /// Backend flag word: 1 mirrors horizontally, 2 vertically. Horizontal wins.
    pub fn flags(&self) -> u32 {
        if self.x {
            1
        } else if self.y {
            2
        } else {
            0
        }
    }
}

/// RGBA color, 8 bits per channel.
pub type Color = [u8; 4];

/// Host-side drawing surface.
pub trait Renderer {
    /// Blits sprite `sprite` of tileset `tileset` with its upper-left corner at `pixel`.
    fn draw_sprite(&mut self, tileset: u32, sprite: u32, pixel: IVec2, flip: Flip);

    /// Outlines a rectangle. Optional; defaults to nothing.
    fn draw_rect(&mut self, _pixel: IVec2, _size: IVec2, _color: Color) {}

    /// World-to-pixel mapping currently in effect.
    fn transform(&self) -> PixelTransform;
}

/// One recorded draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    Sprite {
        tileset: u32,
        sprite: u32,
        pixel: IVec2,
        flip: Flip,
    },
    Rect {
        pixel: IVec2,
        size: IVec2,
        color: Color,
    },
}

/// Renderer that records calls instead of drawing. Useful headless and in tests.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    transform: PixelTransform,
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new(transform: PixelTransform) -> Self {
        Self {
            transform,
            commands: Vec::new(),
        }
    }

    pub fn set_transform(&mut self, transform: PixelTransform) {
        self.transform = transform;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the buffer empty for the next frame.
    pub fn drain(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
            .count()
    }
}

impl Renderer for CommandBuffer {
    fn draw_sprite(&mut self, tileset: u32, sprite: u32, pixel: IVec2, flip: Flip) {
        self.commands.push(DrawCommand::Sprite {
            tileset,
            sprite,
            pixel,
            flip,
        });
    }

    fn draw_rect(&mut self, pixel: IVec2, size: IVec2, color: Color) {
        self.commands.push(DrawCommand::Rect { pixel, size, color });
    }

    fn transform(&self) -> PixelTransform {
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_flags_prefer_horizontal() {
        assert_eq!(Flip::NONE.flags(), 0);
        assert_eq!(Flip { x: true, y: true }.flags(), 1);
        assert_eq!(Flip { x: false, y: true }.flags(), 2);
    }

    #[test]
    fn test_command_buffer_records_and_drains() {
        let mut buf = CommandBuffer::new(PixelTransform::new(16, 16));
        buf.draw_sprite(0, 7, IVec2::new(1, 2), Flip::NONE);
        buf.draw_rect(IVec2::ZERO, IVec2::ONE, [255, 0, 0, 255]);
        assert_eq!(buf.sprite_count(), 1);
        assert_eq!(buf.drain().len(), 2);
        assert!(buf.commands().is_empty());
    }
}
