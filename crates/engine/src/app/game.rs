use super::input::{InputEvent, Point};
use crate::resources::RsrcId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Image {
        rsrc_id: RsrcId,
        frame: u32,
        pos: Point,
    },
    Text {
        font_id: RsrcId,
        text: String,
        pos: Point,
    },
}

/// Draw commands of one frame, blitted back-to-front in push order.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn draw_image(&mut self, rsrc_id: RsrcId, pos: Point) {
        self.draw_image_frame(rsrc_id, 0, pos);
    }

    pub fn draw_image_frame(&mut self, rsrc_id: RsrcId, frame: u32, pos: Point) {
        self.commands.push(DrawCommand::Image {
            rsrc_id,
            frame,
            pos,
        });
    }

    pub fn draw_text(&mut self, font_id: RsrcId, text: impl Into<String>, pos: Point) {
        self.commands.push(DrawCommand::Text {
            font_id,
            text: text.into(),
            pos,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Surface the host loop drives once per frame.
///
/// `init` receives the game's own configuration aggregate. `deinit` must
/// tolerate repeated calls since the host may reach it from more than one
/// shutdown path.
pub trait Game {
    type Config;
    type Error: std::error::Error + Send + Sync + 'static;

    fn init(&mut self, cfg: Self::Config) -> Result<(), Self::Error>;
    fn deinit(&mut self);
    fn draw(&self, frame: &mut Frame);
    fn handle_event(&mut self, event: &InputEvent);
}
