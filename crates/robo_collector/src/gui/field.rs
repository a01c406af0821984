use engine::{Frame, Point, RsrcId};
use thiserror::Error;
use tracing::info;

/// Top-left pixel of tile (0, 0) inside the map image.
pub(crate) const FIELD_ORIGIN: Point = Point::new(47, 47);
const MARKER_TEXT_OFFSET: Point = Point::new(6, 4);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FieldDescription {
    pub(crate) data: Vec<Vec<char>>,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) tile_width: u32,
    pub(crate) tile_height: u32,
    pub(crate) empty_data_marker: char,
    pub(crate) hard_obstacle_marker: char,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FieldConfig {
    pub(crate) description: FieldDescription,
    pub(crate) tile_rsrc_id: RsrcId,
    pub(crate) debug_font_rsrc_id: RsrcId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct FieldPos {
    pub(crate) row: i32,
    pub(crate) col: i32,
}

impl FieldPos {
    pub(crate) const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum FieldError {
    #[error("field must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("field declares {expected} rows but data has {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("field row {row} has {found} columns, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("field tiles must have a non-zero size, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
}

/// Marker grid the robots and coins live on.
#[derive(Debug, Default)]
pub(crate) struct Field {
    description: FieldDescription,
    tile_rsrc_id: RsrcId,
    debug_font_rsrc_id: RsrcId,
}

impl Field {
    pub(crate) fn init(&mut self, cfg: FieldConfig) -> Result<(), FieldError> {
        let desc = &cfg.description;
        if desc.rows == 0 || desc.cols == 0 {
            return Err(FieldError::EmptyGrid {
                rows: desc.rows,
                cols: desc.cols,
            });
        }
        if desc.data.len() != desc.rows {
            return Err(FieldError::RowCountMismatch {
                expected: desc.rows,
                found: desc.data.len(),
            });
        }
        if let Some((row, found)) = desc
            .data
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != desc.cols)
        {
            return Err(FieldError::RowWidthMismatch {
                row,
                expected: desc.cols,
                found,
            });
        }
        if desc.tile_width == 0 || desc.tile_height == 0 {
            return Err(FieldError::ZeroTileSize {
                width: desc.tile_width,
                height: desc.tile_height,
            });
        }

        info!(rows = desc.rows, cols = desc.cols, "field_initialized");
        self.description = cfg.description;
        self.tile_rsrc_id = cfg.tile_rsrc_id;
        self.debug_font_rsrc_id = cfg.debug_font_rsrc_id;
        Ok(())
    }

    pub(crate) fn deinit(&mut self) {
        self.description = FieldDescription::default();
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        for (row, cells) in self.description.data.iter().enumerate() {
            for (col, marker) in cells.iter().enumerate() {
                let origin = self.tile_origin(FieldPos::new(row as i32, col as i32));
                frame.draw_image(self.tile_rsrc_id, origin);
                if *marker != self.description.empty_data_marker {
                    let text_pos = Point::new(
                        origin.x + MARKER_TEXT_OFFSET.x,
                        origin.y + MARKER_TEXT_OFFSET.y,
                    );
                    frame.draw_text(self.debug_font_rsrc_id, marker.to_string(), text_pos);
                }
            }
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.description.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.description.cols
    }

    pub(crate) fn empty_marker(&self) -> char {
        self.description.empty_data_marker
    }

    pub(crate) fn obstacle_marker(&self) -> char {
        self.description.hard_obstacle_marker
    }

    pub(crate) fn is_inside(&self, pos: FieldPos) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.description.rows
            && (pos.col as usize) < self.description.cols
    }

    pub(crate) fn marker_at(&self, pos: FieldPos) -> Option<char> {
        if !self.is_inside(pos) {
            return None;
        }
        Some(self.description.data[pos.row as usize][pos.col as usize])
    }

    /// Returns `false` when `pos` lies outside the field.
    pub(crate) fn set_marker(&mut self, pos: FieldPos, marker: char) -> bool {
        if !self.is_inside(pos) {
            return false;
        }
        self.description.data[pos.row as usize][pos.col as usize] = marker;
        true
    }

    /// Positions holding the empty marker, in row-major order.
    pub(crate) fn empty_positions(&self) -> Vec<FieldPos> {
        let empty = self.description.empty_data_marker;
        self.description
            .data
            .iter()
            .enumerate()
            .flat_map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(move |(_, marker)| **marker == empty)
                    .map(move |(col, _)| FieldPos::new(row as i32, col as i32))
            })
            .collect()
    }

    pub(crate) fn tile_origin(&self, pos: FieldPos) -> Point {
        Point::new(
            FIELD_ORIGIN.x + pos.col * self.description.tile_width as i32,
            FIELD_ORIGIN.y + pos.row * self.description.tile_height as i32,
        )
    }
}
