use wgpu_text::{
    BrushBuilder, TextBrush,
    glyph_brush::{Section, Text, ab_glyph::FontArc},
};

use super::state::{Status, ViewerState};
use crate::catalog::Catalog;

const PANEL_X: f32 = 11.0;
/// Clicks left of this x coordinate belong to the list panel
pub const PANEL_WIDTH: f32 = 280.0;
const TOP_Y: f32 = 15.0;
const LINE_HEIGHT: f32 = 18.0;
const HEADER_SIZE: f32 = 26.0;
const TEXT_SIZE: f32 = 18.0;
const HEADER_PADDING: f32 = 8.0;
/// Y coordinate of the first catalog row: panel header, then the search
/// line, each followed by padding
const LIST_TOP: f32 = TOP_Y + LINE_HEIGHT + HEADER_PADDING + LINE_HEIGHT + HEADER_PADDING;

const HEADER_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
const TEXT_COLOR: [f32; 4] = [0.9, 0.9, 0.9, 1.0];
const DIM_COLOR: [f32; 4] = [0.55, 0.55, 0.58, 1.0];
const ACTIVE_COLOR: [f32; 4] = [1.0, 0.78, 0.3, 1.0];
const READY_COLOR: [f32; 4] = [0.4, 1.0, 0.4, 1.0];
const LOADING_COLOR: [f32; 4] = [1.0, 0.85, 0.3, 1.0];
const ERROR_COLOR: [f32; 4] = [1.0, 0.4, 0.4, 1.0];

/// The catalog row under a pointer position, given how many rows are
/// currently visible. None outside the panel or below the list.
pub fn list_row_at(x: f32, y: f32, visible_rows: usize) -> Option<usize> {
    if !(PANEL_X..PANEL_WIDTH).contains(&x) || y < LIST_TOP {
        return None;
    }
    let row = ((y - LIST_TOP) / LINE_HEIGHT) as usize;
    (row < visible_rows).then_some(row)
}

/// Text-overlay renderer: catalog panel, status line, info panel, controls
pub struct UiRenderer {
    brush: TextBrush<FontArc>,
    width: u32,
    height: u32,
}

impl UiRenderer {
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let font = FontArc::try_from_vec(load_system_font()).expect("Failed to parse font");

        let brush = BrushBuilder::using_fonts(vec![font]).build(
            device,
            config.width,
            config.height,
            config.format,
        );

        Self {
            brush,
            width: config.width,
            height: config.height,
        }
    }

    /// Resize the UI renderer
    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.brush.resize_view(width as f32, height as f32, queue);
    }

    /// Queue all overlay text for the frame
    pub fn queue_text(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        state: &ViewerState,
        catalog: &Catalog,
        dir_label: &str,
    ) {
        let mut sections = Vec::new();

        // Catalog panel
        sections.push(Section {
            screen_position: (PANEL_X, TOP_Y),
            text: vec![
                Text::new("Models")
                    .with_scale(HEADER_SIZE)
                    .with_color(HEADER_COLOR),
            ],
            ..Default::default()
        });

        let search_line = if state.search_active {
            format!("Search: {}_", state.search)
        } else if state.search.is_empty() {
            "Search: (press /)".to_string()
        } else {
            format!("Search: {}", state.search)
        };
        sections.push(Section {
            screen_position: (PANEL_X, TOP_Y + LINE_HEIGHT + HEADER_PADDING),
            text: vec![
                Text::new(&search_line)
                    .with_scale(TEXT_SIZE)
                    .with_color(if state.search_active {
                        TEXT_COLOR
                    } else {
                        DIM_COLOR
                    }),
            ],
            ..Default::default()
        });

        let visible = catalog.filter_indexed(&state.search);
        let empty_message = if catalog.is_empty() {
            format!("No models in {}", dir_label)
        } else if visible.is_empty() {
            "No matching models".to_string()
        } else {
            String::new()
        };

        let rows: Vec<(String, [f32; 4])> = visible
            .iter()
            .enumerate()
            .map(|(row, (catalog_index, entry))| {
                let marker = if row == state.cursor { "> " } else { "  " };
                let color = if state.selected == Some(*catalog_index) {
                    ACTIVE_COLOR
                } else {
                    TEXT_COLOR
                };
                (format!("{}{}", marker, entry.display_name), color)
            })
            .collect();

        if rows.is_empty() {
            sections.push(Section {
                screen_position: (PANEL_X, LIST_TOP),
                text: vec![
                    Text::new(&empty_message)
                        .with_scale(TEXT_SIZE)
                        .with_color(DIM_COLOR),
                ],
                ..Default::default()
            });
        }
        for (row, (label, color)) in rows.iter().enumerate() {
            sections.push(Section {
                screen_position: (PANEL_X, LIST_TOP + row as f32 * LINE_HEIGHT),
                text: vec![Text::new(label).with_scale(TEXT_SIZE).with_color(*color)],
                ..Default::default()
            });
        }

        // Info panel on the right
        let info_lines: Vec<String> = match &state.info {
            Some(info) => vec![
                format!("Meshes:    {}", info.mesh_count),
                format!("Materials: {}", info.material_count),
                format!("Triangles: {}", info.triangle_count),
                format!(
                    "Size: {:.2} x {:.2} x {:.2}",
                    info.dimensions[0], info.dimensions[1], info.dimensions[2]
                ),
            ],
            None => Vec::new(),
        };
        if !info_lines.is_empty() {
            let info_x = self.width as f32 - 260.0;
            sections.push(Section {
                screen_position: (info_x, TOP_Y),
                text: vec![
                    Text::new("Model Info")
                        .with_scale(HEADER_SIZE)
                        .with_color(HEADER_COLOR),
                ],
                ..Default::default()
            });
            for (i, line) in info_lines.iter().enumerate() {
                sections.push(Section {
                    screen_position: (
                        info_x,
                        TOP_Y + LINE_HEIGHT + HEADER_PADDING + i as f32 * LINE_HEIGHT,
                    ),
                    text: vec![Text::new(line).with_scale(TEXT_SIZE).with_color(TEXT_COLOR)],
                    ..Default::default()
                });
            }
        }

        // Center notice while a load is in flight
        let loading_notice = state.status.is_loading().then(|| state.status.label());
        if let Some(notice) = &loading_notice {
            sections.push(Section {
                screen_position: (self.width as f32 * 0.5 - 80.0, self.height as f32 * 0.5),
                text: vec![
                    Text::new(notice)
                        .with_scale(HEADER_SIZE)
                        .with_color(LOADING_COLOR),
                ],
                ..Default::default()
            });
        }

        // Controls and the status line anchored to the bottom
        let controls = [
            "Mouse: Rotate (drag), Pan (right-drag), Zoom (scroll)",
            "Up/Down + Enter or Click: Show model",
            "/: Search   R: Reset Camera   P: Screenshot",
            "W: Wireframe   G: Grid   B: Background",
            "U: Hide UI   Q/ESC: Exit",
        ];
        let controls_top =
            self.height as f32 - (controls.len() as f32 + 2.0) * LINE_HEIGHT - TOP_Y;
        for (i, line) in controls.iter().enumerate() {
            sections.push(Section {
                screen_position: (PANEL_X, controls_top + i as f32 * LINE_HEIGHT),
                text: vec![Text::new(line).with_scale(TEXT_SIZE).with_color(DIM_COLOR)],
                ..Default::default()
            });
        }

        // A failed load keeps the idle dot but carries the error message
        let (dot_color, message_color) = match &state.status {
            Status::Idle => (DIM_COLOR, DIM_COLOR),
            Status::Loading { .. } => (LOADING_COLOR, LOADING_COLOR),
            Status::Ready { .. } => (READY_COLOR, READY_COLOR),
            Status::Failed { .. } => (DIM_COLOR, ERROR_COLOR),
        };
        let status_label = format!(" {}", state.status.label());
        sections.push(Section {
            screen_position: (PANEL_X, self.height as f32 - LINE_HEIGHT - TOP_Y),
            text: vec![
                Text::new("*").with_scale(TEXT_SIZE).with_color(dot_color),
                Text::new(&status_label)
                    .with_scale(TEXT_SIZE)
                    .with_color(message_color),
            ],
            ..Default::default()
        });

        self.brush.queue(device, queue, sections).unwrap();
    }

    /// Render the UI over the scene
    pub fn render(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("UI Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // Draw over the scene
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.brush.draw(&mut render_pass);
    }
}

/// Locate a sans-serif system font, falling back to well-known paths
fn load_system_font() -> Vec<u8> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    if let Ok(handle) =
        SystemSource::new().select_best_match(&[FamilyName::SansSerif], &Properties::new())
        && let Ok(font) = handle.load()
        && let Some(data) = font.copy_font_data()
    {
        return data.as_ref().clone();
    }

    std::fs::read("/usr/share/fonts/TTF/DejaVuSans.ttf")
        .or_else(|_| std::fs::read("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"))
        .or_else(|_| std::fs::read("/usr/share/fonts/noto/NotoSans-Regular.ttf"))
        .expect("Failed to load a system font - please install DejaVu or Noto fonts")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_hit_testing() {
        assert_eq!(list_row_at(PANEL_X + 5.0, LIST_TOP + 1.0, 3), Some(0));
        assert_eq!(
            list_row_at(PANEL_X + 5.0, LIST_TOP + LINE_HEIGHT * 2.5, 3),
            Some(2)
        );
    }

    #[test]
    fn test_rows_below_the_list_miss() {
        assert_eq!(list_row_at(PANEL_X + 5.0, LIST_TOP + LINE_HEIGHT * 3.5, 3), None);
        assert_eq!(list_row_at(PANEL_X + 5.0, LIST_TOP - 5.0, 3), None);
    }

    #[test]
    fn test_clicks_outside_the_panel_miss() {
        assert_eq!(list_row_at(PANEL_WIDTH + 1.0, LIST_TOP + 1.0, 3), None);
        assert_eq!(list_row_at(0.0, LIST_TOP + 1.0, 3), None);
    }
}
