use anyhow::Context;
use eframe::egui;
use tilegrid_core::{
    Direction, FileBackend, LayoutStore, Surface, default_size_classes, grid_height, grid_width,
    map_to_pixels,
};

const CELL_W: f32 = 160.0;
const CELL_H: f32 = 90.0;
const GAP: f32 = 8.0;
const TOTAL_COLS: u32 = 4;

const TILE_COLORS: [egui::Color32; 6] = [
    egui::Color32::from_rgb(0x3a, 0x6e, 0xa5),
    egui::Color32::from_rgb(0xa5, 0x3a, 0x52),
    egui::Color32::from_rgb(0x3a, 0xa5, 0x6e),
    egui::Color32::from_rgb(0xa5, 0x8a, 0x3a),
    egui::Color32::from_rgb(0x6e, 0x3a, 0xa5),
    egui::Color32::from_rgb(0x3a, 0x9b, 0xa5),
];

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let layouts_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "layouts".to_string());
    let surface_id = std::env::args().nth(2).unwrap_or_else(|| "home".to_string());
    let tiles: usize = std::env::args()
        .nth(3)
        .and_then(|n| n.parse().ok())
        .unwrap_or(11);

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "TileGrid",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(
                TileGridApp::new(layouts_dir, surface_id, tiles).expect("failed to mount surface"),
            ))
        }),
    )
}

/// One in-flight pointer drag: which tile, and where inside it the pointer
/// grabbed, so the ghost follows without jumping.
struct DragTile {
    id: String,
    grab: egui::Vec2,
}

struct TileGridApp {
    surface: Surface<FileBackend>,
    rtl: bool,
    drag: Option<DragTile>,
    last_error: Option<String>,
}

impl TileGridApp {
    fn new(layouts_dir: String, surface_id: String, tiles: usize) -> anyhow::Result<Self> {
        let ids: Vec<String> = (1..=tiles).map(|i| format!("t{i}")).collect();
        let store = LayoutStore::new(FileBackend::new(&layouts_dir));
        let surface = Surface::mount(store, &surface_id, &ids, TOTAL_COLS, default_size_classes(), None)
            .with_context(|| format!("mount surface '{surface_id}'"))?;

        Ok(Self {
            surface,
            rtl: false,
            drag: None,
            last_error: None,
        })
    }

    fn direction(&self) -> Direction {
        if self.rtl { Direction::Rtl } else { Direction::Ltr }
    }

    fn safe_drop(&mut self, id: &str, col: i32, row: i32) {
        match self.surface.drag(id, col, row) {
            Ok(_moved) => {} // a rejected drop just snaps back, no dialog
            Err(e) => self.last_error = Some(format!("{e:#}")),
        }
    }

    fn safe_regenerate(&mut self) {
        if let Err(e) = self.surface.regenerate(None) {
            self.last_error = Some(format!("{e:#}"));
        }
    }

    /// Grid cell whose pixel box starts nearest to `top_left` (the ghost's
    /// corner at drop time). Inverts the mapper's arithmetic, including
    /// the Rtl column flip, so negative cells pass through for clamping.
    fn cell_at(&self, top_left: egui::Vec2, col_span: u32) -> (i32, i32) {
        let screen_col = (top_left.x / (CELL_W + GAP)).round() as i32;
        let row = (top_left.y / (CELL_H + GAP)).round() as i32;
        let col = match self.direction() {
            Direction::Ltr => screen_col,
            Direction::Rtl => TOTAL_COLS as i32 - col_span as i32 - screen_col,
        };
        (col, row)
    }
}

impl eframe::App for TileGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("TileGrid");
                ui.separator();
                ui.label(format!(
                    "Surface: {} ({} tiles)",
                    self.surface.surface_id,
                    self.surface.model.items.len()
                ));
                ui.separator();
                ui.checkbox(&mut self.rtl, "Right-to-left");
                if ui.button("Reshuffle").clicked() {
                    self.safe_regenerate();
                }
            });

            if let Some(err) = &self.last_error {
                ui.colored_label(egui::Color32::RED, format!("Error: {err}"));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let dir = self.direction();
            let model = &self.surface.model;
            let canvas = ui.min_rect().min + egui::vec2(8.0, 8.0);

            // reserve the full grid so scrollbars behave
            ui.allocate_space(egui::vec2(
                grid_width(model.total_cols, CELL_W, GAP) + 16.0,
                grid_height(model.total_rows(), CELL_H, GAP) + 16.0,
            ));

            let tiles: Vec<(String, egui::Rect, usize)> = model
                .items
                .iter()
                .enumerate()
                .map(|(i, it)| {
                    let r = map_to_pixels(it, model.total_cols, CELL_W, CELL_H, GAP, dir);
                    let rect = egui::Rect::from_min_size(
                        canvas + egui::vec2(r.left, r.top),
                        egui::vec2(r.width, r.height),
                    );
                    (it.id.clone(), rect, i)
                })
                .collect();

            let mut dropped: Option<(String, i32, i32)> = None;

            for (id, home_rect, i) in &tiles {
                let response = ui.interact(
                    *home_rect,
                    egui::Id::new(("tile", id.as_str())),
                    egui::Sense::drag(),
                );

                if response.drag_started() {
                    if let Some(pos) = ctx.pointer_interact_pos() {
                        self.drag = Some(DragTile {
                            id: id.clone(),
                            grab: pos - home_rect.min,
                        });
                    }
                }

                let dragging_this = self.drag.as_ref().is_some_and(|d| &d.id == id);
                let rect = if dragging_this {
                    match ctx.pointer_interact_pos() {
                        Some(pos) => egui::Rect::from_min_size(
                            pos - self.drag.as_ref().unwrap().grab,
                            home_rect.size(),
                        ),
                        None => *home_rect,
                    }
                } else {
                    *home_rect
                };

                let color = TILE_COLORS[i % TILE_COLORS.len()];
                let painter = ui.painter();
                painter.rect_filled(rect, egui::Rounding::same(6.0), color);
                if dragging_this {
                    painter.rect_stroke(
                        rect,
                        egui::Rounding::same(6.0),
                        egui::Stroke::new(2.0, egui::Color32::WHITE),
                    );
                }
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    id,
                    egui::FontId::proportional(16.0),
                    egui::Color32::WHITE,
                );

                if response.drag_stopped() && dragging_this {
                    let span = self
                        .surface
                        .model
                        .get(id)
                        .map(|it| it.span.col_span)
                        .unwrap_or(1);
                    let (col, row) = self.cell_at(rect.min - canvas, span);
                    dropped = Some((id.clone(), col, row));
                }
            }

            if let Some((id, col, row)) = dropped {
                self.drag = None;
                self.safe_drop(&id, col, row);
            }
        });
    }
}
