//! Raster render target backed by a `tiny-skia` pixmap.
//!
//! The pixmap lives behind a mutex so that draw tasks on different worker
//! threads can paint into it concurrently. Labels are not rasterized; they
//! are collected in pixel space for a later text pass.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use map_common::{BoundingBox, Color, Coord};
use serde::Serialize;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, StrokeDash, Transform};

use crate::error::{RendererError, Result};
use crate::target::{DrawCommand, MarkerShape, RenderTarget};

/// A label placed on the raster, in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub size: f32,
    pub color: Color,
}

/// In-memory RGBA surface.
pub struct PixmapTarget {
    bounds: BoundingBox,
    width: u32,
    height: u32,
    pixmap: Mutex<Pixmap>,
    labels: Mutex<Vec<PlacedLabel>>,
    commands: AtomicU64,
}

impl PixmapTarget {
    /// Create a transparent surface showing `bounds`.
    pub fn new(width: u32, height: u32, bounds: BoundingBox) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::InvalidConfig(format!("invalid target size {}x{}", width, height))
        })?;
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(RendererError::InvalidConfig(format!(
                "target bounds must have positive area: {:?}",
                bounds
            )));
        }

        Ok(Self {
            bounds,
            width,
            height,
            pixmap: Mutex::new(pixmap),
            labels: Mutex::new(Vec::new()),
            commands: AtomicU64::new(0),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of commands received so far.
    pub fn command_count(&self) -> u64 {
        self.commands.load(Ordering::Relaxed)
    }

    /// Labels collected so far, in draw order.
    pub fn labels(&self) -> Vec<PlacedLabel> {
        lock(&self.labels).clone()
    }

    /// Alpha of the pixel at (x, y), `None` outside the surface.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        lock(&self.pixmap).pixel(x, y).map(|p| p.alpha())
    }

    /// Encode the current contents as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        lock(&self.pixmap)
            .encode_png()
            .map_err(|e| RendererError::Encode(e.to_string()))
    }

    /// Map a world coordinate to pixel space (y axis pointing down).
    fn to_pixel(&self, c: &Coord) -> (f32, f32) {
        let px = (c.x - self.bounds.min_x) / self.bounds.width() * self.width as f64;
        let py = (self.bounds.max_y - c.y) / self.bounds.height() * self.height as f64;
        (px as f32, py as f32)
    }

    fn polyline_path(&self, points: &[Coord]) -> Option<Path> {
        let mut pb = PathBuilder::new();
        let mut iter = points.iter().map(|c| self.to_pixel(c));
        let (x, y) = iter.next()?;
        pb.move_to(x, y);
        for (x, y) in iter {
            pb.line_to(x, y);
        }
        pb.finish()
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_marker(
        &self,
        pixmap: &mut Pixmap,
        at: &Coord,
        shape: MarkerShape,
        size: f32,
        fill: Color,
        outline: Color,
        outline_width: f32,
    ) {
        let (cx, cy) = self.to_pixel(at);
        let half = (size / 2.0).max(0.5);

        let outline_stroke = Stroke {
            width: outline_width.max(1.0),
            ..Stroke::default()
        };

        let body = match shape {
            MarkerShape::Point => PathBuilder::from_circle(cx, cy, (size / 4.0).max(1.0)),
            MarkerShape::Circle => PathBuilder::from_circle(cx, cy, half),
            MarkerShape::Box | MarkerShape::CrossedBox => {
                Rect::from_xywh(cx - half, cy - half, size, size).map(PathBuilder::from_rect)
            }
            MarkerShape::Diamond => polygon_path(&[
                (cx, cy - half),
                (cx + half, cy),
                (cx, cy + half),
                (cx - half, cy),
            ]),
            MarkerShape::Triangle => {
                polygon_path(&[(cx, cy - half), (cx + half, cy + half), (cx - half, cy + half)])
            }
            MarkerShape::Cross => None,
        };

        if let Some(body) = &body {
            pixmap.fill_path(body, &paint(fill), FillRule::Winding, Transform::identity(), None);
            if shape != MarkerShape::Point && outline_width > 0.0 {
                pixmap.stroke_path(body, &paint(outline), &outline_stroke, Transform::identity(), None);
            }
        }

        let cross = match shape {
            MarkerShape::Cross => segments_path(&[
                ((cx - half, cy), (cx + half, cy)),
                ((cx, cy - half), (cx, cy + half)),
            ]),
            MarkerShape::CrossedBox => segments_path(&[
                ((cx - half, cy - half), (cx + half, cy + half)),
                ((cx - half, cy + half), (cx + half, cy - half)),
            ]),
            _ => None,
        };
        if let Some(cross) = cross {
            let color = if shape == MarkerShape::Cross { fill } else { outline };
            pixmap.stroke_path(&cross, &paint(color), &outline_stroke, Transform::identity(), None);
        }
    }
}

impl RenderTarget for PixmapTarget {
    fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    fn draw(&self, command: &DrawCommand) {
        self.commands.fetch_add(1, Ordering::Relaxed);

        if let DrawCommand::Label {
            at,
            text,
            size,
            color,
        } = command
        {
            let (x, y) = self.to_pixel(at);
            lock(&self.labels).push(PlacedLabel {
                x,
                y,
                text: text.clone(),
                size: *size,
                color: *color,
            });
            return;
        }

        let mut pixmap = lock(&self.pixmap);
        match command {
            DrawCommand::Marker {
                at,
                shape,
                size,
                fill,
                outline,
                outline_width,
            } => self.draw_marker(&mut pixmap, at, *shape, *size, *fill, *outline, *outline_width),
            DrawCommand::Polyline {
                points,
                color,
                width,
                dash,
            } => {
                let Some(path) = self.polyline_path(points) else {
                    return;
                };
                let mut stroke = Stroke {
                    width: width.max(0.5),
                    ..Stroke::default()
                };
                stroke.dash = dash.clone().and_then(|d| StrokeDash::new(d, 0.0));
                pixmap.stroke_path(&path, &paint(*color), &stroke, Transform::identity(), None);
            }
            DrawCommand::Polygon {
                rings,
                fill,
                outline,
                outline_width,
            } => {
                let mut pb = PathBuilder::new();
                for ring in rings {
                    let mut iter = ring.iter().map(|c| self.to_pixel(c));
                    if let Some((x, y)) = iter.next() {
                        pb.move_to(x, y);
                        for (x, y) in iter {
                            pb.line_to(x, y);
                        }
                        pb.close();
                    }
                }
                let Some(path) = pb.finish() else {
                    return;
                };
                if let Some(fill) = fill {
                    // Even-odd so that interior rings punch holes
                    pixmap.fill_path(&path, &paint(*fill), FillRule::EvenOdd, Transform::identity(), None);
                }
                if *outline_width > 0.0 {
                    let stroke = Stroke {
                        width: *outline_width,
                        ..Stroke::default()
                    };
                    pixmap.stroke_path(&path, &paint(*outline), &stroke, Transform::identity(), None);
                }
            }
            DrawCommand::Label { .. } => {}
        }
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn polygon_path(points: &[(f32, f32)]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for (x, y) in rest {
        pb.line_to(*x, *y);
    }
    pb.close();
    pb.finish()
}

fn segments_path(segments: &[((f32, f32), (f32, f32))]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for ((x0, y0), (x1, y1)) in segments {
        pb.move_to(*x0, *y0);
        pb.line_to(*x1, *y1);
    }
    pb.finish()
}

/// Lock a mutex, continuing with the inner value if a draw task panicked
/// while holding it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
