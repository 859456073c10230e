//! The drawing surface the frames are painted on.

use crate::layout::{DrawCommand, FrameLayout, X_MAX, Y_MAX};
use crate::CaseError;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const LIGHT_GRAY: Rgb = Rgb(192, 192, 192);
    pub const ORANGE: Rgb = Rgb(255, 200, 0);

    fn to_rgb(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

/// Horizontal anchor of a text; vertically texts are always centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f64,
}

impl Font {
    pub fn sans(size: f64) -> Font {
        Font {
            family: "sans-serif".to_owned(),
            size,
        }
    }
}

/// Drawing collaborator, in logical coordinates (x 0..1500, y 0..900, y up).
/// Nothing is visible before `show`.
pub trait Canvas {
    fn clear(&mut self, color: Rgb) -> Result<(), CaseError>;
    fn set_pen_color(&mut self, color: Rgb) -> Result<(), CaseError>;
    fn set_font(&mut self, font: &Font) -> Result<(), CaseError>;
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CaseError>;
    fn filled_rectangle(
        &mut self,
        cx: f64,
        cy: f64,
        half_width: f64,
        half_height: f64,
    ) -> Result<(), CaseError>;
    fn text(&mut self, x: f64, y: f64, text: &str, anchor: Anchor) -> Result<(), CaseError>;
    fn show(&mut self) -> Result<(), CaseError>;
    fn pause(&mut self, ms: u64) -> Result<(), CaseError>;
}

/// Replay a frame layout on the canvas, show it and pause.
pub fn paint<C>(layout: &FrameLayout, canvas: &mut C, pause_ms: u64) -> Result<(), CaseError>
where
    C: Canvas + ?Sized,
{
    for command in layout.commands.iter() {
        match command {
            DrawCommand::Clear(color) => canvas.clear(*color)?,
            DrawCommand::Line { from, to, color } => {
                canvas.set_pen_color(*color)?;
                canvas.line(from.x, from.y, to.x, to.y)?;
            }
            DrawCommand::FilledRect {
                center,
                half_width,
                half_height,
                color,
            } => {
                canvas.set_pen_color(*color)?;
                canvas.filled_rectangle(center.x, center.y, *half_width, *half_height)?;
            }
            DrawCommand::Text {
                position,
                text,
                anchor,
                color,
                font,
            } => {
                canvas.set_font(font)?;
                canvas.set_pen_color(*color)?;
                canvas.text(position.x, position.y, text, *anchor)?;
            }
        }
    }
    canvas.show()?;
    canvas.pause(pause_ms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Png,
    Svg,
}

impl FrameFormat {
    pub fn from_name(name: &str) -> Option<FrameFormat> {
        match name.to_lowercase().as_str() {
            "png" => Some(FrameFormat::Png),
            "svg" => Some(FrameFormat::Svg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Svg => "svg",
        }
    }
}

/// A shape already converted to pixel coordinates, waiting for `show`.
#[derive(Debug, Clone)]
enum Primitive {
    Line {
        from: (i32, i32),
        to: (i32, i32),
        color: Rgb,
    },
    Rect {
        upper_left: (i32, i32),
        lower_right: (i32, i32),
        color: Rgb,
    },
    Text {
        position: (i32, i32),
        text: String,
        anchor: Anchor,
        color: Rgb,
        font: Font,
    },
}

/// Canvas writing every shown frame to its own png or svg file,
/// `frame_00001.png`, `frame_00002.png`, ... in the output directory.
/// Shapes are buffered and only drawn with plotters on `show`.
pub struct PlottersCanvas {
    outdir: PathBuf,
    format: FrameFormat,
    size: (u32, u32),
    frame: usize,
    background: Rgb,
    pen: Rgb,
    font: Font,
    pending: Vec<Primitive>,
}

impl PlottersCanvas {
    /// Prepare the output directory, creating it when needed.
    pub fn new<P>(outdir: P, format: FrameFormat, size: (u32, u32)) -> Result<PlottersCanvas, CaseError>
    where
        P: AsRef<Path>,
    {
        let outdir = outdir.as_ref().to_path_buf();
        fs::create_dir_all(&outdir)?;
        Ok(PlottersCanvas {
            outdir,
            format,
            size,
            frame: 0,
            background: Rgb::WHITE,
            pen: Rgb::BLACK,
            font: Font::sans(20.),
            pending: Vec::new(),
        })
    }

    /// Number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frame
    }

    pub fn frame_path(&self, frame: usize) -> PathBuf {
        self.outdir
            .join(format!("frame_{:05}.{}", frame, self.format.extension()))
    }

    fn to_px(&self, x: f64, y: f64) -> (i32, i32) {
        let (w, h) = (self.size.0 as f64, self.size.1 as f64);
        ((x * w / X_MAX).round() as i32, (h - y * h / Y_MAX).round() as i32)
    }

    fn font_px(&self, size: f64) -> f64 {
        size * self.size.1 as f64 / Y_MAX
    }
}

impl Canvas for PlottersCanvas {
    fn clear(&mut self, color: Rgb) -> Result<(), CaseError> {
        self.background = color;
        self.pending.clear();
        Ok(())
    }

    fn set_pen_color(&mut self, color: Rgb) -> Result<(), CaseError> {
        self.pen = color;
        Ok(())
    }

    fn set_font(&mut self, font: &Font) -> Result<(), CaseError> {
        self.font = font.clone();
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CaseError> {
        let line = Primitive::Line {
            from: self.to_px(x1, y1),
            to: self.to_px(x2, y2),
            color: self.pen,
        };
        self.pending.push(line);
        Ok(())
    }

    fn filled_rectangle(
        &mut self,
        cx: f64,
        cy: f64,
        half_width: f64,
        half_height: f64,
    ) -> Result<(), CaseError> {
        // y is flipped: the top edge in logical space is the upper left in pixels
        let rect = Primitive::Rect {
            upper_left: self.to_px(cx - half_width, cy + half_height),
            lower_right: self.to_px(cx + half_width, cy - half_height),
            color: self.pen,
        };
        self.pending.push(rect);
        Ok(())
    }

    fn text(&mut self, x: f64, y: f64, text: &str, anchor: Anchor) -> Result<(), CaseError> {
        let mut font = self.font.clone();
        font.size = self.font_px(font.size);
        let text = Primitive::Text {
            position: self.to_px(x, y),
            text: text.to_owned(),
            anchor,
            color: self.pen,
            font,
        };
        self.pending.push(text);
        Ok(())
    }

    fn show(&mut self) -> Result<(), CaseError> {
        self.frame += 1;
        let path = self.frame_path(self.frame);
        let drawn = match self.format {
            FrameFormat::Png => {
                let root = BitMapBackend::new(&path, self.size).into_drawing_area();
                draw_frame(&root, self.background, &self.pending).map_err(|e| e.to_string())
            }
            FrameFormat::Svg => {
                let root = SVGBackend::new(&path, self.size).into_drawing_area();
                draw_frame(&root, self.background, &self.pending).map_err(|e| e.to_string())
            }
        };
        drawn.map_err(CaseError::Draw)?;
        self.pending.clear();
        info!("frame {} saved to {}", self.frame, path.display());
        Ok(())
    }

    fn pause(&mut self, ms: u64) -> Result<(), CaseError> {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
        Ok(())
    }
}

fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    background: Rgb,
    primitives: &[Primitive],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&background.to_rgb())?;
    for primitive in primitives {
        match primitive {
            Primitive::Line { from, to, color } => {
                root.draw(&PathElement::new(
                    vec![*from, *to],
                    color.to_rgb().stroke_width(2),
                ))?;
            }
            Primitive::Rect {
                upper_left,
                lower_right,
                color,
            } => {
                root.draw(&Rectangle::new(
                    [*upper_left, *lower_right],
                    color.to_rgb().filled(),
                ))?;
            }
            Primitive::Text {
                position,
                text,
                anchor,
                color,
                font,
            } => {
                let hpos = match anchor {
                    Anchor::Left => HPos::Left,
                    Anchor::Center => HPos::Center,
                    Anchor::Right => HPos::Right,
                };
                let style = (font.family.as_str(), font.size, FontStyle::Normal)
                    .into_font()
                    .color(&color.to_rgb())
                    .pos(Pos::new(hpos, VPos::Center));
                root.draw(&Text::new(text.as_str(), *position, style))?;
            }
        }
    }
    root.present()
}

/// One call received by a `RecordingCanvas`.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCall {
    Clear(Rgb),
    PenColor(Rgb),
    Font(Font),
    Line(f64, f64, f64, f64),
    FilledRectangle(f64, f64, f64, f64),
    Text(f64, f64, String, Anchor),
    Show,
    Pause(u64),
}

/// Headless canvas that only records what it is asked to draw.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<CanvasCall>,
}

impl RecordingCanvas {
    pub fn new() -> RecordingCanvas {
        RecordingCanvas::default()
    }

    pub fn frames(&self) -> usize {
        self.calls.iter().filter(|c| **c == CanvasCall::Show).count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                CanvasCall::Text(_, _, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Rgb) -> Result<(), CaseError> {
        self.calls.push(CanvasCall::Clear(color));
        Ok(())
    }

    fn set_pen_color(&mut self, color: Rgb) -> Result<(), CaseError> {
        self.calls.push(CanvasCall::PenColor(color));
        Ok(())
    }

    fn set_font(&mut self, font: &Font) -> Result<(), CaseError> {
        self.calls.push(CanvasCall::Font(font.clone()));
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CaseError> {
        self.calls.push(CanvasCall::Line(x1, y1, x2, y2));
        Ok(())
    }

    fn filled_rectangle(
        &mut self,
        cx: f64,
        cy: f64,
        half_width: f64,
        half_height: f64,
    ) -> Result<(), CaseError> {
        self.calls
            .push(CanvasCall::FilledRectangle(cx, cy, half_width, half_height));
        Ok(())
    }

    fn text(&mut self, x: f64, y: f64, text: &str, anchor: Anchor) -> Result<(), CaseError> {
        self.calls
            .push(CanvasCall::Text(x, y, text.to_owned(), anchor));
        Ok(())
    }

    fn show(&mut self) -> Result<(), CaseError> {
        self.calls.push(CanvasCall::Show);
        Ok(())
    }

    fn pause(&mut self, ms: u64) -> Result<(), CaseError> {
        self.calls.push(CanvasCall::Pause(ms));
        Ok(())
    }
}
