//! Frame layout: everything that is drawn for one snapshot, as plain data.
//!
//! Coordinates are in the logical canvas space, x in 0..1500 and y in 0..900,
//! with y growing upwards. The drawing collaborator maps them to pixels.

use crate::canvas::{Anchor, Font, Rgb};
use crate::utils::{add_commas, date_title};
use crate::{Snapshot, TrackedState};

pub const X_MAX: f64 = 1500.;
pub const Y_MAX: f64 = 900.;
pub const LEFT_MARGIN: f64 = 50.;
/// Width of the longest bar.
pub const BAR_AREA_WIDTH: f64 = 1300.;

const GRID_BOTTOM: f64 = 50.;
const GRID_BOTTOM_RIGHT: f64 = 300.;
const GRID_TOP: f64 = 850.;
const GRID_LABEL_Y: f64 = 870.;
/// Past this x the gridlines are shortened to leave room for the title block.
const GRID_SHORT_AFTER_X: f64 = 1000.;
const GRID_FONT_SIZE: f64 = 20.;

const BAR_TOP_Y: f64 = 800.;
const BAR_SPACING: f64 = 85.;
const BAR_Y_OFFSET: f64 = 15.;
const BAR_HALF_HEIGHT: f64 = 35.;
const NAME_GAP: f64 = 10.;
const COUNT_GAP: f64 = 20.;

const TITLE_X: f64 = 1050.;
const TITLE_FONT_SIZE: f64 = 35.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    Line {
        from: Point,
        to: Point,
        color: Rgb,
    },
    FilledRect {
        center: Point,
        half_width: f64,
        half_height: f64,
        color: Rgb,
    },
    Text {
        position: Point,
        text: String,
        anchor: Anchor,
        color: Rgb,
        font: Font,
    },
}

/// Axis scale adapted to the largest tracked count of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub max: u64,
    /// Cases between two gridlines; 0 only for tiny maxima (0, 1 or 2).
    pub unit: u64,
    /// Index of the last gridline, gridlines go from 0 to `lines` included.
    pub lines: u64,
    pub px_per_case: f64,
}

impl Scale {
    /// Pick the unit as the largest power of 10 whose tenfold is not below `max`,
    /// then halve it when that gives less than 3 units,
    /// or double it when that gives more than 8.
    /// All divisions are integer divisions.
    pub fn from_max(max: u64) -> Scale {
        let mut unit: u64 = 1;
        while unit.saturating_mul(10) < max {
            unit *= 10;
        }
        if max / unit < 3 {
            unit /= 2;
        } else if max / unit > 8 {
            unit *= 2;
        }
        let lines = if unit == 0 { 1 } else { max / unit };
        let px_per_case = if max == 0 {
            0.
        } else {
            BAR_AREA_WIDTH / max as f64
        };
        Scale {
            max,
            unit,
            lines,
            px_per_case,
        }
    }

    pub fn from_counts(counts: &[u64]) -> Scale {
        Scale::from_max(counts.iter().copied().max().unwrap_or(0))
    }

    pub fn gridline_x(&self, i: u64) -> f64 {
        (i * self.unit) as f64 * self.px_per_case + LEFT_MARGIN
    }

    /// Gridline label, in thousands with a "k" once the unit reaches 1000.
    pub fn gridline_label(&self, i: u64) -> String {
        if self.unit >= 1000 {
            format!("{}k", i * self.unit / 1000)
        } else {
            format!("{}", i * self.unit)
        }
    }

    pub fn bar_length(&self, count: u64) -> f64 {
        self.px_per_case * count as f64
    }
}

/// The complete content of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub scale: Scale,
    pub commands: Vec<DrawCommand>,
}

impl FrameLayout {
    pub fn from_snapshot(snapshot: &Snapshot) -> FrameLayout {
        let scale = Scale::from_max(snapshot.largest_count());
        let mut commands = Vec::with_capacity(64);
        commands.push(DrawCommand::Clear(Rgb::BLACK));
        push_gridlines(&mut commands, &scale);
        push_bars(&mut commands, &scale, snapshot);
        push_titles(&mut commands, snapshot);
        FrameLayout { scale, commands }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

fn push_gridlines(commands: &mut Vec<DrawCommand>, scale: &Scale) {
    let font = Font::sans(GRID_FONT_SIZE);
    for i in 0..=scale.lines {
        let x = scale.gridline_x(i);
        let bottom = if x > GRID_SHORT_AFTER_X {
            GRID_BOTTOM_RIGHT
        } else {
            GRID_BOTTOM
        };
        commands.push(DrawCommand::Line {
            from: Point::new(x, bottom),
            to: Point::new(x, GRID_TOP),
            color: Rgb::LIGHT_GRAY,
        });
        commands.push(DrawCommand::Text {
            position: Point::new(x, GRID_LABEL_Y),
            text: scale.gridline_label(i),
            anchor: Anchor::Center,
            color: Rgb::LIGHT_GRAY,
            font: font.clone(),
        });
    }
}

fn push_bars(commands: &mut Vec<DrawCommand>, scale: &Scale, snapshot: &Snapshot) {
    let font = Font::sans(GRID_FONT_SIZE);
    for (i, state) in TrackedState::ALL.into_iter().enumerate() {
        let length = scale.bar_length(snapshot.count(state));
        let y = BAR_TOP_Y - BAR_SPACING * i as f64 + BAR_Y_OFFSET;
        let bar_end = LEFT_MARGIN + length;
        commands.push(DrawCommand::FilledRect {
            center: Point::new(LEFT_MARGIN + length / 2., y),
            half_width: length / 2.,
            half_height: BAR_HALF_HEIGHT,
            color: state.color(),
        });
        commands.push(DrawCommand::Text {
            position: Point::new(bar_end + NAME_GAP, y),
            text: state.name().to_owned(),
            anchor: Anchor::Left,
            color: Rgb::WHITE,
            font: font.clone(),
        });
        commands.push(DrawCommand::Text {
            position: Point::new(bar_end - COUNT_GAP, y),
            text: add_commas(snapshot.count(state)),
            anchor: Anchor::Right,
            color: Rgb::BLACK,
            font: font.clone(),
        });
    }
}

fn push_titles(commands: &mut Vec<DrawCommand>, snapshot: &Snapshot) {
    let font = Font::sans(TITLE_FONT_SIZE);
    let lines = [
        (250., date_title(snapshot.date)),
        (200., format!("US Total: {}", add_commas(snapshot.total_cases))),
        (150., "Coronavirus".to_owned()),
        (100., "Cases by State".to_owned()),
    ];
    for (y, text) in lines {
        commands.push(DrawCommand::Text {
            position: Point::new(TITLE_X, y),
            text,
            anchor: Anchor::Left,
            color: Rgb::WHITE,
            font: font.clone(),
        });
    }
}
