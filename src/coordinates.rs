//! Court coordinates.
//!
//! DataVolley records positions as an index into a 100 x 100 grid laid over
//! both halves of the court. Index `i` (1..=10000) decomposes into a column
//! `(i - 1) % 100` and a row `(i - 1) / 100`, which map linearly onto court
//! units where the court lines sit at x 0.5..3.5 and y 0.5..6.5 with the
//! net at y 3.5. One court unit is 3 metres.

use serde::Serialize;

use crate::error::TransformError;

/// Width of the plotting frame in court units.
pub const COURT_WIDTH: f64 = 4.0;
/// Length of the plotting frame in court units (both halves).
pub const COURT_LENGTH: f64 = 7.0;
/// Net line along the y axis.
pub const NET_Y: f64 = 3.5;
/// Metres per court unit.
pub const METRES_PER_UNIT: f64 = 3.0;

/// Grid to court-unit mapping.
pub const GRID_COLUMNS: u16 = 100;
pub const GRID_ROWS: u16 = 100;
pub const X_ORIGIN: f64 = 0.14375;
pub const X_SPAN: f64 = 3.7125;
pub const Y_ORIGIN: f64 = -0.2037;
pub const Y_SPAN: f64 = 7.4074;

/// Raw spellings meaning "position not recorded".
pub const SENTINELS: &[&str] = &["-1-1", "----", "~~~~", "0000"];

/// Which side of the net a point lies on, as drawn (near = low y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CourtHalf {
    Near,
    Far,
}

/// A court position in court units, or both `None` when not recorded.
///
/// Values can fall slightly outside the court frame; they are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coordinate {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Coordinate {
    pub const NONE: Coordinate = Coordinate { x: None, y: None };

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Position in metres from the near-left court corner.
    pub fn to_meters(&self) -> Option<(f64, f64)> {
        Some((
            (self.x? - 0.5) * METRES_PER_UNIT,
            (self.y? - 0.5) * METRES_PER_UNIT,
        ))
    }

    pub fn half(&self) -> Option<CourtHalf> {
        let y = self.y?;
        Some(if y < NET_Y {
            CourtHalf::Near
        } else {
            CourtHalf::Far
        })
    }

    /// Mirror through the centre of the court, so actions from either side
    /// can be drawn on the same half.
    pub fn flip(&self) -> Coordinate {
        Coordinate {
            x: self.x.map(|x| COURT_WIDTH - x),
            y: self.y.map(|y| COURT_LENGTH - y),
        }
    }
}

/// A raw coordinate block as found on the scout line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RawCoordinate {
    NotRecorded,
    Index(u16),
}

impl RawCoordinate {
    pub fn parse(raw4: &str) -> Result<RawCoordinate, TransformError> {
        let len = raw4.chars().count();
        if len != 4 {
            return Err(TransformError::MalformedLength {
                raw: raw4.to_string(),
                len,
            });
        }
        if SENTINELS.contains(&raw4) {
            return Ok(RawCoordinate::NotRecorded);
        }
        if !raw4.chars().all(|c| c.is_ascii_digit()) {
            return Err(TransformError::InvalidDigits(raw4.to_string()));
        }
        raw4.parse::<u16>()
            .map(RawCoordinate::Index)
            .map_err(|_| TransformError::InvalidDigits(raw4.to_string()))
    }

    pub fn index(&self) -> Option<u16> {
        match self {
            RawCoordinate::Index(i) => Some(*i),
            RawCoordinate::NotRecorded => None,
        }
    }
}

/// Convert a raw 4-character coordinate block into court units.
pub fn transform(raw4: &str) -> Result<Coordinate, TransformError> {
    Ok(match RawCoordinate::parse(raw4)? {
        RawCoordinate::NotRecorded => Coordinate::NONE,
        RawCoordinate::Index(i) => index_to_xy(i),
    })
}

/// Grid index to court units.
pub fn index_to_xy(index: u16) -> Coordinate {
    let (col, row) = grid_cell(index);
    Coordinate::new(
        col as f64 / (GRID_COLUMNS - 1) as f64 * X_SPAN + X_ORIGIN,
        row as f64 / GRID_ROWS as f64 * Y_SPAN + Y_ORIGIN,
    )
}

/// Nearest grid index for a court position, `None` outside the grid.
pub fn xy_to_index(x: f64, y: f64) -> Option<u16> {
    let col = ((x - X_ORIGIN) / X_SPAN * (GRID_COLUMNS - 1) as f64).round();
    let row = ((y - Y_ORIGIN) / Y_SPAN * GRID_ROWS as f64).round();
    if !(0.0..GRID_COLUMNS as f64).contains(&col) || !(0.0..GRID_ROWS as f64).contains(&row) {
        return None;
    }
    Some(row as u16 * GRID_COLUMNS + col as u16 + 1)
}

fn grid_cell(index: u16) -> (u16, u16) {
    let i = index.saturating_sub(1);
    (i % GRID_COLUMNS, i / GRID_COLUMNS)
}
