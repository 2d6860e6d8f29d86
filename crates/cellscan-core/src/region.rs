use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RegionError;
use crate::geometry::Point;

/// Closed, axis-aligned rectangle in image pixel coordinates.
///
/// Always normalized so that `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Rect {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        (self.x1 as f32) <= p.x
            && p.x <= (self.x2 as f32)
            && (self.y1 as f32) <= p.y
            && p.y <= (self.y2 as f32)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A labeled rectangle on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// 1-based page number as written in the token.
    pub page: u32,
    pub label: String,
    pub rect: Rect,
}

/// Outcome of parsing a list of tokens: valid specs in input order plus
/// the errors for tokens that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ParsedSpecs {
    pub specs: Vec<RegionSpec>,
    pub rejected: Vec<RegionError>,
}

/// Parse one `page,label,x1,y1,x2,y2` token.
///
/// Returns `Ok(None)` for blank tokens. Fields beyond the sixth are ignored.
pub fn parse_region_spec(token: &str) -> Result<Option<RegionSpec>, RegionError> {
    if token.trim().is_empty() {
        return Ok(None);
    }

    let malformed = |reason: String| RegionError::MalformedSpec {
        token: token.to_string(),
        reason,
    };

    let fields: Vec<&str> = token.split(',').map(str::trim).collect();
    if fields.len() < 6 {
        return Err(malformed(format!(
            "expected 6 comma-separated fields, found {}",
            fields.len()
        )));
    }

    let page: u32 = fields[0]
        .parse()
        .map_err(|_| malformed(format!("page '{}' is not a non-negative integer", fields[0])))?;

    let label = fields[1];
    if label.is_empty() {
        return Err(malformed("label is empty".into()));
    }

    let mut coords = [0i32; 4];
    for (slot, (name, raw)) in coords
        .iter_mut()
        .zip(["x1", "y1", "x2", "y2"].iter().zip(&fields[2..6]))
    {
        *slot = raw
            .parse()
            .map_err(|_| malformed(format!("{name} '{raw}' is not an integer")))?;
    }
    let [x1, y1, x2, y2] = coords;

    Ok(Some(RegionSpec {
        page,
        label: label.to_string(),
        rect: Rect::new(x1, y1, x2, y2),
    }))
}

/// Parse every token, skipping blanks and collecting malformed ones.
pub fn parse_region_specs<S: AsRef<str>>(tokens: &[S]) -> ParsedSpecs {
    let mut parsed = ParsedSpecs::default();
    for token in tokens {
        match parse_region_spec(token.as_ref()) {
            Ok(Some(spec)) => parsed.specs.push(spec),
            Ok(None) => {}
            Err(e) => parsed.rejected.push(e),
        }
    }
    parsed
}
