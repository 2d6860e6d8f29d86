use cellscan_core::model::Detection;

use crate::output::CellValue;

pub fn print_values(values: &[CellValue]) {
    if values.is_empty() {
        println!("No regions extracted.");
        return;
    }
    print!("{}", format_values(values));
}

pub fn format_values(values: &[CellValue]) -> String {
    let label_width = values
        .iter()
        .map(|v| v.label.chars().count())
        .max()
        .unwrap_or(5)
        .max("Label".len());

    let mut out = String::new();
    out.push_str(&format!(
        "  {:<label_width$}  {:<6}  Text\n",
        "Label", "Cell"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(label_width + 16)));

    for v in values {
        let cell = v
            .cell
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "  {:<label_width$}  {:<6}  {}\n",
            v.label, cell, v.text
        ));
    }
    out
}

pub fn print_detections(page: u32, detections: &[Detection]) {
    println!("Page {page}: {} detection(s)\n", detections.len());
    println!("  {:>5}  {:<24}  Text", "Conf", "Box (x1,y1)-(x2,y2)");
    for d in detections {
        let (min_x, min_y, max_x, max_y) = bounds(d);
        let bbox = format!("({min_x:.0},{min_y:.0})-({max_x:.0},{max_y:.0})");
        println!("  {:>5.2}  {:<24}  {}", d.confidence, bbox, d.text);
    }
}

fn bounds(d: &Detection) -> (f32, f32, f32, f32) {
    d.polygon.iter().fold(
        (
            f32::INFINITY,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::NEG_INFINITY,
        ),
        |(x1, y1, x2, y2), p| (x1.min(p.x), y1.min(p.y), x2.max(p.x), y2.max(p.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellscan_core::cell::CellRef;
    use cellscan_core::geometry::box_polygon;

    #[test]
    fn formats_aligned_rows() {
        let values = vec![
            CellValue {
                label: "B12".into(),
                cell: CellRef::parse("B12").ok(),
                text: "1.234.567".into(),
            },
            CellValue {
                label: "total".into(),
                cell: None,
                text: "n/a".into(),
            },
        ];
        let out = format_values(&values);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("B12"));
        assert!(lines[2].ends_with("1.234.567"));
        assert!(lines[3].contains(" -  "));
    }

    #[test]
    fn bounds_cover_polygon() {
        let d = Detection {
            polygon: box_polygon(10.0, 20.0, 30.0, 5.0),
            text: "x".into(),
            confidence: 0.9,
        };
        assert_eq!(bounds(&d), (10.0, 20.0, 40.0, 25.0));
    }
}
