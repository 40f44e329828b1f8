use crate::polyline::{Point, Polyline};
use crate::Error;

fn coordinate<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<f64, Error> {
    let token = tokens.next().ok_or(Error::MalformedPath)?;
    token
        .parse()
        .map_err(|_| Error::ExpectedCoordinate(token.to_string()))
}

/// Converts a path `d` attribute into a polyline
///
/// Supported commands: `M x y` (absolute move, start of path only),
/// `L x y` (absolute line), `h dx` / `v dy` (relative line), and a final
/// `Z`/`z` which closes the shape
pub fn path_to_polyline(d: &str) -> Result<Polyline, Error> {
    let mut tokens = d.split_whitespace();
    let mut points: Vec<Point> = Vec::new();
    let mut closed = false;

    while let Some(token) = tokens.next() {
        match token {
            "M" if points.is_empty() => {
                let x = coordinate(&mut tokens)?;
                let y = coordinate(&mut tokens)?;
                points.push((x, y));
            }
            "L" if !points.is_empty() => {
                let x = coordinate(&mut tokens)?;
                let y = coordinate(&mut tokens)?;
                points.push((x, y));
            }
            "h" if !points.is_empty() => {
                let dx = coordinate(&mut tokens)?;
                let (x, y) = points[points.len() - 1];
                points.push((x + dx, y));
            }
            "v" if !points.is_empty() => {
                let dy = coordinate(&mut tokens)?;
                let (x, y) = points[points.len() - 1];
                points.push((x, y + dy));
            }
            "Z" | "z" if !points.is_empty() => {
                closed = true;
                if tokens.next().is_some() {
                    return Err(Error::MalformedPath);
                }
            }
            _ => return Err(Error::UnsupportedCommand(token.to_string())),
        }
    }

    if points.len() < 2 {
        return Err(Error::MalformedPath);
    }
    Ok(Polyline { points, closed })
}

/// Renders a full `<path .../>` fragment from a `d` attribute, stroke and
/// fill, the exact text that gets signed and committed
pub fn svg_path_string(d: &str, stroke: &str, fill: &str) -> String {
    format!("<path d=\"{}\" stroke=\"{}\" fill=\"{}\"/>", d, stroke, fill)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_lines() {
        let polyline = path_to_polyline("M 130 20 L 160 20").unwrap();
        assert_eq!(polyline.points, vec![(130.0, 20.0), (160.0, 20.0)]);
        assert!(!polyline.closed);
    }

    #[test]
    fn parses_relative_lines_and_close() {
        let polyline = path_to_polyline("M 80 20 h 20 v 20 Z").unwrap();
        assert_eq!(
            polyline.points,
            vec![(80.0, 20.0), (100.0, 20.0), (100.0, 40.0)]
        );
        assert!(polyline.closed);
    }

    #[test]
    fn rejects_invalid_paths() {
        [
            "M 0 0 C 1 1 2 2 3 3", // unsupported command
            "L 0 0 L 10 10",       // line before move
            "M 0 0 L 10",          // missing coordinate
            "M 0 0 L ten 10",      // non-numeric coordinate
            "M 0 0",               // no segment
            "M 0 0 L 10 10 Z z",   // trailing tokens after close
            "",
        ]
        .iter()
        .for_each(|d| {
            assert!(path_to_polyline(d).is_err(), "accepted {:?}", d);
        });
    }

    #[test]
    fn renders_path_fragments() {
        assert_eq!(
            svg_path_string("M 130 20 L 160 20", "green", "transparent"),
            "<path d=\"M 130 20 L 160 20\" stroke=\"green\" fill=\"transparent\"/>"
        );
    }
}
