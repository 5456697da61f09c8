//! Predefined areas and microscope resolutions, and parsing of the
//! user-facing run parameters.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Named adhesion-site areas in µm².
pub const AREAS: &[(&str, f64)] = &[("Q20", 400.0), ("Q25", 625.0), ("Q30", 900.0)];

/// Named microscope resolutions in px/µm.
pub const RESOLUTIONS: &[(&str, f64)] = &[
    ("10x_UNikon", 1.527),
    ("10x_Nikon", 1.541),
    ("10x_Zeiss", 1.546),
];

fn lookup(table: &[(&str, f64)], name: &str) -> Option<f64> {
    table.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Resolve the base ROI area in px².
///
/// A numeric `area` is taken as px², or as µm² when `resolution` is given.
/// A named area is in µm² and requires a resolution. `resolution` is either
/// numeric (px/µm) or one of [`RESOLUTIONS`].
pub fn resolve_area(area: &str, resolution: Option<&str>) -> Result<f64> {
    let (mut value, needs_resolution) = match parse_number(area) {
        Some(v) => (v, false),
        None => (
            lookup(AREAS, area).ok_or_else(|| Error::InvalidArea(area.to_string()))?,
            true,
        ),
    };

    match resolution {
        Some(res) => {
            let px_per_um = parse_number(res)
                .or_else(|| lookup(RESOLUTIONS, res))
                .filter(|r| r.is_finite() && *r > 0.0)
                .ok_or_else(|| Error::InvalidResolution(res.to_string()))?;
            value *= px_per_um * px_per_um;
        }
        None if needs_resolution => return Err(Error::MissingResolution),
        None => {}
    }

    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidArea(area.to_string()));
    }
    Ok(value)
}

/// Parse a comma-separated list of ROI areas in percent of the base area
/// into margins, e.g. `"100,125"` into `[0.0, 0.25]`.
pub fn parse_margins(spec: &str) -> Result<Vec<f64>> {
    let margins = spec
        .split(',')
        .filter(|item| !item.is_empty())
        .map(|item| {
            parse_number(item)
                .filter(|p| p.is_finite() && *p >= 0.0)
                .map(|p| p / 100.0 - 1.0)
                .ok_or_else(|| Error::InvalidMargin(item.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    if margins.is_empty() {
        return Err(Error::InvalidMargin(spec.to_string()));
    }
    // Repeated margins would write the same output file twice.
    let mut unique: Vec<f64> = Vec::with_capacity(margins.len());
    for margin in margins {
        if !unique.contains(&margin) {
            unique.push(margin);
        }
    }
    Ok(unique)
}

/// Parse empty-site centers. Each entry may hold several `x,y` pairs
/// separated by semicolons.
pub fn parse_coordinates<S: AsRef<str>>(specs: &[S]) -> Result<Vec<(i64, i64)>> {
    specs
        .iter()
        .flat_map(|spec| spec.as_ref().split(';'))
        .filter(|item| !item.is_empty())
        .map(parse_coordinate)
        .collect()
}

fn parse_coordinate(item: &str) -> Result<(i64, i64)> {
    let invalid = || Error::InvalidCoordinate(item.to_string());
    let parts = item
        .split(',')
        .map(|p| p.trim().parse::<i64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>>>()?;
    match parts.as_slice() {
        &[x, y] => Ok((x, y)),
        _ => Err(invalid()),
    }
}

/// Input paths, expanded as Unix filename globs when `use_glob` is set.
///
/// Matches of one pattern come back in alphabetical order. Patterns are not
/// checked for existence when `use_glob` is unset.
pub fn expand_paths<S: AsRef<str>>(patterns: &[S], use_glob: bool) -> Result<Vec<PathBuf>> {
    if !use_glob {
        return Ok(patterns.iter().map(|p| PathBuf::from(p.as_ref())).collect());
    }

    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let entries = glob::glob(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;
        for entry in entries {
            paths.push(entry.map_err(|e| Error::Io(e.into_error()))?);
        }
    }
    Ok(paths)
}

/// Help text listing the predefined areas and resolutions.
pub fn epilog() -> String {
    let mut lines = vec!["Predefined areas:".to_string()];
    lines.extend(AREAS.iter().map(|(k, v)| format!("\t\"{k}\" (={v} µm²)")));
    lines.push(String::new());
    lines.push("Predefined microscope resolutions:".to_string());
    lines.extend(
        RESOLUTIONS
            .iter()
            .map(|(k, v)| format!("\t\"{k}\" (={v} px/µm)")),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_area_in_pixels() {
        assert_eq!(resolve_area("400", None).unwrap(), 400.0);
        assert_eq!(resolve_area(" 2.5e2 ", None).unwrap(), 250.0);
    }

    #[test]
    fn test_area_scaled_by_resolution() {
        assert_eq!(resolve_area("100", Some("2")).unwrap(), 400.0);
        let q20 = resolve_area("Q20", Some("10x_Nikon")).unwrap();
        assert!((q20 - 400.0 * 1.541 * 1.541).abs() < 1e-9);
    }

    #[test]
    fn test_area_errors() {
        assert!(matches!(
            resolve_area("Q99", Some("1")),
            Err(Error::InvalidArea(a)) if a == "Q99"
        ));
        assert!(matches!(
            resolve_area("Q25", None),
            Err(Error::MissingResolution)
        ));
        assert!(matches!(
            resolve_area("Q25", Some("40x")),
            Err(Error::InvalidResolution(r)) if r == "40x"
        ));
        assert!(matches!(resolve_area("-4", None), Err(Error::InvalidArea(_))));
        assert!(matches!(resolve_area("nan", None), Err(Error::InvalidArea(_))));
    }

    #[test]
    fn test_parse_margins() {
        assert_eq!(parse_margins("100").unwrap(), vec![0.0]);
        assert_eq!(parse_margins("100,125,,200").unwrap(), vec![0.0, 0.25, 1.0]);
        assert_eq!(parse_margins("0").unwrap(), vec![-1.0]);
        assert!(matches!(parse_margins("abc"), Err(Error::InvalidMargin(_))));
        assert!(matches!(parse_margins("-5"), Err(Error::InvalidMargin(_))));
        assert!(matches!(parse_margins(","), Err(Error::InvalidMargin(_))));
    }

    #[test]
    fn test_parse_margins_drops_repeats() {
        assert_eq!(parse_margins("100,125,100,125").unwrap(), vec![0.0, 0.25]);
    }

    #[test]
    fn test_expand_paths_passthrough() {
        let paths = expand_paths(&["data/*.pickle", "missing.pkl"], false).unwrap();
        assert_eq!(
            paths,
            vec![PathBuf::from("data/*.pickle"), PathBuf::from("missing.pkl")]
        );
    }

    #[test]
    fn test_expand_paths_glob() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["pos02.pickle", "pos01.pickle", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let pattern = dir.path().join("*.pickle").to_string_lossy().into_owned();

        let paths = expand_paths(&[pattern], true).unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join("pos01.pickle"), dir.path().join("pos02.pickle")]
        );
    }

    #[test]
    fn test_expand_paths_invalid_pattern() {
        assert!(matches!(
            expand_paths(&["[a"], true),
            Err(Error::InvalidPattern { pattern, .. }) if pattern == "[a"
        ));
    }

    #[test]
    fn test_parse_coordinates() {
        let coords = parse_coordinates(&["100,200;300, 400", "5,6;"]).unwrap();
        assert_eq!(coords, vec![(100, 200), (300, 400), (5, 6)]);
        assert!(parse_coordinates::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_coordinates_errors() {
        for bad in ["1,2,3", "7", "a,b", "1.5,2"] {
            assert!(
                matches!(parse_coordinates(&[bad]), Err(Error::InvalidCoordinate(c)) if c == bad),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_epilog_lists_tables() {
        let text = epilog();
        assert!(text.contains("\"Q25\" (=625 µm²)"));
        assert!(text.contains("\"10x_Zeiss\" (=1.546 px/µm)"));
    }
}
