//! Compressed `.npz` output of mask stacks.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ndarray::Array3;
use ndarray_npy::{NpzReader, NpzWriter};

use crate::error::{Error, Result};
use crate::roi::MarginStack;

/// Name of the stored array, matching numpy's default for positional arrays.
pub const ARRAY_NAME: &str = "arr_0";

/// Label of a margin in output file names: the ROI area as a percentage of
/// the base area, e.g. `"125%"` for a margin of 0.25.
pub fn percent_label(margin: f64) -> String {
    format!("{:.0}%", 100.0 * (1.0 + margin))
}

/// Output path `{dir}/{stem}_sqcenter_{percent}.npz` for one margin of
/// `input`. Without `outdir` the file goes next to the input.
pub fn output_path(input: &Path, outdir: Option<&Path>, margin: f64) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| Error::Malformed(format!("input path {input:?} has no file name")))?
        .to_string_lossy();
    let dir = match outdir {
        Some(dir) => dir,
        None => input.parent().unwrap_or(Path::new("")),
    };
    Ok(dir.join(format!("{stem}_sqcenter_{}.npz", percent_label(margin))))
}

/// Write one stack to a compressed `.npz` file.
pub fn write_stack(path: &Path, stack: &Array3<u8>) -> Result<()> {
    let mut npz = NpzWriter::new_compressed(File::create(path)?);
    npz.add_array(ARRAY_NAME, stack)?;
    npz.finish()?;
    Ok(())
}

/// Read a stack written by [`write_stack`].
pub fn read_stack(path: &Path) -> Result<Array3<u8>> {
    let mut npz = NpzReader::new(File::open(path)?)?;
    Ok(npz.by_name(ARRAY_NAME)?)
}

/// Write every stack of a run, returning the written paths in margin order.
pub fn export_squares(
    stacks: &[MarginStack],
    input: &Path,
    outdir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    if let Some(dir) = outdir {
        fs::create_dir_all(dir)?;
    }

    let mut written = Vec::with_capacity(stacks.len());
    for margin_stack in stacks {
        let path = output_path(input, outdir, margin_stack.margin)?;
        log::info!("Writing: {}", path.display());
        write_stack(&path, &margin_stack.stack)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    #[test]
    fn test_percent_label() {
        assert_eq!(percent_label(0.0), "100%");
        assert_eq!(percent_label(0.25), "125%");
        assert_eq!(percent_label(1.0), "200%");
        assert_eq!(percent_label(115.0 / 100.0 - 1.0), "115%");
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("data/pos03_contours.pickle");
        assert_eq!(
            output_path(input, None, 0.5).unwrap(),
            PathBuf::from("data/pos03_contours_sqcenter_150%.npz")
        );
        assert_eq!(
            output_path(input, Some(Path::new("out")), 0.0).unwrap(),
            PathBuf::from("out/pos03_contours_sqcenter_100%.npz")
        );
        assert_eq!(
            output_path(Path::new("bare.pkl"), None, 0.0).unwrap(),
            PathBuf::from("bare_sqcenter_100%.npz")
        );
    }

    #[test]
    fn test_stack_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.npz");

        let mut stack = Array3::<u8>::zeros((3, 7, 11));
        stack.slice_mut(s![0, 1..4, 2..6]).fill(1);
        stack.slice_mut(s![2, 5.., 8..]).fill(2);

        write_stack(&path, &stack).unwrap();
        assert_eq!(read_stack(&path).unwrap(), stack);
    }
}
