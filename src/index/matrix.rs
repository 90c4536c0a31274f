//! Binary file format for the embedding matrix.
//!
//! Layout: magic `SVMX`, `u32` format version, `u64` rows, `u64` cols, then
//! `rows * cols` little-endian `f32` values in row-major order. All integers are
//! little-endian.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::Array2;

use crate::error::{Error, Result};

const MAGIC: &[u8; 4] = b"SVMX";
const FORMAT_VERSION: u32 = 1;

/// Write `matrix` to `path`, creating parent directories as needed.
pub fn write_matrix(path: impl AsRef<Path>, matrix: &Array2<f32>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(MAGIC)?;
    out.write_all(&FORMAT_VERSION.to_le_bytes())?;
    out.write_all(&(matrix.nrows() as u64).to_le_bytes())?;
    out.write_all(&(matrix.ncols() as u64).to_le_bytes())?;
    // iter() walks in logical (row-major) order regardless of memory layout
    for value in matrix.iter() {
        out.write_all(&value.to_le_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Read a matrix written by [`write_matrix`].
pub fn read_matrix(path: impl AsRef<Path>) -> Result<Array2<f32>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut input = BufReader::new(file);

    let mut magic = [0u8; 4];
    input.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::MalformedMatrix("bad magic bytes".into()));
    }
    let version = u32::from_le_bytes(read_array(&mut input)?);
    if version != FORMAT_VERSION {
        return Err(Error::MalformedMatrix(format!(
            "unsupported format version {version}"
        )));
    }
    let rows = u64::from_le_bytes(read_array(&mut input)?) as usize;
    let cols = u64::from_le_bytes(read_array(&mut input)?) as usize;

    let expected_len = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(24))
        .ok_or_else(|| Error::MalformedMatrix(format!("shape ({rows}, {cols}) overflows")))?;
    if expected_len as u64 != file_len {
        return Err(Error::MalformedMatrix(format!(
            "shape ({rows}, {cols}) needs {expected_len} bytes, file has {file_len}"
        )));
    }

    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows * cols {
        data.push(f32::from_le_bytes(read_array(&mut input)?));
    }

    Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::MalformedMatrix(e.to_string()))
}

fn read_array<const N: usize>(input: &mut impl Read) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_preserves_values_and_shape() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("m.bin");
        let matrix = array![[1.0f32, -0.5, 0.0], [0.25, 3.5, -7.0]];

        write_matrix(&path, &matrix).unwrap();
        assert_eq!(read_matrix(&path).unwrap(), matrix);
    }

    #[test]
    fn transposed_view_is_written_in_logical_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.bin");
        let matrix = array![[1.0f32, 2.0], [3.0, 4.0]].reversed_axes();

        write_matrix(&path, &matrix).unwrap();
        assert_eq!(read_matrix(&path).unwrap(), array![[1.0f32, 3.0], [2.0, 4.0]]);
    }

    #[test]
    fn truncated_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("m.bin");
        write_matrix(&path, &array![[1.0f32, 2.0], [3.0, 4.0]]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

        assert!(matches!(read_matrix(&path), Err(Error::MalformedMatrix(_))));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("m.bin");
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00").unwrap();
        assert!(matches!(read_matrix(&path), Err(Error::MalformedMatrix(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            read_matrix(tmp.path().join("absent.bin")),
            Err(Error::NotFound(_))
        ));
    }
}
