use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{
    linalg::{Matrix, MatrixError},
    util::create_writer,
};

const POINT_DIM: usize = 3;

/// Write `points` (2 or 3 columns) with one integer label per row as legacy
/// ASCII VTK polydata. Missing coordinates are written as `0.0`.
pub fn write_vtk<W: Write>(writer: &mut W, points: &Matrix, labels: &[i32]) -> Result<()> {
    check_points(points, labels).context("Writing VTK")?;

    let num_points = points.height();
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "PCA output")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET POLYDATA")?;
    writeln!(writer, "POINTS {} float", num_points)?;

    for i in 0..num_points {
        for value in points.get_row(i)? {
            write!(writer, "{} ", value)?;
        }
        for _ in points.width()..POINT_DIM {
            write!(writer, "0.0 ")?;
        }
        writeln!(writer)?;
    }

    writeln!(writer)?;
    writeln!(writer, "POINT_DATA {}", num_points)?;
    writeln!(writer, "SCALARS label int")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for label in labels {
        writeln!(writer, "{}", label)?;
    }
    Ok(())
}

fn check_points(points: &Matrix, labels: &[i32]) -> Result<(), MatrixError> {
    if points.width() < 2 || points.width() > POINT_DIM {
        return Err(MatrixError::InvalidComponentCount {
            requested: points.width(),
            available: POINT_DIM,
        });
    }
    if labels.len() != points.height() {
        return Err(MatrixError::DimensionMismatch {
            op: "write_vtk",
            left: points.shape(),
            right: (labels.len(), 1),
        });
    }
    Ok(())
}

/// Create (or truncate) `path` and write the point cloud into it. Nothing is
/// created when the points are rejected.
pub fn export_vtk(path: &Path, points: &Matrix, labels: &[i32]) -> Result<()> {
    check_points(points, labels).context("Writing VTK")?;
    let mut writer = create_writer(path)?;
    write_vtk(&mut writer, points, labels)?;
    writer.flush().context("Writing VTK")?;
    info!("VTK file written to {}", path.to_string_lossy());
    Ok(())
}
