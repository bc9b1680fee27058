pub mod dataset;
pub mod eigen;
pub mod linalg;
pub mod pca;
pub mod util;
pub mod vtk;
