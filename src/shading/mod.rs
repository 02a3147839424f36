//! Forward Blinn/Phong evaluation for a single fragment.

pub mod accumulate;
pub mod contribution;
pub mod surface;

pub use accumulate::{AmbientModel, FragmentShader};
pub use contribution::LobeParams;
pub use surface::{normal_matrix, Fragment, SurfaceInputs};
