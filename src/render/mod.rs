pub mod frame;
pub mod software;
pub mod uniforms;

pub use frame::{FrameSnapshot, FrameStore};
pub use software::{render_floor, shade_fragments, FloorPlane, Framebuffer, RenderSettings};
pub use uniforms::{CameraBlock, DrawBlock, LightSetBlock};
