pub mod constants;
pub mod error;
pub mod host;
pub mod minimap;
pub mod scene;
pub mod transform;

pub use error::*;
pub use host::*;
pub use minimap::*;
pub use scene::*;
pub use transform::*;
