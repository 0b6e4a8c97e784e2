pub use self::attribute::*;
pub use self::backend::*;
pub use self::buffer::*;
pub use self::elements::*;
pub use self::error::*;
pub use self::format::*;
pub use self::geometry::*;
pub use self::ravel::*;
pub use self::target::*;
pub use self::uniform::*;

mod attribute;
mod backend;
mod buffer;
mod elements;
mod error;
mod format;
mod geometry;
mod ravel;
mod target;
mod uniform;
