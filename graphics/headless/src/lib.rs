mod backend;
mod call;
mod device;
mod handles;

pub use backend::HeadlessBackend;
pub use call::{native_setter, Call};
pub use device::HeadlessDevice;
pub use handles::{HeadlessBuffer, HeadlessProgram, HeadlessTarget, HeadlessVertexArray};
