use super::*;

// The trait family a native graphics backend implements. There are no Send
// or Sync bounds anywhere: the execution model is single-threaded and
// cooperative, and the native context is a single piece of global mutable
// state that must only ever be driven from one thread.
pub trait Backend: 'static + Sized {
  type Device: Device<Self>;
  type Buffer: PartialEq;
  type VertexArray;
  type Target;
  type Program;

  fn name() -> &'static str;
}

/// The fixed vocabulary of native calls the descriptor layer marshals
/// into. Every method is `unsafe`: the caller upholds the invariants the
/// type system cannot see, i.e. that the context behind the device is
/// current and that handles passed in were created by this device and not
/// invalidated since.
pub trait Device<B: Backend> {
  unsafe fn create_buffer(&self, usage: BufferUsage, data: &[u8], name: Option<&str>) -> Result<B::Buffer, DeviceError>;
  /// Re-specifies the buffer's entire data store. The length may differ
  /// from the previous allocation; the buffer object identity is kept.
  unsafe fn upload_buffer(&self, buffer: &B::Buffer, data: &[u8]);
  unsafe fn buffer_is_valid(&self, buffer: &B::Buffer) -> bool;

  unsafe fn create_vertex_array(&self, name: Option<&str>) -> Result<B::VertexArray, DeviceError>;
  unsafe fn bind_vertex_array(&self, vertex_array: Option<&B::VertexArray>);
  unsafe fn vertex_array_is_valid(&self, vertex_array: &B::VertexArray) -> bool;

  unsafe fn bind_array_buffer(&self, buffer: Option<&B::Buffer>);
  unsafe fn enable_vertex_attribute(&self, location: u32);
  /// Reads the currently bound array buffer as float data, converting and
  /// optionally normalizing integer kinds.
  unsafe fn vertex_attribute_pointer(&self, location: u32, layout: &AttributeLayout);
  /// Reads the currently bound array buffer as integer data. Layouts
  /// reaching this call never have `normalized` set.
  unsafe fn vertex_attribute_int_pointer(&self, location: u32, layout: &AttributeLayout);
  unsafe fn vertex_attribute_divisor(&self, location: u32, divisor: u32);
  /// Binds the index buffer into the currently bound vertex array.
  unsafe fn bind_index_buffer(&self, buffer: &B::Buffer);

  /// `instances == 0` draws non-instanced; `instances > 0` selects the
  /// instanced form with that instance count.
  unsafe fn draw(&self, primitive: Primitive, first: u32, count: u32, instances: u32);
  unsafe fn draw_indexed(&self, primitive: Primitive, index_kind: ScalarKind, count: u32, instances: u32);

  unsafe fn bind_target(&self, target: &B::Target, extent: Extent);
  unsafe fn clear(&self, mask: ClearMask, value: &ClearValue);

  unsafe fn create_program(&self, vertex_source: &str, fragment_source: &str, name: Option<&str>) -> Result<B::Program, DeviceError>;
  unsafe fn use_program(&self, program: &B::Program);
  unsafe fn attribute_location(&self, program: &B::Program, name: &str) -> Option<u32>;
  unsafe fn uniform_location(&self, program: &B::Program, name: &str) -> Option<u32>;
  /// Sets a uniform on the currently used program. Backends match the
  /// value exhaustively; there is no catch-all dispatch path.
  unsafe fn set_uniform(&self, program: &B::Program, location: u32, value: &UniformValue);
}
