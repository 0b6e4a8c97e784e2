use std::cell::Ref;
use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

use super::*;

bitflags! {
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
  pub struct BufferUsage: u32 {
    const VERTEX = 0b1;
    const INDEX  = 0b10;
  }
}

/// A contiguous scalar sequence tagged with its kind. Constructing from an
/// already-typed vector moves it without copying; the `from_*_slice`
/// constructors copy. That distinction is the ownership contract callers
/// rely on when they keep mutating their own copy of the data.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedData {
  Int8(Vec<i8>),
  Int16(Vec<i16>),
  Int32(Vec<i32>),
  UInt8(Vec<u8>),
  UInt16(Vec<u16>),
  UInt32(Vec<u32>),
  Float32(Vec<f32>)
}

impl TypedData {
  pub fn kind(&self) -> ScalarKind {
    match self {
      TypedData::Int8(_) => ScalarKind::Int8,
      TypedData::Int16(_) => ScalarKind::Int16,
      TypedData::Int32(_) => ScalarKind::Int32,
      TypedData::UInt8(_) => ScalarKind::UInt8,
      TypedData::UInt16(_) => ScalarKind::UInt16,
      TypedData::UInt32(_) => ScalarKind::UInt32,
      TypedData::Float32(_) => ScalarKind::Float32
    }
  }

  pub fn len(&self) -> usize {
    match self {
      TypedData::Int8(values) => values.len(),
      TypedData::Int16(values) => values.len(),
      TypedData::Int32(values) => values.len(),
      TypedData::UInt8(values) => values.len(),
      TypedData::UInt16(values) => values.len(),
      TypedData::UInt32(values) => values.len(),
      TypedData::Float32(values) => values.len()
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn byte_len(&self) -> usize {
    self.len() * self.kind().byte_width()
  }

  pub fn as_bytes(&self) -> &[u8] {
    match self {
      TypedData::Int8(values) => bytemuck::cast_slice(values),
      TypedData::Int16(values) => bytemuck::cast_slice(values),
      TypedData::Int32(values) => bytemuck::cast_slice(values),
      TypedData::UInt8(values) => values,
      TypedData::UInt16(values) => bytemuck::cast_slice(values),
      TypedData::UInt32(values) => bytemuck::cast_slice(values),
      TypedData::Float32(values) => bytemuck::cast_slice(values)
    }
  }

  pub fn from_f32_slice(values: &[f32]) -> Self {
    TypedData::Float32(values.to_vec())
  }

  pub fn from_u32_slice(values: &[u32]) -> Self {
    TypedData::UInt32(values.to_vec())
  }
}

impl From<Vec<i8>> for TypedData {
  fn from(values: Vec<i8>) -> Self {
    TypedData::Int8(values)
  }
}

impl From<Vec<i16>> for TypedData {
  fn from(values: Vec<i16>) -> Self {
    TypedData::Int16(values)
  }
}

impl From<Vec<i32>> for TypedData {
  fn from(values: Vec<i32>) -> Self {
    TypedData::Int32(values)
  }
}

impl From<Vec<u8>> for TypedData {
  fn from(values: Vec<u8>) -> Self {
    TypedData::UInt8(values)
  }
}

impl From<Vec<u16>> for TypedData {
  fn from(values: Vec<u16>) -> Self {
    TypedData::UInt16(values)
  }
}

impl From<Vec<u32>> for TypedData {
  fn from(values: Vec<u32>) -> Self {
    TypedData::UInt32(values)
  }
}

impl From<Vec<f32>> for TypedData {
  fn from(values: Vec<f32>) -> Self {
    TypedData::Float32(values)
  }
}

/// One vertex or index stream: retained CPU data plus the lazily-recreated
/// native buffer object. The native handle lives behind a RefCell so the
/// single-threaded restore discipline can swap it without exclusive access
/// to the descriptor graph that shares this buffer.
pub struct FlatBuffer<B: Backend> {
  data: RefCell<TypedData>,
  usage: BufferUsage,
  name: Option<String>,
  native: RefCell<Option<B::Buffer>>
}

impl<B: Backend> std::fmt::Debug for FlatBuffer<B> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FlatBuffer")
      .field("data", &self.data)
      .field("usage", &self.usage)
      .field("name", &self.name)
      .finish()
  }
}

impl<B: Backend> FlatBuffer<B> {
  pub fn new(device: &B::Device, data: TypedData, usage: BufferUsage, name: Option<&str>) -> Result<Rc<Self>, GeometryError> {
    let native = unsafe { device.create_buffer(usage, data.as_bytes(), name)? };
    Ok(Rc::new(Self {
      data: RefCell::new(data),
      usage,
      name: name.map(|name| name.to_string()),
      native: RefCell::new(Some(native))
    }))
  }

  pub fn kind(&self) -> ScalarKind {
    self.data.borrow().kind()
  }

  pub fn len(&self) -> usize {
    self.data.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn usage(&self) -> BufferUsage {
    self.usage
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn handle(&self) -> Ref<'_, Option<B::Buffer>> {
    self.native.borrow()
  }

  /// Replaces the retained contents and re-specifies the native data store
  /// in full. The scalar kind is fixed for the buffer's lifetime; the
  /// length is not. A length change keeps the same native buffer object,
  /// so vertex arrays referencing it stay valid, but counts derived by
  /// already-assembled geometry are not revalidated.
  pub fn store(&self, device: &B::Device, data: TypedData) -> Result<(), GeometryError> {
    let mut retained = self.data.borrow_mut();
    if data.kind() != retained.kind() {
      return Err(GeometryError::KindMismatch {
        existing: retained.kind(),
        replacement: data.kind()
      });
    }
    if data.len() != retained.len() {
      log::debug!("resizing {:?} buffer from {} to {} values", retained.kind(), retained.len(), data.len());
    }
    *retained = data;
    if let Some(handle) = self.native.borrow().as_ref() {
      unsafe {
        device.upload_buffer(handle, retained.as_bytes());
      }
    }
    // An invalidated buffer keeps the new contents and uploads on restore.
    Ok(())
  }

  /// Idempotent: a buffer whose native handle is still valid is left
  /// untouched. Otherwise the buffer object is reallocated and re-uploaded
  /// from the retained data.
  pub fn restore(&self, device: &B::Device) -> Result<(), GeometryError> {
    let mut native = self.native.borrow_mut();
    if let Some(handle) = native.as_ref() {
      if unsafe { device.buffer_is_valid(handle) } {
        log::trace!("{}: buffer still valid, restore is a no-op", B::name());
        return Ok(());
      }
    }
    let data = self.data.borrow();
    *native = Some(unsafe { device.create_buffer(self.usage, data.as_bytes(), self.name.as_deref())? });
    Ok(())
  }

  /// Drops the native handle, keeping the retained data for `restore`.
  pub fn invalidate(&self) {
    *self.native.borrow_mut() = None;
  }
}
