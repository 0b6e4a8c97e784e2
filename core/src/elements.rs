use std::rc::Rc;

use super::*;

/// An index stream plus the drawing primitive it implies.
pub struct ElementSet<B: Backend> {
  buffer: Rc<FlatBuffer<B>>,
  primitive: Primitive,
  count: u32
}

impl<B: Backend> std::fmt::Debug for ElementSet<B> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ElementSet")
      .field("buffer", &self.buffer)
      .field("primitive", &self.primitive)
      .field("count", &self.count)
      .finish()
  }
}

impl<B: Backend> ElementSet<B> {
  /// Tuple-per-primitive index data. The tuple arity picks the primitive:
  /// pairs are Lines, triples are Triangles, anything else is rejected.
  pub fn from_rows(device: &B::Device, rows: &[impl AsRef<[u32]>]) -> Result<Self, GeometryError> {
    let (data, shape) = ravel(rows);
    let primitive = Primitive::from_tuple_arity(shape.inner)
      .ok_or(GeometryError::InvalidElementArity(shape.inner))?;
    Self::from_typed(device, TypedData::UInt32(data), primitive)
  }

  /// A flat index list denotes point indices. This is the one place the
  /// ambiguity between "flat list of points" and "list of 1-tuples" is
  /// resolved: 1-tuples do not exist, flat input does.
  pub fn from_flat(device: &B::Device, indices: &[u32]) -> Result<Self, GeometryError> {
    Self::from_typed(device, TypedData::from_u32_slice(indices), Primitive::Points)
  }

  pub fn from_typed(device: &B::Device, data: TypedData, primitive: Primitive) -> Result<Self, GeometryError> {
    if !data.kind().is_unsigned_integer() {
      return Err(GeometryError::InvalidIndexKind(data.kind()));
    }
    if let Some(arity) = primitive.vertices_per_tuple() {
      if data.len() % arity != 0 {
        log::warn!("{} indices do not fill whole {:?} tuples", data.len(), primitive);
      }
    }
    let count = data.len() as u32;
    let buffer = FlatBuffer::new(device, data, BufferUsage::INDEX, None)?;
    Ok(Self {
      buffer,
      primitive,
      count
    })
  }

  /// Shares an existing index buffer instead of allocating a new one.
  pub fn from_buffer(buffer: Rc<FlatBuffer<B>>, primitive: Primitive) -> Result<Self, GeometryError> {
    if !buffer.kind().is_unsigned_integer() {
      return Err(GeometryError::InvalidIndexKind(buffer.kind()));
    }
    let count = buffer.len() as u32;
    Ok(Self {
      buffer,
      primitive,
      count
    })
  }

  pub fn buffer(&self) -> &Rc<FlatBuffer<B>> {
    &self.buffer
  }

  pub fn primitive(&self) -> Primitive {
    self.primitive
  }

  pub fn count(&self) -> u32 {
    self.count
  }

  pub fn kind(&self) -> ScalarKind {
    self.buffer.kind()
  }
}
