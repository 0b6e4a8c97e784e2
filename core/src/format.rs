use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
  Int8,
  Int16,
  Int32,
  UInt8,
  UInt16,
  UInt32,
  Float32
}

impl ScalarKind {
  pub fn byte_width(&self) -> usize {
    match self {
      ScalarKind::Int8
        | ScalarKind::UInt8 => 1,

      ScalarKind::Int16
        | ScalarKind::UInt16 => 2,

      ScalarKind::Int32
        | ScalarKind::UInt32
        | ScalarKind::Float32 => 4
    }
  }

  pub fn is_integer(&self) -> bool {
    !matches!(self, ScalarKind::Float32)
  }

  pub fn is_unsigned_integer(&self) -> bool {
    matches!(self,
      ScalarKind::UInt8
      | ScalarKind::UInt16
      | ScalarKind::UInt32)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
  Points,
  Lines,
  LineStrip,
  LineLoop,
  Triangles,
  TriangleStrip,
  TriangleFan
}

impl Primitive {
  // Inference rule for index tuples. A flat index list never goes through
  // this; it is Points by construction (see ElementSet::from_flat).
  pub fn from_tuple_arity(arity: usize) -> Option<Primitive> {
    match arity {
      2 => Some(Primitive::Lines),
      3 => Some(Primitive::Triangles),
      _ => None
    }
  }

  pub fn vertices_per_tuple(&self) -> Option<usize> {
    match self {
      Primitive::Points => Some(1),
      Primitive::Lines => Some(2),
      Primitive::Triangles => Some(3),
      _ => None
    }
  }
}
