use super::*;

/// One variant per native uniform shape. Dispatch is an exhaustive match
/// in the backend; adding a variant here is a compile error there until
/// the matching native setter is wired up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
  Float(f32),
  Vec2([f32; 2]),
  Vec3([f32; 3]),
  Vec4([f32; 4]),
  Int(i32),
  IVec2([i32; 2]),
  IVec3([i32; 3]),
  IVec4([i32; 4]),
  UInt(u32),
  UVec2([u32; 2]),
  UVec3([u32; 3]),
  UVec4([u32; 4]),
  Bool(bool),
  Mat2([f32; 4]),
  Mat3([f32; 9]),
  Mat4([f32; 16]),
  Sampler(u32)
}

impl UniformValue {
  pub fn component_count(&self) -> u32 {
    match self {
      UniformValue::Float(_)
        | UniformValue::Int(_)
        | UniformValue::UInt(_)
        | UniformValue::Bool(_)
        | UniformValue::Sampler(_) => 1,

      UniformValue::Vec2(_)
        | UniformValue::IVec2(_)
        | UniformValue::UVec2(_) => 2,

      UniformValue::Vec3(_)
        | UniformValue::IVec3(_)
        | UniformValue::UVec3(_) => 3,

      UniformValue::Vec4(_)
        | UniformValue::IVec4(_)
        | UniformValue::UVec4(_)
        | UniformValue::Mat2(_) => 4,

      UniformValue::Mat3(_) => 9,
      UniformValue::Mat4(_) => 16
    }
  }

  pub fn component_kind(&self) -> ScalarKind {
    match self {
      UniformValue::Float(_)
        | UniformValue::Vec2(_)
        | UniformValue::Vec3(_)
        | UniformValue::Vec4(_)
        | UniformValue::Mat2(_)
        | UniformValue::Mat3(_)
        | UniformValue::Mat4(_) => ScalarKind::Float32,

      UniformValue::Int(_)
        | UniformValue::IVec2(_)
        | UniformValue::IVec3(_)
        | UniformValue::IVec4(_)
        | UniformValue::Bool(_)
        | UniformValue::Sampler(_) => ScalarKind::Int32,

      UniformValue::UInt(_)
        | UniformValue::UVec2(_)
        | UniformValue::UVec3(_)
        | UniformValue::UVec4(_) => ScalarKind::UInt32
    }
  }
}

/// Makes `program` current and sets every listed uniform through the
/// backend's exhaustive dispatch.
pub fn apply_uniforms<B: Backend>(device: &B::Device, program: &B::Program, uniforms: &[(u32, UniformValue)]) {
  unsafe {
    device.use_program(program);
    for (location, value) in uniforms {
      device.set_uniform(program, *location, value);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn component_counts() {
    assert_eq!(UniformValue::Float(1.0).component_count(), 1);
    assert_eq!(UniformValue::Vec3([0.0; 3]).component_count(), 3);
    assert_eq!(UniformValue::Mat2([0.0; 4]).component_count(), 4);
    assert_eq!(UniformValue::Mat4([0.0; 16]).component_count(), 16);
  }

  #[test]
  fn component_kinds() {
    assert_eq!(UniformValue::Mat3([0.0; 9]).component_kind(), ScalarKind::Float32);
    assert_eq!(UniformValue::Bool(true).component_kind(), ScalarKind::Int32);
    assert_eq!(UniformValue::Sampler(2).component_kind(), ScalarKind::Int32);
    assert_eq!(UniformValue::UVec4([0; 4]).component_kind(), ScalarKind::UInt32);
  }
}
