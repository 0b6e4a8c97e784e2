use weft_core::{BufferUsage, ClearMask, ClearValue, Extent, Primitive, ScalarKind, UniformValue};

/// One recorded native call. Integration tests drain the device's log and
/// assert on these; a trace consumer could replay them against a real
/// context.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBuffer { id: u64, usage: BufferUsage, byte_len: usize },
    UploadBuffer { id: u64, byte_len: usize },
    DeleteBuffer { id: u64 },
    CreateVertexArray { id: u64 },
    BindVertexArray { id: Option<u64> },
    DeleteVertexArray { id: u64 },
    BindArrayBuffer { id: Option<u64> },
    EnableVertexAttribute { location: u32 },
    VertexAttributePointer { location: u32, buffer: u64, components: u32, kind: ScalarKind, normalized: bool },
    VertexAttributeIntPointer { location: u32, buffer: u64, components: u32, kind: ScalarKind },
    VertexAttributeDivisor { location: u32, divisor: u32 },
    BindIndexBuffer { id: u64 },
    Draw { primitive: Primitive, first: u32, count: u32, instances: u32 },
    DrawIndexed { primitive: Primitive, kind: ScalarKind, count: u32, instances: u32 },
    BindTarget { id: u64, extent: Extent },
    Clear { mask: ClearMask, value: ClearValue },
    CreateProgram { id: u64 },
    UseProgram { id: u64 },
    DeleteProgram { id: u64 },
    SetUniform { program: u64, location: u32, setter: &'static str },
}

/// The native setter a uniform value dispatches to. The match is
/// exhaustive on purpose: a new value shape cannot be added without
/// naming its setter here.
pub fn native_setter(value: &UniformValue) -> &'static str {
    match value {
        UniformValue::Float(_) => "uniform1f",
        UniformValue::Vec2(_) => "uniform2fv",
        UniformValue::Vec3(_) => "uniform3fv",
        UniformValue::Vec4(_) => "uniform4fv",
        UniformValue::Int(_) => "uniform1i",
        UniformValue::IVec2(_) => "uniform2iv",
        UniformValue::IVec3(_) => "uniform3iv",
        UniformValue::IVec4(_) => "uniform4iv",
        UniformValue::UInt(_) => "uniform1ui",
        UniformValue::UVec2(_) => "uniform2uiv",
        UniformValue::UVec3(_) => "uniform3uiv",
        UniformValue::UVec4(_) => "uniform4uiv",
        UniformValue::Bool(_) => "uniform1i",
        UniformValue::Mat2(_) => "uniformMatrix2fv",
        UniformValue::Mat3(_) => "uniformMatrix3fv",
        UniformValue::Mat4(_) => "uniformMatrix4fv",
        UniformValue::Sampler(_) => "uniform1i",
    }
}
