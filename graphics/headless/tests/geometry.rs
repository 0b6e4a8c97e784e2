use weft_core::{
    AttributeBinding, AttributeSpec, BufferUsage, ElementSet, FlatBuffer, GeometryBuilder,
    GeometryError, Primitive, ReadMode, ScalarKind, TypedData,
};
use weft_headless::{Call, HeadlessBackend, HeadlessDevice};

fn device() -> HeadlessDevice {
    let _ = env_logger::builder().is_test(true).try_init();
    HeadlessDevice::new()
}

fn builder() -> GeometryBuilder<HeadlessBackend> {
    GeometryBuilder::new()
}

#[test]
fn vertex_count_is_minimum_over_non_instanced_bindings() {
    let device = device();
    let positions: Vec<[f32; 3]> = (0..10).map(|i| [i as f32, 0.0, 0.0]).collect();
    let weights: Vec<f32> = (0..7).map(|i| i as f32).collect();

    let geometry = builder()
        .attribute_rows(0, &positions)
        .attribute_flat(1, &weights)
        .assemble(&device)
        .unwrap();

    assert_eq!(geometry.vertex_count(), 7);
    assert_eq!(geometry.instance_count(), 0);
    assert_eq!(geometry.primitive(), Primitive::Triangles);
}

#[test]
fn instance_count_comes_from_divisor_bindings() {
    let device = device();
    let positions: Vec<[f32; 3]> = (0..10).map(|i| [i as f32, 0.0, 0.0]).collect();
    let weights: Vec<f32> = (0..7).map(|i| i as f32).collect();
    let offsets = FlatBuffer::<HeadlessBackend>::new(
        &device,
        TypedData::from_f32_slice(&[0.0, 0.0, 1.0, 0.0, 2.0, 0.0]),
        BufferUsage::VERTEX,
        Some("instance_offsets"),
    )
    .unwrap();

    let geometry = builder()
        .attribute_rows(0, &positions)
        .attribute_flat(1, &weights)
        .attribute(
            2,
            AttributeSpec {
                buffer: offsets,
                mode: ReadMode::Pointer,
                components: 2,
                normalized: false,
                divisor: 2,
            },
        )
        .assemble(&device)
        .unwrap();

    // 3 per-instance values advancing every 2 instances.
    assert_eq!(geometry.vertex_count(), 7);
    assert_eq!(geometry.instance_count(), 6);

    device.take_calls();
    geometry.draw(&device).unwrap();
    let calls = device.take_calls();
    assert!(calls.contains(&Call::Draw {
        primitive: Primitive::Triangles,
        first: 0,
        count: 7,
        instances: 6,
    }));
}

#[test]
fn element_arity_picks_the_primitive() {
    let device = device();

    let triangles = builder()
        .attribute_rows(0, &[[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
        .elements_rows(&[[0u32, 1, 2], [1, 2, 3]])
        .assemble(&device)
        .unwrap();
    assert_eq!(triangles.primitive(), Primitive::Triangles);
    assert_eq!(triangles.vertex_count(), 6);

    let lines = builder()
        .elements_rows(&[[0u32, 1], [1, 2]])
        .assemble(&device)
        .unwrap();
    assert_eq!(lines.primitive(), Primitive::Lines);
    assert_eq!(lines.vertex_count(), 4);

    let err = builder()
        .elements_rows(&[[0u32, 1, 2, 3]])
        .assemble(&device)
        .unwrap_err();
    assert!(matches!(err, GeometryError::InvalidElementArity(4)));

    let points = builder().elements_flat(&[5u32, 9, 12]).assemble(&device).unwrap();
    assert_eq!(points.primitive(), Primitive::Points);
    assert_eq!(points.vertex_count(), 3);

    // The standalone constructors follow the same rules.
    let direct = ElementSet::<HeadlessBackend>::from_rows(&device, &[[0u32, 2], [2, 4]]).unwrap();
    assert_eq!(direct.primitive(), Primitive::Lines);
    assert_eq!(direct.count(), 4);
    let direct_points = ElementSet::<HeadlessBackend>::from_flat(&device, &[1u32, 3]).unwrap();
    assert_eq!(direct_points.primitive(), Primitive::Points);
    assert_eq!(direct_points.count(), 2);
}

#[test]
fn explicit_element_kind_must_be_unsigned() {
    let device = device();
    let err = builder()
        .elements_typed(TypedData::Int32(vec![0, 1, 2]), Primitive::Triangles)
        .assemble(&device)
        .unwrap_err();
    assert!(matches!(err, GeometryError::InvalidIndexKind(ScalarKind::Int32)));

    let indices = FlatBuffer::<HeadlessBackend>::new(
        &device,
        TypedData::UInt16(vec![0, 1, 1, 2]),
        BufferUsage::INDEX,
        None,
    )
    .unwrap();
    let elements = ElementSet::from_buffer(indices, Primitive::Lines).unwrap();
    let geometry = builder().elements(elements).assemble(&device).unwrap();
    assert_eq!(geometry.vertex_count(), 4);

    let floats = FlatBuffer::<HeadlessBackend>::new(
        &device,
        TypedData::Float32(vec![0.0, 1.0]),
        BufferUsage::INDEX,
        None,
    )
    .unwrap();
    let err = ElementSet::from_buffer(floats, Primitive::Lines).unwrap_err();
    assert!(matches!(err, GeometryError::InvalidIndexKind(ScalarKind::Float32)));
}

#[test]
fn empty_geometry_is_legal_and_draws_by_explicit_count() {
    let device = device();
    let geometry = builder().assemble(&device).unwrap();

    assert!(geometry.is_empty());
    assert_eq!(geometry.vertex_count(), 0);
    assert_eq!(geometry.instance_count(), 0);
    assert!(geometry.vertex_array().is_none());
    // Assembly of empty geometry never touches the native layer.
    assert!(device.take_calls().is_empty());

    // Derived counts are zero, so this is a no-op.
    geometry.draw(&device).unwrap();
    assert!(device.take_calls().is_empty());

    geometry.draw_count(&device, 5).unwrap();
    assert_eq!(
        device.take_calls(),
        vec![
            Call::BindVertexArray { id: None },
            Call::Draw {
                primitive: Primitive::Triangles,
                first: 0,
                count: 5,
                instances: 0,
            },
            Call::BindVertexArray { id: None },
        ]
    );
}

#[test]
fn assembly_issues_the_fixed_marshaling_sequence() {
    let device = device();
    let geometry = builder()
        .attribute_flat(3, &[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .attribute_rows(1, &[[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]])
        .elements_rows(&[[0u32, 1, 2], [1, 2, 3]])
        .assemble(&device)
        .unwrap();
    assert_eq!(geometry.vertex_count(), 6);

    let calls = device.take_calls();
    let buffers: Vec<u64> = calls
        .iter()
        .filter_map(|call| match call {
            Call::CreateBuffer { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(buffers.len(), 3);
    let vertex_array = calls
        .iter()
        .find_map(|call| match call {
            Call::CreateVertexArray { id } => Some(*id),
            _ => None,
        })
        .unwrap();

    // Buffers are created in location order, the element buffer last, and
    // the pointer calls run strictly by ascending location.
    assert_eq!(
        calls,
        vec![
            Call::CreateBuffer {
                id: buffers[0],
                usage: BufferUsage::VERTEX,
                byte_len: 24,
            },
            Call::CreateBuffer {
                id: buffers[1],
                usage: BufferUsage::VERTEX,
                byte_len: 28,
            },
            Call::CreateBuffer {
                id: buffers[2],
                usage: BufferUsage::INDEX,
                byte_len: 24,
            },
            Call::CreateVertexArray { id: vertex_array },
            Call::BindVertexArray {
                id: Some(vertex_array),
            },
            Call::BindArrayBuffer {
                id: Some(buffers[0]),
            },
            Call::EnableVertexAttribute { location: 1 },
            Call::VertexAttributePointer {
                location: 1,
                buffer: buffers[0],
                components: 3,
                kind: ScalarKind::Float32,
                normalized: false,
            },
            Call::BindArrayBuffer {
                id: Some(buffers[1]),
            },
            Call::EnableVertexAttribute { location: 3 },
            Call::VertexAttributePointer {
                location: 3,
                buffer: buffers[1],
                components: 1,
                kind: ScalarKind::Float32,
                normalized: false,
            },
            Call::BindIndexBuffer { id: buffers[2] },
            Call::BindVertexArray { id: None },
            Call::BindArrayBuffer { id: None },
        ]
    );

    geometry.draw(&device).unwrap();
    assert_eq!(
        device.take_calls(),
        vec![
            Call::BindVertexArray {
                id: Some(vertex_array),
            },
            Call::DrawIndexed {
                primitive: Primitive::Triangles,
                kind: ScalarKind::UInt32,
                count: 6,
                instances: 0,
            },
            Call::BindVertexArray { id: None },
        ]
    );
}

#[test]
fn shared_buffer_is_allocated_once() {
    let device = device();
    let interleaved = FlatBuffer::<HeadlessBackend>::new(
        &device,
        TypedData::from_f32_slice(&[0.0; 24]),
        BufferUsage::VERTEX,
        Some("interleaved"),
    )
    .unwrap();

    let geometry = builder()
        .attribute(
            0,
            AttributeSpec {
                buffer: interleaved.clone(),
                mode: ReadMode::Pointer,
                components: 3,
                normalized: false,
                divisor: 0,
            },
        )
        .attribute(
            1,
            AttributeSpec {
                buffer: interleaved.clone(),
                mode: ReadMode::Pointer,
                components: 4,
                normalized: true,
                divisor: 0,
            },
        )
        .assemble(&device)
        .unwrap();

    // 24 floats: 8 vertices of 3 components, 6 of 4.
    assert_eq!(geometry.vertex_count(), 6);
    assert_eq!(device.count_calls(|call| matches!(call, Call::CreateBuffer { .. })), 1);
}

#[test]
fn integer_reads_are_never_normalized() {
    let device = device();
    let ids = FlatBuffer::<HeadlessBackend>::new(
        &device,
        TypedData::Int32(vec![0, 1, 2, 3, 4, 5, 6, 7]),
        BufferUsage::VERTEX,
        None,
    )
    .unwrap();

    let binding = AttributeBinding::from_spec(
        2,
        AttributeSpec {
            buffer: ids.clone(),
            mode: ReadMode::IntegerPointer,
            components: 4,
            normalized: true,
            divisor: 0,
        },
    )
    .unwrap();
    assert!(!binding.normalized());
    assert_eq!(binding.vertex_count(), 2);

    device.take_calls();
    let geometry = builder()
        .attribute(
            2,
            AttributeSpec {
                buffer: ids,
                mode: ReadMode::IntegerPointer,
                components: 4,
                normalized: true,
                divisor: 0,
            },
        )
        .assemble(&device)
        .unwrap();
    assert_eq!(geometry.vertex_count(), 2);
    assert_eq!(
        device.count_calls(|call| matches!(
            call,
            Call::VertexAttributeIntPointer {
                location: 2,
                components: 4,
                kind: ScalarKind::Int32,
                ..
            }
        )),
        1
    );

    let floats = FlatBuffer::<HeadlessBackend>::new(
        &device,
        TypedData::from_f32_slice(&[0.0; 4]),
        BufferUsage::VERTEX,
        None,
    )
    .unwrap();
    let err = AttributeBinding::from_spec(
        0,
        AttributeSpec {
            buffer: floats,
            mode: ReadMode::IntegerPointer,
            components: 4,
            normalized: false,
            divisor: 0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, GeometryError::IntegerReadOfFloatData(ScalarKind::Float32)));
}

#[test]
fn plain_array_bindings_are_float_pointer_reads() {
    let device = device();

    let rows = AttributeBinding::<HeadlessBackend>::from_rows(&device, 0, &[[0.5f32, 1.0], [1.5, 2.0], [2.5, 3.0]]).unwrap();
    assert_eq!(rows.components(), 2);
    assert_eq!(rows.vertex_count(), 3);
    assert_eq!(rows.mode(), ReadMode::Pointer);
    assert!(!rows.normalized());
    assert_eq!(rows.divisor(), 0);
    assert_eq!(rows.buffer().kind(), ScalarKind::Float32);

    let flat = AttributeBinding::<HeadlessBackend>::from_flat(&device, 1, &[0.25f32, 0.5, 0.75]).unwrap();
    assert_eq!(flat.components(), 1);
    assert_eq!(flat.vertex_count(), 3);
}

#[test]
fn validation_failures_are_loud() {
    let device = device();

    let err = builder()
        .attribute_flat(5, &[0.0f32])
        .attribute_flat(5, &[1.0f32])
        .assemble(&device)
        .unwrap_err();
    assert!(matches!(err, GeometryError::DuplicateLocation(5)));

    let seven = FlatBuffer::<HeadlessBackend>::new(
        &device,
        TypedData::from_f32_slice(&[0.0; 7]),
        BufferUsage::VERTEX,
        None,
    )
    .unwrap();
    let err = AttributeBinding::from_spec(
        0,
        AttributeSpec {
            buffer: seven.clone(),
            mode: ReadMode::Pointer,
            components: 3,
            normalized: false,
            divisor: 0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, GeometryError::MisalignedBuffer { len: 7, components: 3 }));

    let err = AttributeBinding::from_spec(
        0,
        AttributeSpec {
            buffer: seven,
            mode: ReadMode::Pointer,
            components: 5,
            normalized: false,
            divisor: 0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, GeometryError::InvalidComponents(5)));
}

#[test]
fn non_indexed_primitive_override() {
    let device = device();
    let geometry = builder()
        .attribute_rows(0, &[[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
        .primitive(Primitive::TriangleFan)
        .assemble(&device)
        .unwrap();
    assert_eq!(geometry.primitive(), Primitive::TriangleFan);

    device.take_calls();
    geometry.draw(&device).unwrap();
    assert!(device.calls().contains(&Call::Draw {
        primitive: Primitive::TriangleFan,
        first: 0,
        count: 4,
        instances: 0,
    }));
}
