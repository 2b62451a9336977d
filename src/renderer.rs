// SPDX-License-Identifier: MPL-2.0

//! Rendering backends.
//!
//! The frame pipeline stops at [`Backend`]: it hands each object and its final uniforms to the
//! backend and does not care how they reach the screen. [`WgpuBackend`] is the GPU
//! implementation.

use std::{collections::HashMap, ops::Range};

use wgpu::util::DeviceExt as _;

use crate::{
    object::{Object, Primitive, VertexAttributes},
    ObjectId,
    ObjectTransformsUniform,
    Uniforms,
};

/// The receiving end of [`Frame::render`](crate::Frame::render).
pub trait Backend {
    /// Called once per frame, before any other method.
    fn begin(&mut self, object_count: usize) {
        let _ = object_count;
    }

    /// Replaces whatever copy of the vertex data of `id` this backend holds.
    ///
    /// Called before the first draw of an object and after each frame in which it was deformed.
    fn upload_vertices(&mut self, id: ObjectId, object: &Object);

    /// Draws `object` with `uniforms`.
    fn draw(&mut self, id: ObjectId, object: &Object, uniforms: &Uniforms);
}

/// A vertex as laid out in GPU memory.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub texcoord: [f32; 2],
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
        3 => Float32x2
    ];

    /// The layout of vertex buffer 0, for building a pipeline that draws these vertices.
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleaves flat attribute arrays. Missing normals and texture coordinates are zero, and
    /// missing colors are opaque white.
    pub fn interleave(attributes: &VertexAttributes) -> Vec<Self> {
        (0..attributes.vertex_count())
            .map(|i| Self {
                position: take(&attributes.position, i, [0.; 3]),
                normal: take(&attributes.normal, i, [0.; 3]),
                color: take(&attributes.color, i, [1.; 4]),
                texcoord: take(&attributes.texcoord, i, [0.; 2]),
            })
            .collect()
    }
}

fn take<const N: usize>(data: &[f32], index: usize, default: [f32; N]) -> [f32; N] {
    data.get(index * N..(index + 1) * N)
        .and_then(|chunk| chunk.try_into().ok())
        .unwrap_or(default)
}

/// The GPU topology for `primitive`, if wgpu has one.
pub fn topology(primitive: Primitive) -> Option<wgpu::PrimitiveTopology> {
    match primitive {
        Primitive::Points => Some(wgpu::PrimitiveTopology::PointList),
        Primitive::Lines => Some(wgpu::PrimitiveTopology::LineList),
        Primitive::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
        Primitive::Triangles => Some(wgpu::PrimitiveTopology::TriangleList),
        Primitive::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
        Primitive::LineLoop | Primitive::TriangleFan => None,
    }
}

/// A [`Backend`] that keeps per-object buffers on a wgpu device.
///
/// [`Backend::draw`] only writes uniforms and queues the object; the queued draws are recorded
/// into a render pass by [`Self::encode`], one topology at a time. Each pipeline bound to that
/// pass must use [`Self::bind_group_layout`] as bind group 0 and [`GpuVertex::buffer_layout`] as
/// vertex buffer 0.
#[derive(Debug)]
pub struct WgpuBackend<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    resources: HashMap<ObjectId, ObjectResources>,
    queued: DrawQueue,
}

#[derive(Debug)]
struct ObjectResources {
    transforms_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl<'a> WgpuBackend<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self {
            bind_group_layout: Self::create_bind_group_layout(device),
            device,
            queue,
            resources: HashMap::new(),
            queued: DrawQueue::default(),
        }
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Arbor object transforms layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    fn resources_for(&mut self, id: ObjectId) -> &mut ObjectResources {
        let (device, layout) = (self.device, &self.bind_group_layout);

        self.resources.entry(id).or_insert_with(|| {
            let transforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Arbor object transforms"),
                size: std::mem::size_of::<ObjectTransformsUniform>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Arbor object transforms bind group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transforms_buffer.as_entire_binding(),
                }],
            });

            ObjectResources {
                transforms_buffer,
                bind_group,
                vertex_buffer: None,
                index_buffer: None,
                vertex_count: 0,
                index_count: 0,
            }
        })
    }

    fn create_buffer<T>(&self, label: &str, slice: &[T], usage: wgpu::BufferUsages) -> wgpu::Buffer
    where
        T: bytemuck::Pod,
    {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(slice),
            usage,
        })
    }

    /// The topologies of this frame's draws, in order of first appearance. Each needs its own
    /// pipeline.
    pub fn topologies(&self) -> Vec<wgpu::PrimitiveTopology> {
        self.queued.topologies()
    }

    /// Records the draws queued this frame whose topology is `topology` into `pass`.
    ///
    /// The pipeline bound to `pass` must have been built for `topology`.
    pub fn encode<'p>(
        &'p self,
        pass: &mut wgpu::RenderPass<'p>,
        topology: wgpu::PrimitiveTopology,
    ) {
        for id in self.queued.with_topology(topology) {
            let Some(resources) = self.resources.get(&id) else {
                continue;
            };
            let Some(vertex_buffer) = &resources.vertex_buffer else {
                continue;
            };

            pass.set_bind_group(0, &resources.bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            match &resources.index_buffer {
                Some(index_buffer) => {
                    pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..resources.index_count, 0, INSTANCES);
                }
                None => pass.draw(0..resources.vertex_count, INSTANCES),
            }
        }
    }
}

const INSTANCES: Range<u32> = 0..1;

impl Backend for WgpuBackend<'_> {
    fn begin(&mut self, object_count: usize) {
        self.queued.clear(object_count);
    }

    fn upload_vertices(&mut self, id: ObjectId, object: &Object) {
        let attributes = object.attributes();
        let vertices = GpuVertex::interleave(attributes);
        tracing::debug!("Uploading {} vertices of {:?}...", vertices.len(), object.name());

        let vertex_buffer = self.create_buffer("Arbor vertex buffer", &vertices, wgpu::BufferUsages::VERTEX);
        let index_buffer = attributes
            .indices
            .as_ref()
            .map(|indices| self.create_buffer("Arbor index buffer", indices, wgpu::BufferUsages::INDEX));

        let resources = self.resources_for(id);
        resources.vertex_count = vertices.len() as u32;
        resources.index_count = attributes.indices.as_ref().map_or(0, |i| i.len() as u32);
        resources.vertex_buffer = Some(vertex_buffer);
        resources.index_buffer = index_buffer;
    }

    fn draw(&mut self, id: ObjectId, object: &Object, uniforms: &Uniforms) {
        let Some(topology) = topology(object.primitive()) else {
            tracing::warn!(
                "Skipping {:?}: {:?} has no GPU topology",
                object.name(),
                object.primitive(),
            );
            return;
        };

        let transforms = ObjectTransformsUniform::from_uniforms(uniforms);
        let queue = self.queue;
        let resources = self.resources_for(id);
        queue.write_buffer(&resources.transforms_buffer, 0, bytemuck::bytes_of(&transforms));
        self.queued.push(id, topology);
    }
}

/// Draws queued for the current frame, tagged with their topologies.
#[derive(Debug, Default)]
struct DrawQueue {
    draws: Vec<(ObjectId, wgpu::PrimitiveTopology)>,
}

impl DrawQueue {
    fn clear(&mut self, capacity: usize) {
        self.draws.clear();
        self.draws.reserve(capacity);
    }

    fn push(&mut self, id: ObjectId, topology: wgpu::PrimitiveTopology) {
        self.draws.push((id, topology));
    }

    fn topologies(&self) -> Vec<wgpu::PrimitiveTopology> {
        let mut topologies = Vec::new();
        for &(_, topology) in &self.draws {
            if !topologies.contains(&topology) {
                topologies.push(topology);
            }
        }

        topologies
    }

    fn with_topology(
        &self,
        topology: wgpu::PrimitiveTopology,
    ) -> impl Iterator<Item = ObjectId> + '_ {
        self.draws
            .iter()
            .filter(move |(_, t)| *t == topology)
            .map(|&(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_fills_missing_attributes() {
        let attributes = VertexAttributes {
            position: vec![1., 2., 3., 4., 5., 6.],
            color: vec![0.5, 0.5, 0.5, 1.],
            ..Default::default()
        };

        let vertices = GpuVertex::interleave(&attributes);

        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].color, [0.5, 0.5, 0.5, 1.]);
        assert_eq!(vertices[1].position, [4., 5., 6.]);
        assert_eq!(vertices[1].color, [1.; 4]);
        assert_eq!(vertices[1].normal, [0.; 3]);
        assert_eq!(std::mem::size_of::<GpuVertex>(), 48);
    }

    #[test]
    fn loops_and_fans_have_no_topology() {
        assert_eq!(topology(Primitive::Triangles), Some(wgpu::PrimitiveTopology::TriangleList));
        assert_eq!(topology(Primitive::LineLoop), None);
        assert_eq!(topology(Primitive::TriangleFan), None);
    }

    #[test]
    fn queued_draws_are_split_by_topology() {
        let mut queue = DrawQueue::default();
        let primitives = [
            Primitive::Triangles,
            Primitive::Lines,
            Primitive::Triangles,
            Primitive::Points,
        ];
        for (i, primitive) in primitives.into_iter().enumerate() {
            queue.push(ObjectId(i as u32), topology(primitive).unwrap());
        }

        assert_eq!(
            queue.topologies(),
            vec![
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::PrimitiveTopology::LineList,
                wgpu::PrimitiveTopology::PointList,
            ],
        );
        assert_eq!(
            queue.with_topology(wgpu::PrimitiveTopology::TriangleList).collect::<Vec<_>>(),
            vec![ObjectId(0), ObjectId(2)],
        );
        assert_eq!(
            queue.with_topology(wgpu::PrimitiveTopology::LineList).collect::<Vec<_>>(),
            vec![ObjectId(1)],
        );
        assert_eq!(queue.with_topology(wgpu::PrimitiveTopology::LineStrip).count(), 0);

        queue.clear(4);
        assert!(queue.topologies().is_empty());
    }
}
