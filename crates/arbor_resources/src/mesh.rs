use arbor_core::errors::{ArborError, Result};

use crate::backend::{BufferId, BufferTarget, DrawIndexed, GpuContext, GraphicsBackend, TextureId};

/// One attribute inside the interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Shader attribute location
    pub location: u32,
    /// Number of f32 components
    pub components: u32,
    /// Byte offset from the start of a vertex
    pub offset: u32,
}

/// Interleaved layout: only the attributes a mesh actually carries, packed
/// in location order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
    /// Bytes per vertex
    pub stride: u32,
}

impl VertexLayout {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Floats per vertex.
    #[must_use]
    pub fn components_per_vertex(&self) -> usize {
        (self.stride as usize) / std::mem::size_of::<f32>()
    }
}

#[derive(Debug, Clone, Copy)]
struct GpuMesh {
    vertex_buffer: BufferId,
    index_buffer: BufferId,
}

/// Vertex data plus the GPU buffers it was uploaded to.
///
/// Meshes are shared: wrap an uploaded mesh in an `Arc` and hand clones to
/// as many render nodes as needed.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertex_count: usize,
    indices: Vec<u32>,
    texture: Option<TextureId>,
    layout: VertexLayout,
    data: Vec<f32>,
    gpu: Option<GpuMesh>,
}

impl Mesh {
    #[must_use]
    pub fn builder(vertices: Vec<[f32; 3]>) -> MeshBuilder {
        MeshBuilder {
            vertices,
            normals: None,
            texture_coords: None,
            colors: None,
            indices: None,
            texture: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Interleaved vertex array as it is uploaded.
    #[inline]
    #[must_use]
    pub fn vertex_data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    #[inline]
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Creates the vertex and index buffers. Uploading again replaces them.
    pub fn upload<B: GraphicsBackend>(&mut self, ctx: &mut GpuContext<B>) {
        let backend = ctx.backend_mut();
        let vertex_buffer = backend.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&self.data));
        let index_buffer = backend.create_buffer(BufferTarget::Index, bytemuck::cast_slice(&self.indices));
        self.gpu = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
        });
    }

    /// Binds the mesh texture (if any) to `texture_unit`, the unit the
    /// shader's sampler reads, and issues one indexed draw.
    pub fn render<B: GraphicsBackend>(&self, ctx: &mut GpuContext<B>, texture_unit: u32) -> Result<()> {
        let gpu = self.gpu.ok_or(ArborError::MeshNotUploaded)?;
        let backend = ctx.backend_mut();
        if let Some(texture) = self.texture {
            backend.bind_texture(texture, texture_unit);
        }
        backend.draw_indexed(&DrawIndexed {
            vertex_buffer: gpu.vertex_buffer,
            index_buffer: gpu.index_buffer,
            index_count: self.indices.len() as u32,
            stride: self.layout.stride,
        });
        Ok(())
    }
}

/// Collects optional attributes before building the interleaved array.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    vertices: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    texture_coords: Option<Vec<[f32; 2]>>,
    colors: Option<Vec<[f32; 4]>>,
    indices: Option<Vec<u32>>,
    texture: Option<TextureId>,
}

impl MeshBuilder {
    #[must_use]
    pub fn normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    #[must_use]
    pub fn texture_coords(mut self, texture_coords: Vec<[f32; 2]>) -> Self {
        self.texture_coords = Some(texture_coords);
        self
    }

    #[must_use]
    pub fn colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Triangle list indices. Without them the vertices are drawn in order.
    #[must_use]
    pub fn indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    #[must_use]
    pub fn texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn build(self) -> Result<Mesh> {
        let vertex_count = self.vertices.len();
        check_len("normals", vertex_count, self.normals.as_ref().map(Vec::len))?;
        check_len("texture_coords", vertex_count, self.texture_coords.as_ref().map(Vec::len))?;
        check_len("colors", vertex_count, self.colors.as_ref().map(Vec::len))?;

        let indices = self.indices.unwrap_or_else(|| (0..vertex_count as u32).collect());
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ArborError::MeshAttributeMismatch {
                attribute: "indices",
                expected: vertex_count,
                found: bad as usize + 1,
            });
        }

        // (name, location, components, present)
        let definition = [
            ("position", 0, 3, true),
            ("normal", 1, 3, self.normals.is_some()),
            ("texture_coord", 2, 2, self.texture_coords.is_some()),
            ("color", 3, 4, self.colors.is_some()),
        ];

        let mut layout = VertexLayout::default();
        let float_size = std::mem::size_of::<f32>() as u32;
        for (name, location, components, present) in definition {
            if present {
                layout.attributes.push(VertexAttribute {
                    name,
                    location,
                    components,
                    offset: layout.stride,
                });
                layout.stride += components * float_size;
            }
        }

        let mut data = Vec::with_capacity(vertex_count * layout.components_per_vertex());
        for i in 0..vertex_count {
            data.extend_from_slice(&self.vertices[i]);
            if let Some(normals) = &self.normals {
                data.extend_from_slice(&normals[i]);
            }
            if let Some(uvs) = &self.texture_coords {
                data.extend_from_slice(&uvs[i]);
            }
            if let Some(colors) = &self.colors {
                data.extend_from_slice(&colors[i]);
            }
        }

        Ok(Mesh {
            vertex_count,
            indices,
            texture: self.texture,
            layout,
            data,
            gpu: None,
        })
    }
}

fn check_len(attribute: &'static str, expected: usize, found: Option<usize>) -> Result<()> {
    match found {
        Some(found) if found != expected => Err(ArborError::MeshAttributeMismatch {
            attribute,
            expected,
            found,
        }),
        _ => Ok(()),
    }
}
