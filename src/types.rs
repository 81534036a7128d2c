use ash::vk;

/// Size value meaning "from the offset to the end of the buffer".
pub const WHOLE_SIZE: u64 = u64::MAX;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth_min: f32,
    pub depth_max: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Sample position in 1/16th pixel units, centered on the pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SampleLocation {
    pub x: i8,
    pub y: i8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

pub type Color32f = Color<f32>;
pub type Color32ui = Color<u32>;
pub type Color32i = Color<i32>;

impl<T: Copy> Color<T> {
    pub const fn new(x: T, y: T, z: T, w: T) -> Self {
        Self { x, y, z, w }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorValue {
    Float(Color32f),
    Uint(Color32ui),
    Int(Color32i),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClearValue {
    Color(ColorValue),
    DepthStencil { depth: f32, stencil: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearDesc {
    pub value: ClearValue,
    pub planes: vk::ImageAspectFlags,
    pub color_attachment_index: u32,
}

/// A view the backend can bind or clear. Only views are recorded; the
/// underlying resources stay with whoever created them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Descriptor {
    BufferView(vk::BufferView),
    ImageView(vk::ImageView),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearStorageDesc {
    pub storage: Descriptor,
    pub value: ColorValue,
    pub set_index: u32,
    pub range_index: u32,
    pub descriptor_index: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttachmentsDesc<'a> {
    pub depth_stencil: Option<vk::ImageView>,
    pub shading_rate: Option<vk::ImageView>,
    pub colors: &'a [vk::ImageView],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexBufferDesc {
    pub buffer: vk::Buffer,
    pub offset: u64,
    pub stride: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DrawDesc {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DrawIndexedDesc {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
    pub first_instance: u32,
}

/// Arguments shared by indexed and non-indexed indirect draws. With a
/// `count_buffer` the draw count is read from the GPU and `draw_num` is the
/// upper bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DrawIndirectDesc {
    pub buffer: vk::Buffer,
    pub offset: u64,
    pub draw_num: u32,
    pub stride: u32,
    pub count_buffer: Option<vk::Buffer>,
    pub count_buffer_offset: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DispatchDesc {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureRegionDesc {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_offset: u32,
    pub layer_offset: u32,
    pub planes: vk::ImageAspectFlags,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureDataLayoutDesc {
    pub offset: u64,
    pub row_pitch: u32,
    pub slice_pitch: u32,
}
