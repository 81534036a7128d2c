use ash::vk::{self, Handle};
use smallvec::SmallVec;

use super::push_buffer::{PushBuffer, Reader};
use crate::barrier::*;
use crate::error::{Error, Result};
use crate::types::*;

/// Appends packed values to a push buffer.
pub struct Writer<'a> {
    buffer: &'a mut PushBuffer,
}

impl<'a> Writer<'a> {
    pub fn new(buffer: &'a mut PushBuffer) -> Self {
        Self { buffer }
    }

    #[inline]
    pub fn word(&mut self, word: u32) -> Result<()> {
        self.buffer.push(word)?;
        Ok(())
    }

    #[inline]
    pub fn put<T: Packed>(&mut self, value: &T) -> Result<()> {
        value.pack(self)
    }

    pub fn count(&mut self, len: usize, what: &'static str) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| Error::TooLarge(what))?;
        self.word(len)
    }

    /// Element count followed by the packed elements.
    pub fn slice<T: Packed>(&mut self, items: &[T], what: &'static str) -> Result<()> {
        self.count(items.len(), what)?;
        for item in items {
            item.pack(self)?;
        }
        Ok(())
    }

    /// Byte count followed by the bytes, four to a little-endian word.
    pub fn bytes(&mut self, bytes: &[u8], what: &'static str) -> Result<()> {
        self.count(bytes.len(), what)?;
        let mut chunks = bytes.chunks_exact(4);
        for chunk in &mut chunks {
            self.word(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))?;
        }
        let tail = chunks.remainder();
        if !tail.is_empty() {
            let mut last = [0u8; 4];
            last[..tail.len()].copy_from_slice(tail);
            self.word(u32::from_le_bytes(last))?;
        }
        Ok(())
    }

    pub fn str(&mut self, s: &str, what: &'static str) -> Result<()> {
        self.bytes(s.as_bytes(), what)
    }
}

impl<'a> Reader<'a> {
    #[inline]
    pub fn read<T: Packed>(&mut self) -> Result<T> {
        T::unpack(self)
    }

    fn count(&mut self) -> Result<usize> {
        let count = self.word()? as usize;
        // Every element occupies at least one word.
        if count > self.remaining() {
            return Err(self.malformed("count exceeds remaining words"));
        }
        Ok(count)
    }

    pub fn slice<T: Packed>(&mut self) -> Result<SmallVec<[T; 8]>> {
        let count = self.count()?;
        let mut items = SmallVec::with_capacity(count);
        for _ in 0..count {
            items.push(T::unpack(self)?);
        }
        Ok(items)
    }

    pub fn bytes(&mut self) -> Result<SmallVec<[u8; 64]>> {
        let len = self.word()? as usize;
        let words = self.take(len.div_ceil(4))?;
        let mut bytes: SmallVec<[u8; 64]> =
            words.iter().flat_map(|word| word.to_le_bytes()).collect();
        bytes.truncate(len);
        Ok(bytes)
    }
}

/// A value with a fixed, self-delimiting word encoding. `unpack` must
/// consume exactly the words `pack` wrote.
pub trait Packed: Sized {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()>;
    fn unpack(reader: &mut Reader<'_>) -> Result<Self>;
}

impl Packed for u32 {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.word(*self)
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        reader.word()
    }
}

impl Packed for i32 {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.word(*self as u32)
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(reader.word()? as i32)
    }
}

impl Packed for f32 {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.word(self.to_bits())
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(f32::from_bits(reader.word()?))
    }
}

impl Packed for u64 {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.word(*self as u32)?;
        writer.word((*self >> 32) as u32)
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        let lo = reader.word()? as u64;
        let hi = reader.word()? as u64;
        Ok(lo | (hi << 32))
    }
}

impl Packed for u8 {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.word(*self as u32)
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        let word = reader.word()?;
        u8::try_from(word).map_err(|_| reader.malformed("byte value out of range"))
    }
}

impl Packed for bool {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.word(*self as u32)
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        match reader.word()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(reader.malformed("bool value out of range")),
        }
    }
}

impl<T: Packed> Packed for Option<T> {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        match self {
            Some(value) => {
                writer.word(1)?;
                value.pack(writer)
            }
            None => writer.word(0),
        }
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        if bool::unpack(reader)? {
            Ok(Some(T::unpack(reader)?))
        } else {
            Ok(None)
        }
    }
}

macro_rules! packed_handle {
    ($($ty:ty),* $(,)?) => {$(
        impl Packed for $ty {
            fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
                self.as_raw().pack(writer)
            }
            fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
                Ok(<$ty>::from_raw(u64::unpack(reader)?))
            }
        }
    )*};
}

packed_handle!(
    vk::Buffer,
    vk::Image,
    vk::ImageView,
    vk::BufferView,
    vk::Pipeline,
    vk::PipelineLayout,
    vk::DescriptorSet,
    vk::QueryPool,
);

macro_rules! packed_raw {
    ($($ty:ty => $raw:ty),* $(,)?) => {$(
        impl Packed for $ty {
            fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
                self.as_raw().pack(writer)
            }
            fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
                Ok(<$ty>::from_raw(<$raw>::unpack(reader)?))
            }
        }
    )*};
}

packed_raw!(
    vk::AccessFlags2 => u64,
    vk::PipelineStageFlags2 => u64,
    vk::ImageAspectFlags => u32,
    vk::ImageLayout => i32,
    vk::IndexType => i32,
);

macro_rules! packed_struct {
    ($($ty:ty { $($field:ident),* $(,)? })*) => {$(
        impl Packed for $ty {
            fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
                $(self.$field.pack(writer)?;)*
                Ok(())
            }
            fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
                Ok(Self {
                    $($field: Packed::unpack(reader)?,)*
                })
            }
        }
    )*};
}

packed_struct! {
    Viewport { x, y, width, height, depth_min, depth_max }
    Rect { x, y, width, height }
    ClearDesc { value, planes, color_attachment_index }
    ClearStorageDesc { storage, value, set_index, range_index, descriptor_index }
    VertexBufferDesc { buffer, offset, stride }
    DrawDesc { vertex_count, instance_count, first_vertex, first_instance }
    DrawIndexedDesc { index_count, instance_count, first_index, vertex_offset, first_instance }
    DrawIndirectDesc { buffer, offset, draw_num, stride, count_buffer, count_buffer_offset }
    DispatchDesc { x, y, z }
    TextureRegionDesc { x, y, z, width, height, depth, mip_offset, layer_offset, planes }
    TextureDataLayoutDesc { offset, row_pitch, slice_pitch }
    AccessStage { access, stages }
    AccessLayoutStage { access, layout, stages }
    GlobalBarrierDesc { before, after }
    BufferBarrierDesc { buffer, before, after }
    TextureBarrierDesc {
        texture, before, after, mip_offset, mip_num, layer_offset, layer_num, planes
    }
}

impl<T: Packed> Packed for Color<T> {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        self.x.pack(writer)?;
        self.y.pack(writer)?;
        self.z.pack(writer)?;
        self.w.pack(writer)
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            x: T::unpack(reader)?,
            y: T::unpack(reader)?,
            z: T::unpack(reader)?,
            w: T::unpack(reader)?,
        })
    }
}

// Both sample offsets share one word.
impl Packed for SampleLocation {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.word((self.x as u8 as u32) | ((self.y as u8 as u32) << 8))
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        let word = reader.word()?;
        if word > 0xffff {
            return Err(reader.malformed("sample location out of range"));
        }
        Ok(Self {
            x: word as u8 as i8,
            y: (word >> 8) as u8 as i8,
        })
    }
}

const COLOR_FLOAT: u32 = 0;
const COLOR_UINT: u32 = 1;
const COLOR_INT: u32 = 2;
const DEPTH_STENCIL: u32 = 3;

impl ColorValue {
    fn unpack_tagged(tag: u32, reader: &mut Reader<'_>) -> Result<Self> {
        match tag {
            COLOR_FLOAT => Ok(Self::Float(reader.read()?)),
            COLOR_UINT => Ok(Self::Uint(reader.read()?)),
            COLOR_INT => Ok(Self::Int(reader.read()?)),
            _ => Err(reader.malformed("unknown color kind")),
        }
    }
}

impl Packed for ColorValue {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        match self {
            Self::Float(color) => {
                writer.word(COLOR_FLOAT)?;
                color.pack(writer)
            }
            Self::Uint(color) => {
                writer.word(COLOR_UINT)?;
                color.pack(writer)
            }
            Self::Int(color) => {
                writer.word(COLOR_INT)?;
                color.pack(writer)
            }
        }
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        let tag = reader.word()?;
        Self::unpack_tagged(tag, reader)
    }
}

impl Packed for ClearValue {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        match self {
            Self::Color(color) => color.pack(writer),
            Self::DepthStencil { depth, stencil } => {
                writer.word(DEPTH_STENCIL)?;
                depth.pack(writer)?;
                stencil.pack(writer)
            }
        }
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        match reader.word()? {
            DEPTH_STENCIL => Ok(Self::DepthStencil {
                depth: reader.read()?,
                stencil: reader.read()?,
            }),
            tag => Ok(Self::Color(ColorValue::unpack_tagged(tag, reader)?)),
        }
    }
}

const DESCRIPTOR_BUFFER_VIEW: u32 = 0;
const DESCRIPTOR_IMAGE_VIEW: u32 = 1;

impl Packed for Descriptor {
    fn pack(&self, writer: &mut Writer<'_>) -> Result<()> {
        match self {
            Self::BufferView(view) => {
                writer.word(DESCRIPTOR_BUFFER_VIEW)?;
                view.pack(writer)
            }
            Self::ImageView(view) => {
                writer.word(DESCRIPTOR_IMAGE_VIEW)?;
                view.pack(writer)
            }
        }
    }
    fn unpack(reader: &mut Reader<'_>) -> Result<Self> {
        match reader.word()? {
            DESCRIPTOR_BUFFER_VIEW => Ok(Self::BufferView(reader.read()?)),
            DESCRIPTOR_IMAGE_VIEW => Ok(Self::ImageView(reader.read()?)),
            _ => Err(reader.malformed("unknown descriptor kind")),
        }
    }
}
