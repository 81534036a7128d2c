use ash::vk;

use super::{opcode::Opcode, push_buffer::Reader};
use crate::barrier::*;
use crate::context::ImmediateContext;
use crate::error::{Error, Result};
use crate::types::*;

/// Walks `words` once, front to back, and runs every recorded command on
/// `context` in recorded order. Returns the number of commands replayed.
///
/// A record is fully decoded before its entry point is called, so a malformed
/// record never reaches the backend. Commands replayed before it are not
/// rolled back.
pub fn replay<C: ImmediateContext + ?Sized>(words: &[u32], context: &mut C) -> Result<usize> {
    let mut reader = Reader::new(words);
    let mut replayed = 0;
    while !reader.is_empty() {
        let offset = reader.offset();
        let opcode = Opcode::try_from(reader.word()?).map_err(|_| Error::Malformed {
            offset,
            reason: "unknown opcode",
        })?;
        tracing::trace!(?opcode, offset, "replay command");
        replay_command(opcode, &mut reader, context)?;
        replayed += 1;
    }
    Ok(replayed)
}

fn replay_command<C: ImmediateContext + ?Sized>(
    opcode: Opcode,
    reader: &mut Reader<'_>,
    context: &mut C,
) -> Result<()> {
    match opcode {
        Opcode::SetViewports => {
            let viewports = reader.slice::<Viewport>()?;
            context.set_viewports(&viewports);
        }
        Opcode::SetScissors => {
            let rects = reader.slice::<Rect>()?;
            context.set_scissors(&rects);
        }
        Opcode::SetDepthBounds => {
            let bounds_min = reader.read()?;
            let bounds_max = reader.read()?;
            context.set_depth_bounds(bounds_min, bounds_max);
        }
        Opcode::SetStencilReference => {
            let refs = reader.word()?;
            if refs > 0xffff {
                return Err(reader.malformed("stencil reference out of range"));
            }
            context.set_stencil_reference(refs as u8, (refs >> 8) as u8);
        }
        Opcode::SetSampleLocations => {
            let sample_num = reader.read()?;
            let locations = reader.slice::<SampleLocation>()?;
            context.set_sample_locations(&locations, sample_num);
        }
        Opcode::SetBlendConstants => {
            let color = reader.read()?;
            context.set_blend_constants(color);
        }
        Opcode::ClearAttachments => {
            let clears = reader.slice::<ClearDesc>()?;
            let rects = reader.slice::<Rect>()?;
            context.clear_attachments(&clears, &rects);
        }
        Opcode::ClearStorage => {
            let clear = reader.read()?;
            context.clear_storage(&clear);
        }
        Opcode::BeginRendering => {
            let depth_stencil = reader.read()?;
            let shading_rate = reader.read()?;
            let colors = reader.slice::<vk::ImageView>()?;
            context.begin_rendering(&AttachmentsDesc {
                depth_stencil,
                shading_rate,
                colors: &colors,
            });
        }
        Opcode::EndRendering => context.end_rendering(),
        Opcode::SetVertexBuffers => {
            let base_slot = reader.read()?;
            let vertex_buffers = reader.slice::<VertexBufferDesc>()?;
            context.set_vertex_buffers(base_slot, &vertex_buffers);
        }
        Opcode::SetIndexBuffer => {
            let buffer = reader.read()?;
            let offset = reader.read()?;
            let index_type = reader.read()?;
            context.set_index_buffer(buffer, offset, index_type);
        }
        Opcode::SetPipelineLayout => {
            let pipeline_layout = reader.read()?;
            context.set_pipeline_layout(pipeline_layout);
        }
        Opcode::SetPipeline => {
            let pipeline = reader.read()?;
            context.set_pipeline(pipeline);
        }
        Opcode::SetDescriptorSet => {
            let set_index = reader.read()?;
            let descriptor_set = reader.read()?;
            let offsets = reader.slice::<u32>()?;
            context.set_descriptor_set(set_index, descriptor_set, &offsets);
        }
        Opcode::SetRootConstants => {
            let root_constant_index = reader.read()?;
            let data = reader.bytes()?;
            context.set_root_constants(root_constant_index, &data);
        }
        Opcode::SetRootDescriptor => {
            let root_descriptor_index = reader.read()?;
            let descriptor = reader.read()?;
            context.set_root_descriptor(root_descriptor_index, descriptor);
        }
        Opcode::Draw => {
            let draw = reader.read()?;
            context.draw(&draw);
        }
        Opcode::DrawIndexed => {
            let draw = reader.read()?;
            context.draw_indexed(&draw);
        }
        Opcode::DrawIndirect => {
            let draw = reader.read()?;
            context.draw_indirect(&draw);
        }
        Opcode::DrawIndexedIndirect => {
            let draw = reader.read()?;
            context.draw_indexed_indirect(&draw);
        }
        Opcode::CopyBuffer => {
            let dst_buffer = reader.read()?;
            let dst_offset = reader.read()?;
            let src_buffer = reader.read()?;
            let src_offset = reader.read()?;
            let size = reader.read()?;
            context.copy_buffer(dst_buffer, dst_offset, src_buffer, src_offset, size);
        }
        Opcode::CopyTexture => {
            let (dst_texture, dst_region, src_texture, src_region) = read_texture_pair(reader)?;
            context.copy_texture(
                dst_texture,
                dst_region.as_ref(),
                src_texture,
                src_region.as_ref(),
            );
        }
        Opcode::UploadBufferToTexture => {
            let dst_texture = reader.read()?;
            let dst_region = reader.read()?;
            let src_buffer = reader.read()?;
            let src_data_layout = reader.read()?;
            context.upload_buffer_to_texture(
                dst_texture,
                &dst_region,
                src_buffer,
                &src_data_layout,
            );
        }
        Opcode::ReadbackTextureToBuffer => {
            let dst_buffer = reader.read()?;
            let dst_data_layout = reader.read()?;
            let src_texture = reader.read()?;
            let src_region = reader.read()?;
            context.readback_texture_to_buffer(
                dst_buffer,
                &dst_data_layout,
                src_texture,
                &src_region,
            );
        }
        Opcode::ZeroBuffer => {
            let buffer = reader.read()?;
            let offset = reader.read()?;
            let size = reader.read()?;
            context.zero_buffer(buffer, offset, size);
        }
        Opcode::ResolveTexture => {
            let (dst_texture, dst_region, src_texture, src_region) = read_texture_pair(reader)?;
            context.resolve_texture(
                dst_texture,
                dst_region.as_ref(),
                src_texture,
                src_region.as_ref(),
            );
        }
        Opcode::Dispatch => {
            let dispatch = reader.read()?;
            context.dispatch(&dispatch);
        }
        Opcode::DispatchIndirect => {
            let buffer = reader.read()?;
            let offset = reader.read()?;
            context.dispatch_indirect(buffer, offset);
        }
        Opcode::Barrier => {
            let globals = reader.slice::<GlobalBarrierDesc>()?;
            let buffers = reader.slice::<BufferBarrierDesc>()?;
            let textures = reader.slice::<TextureBarrierDesc>()?;
            context.barrier(&BarrierGroupDesc {
                globals: &globals,
                buffers: &buffers,
                textures: &textures,
            });
        }
        Opcode::BeginQuery => {
            let query_pool = reader.read()?;
            let offset = reader.read()?;
            context.begin_query(query_pool, offset);
        }
        Opcode::EndQuery => {
            let query_pool = reader.read()?;
            let offset = reader.read()?;
            context.end_query(query_pool, offset);
        }
        Opcode::CopyQueries => {
            let query_pool = reader.read()?;
            let offset = reader.read()?;
            let num = reader.read()?;
            let dst_buffer = reader.read()?;
            let dst_offset = reader.read()?;
            context.copy_queries(query_pool, offset, num, dst_buffer, dst_offset);
        }
        Opcode::BeginAnnotation => {
            let bgra = reader.read()?;
            let name = reader.bytes()?;
            let name = annotation_name(reader, &name)?;
            context.begin_annotation(name, bgra);
        }
        Opcode::EndAnnotation => context.end_annotation(),
        Opcode::Annotation => {
            let bgra = reader.read()?;
            let name = reader.bytes()?;
            let name = annotation_name(reader, &name)?;
            context.annotation(name, bgra);
        }
    }
    Ok(())
}

type TexturePair = (
    vk::Image,
    Option<TextureRegionDesc>,
    vk::Image,
    Option<TextureRegionDesc>,
);

fn read_texture_pair(reader: &mut Reader<'_>) -> Result<TexturePair> {
    let dst_texture = reader.read()?;
    let dst_region = reader.read()?;
    let src_texture = reader.read()?;
    let src_region = reader.read()?;
    Ok((dst_texture, dst_region, src_texture, src_region))
}

fn annotation_name<'n>(reader: &Reader<'_>, bytes: &'n [u8]) -> Result<&'n str> {
    std::str::from_utf8(bytes).map_err(|_| reader.malformed("annotation name is not utf-8"))
}
