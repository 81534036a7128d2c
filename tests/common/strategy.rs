use ash::vk::{self, Handle};
use command_emu::barrier::*;
use command_emu::types::*;
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::strategy::Union;

use super::Call;

// Finite floats only; NaN would never compare equal after the round trip.
fn float() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

fn handle<H: Handle + std::fmt::Debug>() -> impl Strategy<Value = H> {
    any::<u64>().prop_map(H::from_raw)
}

fn list<T: std::fmt::Debug>(element: impl Strategy<Value = T>) -> impl Strategy<Value = Vec<T>> {
    vec(element, 0..5)
}

fn aspect_flags() -> impl Strategy<Value = vk::ImageAspectFlags> {
    any::<u32>().prop_map(vk::ImageAspectFlags::from_raw)
}

fn viewport() -> impl Strategy<Value = Viewport> {
    (float(), float(), float(), float(), float(), float()).prop_map(
        |(x, y, width, height, depth_min, depth_max)| Viewport {
            x,
            y,
            width,
            height,
            depth_min,
            depth_max,
        },
    )
}

fn rect() -> impl Strategy<Value = Rect> {
    (any::<i32>(), any::<i32>(), any::<u32>(), any::<u32>()).prop_map(|(x, y, width, height)| {
        Rect {
            x,
            y,
            width,
            height,
        }
    })
}

fn sample_location() -> impl Strategy<Value = SampleLocation> {
    (any::<i8>(), any::<i8>()).prop_map(|(x, y)| SampleLocation { x, y })
}

fn color32f() -> impl Strategy<Value = Color32f> {
    (float(), float(), float(), float()).prop_map(|(x, y, z, w)| Color::new(x, y, z, w))
}

fn color_value() -> impl Strategy<Value = ColorValue> {
    prop_oneof![
        color32f().prop_map(ColorValue::Float),
        any::<[u32; 4]>().prop_map(|[x, y, z, w]| ColorValue::Uint(Color::new(x, y, z, w))),
        any::<[i32; 4]>().prop_map(|[x, y, z, w]| ColorValue::Int(Color::new(x, y, z, w))),
    ]
}

fn clear_desc() -> impl Strategy<Value = ClearDesc> {
    let value = prop_oneof![
        color_value().prop_map(ClearValue::Color),
        (float(), any::<u8>()).prop_map(|(depth, stencil)| ClearValue::DepthStencil {
            depth,
            stencil
        }),
    ];
    (value, aspect_flags(), any::<u32>()).prop_map(|(value, planes, color_attachment_index)| {
        ClearDesc {
            value,
            planes,
            color_attachment_index,
        }
    })
}

fn descriptor() -> impl Strategy<Value = Descriptor> {
    prop_oneof![
        handle().prop_map(Descriptor::BufferView),
        handle().prop_map(Descriptor::ImageView),
    ]
}

fn clear_storage() -> impl Strategy<Value = ClearStorageDesc> {
    (descriptor(), color_value(), any::<[u32; 3]>()).prop_map(
        |(storage, value, [set_index, range_index, descriptor_index])| ClearStorageDesc {
            storage,
            value,
            set_index,
            range_index,
            descriptor_index,
        },
    )
}

fn vertex_buffer() -> impl Strategy<Value = VertexBufferDesc> {
    (handle(), any::<u64>(), any::<u32>()).prop_map(|(buffer, offset, stride)| VertexBufferDesc {
        buffer,
        offset,
        stride,
    })
}

fn draw() -> impl Strategy<Value = DrawDesc> {
    any::<[u32; 4]>().prop_map(
        |[vertex_count, instance_count, first_vertex, first_instance]| DrawDesc {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        },
    )
}

fn draw_indexed() -> impl Strategy<Value = DrawIndexedDesc> {
    (any::<[u32; 4]>(), any::<i32>()).prop_map(
        |([index_count, instance_count, first_index, first_instance], vertex_offset)| {
            DrawIndexedDesc {
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            }
        },
    )
}

fn draw_indirect() -> impl Strategy<Value = DrawIndirectDesc> {
    (
        handle(),
        any::<u64>(),
        any::<[u32; 2]>(),
        proptest::option::of(handle()),
        any::<u64>(),
    )
        .prop_map(
            |(buffer, offset, [draw_num, stride], count_buffer, count_buffer_offset)| {
                DrawIndirectDesc {
                    buffer,
                    offset,
                    draw_num,
                    stride,
                    count_buffer,
                    count_buffer_offset,
                }
            },
        )
}

fn texture_region() -> impl Strategy<Value = TextureRegionDesc> {
    (any::<[u32; 8]>(), aspect_flags()).prop_map(
        |([x, y, z, width, height, depth, mip_offset, layer_offset], planes)| TextureRegionDesc {
            x,
            y,
            z,
            width,
            height,
            depth,
            mip_offset,
            layer_offset,
            planes,
        },
    )
}

fn data_layout() -> impl Strategy<Value = TextureDataLayoutDesc> {
    (any::<u64>(), any::<[u32; 2]>()).prop_map(|(offset, [row_pitch, slice_pitch])| {
        TextureDataLayoutDesc {
            offset,
            row_pitch,
            slice_pitch,
        }
    })
}

fn access_stage() -> impl Strategy<Value = AccessStage> {
    (any::<u64>(), any::<u64>()).prop_map(|(access, stages)| AccessStage {
        access: vk::AccessFlags2::from_raw(access),
        stages: vk::PipelineStageFlags2::from_raw(stages),
    })
}

fn access_layout_stage() -> impl Strategy<Value = AccessLayoutStage> {
    (any::<u64>(), any::<i32>(), any::<u64>()).prop_map(|(access, layout, stages)| {
        AccessLayoutStage {
            access: vk::AccessFlags2::from_raw(access),
            layout: vk::ImageLayout::from_raw(layout),
            stages: vk::PipelineStageFlags2::from_raw(stages),
        }
    })
}

fn texture_barrier() -> impl Strategy<Value = TextureBarrierDesc> {
    (
        handle(),
        access_layout_stage(),
        access_layout_stage(),
        any::<[u32; 4]>(),
        aspect_flags(),
    )
        .prop_map(
            |(texture, before, after, [mip_offset, mip_num, layer_offset, layer_num], planes)| {
                TextureBarrierDesc {
                    texture,
                    before,
                    after,
                    mip_offset,
                    mip_num,
                    layer_offset,
                    layer_num,
                    planes,
                }
            },
        )
}

fn barrier() -> impl Strategy<Value = Call> {
    let global = (access_stage(), access_stage())
        .prop_map(|(before, after)| GlobalBarrierDesc { before, after });
    let buffer = (handle(), access_stage(), access_stage())
        .prop_map(|(buffer, before, after)| BufferBarrierDesc {
            buffer,
            before,
            after,
        });
    (list(global), list(buffer), list(texture_barrier())).prop_map(
        |(globals, buffers, textures)| Call::Barrier {
            globals,
            buffers,
            textures,
        },
    )
}

fn name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _/:éß]{0,24}"
}

fn texture_pair(
) -> impl Strategy<Value = (vk::Image, Option<TextureRegionDesc>, vk::Image, Option<TextureRegionDesc>)>
{
    (
        handle(),
        proptest::option::of(texture_region()),
        handle(),
        proptest::option::of(texture_region()),
    )
}

/// Any single call. Descriptor sets are drawn from `descriptor_sets`, which
/// must be owned by the pool the recording is begun with.
pub fn call(descriptor_sets: Vec<vk::DescriptorSet>) -> impl Strategy<Value = Call> {
    let index_type = prop_oneof![Just(vk::IndexType::UINT16), Just(vk::IndexType::UINT32)];
    Union::new(vec![
        list(viewport()).prop_map(Call::SetViewports).boxed(),
        list(rect()).prop_map(Call::SetScissors).boxed(),
        (float(), float())
            .prop_map(|(min, max)| Call::SetDepthBounds(min, max))
            .boxed(),
        any::<(u8, u8)>()
            .prop_map(|(front, back)| Call::SetStencilReference(front, back))
            .boxed(),
        (list(sample_location()), any::<u8>())
            .prop_map(|(locations, sample_num)| Call::SetSampleLocations(locations, sample_num))
            .boxed(),
        color32f().prop_map(Call::SetBlendConstants).boxed(),
        (list(clear_desc()), list(rect()))
            .prop_map(|(clears, rects)| Call::ClearAttachments(clears, rects))
            .boxed(),
        clear_storage().prop_map(Call::ClearStorage).boxed(),
        (
            proptest::option::of(handle()),
            proptest::option::of(handle()),
            list(handle()),
        )
            .prop_map(|(depth_stencil, shading_rate, colors)| Call::BeginRendering {
                depth_stencil,
                shading_rate,
                colors,
            })
            .boxed(),
        Just(Call::EndRendering).boxed(),
        (any::<u32>(), list(vertex_buffer()))
            .prop_map(|(base_slot, buffers)| Call::SetVertexBuffers(base_slot, buffers))
            .boxed(),
        (handle(), any::<u64>(), index_type)
            .prop_map(|(buffer, offset, index_type)| Call::SetIndexBuffer(buffer, offset, index_type))
            .boxed(),
        handle().prop_map(Call::SetPipelineLayout).boxed(),
        handle().prop_map(Call::SetPipeline).boxed(),
        (any::<u32>(), proptest::sample::select(descriptor_sets), list(any::<u32>()))
            .prop_map(|(set_index, set, offsets)| Call::SetDescriptorSet(set_index, set, offsets))
            .boxed(),
        (any::<u32>(), vec(any::<u8>(), 0..70))
            .prop_map(|(index, data)| Call::SetRootConstants(index, data))
            .boxed(),
        (any::<u32>(), descriptor())
            .prop_map(|(index, descriptor)| Call::SetRootDescriptor(index, descriptor))
            .boxed(),
        draw().prop_map(Call::Draw).boxed(),
        draw_indexed().prop_map(Call::DrawIndexed).boxed(),
        draw_indirect().prop_map(Call::DrawIndirect).boxed(),
        draw_indirect().prop_map(Call::DrawIndexedIndirect).boxed(),
        (handle(), any::<u64>(), handle(), any::<u64>(), any::<u64>())
            .prop_map(|(dst, dst_offset, src, src_offset, size)| Call::CopyBuffer {
                dst,
                dst_offset,
                src,
                src_offset,
                size,
            })
            .boxed(),
        texture_pair()
            .prop_map(|(dst, dst_region, src, src_region)| {
                Call::CopyTexture(dst, dst_region, src, src_region)
            })
            .boxed(),
        (handle(), texture_region(), handle(), data_layout())
            .prop_map(|(dst, region, src, layout)| {
                Call::UploadBufferToTexture(dst, region, src, layout)
            })
            .boxed(),
        (handle(), data_layout(), handle(), texture_region())
            .prop_map(|(dst, layout, src, region)| {
                Call::ReadbackTextureToBuffer(dst, layout, src, region)
            })
            .boxed(),
        (handle(), any::<u64>(), any::<u64>())
            .prop_map(|(buffer, offset, size)| Call::ZeroBuffer(buffer, offset, size))
            .boxed(),
        texture_pair()
            .prop_map(|(dst, dst_region, src, src_region)| {
                Call::ResolveTexture(dst, dst_region, src, src_region)
            })
            .boxed(),
        any::<[u32; 3]>()
            .prop_map(|[x, y, z]| Call::Dispatch(DispatchDesc { x, y, z }))
            .boxed(),
        (handle(), any::<u64>())
            .prop_map(|(buffer, offset)| Call::DispatchIndirect(buffer, offset))
            .boxed(),
        barrier().boxed(),
        (handle(), any::<u32>())
            .prop_map(|(pool, offset)| Call::BeginQuery(pool, offset))
            .boxed(),
        (handle(), any::<u32>())
            .prop_map(|(pool, offset)| Call::EndQuery(pool, offset))
            .boxed(),
        (handle(), any::<u32>(), any::<u32>(), handle(), any::<u64>())
            .prop_map(|(pool, offset, num, dst, dst_offset)| {
                Call::CopyQueries(pool, offset, num, dst, dst_offset)
            })
            .boxed(),
        (name(), any::<u32>())
            .prop_map(|(name, bgra)| Call::BeginAnnotation(name, bgra))
            .boxed(),
        Just(Call::EndAnnotation).boxed(),
        (name(), any::<u32>())
            .prop_map(|(name, bgra)| Call::Annotation(name, bgra))
            .boxed(),
    ])
}

pub fn calls(descriptor_sets: Vec<vk::DescriptorSet>) -> impl Strategy<Value = Vec<Call>> {
    vec(call(descriptor_sets), 0..24)
}
