mod codec;
mod opcode;
mod push_buffer;
mod recorder;
mod replay;

pub use codec::{Packed, Writer};
pub use opcode::Opcode;
pub use push_buffer::{PushBuffer, Reader};
pub use recorder::{CommandBuffer, CommandBufferState};
pub use replay::replay;
