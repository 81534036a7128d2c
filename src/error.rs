use std::collections::TryReserveError;

use ash::vk;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("command buffer is not recording")]
    NotRecording,
    #[error("command buffer is already recording")]
    AlreadyRecording,
    #[error("command buffer has no ended recording to submit")]
    NotExecutable,

    /// The push buffer could not grow. The command buffer that hit this is
    /// left [`Invalid`](Error::Invalid) and has to be recreated.
    #[error("out of host memory while growing the push buffer")]
    OutOfMemory(#[from] TryReserveError),
    #[error("command buffer was invalidated by an allocation failure")]
    Invalid,

    #[error("no descriptor pool was bound when recording began")]
    NoDescriptorPool,
    #[error("descriptor set {0:?} was not allocated from the bound descriptor pool")]
    IncompatibleDescriptorSet(vk::DescriptorSet),

    #[error("{0} does not fit in a push buffer word")]
    TooLarge(&'static str),

    #[error("malformed push buffer at word {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
    #[error("immediate context was poisoned by a panicking submit")]
    ContextPoisoned,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
