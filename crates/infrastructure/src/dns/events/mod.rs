pub mod emitter;
pub mod error_hook;

pub use emitter::ResolutionEventEmitter;
pub use error_hook::ErrorHook;
