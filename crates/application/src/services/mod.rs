pub mod ecs_option_builder;
pub mod message_codec;
pub mod query_inspector;
pub mod resolution_engine;
pub mod response_synthesizer;
pub mod upstream_group_resolver;

pub use ecs_option_builder::{EcsOption, EcsOptionBuilder, EcsOrigin};
pub use message_codec::{decode_message, encode_message};
pub use query_inspector::{InspectError, InspectedQuery, QueryInspector};
pub use resolution_engine::{EngineOptions, Resolution, ResolutionEngine};
pub use response_synthesizer::ResponseSynthesizer;
pub use upstream_group_resolver::{UpstreamAnswer, UpstreamGroupResolver};
