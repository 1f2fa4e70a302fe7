pub mod engine;
pub mod mapping;
pub mod scale;
pub mod sequence;
pub mod style;
pub mod tone;

pub use engine::{
    Composition, GenerationError, MusicPipeline, RemoteSequenceGenerator, SequenceGenerator,
    StylePostProcessor, Synthesizer, TracingSynthesizer,
};
pub use mapping::{
    map_instrumentation, map_timbre, plan_generation, GenerationMode, GenerationPlan,
    Instrumentation, MappingConfig, TempoRange, TimbreParams,
};
pub use scale::ScaleKind;
pub use sequence::{build_seed_sequence, validate_sequence, NoteEvent, NoteSequence};
pub use style::{MusicStyle, RuleBasedStyler, UnknownStyle};
pub use tone::{tone_for, ToneNote};
