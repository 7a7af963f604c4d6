pub mod discovery;
pub mod drafting;
pub mod feedback;
pub mod illustration;
pub mod llm;
pub mod pipeline;
pub mod refinement;
pub mod render;
pub mod runlog;
pub mod selection;
pub mod types;
pub mod utils;

pub use discovery::{StaticTopicSource, TopicSource, WebTopicDiscovery};
pub use illustration::Illustrator;
pub use llm::{
    ChatGenerator, ImageSynthesizer, ScriptedGenerator, ScriptedReply, ScriptedSynthesizer,
    SdxlSynthesizer, TextGenerator,
};
pub use pipeline::{ContentPipeline, PipelineBuilder};
pub use refinement::{RefinePhase, RefinementLoop};
pub use runlog::RunLog;
pub use selection::{ConsolePrompt, ScriptedPrompt, SelectionPrompt};
pub use types::{
    GeneratorConfig, PipelineError, PipelineState, Result, DEFAULT_MAX_ROUNDS, DEFAULT_TOPIC,
};
