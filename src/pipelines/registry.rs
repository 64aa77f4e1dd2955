use std::collections::HashMap;

use crate::config::Config;
use crate::pipelines::{
    DownloadPipeline, LatestVersionsPipeline, PepPipeline, Pipeline, PipelineError,
    WhatsNewPipeline,
};

/// Registry of pipelines by mode name
#[derive(Default)]
pub struct PipelineRegistry {
    pipelines: HashMap<&'static str, Box<dyn Pipeline>>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self {
            pipelines: HashMap::new(),
        }
    }

    /// Every built-in mode, rooted at the configured sites
    pub fn with_defaults(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(WhatsNewPipeline::new(config.docs_url().clone()));
        registry.register(LatestVersionsPipeline::new(config.docs_url().clone()));
        registry.register(DownloadPipeline::new(config.docs_url().clone()));
        registry.register(PepPipeline::new(config.peps_url().clone()));
        registry
    }

    /// Register a pipeline under its own kind, replacing any previous one
    pub fn register<P: Pipeline + 'static>(&mut self, pipeline: P) {
        self.pipelines.insert(pipeline.kind(), Box::new(pipeline));
    }

    pub fn get(&self, kind: &str) -> Result<&dyn Pipeline, PipelineError> {
        self.pipelines
            .get(kind)
            .map(|pipeline| pipeline.as_ref())
            .ok_or_else(|| PipelineError::UnknownKind(kind.to_string()))
    }
}
