use super::{GenParams, ModuleHandler, WorkingContext};
use crate::config::SibylCfg;
use crate::output::NormalizedOutput;
use crate::prompt;
use crate::types::{Lang, ModuleOutput, RequestContext};

/// Default conversational handler: persona-selected instruction text, the
/// user's sentence passed through unchanged, raw model text returned as-is.
pub struct MirrorHandler;

fn title(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Ayna",
        Lang::En => "Mirror",
    }
}

impl ModuleHandler for MirrorHandler {
    fn key(&self) -> &'static str {
        "mirror"
    }

    fn preprocess(&self, text: &str, ctx: &RequestContext) -> WorkingContext {
        WorkingContext {
            text: text.trim().to_owned(),
            title: title(ctx.lang).to_owned(),
            tags: vec!["mirror".to_owned()],
            ..Default::default()
        }
    }

    fn gen_params(&self, cfg: &SibylCfg) -> GenParams {
        GenParams {
            temperature: cfg.mirror_temperature,
            max_tokens: cfg.mirror_max_tokens,
        }
    }

    fn build_system_prompt(&self, ctx: &RequestContext, _wc: &WorkingContext) -> String {
        prompt::build_system_prompt(ctx.persona, None)
    }

    fn build_user_payload(&self, ctx: &RequestContext, wc: &WorkingContext) -> String {
        // Non-default gate mode rides along as a bracketed hint.
        if ctx.gate_mode.is_default() {
            wc.text.clone()
        } else {
            format!("[{}] {}", ctx.gate_mode.as_str(), wc.text)
        }
    }

    fn postprocess(
        &self,
        output: NormalizedOutput,
        _ctx: &RequestContext,
        wc: &WorkingContext,
    ) -> ModuleOutput {
        let answer = match output {
            NormalizedOutput::Text(text) => text,
            // Shape mismatch cannot happen through the orchestrator; render
            // defensively anyway.
            NormalizedOutput::Json(v) => v.to_string(),
        };
        ModuleOutput {
            module: self.key().to_owned(),
            title: wc.title.clone(),
            answer,
            sections: Vec::new(),
            tags: wc.tags.clone(),
        }
    }
}
