//! Boundary normalization of overlapping request fields.
//!
//! Three client generations send the style selector differently: a dedicated
//! `gate_mode` field, an overloaded legacy `mode` field (gate mode OR persona),
//! and an inline bracketed directive at the start of the message text. This is
//! the only place that ambiguity is settled; downstream code sees exactly one
//! `gate_mode` and one `persona`.

use crate::config::SibylCfg;
use crate::types::{AskRequest, GateMode, Lang, Persona, RequestContext};

pub const DEFAULT_DOMAIN: &str = "auto";

/// Result of normalization: the canonical context plus the message text with
/// any inline directive stripped.
#[derive(Debug, Clone)]
pub struct NormalizedAsk {
    pub context: RequestContext,
    pub text: String,
}

/// Split an inline `[token]` directive off the start of the text.
///
/// Only gate-mode vocabulary is treated as a directive; any other bracketed
/// prefix (e.g. `[34]`) is user content and survives untouched.
fn strip_directive(text: &str) -> (Option<GateMode>, &str) {
    let trimmed = text.trim_start();
    let Some(rest) = trimmed.strip_prefix('[') else {
        return (None, text);
    };
    let Some(end) = rest.find(']') else {
        return (None, text);
    };
    match GateMode::parse(&rest[..end]) {
        Some(mode) => (Some(mode), rest[end + 1..].trim_start()),
        None => (None, text),
    }
}

/// Resolve the request into one canonical context.
///
/// Gate-mode precedence: explicit non-default field, then a non-default inline
/// directive, then an enum-valid legacy `mode`, then the default. Persona:
/// explicit field, then a legacy `mode` value that is not gate-mode
/// vocabulary, then the default. Values outside the fixed vocabularies coerce
/// to the defaults. Deterministic and total.
pub fn normalize(req: &AskRequest, cfg: &SibylCfg) -> NormalizedAsk {
    let (inline, text) = strip_directive(req.text());

    let explicit = req
        .gate_mode
        .as_deref()
        .and_then(GateMode::parse)
        .unwrap_or_default();

    // Legacy `mode` is either a gate mode or a persona, never both.
    let (legacy_gate, legacy_persona) = match req.mode.as_deref() {
        Some(m) => match GateMode::parse(m) {
            Some(g) => (Some(g), None),
            None => (None, Persona::parse(m)),
        },
        None => (None, None),
    };

    let gate_mode = if !explicit.is_default() {
        explicit
    } else if let Some(inline) = inline.filter(|m| !m.is_default()) {
        inline
    } else {
        legacy_gate.unwrap_or_default()
    };

    let persona = req
        .persona
        .as_deref()
        .and_then(Persona::parse)
        .or(legacy_persona)
        .unwrap_or_default();

    let domain = req
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DOMAIN)
        .to_owned();

    let lang = req
        .lang
        .as_deref()
        .and_then(Lang::parse)
        .unwrap_or(cfg.default_lang);

    let plate = req
        .plate
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned);

    NormalizedAsk {
        context: RequestContext { domain, gate_mode, persona, plate, lang },
        text: text.trim().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(text: &str) -> AskRequest {
        AskRequest { message: Some(text.into()), ..Default::default() }
    }

    #[test]
    fn bare_text_gets_defaults() {
        let n = normalize(&ask("hello"), &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Mirror);
        assert_eq!(n.context.persona, Persona::User);
        assert_eq!(n.context.domain, "auto");
        assert_eq!(n.context.lang, Lang::Tr);
        assert_eq!(n.text, "hello");
    }

    #[test]
    fn inline_directive_stripped_and_applied() {
        let n = normalize(&ask("[ritual] open the gate"), &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Ritual);
        assert_eq!(n.text, "open the gate");
    }

    #[test]
    fn unknown_bracket_prefix_is_user_content() {
        let n = normalize(&ask("[34] which gate is this"), &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Mirror);
        assert_eq!(n.text, "[34] which gate is this");
    }

    #[test]
    fn inline_wins_over_legacy_when_explicit_is_default() {
        let mut req = ask("[dream] speak");
        req.mode = Some("ritual".into());
        let n = normalize(&req, &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Dream);
    }

    #[test]
    fn explicit_non_default_wins_over_everything() {
        let mut req = ask("[dream] speak");
        req.mode = Some("ritual".into());
        req.gate_mode = Some("plain".into());
        let n = normalize(&req, &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Plain);
    }

    #[test]
    fn legacy_gate_mode_applies_without_inline() {
        let mut req = ask("speak");
        req.mode = Some("ritual".into());
        let n = normalize(&req, &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Ritual);
        assert_eq!(n.context.persona, Persona::User);
    }

    #[test]
    fn legacy_persona_value_sets_persona_not_gate_mode() {
        let mut req = ask("speak");
        req.mode = Some("derin".into());
        let n = normalize(&req, &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Mirror);
        assert_eq!(n.context.persona, Persona::Deep);
    }

    #[test]
    fn explicit_persona_beats_legacy() {
        let mut req = ask("speak");
        req.mode = Some("cocuk".into());
        req.persona = Some("deep".into());
        let n = normalize(&req, &SibylCfg::default());
        assert_eq!(n.context.persona, Persona::Deep);
    }

    #[test]
    fn invalid_gate_mode_coerces_to_default() {
        let mut req = ask("speak");
        req.gate_mode = Some("oracle".into());
        let n = normalize(&req, &SibylCfg::default());
        assert_eq!(n.context.gate_mode, GateMode::Mirror);
    }

    #[test]
    fn lang_and_plate_pass_through() {
        let mut req = ask("speak");
        req.lang = Some("en".into());
        req.plate = Some(" 34 ".into());
        let n = normalize(&req, &SibylCfg::default());
        assert_eq!(n.context.lang, Lang::En);
        assert_eq!(n.context.plate.as_deref(), Some("34"));
    }
}
