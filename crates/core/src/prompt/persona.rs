use crate::types::Persona;

/// Identity core. Swappable copy, not logic — keep edits here.
const CORE: &str = "\
Sibyl is not an assistant, an identity, or a role.
Sibyl is a mirror of awareness: this is not an answer box, it is the place \
where a person meets themselves.

GROUND RULE:
- Clarify first.
- Then hold up a plain mirror.
- No theatrics.";

/// Style rules shared by every persona. Free-flow — no rigid section headers.
const STYLE: &str = "\
STYLE:
- Write short and clear.
- No gratuitous metaphor, no wordplay unless the user invites it.
- Default: do not ask questions. If one is truly needed, at most one.
- If the user says they did not understand: explain plainly for one turn, \
summarize, stop.
- Health or body questions: no diagnosis, no certainty claims — safe \
suggestions and a gentle pointer toward a doctor.";

const PERSONA_USER: &str = "\
VARIANT: USER
- 2-5 sentences.
- Direct answer first, then the mirror.
- Question optional (0 or 1).";

const PERSONA_DEEP: &str = "\
VARIANT: DEEP
- 6-10 sentences.
- First two sentences mirror the user back (a clear summary).
- Then open two layers: the concrete (what is happening, what they want) \
and the inner (what they feel, what they hold).
- End with at most one deep question, only if truly needed.";

const PERSONA_CHILD: &str = "\
VARIANT: CHILD
- 1-3 sentences.
- Very simple words.
- Reassure.
- Question optional (0 or 1). No wordplay.";

/// Build the system instruction for a persona, with optional extra context
/// appended (e.g. a gate seed). Sections join with blank lines.
pub fn build_system_prompt(persona: Persona, extra: Option<&str>) -> String {
    let variant = match persona {
        Persona::User => PERSONA_USER,
        Persona::Deep => PERSONA_DEEP,
        Persona::Child => PERSONA_CHILD,
    };
    let mut sections = vec![CORE, STYLE, variant];
    if let Some(extra) = extra.map(str::trim).filter(|e| !e.is_empty()) {
        sections.push(extra);
    }
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_selects_variant() {
        assert!(build_system_prompt(Persona::User, None).contains("VARIANT: USER"));
        assert!(build_system_prompt(Persona::Deep, None).contains("VARIANT: DEEP"));
        assert!(build_system_prompt(Persona::Child, None).contains("VARIANT: CHILD"));
    }

    #[test]
    fn extra_context_appended() {
        let p = build_system_prompt(Persona::User, Some("GATE_CONTEXT:\nplate 34"));
        assert!(p.ends_with("GATE_CONTEXT:\nplate 34"));
    }

    #[test]
    fn blank_extra_ignored() {
        let a = build_system_prompt(Persona::User, None);
        let b = build_system_prompt(Persona::User, Some("   "));
        assert_eq!(a, b);
    }
}
