use serde_json::Value;

use super::{GenParams, ModuleHandler, WorkingContext};
use crate::config::SibylCfg;
use crate::lore;
use crate::output::{NormalizedOutput, OutputShape};
use crate::prompt;
use crate::types::{Lang, ModuleOutput, RequestContext, Section};

/// Structured-lookup handler: maps a validated 01–81 plate code to static
/// gate lore and asks the model for a single JSON object the clients parse
/// directly. Short-circuits with guidance when no valid code is present.
pub struct CitiesHandler;

const MODULE_KEY: &str = "awakened_cities";

fn title(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Uyanmış Şehirler",
        Lang::En => "Awakened Cities",
    }
}

fn missing_code_guidance(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Plaka kodu bulunamadı. 01–81 arası bir kapı söyle.",
        Lang::En => "Plate missing. Say a gate 01–81.",
    }
}

/// Normalize a candidate plate: digits only, zero-padded to two, 01–81.
/// More than two digits keeps the last two (phone-keyboard slips).
pub fn normalize_plate(raw: &str) -> Option<String> {
    let p = raw.trim();
    if p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let p = match p.len() {
        1 => format!("0{p}"),
        2 => p.to_owned(),
        _ => p[p.len() - 2..].to_owned(),
    };
    let n: u8 = p.parse().ok()?;
    if (1..=81).contains(&n) { Some(p) } else { None }
}

/// First standalone 1–2 digit token in free text ("gate 34 please" → "34").
/// Runs of three or more digits are not plate codes.
pub fn find_plate_in_text(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let len = i - start;
            let left_ok = start == 0 || !is_word(bytes[start - 1]);
            let right_ok = i == bytes.len() || !is_word(bytes[i]);
            if len <= 2 && left_ok && right_ok {
                if let Some(p) = normalize_plate(&text[start..i]) {
                    return Some(p);
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// The gate law embedded into both prompts: task framing plus the digit and
/// sum numerology for the plate.
fn gate_seed(plate: &str, city: &str, lang: Lang) -> String {
    let digits: Vec<u8> = plate.bytes().map(|b| b - b'0').collect();
    let (a, b) = (digits[0], digits[1]);
    let s = (a + b) % 10;
    let (na, ma) = lore::digit_meaning(a, lang);
    let (nb, mb) = lore::digit_meaning(b, lang);
    let (ns, ms) = lore::digit_meaning(s, lang);

    match lang {
        Lang::En => format!(
            "SIBYL – AWAKENED CITIES / 81 GATE BOOK\n\n\
             Task:\n\
             Turn plate {plate} into one gate of an initiation spiral (not a list).\n\n\
             The gate must include:\n\
             - Numerology per digit + sum\n\
             - City archetype (symbolic, not factual history)\n\
             - Fire + Fall + Choice theme (mandatory)\n\
             - 3 Keys (light/shadow/trial)\n\
             - 60s ritual (4 steps)\n\
             - One seal sentence\n\n\
             Context:\n- Plate: {plate}\n- City: {city}\n\
             - Digits: {a}={na} / {b}={nb}\n\
             - Sum: {a}+{b} → {s}={ns}\n\n\
             Numerology meanings:\n\
             {a} {na}: {ma}\n\
             {b} {nb}: {mb}\n\
             {s} {ns}: {ms}"
        ),
        Lang::Tr => format!(
            "SIBYL – UYANMIŞ ŞEHİRLER / 81 KAPI KİTABI\n\n\
             Görev:\n\
             {plate} plakasını inisiyasyon spiralinin tek bir kapısına dönüştür (liste değil).\n\n\
             Kapıda zorunlu:\n\
             - Haneler + toplam numeroloji\n\
             - Şehir arketipi (sembolik; tarih bilgisi yok)\n\
             - Ateş + Düşüş + Seçim teması (zorunlu)\n\
             - 3 Anahtar (ışık/gölge/sınav)\n\
             - 60 saniyelik ritüel (4 adım)\n\
             - Tek mühür cümlesi\n\n\
             Bağlam:\n- Plaka: {plate}\n- Şehir: {city}\n\
             - Haneler: {a}={na} / {b}={nb}\n\
             - Toplam: {a}+{b} → {s}={ns}\n\n\
             Numeroloji anlamları:\n\
             {a} {na}: {ma}\n\
             {b} {nb}: {mb}\n\
             {s} {ns}: {ms}"
        ),
    }
}

/// JSON schema instruction — the clients parse this object verbatim, so the
/// field names are a wire contract.
fn schema_instruction(plate: &str, city: &str, seed: &str, lang: Lang) -> String {
    const SCHEMA: &str = r#"{"plate":"01","city":"Adana","gateTitle":"...","gateSubtitle":"...","numerology":{"digits":[{"digit":0,"name":"...","meaning":"..."},{"digit":1,"name":"...","meaning":"..."}],"sum":{"value":1,"name":"...","meaning":"..."}},"cityArchetype":"...","chapter":"...","keys":{"light":"...","shadow":"...","trial":"..."},"ritual60":["...","...","...","..."],"seal":"..."}"#;
    match lang {
        Lang::En => format!(
            "RETURN ONLY ONE VALID JSON OBJECT. NO MARKDOWN. NO EXTRA TEXT.\n\
             The JSON MUST match this schema:\n{SCHEMA}\n\
             Plate: {plate}\nCity: {city}\n\
             Use the context below as the gate law:\n{seed}"
        ),
        Lang::Tr => format!(
            "SADECE TEK BİR GEÇERLİ JSON DÖNDÜR. Markdown yok. Ek metin yok.\n\
             JSON şu şemaya TAM UYMALI:\n{SCHEMA}\n\
             Plaka: {plate}\nŞehir: {city}\n\
             Aşağıdaki bağlam kapının kanunudur:\n{seed}"
        ),
    }
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_owned()
}

impl ModuleHandler for CitiesHandler {
    fn key(&self) -> &'static str {
        MODULE_KEY
    }

    fn preprocess(&self, text: &str, ctx: &RequestContext) -> WorkingContext {
        let raw = text.trim();

        let plate = ctx
            .plate
            .as_deref()
            .and_then(normalize_plate)
            .or_else(|| find_plate_in_text(raw));

        let mut wc = WorkingContext {
            text: raw.to_owned(),
            title: title(ctx.lang).to_owned(),
            tags: vec![MODULE_KEY.to_owned()],
            ..Default::default()
        };

        match plate {
            Some(plate) => {
                let city = plate
                    .parse::<u8>()
                    .ok()
                    .and_then(lore::city_name);
                wc.seed = gate_seed(&plate, city.unwrap_or_default(), ctx.lang);
                wc.city = city;
                wc.plate = Some(plate);
            }
            None => wc.missing_code = true,
        }
        wc
    }

    fn short_circuit(&self, ctx: &RequestContext, wc: &WorkingContext) -> Option<ModuleOutput> {
        if !wc.missing_code {
            return None;
        }
        let how_to = match ctx.lang {
            Lang::Tr => ("Nasıl Kullanılır", "Sadece 2 haneli plaka yaz: 01, 34, 06 …"),
            Lang::En => ("How To Use", "Just write a 2-digit plate: 01, 34, 06 …"),
        };
        Some(ModuleOutput {
            module: MODULE_KEY.to_owned(),
            title: wc.title.clone(),
            answer: missing_code_guidance(ctx.lang).to_owned(),
            sections: vec![Section::new(how_to.0, how_to.1)],
            tags: vec![MODULE_KEY.to_owned(), "error".to_owned()],
        })
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::Json
    }

    fn gen_params(&self, cfg: &SibylCfg) -> GenParams {
        GenParams {
            temperature: cfg.cities_temperature,
            max_tokens: cfg.cities_max_tokens,
        }
    }

    fn build_system_prompt(&self, ctx: &RequestContext, wc: &WorkingContext) -> String {
        let extra = format!("GATE_CONTEXT:\n{}", wc.seed);
        prompt::build_system_prompt(ctx.persona, Some(&extra))
    }

    fn build_user_payload(&self, ctx: &RequestContext, wc: &WorkingContext) -> String {
        schema_instruction(
            wc.plate.as_deref().unwrap_or_default(),
            wc.city.unwrap_or_default(),
            &wc.seed,
            ctx.lang,
        )
    }

    fn postprocess(
        &self,
        output: NormalizedOutput,
        ctx: &RequestContext,
        wc: &WorkingContext,
    ) -> ModuleOutput {
        let v = match output {
            NormalizedOutput::Json(v) => v,
            NormalizedOutput::Text(t) => Value::String(t),
        };

        if !v.is_object() || v.get("error").is_some() {
            let answer = match ctx.lang {
                Lang::Tr => "Kapı çıktısı okunamadı. Bir kez daha sor.",
                Lang::En => "The gate output could not be read. Ask once more.",
            };
            return ModuleOutput {
                module: MODULE_KEY.to_owned(),
                title: wc.title.clone(),
                answer: answer.to_owned(),
                sections: Vec::new(),
                tags: vec![MODULE_KEY.to_owned(), "error".to_owned()],
            };
        }

        let plate = {
            let p = str_field(&v, "plate");
            if p.is_empty() { wc.plate.clone().unwrap_or_default() } else { p }
        };
        let city = str_field(&v, "city");
        let gate_title = str_field(&v, "gateTitle");
        let gate_sub = str_field(&v, "gateSubtitle");
        let archetype = str_field(&v, "cityArchetype");
        let chapter = str_field(&v, "chapter");
        let seal = str_field(&v, "seal");

        let keys = v.get("keys").cloned().unwrap_or(Value::Null);
        let k_light = str_field(&keys, "light");
        let k_shadow = str_field(&keys, "shadow");
        let k_trial = str_field(&keys, "trial");

        let ritual: Vec<String> = v
            .get("ritual60")
            .and_then(Value::as_array)
            .map(|steps| {
                steps
                    .iter()
                    .take(6)
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let (keys_label, ritual_label) = match ctx.lang {
            Lang::Tr => ("3 Anahtar", "60s Ritüel"),
            Lang::En => ("3 Keys", "60s Ritual"),
        };

        let mut lines: Vec<String> = Vec::new();
        let header = format!("{plate} · {city}");
        let header = header.trim_matches([' ', '·']).to_owned();
        if !header.is_empty() {
            lines.push(header);
        }
        for part in [&gate_title, &gate_sub, &archetype] {
            if !part.is_empty() {
                lines.push(part.clone());
            }
        }
        if !chapter.is_empty() {
            lines.push(format!("\n{chapter}"));
        }
        if !(k_light.is_empty() && k_shadow.is_empty() && k_trial.is_empty()) {
            lines.push(format!("\n{keys_label}"));
            for k in [&k_light, &k_shadow, &k_trial] {
                if !k.is_empty() {
                    lines.push(format!("• {k}"));
                }
            }
        }
        if !ritual.is_empty() {
            lines.push(format!("\n{ritual_label}"));
            for step in &ritual {
                lines.push(format!("• {step}"));
            }
        }
        if !seal.is_empty() {
            lines.push(format!("\n{seal}"));
        }

        let keys_text = [k_light, k_shadow, k_trial]
            .iter()
            .filter(|k| !k.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        let sections = vec![
            Section::new("Gate", format!("{gate_sub}\n{chapter}").trim().to_owned()),
            Section::new("Keys", keys_text),
            Section::new("Ritual", ritual.join("\n")),
        ];

        let tags = [plate.clone(), city.clone(), MODULE_KEY.to_owned()]
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();

        ModuleOutput {
            module: MODULE_KEY.to_owned(),
            title: wc.title.clone(),
            answer: lines.join("\n"),
            sections,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GateMode, Persona};
    use serde_json::json;

    fn ctx(plate: Option<&str>) -> RequestContext {
        RequestContext {
            domain: MODULE_KEY.into(),
            gate_mode: GateMode::Mirror,
            persona: Persona::User,
            plate: plate.map(str::to_owned),
            lang: Lang::En,
        }
    }

    #[test]
    fn plate_normalization() {
        assert_eq!(normalize_plate("6").as_deref(), Some("06"));
        assert_eq!(normalize_plate("34").as_deref(), Some("34"));
        assert_eq!(normalize_plate("081").as_deref(), Some("81"));
        assert_eq!(normalize_plate("99"), None);
        assert_eq!(normalize_plate("00"), None);
        assert_eq!(normalize_plate("3a"), None);
        assert_eq!(normalize_plate(""), None);
    }

    #[test]
    fn plate_found_in_text() {
        assert_eq!(find_plate_in_text("open gate 34 please").as_deref(), Some("34"));
        assert_eq!(find_plate_in_text("6").as_deref(), Some("06"));
        // 3+ digit runs are not standalone plate tokens
        assert_eq!(find_plate_in_text("call 112233 now"), None);
        // attached to a word is not standalone
        assert_eq!(find_plate_in_text("route66x"), None);
        assert_eq!(find_plate_in_text("no numbers here"), None);
        // out-of-range standalone token is skipped, later valid one found
        assert_eq!(find_plate_in_text("99 then 42").as_deref(), Some("42"));
    }

    #[test]
    fn preprocess_prefers_explicit_plate() {
        let wc = CitiesHandler.preprocess("tell me about 06", &ctx(Some("34")));
        assert_eq!(wc.plate.as_deref(), Some("34"));
        assert_eq!(wc.city, Some("İstanbul"));
        assert!(!wc.missing_code);
        assert!(wc.seed.contains("Plate: 34"));
    }

    #[test]
    fn preprocess_falls_back_to_text() {
        let wc = CitiesHandler.preprocess("gate 06", &ctx(None));
        assert_eq!(wc.plate.as_deref(), Some("06"));
        assert_eq!(wc.city, Some("Ankara"));
    }

    #[test]
    fn out_of_range_plate_short_circuits() {
        let c = ctx(Some("99"));
        let wc = CitiesHandler.preprocess("open", &c);
        assert!(wc.missing_code);
        let out = CitiesHandler.short_circuit(&c, &wc).unwrap();
        assert_eq!(out.answer, "Plate missing. Say a gate 01–81.");
        assert!(out.tags.contains(&"error".to_owned()));
    }

    #[test]
    fn valid_plate_does_not_short_circuit() {
        let c = ctx(Some("34"));
        let wc = CitiesHandler.preprocess("open", &c);
        assert!(CitiesHandler.short_circuit(&c, &wc).is_none());
    }

    #[test]
    fn user_payload_demands_single_json() {
        let c = ctx(Some("34"));
        let wc = CitiesHandler.preprocess("open", &c);
        let payload = CitiesHandler.build_user_payload(&c, &wc);
        assert!(payload.contains("ONLY ONE VALID JSON OBJECT"));
        assert!(payload.contains("gateTitle"));
        assert!(payload.contains("ritual60"));
        assert!(payload.contains("City: İstanbul"));
    }

    #[test]
    fn postprocess_renders_sections() {
        let c = ctx(Some("34"));
        let wc = CitiesHandler.preprocess("open", &c);
        let reply = json!({
            "plate": "34",
            "city": "İstanbul",
            "gateTitle": "The Bridge Gate",
            "gateSubtitle": "Two shores, one crossing",
            "cityArchetype": "The meeting of worlds",
            "chapter": "Fire rises over the strait.",
            "keys": {"light": "presence", "shadow": "haste", "trial": "patience"},
            "ritual60": ["Stand still", "Breathe", "Name the fire", "Set intention"],
            "seal": "The gate stays open behind you."
        });
        let out = CitiesHandler.postprocess(NormalizedOutput::Json(reply), &c, &wc);
        assert!(out.answer.starts_with("34 · İstanbul"));
        assert!(out.answer.contains("3 Keys"));
        assert!(out.answer.contains("• presence"));
        assert!(out.answer.contains("60s Ritual"));
        assert_eq!(out.sections.len(), 3);
        assert_eq!(out.sections[0].label, "Gate");
        assert_eq!(out.sections[1].text, "presence\nhaste\npatience");
        assert_eq!(out.tags, vec!["34", "İstanbul", MODULE_KEY]);
    }

    #[test]
    fn postprocess_sentinel_degrades_gracefully() {
        let c = ctx(Some("34"));
        let wc = CitiesHandler.preprocess("open", &c);
        let sentinel = json!({"error": "malformed_output", "raw": "garbage"});
        let out = CitiesHandler.postprocess(NormalizedOutput::Json(sentinel), &c, &wc);
        assert!(out.tags.contains(&"error".to_owned()));
        assert!(!out.answer.is_empty());
    }

    #[test]
    fn postprocess_missing_fields_default_empty() {
        let c = ctx(Some("34"));
        let wc = CitiesHandler.preprocess("open", &c);
        let out = CitiesHandler.postprocess(NormalizedOutput::Json(json!({"plate": "34"})), &c, &wc);
        assert_eq!(out.answer, "34");
        assert_eq!(out.sections.len(), 3);
        assert_eq!(out.sections[2].text, "");
    }
}
