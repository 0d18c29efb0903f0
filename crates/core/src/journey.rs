//! Static city journey lookup. LLM-free: the journey is derived from the
//! province table and the digit meaning tables, so the endpoint answers
//! instantly and deterministically.

use crate::lore;
use crate::modules;
use crate::types::{Lang, ModuleOutput, Section};

const MODULE_KEY: &str = "awakened_cities";

fn title(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Uyanmış Şehirler",
        Lang::En => "Awakened Cities",
    }
}

/// Build the static journey for a plate. Unknown/invalid plates return usage
/// guidance instead of an error.
pub fn build_city_journey(plate: &str, lang: Lang) -> ModuleOutput {
    let Some(plate) = modules::normalize_plate(plate) else {
        let (guidance, how_to) = match lang {
            Lang::Tr => (
                "Plaka bulunamadı. Örnek: 34, 06, 35 …",
                Section::new("Nasıl Kullanılır", "Sadece 2 haneli plaka yaz: 01, 34, 06 …"),
            ),
            Lang::En => (
                "Plate not found. Example: 34, 06, 35 …",
                Section::new("How To Use", "Just write a 2-digit plate: 01, 34, 06 …"),
            ),
        };
        return ModuleOutput {
            module: MODULE_KEY.to_owned(),
            title: title(lang).to_owned(),
            answer: guidance.to_owned(),
            sections: vec![how_to],
            tags: vec![MODULE_KEY.to_owned()],
        };
    };

    let n: u8 = plate.parse().unwrap_or(0);
    let city = lore::city_name(n).unwrap_or_default();

    let digits: Vec<u8> = plate.bytes().map(|b| b - b'0').collect();
    let (a, b) = (digits[0], digits[1]);
    let sum = (a + b) % 10;
    let (na, ma) = lore::digit_meaning(a, lang);
    let (nb, mb) = lore::digit_meaning(b, lang);
    let (ns, ms) = lore::digit_meaning(sum, lang);

    let (numerology_label, archetype_label, message_label) = match lang {
        Lang::Tr => ("Numeroloji", "Arketip", "Mesaj"),
        Lang::En => ("Numerology", "Archetype", "Message"),
    };

    let numerology = format!(
        "{a} {na}: {ma}\n{b} {nb}: {mb}\n{a}+{b} → {sum} {ns}: {ms}"
    );
    let archetype = format!("{sum} — {ns}");
    let message = match lang {
        Lang::Tr => format!("{city} kapısının teması: {ns}. {ms}."),
        Lang::En => format!("The theme of the {city} gate: {ns}. {ms}."),
    };

    ModuleOutput {
        module: MODULE_KEY.to_owned(),
        title: format!("{city} / {plate}"),
        answer: message.clone(),
        sections: vec![
            Section::new(numerology_label, numerology),
            Section::new(archetype_label, archetype),
            Section::new(message_label, message),
        ],
        tags: vec![MODULE_KEY.to_owned(), plate, city.to_owned()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_plate_builds_three_sections() {
        let out = build_city_journey("34", Lang::En);
        assert_eq!(out.title, "İstanbul / 34");
        assert_eq!(out.sections.len(), 3);
        assert_eq!(out.sections[0].label, "Numerology");
        assert!(out.sections[0].text.contains("3+4 → 7"));
        assert!(out.tags.contains(&"İstanbul".to_owned()));
    }

    #[test]
    fn single_digit_plate_zero_pads() {
        let out = build_city_journey("6", Lang::En);
        assert_eq!(out.title, "Ankara / 06");
    }

    #[test]
    fn invalid_plate_returns_guidance() {
        let out = build_city_journey("99", Lang::En);
        assert!(out.answer.starts_with("Plate not found"));
        assert_eq!(out.sections.len(), 1);

        let out = build_city_journey("", Lang::Tr);
        assert!(out.answer.starts_with("Plaka bulunamadı"));
    }
}
