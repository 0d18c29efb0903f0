//! Deterministic matrix-role numerology. No LLM involved.
//!
//! Pythagorean letter values over a transliterated name plus a birth-date
//! digit sum, both reduced while preserving the master numbers 11/22/33.

use serde::Serialize;

/// Full analysis for a name + birth date.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixAnalysis {
    pub name_normalized: String,
    pub name_number: u32,
    pub life_path: u32,
    pub name_archetype: String,
    pub life_path_archetype: String,
    pub matrix_role: String,
    pub teaser: String,
}

/// Transliterate Turkish letters, drop everything non-alphabetic, collapse
/// whitespace, uppercase.
pub fn normalize_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        let mapped = match c {
            'ç' | 'Ç' => 'C',
            'ğ' | 'Ğ' => 'G',
            'ı' | 'İ' => 'I',
            'ö' | 'Ö' => 'O',
            'ş' | 'Ş' => 'S',
            'ü' | 'Ü' => 'U',
            c if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            c if c.is_whitespace() => ' ',
            _ => ' ',
        };
        out.push(mapped);
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn digit_sum(mut n: u32) -> u32 {
    let mut total = 0;
    while n > 0 {
        total += n % 10;
        n /= 10;
    }
    total
}

/// Reduce to a single digit, stopping at the master numbers.
pub fn reduce(mut n: u32) -> u32 {
    while n > 9 {
        if matches!(n, 11 | 22 | 33) {
            break;
        }
        n = digit_sum(n);
    }
    n
}

/// Pythagorean mapping: A J S = 1, B K T = 2, … I R = 9.
fn letter_value(c: char) -> u32 {
    match c {
        'A' | 'J' | 'S' => 1,
        'B' | 'K' | 'T' => 2,
        'C' | 'L' | 'U' => 3,
        'D' | 'M' | 'V' => 4,
        'E' | 'N' | 'W' => 5,
        'F' | 'O' | 'X' => 6,
        'G' | 'P' | 'Y' => 7,
        'H' | 'Q' | 'Z' => 8,
        'I' | 'R' => 9,
        _ => 0,
    }
}

/// Reduced letter-value sum of the normalized name.
pub fn name_number(name: &str) -> u32 {
    let total = normalize_name(name)
        .chars()
        .filter(|c| *c != ' ')
        .map(letter_value)
        .sum();
    reduce(total)
}

/// Reduced digit sum of the birth date. Accepts `DD.MM.YYYY`, `YYYY-MM-DD`
/// and `DD/MM/YYYY`; anything else falls back to the digits present.
pub fn birth_path(birth_date: &str) -> u32 {
    let digits: String = birth_date.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    let total = digits.chars().map(|c| c.to_digit(10).unwrap_or(0)).sum();
    reduce(total)
}

fn archetype_for(n: u32) -> &'static str {
    match n {
        1 => "Initiator / Leader",
        2 => "Reflector / Bridge",
        3 => "Creator / Expression",
        4 => "Builder / Order",
        5 => "Traveler / Communication",
        6 => "Healer / Responsibility",
        7 => "Sage / Researcher",
        8 => "Power / Direction",
        9 => "Completer / Service",
        11 => "Awakening / Inspiration",
        22 => "Master Builder / Great System",
        33 => "Master Healer / Guide",
        _ => "Archetype",
    }
}

/// Short deterministic role sentence for the pair.
fn role_sentence(name_n: u32, path_n: u32) -> &'static str {
    let is_master = |n| matches!(n, 11 | 22 | 33);
    if name_n == 2 || path_n == 2 {
        "Bridge role in the system: joining polarities and reflecting meaning."
    } else if name_n == 4 || path_n == 4 {
        "Builder role in the system: establishing order and making it solid."
    } else if name_n == 6 || path_n == 6 {
        "Healing role in the system: balancing, repairing, carrying responsibility."
    } else if name_n == 9 || path_n == 9 {
        "Completer role in the system: opening closure, serving the collective."
    } else if is_master(name_n) || is_master(path_n) {
        "Master role in the system: large-scale awakening, construction, guidance."
    } else {
        "Mirror role in the system: opening awareness and pointing direction."
    }
}

/// Run the full deterministic analysis.
pub fn analyze(name: &str, birth_date: &str) -> MatrixAnalysis {
    let norm = normalize_name(name);
    let n_num = name_number(name);
    let p_num = birth_path(birth_date);
    let role = role_sentence(n_num, p_num);

    let teaser = format!(
        "Core role: {role}\n\n\
         Shadow hint: the shadow of this role is holding on to control and carrying everything alone.\n\n\
         One step today: finish one thing, let one thing go."
    );

    MatrixAnalysis {
        name_normalized: norm,
        name_number: n_num,
        life_path: p_num,
        name_archetype: archetype_for(n_num).to_owned(),
        life_path_archetype: archetype_for(p_num).to_owned(),
        matrix_role: role.to_owned(),
        teaser,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_transliterates_turkish() {
        assert_eq!(normalize_name("  Çağrı  Şen "), "CAGRI SEN");
        assert_eq!(normalize_name("Ümit-Öz"), "UMIT OZ");
    }

    #[test]
    fn reduce_preserves_masters() {
        assert_eq!(reduce(11), 11);
        assert_eq!(reduce(22), 22);
        assert_eq!(reduce(33), 33);
        assert_eq!(reduce(29), 11); // 2+9=11, master, stop
        assert_eq!(reduce(38), 11);
        assert_eq!(reduce(10), 1);
    }

    #[test]
    fn name_number_is_deterministic() {
        // A=1, D=4, A=1 → 6
        assert_eq!(name_number("Ada"), 6);
        assert_eq!(name_number("ADA"), 6);
        assert_eq!(name_number("ada "), 6);
    }

    #[test]
    fn birth_path_accepts_common_formats() {
        // 2+1+0+6+1+9+8+9 = 36 → 9
        assert_eq!(birth_path("21.06.1989"), 9);
        assert_eq!(birth_path("1989-06-21"), 9);
        assert_eq!(birth_path("21/06/1989"), 9);
        assert_eq!(birth_path("no digits"), 0);
    }

    #[test]
    fn analysis_carries_archetypes_and_teaser() {
        let a = analyze("Ada", "21.06.1989");
        assert_eq!(a.name_number, 6);
        assert_eq!(a.life_path, 9);
        assert_eq!(a.name_archetype, "Healer / Responsibility");
        assert_eq!(a.life_path_archetype, "Completer / Service");
        assert!(a.matrix_role.contains("Healing role"));
        assert!(a.teaser.contains("Core role:"));
    }

    #[test]
    fn bridge_role_for_twos() {
        // name number 2 forces the bridge sentence
        let role = role_sentence(2, 5);
        assert!(role.contains("Bridge role"));
    }
}
